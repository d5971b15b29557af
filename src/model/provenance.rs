//! Identity of a loaded model artifact.
//!
//! The digest is computed once at load time and gives a stable identifier
//! for the model over the life of the process.

use crate::error::Result;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

const CHUNK_SIZE: usize = 1024 * 1024;

/// Where a model came from and what exactly was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProvenance {
    /// Artifact path as configured
    pub path: PathBuf,
    /// Size on disk, `None` if the file was absent
    pub size_bytes: Option<u64>,
    /// Full SHA-256 hex digest, `None` if the file was absent
    pub sha256: Option<String>,
}

impl ModelProvenance {
    /// Stat and hash the artifact at `path`.
    ///
    /// A missing file is not an error; size and digest are left empty.
    pub fn inspect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Ok(Self {
            path: path.to_path_buf(),
            size_bytes: file_size_bytes(path)?,
            sha256: compute_sha256(path)?,
        })
    }

    /// First 12 hex characters of the digest, for log lines.
    pub fn short_hash(&self) -> Option<&str> {
        self.sha256.as_deref().map(|h| &h[..h.len().min(12)])
    }
}

/// SHA-256 hex digest of a file, or `None` if it does not exist.
pub fn compute_sha256(path: &Path) -> Result<Option<String>> {
    if !path.is_file() {
        return Ok(None);
    }
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(Some(format!("{:x}", hasher.finalize())))
}

/// Size of a file in bytes, or `None` if it does not exist.
pub fn file_size_bytes(path: &Path) -> Result<Option<u64>> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.len())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_known_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("artifact.json");
        std::fs::write(&path, b"abc").unwrap();
        let p = ModelProvenance::inspect(&path).unwrap();
        assert_eq!(
            p.sha256.as_deref(),
            Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
        assert_eq!(p.short_hash(), Some("ba7816bf8f01"));
        assert_eq!(p.size_bytes, Some(3));
    }

    #[test]
    fn test_missing_file_is_empty_provenance() {
        let dir = tempdir().unwrap();
        let p = ModelProvenance::inspect(dir.path().join("missing.json")).unwrap();
        assert_eq!(p.sha256, None);
        assert_eq!(p.size_bytes, None);
        assert_eq!(p.short_hash(), None);
    }
}
