//! Feature extraction from PDF files.
//!
//! Two modes are available:
//!
//! - **Minimal** (default): file size, page count and producer are read from
//!   the document; every other field takes a fixed placeholder.
//! - **Deep**: pages are scanned for image XObjects and fonts, and the
//!   cross-reference data is validated, filling the remaining fields with
//!   measured values. Fields with nothing to measure (no images, no fonts)
//!   keep their placeholder.
//!
//! Cross-reference validation runs on the raw bytes before the document is
//! parsed. A file that cannot be parsed at all (for example one with no
//! `startxref`) yields [`crate::Error::Pdf`] with the anomaly count in the
//! message rather than a feature row.
//!
//! # Example
//!
//! ```no_run
//! use memspike::extract::{ExtractionConfig, FeatureExtractor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = FeatureExtractor::new(ExtractionConfig::deep());
//! let extracted = extractor.extract("input.pdf")?;
//! println!("{} pages", extracted.features.pages);
//! # Ok(())
//! # }
//! ```

pub mod inspect;
pub mod xref_check;

pub use inspect::DocumentStats;
pub use xref_check::{check_xref, XrefReport};

use crate::error::{Error, Result};
use crate::features::{round_to, PdfFeatures, UNKNOWN_PRODUCER};
use lopdf::Document;
use serde::{Deserialize, Serialize};
use std::path::Path;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// How much of the document to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Size, pages and producer only
    #[default]
    Minimal,
    /// Also scan images, fonts and the cross-reference table
    Deep,
}

/// Values used for fields that are not measured.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholders {
    /// Image page ratio
    pub image_page_ratio: f64,
    /// DPI estimate
    pub dpi_estimate: u32,
    /// Average image size in KiB
    pub avg_image_size_kb: f64,
    /// Embedded font fraction
    pub fonts_embedded_pct: f64,
    /// Cross-reference anomaly count
    pub xref_error_count: u32,
    /// OCR flag
    pub ocr_required: u8,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            image_page_ratio: 0.0,
            dpi_estimate: 300,
            avg_image_size_kb: 0.0,
            fonts_embedded_pct: 0.5,
            xref_error_count: 0,
            ocr_required: 0,
        }
    }
}

/// Extractor settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Analysis depth
    pub mode: ExtractionMode,

    /// Fallback values
    pub placeholders: Placeholders,

    /// Image page ratio above which OCR is assumed (deep mode)
    pub ocr_ratio_threshold: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Minimal,
            placeholders: Placeholders::default(),
            ocr_ratio_threshold: 0.6,
        }
    }
}

impl ExtractionConfig {
    /// Minimal extraction with default placeholders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep extraction with default placeholders.
    pub fn deep() -> Self {
        Self::default().with_mode(ExtractionMode::Deep)
    }

    /// Set the analysis depth.
    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the OCR ratio threshold.
    pub fn with_ocr_ratio_threshold(mut self, threshold: f64) -> Self {
        self.ocr_ratio_threshold = threshold;
        self
    }
}

/// Features of one file, tagged with its path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFeatures {
    /// Path as given on input
    pub file: String,
    /// The schema fields
    #[serde(flatten)]
    pub features: PdfFeatures,
}

/// Reads PDFs and produces [`PdfFeatures`].
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: ExtractionConfig,
}

impl FeatureExtractor {
    /// Create an extractor.
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract features from a file on disk.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read and
    /// [`crate::Error::Pdf`] if it cannot be parsed as a PDF.
    pub fn extract(&self, path: impl AsRef<Path>) -> Result<ExtractedFeatures> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let features = self.extract_bytes(&bytes)?;
        Ok(ExtractedFeatures {
            file: path.display().to_string(),
            features,
        })
    }

    /// Extract features from an in-memory PDF.
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<PdfFeatures> {
        let xref = (self.config.mode == ExtractionMode::Deep).then(|| check_xref(bytes));
        let doc = Document::load_mem(bytes).map_err(|e| match &xref {
            Some(report) => Error::Pdf(format!(
                "{} ({} cross-reference anomalies)",
                e, report.errors
            )),
            None => Error::from(e),
        })?;
        let p = &self.config.placeholders;

        let mut features = PdfFeatures {
            size_mb: round_to(bytes.len() as f64 / BYTES_PER_MIB, 3),
            pages: doc.get_pages().len() as u32,
            image_page_ratio: p.image_page_ratio,
            dpi_estimate: p.dpi_estimate,
            avg_image_size_kb: p.avg_image_size_kb,
            fonts_embedded_pct: p.fonts_embedded_pct,
            xref_error_count: p.xref_error_count,
            ocr_required: p.ocr_required,
            producer: inspect::producer(&doc).unwrap_or_else(|| UNKNOWN_PRODUCER.to_string()),
        };

        if let Some(report) = xref {
            self.apply_deep(&doc, &report, &mut features);
        }

        log::debug!(
            "Extracted {} pages, producer '{}', {:.3} MB ({:?})",
            features.pages,
            features.producer,
            features.size_mb,
            self.config.mode
        );
        Ok(features)
    }

    fn apply_deep(&self, doc: &Document, xref: &XrefReport, features: &mut PdfFeatures) {
        let stats = inspect::inspect(doc);

        if let Some(ratio) = stats.image_page_ratio() {
            features.image_page_ratio = round_to(ratio, 3);
            features.ocr_required = u8::from(ratio > self.config.ocr_ratio_threshold);
        }
        if let Some(avg) = stats.avg_image_size_kb() {
            features.avg_image_size_kb = round_to(avg, 1);
        }
        if let Some(dpi) = stats.median_dpi() {
            features.dpi_estimate = dpi.round().clamp(1.0, u32::MAX as f64) as u32;
        }
        if let Some(pct) = stats.fonts_embedded_pct() {
            features.fonts_embedded_pct = round_to(pct, 3);
        }

        if xref.errors > 0 {
            log::warn!("{} cross-reference anomalies", xref.errors);
        }
        features.xref_error_count = xref.errors;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object, Stream, StringFormat};

    /// A document with `image_pages` scanned pages out of `pages`.
    fn scanned_pdf(pages: usize, image_pages: usize, producer: Option<&str>) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2550,
                "Height" => 3300,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0u8; 10 * 1024],
        ));
        let mut kids: Vec<Object> = Vec::new();
        for i in 0..pages {
            let resources = if i < image_pages {
                dictionary! { "XObject" => dictionary! { "Im0" => image_id } }
            } else {
                dictionary! {}
            };
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources,
            });
            kids.push(page_id.into());
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        if let Some(name) = producer {
            let info = doc.add_object(dictionary! {
                "Producer" => Object::String(name.as_bytes().to_vec(), StringFormat::Literal),
            });
            doc.trailer.set("Info", info);
        }
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_minimal_uses_placeholders() {
        let pdf = scanned_pdf(3, 3, Some("UnitTest"));
        let f = FeatureExtractor::default().extract_bytes(&pdf).unwrap();
        assert_eq!(f.pages, 3);
        assert_eq!(f.producer, "UnitTest");
        assert_eq!(f.image_page_ratio, 0.0);
        assert_eq!(f.dpi_estimate, 300);
        assert_eq!(f.avg_image_size_kb, 0.0);
        assert_eq!(f.fonts_embedded_pct, 0.5);
        assert_eq!(f.xref_error_count, 0);
        assert_eq!(f.ocr_required, 0);
        assert!(f.size_mb >= 0.0);
        assert!(f.validate().is_ok());
    }

    #[test]
    fn test_missing_producer_is_unknown() {
        let pdf = scanned_pdf(1, 0, None);
        let f = FeatureExtractor::default().extract_bytes(&pdf).unwrap();
        assert_eq!(f.producer, UNKNOWN_PRODUCER);
    }

    #[test]
    fn test_deep_measures_images() {
        let pdf = scanned_pdf(4, 3, Some("Scanner"));
        let f = FeatureExtractor::new(ExtractionConfig::deep()).extract_bytes(&pdf).unwrap();
        assert_eq!(f.pages, 4);
        assert_eq!(f.image_page_ratio, 0.75);
        assert_eq!(f.ocr_required, 1);
        assert_eq!(f.avg_image_size_kb, 10.0);
        assert_eq!(f.dpi_estimate, 300);
        // No fonts at all: placeholder stays
        assert_eq!(f.fonts_embedded_pct, 0.5);
        assert_eq!(f.xref_error_count, 0);
    }

    #[test]
    fn test_deep_below_ocr_threshold() {
        let pdf = scanned_pdf(4, 2, None);
        let f = FeatureExtractor::new(ExtractionConfig::deep()).extract_bytes(&pdf).unwrap();
        assert_eq!(f.image_page_ratio, 0.5);
        assert_eq!(f.ocr_required, 0);
    }

    #[test]
    fn test_not_a_pdf() {
        let err = FeatureExtractor::default().extract_bytes(b"hello world").unwrap_err();
        assert!(matches!(err, Error::Pdf(_)));
    }

    #[test]
    fn test_deep_unparsable_reports_xref_anomalies() {
        let err = FeatureExtractor::new(ExtractionConfig::deep())
            .extract_bytes(b"%PDF-1.4\nno objects and no trailer\n%%EOF\n")
            .unwrap_err();
        match err {
            Error::Pdf(msg) => assert!(msg.contains("1 cross-reference anomalies"), "{}", msg),
            other => panic!("expected Pdf error, got {:?}", other),
        }
    }

    #[test]
    fn test_json_line_starts_with_file() {
        let extracted = ExtractedFeatures {
            file: "a.pdf".to_string(),
            features: FeatureExtractor::default()
                .extract_bytes(&scanned_pdf(1, 0, None))
                .unwrap(),
        };
        let line = serde_json::to_string(&extracted).unwrap();
        assert!(line.starts_with("{\"file\":\"a.pdf\",\"size_mb\":"), "{}", line);
        assert!(line.ends_with("\"producer\":\"Unknown\"}"), "{}", line);
    }
}
