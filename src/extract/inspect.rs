//! Document-level statistics gathered from a parsed PDF.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

/// Depth limit when walking `/Parent` for inherited page attributes.
const MAX_INHERIT_DEPTH: usize = 32;

/// Raw counts the extractor turns into features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentStats {
    /// Number of pages in the page tree
    pub pages: u32,
    /// Pages referencing at least one image XObject
    pub image_pages: u32,
    /// Distinct image XObjects across the document
    pub image_count: u32,
    /// Sum of the encoded lengths of those images
    pub total_image_bytes: u64,
    /// Horizontal DPI of each image placement
    pub dpi_samples: Vec<f64>,
    /// Simple and CID fonts found
    pub font_count: u32,
    /// Fonts whose descriptor carries a font program
    pub embedded_font_count: u32,
}

impl DocumentStats {
    /// Fraction of pages that carry images.
    pub fn image_page_ratio(&self) -> Option<f64> {
        (self.pages > 0).then(|| self.image_pages as f64 / self.pages as f64)
    }

    /// Mean encoded image size in KiB.
    pub fn avg_image_size_kb(&self) -> Option<f64> {
        (self.image_count > 0).then(|| self.total_image_bytes as f64 / 1024.0 / self.image_count as f64)
    }

    /// Median of the DPI samples.
    pub fn median_dpi(&self) -> Option<f64> {
        if self.dpi_samples.is_empty() {
            return None;
        }
        let mut sorted = self.dpi_samples.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        Some(if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        })
    }

    /// Fraction of fonts that are embedded.
    pub fn fonts_embedded_pct(&self) -> Option<f64> {
        (self.font_count > 0).then(|| self.embedded_font_count as f64 / self.font_count as f64)
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj)? {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

fn name_is(dict: &Dictionary, key: &[u8], expected: &[u8]) -> bool {
    dict.get(key)
        .and_then(Object::as_name)
        .map(|name| name == expected)
        .unwrap_or(false)
}

/// Look up a page attribute, falling back to ancestors in the page tree.
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut current = page;
    for _ in 0..MAX_INHERIT_DEPTH {
        if let Ok(value) = current.get(key) {
            return resolve(doc, value);
        }
        current = current
            .get(b"Parent")
            .ok()
            .and_then(|p| resolve_dict(doc, p))?;
    }
    None
}

fn media_box_width(doc: &Document, page: &Dictionary) -> Option<f64> {
    let values = inherited(doc, page, b"MediaBox")?.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let x0 = resolve(doc, &values[0])?.as_float().ok()?;
    let x1 = resolve(doc, &values[2])?.as_float().ok()?;
    let width = (x1 - x0).abs() as f64;
    (width > 0.0).then_some(width)
}

/// Producer string from the document information dictionary.
pub fn producer(doc: &Document) -> Option<String> {
    let info = doc.trailer.get(b"Info").ok().and_then(|o| resolve_dict(doc, o))?;
    let raw = match resolve(doc, info.get(b"Producer").ok()?)? {
        Object::String(bytes, _) => decode_text_string(bytes),
        Object::Name(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        _ => return None,
    };
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Decode a PDF text string: UTF-16BE with BOM, else UTF-8, else Latin-1.
fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Image XObjects placed directly on a page.
fn page_images(doc: &Document, page: &Dictionary) -> Vec<(ObjectId, i64, u64)> {
    let Some(resources) = inherited(doc, page, b"Resources").and_then(|r| r.as_dict().ok()) else {
        return Vec::new();
    };
    let Some(xobjects) = resources.get(b"XObject").ok().and_then(|x| resolve_dict(doc, x)) else {
        return Vec::new();
    };

    let mut images = Vec::new();
    for (_, value) in xobjects.iter() {
        let Object::Reference(id) = value else {
            continue;
        };
        let Ok(Object::Stream(stream)) = doc.get_object(*id) else {
            continue;
        };
        if !name_is(&stream.dict, b"Subtype", b"Image") {
            continue;
        }
        let width = stream
            .dict
            .get(b"Width")
            .ok()
            .and_then(|w| resolve(doc, w))
            .and_then(|w| w.as_i64().ok())
            .unwrap_or(0);
        let length = stream
            .dict
            .get(b"Length")
            .ok()
            .and_then(|l| resolve(doc, l))
            .and_then(|l| l.as_i64().ok())
            .and_then(|l| u64::try_from(l).ok())
            .unwrap_or(stream.content.len() as u64);
        images.push((*id, width, length));
    }
    images
}

/// Walk pages and fonts of a parsed document.
pub fn inspect(doc: &Document) -> DocumentStats {
    let mut stats = DocumentStats::default();
    let mut image_lengths: HashMap<ObjectId, u64> = HashMap::new();

    for (_, page_id) in doc.get_pages() {
        stats.pages += 1;
        let Ok(page) = doc.get_dictionary(page_id) else {
            log::debug!("Page object {:?} is not a dictionary", page_id);
            continue;
        };
        let images = page_images(doc, page);
        if images.is_empty() {
            continue;
        }
        stats.image_pages += 1;
        let page_width = media_box_width(doc, page);
        for (id, width_px, length) in images {
            image_lengths.insert(id, length);
            if let Some(width_pt) = page_width.filter(|_| width_px > 0) {
                stats.dpi_samples.push(width_px as f64 / (width_pt / 72.0));
            }
        }
    }
    stats.image_count = image_lengths.len() as u32;
    stats.total_image_bytes = image_lengths.values().sum();

    for object in doc.objects.values() {
        let Object::Dictionary(dict) = object else {
            continue;
        };
        if !name_is(dict, b"Type", b"Font") {
            continue;
        }
        // Composite and Type 3 fonts have no program of their own.
        if name_is(dict, b"Subtype", b"Type0") || name_is(dict, b"Subtype", b"Type3") {
            continue;
        }
        stats.font_count += 1;
        let embedded = dict
            .get(b"FontDescriptor")
            .ok()
            .and_then(|d| resolve_dict(doc, d))
            .map(|d| {
                [b"FontFile".as_slice(), b"FontFile2".as_slice(), b"FontFile3".as_slice()]
                    .iter()
                    .any(|key| d.get(key).is_ok())
            })
            .unwrap_or(false);
        if embedded {
            stats.embedded_font_count += 1;
        }
    }

    stats
}
