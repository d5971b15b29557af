//! The PDF feature schema.
//!
//! [`PdfFeatures`] is the contract shared by the extractor, the trainer and
//! the scoring service: nine lightweight, model-ready descriptors of a PDF.
//!
//! Scaling and encoding conventions:
//! - `fonts_embedded_pct` is a fraction in \[0, 1\] (1.0 == 100% embedded)
//! - `image_page_ratio` is the fraction in \[0, 1\] of pages that are primarily images
//! - `ocr_required` is an integer 0/1 to avoid float round-trip ambiguity
//! - `producer` is free-form and one-hot encoded by the pipeline

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// All input columns, in schema order.
pub const FEATURE_COLUMNS: [&str; 9] = [
    "size_mb",
    "pages",
    "image_page_ratio",
    "dpi_estimate",
    "avg_image_size_kb",
    "fonts_embedded_pct",
    "xref_error_count",
    "ocr_required",
    "producer",
];

/// Numeric columns passed through to the regressor unchanged.
pub const NUMERIC_COLUMNS: [&str; 8] = [
    "size_mb",
    "pages",
    "image_page_ratio",
    "dpi_estimate",
    "avg_image_size_kb",
    "fonts_embedded_pct",
    "xref_error_count",
    "ocr_required",
];

/// Categorical columns that get one-hot encoded.
pub const CATEGORICAL_COLUMNS: [&str; 1] = ["producer"];

/// Name of the regression target column in datasets.
pub const TARGET_COLUMN: &str = "peak_mem_mb";

/// Producer value used when a PDF carries no usable producer metadata.
pub const UNKNOWN_PRODUCER: &str = "Unknown";

/// Lightweight features describing a PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfFeatures {
    /// File size in MiB
    pub size_mb: f64,
    /// Number of pages
    pub pages: u32,
    /// Fraction of pages that are primarily raster images
    pub image_page_ratio: f64,
    /// Rough dots-per-inch estimate of embedded images
    pub dpi_estimate: u32,
    /// Average size of embedded images in KiB
    pub avg_image_size_kb: f64,
    /// Fraction of fonts that are embedded
    pub fonts_embedded_pct: f64,
    /// Number of cross-reference anomalies
    pub xref_error_count: u32,
    /// 1 if text extraction is expected to need OCR
    pub ocr_required: u8,
    /// Producer metadata string
    pub producer: String,
}

impl PdfFeatures {
    /// Check every field against the schema constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFeature`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        check_finite("size_mb", self.size_mb)?;
        check_fraction("image_page_ratio", self.image_page_ratio)?;
        check_finite("avg_image_size_kb", self.avg_image_size_kb)?;
        check_fraction("fonts_embedded_pct", self.fonts_embedded_pct)?;
        if self.ocr_required > 1 {
            return Err(Error::invalid_feature(
                "ocr_required",
                format!("must be 0 or 1, got {}", self.ocr_required),
            ));
        }
        Ok(())
    }

    /// The eight numeric columns, in [`NUMERIC_COLUMNS`] order.
    pub fn numeric_values(&self) -> [f64; 8] {
        [
            self.size_mb,
            self.pages as f64,
            self.image_page_ratio,
            self.dpi_estimate as f64,
            self.avg_image_size_kb,
            self.fonts_embedded_pct,
            self.xref_error_count as f64,
            self.ocr_required as f64,
        ]
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid_feature(field, format!("must be a finite number, got {}", value)))
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<()> {
    check_finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::invalid_feature(
            field,
            format!("must be within [0, 1], got {}", value),
        ));
    }
    Ok(())
}

/// One labeled row of a training dataset.
///
/// Field order matches the CSV column order. `label_mb` is accepted as an
/// alias for the target so rows collected by the host application's
/// feedback loop can be used directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)] // same fields as PdfFeatures
pub struct TrainingRecord {
    pub size_mb: f64,
    pub pages: u32,
    pub image_page_ratio: f64,
    pub dpi_estimate: u32,
    pub avg_image_size_kb: f64,
    pub fonts_embedded_pct: f64,
    pub xref_error_count: u32,
    pub ocr_required: u8,
    pub producer: String,
    /// Measured (or simulated) peak memory in MB
    #[serde(alias = "label_mb")]
    pub peak_mem_mb: f64,
}

impl TrainingRecord {
    /// Attach a label to a feature record.
    pub fn new(features: PdfFeatures, peak_mem_mb: f64) -> Self {
        Self {
            size_mb: features.size_mb,
            pages: features.pages,
            image_page_ratio: features.image_page_ratio,
            dpi_estimate: features.dpi_estimate,
            avg_image_size_kb: features.avg_image_size_kb,
            fonts_embedded_pct: features.fonts_embedded_pct,
            xref_error_count: features.xref_error_count,
            ocr_required: features.ocr_required,
            producer: features.producer,
            peak_mem_mb,
        }
    }

    /// The feature half of the record.
    pub fn features(&self) -> PdfFeatures {
        PdfFeatures {
            size_mb: self.size_mb,
            pages: self.pages,
            image_page_ratio: self.image_page_ratio,
            dpi_estimate: self.dpi_estimate,
            avg_image_size_kb: self.avg_image_size_kb,
            fonts_embedded_pct: self.fonts_embedded_pct,
            xref_error_count: self.xref_error_count,
            ocr_required: self.ocr_required,
            producer: self.producer.clone(),
        }
    }
}

/// Round to a fixed number of decimals, the way dataset and extractor values
/// are stored.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PdfFeatures {
        PdfFeatures {
            size_mb: 2.1,
            pages: 3,
            image_page_ratio: 0.0,
            dpi_estimate: 150,
            avg_image_size_kb: 0.0,
            fonts_embedded_pct: 1.0,
            xref_error_count: 0,
            ocr_required: 0,
            producer: "UnitTest".to_string(),
        }
    }

    #[test]
    fn test_valid_features_pass() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_ratio_out_of_range() {
        let mut f = sample();
        f.image_page_ratio = 1.01;
        match f.validate() {
            Err(Error::InvalidFeature { field, .. }) => assert_eq!(field, "image_page_ratio"),
            other => panic!("expected InvalidFeature, got {:?}", other),
        }
    }

    #[test]
    fn test_fonts_pct_negative() {
        let mut f = sample();
        f.fonts_embedded_pct = -0.1;
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_ocr_flag_must_be_binary() {
        let mut f = sample();
        f.ocr_required = 2;
        match f.validate() {
            Err(Error::InvalidFeature { field, .. }) => assert_eq!(field, "ocr_required"),
            other => panic!("expected InvalidFeature, got {:?}", other),
        }
    }

    #[test]
    fn test_nan_rejected() {
        let mut f = sample();
        f.size_mb = f64::NAN;
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_numeric_values_order() {
        let f = sample();
        let values = f.numeric_values();
        assert_eq!(values.len(), NUMERIC_COLUMNS.len());
        assert_eq!(values[0], 2.1);
        assert_eq!(values[1], 3.0);
        assert_eq!(values[3], 150.0);
        assert_eq!(values[5], 1.0);
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        let obj = json.as_object().unwrap();
        for column in FEATURE_COLUMNS {
            assert!(obj.contains_key(column), "missing {}", column);
        }
        assert_eq!(obj.len(), FEATURE_COLUMNS.len());
    }

    #[test]
    fn test_negative_pages_rejected_by_deserializer() {
        let json = r#"{"size_mb":1.0,"pages":-3,"image_page_ratio":0.0,"dpi_estimate":150,
            "avg_image_size_kb":0.0,"fonts_embedded_pct":1.0,"xref_error_count":0,
            "ocr_required":0,"producer":"x"}"#;
        assert!(serde_json::from_str::<PdfFeatures>(json).is_err());
    }

    #[test]
    fn test_training_record_roundtrips_features() {
        let record = TrainingRecord::new(sample(), 812.5);
        assert_eq!(record.features(), sample());
        assert_eq!(record.peak_mem_mb, 812.5);
    }

    #[test]
    fn test_label_alias_from_csv() {
        let data = "size_mb,pages,image_page_ratio,dpi_estimate,avg_image_size_kb,fonts_embedded_pct,xref_error_count,ocr_required,producer,label_mb\n\
                    1.5,4,0.25,300,120.0,0.9,0,0,Adobe,640.2\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<TrainingRecord> = reader.deserialize().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].peak_mem_mb, 640.2);
        assert_eq!(rows[0].producer, "Adobe");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2.34567, 3), 2.346);
        assert_eq!(round_to(812.44, 1), 812.4);
    }
}
