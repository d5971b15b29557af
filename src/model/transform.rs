//! Column transform: one-hot producer encoding plus numeric passthrough.

use crate::features::{PdfFeatures, NUMERIC_COLUMNS};
use indexmap::IndexSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Encodes a [`PdfFeatures`] record into the dense row the regressor sees.
///
/// Output layout is `[one-hot producer slots..., numeric columns...]`.
/// Producers not seen at fit time encode as all-zero slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransform {
    categories: IndexSet<String>,
}

impl ColumnTransform {
    /// Learn the producer vocabulary. Categories are sorted.
    pub fn fit<'a, I>(producers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unique: BTreeSet<&str> = producers.into_iter().collect();
        let categories = unique.into_iter().map(str::to_string).collect();
        Self { categories }
    }

    /// Producer values known to the encoder, in slot order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    /// Width of an encoded row.
    pub fn n_outputs(&self) -> usize {
        self.categories.len() + NUMERIC_COLUMNS.len()
    }

    /// Encode one record.
    pub fn transform_row(&self, features: &PdfFeatures) -> Vec<f32> {
        let mut row = vec![0.0f32; self.n_outputs()];
        if let Some(slot) = self.categories.get_index_of(features.producer.as_str()) {
            row[slot] = 1.0;
        }
        let offset = self.categories.len();
        for (i, value) in features.numeric_values().iter().enumerate() {
            row[offset + i] = *value as f32;
        }
        row
    }

    /// Encode many records into an `(n_rows, n_outputs)` matrix.
    pub fn transform(&self, rows: &[PdfFeatures]) -> Array2<f32> {
        let width = self.n_outputs();
        let mut matrix = Array2::zeros((rows.len(), width));
        for (i, features) in rows.iter().enumerate() {
            for (j, value) in self.transform_row(features).into_iter().enumerate() {
                matrix[[i, j]] = value;
            }
        }
        matrix
    }

    /// Names of the encoded columns.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.categories()
            .map(|c| format!("cat__producer_{}", c))
            .chain(NUMERIC_COLUMNS.iter().map(|c| format!("num__{}", c)))
            .collect()
    }
}
