//! Holdout evaluation metrics.

use crate::error::{Error, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Regression quality on the holdout split, as written to `metrics.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Mean absolute error (MB)
    pub mae: f64,
    /// Root mean squared error (MB)
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Mean absolute percentage error, in percent
    pub mape_pct: f64,
    /// Rows used for fitting
    pub n_train: usize,
    /// Rows used for evaluation
    pub n_test: usize,
    /// Seed of the split
    pub seed: u64,
}

/// Error scores of predictions against ground truth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Mean absolute percentage error (percent), denominator floored at 1e-6
    pub mape_pct: f64,
}

/// Compute [`Scores`] for equally long truth/prediction vectors.
///
/// # Errors
///
/// Returns [`Error::Training`] if the vectors are empty or differ in length.
pub fn score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Scores> {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return Err(Error::Training(format!(
            "cannot score {} predictions against {} targets",
            y_pred.len(),
            y_true.len()
        )));
    }

    let residuals = y_true - y_pred;
    let mae = residuals.mapv(f64::abs).mean().unwrap_or(f64::NAN);
    let mse = residuals.mapv(|r| r * r).mean().unwrap_or(f64::NAN);

    let mean_true = y_true.mean().unwrap_or(f64::NAN);
    let ss_res: f64 = residuals.mapv(|r| r * r).sum();
    let ss_tot: f64 = y_true.mapv(|y| (y - mean_true).powi(2)).sum();
    // Constant targets: perfect fit scores 1, anything else 0.
    let r2 = if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    let mape = residuals
        .iter()
        .zip(y_true.iter())
        .map(|(r, y)| (r / y.abs().max(1e-6)).abs())
        .sum::<f64>()
        / y_true.len() as f64;

    Ok(Scores {
        mae,
        rmse: mse.sqrt(),
        r2,
        mape_pct: mape * 100.0,
    })
}

impl Metrics {
    /// Combine scores with split bookkeeping.
    pub fn new(scores: Scores, n_train: usize, n_test: usize, seed: u64) -> Self {
        Self {
            mae: scores.mae,
            rmse: scores.rmse,
            r2: scores.r2,
            mape_pct: scores.mape_pct,
            n_train,
            n_test,
            seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_perfect_predictions() {
        let y = array![100.0, 200.0, 300.0];
        let s = score(&y, &y.clone()).unwrap();
        assert!(close(s.mae, 0.0));
        assert!(close(s.rmse, 0.0));
        assert!(close(s.r2, 1.0));
        assert!(close(s.mape_pct, 0.0));
    }

    #[test]
    fn test_known_values() {
        let y_true = array![100.0, 200.0, 300.0, 400.0];
        let y_pred = array![110.0, 190.0, 330.0, 400.0];
        let s = score(&y_true, &y_pred).unwrap();
        assert!(close(s.mae, 12.5));
        assert!(close(s.rmse, (1100.0f64 / 4.0).sqrt()));
        assert!(close(s.r2, 1.0 - 1100.0 / 50000.0));
        assert!(close(s.mape_pct, (0.1 + 0.05 + 0.1 + 0.0) / 4.0 * 100.0));
    }

    #[test]
    fn test_constant_targets() {
        let y = array![5.0, 5.0];
        assert!(close(score(&y, &array![5.0, 5.0]).unwrap().r2, 1.0));
        assert!(close(score(&y, &array![4.0, 6.0]).unwrap().r2, 0.0));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(score(&array![1.0], &array![1.0, 2.0]).is_err());
        assert!(score(&Array1::<f64>::zeros(0), &Array1::<f64>::zeros(0)).is_err());
    }

    #[test]
    fn test_metrics_json_keys() {
        let s = Scores {
            mae: 1.0,
            rmse: 2.0,
            r2: 0.5,
            mape_pct: 3.0,
        };
        let json = serde_json::to_value(Metrics::new(s, 80, 20, 42)).unwrap();
        for key in ["mae", "rmse", "r2", "mape_pct", "n_train", "n_test", "seed"] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["n_test"], 20);
    }
}
