//! Synthetic dataset generator.
//!
//! Draws PDF feature vectors from distributions that mimic real document
//! populations and labels them with a latent peak-memory function plus
//! heteroscedastic noise. Same seed, same dataset.

use crate::error::{Error, Result};
use crate::features::{round_to, TrainingRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Distribution, LogNormal, Normal, Poisson, StandardNormal};

/// Default number of synthesized rows.
pub const DEFAULT_ROWS: usize = 7000;

/// Producer population and the share of documents each one accounts for.
pub const PRODUCER_WEIGHTS: [(&str, f64); 6] = [
    ("Adobe", 0.35),
    ("iText", 0.12),
    ("PDFBox", 0.12),
    ("Ghostscript", 0.08),
    ("Unknown", 0.18),
    ("Scanner", 0.15),
];

/// Additive per-producer shift of the latent peak, in MB.
pub fn producer_bias(producer: &str) -> f64 {
    match producer {
        "Adobe" => -40.0,
        "iText" => -10.0,
        "PDFBox" => 0.0,
        "Ghostscript" => 20.0,
        "Unknown" => 25.0,
        "Scanner" => 70.0,
        _ => 0.0,
    }
}

/// Noise-free peak memory (MB) for a feature vector.
#[allow(clippy::too_many_arguments)]
pub fn latent_peak_mb(
    size_mb: f64,
    pages: f64,
    image_page_ratio: f64,
    dpi_estimate: f64,
    avg_image_size_kb: f64,
    fonts_embedded_pct: f64,
    xref_error_count: f64,
    ocr_required: f64,
    producer: &str,
) -> f64 {
    let ocr_on_images = if image_page_ratio > 0.5 { ocr_required } else { 0.0 };
    60.0 + 22.0 * size_mb.ln_1p()
        + 0.08 * pages
        + 900.0 * image_page_ratio.powf(1.7)
        + 0.006 * (dpi_estimate - 150.0).max(0.0) * pages.powf(0.3)
        + 0.03 * avg_image_size_kb
        + 240.0 * (1.0 - fonts_embedded_pct)
        + 65.0 * xref_error_count.tanh()
        + 120.0 * ocr_on_images
        + producer_bias(producer)
}

fn distribution_error(name: &str, err: impl std::fmt::Display) -> Error {
    Error::Training(format!("invalid {} distribution: {}", name, err))
}

/// Generate `n` labeled rows from `seed`.
pub fn synthesize(n: usize, seed: u64) -> Result<Vec<TrainingRecord>> {
    let mut rng = StdRng::seed_from_u64(seed);

    let size_dist: LogNormal<f64> = LogNormal::new(1.3, 0.7).map_err(|e| distribution_error("size", e))?;
    let pages_dist: Normal<f64> = Normal::new(30.0, 30.0).map_err(|e| distribution_error("pages", e))?;
    let ratio_dist: Beta<f64> = Beta::new(2.2, 3.5).map_err(|e| distribution_error("image ratio", e))?;
    let dpi_dist: Normal<f64> = Normal::new(220.0, 80.0).map_err(|e| distribution_error("dpi", e))?;
    let image_kb_dist: LogNormal<f64> =
        LogNormal::new(4.8, 0.6).map_err(|e| distribution_error("image size", e))?;
    let fonts_dist: Normal<f64> = Normal::new(0.75, 0.18).map_err(|e| distribution_error("fonts", e))?;
    let xref_dist: Poisson<f64> = Poisson::new(0.06).map_err(|e| distribution_error("xref", e))?;

    let mut records = Vec::with_capacity(n);
    for _ in 0..n {
        let size_mb: f64 = size_dist.sample(&mut rng);
        let pages = pages_dist.sample(&mut rng).round().clamp(1.0, 1500.0);
        let image_page_ratio = ratio_dist.sample(&mut rng).clamp(0.0, 1.0);
        let dpi_estimate = dpi_dist.sample(&mut rng).round().clamp(72.0, 600.0);
        let avg_image_size_kb = image_kb_dist.sample(&mut rng).clamp(20.0, 5000.0);
        let fonts_embedded_pct = fonts_dist.sample(&mut rng).clamp(0.0, 1.0);
        let xref_error_count: f64 = xref_dist.sample(&mut rng);
        let ocr_required: u8 = rng.random_range(0..=1);
        let producer = pick_producer(rng.random::<f64>());

        let latent = latent_peak_mb(
            size_mb,
            pages,
            image_page_ratio,
            dpi_estimate,
            avg_image_size_kb,
            fonts_embedded_pct,
            xref_error_count,
            f64::from(ocr_required),
            producer,
        );
        let noise_sd = 60.0 + 0.6 * latent.max(1.0).sqrt();
        let z: f64 = rng.sample(StandardNormal);
        let peak_mem_mb = (latent + z * noise_sd).clamp(150.0, 12000.0);

        records.push(TrainingRecord {
            size_mb: round_to(size_mb, 3),
            pages: pages as u32,
            image_page_ratio: round_to(image_page_ratio, 3),
            dpi_estimate: dpi_estimate as u32,
            avg_image_size_kb: round_to(avg_image_size_kb, 1),
            fonts_embedded_pct: round_to(fonts_embedded_pct, 3),
            xref_error_count: xref_error_count as u32,
            ocr_required,
            producer: producer.to_string(),
            peak_mem_mb: round_to(peak_mem_mb, 1),
        });
    }
    Ok(records)
}

/// Map a uniform draw in \[0, 1) onto [`PRODUCER_WEIGHTS`].
fn pick_producer(u: f64) -> &'static str {
    let mut cumulative = 0.0;
    for (name, weight) in PRODUCER_WEIGHTS {
        cumulative += weight;
        if u < cumulative {
            return name;
        }
    }
    PRODUCER_WEIGHTS[PRODUCER_WEIGHTS.len() - 1].0
}
