//! Model trainer
//!
//! Fits the peak-memory pipeline on a labeled CSV (or a synthesized dataset
//! when none is given) and writes `pipeline.json`, `metrics.json`,
//! `model_manifest.json` and `sample_data.csv` to the output directory.
//!
//! Usage:
//!   memspike-train [--data labels.csv] [--out-dir ./models] [--seed 42]

use clap::Parser;
use env_logger::Env;
use memspike::training::{self, TrainingConfig};
use memspike::RegressorParams;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "memspike-train")]
#[command(about = "Train the PDF peak-memory regression pipeline")]
#[command(version)]
struct Args {
    /// Labeled CSV; a synthetic dataset is generated when absent or missing
    #[arg(long)]
    data: Option<PathBuf>,

    /// Directory receiving the artifacts
    #[arg(long, default_value = "./models")]
    out_dir: PathBuf,

    /// Seed for data generation and the train/test split
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Rows to synthesize when no dataset is given
    #[arg(long, default_value_t = 7000)]
    rows: usize,

    /// Number of boosting rounds
    #[arg(long, default_value_t = 100)]
    n_estimators: usize,

    /// Maximum tree depth
    #[arg(long, default_value_t = 3)]
    max_depth: u32,

    /// Shrinkage per round
    #[arg(long, default_value_t = 0.1)]
    learning_rate: f32,

    /// Holdout fraction
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = TrainingConfig {
        data: args.data,
        out_dir: args.out_dir,
        seed: args.seed,
        rows: args.rows,
        test_size: args.test_size,
        params: RegressorParams {
            n_estimators: args.n_estimators,
            max_depth: args.max_depth,
            learning_rate: args.learning_rate,
            ..RegressorParams::default()
        },
    };

    let report = training::run(&config)?;

    println!("Saved:");
    println!("  {}", report.paths.pipeline.display());
    println!("  {}", report.paths.metrics.display());
    println!("  {}", report.paths.manifest.display());
    println!("  {}", report.paths.sample.display());
    println!("Metrics: {}", serde_json::to_string_pretty(&report.metrics)?);
    println!(
        "Smoke test: OK (predicted {:.1} MB on a 1-row sample)",
        report.smoke_prediction_mb
    );
    Ok(())
}
