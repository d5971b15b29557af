//! PDF feature extractor
//!
//! Prints one JSON line with the file path and the nine model features.
//!
//! Usage:
//!   pdf-features input.pdf          # size, pages, producer; placeholders elsewhere
//!   pdf-features input.pdf --deep   # also scan images, fonts and xref

use clap::Parser;
use memspike::extract::{ExtractionConfig, ExtractionMode, FeatureExtractor};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdf-features")]
#[command(about = "Extract model features from a PDF as one JSON line")]
#[command(version)]
struct Args {
    /// PDF to analyze
    file: PathBuf,

    /// Measure images, fonts and cross-reference errors instead of using placeholders
    #[arg(long)]
    deep: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mode = if args.deep {
        ExtractionMode::Deep
    } else {
        ExtractionMode::Minimal
    };
    let extractor = FeatureExtractor::new(ExtractionConfig::new().with_mode(mode));
    let extracted = extractor.extract(&args.file)?;
    println!("{}", serde_json::to_string(&extracted)?);
    Ok(())
}
