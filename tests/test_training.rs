//! Integration tests for full training runs.

use memspike::model::Pipeline;
use memspike::training::{self, dataset, synth, DataSource, TrainingConfig};
use memspike::RegressorParams;
use serde_json::Value;
use std::path::PathBuf;

fn quick_config(out_dir: PathBuf) -> TrainingConfig {
    TrainingConfig {
        out_dir,
        rows: 600,
        params: RegressorParams {
            n_estimators: 30,
            ..RegressorParams::default()
        },
        ..TrainingConfig::default()
    }
}

#[test]
fn test_synthetic_run_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("models");
    let report = training::run(&quick_config(out_dir.clone())).unwrap();

    assert_eq!(report.source, DataSource::Synthetic { rows: 600, seed: 42 });
    for path in [
        &report.paths.pipeline,
        &report.paths.metrics,
        &report.paths.manifest,
        &report.paths.sample,
    ] {
        assert!(path.is_file(), "{} missing", path.display());
        assert!(path.starts_with(&out_dir));
    }
    assert!(report.smoke_prediction_mb.is_finite());

    let metrics: Value = serde_json::from_str(&std::fs::read_to_string(&report.paths.metrics).unwrap()).unwrap();
    for key in ["mae", "rmse", "r2", "mape_pct", "n_train", "n_test", "seed"] {
        assert!(metrics.get(key).is_some(), "metrics.json lacks {}", key);
    }
    assert_eq!(metrics["n_test"], 120);
    assert_eq!(metrics["n_train"], 480);
    assert_eq!(metrics["seed"], 42);

    let manifest: Value =
        serde_json::from_str(&std::fs::read_to_string(&report.paths.manifest).unwrap()).unwrap();
    assert!(manifest["created_at"].as_str().unwrap().ends_with('Z'));
    assert_eq!(manifest["features"].as_array().unwrap().len(), 9);
    assert_eq!(manifest["metrics"], metrics);

    let sample = dataset::load_csv(&report.paths.sample).unwrap();
    assert_eq!(sample.len(), 500);
}

#[test]
fn test_saved_pipeline_scores_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let report = training::run(&quick_config(dir.path().to_path_buf())).unwrap();

    let pipeline = Pipeline::load(&report.paths.pipeline).unwrap();
    let names = pipeline.feature_names_out();
    assert!(names.iter().any(|n| n == "cat__producer_Scanner"));
    assert_eq!(names.last().map(String::as_str), Some("num__ocr_required"));

    let light = synth::synthesize(1, 1).unwrap()[0].features();
    assert!(pipeline.predict(&light).is_finite());
}

#[test]
fn test_run_from_csv_with_label_alias() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("labels.csv");

    let records = synth::synthesize(150, 9).unwrap();
    let mut writer = csv::Writer::from_path(&csv_path).unwrap();
    writer
        .write_record([
            "size_mb",
            "pages",
            "image_page_ratio",
            "dpi_estimate",
            "avg_image_size_kb",
            "fonts_embedded_pct",
            "xref_error_count",
            "ocr_required",
            "producer",
            "label_mb",
        ])
        .unwrap();
    for r in &records {
        writer
            .write_record([
                r.size_mb.to_string(),
                r.pages.to_string(),
                r.image_page_ratio.to_string(),
                r.dpi_estimate.to_string(),
                r.avg_image_size_kb.to_string(),
                r.fonts_embedded_pct.to_string(),
                r.xref_error_count.to_string(),
                r.ocr_required.to_string(),
                r.producer.clone(),
                r.peak_mem_mb.to_string(),
            ])
            .unwrap();
    }
    writer.flush().unwrap();
    drop(writer);

    let config = TrainingConfig {
        data: Some(csv_path.clone()),
        ..quick_config(dir.path().join("out"))
    };
    let report = training::run(&config).unwrap();
    assert_eq!(report.source, DataSource::Csv(csv_path.display().to_string()));
    assert_eq!(report.metrics.n_train + report.metrics.n_test, 150);
    assert_eq!(dataset::load_csv(&report.paths.sample).unwrap().len(), 150);
}

#[test]
fn test_missing_csv_falls_back_to_synthetic() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainingConfig {
        data: Some(dir.path().join("absent.csv")),
        rows: 200,
        ..quick_config(dir.path().join("out"))
    };
    let report = training::run(&config).unwrap();
    assert_eq!(report.source, DataSource::Synthetic { rows: 200, seed: 42 });
}

#[test]
fn test_same_seed_same_metrics() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let first = training::run(&quick_config(a.path().to_path_buf())).unwrap();
    let second = training::run(&quick_config(b.path().to_path_buf())).unwrap();
    assert_eq!(first.metrics, second.metrics);
}
