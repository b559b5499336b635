//! Integration test: schema checks and drift detection

mod common;

use autosense::config::{RunContext, Schema, ValidationConfig};
use autosense::ingestion::IngestionArtifact;
use autosense::utils::DataSaver;
use autosense::validation::{DataValidation, DriftReport};
use chrono::{Local, TimeZone};
use common::{normal_sample, vehicle_frame};
use polars::prelude::{df, DataFrame, NamedFrom};
use std::path::Path;

fn ctx(root: &Path) -> RunContext {
    RunContext::with_artifact_root(root, Local.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())
}

fn stage(root: &Path, ingestion: IngestionArtifact) -> DataValidation {
    DataValidation::new(
        ValidationConfig::from_context(&ctx(root)),
        ingestion,
        Schema::load_default().unwrap(),
    )
}

fn unused_ingestion() -> IngestionArtifact {
    IngestionArtifact {
        feature_store_path: "unused/data.csv".into(),
        train_path: "unused/train.csv".into(),
        test_path: "unused/test.csv".into(),
    }
}

/// Train is the test split repeated, so every column has identical empirical distributions
fn identical_splits() -> (DataFrame, DataFrame) {
    let test = vehicle_frame(20, 5);
    let mut train = test.clone();
    for _ in 0..3 {
        train = train.vstack(&test).unwrap();
    }
    (train, test)
}

#[test]
fn test_identical_distributions_pass() {
    let dir = tempfile::tempdir().unwrap();
    let (mut train, mut test) = identical_splits();
    let ingestion = IngestionArtifact {
        feature_store_path: dir.path().join("data.csv"),
        train_path: dir.path().join("ingested/train.csv"),
        test_path: dir.path().join("ingested/test.csv"),
    };
    DataSaver::save_csv(&mut train, &ingestion.train_path).unwrap();
    DataSaver::save_csv(&mut test, &ingestion.test_path).unwrap();

    let artifact = stage(dir.path(), ingestion).initiate_data_validation().unwrap();
    assert!(artifact.status);
    assert!(artifact.invalid_train_path.is_none());
    assert!(artifact.invalid_test_path.is_none());
    assert!(artifact.valid_train_path.exists());
    assert!(artifact.valid_test_path.exists());

    let report = DriftReport::load(&artifact.drift_report_path).unwrap();
    assert_eq!(report.columns.len(), 10);
    for (column, drift) in &report.columns {
        assert!(!drift.drift_status, "{} flagged", column);
        assert!(drift.p_value >= 0.05, "{} p={}", column, drift.p_value);
    }
}

#[test]
fn test_report_file_shape() {
    let dir = tempfile::tempdir().unwrap();
    let (mut train, mut test) = identical_splits();
    let ingestion = IngestionArtifact {
        feature_store_path: dir.path().join("data.csv"),
        train_path: dir.path().join("train.csv"),
        test_path: dir.path().join("test.csv"),
    };
    DataSaver::save_csv(&mut train, &ingestion.train_path).unwrap();
    DataSaver::save_csv(&mut test, &ingestion.test_path).unwrap();

    let artifact = stage(dir.path(), ingestion).initiate_data_validation().unwrap();
    let text = std::fs::read_to_string(&artifact.drift_report_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let make = &json["make"];
    assert!(make["p_value"].is_number());
    assert_eq!(make["drift_status"], serde_json::Value::Bool(false));
}

#[test]
fn test_shifted_normal_is_drift() {
    let base = df! { "x" => normal_sample(1000, 0.0, 1) }.unwrap();
    let current = df! { "x" => normal_sample(1000, 5.0, 2) }.unwrap();
    let report = stage(Path::new("unused"), unused_ingestion())
        .detect_dataset_drift(&base, &current)
        .unwrap();
    let x = report.get("x").unwrap();
    assert!(x.drift_status);
    assert!(x.p_value < 0.05);
    assert!(!report.status());
}

#[test]
fn test_same_normal_is_usually_clean() {
    let validation = stage(Path::new("unused"), unused_ingestion());
    let clean = (0..10u64)
        .filter(|seed| {
            let base = df! { "x" => normal_sample(1000, 0.0, seed * 2) }.unwrap();
            let current = df! { "x" => normal_sample(1000, 0.0, seed * 2 + 1) }.unwrap();
            let report = validation.detect_dataset_drift(&base, &current).unwrap();
            report.status()
        })
        .count();
    assert!(clean >= 7, "only {} of 10 seeds were drift free", clean);
}

#[test]
fn test_removing_any_required_column_fails_check() {
    let validation = stage(Path::new("unused"), unused_ingestion());
    let frame = vehicle_frame(10, 2);
    assert!(validation.validate_number_of_columns(&frame));

    for column in Schema::load_default().unwrap().columns {
        let reduced = frame.drop(&column).unwrap();
        assert!(!validation.validate_number_of_columns(&reduced), "{}", column);
    }
}

#[test]
fn test_extra_columns_are_fine() {
    let validation = stage(Path::new("unused"), unused_ingestion());
    let mut frame = vehicle_frame(10, 2);
    frame
        .with_column(polars::prelude::Series::new("color".into(), vec!["red"; 10]))
        .unwrap();
    assert!(validation.validate_number_of_columns(&frame));
}

#[test]
fn test_column_missing_from_current_is_drift() {
    let validation = stage(Path::new("unused"), unused_ingestion());
    let base = df! { "a" => &[1.0, 2.0, 3.0], "b" => &[1.0, 2.0, 3.0] }.unwrap();
    let current = df! { "a" => &[1.0, 2.0, 3.0] }.unwrap();
    let report = validation.detect_dataset_drift(&base, &current).unwrap();
    assert!(!report.get("a").unwrap().drift_status);
    let b = report.get("b").unwrap();
    assert!(b.drift_status);
    assert_eq!(b.p_value, 0.0);
}
