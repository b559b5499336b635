//! Integration test: data ingestion stage

mod common;

use autosense::config::{IngestionConfig, RunContext};
use autosense::error::Stage;
use autosense::ingestion::DataIngestion;
use autosense::store::{connect, InMemoryStore, JsonLinesStore};
use autosense::utils::{column_names, DataLoader};
use chrono::{Local, TimeZone};
use common::{vehicle_documents, vehicle_store, COLLECTION, DATABASE};
use std::path::Path;

fn config(root: &Path) -> IngestionConfig {
    let ctx = RunContext::with_artifact_root(root, Local.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
    IngestionConfig::from_context(&ctx)
}

#[test]
fn test_ingestion_splits_100_rows() {
    let dir = tempfile::tempdir().unwrap();
    let store = vehicle_store(100, 7);
    let stage = DataIngestion::new(config(dir.path()), &store);
    let artifact = stage.initiate_data_ingestion().unwrap();

    let loader = DataLoader::new();
    let feature_store = loader.load_csv(&artifact.feature_store_path).unwrap();
    let train = loader.load_csv(&artifact.train_path).unwrap();
    let test = loader.load_csv(&artifact.test_path).unwrap();

    assert_eq!(feature_store.height(), 100);
    assert_eq!(train.height(), 80);
    assert_eq!(test.height(), 20);
    assert_eq!(column_names(&train), stage.config().required_columns);
    assert!(!column_names(&feature_store).contains(&"_id".to_string()));
    assert!(!column_names(&feature_store).contains(&"listing_url".to_string()));
}

#[test]
fn test_ingestion_is_deterministic() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let store = vehicle_store(60, 3);

    let first = DataIngestion::new(config(a.path()), &store).initiate_data_ingestion().unwrap();
    let second = DataIngestion::new(config(b.path()), &store).initiate_data_ingestion().unwrap();

    let loader = DataLoader::new();
    let t1 = loader.load_csv(&first.test_path).unwrap();
    let t2 = loader.load_csv(&second.test_path).unwrap();
    assert!(t1.equals(&t2));
}

#[test]
fn test_missing_required_column_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let docs: Vec<_> = vehicle_documents(20, 1)
        .into_iter()
        .map(|mut d| {
            d.remove("body_type");
            d
        })
        .collect();
    let store = InMemoryStore::new().with_documents(DATABASE, COLLECTION, docs);

    let artifact = DataIngestion::new(config(dir.path()), &store)
        .initiate_data_ingestion()
        .unwrap();
    let train = DataLoader::new().load_csv(&artifact.train_path).unwrap();
    assert!(!column_names(&train).contains(&"body_type".to_string()));
    assert_eq!(train.height() + 4, 20);
}

#[test]
fn test_empty_collection_fails_in_ingestion() {
    let dir = tempfile::tempdir().unwrap();
    let store = InMemoryStore::new();
    let err = DataIngestion::new(config(dir.path()), &store)
        .initiate_data_ingestion()
        .unwrap_err();
    assert_eq!(err.failed_stage(), Some(Stage::Ingestion));
}

#[test]
fn test_ingestion_from_jsonl_store() {
    let dir = tempfile::tempdir().unwrap();
    let store_dir = dir.path().join("store");
    JsonLinesStore::new(&store_dir)
        .insert_many(DATABASE, COLLECTION, &vehicle_documents(25, 11))
        .unwrap();

    let store = connect(&format!("file://{}", store_dir.display())).unwrap();
    assert_eq!(store.name(), "jsonl");
    let artifact = DataIngestion::new(config(&dir.path().join("artifacts")), store.as_ref())
        .initiate_data_ingestion()
        .unwrap();
    let test = DataLoader::new().load_csv(&artifact.test_path).unwrap();
    assert_eq!(test.height(), 5);
}
