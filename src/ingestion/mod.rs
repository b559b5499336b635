//! Data ingestion stage
//!
//! Pulls every document of the configured collection, coerces them into a
//! frame, projects the required columns, writes the feature-store snapshot
//! and a seeded train/test split.

use crate::config::constants::{MISSING_VALUE_TOKEN, STORE_ID_FIELD};
use crate::config::IngestionConfig;
use crate::error::{AutoSenseError, Result, Stage};
use crate::store::{Document, DocumentStore};
use crate::utils::{column_names, DataSaver};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Paths written by ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionArtifact {
    pub feature_store_path: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

/// Ingestion stage bound to a caller-owned store handle
pub struct DataIngestion<'a> {
    config: IngestionConfig,
    store: &'a dyn DocumentStore,
}

impl<'a> DataIngestion<'a> {
    pub fn new(config: IngestionConfig, store: &'a dyn DocumentStore) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    /// Fetch the collection as a frame, without the store id column
    pub fn export_collection_as_frame(&self) -> Result<DataFrame> {
        let docs = self
            .store
            .fetch_all(&self.config.database_name, &self.config.collection_name)?;
        info!(
            store = self.store.name(),
            database = %self.config.database_name,
            collection = %self.config.collection_name,
            documents = docs.len(),
            "Fetched documents"
        );
        documents_to_frame(&docs)
    }

    /// Keep the required columns that are present, in required order
    pub fn project_required(&self, df: &DataFrame) -> Result<DataFrame> {
        let present = column_names(df);
        let (keep, missing): (Vec<&String>, Vec<&String>) = self
            .config
            .required_columns
            .iter()
            .partition(|c| present.contains(*c));

        if !missing.is_empty() {
            warn!(?missing, "Required columns absent from store, continuing without them");
        }
        Ok(df.select(keep.iter().map(|c| c.as_str()))?)
    }

    /// Write the canonical snapshot
    pub fn export_to_feature_store(&self, df: &mut DataFrame) -> Result<()> {
        DataSaver::save_csv(df, &self.config.feature_store_path)?;
        info!(
            path = %self.config.feature_store_path.display(),
            rows = df.height(),
            "Exported feature store"
        );
        Ok(())
    }

    /// Split with the configured ratio and seed, then write both halves
    pub fn split_and_save(&self, df: &DataFrame) -> Result<(DataFrame, DataFrame)> {
        let (mut train, mut test) = train_test_split(df, self.config.split_ratio, self.config.random_seed)?;
        DataSaver::save_csv(&mut train, &self.config.train_path)?;
        DataSaver::save_csv(&mut test, &self.config.test_path)?;
        info!(train_rows = train.height(), test_rows = test.height(), "Performed train/test split");
        Ok((train, test))
    }

    fn run(&self) -> Result<IngestionArtifact> {
        let df = self.export_collection_as_frame()?;
        let mut projected = self.project_required(&df)?;
        self.export_to_feature_store(&mut projected)?;
        self.split_and_save(&projected)?;

        Ok(IngestionArtifact {
            feature_store_path: self.config.feature_store_path.clone(),
            train_path: self.config.train_path.clone(),
            test_path: self.config.test_path.clone(),
        })
    }

    /// Run the whole stage
    pub fn initiate_data_ingestion(&self) -> Result<IngestionArtifact> {
        info!("Starting data ingestion");
        self.run().map_err(|e| {
            error!(error = %e, "Data ingestion failed");
            AutoSenseError::stage(Stage::Ingestion, e)
        })
    }
}

/// Shuffle rows with a seeded ChaCha permutation; `ceil(n * ratio)` rows go to test
pub fn train_test_split(df: &DataFrame, ratio: f64, seed: u64) -> Result<(DataFrame, DataFrame)> {
    if !(ratio > 0.0 && ratio < 1.0) {
        return Err(AutoSenseError::InvalidParameter {
            name: "split_ratio".to_string(),
            value: ratio.to_string(),
            reason: "must be strictly between 0 and 1".to_string(),
        });
    }

    let n = df.height();
    if n == 0 {
        return Err(AutoSenseError::DataError("cannot split an empty frame".to_string()));
    }

    let n_test = (n as f64 * ratio).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(AutoSenseError::DataError(format!(
            "{} rows cannot be split with ratio {}",
            n, ratio
        )));
    }

    let mut indices: Vec<IdxSize> = (0..n as IdxSize).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_idx = IdxCa::from_vec("idx".into(), indices[..n_test].to_vec());
    let train_idx = IdxCa::from_vec("idx".into(), indices[n_test..].to_vec());
    Ok((df.take(&train_idx)?, df.take(&test_idx)?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InferredType {
    Int,
    Float,
    Bool,
    Text,
}

fn normalize(value: Option<&Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s == MISSING_VALUE_TOKEN => None,
        Some(v) => Some(v),
    }
}

fn infer_type(values: &[Option<&Value>]) -> InferredType {
    let present: Vec<&Value> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        InferredType::Text
    } else if present.iter().all(|v| v.as_i64().is_some()) {
        InferredType::Int
    } else if present.iter().all(|v| v.is_number()) {
        InferredType::Float
    } else if present.iter().all(|v| v.is_boolean()) {
        InferredType::Bool
    } else {
        InferredType::Text
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce documents into a frame.
///
/// Columns appear in first-seen key order and the store id is dropped.
/// The missing-value token and JSON nulls become nulls before per-column
/// type inference.
pub fn documents_to_frame(docs: &[Document]) -> Result<DataFrame> {
    let mut names: Vec<&str> = Vec::new();
    for doc in docs {
        for key in doc.keys() {
            if key != STORE_ID_FIELD && !names.contains(&key.as_str()) {
                names.push(key.as_str());
            }
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(names.len());
    for name in names {
        let values: Vec<Option<&Value>> = docs.iter().map(|d| normalize(d.get(name))).collect();
        let series = match infer_type(&values) {
            InferredType::Int => {
                let v: Vec<Option<i64>> = values.iter().map(|v| v.and_then(Value::as_i64)).collect();
                Series::new(name.into(), v)
            }
            InferredType::Float => {
                let v: Vec<Option<f64>> = values.iter().map(|v| v.and_then(Value::as_f64)).collect();
                Series::new(name.into(), v)
            }
            InferredType::Bool => {
                let v: Vec<Option<bool>> = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
                Series::new(name.into(), v)
            }
            InferredType::Text => {
                let v: Vec<Option<String>> = values.iter().map(|v| v.map(to_text)).collect();
                Series::new(name.into(), v)
            }
        };
        columns.push(series.into());
    }

    Ok(DataFrame::new(columns)?)
}
