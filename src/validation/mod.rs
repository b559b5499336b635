//! Data validation stage
//!
//! Observational only: checks the splits against the schema, runs a
//! per-column KS test between train and test, writes the drift report and
//! passes both splits through unchanged.

use crate::config::{Schema, ValidationConfig};
use crate::drift::{ordinal_ranks, DriftDetector, KolmogorovSmirnovTest};
use crate::error::{AutoSenseError, Result, Stage};
use crate::ingestion::IngestionArtifact;
use crate::utils::{column_f64, column_names, column_str, DataLoader, DataSaver};
use indexmap::IndexMap;
use ndarray::Array1;
use polars::prelude::{DataFrame, DataType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Drift outcome for one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnDrift {
    pub p_value: f64,
    pub drift_status: bool,
}

/// Per-column drift, in base frame column order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriftReport {
    pub columns: IndexMap<String, ColumnDrift>,
}

impl DriftReport {
    /// True when no column drifted
    pub fn status(&self) -> bool {
        self.columns.values().all(|c| !c.drift_status)
    }

    pub fn drifted_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, c)| c.drift_status)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn get(&self, column: &str) -> Option<&ColumnDrift> {
        self.columns.get(column)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

/// Paths and status produced by validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationArtifact {
    /// False when any column drifted
    pub status: bool,
    pub valid_train_path: PathBuf,
    pub valid_test_path: PathBuf,
    /// Never populated: rows are not quarantined
    pub invalid_train_path: Option<PathBuf>,
    /// Never populated: rows are not quarantined
    pub invalid_test_path: Option<PathBuf>,
    pub drift_report_path: PathBuf,
}

/// Validation stage
pub struct DataValidation {
    config: ValidationConfig,
    ingestion: IngestionArtifact,
    schema: Schema,
    detector: KolmogorovSmirnovTest,
}

impl DataValidation {
    pub fn new(config: ValidationConfig, ingestion: IngestionArtifact, schema: Schema) -> Self {
        let detector = KolmogorovSmirnovTest::new(config.drift_threshold);
        Self {
            config,
            ingestion,
            schema,
            detector,
        }
    }

    /// True iff every schema column is present. Gaps are logged, not raised.
    pub fn validate_number_of_columns(&self, df: &DataFrame) -> bool {
        let present = column_names(df);
        let missing = self.schema.missing_columns(&present);
        if missing.is_empty() {
            true
        } else {
            warn!(?missing, "Schema columns missing from frame");
            false
        }
    }

    /// KS test for every column of `base` against the same column of `current`
    pub fn detect_dataset_drift(&self, base: &DataFrame, current: &DataFrame) -> Result<DriftReport> {
        let current_names = column_names(current);
        let mut report = DriftReport::default();

        for name in column_names(base) {
            let entry = if !current_names.contains(&name) {
                warn!(column = %name, "Column missing from current frame, marking as drifted");
                ColumnDrift {
                    p_value: 0.0,
                    drift_status: true,
                }
            } else {
                self.column_drift(base, current, &name)?
            };
            report.columns.insert(name, entry);
        }

        let drifted = report.drifted_columns();
        if drifted.is_empty() {
            info!(columns = report.columns.len(), "No dataset drift detected");
        } else {
            warn!(?drifted, "Dataset drift detected");
        }
        Ok(report)
    }

    fn column_drift(&self, base: &DataFrame, current: &DataFrame, name: &str) -> Result<ColumnDrift> {
        let categorical = matches!(base.column(name)?.dtype(), DataType::String);
        let (a, b) = if categorical {
            let a: Vec<String> = column_str(base, name)?.into_iter().flatten().collect();
            let b: Vec<String> = column_str(current, name)?.into_iter().flatten().collect();
            ordinal_ranks(&a, &b)
        } else {
            let a: Vec<f64> = column_f64(base, name)?.into_iter().flatten().collect();
            let b: Vec<f64> = column_f64(current, name)?.into_iter().flatten().collect();
            (a, b)
        };

        if a.is_empty() || b.is_empty() {
            warn!(column = %name, "No values to compare, skipping drift test");
            return Ok(ColumnDrift {
                p_value: 1.0,
                drift_status: false,
            });
        }

        let result = self.detector.detect(&Array1::from(a), &Array1::from(b))?;
        let p_value = result.p_value.unwrap_or(1.0);
        Ok(ColumnDrift {
            p_value,
            drift_status: result.drift_detected,
        })
    }

    fn run(&self) -> Result<ValidationArtifact> {
        let loader = DataLoader::new();
        let mut train = loader.load_csv(&self.ingestion.train_path)?;
        let mut test = loader.load_csv(&self.ingestion.test_path)?;

        if !self.validate_number_of_columns(&train) {
            warn!("Train split does not contain all schema columns");
        }
        if !self.validate_number_of_columns(&test) {
            warn!("Test split does not contain all schema columns");
        }

        let report = self.detect_dataset_drift(&train, &test)?;
        report.save(&self.config.drift_report_path)?;

        DataSaver::save_csv(&mut train, &self.config.valid_train_path)?;
        DataSaver::save_csv(&mut test, &self.config.valid_test_path)?;

        Ok(ValidationArtifact {
            status: report.status(),
            valid_train_path: self.config.valid_train_path.clone(),
            valid_test_path: self.config.valid_test_path.clone(),
            invalid_train_path: None,
            invalid_test_path: None,
            drift_report_path: self.config.drift_report_path.clone(),
        })
    }

    /// Run the whole stage
    pub fn initiate_data_validation(&self) -> Result<ValidationArtifact> {
        info!("Starting data validation");
        let artifact = self.run().map_err(|e| {
            error!(error = %e, "Data validation failed");
            AutoSenseError::stage(Stage::Validation, e)
        })?;
        info!(status = artifact.status, "Data validation completed");
        Ok(artifact)
    }
}
