//! Per-stage configuration, derived once from the run context

use super::constants::*;
use super::RunContext;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn to_strings(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

/// Configuration for data ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    pub ingestion_dir: PathBuf,
    /// Canonical snapshot of the projected frame
    pub feature_store_path: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    /// Fraction of rows held out for test
    pub split_ratio: f64,
    pub random_seed: u64,
    pub database_name: String,
    pub collection_name: String,
    pub required_columns: Vec<String>,
}

impl IngestionConfig {
    pub fn from_context(ctx: &RunContext) -> Self {
        let ingestion_dir = ctx.stage_dir(DATA_INGESTION_DIR_NAME);
        Self {
            feature_store_path: ingestion_dir.join(DATA_INGESTION_FEATURE_STORE_DIR).join(FILE_NAME),
            train_path: ingestion_dir.join(DATA_INGESTION_INGESTED_DIR).join(TRAIN_FILE_NAME),
            test_path: ingestion_dir.join(DATA_INGESTION_INGESTED_DIR).join(TEST_FILE_NAME),
            ingestion_dir,
            split_ratio: DATA_INGESTION_TRAIN_TEST_SPLIT_RATIO,
            random_seed: DATA_INGESTION_RANDOM_SEED,
            database_name: DATA_INGESTION_DATABASE_NAME.to_string(),
            collection_name: DATA_INGESTION_COLLECTION_NAME.to_string(),
            required_columns: to_strings(REQUIRED_COLUMNS),
        }
    }

    pub fn with_split_ratio(mut self, ratio: f64) -> Self {
        self.split_ratio = ratio;
        self
    }

    pub fn with_source(mut self, database: impl Into<String>, collection: impl Into<String>) -> Self {
        self.database_name = database.into();
        self.collection_name = collection.into();
        self
    }

    pub fn with_required_columns(mut self, columns: Vec<String>) -> Self {
        self.required_columns = columns;
        self
    }
}

/// Configuration for data validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub validation_dir: PathBuf,
    pub valid_train_path: PathBuf,
    pub valid_test_path: PathBuf,
    /// Reserved for quarantined rows, never written
    pub invalid_train_path: PathBuf,
    /// Reserved for quarantined rows, never written
    pub invalid_test_path: PathBuf,
    pub drift_report_path: PathBuf,
    /// p-values below this flag a column as drifted
    pub drift_threshold: f64,
}

impl ValidationConfig {
    pub fn from_context(ctx: &RunContext) -> Self {
        let validation_dir = ctx.stage_dir(DATA_VALIDATION_DIR_NAME);
        let valid_dir = validation_dir.join(DATA_VALIDATION_VALID_DIR);
        let invalid_dir = validation_dir.join(DATA_VALIDATION_INVALID_DIR);
        Self {
            valid_train_path: valid_dir.join(TRAIN_FILE_NAME),
            valid_test_path: valid_dir.join(TEST_FILE_NAME),
            invalid_train_path: invalid_dir.join(TRAIN_FILE_NAME),
            invalid_test_path: invalid_dir.join(TEST_FILE_NAME),
            drift_report_path: validation_dir
                .join(DATA_VALIDATION_DRIFT_REPORT_DIR)
                .join(DATA_VALIDATION_DRIFT_REPORT_FILE_NAME),
            validation_dir,
            drift_threshold: DATA_VALIDATION_DRIFT_THRESHOLD,
        }
    }

    pub fn with_drift_threshold(mut self, threshold: f64) -> Self {
        self.drift_threshold = threshold;
        self
    }
}

/// Configuration for feature transformation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationConfig {
    pub transformation_dir: PathBuf,
    pub transformed_train_path: PathBuf,
    pub transformed_test_path: PathBuf,
    pub transformed_object_path: PathBuf,
    pub scaler_object_path: PathBuf,
    pub target_column: String,
    pub categorical_columns: Vec<String>,
    pub numeric_columns: Vec<String>,
}

impl TransformationConfig {
    pub fn from_context(ctx: &RunContext) -> Self {
        let transformation_dir = ctx.stage_dir(DATA_TRANSFORMATION_DIR_NAME);
        let data_dir = transformation_dir.join(DATA_TRANSFORMATION_TRANSFORMED_DATA_DIR);
        let object_dir = transformation_dir.join(DATA_TRANSFORMATION_TRANSFORMED_OBJECT_DIR);
        Self {
            transformed_train_path: data_dir.join(TRAIN_ARRAY_FILE_NAME),
            transformed_test_path: data_dir.join(TEST_ARRAY_FILE_NAME),
            transformed_object_path: object_dir.join(PREPROCESSING_OBJECT_FILE_NAME),
            scaler_object_path: object_dir.join(SCALER_OBJECT_FILE_NAME),
            transformation_dir,
            target_column: TARGET_COLUMN.to_string(),
            categorical_columns: to_strings(CATEGORICAL_COLUMNS),
            numeric_columns: to_strings(NUMERIC_COLUMNS),
        }
    }

    /// Override the categorical/numeric partition
    pub fn with_columns(mut self, categorical: Vec<String>, numeric: Vec<String>) -> Self {
        self.categorical_columns = categorical;
        self.numeric_columns = numeric;
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_column = target.into();
        self
    }
}

/// Configuration for candidate training and selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub trainer_dir: PathBuf,
    pub trained_model_path: PathBuf,
    /// Where trackers that persist artifacts keep candidate models
    pub candidates_dir: PathBuf,
    pub experiments_path: PathBuf,
    /// Advisory minimum test R²
    pub expected_score: f64,
    /// Advisory maximum |train R² - test R²|
    pub fitting_threshold: f64,
}

impl TrainerConfig {
    pub fn from_context(ctx: &RunContext) -> Self {
        let trainer_dir = ctx.stage_dir(MODEL_TRAINER_DIR_NAME);
        Self {
            trained_model_path: trainer_dir.join(MODEL_TRAINER_TRAINED_MODEL_DIR).join(MODEL_FILE_NAME),
            candidates_dir: trainer_dir.join(MODEL_TRAINER_CANDIDATES_DIR),
            experiments_path: trainer_dir.join(MODEL_TRAINER_EXPERIMENTS_FILE_NAME),
            trainer_dir,
            expected_score: MODEL_TRAINER_EXPECTED_SCORE,
            fitting_threshold: MODEL_TRAINER_OVER_FITTING_UNDER_FITTING_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn ctx() -> RunContext {
        RunContext::with_artifact_root("artifacts", Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap())
    }

    #[test]
    fn test_ingestion_paths() {
        let cfg = IngestionConfig::from_context(&ctx());
        assert_eq!(
            cfg.train_path,
            PathBuf::from("artifacts/01_02_2025_03_04_05/data_ingestion/ingested/train.csv")
        );
        assert_eq!(
            cfg.feature_store_path,
            PathBuf::from("artifacts/01_02_2025_03_04_05/data_ingestion/feature_store/data.csv")
        );
        assert_eq!(cfg.random_seed, 42);
        assert!(cfg.required_columns.contains(&TARGET_COLUMN.to_string()));
    }

    #[test]
    fn test_every_stage_lives_under_run_dir() {
        let c = ctx();
        let v = ValidationConfig::from_context(&c);
        let t = TransformationConfig::from_context(&c);
        let m = TrainerConfig::from_context(&c);
        for p in [
            &v.valid_train_path,
            &v.drift_report_path,
            &t.transformed_object_path,
            &t.scaler_object_path,
            &m.trained_model_path,
        ] {
            assert!(p.starts_with(&c.artifact_dir), "{:?}", p);
        }
        assert_eq!(t.scaler_object_path.parent(), t.transformed_object_path.parent());
    }
}
