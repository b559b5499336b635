//! Fixed names and defaults shared by every run

pub const PIPELINE_NAME: &str = "autosense";
pub const ARTIFACT_DIR: &str = "artifacts";
pub const FINAL_MODEL_DIR: &str = "final_model";
pub const TIMESTAMP_FORMAT: &str = "%m_%d_%Y_%H_%M_%S";

pub const FILE_NAME: &str = "data.csv";
pub const TRAIN_FILE_NAME: &str = "train.csv";
pub const TEST_FILE_NAME: &str = "test.csv";
pub const TRAIN_ARRAY_FILE_NAME: &str = "train.bin";
pub const TEST_ARRAY_FILE_NAME: &str = "test.bin";
pub const PIPELINE_SUMMARY_FILE_NAME: &str = "pipeline_summary.json";

pub const TARGET_COLUMN: &str = "price";

/// Columns projected out of the raw store documents
pub const REQUIRED_COLUMNS: &[&str] = &[
    "make",
    "mileage",
    "year",
    "engine_hp",
    "vehicle_age",
    "transmission",
    "fuel_type",
    "drivetrain",
    "body_type",
    TARGET_COLUMN,
];

pub const CATEGORICAL_COLUMNS: &[&str] = &["transmission", "fuel_type", "drivetrain", "body_type", "make"];
pub const NUMERIC_COLUMNS: &[&str] = &["mileage", "year", "engine_hp", "vehicle_age"];

// Ingestion
pub const DATA_INGESTION_DIR_NAME: &str = "data_ingestion";
pub const DATA_INGESTION_FEATURE_STORE_DIR: &str = "feature_store";
pub const DATA_INGESTION_INGESTED_DIR: &str = "ingested";
pub const DATA_INGESTION_DATABASE_NAME: &str = "AutoSense";
pub const DATA_INGESTION_COLLECTION_NAME: &str = "data";
pub const DATA_INGESTION_TRAIN_TEST_SPLIT_RATIO: f64 = 0.2;
pub const DATA_INGESTION_RANDOM_SEED: u64 = 42;
/// Store-internal identifier dropped after fetching
pub const STORE_ID_FIELD: &str = "_id";
/// Sentinel token normalized to null
pub const MISSING_VALUE_TOKEN: &str = "na";

// Validation
pub const DATA_VALIDATION_DIR_NAME: &str = "data_validation";
pub const DATA_VALIDATION_VALID_DIR: &str = "validated";
pub const DATA_VALIDATION_INVALID_DIR: &str = "invalid";
pub const DATA_VALIDATION_DRIFT_REPORT_DIR: &str = "drift_report";
pub const DATA_VALIDATION_DRIFT_REPORT_FILE_NAME: &str = "report.json";
pub const DATA_VALIDATION_DRIFT_THRESHOLD: f64 = 0.05;

// Transformation
pub const DATA_TRANSFORMATION_DIR_NAME: &str = "data_transformation";
pub const DATA_TRANSFORMATION_TRANSFORMED_DATA_DIR: &str = "transformed";
pub const DATA_TRANSFORMATION_TRANSFORMED_OBJECT_DIR: &str = "transformed_object";
pub const PREPROCESSING_OBJECT_FILE_NAME: &str = "preprocessing.bin";
pub const SCALER_OBJECT_FILE_NAME: &str = "scaler.bin";

// Model trainer
pub const MODEL_TRAINER_DIR_NAME: &str = "model_trainer";
pub const MODEL_TRAINER_TRAINED_MODEL_DIR: &str = "trained_model";
pub const MODEL_TRAINER_CANDIDATES_DIR: &str = "candidates";
pub const MODEL_FILE_NAME: &str = "model.bin";
pub const MODEL_TRAINER_EXPERIMENTS_FILE_NAME: &str = "experiments.json";
pub const MODEL_TRAINER_EXPECTED_SCORE: f64 = 0.6;
pub const MODEL_TRAINER_OVER_FITTING_UNDER_FITTING_THRESHOLD: f64 = 0.05;

// Environment
pub const ENV_MONGODB_URL: &str = "MONGODB_URL";
pub const ENV_DATABASE: &str = "AUTOSENSE_DATABASE";
pub const ENV_COLLECTION: &str = "AUTOSENSE_COLLECTION";
pub const ENV_ARTIFACT_ROOT: &str = "AUTOSENSE_ARTIFACT_ROOT";
