//! AutoSense - vehicle price model training pipeline
//!
//! This crate trains a used-vehicle price regressor from a document store:
//! - Ingestion of store documents into train/test splits
//! - Schema and drift validation with a two-sample KS test
//! - One-hot encoding and standard scaling fit on train only
//! - Training and selection among tree ensembles and linear models
//!
//! # Modules
//!
//! ## Pipeline stages
//! - [`ingestion`] - Store export, feature store snapshot, train/test split
//! - [`validation`] - Column checks and drift report
//! - [`transformation`] - Fitted column transformer and dense arrays
//! - [`training`] - Candidate regressors and model selection
//! - [`pipeline`] - Orchestrator and model promotion
//!
//! ## Building blocks
//! - [`config`] - Run context, per-stage configs, environment, schema
//! - [`store`] - Document store backends
//! - [`drift`] - Drift detectors
//! - [`preprocessing`] - Encoder, scaler, column transformer
//! - [`tracking`] - Experiment tracking
//! - [`utils`] - Frame I/O and artifact serialization
//!
//! ## Services
//! - [`serving`] - Single-record prediction
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Configuration and I/O
pub mod config;
pub mod store;
pub mod utils;

// Pipeline stages
pub mod ingestion;
pub mod validation;
pub mod transformation;
pub mod training;
pub mod pipeline;

// Core ML modules
pub mod drift;
pub mod preprocessing;
pub mod tracking;

// Services
pub mod serving;
pub mod cli;

pub use error::{AutoSenseError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{AutoSenseError, ErrorKind, Result, Stage};

    // Configuration
    pub use crate::config::{
        EnvConfig, IngestionConfig, RunContext, Schema, TrainerConfig, TransformationConfig,
        ValidationConfig,
    };

    // Stores
    pub use crate::store::{connect, Document, DocumentStore, InMemoryStore, JsonLinesStore};

    // Stages
    pub use crate::ingestion::{DataIngestion, IngestionArtifact};
    pub use crate::validation::{DataValidation, DriftReport, ValidationArtifact};
    pub use crate::transformation::{DataTransformation, TransformationArtifact};
    pub use crate::training::{ModelTrainer, ModelTrainerArtifact, RegressionMetrics, Regressor, TrainedModel};
    pub use crate::pipeline::{PipelineOutcome, TrainingPipeline};

    // Preprocessing
    pub use crate::preprocessing::{ColumnTransformer, OneHotEncoder, StandardScaler};

    // Drift detection
    pub use crate::drift::{DriftDetector, DriftResult, KolmogorovSmirnovTest};

    // Experiment tracking
    pub use crate::tracking::{CandidateRecord, ExperimentTracker, LocalTracker, NoopTracker};

    // Serving
    pub use crate::serving::{PredictionResponse, Predictor};
}
