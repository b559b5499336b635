//! Error types for the AutoSense training pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for AutoSense operations
pub type Result<T> = std::result::Result<T, AutoSenseError>;

/// Pipeline stage that raised an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    RunContext,
    Ingestion,
    Validation,
    Transformation,
    Training,
    Promotion,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::RunContext => "run_context",
            Stage::Ingestion => "data_ingestion",
            Stage::Validation => "data_validation",
            Stage::Transformation => "data_transformation",
            Stage::Training => "model_trainer",
            Stage::Promotion => "promotion",
        };
        f.write_str(name)
    }
}

/// Failure category callers can match on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid configuration, fatal at startup
    Config,
    /// Empty or malformed input to a stage
    Data,
    /// Filesystem or document store access failure
    Io,
    /// Fitting or scoring failure
    Model,
}

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum AutoSenseError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Document store error: {0}")]
    StoreError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<AutoSenseError>,
    },
}

impl AutoSenseError {
    /// Tag an error with the stage it escaped from
    pub fn stage(stage: Stage, source: AutoSenseError) -> Self {
        match source {
            // already tagged by an inner stage call, keep the innermost context
            tagged @ AutoSenseError::Stage { .. } => tagged,
            other => AutoSenseError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Failure category
    pub fn kind(&self) -> ErrorKind {
        match self {
            AutoSenseError::ConfigError(_) | AutoSenseError::InvalidParameter { .. } => {
                ErrorKind::Config
            }
            AutoSenseError::DataError(_)
            | AutoSenseError::ShapeError { .. }
            | AutoSenseError::FeatureNotFound(_)
            | AutoSenseError::ValidationError(_) => ErrorKind::Data,
            AutoSenseError::IoError(_)
            | AutoSenseError::StoreError(_)
            | AutoSenseError::SerializationError(_) => ErrorKind::Io,
            AutoSenseError::ModelNotFitted | AutoSenseError::TrainingError(_) => ErrorKind::Model,
            AutoSenseError::Stage { source, .. } => source.kind(),
        }
    }

    /// Stage the error was raised in, if it has been tagged
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            AutoSenseError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<polars::error::PolarsError> for AutoSenseError {
    fn from(err: polars::error::PolarsError) -> Self {
        match err {
            polars::error::PolarsError::IO { error, .. } => {
                AutoSenseError::IoError(std::io::Error::new(error.kind(), error.to_string()))
            }
            other => AutoSenseError::DataError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AutoSenseError {
    fn from(err: serde_json::Error) -> Self {
        AutoSenseError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for AutoSenseError {
    fn from(err: bincode::Error) -> Self {
        AutoSenseError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for AutoSenseError {
    fn from(err: ndarray::ShapeError) -> Self {
        AutoSenseError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AutoSenseError::DataError("nothing to split".to_string());
        assert_eq!(err.to_string(), "Data error: nothing to split");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AutoSenseError = io_err.into();
        assert!(matches!(err, AutoSenseError::IoError(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_polars_io_stays_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AutoSenseError = polars::error::PolarsError::from(io_err).into();
        assert_eq!(err.kind(), ErrorKind::Io);

        let err: AutoSenseError =
            polars::error::PolarsError::ColumnNotFound("price".into()).into();
        assert_eq!(err.kind(), ErrorKind::Data);
    }

    #[test]
    fn test_stage_wrapping_keeps_kind() {
        let err = AutoSenseError::stage(
            Stage::Ingestion,
            AutoSenseError::DataError("empty frame".to_string()),
        );
        assert_eq!(err.kind(), ErrorKind::Data);
        assert_eq!(err.failed_stage(), Some(Stage::Ingestion));
        assert_eq!(err.to_string(), "data_ingestion failed: Data error: empty frame");
    }

    #[test]
    fn test_stage_wrapping_is_not_nested() {
        let inner = AutoSenseError::stage(Stage::Training, AutoSenseError::ModelNotFitted);
        let outer = AutoSenseError::stage(Stage::Promotion, inner);
        assert_eq!(outer.failed_stage(), Some(Stage::Training));
        assert_eq!(outer.kind(), ErrorKind::Model);
    }
}
