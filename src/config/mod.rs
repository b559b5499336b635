//! Run configuration
//!
//! A [`RunContext`] names one pipeline invocation. Every stage config is a
//! pure function of it, so all artifacts of a run live under
//! `<artifact_root>/<timestamp>/`.

pub mod constants;
mod env;
mod schema;
mod stages;

pub use env::EnvConfig;
pub use schema::Schema;
pub use stages::{IngestionConfig, TrainerConfig, TransformationConfig, ValidationConfig};

use crate::error::{AutoSenseError, Result, Stage};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Versioned namespace for a single pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    /// Pipeline name
    pub pipeline_name: String,
    /// Formatted run timestamp
    pub timestamp: String,
    /// Base directory holding every run directory
    pub artifact_root: PathBuf,
    /// Run directory: `artifact_root/timestamp`
    pub artifact_dir: PathBuf,
    /// Directory the winning model is promoted to
    pub model_dir: PathBuf,
}

impl RunContext {
    /// Context for the given wall-clock time under the default artifact root
    pub fn new(timestamp: DateTime<Local>) -> Self {
        Self::with_artifact_root(constants::ARTIFACT_DIR, timestamp)
    }

    /// Context for the current time
    pub fn now() -> Self {
        Self::new(Local::now())
    }

    /// Context rooted at a custom artifact directory
    pub fn with_artifact_root(root: impl Into<PathBuf>, timestamp: DateTime<Local>) -> Self {
        let artifact_root = root.into();
        let timestamp = timestamp.format(constants::TIMESTAMP_FORMAT).to_string();
        Self {
            pipeline_name: constants::PIPELINE_NAME.to_string(),
            artifact_dir: artifact_root.join(&timestamp),
            timestamp,
            artifact_root,
            model_dir: PathBuf::from(constants::FINAL_MODEL_DIR),
        }
    }

    /// Override the promotion directory
    pub fn with_model_dir(mut self, model_dir: impl Into<PathBuf>) -> Self {
        self.model_dir = model_dir.into();
        self
    }

    /// Directory of a stage inside this run
    pub fn stage_dir(&self, stage_dir_name: &str) -> PathBuf {
        self.artifact_dir.join(stage_dir_name)
    }

    /// Create the run directory. Any failure here aborts the run before a stage executes.
    pub fn prepare(&self) -> Result<&Path> {
        fs::create_dir_all(&self.artifact_dir)
            .map_err(|e| AutoSenseError::stage(Stage::RunContext, e.into()))?;
        Ok(&self.artifact_dir)
    }
}
