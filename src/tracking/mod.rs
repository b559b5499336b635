//! Experiment tracking
//!
//! Each evaluated candidate is reported to an [`ExperimentTracker`] with its
//! parameters and metrics. The trainer treats tracking as best effort: a
//! failing tracker is logged and never changes model selection.

mod storage;

pub use storage::{LocalStorage, TrackedRun};

use crate::config::TrainerConfig;
use crate::error::Result;
use crate::training::{RegressionMetrics, TrainedModel};
use crate::utils::{save_object, ArtifactKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Parameters and scores of one fitted candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    pub params: Vec<(String, String)>,
    pub train_metrics: RegressionMetrics,
    pub test_metrics: RegressionMetrics,
}

impl CandidateRecord {
    /// Flattened metrics keyed `train_mae`, `test_r2`, ...
    pub fn metrics(&self) -> IndexMap<String, f64> {
        let mut out = IndexMap::new();
        for (split, m) in [("train", &self.train_metrics), ("test", &self.test_metrics)] {
            out.insert(format!("{}_mae", split), m.mae);
            out.insert(format!("{}_rmse", split), m.rmse);
            out.insert(format!("{}_r2", split), m.r2);
        }
        out
    }
}

/// Sink for candidate records
pub trait ExperimentTracker: Send + Sync {
    fn log_candidate(&self, record: &CandidateRecord, model: &TrainedModel) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Tracker that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracker;

impl ExperimentTracker for NoopTracker {
    fn log_candidate(&self, _record: &CandidateRecord, _model: &TrainedModel) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

/// Tracker appending runs to a JSON file and keeping every candidate model
pub struct LocalTracker {
    experiment: String,
    storage: LocalStorage,
    candidates_dir: PathBuf,
    save_models: bool,
}

impl LocalTracker {
    pub fn new(
        experiment: impl Into<String>,
        experiments_path: impl Into<PathBuf>,
        candidates_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            experiment: experiment.into(),
            storage: LocalStorage::new(experiments_path),
            candidates_dir: candidates_dir.into(),
            save_models: true,
        }
    }

    /// Tracker writing into the trainer's stage directory
    pub fn from_config(config: &TrainerConfig, experiment: impl Into<String>) -> Self {
        Self::new(experiment, &config.experiments_path, &config.candidates_dir)
    }

    pub fn with_save_models(mut self, save_models: bool) -> Self {
        self.save_models = save_models;
        self
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    fn model_path(&self, name: &str) -> PathBuf {
        let slug: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        self.candidates_dir.join(format!("{}.bin", slug))
    }
}

impl ExperimentTracker for LocalTracker {
    fn log_candidate(&self, record: &CandidateRecord, model: &TrainedModel) -> Result<()> {
        let model_path = if self.save_models {
            let path = self.model_path(&record.name);
            save_object(&path, ArtifactKind::Model, model)?;
            Some(path)
        } else {
            None
        };

        let run = TrackedRun::new(&self.experiment, record, model_path);
        debug!(run_id = %run.run_id, candidate = %record.name, "Logging candidate run");
        self.storage.append(run)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
