//! JSON file storage for tracked runs

use super::CandidateRecord;
use crate::error::{AutoSenseError, Result};
use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

/// One logged candidate evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedRun {
    pub run_id: String,
    pub experiment: String,
    pub run_name: String,
    /// RFC 3339, UTC
    pub logged_at: String,
    pub params: IndexMap<String, String>,
    pub metrics: IndexMap<String, f64>,
    pub model_path: Option<PathBuf>,
}

impl TrackedRun {
    pub fn new(experiment: &str, record: &CandidateRecord, model_path: Option<PathBuf>) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            experiment: experiment.to_string(),
            run_name: record.name.clone(),
            logged_at: Utc::now().to_rfc3339(),
            params: record.params.iter().cloned().collect(),
            metrics: record.metrics(),
            model_path,
        }
    }
}

/// Local file system storage: a single pretty-printed JSON array
pub struct LocalStorage {
    path: PathBuf,
    // serializes read-modify-write of the file
    lock: Mutex<()>,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored runs; an absent file holds none
    pub fn load(&self) -> Result<Vec<TrackedRun>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, runs: &[TrackedRun]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(runs)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn append(&self, run: TrackedRun) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AutoSenseError::StoreError("experiment storage lock poisoned".to_string()))?;
        let mut runs = self.load()?;
        runs.push(run);
        self.save(&runs)
    }
}
