//! Static column schema

use crate::error::{AutoSenseError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_SCHEMA: &str = include_str!("../../config/schema.json");

/// Ordered set of expected column names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<String>,
}

impl Schema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Schema shipped with the crate
    pub fn load_default() -> Result<Self> {
        Self::from_json(DEFAULT_SCHEMA)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let schema: Schema = serde_json::from_str(text)?;
        if schema.columns.is_empty() {
            return Err(AutoSenseError::ConfigError("schema has no columns".to_string()));
        }
        Ok(schema)
    }

    /// Expected columns not present in `present`, in schema order
    pub fn missing_columns<'a, S: AsRef<str>>(&'a self, present: &[S]) -> Vec<&'a str> {
        self.columns
            .iter()
            .map(|c| c.as_str())
            .filter(|c| !present.iter().any(|p| p.as_ref() == *c))
            .collect()
    }
}
