//! Environment configuration, read once at process start

use super::constants::*;
use crate::error::{AutoSenseError, Result};
use std::env;
use std::path::PathBuf;

/// Values taken from the process environment (and `.env`, if present)
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Document store connection string
    pub store_url: String,
    pub database_name: String,
    pub collection_name: String,
    pub artifact_root: PathBuf,
}

impl EnvConfig {
    /// Load from the environment. A missing store URL fails immediately.
    ///
    /// `store_url`, when given, replaces the `MONGODB_URL` variable.
    pub fn from_env(store_url: Option<&str>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| match (key, store_url) {
            (ENV_MONGODB_URL, Some(url)) => Some(url.to_string()),
            _ => env::var(key).ok(),
        })
    }

    /// Load using a custom variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_url = lookup(ENV_MONGODB_URL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AutoSenseError::ConfigError(format!("{} is not set", ENV_MONGODB_URL))
            })?;

        Ok(Self {
            store_url,
            database_name: lookup(ENV_DATABASE).unwrap_or_else(|| DATA_INGESTION_DATABASE_NAME.to_string()),
            collection_name: lookup(ENV_COLLECTION).unwrap_or_else(|| DATA_INGESTION_COLLECTION_NAME.to_string()),
            artifact_root: lookup(ENV_ARTIFACT_ROOT)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(ARTIFACT_DIR)),
        })
    }
}
