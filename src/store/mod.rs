//! Document store access
//!
//! The ingestion stage reads raw listing documents through the
//! [`DocumentStore`] trait. The caller constructs the handle (see
//! [`connect`]) and passes it in; nothing is cached process-wide.

mod jsonl;
#[cfg(feature = "mongo")]
mod mongo;

pub use jsonl::JsonLinesStore;
#[cfg(feature = "mongo")]
pub use mongo::MongoStore;

use crate::error::{AutoSenseError, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// A flat key-value record as returned by the store
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Source of raw documents
pub trait DocumentStore: Send + Sync {
    /// Fetch every document of a collection
    fn fetch_all(&self, database: &str, collection: &str) -> Result<Vec<Document>>;

    /// Number of documents in a collection
    fn count_documents(&self, database: &str, collection: &str) -> Result<u64> {
        Ok(self.fetch_all(database, collection)?.len() as u64)
    }

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// In-process store, keyed by `(database, collection)`
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<(String, String), Vec<Document>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append documents to a collection
    pub fn insert_many(&self, database: &str, collection: &str, docs: Vec<Document>) {
        let mut guard = match self.collections.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard
            .entry((database.to_string(), collection.to_string()))
            .or_default()
            .extend(docs);
    }

    /// Builder-style variant of [`insert_many`](Self::insert_many)
    pub fn with_documents(self, database: &str, collection: &str, docs: Vec<Document>) -> Self {
        self.insert_many(database, collection, docs);
        self
    }
}

impl DocumentStore for InMemoryStore {
    fn fetch_all(&self, database: &str, collection: &str) -> Result<Vec<Document>> {
        let guard = self
            .collections
            .read()
            .map_err(|_| AutoSenseError::StoreError("in-memory store lock poisoned".to_string()))?;
        Ok(guard
            .get(&(database.to_string(), collection.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Open a store from a connection string.
///
/// `mongodb://` and `mongodb+srv://` need the `mongo` feature; `file://<dir>`
/// or a bare path opens a [`JsonLinesStore`].
pub fn connect(url: &str) -> Result<Box<dyn DocumentStore>> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AutoSenseError::ConfigError("empty store connection string".to_string()));
    }

    if url.starts_with("mongodb://") || url.starts_with("mongodb+srv://") {
        #[cfg(feature = "mongo")]
        {
            return Ok(Box::new(MongoStore::connect(url)?));
        }
        #[cfg(not(feature = "mongo"))]
        {
            return Err(AutoSenseError::ConfigError(
                "MongoDB connection string given but the `mongo` feature is not enabled".to_string(),
            ));
        }
    }

    let path = url.strip_prefix("file://").unwrap_or(url);
    Ok(Box::new(JsonLinesStore::new(PathBuf::from(path))))
}
