//! File-backed document store: `<root>/<database>/<collection>.jsonl`

use super::{Document, DocumentStore};
use crate::error::{AutoSenseError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// One JSON object per line, one file per collection
#[derive(Debug, Clone)]
pub struct JsonLinesStore {
    root: PathBuf,
}

impl JsonLinesStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, database: &str, collection: &str) -> PathBuf {
        self.root.join(database).join(format!("{}.jsonl", collection))
    }

    /// Append documents to a collection file
    pub fn insert_many(&self, database: &str, collection: &str, docs: &[Document]) -> Result<()> {
        let path = self.collection_path(database, collection);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = BufWriter::new(file);
        for doc in docs {
            serde_json::to_writer(&mut writer, doc)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl DocumentStore for JsonLinesStore {
    fn fetch_all(&self, database: &str, collection: &str) -> Result<Vec<Document>> {
        let path = self.collection_path(database, collection);
        let file = File::open(&path).map_err(|e| {
            AutoSenseError::StoreError(format!("cannot open collection {}: {}", path.display(), e))
        })?;

        let mut docs = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let value: serde_json::Value = serde_json::from_str(&line).map_err(|e| {
                AutoSenseError::StoreError(format!("{}:{}: {}", path.display(), line_no + 1, e))
            })?;
            match value {
                serde_json::Value::Object(map) => docs.push(map),
                _ => {
                    return Err(AutoSenseError::StoreError(format!(
                        "{}:{}: document is not an object",
                        path.display(),
                        line_no + 1
                    )))
                }
            }
        }
        Ok(docs)
    }

    fn name(&self) -> &'static str {
        "jsonl"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::new(dir.path());
        let docs: Vec<Document> = (0..3)
            .map(|i| json!({"mileage": i * 1000, "make": "audi"}).as_object().cloned().unwrap())
            .collect();
        store.insert_many("AutoSense", "data", &docs).unwrap();

        let fetched = store.fetch_all("AutoSense", "data").unwrap();
        assert_eq!(fetched, docs);
        assert_eq!(store.count_documents("AutoSense", "data").unwrap(), 3);
    }

    #[test]
    fn test_missing_collection_is_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::new(dir.path());
        let err = store.fetch_all("AutoSense", "missing").unwrap_err();
        assert!(matches!(err, AutoSenseError::StoreError(_)));
    }

    #[test]
    fn test_non_object_line_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("c.jsonl"), "[1, 2]\n").unwrap();
        let store = JsonLinesStore::new(dir.path());
        assert!(store.fetch_all("db", "c").is_err());
    }
}
