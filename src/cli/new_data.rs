//! Document-count watermark for deciding whether to retrain

use crate::error::{AutoSenseError, Result};
use crate::store::DocumentStore;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewDataStatus {
    pub previous: u64,
    pub current: u64,
    pub detected: bool,
}

/// Count stored by the last detection, 0 if the file is absent
pub fn read_previous_count(state_file: &Path) -> Result<u64> {
    if !state_file.exists() {
        return Ok(0);
    }
    let text = fs::read_to_string(state_file)?;
    text.trim().parse().map_err(|_| {
        AutoSenseError::DataError(format!(
            "state file {} does not hold a count: {:?}",
            state_file.display(),
            text.trim()
        ))
    })
}

/// Compare the collection size against the watermark.
///
/// The watermark only moves when the increase exceeds `threshold`.
pub fn check_new_data(
    store: &dyn DocumentStore,
    database: &str,
    collection: &str,
    state_file: &Path,
    threshold: u64,
) -> Result<NewDataStatus> {
    let current = store.count_documents(database, collection)?;
    let previous = read_previous_count(state_file)?;
    let detected = current.saturating_sub(previous) > threshold;
    if detected {
        if let Some(parent) = state_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(state_file, current.to_string())?;
    }
    info!(previous, current, threshold, detected, "Checked for new data");
    Ok(NewDataStatus {
        previous,
        current,
        detected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, InMemoryStore};
    use serde_json::json;

    fn store(n: usize) -> InMemoryStore {
        let docs: Vec<Document> = (0..n)
            .map(|i| json!({ "i": i }).as_object().cloned().unwrap())
            .collect();
        InMemoryStore::new().with_documents("db", "c", docs)
    }

    #[test]
    fn test_detects_and_moves_watermark() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("last_count.txt");

        let status = check_new_data(&store(12), "db", "c", &state, 10).unwrap();
        assert!(status.detected);
        assert_eq!(status.previous, 0);
        assert_eq!(read_previous_count(&state).unwrap(), 12);

        let again = check_new_data(&store(15), "db", "c", &state, 10).unwrap();
        assert!(!again.detected);
        assert_eq!(read_previous_count(&state).unwrap(), 12);
    }

    #[test]
    fn test_threshold_is_strict() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("count");
        let status = check_new_data(&store(10), "db", "c", &state, 10).unwrap();
        assert!(!status.detected);
        assert!(!state.exists());
    }

    #[test]
    fn test_garbage_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("count");
        fs::write(&state, "lots").unwrap();
        assert!(read_previous_count(&state).is_err());
    }
}
