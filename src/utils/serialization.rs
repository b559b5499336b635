//! Binary artifact envelope
//!
//! Fitted transformers, models and dense arrays are written as
//! `bincode(Envelope)`, where the envelope carries a magic tag, a format
//! version, the artifact kind and a SHA-256 checksum of the payload.
//! Loading checks all of them before decoding the payload.

use crate::error::{AutoSenseError, Result};
use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC: [u8; 4] = *b"ASNS";
const FORMAT_VERSION: u16 = 1;

/// What an artifact file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Transformer,
    Scaler,
    Model,
    Array,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    magic: [u8; 4],
    version: u16,
    kind: ArtifactKind,
    checksum: String,
    payload: Vec<u8>,
}

/// Compute SHA-256 hash of data as lowercase hex
pub fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Serialize `value` into an artifact file, creating parent directories
pub fn save_object<T: Serialize>(path: impl AsRef<Path>, kind: ArtifactKind, value: &T) -> Result<()> {
    let path = path.as_ref();
    let payload = bincode::serialize(value)?;
    let envelope = Envelope {
        magic: MAGIC,
        version: FORMAT_VERSION,
        kind,
        checksum: compute_sha256(&payload),
        payload,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&bincode::serialize(&envelope)?)?;
    writer.flush()?;

    tracing::debug!(path = %path.display(), ?kind, "Saved artifact");
    Ok(())
}

/// Load an artifact file written by [`save_object`]
pub fn load_object<T: DeserializeOwned>(path: impl AsRef<Path>, kind: ArtifactKind) -> Result<T> {
    let path = path.as_ref();
    let mut bytes = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;

    let envelope: Envelope = bincode::deserialize(&bytes).map_err(|e| {
        AutoSenseError::SerializationError(format!("{} is not an artifact file: {}", path.display(), e))
    })?;

    if envelope.magic != MAGIC {
        return Err(AutoSenseError::SerializationError(format!(
            "{}: bad magic bytes",
            path.display()
        )));
    }
    if envelope.version != FORMAT_VERSION {
        return Err(AutoSenseError::SerializationError(format!(
            "{}: unsupported format version {}",
            path.display(),
            envelope.version
        )));
    }
    if envelope.kind != kind {
        return Err(AutoSenseError::SerializationError(format!(
            "{}: expected {:?} artifact, found {:?}",
            path.display(),
            kind,
            envelope.kind
        )));
    }
    if compute_sha256(&envelope.payload) != envelope.checksum {
        return Err(AutoSenseError::SerializationError(format!(
            "{}: checksum mismatch",
            path.display()
        )));
    }

    Ok(bincode::deserialize(&envelope.payload)?)
}

/// Persist a dense array
pub fn save_array(path: impl AsRef<Path>, array: &Array2<f64>) -> Result<()> {
    save_object(path, ArtifactKind::Array, array)
}

/// Load a dense array written by [`save_array`]
pub fn load_array(path: impl AsRef<Path>) -> Result<Array2<f64>> {
    load_object(path, ArtifactKind::Array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_array_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t").join("train.bin");
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        save_array(&path, &a).unwrap();
        assert_eq!(load_array(&path).unwrap(), a);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        save_object(&path, ArtifactKind::Model, &vec![1u32, 2, 3]).unwrap();
        let err = load_object::<Vec<u32>>(&path, ArtifactKind::Scaler).unwrap_err();
        assert!(matches!(err, AutoSenseError::SerializationError(_)));
    }

    #[test]
    fn test_corrupted_payload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        save_object(&path, ArtifactKind::Model, &vec![7u64; 16]).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, bytes).unwrap();

        assert!(load_object::<Vec<u64>>(&path, ArtifactKind::Model).is_err());
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            compute_sha256(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
