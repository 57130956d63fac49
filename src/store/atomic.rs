//! Atomic JSON file writes — spec.md §4.F.
//!
//! Serialize, re-parse as a sanity check, write to a sibling PID-stamped
//! temp file, then rename over the target. Readers concurrent with a save
//! observe either the pre- or post-save bytes, never a partial write
//! (invariant E, spec.md §8).

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {0:?}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to parse {0:?}: {1}")]
    Parse(PathBuf, serde_json::Error),
    #[error("failed to serialize value for {0:?}: {1}")]
    Serialize(PathBuf, serde_json::Error),
    #[error("pre-write sanity re-parse failed for {0:?}: {1}")]
    SanityCheck(PathBuf, serde_json::Error),
    #[error("failed to write temp file {0:?}: {1}")]
    WriteTemp(PathBuf, std::io::Error),
    #[error("failed to rename {0:?} to {1:?}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

/// Read and parse `path` into `T`. The caller decides what to do on
/// error — spec.md prescribes falling back to defaults and logging, which
/// differs per store (`CheckerState` vs `PredictionState`).
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let bytes = std::fs::read(path).map_err(|e| StoreError::Read(path.to_path_buf(), e))?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Parse(path.to_path_buf(), e))
}

/// Serialize `value`, re-parse it as a pre-write sanity check, write it to
/// a PID-stamped sibling temp file, then atomically rename over `path`.
/// On rename failure the temp file is best-effort removed.
pub fn write_json_atomic<T: Serialize + DeserializeOwned>(
    path: &Path,
    value: &T,
) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| StoreError::Serialize(path.to_path_buf(), e))?;

    serde_json::from_slice::<serde_json::Value>(&bytes)
        .map_err(|e| StoreError::SanityCheck(path.to_path_buf(), e))?;

    let pid = std::process::id();
    let temp_path = path.with_extension(format!("{pid}.tmp"));

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!(?parent, error = %e, "failed to ensure parent directory exists before write");
        }
    }

    std::fs::write(&temp_path, &bytes).map_err(|e| StoreError::WriteTemp(temp_path.clone(), e))?;

    match std::fs::rename(&temp_path, path) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!(?temp_path, target = ?path, error = %e, "atomic rename failed, removing temp file");
            let _ = std::fs::remove_file(&temp_path);
            Err(StoreError::Rename(temp_path, path.to_path_buf(), e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Dummy {
        value: u32,
    }

    #[test]
    fn round_trip_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dummy.json");
        let original = Dummy { value: 42 };
        write_json_atomic(&path, &original).unwrap();
        let loaded: Dummy = read_json(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn write_leaves_no_temp_file_behind_on_success() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dummy.json");
        write_json_atomic(&path, &Dummy { value: 1 }).unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn read_nonexistent_file_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let result: Result<Dummy, StoreError> = read_json(&path);
        assert!(result.is_err());
    }
}
