//! `CheckerState` persistence — spec.md §4.F.

use std::path::{Path, PathBuf};

use tracing::{error, warn};

use crate::types::CheckerState;

use super::atomic::{read_json, write_json_atomic, StoreError};

pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("checker-state.json"),
        }
    }

    /// Load the persisted state, shallow-merging over defaults. A missing
    /// file or parse failure both fall back to `CheckerState::default()`,
    /// logged but not fatal.
    pub fn load(&self) -> CheckerState {
        match read_json::<CheckerState>(&self.path) {
            Ok(state) => state,
            Err(StoreError::Read(_, e)) if e.kind() == std::io::ErrorKind::NotFound => {
                CheckerState::default()
            }
            Err(e) => {
                warn!(error = %e, path = ?self.path, "failed to load checker state, using defaults");
                CheckerState::default()
            }
        }
    }

    /// Save the state. Truncates `alertsSent` first, then delegates to the
    /// atomic writer. Save failures keep the prior file intact and are
    /// logged at error level — the tick is still considered complete
    /// (spec.md §7).
    pub fn save(&self, state: &mut CheckerState) {
        state.truncate_history();
        if let Err(e) = write_json_atomic(&self.path, state) {
            error!(error = %e, path = ?self.path, "CRITICAL: failed to save checker state, prior file preserved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Alert, AlertType, Urgency};
    use chrono::Utc;
    use tempfile::tempdir;

    #[test]
    fn load_without_existing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let store = StateStore::new(dir.path());
        let state = store.load();
        assert_eq!(state.schema_version, 1);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = StateStore::new(dir.path());
        let mut state = CheckerState {
            last_kp: 5.5,
            ..Default::default()
        };
        state.alerts_sent.push(Alert::new(
            AlertType::KpThreshold,
            Urgency::High,
            "t",
            "b",
            Utc::now(),
            None,
        ));
        store.save(&mut state);

        let loaded = store.load();
        assert_eq!(loaded.last_kp, 5.5);
        assert_eq!(loaded.alerts_sent.len(), 1);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("checker-state.json"), b"not json").unwrap();
        let store = StateStore::new(dir.path());
        let state = store.load();
        assert_eq!(state.schema_version, 1);
        assert_eq!(state.last_kp, 0.0);
    }
}
