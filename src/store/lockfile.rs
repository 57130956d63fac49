//! Lock manager — spec.md §4.G.
//!
//! Single-writer mutual exclusion via a JSON lockfile `{pid, timestamp,
//! hostname}`. Adapted from the data-directory process lock this repo
//! historically used, generalized to the stale/steal/liveness protocol
//! spec.md requires instead of a hard refusal-to-start.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use gethostname::gethostname;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LockRecord {
    pub pid: u32,
    pub timestamp: DateTime<Utc>,
    pub hostname: String,
}

impl LockRecord {
    fn ours() -> Self {
        Self {
            pid: std::process::id(),
            timestamp: Utc::now(),
            hostname: gethostname().to_string_lossy().into_owned(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LockError {
    #[error("failed to write lockfile {0:?}: {1}")]
    Write(PathBuf, std::io::Error),
    #[error("failed to serialize lock record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The outcome of an acquisition attempt.
pub enum Acquisition {
    /// We now hold the lock.
    Acquired(ProcessLock),
    /// A live holder is within its timeout — this is expected cadence
    /// collision, not an error (spec.md §7).
    RefusedLiveHolder { holder_pid: u32 },
}

#[derive(Debug)]
pub struct ProcessLock {
    path: PathBuf,
    record: LockRecord,
}

impl ProcessLock {
    /// Attempt to acquire the lock at `path`, given the configured
    /// staleness timeout.
    pub fn acquire(path: &Path, lock_timeout: chrono::Duration) -> Result<Acquisition, LockError> {
        if path.exists() {
            match read_lock(path) {
                Err(e) => {
                    warn!(error = %e, "lockfile unreadable/unparseable, stealing");
                }
                Ok(existing) => {
                    if !is_alive(existing.pid) {
                        warn!(pid = existing.pid, "lock holder process is not alive, stealing");
                    } else {
                        let age = Utc::now().signed_duration_since(existing.timestamp);
                        if age < lock_timeout {
                            return Ok(Acquisition::RefusedLiveHolder {
                                holder_pid: existing.pid,
                            });
                        }
                        warn!(
                            pid = existing.pid,
                            age_secs = age.num_seconds(),
                            "lock is stale (holder hung), stealing"
                        );
                    }
                }
            }
        }

        let record = LockRecord::ours();
        write_lock(path, &record)?;
        info!(pid = record.pid, ?path, "acquired checker lock");
        Ok(Acquisition::Acquired(Self {
            path: path.to_path_buf(),
            record,
        }))
    }

    /// Release the lock only if the file on disk still names our pid
    /// (invariant F, spec.md §8 — protects against releasing a lock we
    /// already lost to a steal).
    pub fn release(self) {
        match read_lock(&self.path) {
            Ok(current) if current.pid == self.record.pid => {
                if let Err(e) = std::fs::remove_file(&self.path) {
                    warn!(error = %e, path = ?self.path, "failed to remove lockfile on release");
                } else {
                    info!(pid = self.record.pid, "released checker lock");
                }
            }
            Ok(current) => {
                warn!(
                    our_pid = self.record.pid,
                    holder_pid = current.pid,
                    "lockfile no longer names our pid, not releasing"
                );
            }
            Err(e) => {
                warn!(error = %e, "lockfile unreadable at release time, not releasing");
            }
        }
    }
}

fn read_lock(path: &Path) -> Result<LockRecord, LockError> {
    let bytes = std::fs::read(path).map_err(|e| LockError::Write(path.to_path_buf(), e))?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn write_lock(path: &Path, record: &LockRecord) -> Result<(), LockError> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let bytes = serde_json::to_vec_pretty(record)?;
    std::fs::write(path, bytes).map_err(|e| LockError::Write(path.to_path_buf(), e))
}

/// "Alive" is a no-op signal to the pid; any failure is treated as dead.
#[cfg(unix)]
fn is_alive(pid: u32) -> bool {
    // SAFETY: signal 0 sends no actual signal, only checks for the
    // process's existence and our permission to signal it.
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

#[cfg(not(unix))]
fn is_alive(_pid: u32) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn acquires_when_no_lockfile_exists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checker.lock");
        let result = ProcessLock::acquire(&path, chrono::Duration::minutes(10)).unwrap();
        assert!(matches!(result, Acquisition::Acquired(_)));
        assert!(path.exists());
    }

    #[test]
    fn refuses_when_holder_alive_and_fresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checker.lock");
        let fake = LockRecord {
            pid: std::process::id(),
            timestamp: Utc::now(),
            hostname: "other-host".into(),
        };
        write_lock(&path, &fake).unwrap();
        let result = ProcessLock::acquire(&path, chrono::Duration::minutes(10)).unwrap();
        assert!(matches!(result, Acquisition::RefusedLiveHolder { .. }));
    }

    #[test]
    fn steals_when_holder_stale() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checker.lock");
        let fake = LockRecord {
            pid: std::process::id(),
            timestamp: Utc::now() - chrono::Duration::minutes(30),
            hostname: "other-host".into(),
        };
        write_lock(&path, &fake).unwrap();
        let result = ProcessLock::acquire(&path, chrono::Duration::minutes(10)).unwrap();
        assert!(matches!(result, Acquisition::Acquired(_)));
    }

    #[test]
    fn steals_on_unparseable_lockfile() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checker.lock");
        std::fs::write(&path, b"not json").unwrap();
        let result = ProcessLock::acquire(&path, chrono::Duration::minutes(10)).unwrap();
        assert!(matches!(result, Acquisition::Acquired(_)));
    }

    #[test]
    fn release_removes_lockfile_when_pid_matches() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checker.lock");
        let Acquisition::Acquired(lock) =
            ProcessLock::acquire(&path, chrono::Duration::minutes(10)).unwrap()
        else {
            panic!("expected acquisition");
        };
        lock.release();
        assert!(!path.exists());
    }

    #[test]
    fn release_is_a_no_op_if_lock_was_stolen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checker.lock");
        let Acquisition::Acquired(lock) =
            ProcessLock::acquire(&path, chrono::Duration::minutes(10)).unwrap()
        else {
            panic!("expected acquisition");
        };
        let other = LockRecord {
            pid: 999_999,
            timestamp: Utc::now(),
            hostname: "someone-else".into(),
        };
        write_lock(&path, &other).unwrap();
        lock.release();
        assert!(path.exists());
    }
}
