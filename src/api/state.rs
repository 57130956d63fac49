//! Shared state for the read-only HTTP API.
//!
//! Handlers re-read the persisted state and prediction files per request —
//! the API is a stateless view over the same files the scheduler writes
//! (spec.md §6: "returns snapshots of persisted state"). Thresholds and
//! cooldowns come from the global [`crate::config`] singleton; only the
//! data directory varies per instance, which matters for tests.

use std::path::PathBuf;

#[derive(Clone)]
pub struct ApiState {
    pub data_dir: PathBuf,
}
