//! Persistence: atomic JSON writes, the checker/prediction state stores,
//! and the single-writer lockfile protocol — spec.md §4.F/§4.G.

pub mod atomic;
pub mod lockfile;
pub mod prediction_store;
pub mod state_store;

pub use lockfile::{Acquisition, LockRecord, ProcessLock};
pub use prediction_store::{PredictionStore, SubmitError};
pub use state_store::StateStore;
