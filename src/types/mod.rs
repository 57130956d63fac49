//! Shared data structures for the space-weather checker pipeline.
//!
//! - `snapshot`: the per-tick observation (`Snapshot`, `ActiveRegion`, event records)
//! - `state`: the persisted `CheckerState` the pipeline owns across ticks
//! - `alert`: candidate and dispatched alert records
//! - `prediction`: the prognostic scorecard (`PredictionState`, `Prediction`)

mod alert;
mod prediction;
mod snapshot;
mod state;

pub use alert::*;
pub use prediction::*;
pub use snapshot::*;
pub use state::*;
