//! `PredictionState` persistence and submission — spec.md §4.H.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{error, warn};

use crate::types::{Prediction, PredictionState, PredictionStatus};

use super::atomic::{read_json, write_json_atomic, StoreError};

pub struct PredictionStore {
    path: PathBuf,
}

#[derive(Debug, PartialEq)]
pub enum SubmitError {
    /// A cooldown is in effect; `cooldown_ends` is when submission reopens.
    Cooldown { cooldown_ends: DateTime<Utc> },
}

impl PredictionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("predictions.json"),
        }
    }

    pub fn load(&self) -> PredictionState {
        match read_json::<PredictionState>(&self.path) {
            Ok(state) => state,
            Err(StoreError::Read(_, e)) if e.kind() == std::io::ErrorKind::NotFound => {
                PredictionState::default()
            }
            Err(e) => {
                warn!(error = %e, path = ?self.path, "failed to load predictions, using defaults");
                PredictionState::default()
            }
        }
    }

    pub fn save(&self, state: &PredictionState) {
        if let Err(e) = write_json_atomic(&self.path, state) {
            error!(error = %e, path = ?self.path, "CRITICAL: failed to save predictions, prior file preserved");
        }
    }

    /// Submit a new prediction, subject to the cooldown since the most
    /// recent one. On success, appends the prediction and caps the log at
    /// `config.maxPredictions`, keeping the most recent entries.
    pub fn submit(
        state: &mut PredictionState,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Prediction, SubmitError> {
        if let Some(last) = state.predictions.last() {
            let cooldown_ends =
                last.timestamp + chrono::Duration::hours(state.config.cooldown_hours as i64);
            if now < cooldown_ends {
                return Err(SubmitError::Cooldown { cooldown_ends });
            }
        }

        let window_hours = state.config.verification_window_hours;
        let prediction = Prediction {
            id: format!("pred-{}", now.timestamp_millis()),
            timestamp: now,
            note,
            status: PredictionStatus::Pending,
            verified_at: None,
            window_hours,
            window_end: now + chrono::Duration::hours(window_hours as i64),
            matched_events: Vec::new(),
        };

        state.predictions.push(prediction.clone());
        let max = state.config.max_predictions;
        if state.predictions.len() > max {
            let excess = state.predictions.len() - max;
            state.predictions.drain(0..excess);
        }

        Ok(prediction)
    }
}
