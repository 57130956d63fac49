//! The prognostic scorecard: user-submitted predictions and their
//! deferred verification against observed events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PREDICTION_STATE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Pending,
    Hit,
    Miss,
}

/// A single event matched inside a prediction's verification window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchedEvent {
    /// One of `flare`, `storm`, `cme` — the originating record kind.
    pub event_type: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// A user-submitted prognostic prediction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub note: Option<String>,
    pub status: PredictionStatus,
    pub verified_at: Option<DateTime<Utc>>,
    pub window_hours: u32,
    pub window_end: DateTime<Utc>,
    #[serde(default)]
    pub matched_events: Vec<MatchedEvent>,
}

/// Tunable parameters for submission cooldown, verification window, and
/// the offline-computed base rate used by the binomial significance test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionConfig {
    #[serde(default = "default_verification_window_hours")]
    pub verification_window_hours: u32,
    #[serde(default = "default_cooldown_hours")]
    pub cooldown_hours: u32,
    #[serde(default = "default_max_predictions")]
    pub max_predictions: usize,
    #[serde(default)]
    pub base_rate: Option<f64>,
    #[serde(default)]
    pub base_rate_computed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub base_rate_sample_windows: Option<u64>,
}

fn default_verification_window_hours() -> u32 {
    48
}
fn default_cooldown_hours() -> u32 {
    6
}
fn default_max_predictions() -> usize {
    500
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            verification_window_hours: default_verification_window_hours(),
            cooldown_hours: default_cooldown_hours(),
            max_predictions: default_max_predictions(),
            base_rate: None,
            base_rate_computed_at: None,
            base_rate_sample_windows: None,
        }
    }
}

/// The persisted `predictions.json` blob, §3.P / §6 of spec.md.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionState {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    #[serde(default)]
    pub config: PredictionConfig,
}

fn default_schema_version() -> u32 {
    PREDICTION_STATE_SCHEMA_VERSION
}

impl Default for PredictionState {
    fn default() -> Self {
        Self {
            schema_version: PREDICTION_STATE_SCHEMA_VERSION,
            predictions: Vec::new(),
            config: PredictionConfig::default(),
        }
    }
}

/// Aggregate scorecard statistics, §4.H of spec.md.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    pub hits: usize,
    pub misses: usize,
    pub pending: usize,
    pub hit_rate: Option<f64>,
    pub total_days_tracked: i64,
    pub p_value: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_config_defaults_match_spec() {
        let cfg = PredictionConfig::default();
        assert_eq!(cfg.verification_window_hours, 48);
        assert_eq!(cfg.cooldown_hours, 6);
        assert_eq!(cfg.max_predictions, 500);
        assert!(cfg.base_rate.is_none());
    }

    #[test]
    fn prediction_state_tolerates_missing_fields() {
        let state: PredictionState = serde_json::from_str("{}").unwrap();
        assert_eq!(state.schema_version, 1);
        assert!(state.predictions.is_empty());
    }
}
