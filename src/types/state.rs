//! `CheckerState`: the persisted blob the pipeline owns across ticks.
//!
//! Loaded at the start of a tick, transformed by pure functions, and
//! persisted by the state store at the end — never mutated in place by a
//! long-lived object (spec.md §9: "Shared mutable state ... re-architected
//! as a value owned by the tick").

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Alert;

/// Current schema version for `checker-state.json`. Bump only on a
/// breaking change to the persisted shape; unknown fields on load are
/// always merged with defaults regardless of version.
pub const CHECKER_STATE_SCHEMA_VERSION: u32 = 1;

/// Memory of a known Earth-directed CME: its last observed forecast, used
/// to detect upward revisions on a later tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KnownCme {
    pub id: String,
    pub predicted_kp: f64,
    pub predicted_arrival: Option<DateTime<Utc>>,
}

/// Per-source fetch health, surfaced to the dashboard's freshness indicator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataHealthEntry {
    pub ok: bool,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl Default for DataHealthEntry {
    fn default() -> Self {
        Self {
            ok: false,
            last_success: None,
            last_error: None,
        }
    }
}

/// The persisted checker state, §3.K of spec.md.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckerState {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_kp: f64,
    #[serde(default)]
    pub last_bz: f64,
    #[serde(default)]
    pub last_wind_speed: f64,
    #[serde(default)]
    pub last_wind_density: f64,

    #[serde(default)]
    pub kp_was_above_5: bool,
    #[serde(default)]
    pub kp_was_above_7: bool,
    #[serde(default)]
    pub bz_was_below_10: bool,
    #[serde(default)]
    pub bz_was_below_15: bool,
    #[serde(default)]
    pub wind_was_above_600: bool,
    #[serde(default)]
    pub wind_was_above_700: bool,
    #[serde(default)]
    pub density_was_above_20: bool,

    #[serde(default, rename = "knownCMEs")]
    pub known_cmes: HashMap<String, KnownCme>,
    #[serde(default)]
    pub known_flare_ids: HashSet<String>,
    #[serde(default)]
    pub known_hss_ids: HashSet<String>,
    #[serde(default)]
    pub known_region_numbers: HashSet<u32>,
    #[serde(default)]
    pub known_alert_product_ids: HashSet<String>,

    #[serde(default)]
    pub last_cooldowns: HashMap<String, DateTime<Utc>>,

    #[serde(default)]
    pub data_health: HashMap<String, DataHealthEntry>,

    #[serde(default)]
    pub alerts_sent: Vec<Alert>,

    #[serde(default = "default_max_alert_history")]
    pub max_alert_history: usize,
}

fn default_schema_version() -> u32 {
    CHECKER_STATE_SCHEMA_VERSION
}

fn default_max_alert_history() -> usize {
    100
}

impl Default for CheckerState {
    fn default() -> Self {
        Self {
            schema_version: CHECKER_STATE_SCHEMA_VERSION,
            last_run_at: None,
            last_kp: 0.0,
            last_bz: 0.0,
            last_wind_speed: 0.0,
            last_wind_density: 0.0,
            kp_was_above_5: false,
            kp_was_above_7: false,
            bz_was_below_10: false,
            bz_was_below_15: false,
            wind_was_above_600: false,
            wind_was_above_700: false,
            density_was_above_20: false,
            known_cmes: HashMap::new(),
            known_flare_ids: HashSet::new(),
            known_hss_ids: HashSet::new(),
            known_region_numbers: HashSet::new(),
            known_alert_product_ids: HashSet::new(),
            last_cooldowns: HashMap::new(),
            data_health: HashMap::new(),
            alerts_sent: Vec::new(),
            max_alert_history: 100,
        }
    }
}

impl CheckerState {
    /// Append dispatched alerts and cap `alerts_sent` at `max_alert_history`,
    /// keeping the most recent entries (invariant G of spec.md §8).
    pub fn record_dispatched(&mut self, dispatched: impl IntoIterator<Item = Alert>) {
        self.alerts_sent.extend(dispatched);
        self.truncate_history();
    }

    pub fn truncate_history(&mut self) {
        let len = self.alerts_sent.len();
        if len > self.max_alert_history {
            self.alerts_sent.drain(0..len - self.max_alert_history);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlertType, Urgency};

    #[test]
    fn default_state_has_schema_version_1() {
        assert_eq!(CheckerState::default().schema_version, 1);
    }

    #[test]
    fn missing_fields_deserialize_with_defaults() {
        let state: CheckerState = serde_json::from_str("{}").unwrap();
        assert_eq!(state.schema_version, 1);
        assert_eq!(state.max_alert_history, 100);
        assert!(state.known_flare_ids.is_empty());
    }

    #[test]
    fn unknown_fields_are_tolerated_on_load() {
        let state: CheckerState =
            serde_json::from_str(r#"{"lastKp": 0, "totallyUnknownField": 42}"#).unwrap();
        assert_eq!(state.last_kp, 0.0);
    }

    #[test]
    fn alerts_sent_truncated_to_max_history() {
        let mut state = CheckerState {
            max_alert_history: 2,
            ..Default::default()
        };
        let ts = Utc::now();
        state.record_dispatched(vec![
            Alert::new(AlertType::KpThreshold, Urgency::High, "a", "b", ts, None),
            Alert::new(AlertType::KpThreshold, Urgency::High, "a", "b", ts, None),
            Alert::new(AlertType::KpThreshold, Urgency::High, "a", "b", ts, None),
        ]);
        assert_eq!(state.alerts_sent.len(), 2);
    }
}
