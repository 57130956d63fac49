//! Alert records produced by the evaluator and carried through the
//! filter and dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Urgency classification; also the key into the channel routing table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Info,
    Moderate,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Info => "info",
            Urgency::Moderate => "moderate",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Alert type identifier, used as the cooldown-table key.
///
/// `Display` produces the exact string used in `lastCooldowns` and in
/// the cooldown-table config keys of spec.md §6.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AlertType {
    CmeEarth,
    CmeRevision,
    FlareX,
    FlareM,
    HssArrival,
    KpThreshold,
    KpElevated,
    BzThreshold,
    WindSpeed,
    WindDensity,
    ActiveRegion,
    AllClear,
}

impl AlertType {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertType::CmeEarth => "cme-earth",
            AlertType::CmeRevision => "cme-revision",
            AlertType::FlareX => "flare-x",
            AlertType::FlareM => "flare-m",
            AlertType::HssArrival => "hss-arrival",
            AlertType::KpThreshold => "kp-threshold",
            AlertType::KpElevated => "kp-elevated",
            AlertType::BzThreshold => "bz-threshold",
            AlertType::WindSpeed => "wind-speed",
            AlertType::WindDensity => "wind-density",
            AlertType::ActiveRegion => "active-region",
            AlertType::AllClear => "all-clear",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A candidate or dispatched alert.
///
/// `id` is deterministic for alerts that dedup naturally against a known-id
/// set (e.g. a CME or flare id); for alerts that may legitimately recur
/// (threshold crossings, revisions, all-clear) `id` embeds the emission
/// timestamp so repeated emissions never collide in `alertsSent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub alert_type: AlertType,
    pub urgency: Urgency,
    pub title: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub source_event_id: Option<String>,
}

impl Alert {
    pub fn new(
        alert_type: AlertType,
        urgency: Urgency,
        title: impl Into<String>,
        body: impl Into<String>,
        timestamp: DateTime<Utc>,
        source_event_id: Option<String>,
    ) -> Self {
        let id = match &source_event_id {
            Some(src) => format!("{alert_type}:{src}"),
            None => format!("{alert_type}:{}", timestamp.to_rfc3339()),
        };
        Self {
            id,
            alert_type,
            urgency,
            title: title.into(),
            body: body.into(),
            timestamp,
            source_event_id,
        }
    }
}
