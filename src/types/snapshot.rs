//! The per-tick snapshot assembled from all upstream feeds, and the
//! active-region list consumed alongside it by the evaluator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// NOAA geomagnetic storm scale, `G0` (none) through `G5` (extreme).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum GScale {
    #[default]
    G0,
    G1,
    G2,
    G3,
    G4,
    G5,
}

impl GScale {
    /// Map a Kp index to the storm scale it crosses into.
    pub fn from_kp(kp: f64) -> Self {
        match kp.floor() as i64 {
            i64::MIN..=4 => GScale::G0,
            5 => GScale::G1,
            6 => GScale::G2,
            7 => GScale::G3,
            8 => GScale::G4,
            _ => GScale::G5,
        }
    }
}

/// NOAA solar radio blackout scale, keyed off X-ray flux class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RScale {
    #[default]
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
}

/// NOAA solar energetic particle scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SScale {
    #[default]
    S0,
    S1,
    S2,
    S3,
    S4,
    S5,
}

/// Solar wind plasma parameters from the realtime or 7-day feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolarWind {
    pub speed: f64,
    pub density: f64,
    pub temperature: f64,
}

/// Interplanetary magnetic field components, nT.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MagneticField {
    pub bx: f64,
    pub by: f64,
    pub bz: f64,
    pub bt: f64,
}

/// A coronal mass ejection entry, Earth-directed or otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CmeEvent {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub predicted_kp: Option<f64>,
    pub predicted_arrival: Option<DateTime<Utc>>,
    pub is_earth_directed: bool,
    pub speed_km_s: Option<f64>,
}

/// A solar flare observation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlareEvent {
    pub id: String,
    pub begin_time: DateTime<Utc>,
    /// Full class string, e.g. `"M2.1"` or `"X1.4"`.
    pub class_type: String,
    pub source_region: Option<u32>,
}

impl FlareEvent {
    /// The leading class letter (`A`..`X`), uppercased.
    pub fn class_letter(&self) -> Option<char> {
        self.class_type.chars().next().map(|c| c.to_ascii_uppercase())
    }

    /// Numeric magnitude following the class letter, e.g. `2.1` in `"M2.1"`.
    pub fn class_magnitude(&self) -> Option<f64> {
        self.class_type.get(1..).and_then(|s| s.parse().ok())
    }

    /// Whether this flare is class M or above (used by the verifier).
    pub fn is_m_or_above(&self) -> bool {
        matches!(self.class_letter(), Some('M') | Some('X'))
    }
}

/// A geomagnetic storm record (observed Kp for a 3-hour window).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StormEvent {
    pub id: String,
    pub time_tag: DateTime<Utc>,
    pub kp_index: f64,
}

/// A solar energetic particle event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SepEvent {
    pub id: String,
    pub event_time: DateTime<Utc>,
}

/// A high-speed solar wind stream arrival from a coronal hole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HssEvent {
    pub id: String,
    pub arrival_time: DateTime<Utc>,
}

/// An interplanetary shock record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IpsEvent {
    pub id: String,
    pub time_tag: DateTime<Utc>,
}

/// A magnetopause crossing record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MpcEvent {
    pub id: String,
    pub time_tag: DateTime<Utc>,
}

/// An upstream NOAA product / active alert message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAlertProduct {
    pub id: String,
    pub product_id: String,
    pub issue_time: DateTime<Utc>,
    pub message: String,
}

/// A solar active region, keyed by its unique NOAA region number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRegion {
    pub region_number: u32,
    pub location: String,
    pub magnetic_class: String,
    pub number_spots: u32,
    pub flare_prob_c: f64,
    pub flare_prob_m: f64,
    pub flare_prob_x: f64,
    pub proton_prob: f64,
}

/// The assembled observation for a single checker tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,

    pub kp: f64,
    /// Ordered sequence of recent Kp readings, most recent last, length <= 8.
    pub kp_forecast_24h: Vec<f64>,
    pub g_scale: Option<GScale>,

    pub xray_flux: Option<f64>,
    pub latest_flare: Option<FlareEvent>,
    pub s_scale: Option<SScale>,
    pub r_scale: Option<RScale>,

    pub solar_wind: Option<SolarWind>,
    pub magnetic_field: Option<MagneticField>,

    pub cmes: Vec<CmeEvent>,
    pub earth_directed_cmes: Vec<CmeEvent>,
    pub recent_flares: Vec<FlareEvent>,
    pub recent_storms: Vec<StormEvent>,
    pub seps: Vec<SepEvent>,
    pub hss: Vec<HssEvent>,
    pub ips: Vec<IpsEvent>,
    pub mpc: Vec<MpcEvent>,

    pub active_alerts: Vec<ActiveAlertProduct>,
    pub forecast_3day: Option<String>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            fetched_at: DateTime::<Utc>::UNIX_EPOCH,
            kp: 0.0,
            kp_forecast_24h: Vec::new(),
            g_scale: None,
            xray_flux: None,
            latest_flare: None,
            s_scale: None,
            r_scale: None,
            solar_wind: None,
            magnetic_field: None,
            cmes: Vec::new(),
            earth_directed_cmes: Vec::new(),
            recent_flares: Vec::new(),
            recent_storms: Vec::new(),
            seps: Vec::new(),
            hss: Vec::new(),
            ips: Vec::new(),
            mpc: Vec::new(),
            active_alerts: Vec::new(),
            forecast_3day: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flare_class_letter_and_magnitude() {
        let flare = FlareEvent {
            id: "f1".into(),
            begin_time: Utc::now(),
            class_type: "m2.1".into(),
            source_region: None,
        };
        assert_eq!(flare.class_letter(), Some('M'));
        assert_eq!(flare.class_magnitude(), Some(2.1));
        assert!(flare.is_m_or_above());
    }

    #[test]
    fn c_class_flare_is_not_m_or_above() {
        let flare = FlareEvent {
            id: "f2".into(),
            begin_time: Utc::now(),
            class_type: "C3.0".into(),
            source_region: None,
        };
        assert!(!flare.is_m_or_above());
    }

    #[test]
    fn gscale_buckets_match_kp() {
        assert_eq!(GScale::from_kp(4.9), GScale::G0);
        assert_eq!(GScale::from_kp(5.3), GScale::G1);
        assert_eq!(GScale::from_kp(9.0), GScale::G5);
    }
}
