//! `AppConfig` — every operator-tunable value named in spec.md §6, as a
//! TOML-serializable, `Default`-complete record.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::AlertType;

use super::defaults::*;

// ============================================================================
// Thresholds
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpThresholds {
    pub elevated: f64,
    pub storm: f64,
    pub major: f64,
}

impl Default for KpThresholds {
    fn default() -> Self {
        Self {
            elevated: KP_ELEVATED,
            storm: KP_STORM,
            major: KP_MAJOR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BzThresholds {
    pub moderate: f64,
    pub strong: f64,
}

impl Default for BzThresholds {
    fn default() -> Self {
        Self {
            moderate: BZ_MODERATE,
            strong: BZ_STRONG,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindSpeedThresholds {
    pub elevated: f64,
    pub high: f64,
}

impl Default for WindSpeedThresholds {
    fn default() -> Self {
        Self {
            elevated: WIND_SPEED_ELEVATED,
            high: WIND_SPEED_HIGH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DensityThresholds {
    pub high: f64,
}

impl Default for DensityThresholds {
    fn default() -> Self {
        Self { high: DENSITY_HIGH }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveRegionThresholds {
    #[serde(rename = "mFlareProb")]
    pub m_flare_prob: f64,
    #[serde(rename = "xFlareProb")]
    pub x_flare_prob: f64,
}

impl Default for ActiveRegionThresholds {
    fn default() -> Self {
        Self {
            m_flare_prob: ACTIVE_REGION_M_FLARE_PROB,
            x_flare_prob: ACTIVE_REGION_X_FLARE_PROB,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmeRevisionThresholds {
    pub kp_jump: f64,
}

impl Default for CmeRevisionThresholds {
    fn default() -> Self {
        Self {
            kp_jump: CME_REVISION_KP_JUMP,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default)]
    pub kp: KpThresholds,
    #[serde(default)]
    pub bz: BzThresholds,
    #[serde(default)]
    pub wind_speed: WindSpeedThresholds,
    #[serde(default)]
    pub density: DensityThresholds,
    #[serde(default)]
    pub active_region: ActiveRegionThresholds,
    #[serde(default)]
    pub cme_revision: CmeRevisionThresholds,
}

// ============================================================================
// Cooldowns
// ============================================================================

/// Minimum interval, in minutes, between two emissions of a given alert
/// type. `0` means never suppress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownConfig {
    #[serde(rename = "kp-threshold")]
    pub kp_threshold: u64,
    #[serde(rename = "kp-elevated")]
    pub kp_elevated: u64,
    #[serde(rename = "bz-threshold")]
    pub bz_threshold: u64,
    #[serde(rename = "wind-speed")]
    pub wind_speed: u64,
    #[serde(rename = "wind-density")]
    pub wind_density: u64,
    #[serde(rename = "flare-m")]
    pub flare_m: u64,
    #[serde(rename = "flare-x")]
    pub flare_x: u64,
    #[serde(rename = "cme-earth")]
    pub cme_earth: u64,
    #[serde(rename = "cme-revision")]
    pub cme_revision: u64,
    #[serde(rename = "hss-arrival")]
    pub hss_arrival: u64,
    #[serde(rename = "active-region")]
    pub active_region: u64,
    #[serde(rename = "all-clear")]
    pub all_clear: u64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            kp_threshold: COOLDOWN_KP_THRESHOLD,
            kp_elevated: COOLDOWN_KP_ELEVATED,
            bz_threshold: COOLDOWN_BZ_THRESHOLD,
            wind_speed: COOLDOWN_WIND_SPEED,
            wind_density: COOLDOWN_WIND_DENSITY,
            flare_m: COOLDOWN_FLARE_M,
            flare_x: COOLDOWN_FLARE_X,
            cme_earth: COOLDOWN_CME_EARTH,
            cme_revision: COOLDOWN_CME_REVISION,
            hss_arrival: COOLDOWN_HSS_ARRIVAL,
            active_region: COOLDOWN_ACTIVE_REGION,
            all_clear: COOLDOWN_ALL_CLEAR,
        }
    }
}

impl CooldownConfig {
    /// Cooldown, in minutes, for the given alert type. `0` means never
    /// suppress.
    pub fn minutes(&self, alert_type: AlertType) -> u64 {
        match alert_type {
            AlertType::KpThreshold => self.kp_threshold,
            AlertType::KpElevated => self.kp_elevated,
            AlertType::BzThreshold => self.bz_threshold,
            AlertType::WindSpeed => self.wind_speed,
            AlertType::WindDensity => self.wind_density,
            AlertType::FlareM => self.flare_m,
            AlertType::FlareX => self.flare_x,
            AlertType::CmeEarth => self.cme_earth,
            AlertType::CmeRevision => self.cme_revision,
            AlertType::HssArrival => self.hss_arrival,
            AlertType::ActiveRegion => self.active_region,
            AlertType::AllClear => self.all_clear,
        }
    }
}

// ============================================================================
// Quiet hours
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuietHoursConfig {
    pub enabled: bool,
    /// Local hour, inclusive start, 0-23.
    pub start: u32,
    /// Local hour, exclusive end, 0-23. `start > end` is an overnight range.
    pub end: u32,
}

impl Default for QuietHoursConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            start: 22,
            end: 7,
        }
    }
}

impl QuietHoursConfig {
    /// Whether `local_hour` (0-23) falls inside the configured window.
    pub fn contains(&self, local_hour: u32) -> bool {
        if !self.enabled {
            return false;
        }
        if self.start <= self.end {
            local_hour >= self.start && local_hour < self.end
        } else {
            local_hour >= self.start || local_hour < self.end
        }
    }
}

// ============================================================================
// Channel routing
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub critical: Vec<String>,
    pub high: Vec<String>,
    pub moderate: Vec<String>,
    pub info: Vec<String>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            critical: vec!["signal".into(), "desktop".into()],
            high: vec!["signal".into(), "desktop".into()],
            moderate: vec!["desktop".into()],
            info: vec!["desktop".into()],
        }
    }
}

// ============================================================================
// HTTP server
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_SERVER_ADDR.to_string(),
        }
    }
}

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub cooldowns: CooldownConfig,
    #[serde(default)]
    pub channels: ChannelConfig,
    #[serde(default)]
    pub quiet_hours: QuietHoursConfig,
    #[serde(default = "default_max_alert_history")]
    pub max_alert_history: usize,
    #[serde(default = "default_lock_timeout_minutes")]
    pub lock_timeout_minutes: i64,
    #[serde(default = "default_max_log_size")]
    pub max_log_size_bytes: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Map of upstream feed name to extra request headers (e.g. API keys
    /// loaded from `.env`), consulted by the fetcher set.
    #[serde(default)]
    pub feed_headers: HashMap<String, String>,
}

fn default_max_alert_history() -> usize {
    MAX_ALERT_HISTORY
}
fn default_lock_timeout_minutes() -> i64 {
    LOCK_TIMEOUT_MINUTES
}
fn default_max_log_size() -> u64 {
    MAX_LOG_SIZE_BYTES
}
fn default_fetch_timeout_secs() -> u64 {
    FETCH_TIMEOUT_SECS
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            cooldowns: CooldownConfig::default(),
            channels: ChannelConfig::default(),
            quiet_hours: QuietHoursConfig::default(),
            max_alert_history: default_max_alert_history(),
            lock_timeout_minutes: default_lock_timeout_minutes(),
            max_log_size_bytes: default_max_log_size(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            server: ServerConfig::default(),
            data_dir: default_data_dir(),
            feed_headers: HashMap::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0:?}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("failed to parse config file {0:?}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

impl AppConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn lock_timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.lock_timeout_minutes)
    }

    /// Load configuration using the standard search order:
    /// 1. `$SPACE_WEATHER_CONFIG` env var
    /// 2. `./space_weather.toml`
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("SPACE_WEATHER_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from SPACE_WEATHER_CONFIG");
                        return config;
                    }
                    Err(e) => warn!(path = %p.display(), error = %e, "Failed to load config from SPACE_WEATHER_CONFIG, falling back"),
                }
            } else {
                warn!(path = %path, "SPACE_WEATHER_CONFIG points to a non-existent file, falling back");
            }
        }

        let local = PathBuf::from("space_weather.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./space_weather.toml");
                    return config;
                }
                Err(e) => warn!(error = %e, "Failed to load ./space_weather.toml, using defaults"),
            }
        }

        info!("No space_weather.toml found — using built-in defaults");
        Self::default()
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cooldowns_match_spec_table() {
        let c = CooldownConfig::default();
        assert_eq!(c.kp_threshold, 180);
        assert_eq!(c.kp_elevated, 360);
        assert_eq!(c.flare_x, 0);
        assert_eq!(c.cme_earth, 0);
    }

    #[test]
    fn quiet_hours_overnight_range() {
        let q = QuietHoursConfig {
            enabled: true,
            start: 22,
            end: 7,
        };
        assert!(q.contains(23));
        assert!(q.contains(2));
        assert!(!q.contains(12));
    }

    #[test]
    fn quiet_hours_disabled_never_contains() {
        let q = QuietHoursConfig {
            enabled: false,
            start: 0,
            end: 23,
        };
        assert!(!q.contains(10));
    }

    #[test]
    fn empty_toml_falls_back_to_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.max_alert_history, 100);
        assert_eq!(config.thresholds.kp.storm, 5.0);
    }

    #[test]
    fn channel_routing_defaults_match_spec() {
        let c = ChannelConfig::default();
        assert_eq!(c.critical, vec!["signal", "desktop"]);
        assert_eq!(c.info, vec!["desktop"]);
    }
}
