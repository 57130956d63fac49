//! System-wide default constants.
//!
//! Centralises the magic numbers spec.md §6 enumerates, grouped by
//! subsystem for easy discovery. `AppConfig::default()` builds from these;
//! a TOML file overrides individual fields.

// ============================================================================
// Scheduler
// ============================================================================

/// Nominal tick cadence. Informational only — the process is invoked
/// externally (cron/systemd timer); this is not an internal sleep loop.
pub const TICK_CADENCE_MINUTES: u64 = 15;

/// Per-fetcher timeout.
pub const FETCH_TIMEOUT_SECS: u64 = 20;

/// Log file truncation ceiling, bytes.
pub const MAX_LOG_SIZE_BYTES: u64 = 1_000_000;

/// Lock staleness window before a held lock is considered hung and stolen.
pub const LOCK_TIMEOUT_MINUTES: i64 = 10;

// ============================================================================
// Alert history / retention
// ============================================================================

pub const MAX_ALERT_HISTORY: usize = 100;
pub const MAX_PREDICTIONS: usize = 500;

// ============================================================================
// Geomagnetic thresholds
// ============================================================================

pub const KP_ELEVATED: f64 = 4.0;
pub const KP_STORM: f64 = 5.0;
pub const KP_MAJOR: f64 = 7.0;

pub const BZ_MODERATE: f64 = -10.0;
pub const BZ_STRONG: f64 = -15.0;

pub const WIND_SPEED_ELEVATED: f64 = 600.0;
pub const WIND_SPEED_HIGH: f64 = 700.0;

pub const DENSITY_HIGH: f64 = 20.0;

pub const ACTIVE_REGION_M_FLARE_PROB: f64 = 30.0;
pub const ACTIVE_REGION_X_FLARE_PROB: f64 = 10.0;

pub const CME_REVISION_KP_JUMP: f64 = 2.0;

// ============================================================================
// Cooldowns, minutes (0 = never suppress)
// ============================================================================

pub const COOLDOWN_KP_THRESHOLD: u64 = 180;
pub const COOLDOWN_KP_ELEVATED: u64 = 360;
pub const COOLDOWN_BZ_THRESHOLD: u64 = 60;
pub const COOLDOWN_WIND_SPEED: u64 = 60;
pub const COOLDOWN_WIND_DENSITY: u64 = 120;
pub const COOLDOWN_FLARE_M: u64 = 60;
pub const COOLDOWN_FLARE_X: u64 = 0;
pub const COOLDOWN_CME_EARTH: u64 = 0;
pub const COOLDOWN_CME_REVISION: u64 = 60;
pub const COOLDOWN_HSS_ARRIVAL: u64 = 240;
pub const COOLDOWN_ACTIVE_REGION: u64 = 360;
pub const COOLDOWN_ALL_CLEAR: u64 = 60;

// ============================================================================
// Predictions
// ============================================================================

pub const VERIFICATION_WINDOW_HOURS: u32 = 48;
pub const PREDICTION_COOLDOWN_HOURS: u32 = 6;

// ============================================================================
// HTTP server
// ============================================================================

pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8787";
