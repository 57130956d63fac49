//! Checker configuration module
//!
//! Provides the static, immutable configuration consumed at startup,
//! replacing every hardcoded threshold/cooldown/channel-routing constant
//! in spec.md §6 with an operator-tunable TOML value.
//!
//! ## Loading order
//!
//! 1. `$SPACE_WEATHER_CONFIG` environment variable (path to a TOML file)
//! 2. `space_weather.toml` in the current working directory
//! 3. Built-in defaults, matching every constant named in spec.md §6
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! config::init(AppConfig::load());
//! let cooldown = config::get().cooldowns.minutes(AlertType::KpThreshold);
//! ```

mod app_config;
pub mod defaults;

pub use app_config::*;

use std::sync::OnceLock;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Initialize the global configuration. Must be called exactly once before
/// any call to `get()`. A second call is a no-op, logged as a warning.
pub fn init(config: AppConfig) {
    if APP_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once — ignoring");
    }
}

/// Get a reference to the global configuration.
///
/// Panics if `init()` has not been called — a missing config is a fatal
/// startup error, not a recoverable condition.
pub fn get() -> &'static AppConfig {
    APP_CONFIG
        .get()
        .expect("config::get() called before config::init() — this is a startup bug")
}

/// Whether the global configuration has been initialized. Useful for tests.
pub fn is_initialized() -> bool {
    APP_CONFIG.get().is_some()
}
