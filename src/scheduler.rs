//! Tick orchestration — spec.md §4, §7.
//!
//! One call to [`run_tick`] performs the whole pipeline: acquire the lock,
//! load state, fetch, assemble, evaluate, filter, dispatch, save, verify,
//! release. A failure anywhere past state load still reaches the save at
//! the end, so `lastRunAt` always advances (spec.md §7: "an uncaught
//! failure still updates lastRunAt and persists").

use std::collections::HashMap;
use std::path::Path;

use chrono::Timelike;
use tracing::{info, warn};

use crate::assembler;
use crate::config::AppConfig;
use crate::dispatch::{self, DeliveryChannel, DesktopChannel, SignalChannel};
use crate::evaluator;
use crate::fetchers::{self, FetchClient};
use crate::filter;
use crate::logging;
use crate::store::{Acquisition, PredictionStore, ProcessLock, StateStore};
use crate::types::KnownCme;
use crate::verify;

/// Build the default channel registry named in spec.md §6: `signal` and
/// `desktop`, both thin logging stubs (spec.md §1 non-goal: real delivery
/// transports are out of scope).
pub fn default_channels() -> HashMap<String, Box<dyn DeliveryChannel>> {
    let mut channels: HashMap<String, Box<dyn DeliveryChannel>> = HashMap::new();
    channels.insert("signal".to_string(), Box::new(SignalChannel));
    channels.insert("desktop".to_string(), Box::new(DesktopChannel));
    channels
}

/// Run one checker tick against `data_dir`, using `channels` for dispatch.
/// Returns without error even when individual upstream fetches fail —
/// only lock contention or a second-tick-while-running short-circuits
/// early, both logged and not propagated.
pub async fn run_tick(
    data_dir: &Path,
    config: &AppConfig,
    channels: &HashMap<String, Box<dyn DeliveryChannel>>,
) {
    let log_path = logging::log_file_path(data_dir);
    if let Err(e) = logging::truncate_if_oversized(&log_path, config.max_log_size_bytes) {
        warn!(error = %e, "failed to truncate log file");
    }

    let lock_path = data_dir.join("checker.lock");
    let lock = match ProcessLock::acquire(&lock_path, config.lock_timeout()) {
        Ok(Acquisition::Acquired(lock)) => lock,
        Ok(Acquisition::RefusedLiveHolder { holder_pid }) => {
            info!(holder_pid, "tick skipped, another checker instance is running");
            return;
        }
        Err(e) => {
            warn!(error = %e, "failed to acquire checker lock, skipping tick");
            return;
        }
    };

    let state_store = StateStore::new(data_dir);
    let mut state = state_store.load();

    let client = FetchClient::new(config.fetch_timeout());
    let fetch_set = fetchers::fetch_all(&client).await;
    let active_regions = fetch_set
        .active_regions
        .as_ref()
        .ok()
        .cloned()
        .unwrap_or_default();
    let active_alert_ids: Vec<String> = fetch_set
        .active_alerts
        .as_ref()
        .ok()
        .map(|alerts| alerts.iter().map(|a| a.id.clone()).collect())
        .unwrap_or_default();
    let data_health = fetchers::build_data_health(&fetch_set, &state.data_health);

    let snapshot = assembler::assemble(fetch_set, &state);

    let candidates = evaluator::evaluate(&snapshot, &active_regions, &state, config);
    let now = snapshot.timestamp;
    let local_hour = chrono::Local::now().hour();
    let surviving = filter::filter_alerts(candidates, &state, config, now, local_hour);
    let dispatched = dispatch::batch_info_alerts(surviving);

    dispatch::dispatch(&dispatched, config, channels).await;
    filter::record_cooldowns(&mut state, &dispatched, now);

    // Replaced wholesale each tick, not merged — novelty is "present now,
    // absent in the previous snapshot", so an id that rolls off an upstream
    // feed's window must be able to count as new again if it reappears.
    state.known_cmes = snapshot
        .earth_directed_cmes
        .iter()
        .map(|cme| {
            (
                cme.id.clone(),
                KnownCme {
                    id: cme.id.clone(),
                    predicted_kp: cme.predicted_kp.unwrap_or(0.0),
                    predicted_arrival: cme.predicted_arrival,
                },
            )
        })
        .collect();
    state.known_flare_ids = snapshot.recent_flares.iter().map(|f| f.id.clone()).collect();
    state.known_hss_ids = snapshot.hss.iter().map(|h| h.id.clone()).collect();
    state.known_region_numbers = active_regions.iter().map(|r| r.region_number).collect();
    state.known_alert_product_ids = active_alert_ids.into_iter().collect();

    let kp = snapshot.kp;
    let bz = snapshot.magnetic_field.map(|m| m.bz).unwrap_or(0.0);
    let speed = snapshot.solar_wind.map(|w| w.speed).unwrap_or(0.0);
    let density = snapshot.solar_wind.map(|w| w.density).unwrap_or(0.0);

    state.kp_was_above_5 = kp >= config.thresholds.kp.storm;
    state.kp_was_above_7 = kp >= config.thresholds.kp.major;
    state.bz_was_below_10 = bz <= config.thresholds.bz.moderate;
    state.bz_was_below_15 = bz <= config.thresholds.bz.strong;
    state.wind_was_above_600 = speed >= config.thresholds.wind_speed.elevated;
    state.wind_was_above_700 = speed >= config.thresholds.wind_speed.high;
    state.density_was_above_20 = density >= config.thresholds.density.high;

    state.last_kp = kp;
    state.last_bz = bz;
    state.last_wind_speed = speed;
    state.last_wind_density = density;
    state.data_health = data_health;
    state.max_alert_history = config.max_alert_history;
    state.record_dispatched(dispatched);
    state.last_run_at = Some(now);

    state_store.save(&mut state);

    let prediction_store = PredictionStore::new(data_dir);
    let mut predictions = prediction_store.load();
    let notifications = verify::verify_predictions(
        &mut predictions.predictions,
        &state,
        &snapshot.recent_flares,
        &snapshot.recent_storms,
        &snapshot.earth_directed_cmes,
        now,
    );
    prediction_store.save(&predictions);

    if !notifications.is_empty() {
        dispatch::dispatch(&notifications, config, channels).await;
    }

    lock.release();
    info!(kp, verification_notifications = notifications.len(), "tick complete");
}
