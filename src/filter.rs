//! Cooldown & quiet-hours filter — spec.md §4.D.

use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::types::{Alert, AlertType, CheckerState, Urgency};

/// Drop candidate alerts whose type is still within cooldown, then drop
/// non-critical alerts if the current local hour lies in the quiet-hours
/// window. Returns the surviving alerts in their original order.
pub fn filter_alerts(
    candidates: Vec<Alert>,
    state: &CheckerState,
    config: &AppConfig,
    now: DateTime<Utc>,
    local_hour: u32,
) -> Vec<Alert> {
    let past_cooldown: Vec<Alert> = candidates
        .into_iter()
        .filter(|alert| !is_within_cooldown(alert.alert_type, state, config, now))
        .collect();

    if config.quiet_hours.contains(local_hour) {
        past_cooldown
            .into_iter()
            .filter(|alert| alert.urgency == Urgency::Critical)
            .collect()
    } else {
        past_cooldown
    }
}

fn is_within_cooldown(
    alert_type: AlertType,
    state: &CheckerState,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> bool {
    let minutes = config.cooldowns.minutes(alert_type);
    if minutes == 0 {
        return false;
    }
    match state.last_cooldowns.get(alert_type.as_str()) {
        Some(last) => now.signed_duration_since(*last) < chrono::Duration::minutes(minutes as i64),
        None => false,
    }
}

/// Record `now` as the last emission time for each dispatched alert's type,
/// so the next tick's cooldown check sees it.
pub fn record_cooldowns(state: &mut CheckerState, dispatched: &[Alert], now: DateTime<Utc>) {
    for alert in dispatched {
        state
            .last_cooldowns
            .insert(alert.alert_type.as_str().to_string(), now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn alert(alert_type: AlertType, urgency: Urgency, ts: DateTime<Utc>) -> Alert {
        Alert::new(alert_type, urgency, "t", "b", ts, None)
    }

    #[test]
    fn suppresses_alert_within_cooldown() {
        let now = Utc::now();
        let mut state = CheckerState::default();
        state
            .last_cooldowns
            .insert("kp-threshold".to_string(), now - Duration::minutes(10));
        let config = AppConfig::default();
        let candidates = vec![alert(AlertType::KpThreshold, Urgency::High, now)];
        let result = filter_alerts(candidates, &state, &config, now, 12);
        assert!(result.is_empty());
    }

    #[test]
    fn allows_alert_after_cooldown_expires() {
        let now = Utc::now();
        let mut state = CheckerState::default();
        state
            .last_cooldowns
            .insert("kp-threshold".to_string(), now - Duration::minutes(200));
        let config = AppConfig::default();
        let candidates = vec![alert(AlertType::KpThreshold, Urgency::High, now)];
        let result = filter_alerts(candidates, &state, &config, now, 12);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn zero_cooldown_never_suppresses() {
        let now = Utc::now();
        let mut state = CheckerState::default();
        state
            .last_cooldowns
            .insert("flare-x".to_string(), now - Duration::seconds(1));
        let config = AppConfig::default();
        let candidates = vec![alert(AlertType::FlareX, Urgency::Critical, now)];
        let result = filter_alerts(candidates, &state, &config, now, 12);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn quiet_hours_drop_non_critical() {
        let now = Utc::now();
        let state = CheckerState::default();
        let mut config = AppConfig::default();
        config.quiet_hours.enabled = true;
        config.quiet_hours.start = 22;
        config.quiet_hours.end = 7;
        let candidates = vec![
            alert(AlertType::KpThreshold, Urgency::High, now),
            alert(AlertType::FlareX, Urgency::Critical, now),
        ];
        let result = filter_alerts(candidates, &state, &config, now, 23);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].urgency, Urgency::Critical);
    }

    #[test]
    fn quiet_hours_disabled_keeps_everything() {
        let now = Utc::now();
        let state = CheckerState::default();
        let config = AppConfig::default();
        let candidates = vec![alert(AlertType::KpElevated, Urgency::Info, now)];
        let result = filter_alerts(candidates, &state, &config, now, 23);
        assert_eq!(result.len(), 1);
    }
}
