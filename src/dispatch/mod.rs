//! Dispatcher — spec.md §4.E.
//!
//! Routes each surviving alert to its urgency's channel list. Dispatch is
//! fire-and-try: a channel failure is logged and never aborts the tick.

mod channel;

pub use channel::{DeliveryChannel, DeliveryError, DesktopChannel, SignalChannel};

use std::collections::HashMap;

use tracing::warn;

use crate::config::AppConfig;
use crate::types::{Alert, AlertType, Urgency};

/// Merge the tick's `info` alerts per spec.md §4.E: exactly one is
/// dispatched alone, two or more collapse into a single synthetic batch.
pub fn batch_info_alerts(alerts: Vec<Alert>) -> Vec<Alert> {
    let (info, rest): (Vec<Alert>, Vec<Alert>) =
        alerts.into_iter().partition(|a| a.urgency == Urgency::Info);

    if info.len() < 2 {
        let mut out = rest;
        out.extend(info);
        return out;
    }

    let title = format!("{} Space Weather Updates", info.len());
    let body = info
        .iter()
        .map(|a| a.title.as_str())
        .collect::<Vec<_>>()
        .join(" · ");
    let latest_timestamp = info.iter().map(|a| a.timestamp).max().unwrap();
    let batched = Alert::new(
        AlertType::KpElevated,
        Urgency::Info,
        title,
        body,
        latest_timestamp,
        None,
    );

    let mut out = rest;
    out.push(batched);
    out
}

/// Dispatch every alert to the channels its urgency routes to. Returns the
/// alerts that were attempted (used by the caller to record cooldowns) —
/// per-channel failures are logged, not propagated.
pub async fn dispatch(
    alerts: &[Alert],
    config: &AppConfig,
    channels: &HashMap<String, Box<dyn DeliveryChannel>>,
) {
    for alert in alerts {
        let channel_ids: &[String] = match alert.urgency {
            Urgency::Critical => &config.channels.critical,
            Urgency::High => &config.channels.high,
            Urgency::Moderate => &config.channels.moderate,
            Urgency::Info => &config.channels.info,
        };
        for channel_id in channel_ids {
            let Some(channel) = channels.get(channel_id) else {
                warn!(channel = %channel_id, "no delivery channel registered with this id");
                continue;
            };
            if let Err(e) = channel.send(alert).await {
                warn!(channel = %channel_id, alert_id = %alert.id, error = %e, "delivery channel failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn info_alert(title: &str) -> Alert {
        Alert::new(
            AlertType::KpElevated,
            Urgency::Info,
            title,
            "body",
            Utc::now(),
            None,
        )
    }

    #[test]
    fn single_info_alert_passes_through_unbatched() {
        let alerts = vec![info_alert("a")];
        let result = batch_info_alerts(alerts);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "a");
    }

    #[test]
    fn multiple_info_alerts_collapse_into_one() {
        let alerts = vec![info_alert("a"), info_alert("b"), info_alert("c")];
        let result = batch_info_alerts(alerts);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "3 Space Weather Updates");
        assert_eq!(result[0].body, "a · b · c");
    }

    #[test]
    fn non_info_alerts_are_never_batched() {
        let critical = Alert::new(
            AlertType::FlareX,
            Urgency::Critical,
            "x",
            "body",
            Utc::now(),
            None,
        );
        let alerts = vec![critical.clone(), info_alert("a"), info_alert("b")];
        let result = batch_info_alerts(alerts);
        assert_eq!(result.len(), 2);
        assert!(result.iter().any(|a| a.id == critical.id));
    }
}
