//! Prediction verification — spec.md §4.H.
//!
//! Runs after state save; must not mutate `CheckerState` (spec.md §5).
//! Produces the updated `predictions` vector plus the info-urgency result
//! notifications the dispatcher sends on the caller's behalf.

pub mod scorecard;

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::types::{
    Alert, AlertType, CheckerState, CmeEvent, FlareEvent, MatchedEvent, Prediction,
    PredictionStatus, StormEvent, Urgency,
};

const ALERT_TYPES_COUNTED: &[AlertType] = &[
    AlertType::FlareM,
    AlertType::FlareX,
    AlertType::KpThreshold,
    AlertType::KpElevated,
    AlertType::CmeEarth,
    AlertType::BzThreshold,
    AlertType::WindSpeed,
];

/// Verify every prediction whose window has closed, mutating `predictions`
/// in place and returning an info notification per verified prediction.
pub fn verify_predictions(
    predictions: &mut [Prediction],
    state: &CheckerState,
    recent_flares: &[FlareEvent],
    recent_storms: &[StormEvent],
    earth_directed_cmes: &[CmeEvent],
    now: DateTime<Utc>,
) -> Vec<Alert> {
    let mut notifications = Vec::new();

    for prediction in predictions
        .iter_mut()
        .filter(|p| p.status == PredictionStatus::Pending && p.window_end <= now)
    {
        let matched = matched_events(
            prediction.timestamp,
            prediction.window_end,
            state,
            recent_flares,
            recent_storms,
            earth_directed_cmes,
        );

        prediction.status = if matched.is_empty() {
            PredictionStatus::Miss
        } else {
            PredictionStatus::Hit
        };
        prediction.verified_at = Some(now);
        prediction.matched_events = matched;

        let body = match prediction.status {
            PredictionStatus::Hit => format!(
                "Prediction from {} verified as a hit — {} matching event(s) observed.",
                prediction.timestamp.to_rfc3339(),
                prediction.matched_events.len()
            ),
            _ => format!(
                "Prediction from {} verified as a miss — no matching events observed.",
                prediction.timestamp.to_rfc3339()
            ),
        };
        notifications.push(Alert::new(
            AlertType::AllClear,
            Urgency::Info,
            "Prediction Verification Result",
            body,
            now,
            Some(prediction.id.clone()),
        ));
    }

    notifications
}

fn matched_events(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    state: &CheckerState,
    recent_flares: &[FlareEvent],
    recent_storms: &[StormEvent],
    earth_directed_cmes: &[CmeEvent],
) -> Vec<MatchedEvent> {
    let in_window = |ts: DateTime<Utc>| ts >= window_start && ts <= window_end;
    let mut seen: HashSet<(String, DateTime<Utc>)> = HashSet::new();
    let mut out = Vec::new();

    let mut push = |event_type: &str, description: String, ts: DateTime<Utc>| {
        if !in_window(ts) {
            return;
        }
        let key = (event_type.to_string(), ts);
        if seen.insert(key) {
            out.push(MatchedEvent {
                event_type: event_type.to_string(),
                description,
                timestamp: ts,
            });
        }
    };

    for alert in &state.alerts_sent {
        if ALERT_TYPES_COUNTED.contains(&alert.alert_type) {
            push("alert", alert.title.clone(), alert.timestamp);
        }
    }

    for flare in recent_flares {
        if flare.is_m_or_above() {
            push(
                "flare",
                format!("{} Flare", flare.class_type),
                flare.begin_time,
            );
        }
    }

    for storm in recent_storms {
        if storm.kp_index >= 5.0 {
            push(
                "storm",
                format!("Kp {:.1} Geomagnetic Storm", storm.kp_index),
                storm.time_tag,
            );
        }
    }

    for cme in earth_directed_cmes {
        push("cme", format!("Earth-Directed CME {}", cme.id), cme.start_time);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending_prediction(window_start: DateTime<Utc>, window_hours: i64) -> Prediction {
        Prediction {
            id: "p1".into(),
            timestamp: window_start,
            note: None,
            status: PredictionStatus::Pending,
            verified_at: None,
            window_hours: window_hours as u32,
            window_end: window_start + Duration::hours(window_hours),
            matched_events: Vec::new(),
        }
    }

    #[test]
    fn prediction_becomes_hit_when_m_class_flare_in_window() {
        let now = Utc::now();
        let window_start = now - Duration::hours(49);
        let mut predictions = vec![pending_prediction(window_start, 48)];
        let state = CheckerState::default();
        let flares = vec![FlareEvent {
            id: "f1".into(),
            begin_time: window_start + Duration::hours(10),
            class_type: "M2.1".into(),
            source_region: None,
        }];
        let notifications = verify_predictions(&mut predictions, &state, &flares, &[], &[], now);
        assert_eq!(predictions[0].status, PredictionStatus::Hit);
        assert_eq!(predictions[0].matched_events.len(), 1);
        assert_eq!(predictions[0].matched_events[0].event_type, "flare");
        assert_eq!(notifications.len(), 1);
    }

    #[test]
    fn prediction_becomes_miss_with_no_events() {
        let now = Utc::now();
        let window_start = now - Duration::hours(49);
        let mut predictions = vec![pending_prediction(window_start, 48)];
        let state = CheckerState::default();
        let notifications = verify_predictions(&mut predictions, &state, &[], &[], &[], now);
        assert_eq!(predictions[0].status, PredictionStatus::Miss);
        assert!(predictions[0].matched_events.is_empty());
        assert_eq!(notifications.len(), 1);
    }

    #[test]
    fn unexpired_window_is_left_pending() {
        let now = Utc::now();
        let mut predictions = vec![pending_prediction(now, 48)];
        let state = CheckerState::default();
        let notifications = verify_predictions(&mut predictions, &state, &[], &[], &[], now);
        assert_eq!(predictions[0].status, PredictionStatus::Pending);
        assert!(notifications.is_empty());
    }

    #[test]
    fn events_outside_window_are_not_matched() {
        let now = Utc::now();
        let window_start = now - Duration::hours(49);
        let mut predictions = vec![pending_prediction(window_start, 48)];
        let state = CheckerState::default();
        let flares = vec![FlareEvent {
            id: "f1".into(),
            begin_time: now + Duration::hours(5),
            class_type: "X1.0".into(),
            source_region: None,
        }];
        let notifications = verify_predictions(&mut predictions, &state, &flares, &[], &[], now);
        assert_eq!(predictions[0].status, PredictionStatus::Miss);
        assert_eq!(notifications.len(), 1);
    }
}
