//! The evaluator — spec.md §4.C, the most intricate part of the pipeline.
//!
//! A pure function over `(Snapshot, ActiveRegion[], CheckerState)` that
//! emits an unordered set of candidate [`Alert`]s. No I/O, no internal
//! cooperative yield points (spec.md §5).

mod impact;

use chrono::Utc;

use crate::config::AppConfig;
use crate::types::{Alert, AlertType, CheckerState, Snapshot, Urgency};

/// Evaluate one tick. Rules run in the fixed order spec.md §4.C lists;
/// the order affects only log sequencing, never the resulting state.
pub fn evaluate(
    snapshot: &Snapshot,
    active_regions: &[crate::types::ActiveRegion],
    state: &CheckerState,
    config: &AppConfig,
) -> Vec<Alert> {
    let now = snapshot.timestamp;
    let mut alerts = Vec::new();

    rule_cmes(snapshot, state, config, now, &mut alerts);
    rule_flares(snapshot, state, now, &mut alerts);
    rule_hss(snapshot, state, now, &mut alerts);
    rule_kp_crossings(snapshot, state, config, now, &mut alerts);
    rule_bz_crossings(snapshot, state, config, now, &mut alerts);
    rule_wind_speed_crossings(snapshot, state, config, now, &mut alerts);
    rule_wind_density_spike(snapshot, state, config, now, &mut alerts);
    rule_active_regions(active_regions, state, config, now, &mut alerts);
    rule_all_clear(snapshot, state, config, now, &mut alerts);

    alerts
}

fn bz_of(snapshot: &Snapshot) -> f64 {
    snapshot.magnetic_field.map(|m| m.bz).unwrap_or(0.0)
}

fn wind_speed_of(snapshot: &Snapshot) -> f64 {
    snapshot.solar_wind.map(|w| w.speed).unwrap_or(0.0)
}

fn wind_density_of(snapshot: &Snapshot) -> f64 {
    snapshot.solar_wind.map(|w| w.density).unwrap_or(0.0)
}

fn rule_cmes(
    snapshot: &Snapshot,
    state: &CheckerState,
    config: &AppConfig,
    now: chrono::DateTime<Utc>,
    alerts: &mut Vec<Alert>,
) {
    for cme in &snapshot.earth_directed_cmes {
        let predicted_kp = cme.predicted_kp.unwrap_or(0.0);
        match state.known_cmes.get(&cme.id) {
            None => {
                let urgency = if predicted_kp >= 7.0 {
                    Urgency::Critical
                } else {
                    Urgency::High
                };
                let eta = impact::format_eta(now, cme.predicted_arrival);
                let speed = cme
                    .speed_km_s
                    .map(|s| format!("{s:.0} km/s"))
                    .unwrap_or_else(|| "unknown speed".to_string());
                let impact_sentence = if cme.predicted_kp.is_some() {
                    impact::kp_impact_sentence(predicted_kp.floor().min(9.0) as i64)
                } else {
                    "impact magnitude unknown"
                };
                let body = format!(
                    "Earth-directed CME detected, speed {speed}, arrival {eta}. {impact_sentence}."
                );
                alerts.push(Alert::new(
                    AlertType::CmeEarth,
                    urgency,
                    format!("Earth-Directed CME Detected — {}", cme.id),
                    body,
                    now,
                    Some(cme.id.clone()),
                ));
            }
            Some(known) => {
                let jump = predicted_kp - known.predicted_kp;
                if jump >= config.thresholds.cme_revision.kp_jump && predicted_kp >= 5.0 {
                    let urgency = if predicted_kp >= 7.0 {
                        Urgency::Critical
                    } else {
                        Urgency::High
                    };
                    let body = format!(
                        "CME {} forecast revised upward: predicted Kp {:.1} → {:.1}.",
                        cme.id, known.predicted_kp, predicted_kp
                    );
                    alerts.push(Alert::new(
                        AlertType::CmeRevision,
                        urgency,
                        format!("CME Forecast Revised — {}", cme.id),
                        body,
                        now,
                        None,
                    ));
                }
            }
        }
    }
}

fn rule_flares(
    snapshot: &Snapshot,
    state: &CheckerState,
    now: chrono::DateTime<Utc>,
    alerts: &mut Vec<Alert>,
) {
    for flare in &snapshot.recent_flares {
        if state.known_flare_ids.contains(&flare.id) {
            continue;
        }
        let Some(letter) = flare.class_letter() else {
            continue;
        };
        let (alert_type, urgency) = match letter {
            'X' => (AlertType::FlareX, Urgency::Critical),
            'M' => (AlertType::FlareM, Urgency::High),
            _ => continue,
        };
        let body = format!(
            "{} flare detected. {}",
            flare.class_type,
            impact::flare_impact_sentence(letter)
        );
        alerts.push(Alert::new(
            alert_type,
            urgency,
            format!("{} Flare Detected", flare.class_type),
            body,
            now,
            Some(flare.id.clone()),
        ));
    }
}

fn rule_hss(
    snapshot: &Snapshot,
    state: &CheckerState,
    now: chrono::DateTime<Utc>,
    alerts: &mut Vec<Alert>,
) {
    for arrival in &snapshot.hss {
        if state.known_hss_ids.contains(&arrival.id) {
            continue;
        }
        alerts.push(Alert::new(
            AlertType::HssArrival,
            Urgency::Moderate,
            "High-Speed Solar Wind Stream Arrival",
            format!("A high-speed stream from a coronal hole is arriving ({}).", arrival.id),
            now,
            Some(arrival.id.clone()),
        ));
    }
}

fn rule_kp_crossings(
    snapshot: &Snapshot,
    state: &CheckerState,
    config: &AppConfig,
    now: chrono::DateTime<Utc>,
    alerts: &mut Vec<Alert>,
) {
    let kp = snapshot.kp;
    let prev_kp = state.last_kp;
    let t = &config.thresholds.kp;

    if kp >= t.major && prev_kp < t.major {
        alerts.push(Alert::new(
            AlertType::KpThreshold,
            Urgency::Critical,
            format!("Kp {kp:.1} — G3+ Major Storm Threshold"),
            format!(
                "Planetary Kp index reached {kp:.1}. {}",
                impact::kp_impact_sentence(kp.floor().min(9.0) as i64)
            ),
            now,
            None,
        ));
    } else if kp >= t.storm && prev_kp < t.storm {
        alerts.push(Alert::new(
            AlertType::KpThreshold,
            Urgency::High,
            format!("Kp {kp:.1} — G1 Storm Threshold"),
            format!(
                "Planetary Kp index reached {kp:.1}. {}",
                impact::kp_impact_sentence(kp.floor().min(9.0) as i64)
            ),
            now,
            None,
        ));
    } else if kp >= t.elevated && prev_kp < t.elevated {
        alerts.push(Alert::new(
            AlertType::KpElevated,
            Urgency::Info,
            format!("Kp {kp:.1} — Elevated Geomagnetic Activity"),
            format!("Planetary Kp index reached {kp:.1}, above the elevated threshold."),
            now,
            None,
        ));
    }
}

fn rule_bz_crossings(
    snapshot: &Snapshot,
    state: &CheckerState,
    config: &AppConfig,
    now: chrono::DateTime<Utc>,
    alerts: &mut Vec<Alert>,
) {
    let bz = bz_of(snapshot);
    let prev_bz = state.last_bz;
    let t = &config.thresholds.bz;

    if bz <= t.strong && prev_bz > t.strong {
        alerts.push(Alert::new(
            AlertType::BzThreshold,
            Urgency::High,
            format!("Bz {bz:.1} nT — Strongly Southward"),
            format!(
                "Interplanetary magnetic field Bz dropped to {bz:.1} nT. {}",
                impact::bz_impact_sentence(bz)
            ),
            now,
            None,
        ));
    } else if bz <= t.moderate && prev_bz > t.moderate {
        alerts.push(Alert::new(
            AlertType::BzThreshold,
            Urgency::Moderate,
            format!("Bz {bz:.1} nT — Southward"),
            format!(
                "Interplanetary magnetic field Bz dropped to {bz:.1} nT. {}",
                impact::bz_impact_sentence(bz)
            ),
            now,
            None,
        ));
    }
}

fn rule_wind_speed_crossings(
    snapshot: &Snapshot,
    state: &CheckerState,
    config: &AppConfig,
    now: chrono::DateTime<Utc>,
    alerts: &mut Vec<Alert>,
) {
    let speed = wind_speed_of(snapshot);
    let prev_speed = state.last_wind_speed;
    let t = &config.thresholds.wind_speed;

    if speed >= t.high && prev_speed < t.high {
        alerts.push(Alert::new(
            AlertType::WindSpeed,
            Urgency::High,
            format!("Solar Wind Speed {speed:.0} km/s"),
            format!(
                "Solar wind speed reached {speed:.0} km/s. {}",
                impact::wind_speed_impact_sentence(speed)
            ),
            now,
            None,
        ));
    } else if speed >= t.elevated && prev_speed < t.elevated {
        alerts.push(Alert::new(
            AlertType::WindSpeed,
            Urgency::Moderate,
            format!("Solar Wind Speed {speed:.0} km/s"),
            format!(
                "Solar wind speed reached {speed:.0} km/s. {}",
                impact::wind_speed_impact_sentence(speed)
            ),
            now,
            None,
        ));
    }
}

fn rule_wind_density_spike(
    snapshot: &Snapshot,
    state: &CheckerState,
    config: &AppConfig,
    now: chrono::DateTime<Utc>,
    alerts: &mut Vec<Alert>,
) {
    let density = wind_density_of(snapshot);
    let prev_density = state.last_wind_density;
    let t = &config.thresholds.density;

    if density >= t.high && prev_density < t.high {
        alerts.push(Alert::new(
            AlertType::WindDensity,
            Urgency::Moderate,
            format!("Solar Wind Density Spike {density:.1} p/cm³"),
            format!("Solar wind proton density spiked to {density:.1} p/cm³."),
            now,
            None,
        ));
    }
}

fn rule_active_regions(
    active_regions: &[crate::types::ActiveRegion],
    state: &CheckerState,
    config: &AppConfig,
    now: chrono::DateTime<Utc>,
    alerts: &mut Vec<Alert>,
) {
    let t = &config.thresholds.active_region;
    for region in active_regions {
        if state.known_region_numbers.contains(&region.region_number) {
            continue;
        }
        if region.flare_prob_m >= t.m_flare_prob || region.flare_prob_x >= t.x_flare_prob {
            alerts.push(Alert::new(
                AlertType::ActiveRegion,
                Urgency::Info,
                format!("Active Region {} Elevated Flare Risk", region.region_number),
                format!(
                    "Region {} at {}: M-class probability {:.0}%, X-class probability {:.0}%.",
                    region.region_number, region.location, region.flare_prob_m, region.flare_prob_x
                ),
                now,
                Some(region.region_number.to_string()),
            ));
        }
    }
}

fn rule_all_clear(
    snapshot: &Snapshot,
    state: &CheckerState,
    config: &AppConfig,
    now: chrono::DateTime<Utc>,
    alerts: &mut Vec<Alert>,
) {
    let kp = snapshot.kp;
    let bz = bz_of(snapshot);
    let speed = wind_speed_of(snapshot);
    let t = &config.thresholds;

    // Open question (spec.md §9): a Kp-7+ recovery is intentionally folded
    // into the same G1 all-clear rather than emitting a distinct alert.
    if state.kp_was_above_5 && kp < t.kp.storm {
        alerts.push(Alert::new(
            AlertType::AllClear,
            Urgency::Moderate,
            "Geomagnetic Storm All-Clear",
            format!("Kp index has recovered to {kp:.1}, below the G1 storm threshold."),
            now,
            None,
        ));
    }
    if state.bz_was_below_15 && bz > t.bz.moderate {
        alerts.push(Alert::new(
            AlertType::AllClear,
            Urgency::Moderate,
            "Magnetic Field All-Clear",
            format!("Interplanetary Bz has recovered to {bz:.1} nT."),
            now,
            None,
        ));
    }
    if state.wind_was_above_700 && speed < t.wind_speed.elevated {
        alerts.push(Alert::new(
            AlertType::AllClear,
            Urgency::Moderate,
            "Solar Wind All-Clear",
            format!("Solar wind speed has recovered to {speed:.0} km/s."),
            now,
            None,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::types::MagneticField;

    fn snapshot_with_kp(kp: f64) -> Snapshot {
        Snapshot {
            kp,
            ..Default::default()
        }
    }

    #[test]
    fn kp_crossing_5_emits_high_threshold_alert() {
        let snapshot = snapshot_with_kp(5.3);
        let mut state = CheckerState::default();
        state.last_kp = 4.0;
        let config = AppConfig::default();
        let alerts = evaluate(&snapshot, &[], &state, &config);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::KpThreshold);
        assert_eq!(alerts[0].urgency, Urgency::High);
        assert_eq!(alerts[0].title, "Kp 5.3 — G1 Storm Threshold");
    }

    #[test]
    fn kp_crossing_7_emits_only_the_highest_branch() {
        let snapshot = snapshot_with_kp(7.5);
        let mut state = CheckerState::default();
        state.last_kp = 3.0;
        let config = AppConfig::default();
        let alerts = evaluate(&snapshot, &[], &state, &config);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].urgency, Urgency::Critical);
    }

    #[test]
    fn missing_magnetic_field_defaults_bz_to_zero_and_never_crosses() {
        let snapshot = Snapshot {
            magnetic_field: None,
            ..Default::default()
        };
        let mut state = CheckerState::default();
        state.last_bz = -1.0;
        let config = AppConfig::default();
        let alerts = evaluate(&snapshot, &[], &state, &config);
        assert!(alerts.iter().all(|a| a.alert_type != AlertType::BzThreshold));
    }

    #[test]
    fn bz_crossing_strong_threshold() {
        let snapshot = Snapshot {
            magnetic_field: Some(MagneticField {
                bx: 0.0,
                by: 0.0,
                bz: -16.0,
                bt: 16.0,
            }),
            ..Default::default()
        };
        let mut state = CheckerState::default();
        state.last_bz = -5.0;
        let config = AppConfig::default();
        let alerts = evaluate(&snapshot, &[], &state, &config);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].urgency, Urgency::High);
    }

    #[test]
    fn all_clear_fires_once_on_recovery() {
        let snapshot = snapshot_with_kp(3.5);
        let mut state = CheckerState::default();
        state.kp_was_above_5 = true;
        let config = AppConfig::default();
        let alerts = evaluate(&snapshot, &[], &state, &config);
        assert!(alerts.iter().any(|a| a.alert_type == AlertType::AllClear));
    }

    #[test]
    fn new_flare_x_class_emits_critical_alert() {
        let snapshot = Snapshot {
            recent_flares: vec![crate::types::FlareEvent {
                id: "flr-1".into(),
                begin_time: Utc::now(),
                class_type: "X1.4".into(),
                source_region: None,
            }],
            ..Default::default()
        };
        let state = CheckerState::default();
        let config = AppConfig::default();
        let alerts = evaluate(&snapshot, &[], &state, &config);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::FlareX);
        assert_eq!(alerts[0].urgency, Urgency::Critical);
    }

    #[test]
    fn active_region_rule_fires_for_new_high_risk_region() {
        let snapshot = Snapshot::default();
        let state = CheckerState::default();
        let config = AppConfig::default();
        let regions = vec![crate::types::ActiveRegion {
            region_number: 3500,
            location: "N10W20".into(),
            magnetic_class: "Beta-Gamma".into(),
            number_spots: 12,
            flare_prob_c: 80.0,
            flare_prob_m: 35.0,
            flare_prob_x: 5.0,
            proton_prob: 1.0,
        }];
        let alerts = evaluate(&snapshot, &regions, &state, &config);
        assert!(alerts.iter().any(|a| a.alert_type == AlertType::ActiveRegion));
    }

    #[test]
    fn known_active_region_is_not_repeated() {
        let snapshot = Snapshot::default();
        let mut state = CheckerState::default();
        state.known_region_numbers.insert(3500);
        let config = AppConfig::default();
        let regions = vec![crate::types::ActiveRegion {
            region_number: 3500,
            location: "N10W20".into(),
            magnetic_class: "Beta-Gamma".into(),
            number_spots: 12,
            flare_prob_c: 80.0,
            flare_prob_m: 35.0,
            flare_prob_x: 5.0,
            proton_prob: 1.0,
        }];
        let alerts = evaluate(&snapshot, &regions, &state, &config);
        assert!(!alerts.iter().any(|a| a.alert_type == AlertType::ActiveRegion));
    }
}
