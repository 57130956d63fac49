//! Fixed lookup tables and formatting helpers shared by several evaluator
//! rules: impact sentences and CME arrival ETA strings (spec.md §4.C
//! "Numeric semantics").

use chrono::{DateTime, Utc};

/// Impact sentence for an integer Kp bucket, `min(floor(kp), 9)`.
pub fn kp_impact_sentence(kp_floor: i64) -> &'static str {
    match kp_floor.clamp(0, 9) {
        0..=3 => "minimal geomagnetic impact expected",
        4 => "minor impact: aurora visible at high latitudes",
        5 => "G1 storm: weak power grid fluctuations possible, aurora visible at mid latitudes",
        6 => "G2 storm: high-latitude power systems may see voltage alarms, aurora visible further south",
        7 => "G3 storm: voltage corrections may be required, satellite drag increases, aurora visible at mid latitudes",
        8 => "G4 storm: widespread voltage control problems possible, aurora visible at low latitudes",
        _ => "G5 storm: grid system collapse possible, extensive satellite and radio disruption",
    }
}

/// Impact sentence for a Bz magnitude bucket (`-10`, `-15`, `-20`).
pub fn bz_impact_sentence(bz: f64) -> &'static str {
    if bz <= -20.0 {
        "strongly geoeffective — severe storm conditions likely"
    } else if bz <= -15.0 {
        "strongly geoeffective — storm conditions likely"
    } else {
        "geoeffective — minor storm conditions possible"
    }
}

/// Impact sentence for a solar wind speed bucket (`600`, `700`).
pub fn wind_speed_impact_sentence(speed: f64) -> &'static str {
    if speed >= 700.0 {
        "high-speed stream conditions — elevated geomagnetic activity likely"
    } else {
        "elevated solar wind — minor geomagnetic activity possible"
    }
}

/// Impact sentence keyed by flare class letter (`M`/`X`).
pub fn flare_impact_sentence(letter: char) -> &'static str {
    match letter {
        'X' => "strong radio blackout possible on the sunlit side of Earth",
        'M' => "moderate radio blackout possible on the sunlit side of Earth",
        _ => "minimal radio blackout risk",
    }
}

/// Format a CME arrival ETA relative to `now`, per spec.md §4.C edge cases.
pub fn format_eta(now: DateTime<Utc>, predicted_arrival: Option<DateTime<Utc>>) -> String {
    let Some(arrival) = predicted_arrival else {
        return "arrival time unknown".to_string();
    };
    let delta = arrival.signed_duration_since(now);
    if delta.num_seconds() < 0 {
        return "already past predicted arrival".to_string();
    }
    if delta.num_hours() < 1 {
        return "imminent".to_string();
    }
    if delta.num_hours() < 24 {
        return format!("~{}h", delta.num_hours());
    }
    format!("~{}d", delta.num_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn eta_buckets() {
        let now = Utc::now();
        assert_eq!(format_eta(now, None), "arrival time unknown");
        assert_eq!(
            format_eta(now, Some(now - Duration::hours(1))),
            "already past predicted arrival"
        );
        assert_eq!(format_eta(now, Some(now + Duration::minutes(30))), "imminent");
        assert_eq!(format_eta(now, Some(now + Duration::hours(18))), "~18h");
        assert_eq!(format_eta(now, Some(now + Duration::hours(72))), "~3d");
    }

    #[test]
    fn kp_impact_sentence_covers_full_range() {
        assert!(kp_impact_sentence(4).contains("minor"));
        assert!(kp_impact_sentence(9).contains("G5"));
        assert!(kp_impact_sentence(12).contains("G5"));
    }
}
