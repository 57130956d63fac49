//! Offline base-rate sampler — spec.md §4.H / §9 ("no historical backfill
//! inside the live pipeline; base-rate computation is an offline one-shot").
//!
//! Given a historical log of significant-event timestamps, estimates the
//! empirical probability that a random window of the configured length
//! contains at least one event, by uniform random sampling across the
//! observed time range. Shared between the `compute-base-rate` binary and
//! anything in-process that wants the same estimate.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Draw `sample_windows` random windows of `window_hours` length from the
/// span covered by `events` (sorted or not), and return the fraction that
/// contain at least one event. Returns `None` if `events` is empty or the
/// observed span is shorter than one window.
pub fn compute_base_rate(
    events: &[DateTime<Utc>],
    window_hours: u32,
    sample_windows: u64,
    rng: &mut impl Rng,
) -> Option<f64> {
    if events.is_empty() {
        return None;
    }
    let earliest = *events.iter().min()?;
    let latest = *events.iter().max()?;
    let window = Duration::hours(window_hours as i64);
    let span = latest.signed_duration_since(earliest) - window;
    if span.num_seconds() <= 0 {
        return None;
    }

    let mut hits = 0u64;
    for _ in 0..sample_windows {
        let offset_secs = rng.gen_range(0..=span.num_seconds());
        let window_start = earliest + Duration::seconds(offset_secs);
        let window_end = window_start + window;
        if events
            .iter()
            .any(|ts| *ts >= window_start && *ts <= window_end)
        {
            hits += 1;
        }
    }

    Some(hits as f64 / sample_windows as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn empty_event_log_yields_none() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(compute_base_rate(&[], 48, 1000, &mut rng), None);
    }

    #[test]
    fn span_shorter_than_window_yields_none() {
        let now = Utc::now();
        let events = vec![now, now + Duration::hours(2)];
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(compute_base_rate(&events, 48, 1000, &mut rng), None);
    }

    #[test]
    fn dense_events_yield_a_high_base_rate() {
        let now = Utc::now();
        let events: Vec<_> = (0..200).map(|i| now + Duration::hours(i)).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let rate = compute_base_rate(&events, 48, 2000, &mut rng).unwrap();
        assert!(rate > 0.9, "expected a high base rate for dense events, got {rate}");
    }

    #[test]
    fn sparse_events_yield_a_low_base_rate() {
        let now = Utc::now();
        let events = vec![now, now + Duration::days(300)];
        let mut rng = StdRng::seed_from_u64(42);
        let rate = compute_base_rate(&events, 1, 2000, &mut rng).unwrap();
        assert!(rate < 0.1, "expected a low base rate for sparse events, got {rate}");
    }
}
