//! Prediction scorecard — spec.md §4.H.
//!
//! Aggregate hit/miss statistics plus a one-tailed binomial significance
//! test against a precomputed base rate, `P(X >= hits | n, p)`, computed
//! in log-space via the PMF sum to avoid underflow for large `n`.

use chrono::{DateTime, Utc};
use statrs::distribution::{Binomial, Discrete};

use crate::types::{Prediction, PredictionStatus, Scorecard};

pub fn compute(predictions: &[Prediction], base_rate: Option<f64>, now: DateTime<Utc>) -> Scorecard {
    let hits = predictions
        .iter()
        .filter(|p| p.status == PredictionStatus::Hit)
        .count();
    let misses = predictions
        .iter()
        .filter(|p| p.status == PredictionStatus::Miss)
        .count();
    let pending = predictions
        .iter()
        .filter(|p| p.status == PredictionStatus::Pending)
        .count();

    let hit_rate = if hits + misses > 0 {
        Some(hits as f64 / (hits + misses) as f64)
    } else {
        None
    };

    let total_days_tracked = predictions
        .first()
        .map(|first| now.signed_duration_since(first.timestamp).num_days())
        .unwrap_or(0);

    let p_value = base_rate.and_then(|p| binomial_upper_tail_p_value(hits, hits + misses, p));

    Scorecard {
        hits,
        misses,
        pending,
        hit_rate,
        total_days_tracked,
        p_value,
    }
}

/// One-tailed `P(X >= hits | n, p)`, summed in log-space via `ln_pmf`.
/// Returns `None` when `n == 0` (no completed predictions to test).
fn binomial_upper_tail_p_value(hits: usize, n: usize, p: f64) -> Option<f64> {
    if n == 0 {
        return None;
    }
    let p = p.clamp(0.0, 1.0);
    let dist = Binomial::new(p, n as u64).ok()?;
    let sum: f64 = (hits as u64..=n as u64)
        .map(|k| dist.ln_pmf(k).exp())
        .sum();
    Some(sum.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn prediction(status: PredictionStatus, ts: DateTime<Utc>) -> Prediction {
        Prediction {
            id: "p".into(),
            timestamp: ts,
            note: None,
            status,
            verified_at: Some(ts + Duration::hours(48)),
            window_hours: 48,
            window_end: ts + Duration::hours(48),
            matched_events: Vec::new(),
        }
    }

    #[test]
    fn scorecard_counts_each_status() {
        let now = Utc::now();
        let predictions = vec![
            prediction(PredictionStatus::Hit, now - Duration::days(5)),
            prediction(PredictionStatus::Hit, now - Duration::days(3)),
            prediction(PredictionStatus::Miss, now - Duration::days(2)),
            prediction(PredictionStatus::Pending, now),
        ];
        let card = compute(&predictions, Some(0.3), now);
        assert_eq!(card.hits, 2);
        assert_eq!(card.misses, 1);
        assert_eq!(card.pending, 1);
        assert!((card.hit_rate.unwrap() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(card.total_days_tracked, 5);
    }

    #[test]
    fn hit_rate_is_none_with_no_completed_predictions() {
        let now = Utc::now();
        let predictions = vec![prediction(PredictionStatus::Pending, now)];
        let card = compute(&predictions, Some(0.3), now);
        assert!(card.hit_rate.is_none());
    }

    #[test]
    fn p_value_is_none_without_a_base_rate() {
        let now = Utc::now();
        let predictions = vec![prediction(PredictionStatus::Hit, now - Duration::days(1))];
        let card = compute(&predictions, None, now);
        assert!(card.p_value.is_none());
    }

    #[test]
    fn p_value_is_one_when_base_rate_matches_perfect_record() {
        let now = Utc::now();
        let predictions = vec![prediction(PredictionStatus::Hit, now - Duration::days(1))];
        let card = compute(&predictions, Some(1.0), now);
        assert!((card.p_value.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn p_value_is_small_for_an_unlikely_hit_streak() {
        let now = Utc::now();
        let predictions: Vec<_> = (0..10)
            .map(|i| prediction(PredictionStatus::Hit, now - Duration::days(i)))
            .collect();
        let card = compute(&predictions, Some(0.05), now);
        assert!(card.p_value.unwrap() < 0.01);
    }
}
