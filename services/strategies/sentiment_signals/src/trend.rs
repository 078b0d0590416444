//! Trend and change calculation over one window's scores

use sentiment_types::{SentimentSample, SentimentTrend, TrendDirection};

use crate::statistics::mean;

/// Half-over-half mean shift below this is reported as stable
pub const STABLE_THRESHOLD: f64 = 5.0;

/// Compare the mean score of the later half against the earlier half
///
/// Samples are sorted by time and split at `floor(n/2)`, so with an odd count
/// the later half holds the extra sample.
pub fn calculate_trend(samples: &[SentimentSample]) -> SentimentTrend {
    if samples.len() < 2 {
        return SentimentTrend::stable();
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by_key(|s| s.timestamp);

    let mid = sorted.len() / 2;
    let first: Vec<f64> = sorted[..mid].iter().map(|s| s.score).collect();
    let second: Vec<f64> = sorted[mid..].iter().map(|s| s.score).collect();

    let delta = mean(&second) - mean(&first);

    let direction = if delta.abs() < STABLE_THRESHOLD {
        TrendDirection::Stable
    } else if delta > 0.0 {
        TrendDirection::Improving
    } else {
        TrendDirection::Deteriorating
    };

    let elapsed_hours = match (sorted.first(), sorted.last()) {
        (Some(first), Some(last)) => {
            (last.timestamp - first.timestamp).num_milliseconds() as f64 / 3_600_000.0
        }
        _ => 0.0,
    };
    let velocity = if elapsed_hours > 0.0 {
        delta / elapsed_hours
    } else {
        0.0
    };

    SentimentTrend {
        direction,
        strength: (delta.abs() / 100.0).min(1.0),
        velocity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn samples(scores: &[f64]) -> Vec<SentimentSample> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        scores
            .iter()
            .enumerate()
            .map(|(i, score)| SentimentSample::new(start + Duration::hours(i as i64), *score))
            .collect()
    }

    #[test]
    fn test_improving_trend() {
        let trend = calculate_trend(&samples(&[-10.0, 0.0, 30.0, 40.0]));

        assert_eq!(trend.direction, TrendDirection::Improving);
        assert!((trend.strength - 0.4).abs() < 1e-12);
        assert!((trend.velocity - 40.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_deteriorating_trend_ignores_input_order() {
        let mut input = samples(&[50.0, 40.0, 10.0, 0.0]);
        input.reverse();

        let trend = calculate_trend(&input);
        assert_eq!(trend.direction, TrendDirection::Deteriorating);
        assert!(trend.velocity < 0.0);
    }

    #[test]
    fn test_small_shift_is_stable() {
        let trend = calculate_trend(&samples(&[10.0, 12.0, 13.0, 14.0]));
        assert_eq!(trend.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_odd_count_split() {
        // floor(5/2) = 2: first half [0, 0], second half [30, 30, 30]
        let trend = calculate_trend(&samples(&[0.0, 0.0, 30.0, 30.0, 30.0]));
        assert!((trend.strength - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_zero_span_has_zero_velocity() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let input = vec![SentimentSample::new(now, -50.0), SentimentSample::new(now, 50.0)];

        let trend = calculate_trend(&input);
        assert_eq!(trend.velocity, 0.0);
    }

    #[test]
    fn test_single_sample_is_stable() {
        assert_eq!(calculate_trend(&samples(&[80.0])), SentimentTrend::stable());
    }
}
