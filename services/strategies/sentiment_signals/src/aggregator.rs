//! # Weighted Sentiment Aggregation
//!
//! ## Purpose
//!
//! Combines the normalized data points of one symbol and window into a single
//! [`AggregatedSentiment`]. Each point's base weight from the normalizer is
//! scaled by recency, engagement and influencer status:
//!
//! ```text
//! final = base * exp(-decay * age_hours) * engagement_boost * influencer
//! engagement_boost = 1 + engagement_weight * ln(1 + engagement) / 10
//! ```
//!
//! ## Quiet Windows
//!
//! A window holding fewer than `min_data_points` points is an expected steady
//! state, not a failure, and yields `None`.
//!
//! ## Fallbacks
//!
//! - Zero total weight: score 0
//! - Future-dated points: age clamped to 0

use chrono::{DateTime, Duration, Utc};
use sentiment_config::{AggregatorConfig, ConfigError};
use sentiment_types::{
    clamp_score, clamp_unit, AggregatedSentiment, SentimentDataPoint, SentimentLabel,
    SentimentSample, SourceBreakdown,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::statistics::mean;
use crate::trend::calculate_trend;

pub struct SentimentAggregator {
    config: AggregatorConfig,
}

impl Default for SentimentAggregator {
    fn default() -> Self {
        Self {
            config: AggregatorConfig::default(),
        }
    }
}

impl SentimentAggregator {
    pub fn new(config: AggregatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Swap in a new config; the old one stays active if validation fails
    pub fn update_config(&mut self, config: AggregatorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Window length as a chrono duration
    pub fn window(&self) -> Duration {
        hours_to_duration(self.config.time_window_hours)
    }

    /// `exp(-decay * age)`: 1 at age 0, decreasing toward 0
    pub fn recency_multiplier(&self, age_hours: f64) -> f64 {
        (-self.config.recency_decay * age_hours.max(0.0)).exp()
    }

    pub fn engagement_boost(&self, engagement: Option<u64>) -> f64 {
        match engagement {
            Some(count) => 1.0 + self.config.engagement_weight * (1.0 + count as f64).ln() / 10.0,
            None => 1.0,
        }
    }

    pub fn influencer_multiplier(&self, is_influencer: bool) -> f64 {
        if is_influencer {
            self.config.influencer_boost
        } else {
            1.0
        }
    }

    /// Weight of a point evaluated at `as_of`
    pub fn final_weight(&self, point: &SentimentDataPoint, as_of: DateTime<Utc>) -> f64 {
        let age_hours = hours_between(point.timestamp(), as_of);

        point.weight()
            * self.recency_multiplier(age_hours)
            * self.engagement_boost(point.engagement())
            * self.influencer_multiplier(point.is_influencer())
    }

    /// Points mentioning `symbol` with timestamps in `(as_of - window, as_of]`
    pub fn filter_window<'a>(
        &self,
        points: &'a [SentimentDataPoint],
        symbol: &str,
        as_of: DateTime<Utc>,
    ) -> Vec<&'a SentimentDataPoint> {
        select_window(points, symbol, window_start(as_of, self.window()), as_of)
    }

    /// Aggregate pre-filtered points; `change` is left at 0
    pub fn aggregate<'a, I>(
        &self,
        symbol: &str,
        points: I,
        as_of: DateTime<Utc>,
    ) -> Option<AggregatedSentiment>
    where
        I: IntoIterator<Item = &'a SentimentDataPoint>,
    {
        let points: Vec<&SentimentDataPoint> = points.into_iter().collect();
        if points.len() < self.config.min_data_points {
            debug!(
                symbol,
                points = points.len(),
                required = self.config.min_data_points,
                "Quiet window, no aggregate"
            );
            return None;
        }

        let weights: Vec<f64> = points.iter().map(|p| self.final_weight(p, as_of)).collect();
        let total_weight: f64 = weights.iter().sum();

        let score = if total_weight > 0.0 {
            let weighted: f64 = points
                .iter()
                .zip(weights.iter())
                .map(|(p, w)| p.score() * w)
                .sum();
            clamp_score(weighted / total_weight)
        } else {
            0.0
        };

        let magnitudes: Vec<f64> = points.iter().map(|p| p.magnitude()).collect();
        let confidences: Vec<f64> = points.iter().map(|p| p.confidence()).collect();
        let samples: Vec<SentimentSample> = points.iter().map(|p| SentimentSample::from(*p)).collect();

        let aggregated = AggregatedSentiment {
            symbol: symbol.trim().to_uppercase(),
            score,
            magnitude: clamp_unit(mean(&magnitudes)),
            label: SentimentLabel::from_score(score),
            confidence: clamp_unit(mean(&confidences)),
            trend: calculate_trend(&samples),
            change: 0.0,
            sources: source_breakdown(&points, &weights),
            data_points: points.len(),
            time_window_hours: self.config.time_window_hours,
            last_updated: as_of,
        };

        debug!(
            symbol = %aggregated.symbol,
            score = aggregated.score,
            points = aggregated.data_points,
            total_weight,
            "Aggregated sentiment"
        );

        Some(aggregated)
    }

    /// Filter `history` to the current window and aggregate it
    ///
    /// `change` is the score delta against the preceding window of the same
    /// length, or 0 when that window is quiet.
    pub fn aggregate_symbol(
        &self,
        symbol: &str,
        history: &[SentimentDataPoint],
        as_of: DateTime<Utc>,
    ) -> Option<AggregatedSentiment> {
        let current = self.filter_window(history, symbol, as_of);
        let mut aggregated = self.aggregate(symbol, current, as_of)?;

        let previous_end = window_start(as_of, self.window());
        let previous = select_window(
            history,
            symbol,
            window_start(previous_end, self.window()),
            previous_end,
        );
        if let Some(previous) = self.aggregate(symbol, previous, previous_end) {
            aggregated.change = aggregated.score - previous.score;
        }

        Some(aggregated)
    }

    /// One aggregate per symbol; quiet symbols are omitted
    pub fn aggregate_all(
        &self,
        history: &[SentimentDataPoint],
        symbols: &[String],
        as_of: DateTime<Utc>,
    ) -> Vec<AggregatedSentiment> {
        let unique: BTreeSet<String> = symbols.iter().map(|s| s.trim().to_uppercase()).collect();
        unique
            .iter()
            .filter_map(|symbol| self.aggregate_symbol(symbol, history, as_of))
            .collect()
    }
}

fn select_window<'a>(
    points: &'a [SentimentDataPoint],
    symbol: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&'a SentimentDataPoint> {
    points
        .iter()
        .filter(|p| p.mentions(symbol) && p.timestamp() > start && p.timestamp() <= end)
        .collect()
}

fn source_breakdown(
    points: &[&SentimentDataPoint],
    weights: &[f64],
) -> BTreeMap<String, SourceBreakdown> {
    let mut grouped: BTreeMap<String, (usize, f64, f64)> = BTreeMap::new();
    for (point, weight) in points.iter().zip(weights.iter()) {
        let entry = grouped.entry(point.source().to_string()).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += point.score();
        entry.2 += weight;
    }

    grouped
        .into_iter()
        .map(|(source, (count, score_sum, weight_sum))| {
            (
                source,
                SourceBreakdown {
                    count,
                    avg_score: score_sum / count as f64,
                    avg_weight: weight_sum / count as f64,
                },
            )
        })
        .collect()
}

pub(crate) fn hours_to_duration(hours: f64) -> Duration {
    Duration::try_milliseconds((hours * 3_600_000.0).round() as i64).unwrap_or(Duration::MAX)
}

/// `end - length`, saturating at the earliest representable instant
pub(crate) fn window_start(end: DateTime<Utc>, length: Duration) -> DateTime<Utc> {
    end.checked_sub_signed(length).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Non-negative hours from `from` to `to`
pub(crate) fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    ((to - from).num_milliseconds() as f64 / 3_600_000.0).max(0.0)
}
