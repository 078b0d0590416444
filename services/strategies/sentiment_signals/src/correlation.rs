//! # Sentiment/Price Correlation Engine
//!
//! ## Purpose
//!
//! Measures how a symbol's sentiment series moves with its price returns and
//! whether sentiment leads or trails price.
//!
//! ## Pipeline
//!
//! ```text
//! sentiment samples ─┐
//!                    ├─ align (nearest bar within tolerance) ─ returns ─ pearson ─ p-value
//! price bars ────────┘                                            └──── lag scan
//! ```
//!
//! 1. Each sentiment sample is matched to the nearest price bar within the
//!    alignment tolerance (30 minutes by default); unmatched samples are
//!    dropped, never interpolated
//! 2. Step percentage returns are computed from the matched closes, the first
//!    return being 0
//! 3. The Pearson coefficient of scores against returns is reported with a
//!    normal-approximation p-value
//! 4. The lag scan walks `[-max_lag, max_lag]` ascending and keeps the lag with
//!    the largest `|coefficient|`; on ties the earliest lag wins
//!
//! ## Insufficient Data
//!
//! Fewer aligned points than `min_data_points` is an
//! [`EngineError::InsufficientData`] error: a coefficient over too few points
//! would mislead. The multi-timeframe variant omits such timeframes instead.

use chrono::{DateTime, Duration, Utc};
use sentiment_config::{ConfigError, CorrelationConfig};
use sentiment_types::{
    CorrelationDirection, CorrelationResult, CorrelationStrength, PriceDataPoint, SentimentSample,
};
use tracing::{debug, warn};

use crate::aggregator::{hours_to_duration, window_start};
use crate::error::{EngineError, Result};
use crate::statistics::{correlation_p_value, pearson, percent_returns};

/// Sentiment sample matched to its nearest price bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedPoint {
    pub timestamp: DateTime<Utc>,
    pub score: f64,
    pub close: f64,
}

/// Outcome of the lag scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagScan {
    /// Hours; positive means sentiment leads price
    pub lag_hours: i64,
    pub coefficient: f64,
}

pub struct CorrelationEngine {
    config: CorrelationConfig,
}

impl Default for CorrelationEngine {
    fn default() -> Self {
        Self {
            config: CorrelationConfig::default(),
        }
    }
}

impl CorrelationEngine {
    pub fn new(config: CorrelationConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: CorrelationConfig) -> std::result::Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Match each sample to the nearest bar within the alignment tolerance
    ///
    /// `prices` must be ascending by timestamp. Samples are processed in time
    /// order; equidistant bars resolve to the earlier one.
    pub fn align(&self, sentiment: &[SentimentSample], prices: &[PriceDataPoint]) -> Vec<AlignedPoint> {
        let tolerance =
            Duration::try_minutes(self.config.alignment_tolerance_minutes).unwrap_or(Duration::MAX);

        let mut samples = sentiment.to_vec();
        samples.sort_by_key(|s| s.timestamp);

        samples
            .iter()
            .filter_map(|sample| {
                let bar = nearest_bar(prices, sample.timestamp)?;
                let distance = (bar.timestamp - sample.timestamp).abs();
                (distance <= tolerance).then(|| AlignedPoint {
                    timestamp: sample.timestamp,
                    score: sample.score,
                    close: bar.close,
                })
            })
            .collect()
    }

    /// Correlate sentiment against price returns for one timeframe
    pub fn correlate(
        &self,
        symbol: &str,
        sentiment: &[SentimentSample],
        prices: &[PriceDataPoint],
        timeframe: &str,
    ) -> Result<CorrelationResult> {
        let aligned = self.align(sentiment, prices);
        if aligned.len() < self.config.min_data_points {
            warn!(
                symbol,
                timeframe,
                aligned = aligned.len(),
                required = self.config.min_data_points,
                "Not enough aligned points for correlation"
            );
            return Err(EngineError::InsufficientData {
                required: self.config.min_data_points,
                actual: aligned.len(),
            });
        }

        let scores: Vec<f64> = aligned.iter().map(|p| p.score).collect();
        let closes: Vec<f64> = aligned.iter().map(|p| p.close).collect();
        let returns = percent_returns(&closes);

        let coefficient = pearson(&scores, &returns);
        let p_value = correlation_p_value(coefficient, aligned.len());
        let lag = self.optimal_lag(&aligned, &scores, &returns);

        debug!(
            symbol,
            timeframe,
            coefficient,
            p_value,
            lag = lag.lag_hours,
            lag_coefficient = lag.coefficient,
            "Computed sentiment/price correlation"
        );

        Ok(CorrelationResult {
            symbol: symbol.trim().to_uppercase(),
            coefficient,
            p_value,
            is_significant: p_value < self.config.significance_threshold,
            strength: CorrelationStrength::from_coefficient(coefficient),
            direction: CorrelationDirection::from_coefficient(coefficient),
            lag: lag.lag_hours,
            data_points: aligned.len(),
            timeframe: timeframe.to_string(),
        })
    }

    /// Rerun the pipeline for every configured timeframe ending at `as_of`
    ///
    /// Timeframes with too few points after the cutoff are left out of the
    /// result rather than reported as errors.
    pub fn correlate_timeframes(
        &self,
        symbol: &str,
        sentiment: &[SentimentSample],
        prices: &[PriceDataPoint],
        as_of: DateTime<Utc>,
    ) -> Vec<CorrelationResult> {
        let mut results = Vec::with_capacity(self.config.timeframes.len());

        for timeframe in &self.config.timeframes {
            let cutoff = window_start(as_of, hours_to_duration(timeframe.hours));
            let in_range = |ts: DateTime<Utc>| ts >= cutoff && ts <= as_of;

            let window_sentiment: Vec<SentimentSample> =
                sentiment.iter().filter(|s| in_range(s.timestamp)).copied().collect();
            let window_prices: Vec<PriceDataPoint> =
                prices.iter().filter(|p| in_range(p.timestamp)).copied().collect();

            match self.correlate(symbol, &window_sentiment, &window_prices, &timeframe.label) {
                Ok(result) => results.push(result),
                Err(e) => debug!(symbol, timeframe = %timeframe.label, error = %e, "Timeframe omitted"),
            }
        }

        results
    }

    /// Scan lags over the aligned series
    ///
    /// Lags are walked in whole sampling steps, the median spacing of the
    /// aligned timestamps, and reported in hours. Lags whose overlap is shorter
    /// than `min_lag_overlap` are skipped; if none qualify the lag is 0.
    pub fn optimal_lag(&self, aligned: &[AlignedPoint], scores: &[f64], returns: &[f64]) -> LagScan {
        let step_hours = sampling_step_hours(aligned);
        let max_steps = (self.config.max_lag_hours as f64 / step_hours).floor() as i64;

        let mut best = LagScan {
            lag_hours: 0,
            coefficient: 0.0,
        };
        let mut best_abs = f64::NEG_INFINITY;

        for steps in -max_steps..=max_steps {
            let Some(coefficient) = lagged_correlation(scores, returns, steps, self.config.min_lag_overlap)
            else {
                continue;
            };
            // Strict comparison keeps the first lag on ties
            if coefficient.abs() > best_abs {
                best_abs = coefficient.abs();
                best = LagScan {
                    lag_hours: (steps as f64 * step_hours).round() as i64,
                    coefficient,
                };
            }
        }

        best
    }
}

/// Pearson of `scores[t]` against `returns[t + lag]`
///
/// Positive lags pair earlier sentiment with later returns. `None` when the
/// overlap is shorter than `min_overlap`.
pub fn lagged_correlation(scores: &[f64], returns: &[f64], lag: i64, min_overlap: usize) -> Option<f64> {
    let n = scores.len().min(returns.len());
    let shift = lag.unsigned_abs() as usize;
    if shift >= n || n - shift < min_overlap {
        return None;
    }

    let (x, y) = if lag >= 0 {
        (&scores[..n - shift], &returns[shift..n])
    } else {
        (&scores[shift..n], &returns[..n - shift])
    };
    Some(pearson(x, y))
}

fn nearest_bar(prices: &[PriceDataPoint], timestamp: DateTime<Utc>) -> Option<&PriceDataPoint> {
    let idx = prices.partition_point(|p| p.timestamp < timestamp);
    let before = idx.checked_sub(1).and_then(|i| prices.get(i));
    let after = prices.get(idx);

    match (before, after) {
        (Some(b), Some(a)) => {
            if timestamp - b.timestamp <= a.timestamp - timestamp {
                Some(b)
            } else {
                Some(a)
            }
        }
        (Some(b), None) => Some(b),
        (None, Some(a)) => Some(a),
        (None, None) => None,
    }
}

/// Median spacing of the aligned series in hours, at least one minute
fn sampling_step_hours(aligned: &[AlignedPoint]) -> f64 {
    let mut gaps: Vec<f64> = aligned
        .windows(2)
        .map(|w| (w[1].timestamp - w[0].timestamp).num_milliseconds() as f64 / 3_600_000.0)
        .filter(|gap| *gap > 0.0)
        .collect();
    if gaps.is_empty() {
        return 1.0;
    }
    gaps.sort_by(|a, b| a.total_cmp(b));
    gaps[gaps.len() / 2].max(1.0 / 60.0)
}
