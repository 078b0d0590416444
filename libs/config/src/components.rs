//! Per-component engine configuration

use serde::{Deserialize, Serialize};

use crate::error::{ensure_range, ConfigError, Result};
use crate::sources::SourceWeights;

/// Allowed deviation of the fear & greed weight sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Longest aggregation window or correlation timeframe, ten years
pub const MAX_WINDOW_HOURS: f64 = 24.0 * 365.0 * 10.0;

/// Complete configuration for one engine instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub aggregator: AggregatorConfig,
    pub fear_greed: FearGreedConfig,
    pub correlation: CorrelationConfig,
    pub divergence: DivergenceConfig,
    pub signal: SignalConfig,
    pub sources: SourceWeights,
}

impl EngineConfig {
    /// Validate every component
    pub fn validate(&self) -> Result<()> {
        self.aggregator.validate()?;
        self.fear_greed.validate()?;
        self.correlation.validate()?;
        self.divergence.validate()?;
        self.signal.validate()?;
        self.sources.validate()?;
        Ok(())
    }
}

/// Weighted aggregation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Window length ending at the evaluation time
    pub time_window_hours: f64,
    /// Windows with fewer points produce no aggregate
    pub min_data_points: usize,
    /// Exponential decay rate per hour of age
    pub recency_decay: f64,
    /// Scale of the logarithmic engagement boost
    pub engagement_weight: f64,
    /// Multiplier for points flagged as influencer content
    pub influencer_boost: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            time_window_hours: 24.0,
            min_data_points: 5,
            recency_decay: 0.1,
            engagement_weight: 0.3,
            influencer_boost: 1.5,
        }
    }
}

impl AggregatorConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.time_window_hours.is_finite()
            || self.time_window_hours <= 0.0
            || self.time_window_hours > MAX_WINDOW_HOURS
        {
            return Err(ConfigError::InvalidTimeWindow {
                hours: self.time_window_hours,
            });
        }
        if self.min_data_points == 0 {
            return Err(ConfigError::InvalidMinDataPoints {
                component: "aggregator",
            });
        }
        ensure_range("recency_decay", self.recency_decay, 0.0, 10.0)?;
        ensure_range("engagement_weight", self.engagement_weight, 0.0, 10.0)?;
        ensure_range("influencer_boost", self.influencer_boost, 0.0, 10.0)?;
        Ok(())
    }
}

/// Blend weights of the fear & greed index; must sum to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FearGreedWeights {
    pub sentiment: f64,
    pub volume: f64,
    pub volatility: f64,
    pub momentum: f64,
}

impl Default for FearGreedWeights {
    fn default() -> Self {
        Self {
            sentiment: 0.4,
            volume: 0.25,
            volatility: 0.2,
            momentum: 0.15,
        }
    }
}

impl FearGreedWeights {
    pub fn sum(&self) -> f64 {
        self.sentiment + self.volume + self.volatility + self.momentum
    }

    pub fn validate(&self) -> Result<()> {
        ensure_range("fear_greed.weights.sentiment", self.sentiment, 0.0, 1.0)?;
        ensure_range("fear_greed.weights.volume", self.volume, 0.0, 1.0)?;
        ensure_range("fear_greed.weights.volatility", self.volatility, 0.0, 1.0)?;
        ensure_range("fear_greed.weights.momentum", self.momentum, 0.0, 1.0)?;

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightsDoNotSumToOne { sum });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FearGreedConfig {
    pub weights: FearGreedWeights,
    /// Social volume that maps to a full volume component
    pub volume_reference: f64,
}

impl Default for FearGreedConfig {
    fn default() -> Self {
        Self {
            weights: FearGreedWeights::default(),
            volume_reference: 1000.0,
        }
    }
}

impl FearGreedConfig {
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if !self.volume_reference.is_finite() || self.volume_reference <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "fear_greed.volume_reference",
                value: self.volume_reference,
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
            });
        }
        Ok(())
    }
}

/// Named lookback used by the multi-timeframe correlation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeConfig {
    pub label: String,
    pub hours: f64,
}

impl TimeframeConfig {
    pub fn new(label: &str, hours: f64) -> Self {
        Self {
            label: label.to_string(),
            hours,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Fewer aligned points is a reported error
    pub min_data_points: usize,
    /// Lag scan covers `[-max_lag_hours, max_lag_hours]`
    pub max_lag_hours: u32,
    /// `p_value` below this marks the result significant
    pub significance_threshold: f64,
    /// Max distance between a sentiment sample and its matched price bar
    pub alignment_tolerance_minutes: i64,
    /// Lags leaving fewer overlapping pairs are skipped
    pub min_lag_overlap: usize,
    pub timeframes: Vec<TimeframeConfig>,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            min_data_points: 10,
            max_lag_hours: 24,
            significance_threshold: 0.05,
            alignment_tolerance_minutes: 30,
            min_lag_overlap: 3,
            timeframes: vec![
                TimeframeConfig::new("24h", 24.0),
                TimeframeConfig::new("7d", 24.0 * 7.0),
                TimeframeConfig::new("30d", 24.0 * 30.0),
            ],
        }
    }
}

impl CorrelationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_data_points == 0 {
            return Err(ConfigError::InvalidMinDataPoints {
                component: "correlation",
            });
        }
        ensure_range(
            "correlation.significance_threshold",
            self.significance_threshold,
            f64::MIN_POSITIVE,
            1.0,
        )?;
        let max_tolerance_minutes = MAX_WINDOW_HOURS * 60.0;
        if self.alignment_tolerance_minutes <= 0
            || self.alignment_tolerance_minutes as f64 > max_tolerance_minutes
        {
            return Err(ConfigError::OutOfRange {
                field: "correlation.alignment_tolerance_minutes",
                value: self.alignment_tolerance_minutes as f64,
                min: 1.0,
                max: max_tolerance_minutes,
            });
        }
        if self.min_lag_overlap < 2 {
            return Err(ConfigError::OutOfRange {
                field: "correlation.min_lag_overlap",
                value: self.min_lag_overlap as f64,
                min: 2.0,
                max: f64::MAX,
            });
        }
        for timeframe in &self.timeframes {
            if timeframe.label.trim().is_empty() {
                return Err(ConfigError::InvalidTimeframe {
                    label: timeframe.label.clone(),
                    reason: "label is empty".to_string(),
                });
            }
            if !timeframe.hours.is_finite()
                || timeframe.hours <= 0.0
                || timeframe.hours > MAX_WINDOW_HOURS
            {
                return Err(ConfigError::InvalidTimeframe {
                    label: timeframe.label.clone(),
                    reason: format!(
                        "window must be in (0, {MAX_WINDOW_HOURS}] hours, got {}",
                        timeframe.hours
                    ),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DivergenceConfig {
    /// Both series need at least this many points
    pub min_points: usize,
    /// Minimum normalized slope difference
    pub divergence_threshold: f64,
}

impl Default for DivergenceConfig {
    fn default() -> Self {
        Self {
            min_points: 10,
            divergence_threshold: 0.05,
        }
    }
}

impl DivergenceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_points < 2 {
            return Err(ConfigError::InvalidMinDataPoints {
                component: "divergence",
            });
        }
        ensure_range(
            "divergence.divergence_threshold",
            self.divergence_threshold,
            0.0,
            f64::MAX,
        )?;
        Ok(())
    }
}

/// Thresholds for the additive signal score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// `|score|` above this contributes a full point
    pub strong_score: f64,
    /// `|score|` above this arms the divergence bonus
    pub divergence_score: f64,
    /// Opposite price move (percent) that completes a divergence
    pub divergence_price_change_pct: f64,
    pub trend_weight: f64,
    pub correlation_weight: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            strong_score: 60.0,
            divergence_score: 20.0,
            divergence_price_change_pct: 5.0,
            trend_weight: 0.5,
            correlation_weight: 0.5,
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_range("signal.strong_score", self.strong_score, 0.0, 100.0)?;
        ensure_range("signal.divergence_score", self.divergence_score, 0.0, 100.0)?;
        ensure_range(
            "signal.divergence_price_change_pct",
            self.divergence_price_change_pct,
            0.0,
            f64::MAX,
        )?;
        ensure_range("signal.trend_weight", self.trend_weight, 0.0, 1.0)?;
        ensure_range("signal.correlation_weight", self.correlation_weight, 0.0, 1.0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((FearGreedWeights::default().sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
    }

    #[test]
    fn test_weights_not_summing_to_one_rejected() {
        let weights = FearGreedWeights {
            sentiment: 0.4,
            volume: 0.4,
            volatility: 0.2,
            momentum: 0.15,
        };

        match weights.validate() {
            Err(ConfigError::WeightsDoNotSumToOne { sum }) => assert!((sum - 1.15).abs() < 1e-9),
            other => panic!("expected weight sum error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_positive_window_rejected() {
        let config = AggregatorConfig {
            time_window_hours: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidTimeWindow { hours: 0.0 })
        );

        let config = AggregatorConfig {
            time_window_hours: -4.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_windows_rejected() {
        let config = AggregatorConfig {
            time_window_hours: 1e10,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidTimeWindow { hours: 1e10 })
        );

        let config = AggregatorConfig {
            time_window_hours: MAX_WINDOW_HOURS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let mut config = CorrelationConfig::default();
        config.timeframes.push(TimeframeConfig::new("forever", 1e10));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeframe { .. })
        ));
    }

    #[test]
    fn test_zero_min_data_points_rejected() {
        let config = AggregatorConfig {
            min_data_points: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidMinDataPoints {
                component: "aggregator"
            })
        );

        let config = CorrelationConfig {
            min_data_points: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeframe_validation() {
        let mut config = CorrelationConfig::default();
        config.timeframes.push(TimeframeConfig::new("broken", 0.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeframe { .. })
        ));
    }

    #[test]
    fn test_significance_threshold_bounds() {
        let config = CorrelationConfig {
            significance_threshold: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CorrelationConfig {
            significance_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
