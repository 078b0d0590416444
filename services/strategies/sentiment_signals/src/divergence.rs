//! Sentiment/price divergence detection
//!
//! Fits a least-squares line to each series against its sample index and
//! flags windows where the two lines point in opposite directions by more
//! than the configured threshold. Sentiment slopes are scaled by 1/100 and
//! price slopes by 1/initial close so both read as fractions per step.
//!
//! Too little data is the quiet state: the detector returns an empty list.

use sentiment_config::{ConfigError, DivergenceConfig};
use sentiment_types::{DivergenceResult, DivergenceSeverity, DivergenceType, PriceDataPoint, SentimentSample};
use tracing::debug;

use crate::statistics::regression_slope;

pub struct DivergenceDetector {
    config: DivergenceConfig,
}

impl Default for DivergenceDetector {
    fn default() -> Self {
        Self {
            config: DivergenceConfig::default(),
        }
    }
}

impl DivergenceDetector {
    pub fn new(config: DivergenceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DivergenceConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: DivergenceConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Compare the sentiment trend against the price trend
    ///
    /// Yields at most one result covering the span of both series.
    pub fn detect(
        &self,
        symbol: &str,
        sentiment: &[SentimentSample],
        prices: &[PriceDataPoint],
    ) -> Vec<DivergenceResult> {
        if sentiment.len() < self.config.min_points || prices.len() < self.config.min_points {
            debug!(
                symbol,
                sentiment_points = sentiment.len(),
                price_points = prices.len(),
                "Not enough data for divergence"
            );
            return Vec::new();
        }

        let mut sentiment = sentiment.to_vec();
        sentiment.sort_by_key(|s| s.timestamp);
        let mut prices = prices.to_vec();
        prices.sort_by_key(|p| p.timestamp);

        let initial_close = prices[0].close;
        if initial_close <= 0.0 || !initial_close.is_finite() {
            return Vec::new();
        }

        let scores: Vec<f64> = sentiment.iter().map(|s| s.score).collect();
        let closes: Vec<f64> = prices.iter().map(|p| p.close).collect();

        let sentiment_trend = regression_slope(&scores) / 100.0;
        let price_trend = regression_slope(&closes) / initial_close;
        let difference = (sentiment_trend - price_trend).abs();

        let divergence_type = if sentiment_trend > 0.0 && price_trend < 0.0 {
            DivergenceType::Bullish
        } else if sentiment_trend < 0.0 && price_trend > 0.0 {
            DivergenceType::Bearish
        } else {
            return Vec::new();
        };

        if difference <= self.config.divergence_threshold {
            return Vec::new();
        }

        let start_time = sentiment[0].timestamp.min(prices[0].timestamp);
        let end_time = sentiment[sentiment.len() - 1]
            .timestamp
            .max(prices[prices.len() - 1].timestamp);

        debug!(
            symbol,
            ?divergence_type,
            sentiment_trend,
            price_trend,
            difference,
            "Divergence detected"
        );

        vec![DivergenceResult {
            symbol: symbol.trim().to_uppercase(),
            divergence_type,
            severity: DivergenceSeverity::from_difference(difference),
            sentiment_trend,
            price_trend,
            start_time,
            end_time,
        }]
    }
}
