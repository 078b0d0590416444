//! Fear & Greed composition
//!
//! Blends the aggregated sentiment score with externally supplied social
//! volume, price volatility and price momentum into one 0-100 index. Every
//! component is normalized to 0-100 first, so with weights summing to 1 the
//! result is a convex combination and stays in range.

use chrono::{DateTime, Utc};
use sentiment_config::{ConfigError, FearGreedConfig, FearGreedWeights};
use sentiment_types::{FearGreedIndex, FearGreedLabel, PriceDataPoint};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::market::{price_momentum, price_volatility};

/// Raw component values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FearGreedInputs {
    /// Aggregated score in `[-100, 100]`
    pub sentiment_score: f64,
    /// Mentions/posts over the window
    pub social_volume: f64,
    /// Return volatility as a fraction in `[0, 1]`
    pub price_volatility: f64,
    /// Percent price momentum in `[-100, 100]`
    pub price_momentum: f64,
}

impl FearGreedInputs {
    /// Derive volatility and momentum from price bars
    pub fn from_market(sentiment_score: f64, social_volume: f64, prices: &[PriceDataPoint]) -> Self {
        Self {
            sentiment_score,
            social_volume,
            price_volatility: price_volatility(prices),
            price_momentum: price_momentum(prices),
        }
    }
}

/// Component values after normalization to 0-100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FearGreedComponents {
    pub sentiment: f64,
    pub volume: f64,
    pub volatility: f64,
    pub momentum: f64,
}

pub struct FearGreedComposer {
    config: FearGreedConfig,
}

impl Default for FearGreedComposer {
    fn default() -> Self {
        Self {
            config: FearGreedConfig::default(),
        }
    }
}

impl FearGreedComposer {
    pub fn new(config: FearGreedConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FearGreedConfig {
        &self.config
    }

    /// Replace the blend weights; rejected unless they sum to 1
    pub fn update_weights(&mut self, weights: FearGreedWeights) -> Result<(), ConfigError> {
        weights.validate()?;
        info!(
            sentiment = weights.sentiment,
            volume = weights.volume,
            volatility = weights.volatility,
            momentum = weights.momentum,
            "Updated fear & greed weights"
        );
        self.config.weights = weights;
        Ok(())
    }

    pub fn update_config(&mut self, config: FearGreedConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn normalize(&self, inputs: &FearGreedInputs) -> FearGreedComponents {
        let volume = inputs.social_volume.max(0.0);
        let volatility = inputs.price_volatility.clamp(0.0, 1.0);

        FearGreedComponents {
            sentiment: (inputs.sentiment_score.clamp(-100.0, 100.0) + 100.0) / 2.0,
            volume: (volume / self.config.volume_reference * 100.0).min(100.0),
            // Higher volatility leans toward fear
            volatility: 100.0 - (volatility * 100.0).min(100.0),
            momentum: (inputs.price_momentum.clamp(-100.0, 100.0) + 100.0) / 2.0,
        }
    }

    pub fn calculate(&self, inputs: &FearGreedInputs, timestamp: DateTime<Utc>) -> FearGreedIndex {
        let components = self.normalize(inputs);
        let weights = &self.config.weights;

        let raw = components.sentiment * weights.sentiment
            + components.volume * weights.volume
            + components.volatility * weights.volatility
            + components.momentum * weights.momentum;
        let value = if raw.is_finite() {
            raw.clamp(0.0, 100.0)
        } else {
            50.0
        };

        debug!(value, ?components, "Computed fear & greed index");

        FearGreedIndex {
            value,
            label: FearGreedLabel::from_value(value),
            timestamp,
        }
    }
}
