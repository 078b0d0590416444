//! Sentiment/price signal generation
//!
//! The signal is an additive score built from four factors evaluated in a
//! fixed order. Each triggered factor appends one reasoning line, so the
//! reasoning reads in evaluation order:
//!
//! 1. Score magnitude: `±1` beyond `±strong_score`
//! 2. Trend: `±trend_weight` when improving or deteriorating
//! 3. Correlation: `sign(score)·|r|·correlation_weight` when significant and positive
//! 4. Divergence: `±1` when the score and the recent price move disagree
//!
//! The sum is discretized with the `±1.5` / `±0.5` cutoffs of [`SignalLevel`].
//! Generation reads nothing but its arguments; the timestamp is taken from
//! the aggregate so equal inputs give equal signals.

use sentiment_config::{ConfigError, SignalConfig};
use sentiment_types::{
    AggregatedSentiment, CorrelationDirection, CorrelationResult, PriceDataPoint,
    SentimentPriceSignal, SignalLevel, TrendDirection,
};
use tracing::{debug, info};

use crate::market::price_change_pct;

/// Upper bound on signal confidence
pub const MAX_CONFIDENCE: f64 = 0.95;

pub struct SignalGenerator {
    config: SignalConfig,
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self {
            config: SignalConfig::default(),
        }
    }
}

impl SignalGenerator {
    pub fn new(config: SignalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: SignalConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn generate(
        &self,
        aggregated: &AggregatedSentiment,
        prices: &[PriceDataPoint],
        correlation: Option<&CorrelationResult>,
    ) -> SentimentPriceSignal {
        let score = aggregated.score;
        let price_change = price_change_pct(prices);
        let mut total = 0.0;
        let mut reasoning = Vec::new();

        if score > self.config.strong_score {
            total += 1.0;
            reasoning.push(format!("Strong positive sentiment (score {score:.1})"));
        } else if score < -self.config.strong_score {
            total -= 1.0;
            reasoning.push(format!("Strong negative sentiment (score {score:.1})"));
        }

        match aggregated.trend.direction {
            TrendDirection::Improving => {
                total += self.config.trend_weight;
                reasoning.push("Sentiment trend improving".to_string());
            }
            TrendDirection::Deteriorating => {
                total -= self.config.trend_weight;
                reasoning.push("Sentiment trend deteriorating".to_string());
            }
            TrendDirection::Stable => {}
        }

        if let Some(c) = correlation {
            let sign = score_sign(score);
            if c.is_significant && c.direction == CorrelationDirection::Positive && sign != 0.0 {
                total += sign * c.coefficient.abs() * self.config.correlation_weight;
                reasoning.push(format!(
                    "Significant positive correlation with price (r={:.2}, lag {}h)",
                    c.coefficient, c.lag
                ));
            }
        }

        if score > self.config.divergence_score
            && price_change < -self.config.divergence_price_change_pct
        {
            total += 1.0;
            reasoning.push(format!(
                "Bullish divergence: positive sentiment while price fell {:.1}%",
                price_change.abs()
            ));
        } else if score < -self.config.divergence_score
            && price_change > self.config.divergence_price_change_pct
        {
            total -= 1.0;
            reasoning.push(format!(
                "Bearish divergence: negative sentiment while price rose {price_change:.1}%"
            ));
        }

        let signal = SignalLevel::from_score(total);
        let confidence = confidence_for(total);

        if signal.is_actionable() {
            info!(
                symbol = %aggregated.symbol,
                ?signal,
                total,
                confidence,
                "Generated sentiment signal"
            );
        } else {
            debug!(symbol = %aggregated.symbol, total, "Neutral sentiment signal");
        }

        SentimentPriceSignal {
            symbol: aggregated.symbol.clone(),
            signal,
            confidence,
            reasoning,
            sentiment_score: score,
            price_change,
            correlation: correlation.map(|c| c.coefficient).unwrap_or(0.0),
            timestamp: aggregated.last_updated,
        }
    }
}

/// Linear within each bucket, capped at [`MAX_CONFIDENCE`]
///
/// Strong buckets start at 0.75, buy/sell at 0.55 and both grow with distance
/// past their cutoff. Neutral peaks at 0.6 for a zero sum.
pub fn confidence_for(total: f64) -> f64 {
    let magnitude = total.abs();
    let confidence = if magnitude >= 1.5 {
        0.75 + (magnitude - 1.5) * 0.2
    } else if magnitude >= 0.5 {
        0.55 + (magnitude - 0.5) * 0.2
    } else {
        0.5 + (0.5 - magnitude) * 0.2
    };
    confidence.clamp(0.0, MAX_CONFIDENCE)
}

fn score_sign(score: f64) -> f64 {
    if score > 0.0 {
        1.0
    } else if score < 0.0 {
        -1.0
    } else {
        0.0
    }
}
