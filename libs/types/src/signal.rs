//! Trading signal definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalLevel {
    StrongSell,
    Sell,
    Neutral,
    Buy,
    StrongBuy,
}

impl SignalLevel {
    /// Discretize an additive signal score; the cut-offs are inclusive
    pub fn from_score(score: f64) -> Self {
        if score >= 1.5 {
            SignalLevel::StrongBuy
        } else if score >= 0.5 {
            SignalLevel::Buy
        } else if score <= -1.5 {
            SignalLevel::StrongSell
        } else if score <= -0.5 {
            SignalLevel::Sell
        } else {
            SignalLevel::Neutral
        }
    }

    /// Anything but neutral
    pub fn is_actionable(&self) -> bool {
        *self != SignalLevel::Neutral
    }
}

/// Discrete signal combining sentiment, price action and correlation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPriceSignal {
    pub symbol: String,
    pub signal: SignalLevel,
    /// In `[0, 0.95]`
    pub confidence: f64,
    /// One entry per triggered factor, in evaluation order
    pub reasoning: Vec<String>,
    pub sentiment_score: f64,
    /// Percent change from first to last close of the supplied bars
    pub price_change: f64,
    pub correlation: f64,
    /// Copied from the aggregate's `last_updated` so the signal stays a pure
    /// function of its inputs
    pub timestamp: DateTime<Utc>,
}
