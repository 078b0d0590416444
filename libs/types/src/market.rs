//! Market-side records: price bars, correlation and divergence results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceDataPoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceDataPoint {
    /// Flat bar where every price equals `close`
    pub fn from_close(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CorrelationStrength {
    /// Band on `|coefficient|`; lower bounds are inclusive
    pub fn from_coefficient(coefficient: f64) -> Self {
        let abs = coefficient.abs();
        if abs >= 0.7 {
            CorrelationStrength::VeryStrong
        } else if abs >= 0.5 {
            CorrelationStrength::Strong
        } else if abs >= 0.3 {
            CorrelationStrength::Moderate
        } else if abs >= 0.1 {
            CorrelationStrength::Weak
        } else {
            CorrelationStrength::VeryWeak
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationDirection {
    Positive,
    Negative,
    None,
}

impl CorrelationDirection {
    pub fn from_coefficient(coefficient: f64) -> Self {
        if coefficient.abs() < 0.1 {
            CorrelationDirection::None
        } else if coefficient > 0.0 {
            CorrelationDirection::Positive
        } else {
            CorrelationDirection::Negative
        }
    }
}

/// Sentiment/return correlation for one symbol and timeframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub symbol: String,
    /// Pearson coefficient in `[-1, 1]`
    pub coefficient: f64,
    pub p_value: f64,
    pub is_significant: bool,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
    /// Hours; positive means sentiment leads price
    pub lag: i64,
    pub data_points: usize,
    pub timeframe: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceType {
    /// Price falling while sentiment rises
    Bullish,
    /// Price rising while sentiment falls
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceSeverity {
    Weak,
    Moderate,
    Strong,
}

impl DivergenceSeverity {
    pub fn from_difference(difference: f64) -> Self {
        let abs = difference.abs();
        if abs >= 0.6 {
            DivergenceSeverity::Strong
        } else if abs >= 0.4 {
            DivergenceSeverity::Moderate
        } else {
            DivergenceSeverity::Weak
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivergenceResult {
    pub symbol: String,
    #[serde(rename = "type")]
    pub divergence_type: DivergenceType,
    pub severity: DivergenceSeverity,
    /// Sentiment regression slope per step, divided by 100
    pub sentiment_trend: f64,
    /// Price regression slope per step, divided by the initial close
    pub price_trend: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_strength_bands() {
        assert_eq!(CorrelationStrength::from_coefficient(0.7), CorrelationStrength::VeryStrong);
        assert_eq!(CorrelationStrength::from_coefficient(-0.69), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::from_coefficient(0.3), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::from_coefficient(-0.1), CorrelationStrength::Weak);
        assert_eq!(CorrelationStrength::from_coefficient(0.05), CorrelationStrength::VeryWeak);
    }

    #[test]
    fn test_correlation_direction() {
        assert_eq!(CorrelationDirection::from_coefficient(0.09), CorrelationDirection::None);
        assert_eq!(CorrelationDirection::from_coefficient(-0.09), CorrelationDirection::None);
        assert_eq!(CorrelationDirection::from_coefficient(0.1), CorrelationDirection::Positive);
        assert_eq!(CorrelationDirection::from_coefficient(-0.4), CorrelationDirection::Negative);
    }

    #[test]
    fn test_divergence_severity_bands() {
        assert_eq!(DivergenceSeverity::from_difference(0.6), DivergenceSeverity::Strong);
        assert_eq!(DivergenceSeverity::from_difference(0.45), DivergenceSeverity::Moderate);
        assert_eq!(DivergenceSeverity::from_difference(0.1), DivergenceSeverity::Weak);
    }
}
