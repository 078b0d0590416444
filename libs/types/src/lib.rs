//! # Sentiment Types Library
//!
//! Shared record types for the sentiment signals workspace.
//!
//! ## Design Philosophy
//!
//! - **Plain Records**: Every output is a serializable struct with no behavior
//!   beyond construction and banding, ready for a transport layer
//! - **Bounded Fields**: Scores, magnitudes and confidences are clamped at
//!   construction so downstream math can rely on their ranges
//! - **Exhaustive Banding**: Label enums own their threshold tables so the same
//!   cut-offs apply wherever a value is classified
//!
//! ## Quick Start
//!
//! ```rust
//! use sentiment_types::{SentimentLabel, FearGreedLabel};
//!
//! assert_eq!(SentimentLabel::from_score(60.0), SentimentLabel::VeryPositive);
//! assert_eq!(SentimentLabel::from_score(59.999), SentimentLabel::Positive);
//! assert_eq!(FearGreedLabel::from_value(50.0), FearGreedLabel::Neutral);
//! ```
//!
//! ## Module Map
//!
//! - [`sources`]: raw news/social records as delivered by source connectors
//! - [`sentiment`]: canonical data points and aggregated sentiment
//! - [`market`]: price bars, correlation and divergence results
//! - [`signal`]: discrete trading signals with reasoning

pub mod market;
pub mod sentiment;
pub mod signal;
pub mod sources;

pub use market::{
    CorrelationDirection, CorrelationResult, CorrelationStrength, DivergenceResult,
    DivergenceSeverity, DivergenceType, PriceDataPoint,
};
pub use sentiment::{
    AggregatedSentiment, DataPointParams, FearGreedIndex, FearGreedLabel, SentimentDataPoint,
    SentimentLabel, SentimentSample, SentimentTrend, SourceBreakdown, SourceKind, TrendDirection,
};
pub use signal::{SentimentPriceSignal, SignalLevel};
pub use sources::{NewsItem, SocialPost};

/// Lower bound of every sentiment score
pub const MIN_SCORE: f64 = -100.0;

/// Upper bound of every sentiment score
pub const MAX_SCORE: f64 = 100.0;

/// Clamp a raw score into `[-100, 100]`, mapping NaN to 0
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(MIN_SCORE, MAX_SCORE)
    }
}

/// Clamp a raw fraction into `[0, 1]`, mapping NaN to 0
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
