//! # Sentiment Signals Strategy - Sentiment/Price Signal Generation
//!
//! ## Purpose
//!
//! Turns already-scored news and social items about crypto assets into one
//! time-windowed, confidence-scored mood indicator per symbol, relates that
//! indicator to price history, and emits discrete trading signals with a
//! reasoning trace.
//!
//! ## Integration Points
//!
//! - **Input Sources**: News and social connectors deliver [`NewsItem`] and
//!   [`SocialPost`] records with scores attached; market data supplies
//!   ascending [`PriceDataPoint`] bars
//! - **Output Destinations**: Plain serde records ([`AggregatedSentiment`],
//!   [`FearGreedIndex`], [`CorrelationResult`], [`DivergenceResult`],
//!   [`SentimentPriceSignal`]) published as [`EngineEvent`]s
//! - **Configuration**: [`sentiment_config::EngineConfig`] loaded from TOML with
//!   `SENTIMENT__*` overrides
//! - **Monitoring**: Atomic counters in [`MetricsCollector`]
//!
//! ## Architecture Role
//!
//! ```text
//! Scored Items → [Normalizer] → [Aggregator] → [Trend] → [Fear & Greed]
//!       ↓              ↓              ↓                        ↓
//! Source Weights  Data Points   AggregatedSentiment      FearGreedIndex
//!                                     ↓
//! Price Bars ──→ [Correlation] [Divergence] ──→ [Signal Generator]
//!                      ↓             ↓                  ↓
//!              CorrelationResult DivergenceResult SentimentPriceSignal
//! ```
//!
//! ## Edge-Case Policy
//!
//! - A quiet aggregation window yields no result; it is not an error
//! - Correlation over too few aligned points is [`EngineError::InsufficientData`]
//! - Zero-variance series give a coefficient of 0, never NaN
//! - Configuration is validated when it is swapped in, never mid-calculation
//!
//! ## Examples
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use sentiment_signals::{NewsItem, SentimentEngine};
//!
//! let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
//! let news: Vec<NewsItem> = (0..6)
//!     .map(|i| NewsItem {
//!         source: "coindesk".to_string(),
//!         published_at: now - Duration::hours(i),
//!         sentiment_score: Some(70.0),
//!         sentiment_magnitude: None,
//!         votes: Some(40),
//!         is_important: None,
//!         is_trending: None,
//!         symbols: vec!["BTC".to_string()],
//!     })
//!     .collect();
//!
//! let engine = SentimentEngine::default();
//! let points = engine.normalize(&news, &[]);
//! let aggregated = engine.aggregate_symbol("BTC", &points, now).unwrap();
//!
//! assert_eq!(aggregated.data_points, 6);
//! assert!((aggregated.score - 70.0).abs() < 1e-9);
//! ```

pub mod aggregator;
pub mod correlation;
pub mod divergence;
pub mod engine;
pub mod error;
pub mod fear_greed;
pub mod logging;
pub mod market;
pub mod metrics;
pub mod normalizer;
pub mod service;
pub mod signals;
pub mod statistics;
pub mod trend;

pub use aggregator::SentimentAggregator;
pub use correlation::{AlignedPoint, CorrelationEngine, LagScan};
pub use divergence::DivergenceDetector;
pub use engine::{SentimentEngine, SymbolAnalysis};
pub use error::{EngineError, Result};
pub use fear_greed::{FearGreedComposer, FearGreedInputs};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use normalizer::Normalizer;
pub use service::{EngineEvent, EngineRequest, SentimentService};
pub use signals::SignalGenerator;

/// Re-export the record types so callers need one import
pub use sentiment_types::{
    AggregatedSentiment, CorrelationResult, DivergenceResult, FearGreedIndex, NewsItem,
    PriceDataPoint, SentimentDataPoint, SentimentPriceSignal, SentimentSample, SignalLevel,
    SocialPost,
};
