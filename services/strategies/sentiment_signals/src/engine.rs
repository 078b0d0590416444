//! # Sentiment Engine
//!
//! ## Purpose
//!
//! Single entry point over the sentiment pipeline. Owns one instance of each
//! component, applies validated configuration updates, and counts work in a
//! shared [`MetricsCollector`].
//!
//! ## Integration Points
//!
//! - **Input Sources**: Already-scored news and social records, ascending OHLCV bars
//! - **Output Destinations**: [`crate::service::SentimentService`] events, direct library callers
//! - **Configuration**: [`EngineConfig`] at construction, per-component update calls afterwards
//! - **Error Handling**: [`EngineError`] for rejected configs, invalid input and
//!   insufficient correlation data
//!
//! ## Architecture Role
//!
//! ```text
//! News/Social → [Normalizer] → [Aggregator] → [Fear & Greed]
//!                                   ↓
//! Price Bars  ───────────→ [Correlation] [Divergence] → [Signal Generator]
//! ```
//!
//! Every computation takes `&self`; only configuration updates need `&mut self`.
//! The source reliability table is fixed for the engine's lifetime.

use chrono::{DateTime, Utc};
use sentiment_config::{
    AggregatorConfig, CorrelationConfig, DivergenceConfig, EngineConfig, FearGreedConfig,
    FearGreedWeights, SignalConfig,
};
use sentiment_types::{
    AggregatedSentiment, CorrelationResult, DivergenceResult, FearGreedIndex, NewsItem,
    PriceDataPoint, SentimentDataPoint, SentimentPriceSignal, SentimentSample, SocialPost,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, warn};

use crate::aggregator::{window_start, SentimentAggregator};
use crate::correlation::CorrelationEngine;
use crate::divergence::DivergenceDetector;
use crate::error::{EngineError, Result};
use crate::fear_greed::{FearGreedComposer, FearGreedInputs};
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::normalizer::Normalizer;
use crate::signals::SignalGenerator;

/// Timeframe label of the correlation over the full supplied history
pub const FULL_HISTORY_TIMEFRAME: &str = "full";

const SECONDS_PER_HOUR: i64 = 3_600;

/// Everything the engine can say about one symbol at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolAnalysis {
    pub symbol: String,
    /// `None` when the window is quiet
    pub sentiment: Option<AggregatedSentiment>,
    pub fear_greed: Option<FearGreedIndex>,
    /// Over the full supplied history; `None` when too few points align
    pub correlation: Option<CorrelationResult>,
    /// Configured timeframes that had enough data
    pub timeframe_correlations: Vec<CorrelationResult>,
    pub divergences: Vec<DivergenceResult>,
    pub signal: Option<SentimentPriceSignal>,
    pub analyzed_at: DateTime<Utc>,
}

pub struct SentimentEngine {
    normalizer: Normalizer,
    aggregator: SentimentAggregator,
    fear_greed: FearGreedComposer,
    correlation: CorrelationEngine,
    divergence: DivergenceDetector,
    signals: SignalGenerator,
    metrics: Arc<MetricsCollector>,
}

impl Default for SentimentEngine {
    fn default() -> Self {
        Self {
            normalizer: Normalizer::default(),
            aggregator: SentimentAggregator::default(),
            fear_greed: FearGreedComposer::default(),
            correlation: CorrelationEngine::default(),
            divergence: DivergenceDetector::default(),
            signals: SignalGenerator::default(),
            metrics: Arc::new(MetricsCollector::new()),
        }
    }
}

impl SentimentEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let EngineConfig {
            aggregator,
            fear_greed,
            correlation,
            divergence,
            signal,
            sources,
        } = config;

        Ok(Self {
            normalizer: Normalizer::new(sources),
            aggregator: SentimentAggregator::new(aggregator)?,
            fear_greed: FearGreedComposer::new(fear_greed)?,
            correlation: CorrelationEngine::new(correlation)?,
            divergence: DivergenceDetector::new(divergence)?,
            signals: SignalGenerator::new(signal)?,
            metrics: Arc::new(MetricsCollector::new()),
        })
    }

    /// Current configuration of every component
    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            aggregator: self.aggregator.config().clone(),
            fear_greed: self.fear_greed.config().clone(),
            correlation: self.correlation.config().clone(),
            divergence: self.divergence.config().clone(),
            signal: self.signals.config().clone(),
            sources: self.normalizer.weights().clone(),
        }
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        Arc::clone(&self.metrics)
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    // Configuration updates: the previous config stays active on rejection

    pub fn update_aggregator_config(&mut self, config: AggregatorConfig) -> Result<()> {
        let outcome = self.aggregator.update_config(config);
        self.log_update("aggregator", outcome)
    }

    pub fn update_fear_greed_config(&mut self, config: FearGreedConfig) -> Result<()> {
        let outcome = self.fear_greed.update_config(config);
        self.log_update("fear_greed", outcome)
    }

    pub fn update_fear_greed_weights(&mut self, weights: FearGreedWeights) -> Result<()> {
        let outcome = self.fear_greed.update_weights(weights);
        self.log_update("fear_greed.weights", outcome)
    }

    pub fn update_correlation_config(&mut self, config: CorrelationConfig) -> Result<()> {
        let outcome = self.correlation.update_config(config);
        self.log_update("correlation", outcome)
    }

    pub fn update_divergence_config(&mut self, config: DivergenceConfig) -> Result<()> {
        let outcome = self.divergence.update_config(config);
        self.log_update("divergence", outcome)
    }

    pub fn update_signal_config(&mut self, config: SignalConfig) -> Result<()> {
        let outcome = self.signals.update_config(config);
        self.log_update("signal", outcome)
    }

    fn log_update(
        &self,
        component: &'static str,
        outcome: std::result::Result<(), sentiment_config::ConfigError>,
    ) -> Result<()> {
        match outcome {
            Ok(()) => {
                info!(component, "Configuration updated");
                Ok(())
            }
            Err(e) => {
                warn!(component, error = %e, "Rejected configuration update");
                self.metrics.increment_errors();
                Err(e.into())
            }
        }
    }

    // Pipeline operations

    pub fn normalize(&self, news: &[NewsItem], social: &[SocialPost]) -> Vec<SentimentDataPoint> {
        self.normalizer.normalize_batch(news, social)
    }

    pub fn aggregate_symbol(
        &self,
        symbol: &str,
        history: &[SentimentDataPoint],
        as_of: DateTime<Utc>,
    ) -> Option<AggregatedSentiment> {
        let result = self.aggregator.aggregate_symbol(symbol, history, as_of);
        match result {
            Some(_) => self.metrics.increment_aggregations(),
            None => self.metrics.increment_quiet_windows(),
        }
        result
    }

    /// Quiet symbols are omitted from the result and counted as quiet windows
    pub fn aggregate_all(
        &self,
        history: &[SentimentDataPoint],
        symbols: &[String],
        as_of: DateTime<Utc>,
    ) -> Vec<AggregatedSentiment> {
        let requested: BTreeSet<String> = symbols.iter().map(|s| s.trim().to_uppercase()).collect();
        let results = self.aggregator.aggregate_all(history, symbols, as_of);
        for _ in &results {
            self.metrics.increment_aggregations();
        }
        for _ in results.len()..requested.len() {
            self.metrics.increment_quiet_windows();
        }
        results
    }

    pub fn fear_greed(&self, inputs: &FearGreedInputs, timestamp: DateTime<Utc>) -> FearGreedIndex {
        self.fear_greed.calculate(inputs, timestamp)
    }

    pub fn correlate(
        &self,
        symbol: &str,
        sentiment: &[SentimentSample],
        prices: &[PriceDataPoint],
        timeframe: &str,
    ) -> Result<CorrelationResult> {
        validate_prices(prices)?;
        self.correlation
            .correlate(symbol, sentiment, prices, timeframe)
            .inspect_err(|_| self.metrics.increment_errors())
    }

    pub fn correlate_multi_timeframe(
        &self,
        symbol: &str,
        sentiment: &[SentimentSample],
        prices: &[PriceDataPoint],
        as_of: DateTime<Utc>,
    ) -> Result<Vec<CorrelationResult>> {
        validate_prices(prices)?;
        Ok(self
            .correlation
            .correlate_timeframes(symbol, sentiment, prices, as_of))
    }

    pub fn detect_divergence(
        &self,
        symbol: &str,
        sentiment: &[SentimentSample],
        prices: &[PriceDataPoint],
    ) -> Vec<DivergenceResult> {
        self.divergence.detect(symbol, sentiment, prices)
    }

    pub fn generate_signal(
        &self,
        aggregated: &AggregatedSentiment,
        prices: &[PriceDataPoint],
        correlation: Option<&CorrelationResult>,
    ) -> SentimentPriceSignal {
        self.metrics.increment_signals();
        self.signals.generate(aggregated, prices, correlation)
    }

    /// Run the full pipeline for one symbol
    ///
    /// Bars after `as_of` are ignored. Correlation and divergence see the
    /// symbol's history bucketed into hourly mean scores up to `as_of`, while
    /// fear & greed and the signal only see bars inside the aggregation window.
    /// A correlation without enough aligned points is logged and left out; the
    /// rest of the analysis still runs.
    pub fn analyze_symbol(
        &self,
        symbol: &str,
        history: &[SentimentDataPoint],
        prices: &[PriceDataPoint],
        as_of: DateTime<Utc>,
    ) -> Result<SymbolAnalysis> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(EngineError::InvalidInput {
                message: "symbol must not be empty".to_string(),
            });
        }
        validate_prices(prices)?;
        let prices = &prices[..prices.partition_point(|p| p.timestamp <= as_of)];
        let window_opens = window_start(as_of, self.aggregator.window());
        let recent = &prices[prices.partition_point(|p| p.timestamp < window_opens)..];

        let sentiment = self.aggregate_symbol(&symbol, history, as_of);
        let samples = hourly_samples(history, &symbol, as_of);

        let correlation = match self.correlate(&symbol, &samples, prices, FULL_HISTORY_TIMEFRAME) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Correlation unavailable");
                None
            }
        };
        let timeframe_correlations = self
            .correlation
            .correlate_timeframes(&symbol, &samples, prices, as_of);
        let divergences = self.detect_divergence(&symbol, &samples, prices);

        let fear_greed = sentiment.as_ref().map(|aggregated| {
            let inputs = FearGreedInputs::from_market(
                aggregated.score,
                aggregated.data_points as f64,
                recent,
            );
            self.fear_greed(&inputs, as_of)
        });
        let signal = sentiment
            .as_ref()
            .map(|aggregated| self.generate_signal(aggregated, recent, correlation.as_ref()));

        Ok(SymbolAnalysis {
            symbol,
            sentiment,
            fear_greed,
            correlation,
            timeframe_correlations,
            divergences,
            signal,
            analyzed_at: as_of,
        })
    }
}

/// Reject bars that are out of order or carry a non-finite close
pub fn validate_prices(prices: &[PriceDataPoint]) -> Result<()> {
    if let Some(bar) = prices.iter().find(|p| !p.close.is_finite()) {
        return Err(EngineError::InvalidInput {
            message: format!("non-finite close at {}", bar.timestamp),
        });
    }
    if let Some(pair) = prices.windows(2).find(|w| w[1].timestamp < w[0].timestamp) {
        return Err(EngineError::InvalidInput {
            message: format!(
                "price bars must be ascending: {} follows {}",
                pair[1].timestamp, pair[0].timestamp
            ),
        });
    }
    Ok(())
}

/// Mean score per clock hour for points mentioning `symbol`, up to `as_of`
pub fn hourly_samples(
    history: &[SentimentDataPoint],
    symbol: &str,
    as_of: DateTime<Utc>,
) -> Vec<SentimentSample> {
    let mut buckets: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for point in history
        .iter()
        .filter(|p| p.mentions(symbol) && p.timestamp() <= as_of)
    {
        let hour = point.timestamp().timestamp().div_euclid(SECONDS_PER_HOUR);
        let entry = buckets.entry(hour).or_insert((0.0, 0));
        entry.0 += point.score();
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .filter_map(|(hour, (sum, count))| {
            let timestamp = DateTime::from_timestamp(hour * SECONDS_PER_HOUR, 0)?;
            Some(SentimentSample::new(timestamp, sum / count as f64))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use sentiment_config::ConfigError;
    use sentiment_types::{DataPointParams, SourceKind};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, 12, 0, 0).unwrap()
    }

    fn point(score: f64, minutes_ago: i64) -> SentimentDataPoint {
        SentimentDataPoint::new(DataPointParams {
            source: "coindesk".to_string(),
            kind: SourceKind::News,
            score,
            magnitude: 0.5,
            confidence: 0.7,
            timestamp: as_of() - Duration::minutes(minutes_ago),
            weight: 0.9,
            engagement: None,
            is_influencer: false,
            symbols: ["BTC".to_string()].into_iter().collect(),
        })
    }

    #[test]
    fn test_rejected_update_keeps_previous_config() {
        let mut engine = SentimentEngine::default();
        let bad = FearGreedWeights {
            sentiment: 0.4,
            volume: 0.4,
            volatility: 0.4,
            momentum: 0.0,
        };

        let result = engine.update_fear_greed_weights(bad);
        assert!(matches!(
            result,
            Err(EngineError::Configuration(ConfigError::WeightsDoNotSumToOne { .. }))
        ));
        assert_eq!(engine.config().fear_greed.weights, FearGreedWeights::default());
        assert_eq!(engine.metrics_snapshot().errors, 1);
    }

    #[test]
    fn test_update_aggregator_window() {
        let mut engine = SentimentEngine::default();
        let invalid = AggregatorConfig {
            time_window_hours: 0.0,
            ..Default::default()
        };
        assert!(engine.update_aggregator_config(invalid).is_err());

        let valid = AggregatorConfig {
            time_window_hours: 6.0,
            min_data_points: 1,
            ..Default::default()
        };
        engine.update_aggregator_config(valid).unwrap();
        assert_eq!(engine.config().aggregator.time_window_hours, 6.0);
    }

    #[test]
    fn test_hourly_samples_average_each_hour() {
        let history = vec![point(10.0, 10), point(30.0, 20), point(-50.0, 70), point(90.0, -30)];

        let samples = hourly_samples(&history, "btc", as_of());

        // 11:50 and 11:40 share a bucket; 10:50 stands alone; 12:30 is after as_of
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].score, -50.0);
        assert_eq!(samples[1].score, 20.0);
        assert_eq!(samples[1].timestamp, as_of() - Duration::hours(1));
    }

    #[test]
    fn test_validate_prices() {
        let bars = vec![
            PriceDataPoint::from_close(as_of(), 100.0),
            PriceDataPoint::from_close(as_of() - Duration::hours(1), 99.0),
        ];
        assert!(matches!(
            validate_prices(&bars),
            Err(EngineError::InvalidInput { .. })
        ));

        let nan = vec![PriceDataPoint::from_close(as_of(), f64::NAN)];
        assert!(validate_prices(&nan).is_err());
        assert!(validate_prices(&[]).is_ok());
    }

    #[test]
    fn test_quiet_analysis_has_no_signal() {
        let engine = SentimentEngine::default();
        let history = vec![point(40.0, 30)];

        let analysis = engine.analyze_symbol("btc", &history, &[], as_of()).unwrap();

        assert_eq!(analysis.symbol, "BTC");
        assert!(analysis.sentiment.is_none());
        assert!(analysis.signal.is_none());
        assert!(analysis.correlation.is_none());
        assert!(analysis.divergences.is_empty());

        let snapshot = engine.metrics_snapshot();
        assert_eq!(snapshot.quiet_windows, 1);
        assert_eq!(snapshot.errors, 1);
    }

    fn hourly_bars(from_hours: i64, to_hours: i64, close: f64) -> Vec<PriceDataPoint> {
        (from_hours..=to_hours)
            .map(|h| PriceDataPoint::from_close(as_of() + Duration::hours(h), close))
            .collect()
    }

    #[test]
    fn test_bars_after_as_of_are_ignored() {
        let engine = SentimentEngine::default();
        let history: Vec<SentimentDataPoint> = (1..=20).map(|h| point(40.0, h * 60)).collect();
        let past = hourly_bars(-47, 0, 100.0);
        let mut with_future = past.clone();
        with_future.extend(hourly_bars(1, 23, 80.0));

        let baseline = engine.analyze_symbol("BTC", &history, &past, as_of()).unwrap();
        let replayed = engine
            .analyze_symbol("BTC", &history, &with_future, as_of())
            .unwrap();

        assert_eq!(replayed, baseline);
        let signal = replayed.signal.unwrap();
        assert_eq!(signal.price_change, 0.0);
        assert!(signal.reasoning.iter().all(|r| !r.contains("divergence")));
    }

    #[test]
    fn test_signal_price_change_uses_aggregation_window() {
        let engine = SentimentEngine::default();
        let history: Vec<SentimentDataPoint> = (1..=20).map(|h| point(40.0, h * 60)).collect();
        let mut bars = hourly_bars(-48, -25, 50.0);
        bars.extend(hourly_bars(-24, 0, 100.0));

        let analysis = engine.analyze_symbol("BTC", &history, &bars, as_of()).unwrap();

        assert_eq!(analysis.signal.unwrap().price_change, 0.0);

        let aggregated = analysis.sentiment.unwrap();
        let flat_market = FearGreedInputs {
            sentiment_score: aggregated.score,
            social_volume: aggregated.data_points as f64,
            price_volatility: 0.0,
            price_momentum: 0.0,
        };
        assert_eq!(analysis.fear_greed, Some(engine.fear_greed(&flat_market, as_of())));
    }

    #[test]
    fn test_aggregate_all_counts_quiet_symbols() {
        let engine = SentimentEngine::default();
        let history: Vec<SentimentDataPoint> = (1..=6).map(|h| point(25.0, h * 60)).collect();
        let symbols = vec!["btc".to_string(), "BTC".to_string(), "ETH".to_string()];

        let results = engine.aggregate_all(&history, &symbols, as_of());

        assert_eq!(results.len(), 1);
        let snapshot = engine.metrics_snapshot();
        assert_eq!(snapshot.aggregations, 1);
        assert_eq!(snapshot.quiet_windows, 1);
    }

    #[test]
    fn test_empty_symbol_is_invalid() {
        let engine = SentimentEngine::default();
        assert!(matches!(
            engine.analyze_symbol("  ", &[], &[], as_of()),
            Err(EngineError::InvalidInput { .. })
        ));
    }
}
