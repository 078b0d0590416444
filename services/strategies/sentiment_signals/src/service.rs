//! # Sentiment Service
//!
//! ## Purpose
//!
//! Async boundary around [`SentimentEngine`]. Requests arrive on a
//! `tokio::sync::mpsc` channel and every request produces exactly one
//! [`EngineEvent`]. The primary consumer takes a lossless `mpsc` event stream
//! from [`SentimentService::event_stream`]; a full stream holds the service
//! back instead of dropping events. Additional observers may subscribe to a
//! `tokio::sync::broadcast` channel, where a slow receiver sees `Lagged`.
//!
//! ## State
//!
//! The service keeps the normalized history and the latest price bars per
//! symbol in memory. History older than the longest window the engine can
//! read (twice the aggregation window, or the longest correlation timeframe)
//! is pruned on every ingest.
//!
//! ```text
//! EngineRequest ──mpsc──→ [SentimentService] ──mpsc──────→ EngineEvent (primary)
//!                              │              └─broadcast─→ EngineEvent (observers)
//!                        SentimentEngine
//! ```

use chrono::{DateTime, Utc};
use sentiment_config::{
    AggregatorConfig, CorrelationConfig, DivergenceConfig, FearGreedConfig, FearGreedWeights,
    SignalConfig,
};
use sentiment_types::{
    AggregatedSentiment, FearGreedIndex, NewsItem, PriceDataPoint, SentimentDataPoint, SocialPost,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::aggregator::{hours_to_duration, window_start};
use crate::engine::{validate_prices, SentimentEngine, SymbolAnalysis};
use crate::error::Result;
use crate::fear_greed::FearGreedInputs;
use crate::metrics::MetricsSnapshot;

/// Buffer of the event stream and of the broadcast channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineRequest {
    Ingest {
        #[serde(default)]
        news: Vec<NewsItem>,
        #[serde(default)]
        social: Vec<SocialPost>,
    },
    UpdatePrices {
        symbol: String,
        prices: Vec<PriceDataPoint>,
    },
    Aggregate {
        symbol: String,
        #[serde(default)]
        as_of: Option<DateTime<Utc>>,
    },
    Analyze {
        symbol: String,
        #[serde(default)]
        as_of: Option<DateTime<Utc>>,
    },
    FearGreed {
        inputs: FearGreedInputs,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    UpdateAggregatorConfig {
        config: AggregatorConfig,
    },
    UpdateFearGreedConfig {
        config: FearGreedConfig,
    },
    UpdateFearGreedWeights {
        weights: FearGreedWeights,
    },
    UpdateCorrelationConfig {
        config: CorrelationConfig,
    },
    UpdateDivergenceConfig {
        config: DivergenceConfig,
    },
    UpdateSignalConfig {
        config: SignalConfig,
    },
    Metrics,
}

impl EngineRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineRequest::Ingest { .. } => "ingest",
            EngineRequest::UpdatePrices { .. } => "update_prices",
            EngineRequest::Aggregate { .. } => "aggregate",
            EngineRequest::Analyze { .. } => "analyze",
            EngineRequest::FearGreed { .. } => "fear_greed",
            EngineRequest::UpdateAggregatorConfig { .. } => "update_aggregator_config",
            EngineRequest::UpdateFearGreedConfig { .. } => "update_fear_greed_config",
            EngineRequest::UpdateFearGreedWeights { .. } => "update_fear_greed_weights",
            EngineRequest::UpdateCorrelationConfig { .. } => "update_correlation_config",
            EngineRequest::UpdateDivergenceConfig { .. } => "update_divergence_config",
            EngineRequest::UpdateSignalConfig { .. } => "update_signal_config",
            EngineRequest::Metrics => "metrics",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    Ingested {
        accepted: usize,
        dropped: usize,
        retained: usize,
    },
    PricesUpdated {
        symbol: String,
        bars: usize,
    },
    Aggregated {
        sentiment: AggregatedSentiment,
    },
    /// The window held fewer points than required
    Quiet {
        symbol: String,
    },
    Analysis {
        analysis: Box<SymbolAnalysis>,
    },
    FearGreed {
        index: FearGreedIndex,
    },
    ConfigUpdated {
        component: &'static str,
    },
    Metrics {
        metrics: MetricsSnapshot,
    },
    Error {
        request: &'static str,
        message: String,
    },
}

pub struct SentimentService {
    engine: SentimentEngine,
    history: Vec<SentimentDataPoint>,
    prices: HashMap<String, Vec<PriceDataPoint>>,
    requests: mpsc::Receiver<EngineRequest>,
    stream: Option<mpsc::Sender<EngineEvent>>,
    observers: broadcast::Sender<EngineEvent>,
}

impl SentimentService {
    pub fn new(engine: SentimentEngine, requests: mpsc::Receiver<EngineRequest>) -> Self {
        let (observers, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            engine,
            history: Vec::new(),
            prices: HashMap::new(),
            requests,
            stream: None,
            observers,
        }
    }

    /// Lossless stream of every event; replaces any earlier stream
    pub fn event_stream(&mut self) -> mpsc::Receiver<EngineEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        self.stream = Some(tx);
        rx
    }

    /// Best-effort observer; events are lost if it falls behind
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.observers.subscribe()
    }

    /// Process requests until every sender is dropped
    pub async fn run(mut self) -> Result<()> {
        info!("Sentiment service started");

        while let Some(request) = self.requests.recv().await {
            let event = self.handle(request);
            self.publish(event).await;
        }

        info!(
            metrics = ?self.engine.metrics_snapshot(),
            "Request channel closed, sentiment service stopping"
        );
        Ok(())
    }

    /// Apply one request and build its event
    pub fn handle(&mut self, request: EngineRequest) -> EngineEvent {
        self.engine.metrics().increment_requests();
        let kind = request.kind();

        match request {
            EngineRequest::Ingest { news, social } => {
                let points = self.engine.normalize(&news, &social);
                let accepted = points.len();
                let dropped = news.len() + social.len() - accepted;
                self.history.extend(points);
                self.prune_history();
                EngineEvent::Ingested {
                    accepted,
                    dropped,
                    retained: self.history.len(),
                }
            }
            EngineRequest::UpdatePrices { symbol, mut prices } => {
                prices.sort_by_key(|p| p.timestamp);
                prices.dedup_by_key(|p| p.timestamp);
                if let Err(e) = validate_prices(&prices) {
                    return error_event(kind, e);
                }
                let symbol = symbol.trim().to_uppercase();
                let bars = prices.len();
                self.prices.insert(symbol.clone(), prices);
                EngineEvent::PricesUpdated { symbol, bars }
            }
            EngineRequest::Aggregate { symbol, as_of } => {
                let as_of = as_of.unwrap_or_else(Utc::now);
                match self.engine.aggregate_symbol(&symbol, &self.history, as_of) {
                    Some(sentiment) => EngineEvent::Aggregated { sentiment },
                    None => EngineEvent::Quiet {
                        symbol: symbol.trim().to_uppercase(),
                    },
                }
            }
            EngineRequest::Analyze { symbol, as_of } => {
                let as_of = as_of.unwrap_or_else(Utc::now);
                let key = symbol.trim().to_uppercase();
                let prices = self.prices.get(&key).map(Vec::as_slice).unwrap_or(&[]);
                match self.engine.analyze_symbol(&key, &self.history, prices, as_of) {
                    Ok(analysis) => EngineEvent::Analysis {
                        analysis: Box::new(analysis),
                    },
                    Err(e) => error_event(kind, e),
                }
            }
            EngineRequest::FearGreed { inputs, timestamp } => EngineEvent::FearGreed {
                index: self
                    .engine
                    .fear_greed(&inputs, timestamp.unwrap_or_else(Utc::now)),
            },
            EngineRequest::UpdateAggregatorConfig { config } => {
                config_event(kind, "aggregator", self.engine.update_aggregator_config(config))
            }
            EngineRequest::UpdateFearGreedConfig { config } => {
                config_event(kind, "fear_greed", self.engine.update_fear_greed_config(config))
            }
            EngineRequest::UpdateFearGreedWeights { weights } => {
                config_event(kind, "fear_greed", self.engine.update_fear_greed_weights(weights))
            }
            EngineRequest::UpdateCorrelationConfig { config } => {
                config_event(kind, "correlation", self.engine.update_correlation_config(config))
            }
            EngineRequest::UpdateDivergenceConfig { config } => {
                config_event(kind, "divergence", self.engine.update_divergence_config(config))
            }
            EngineRequest::UpdateSignalConfig { config } => {
                config_event(kind, "signal", self.engine.update_signal_config(config))
            }
            EngineRequest::Metrics => EngineEvent::Metrics {
                metrics: self.engine.metrics_snapshot(),
            },
        }
    }

    async fn publish(&mut self, event: EngineEvent) {
        if self.observers.receiver_count() > 0 && self.observers.send(event.clone()).is_err() {
            debug!("Observers left before the event was sent");
        }

        let stream_closed = match &self.stream {
            Some(stream) => stream.send(event).await.is_err(),
            None => false,
        };
        if stream_closed {
            warn!("Event stream receiver dropped, continuing with observers only");
            self.stream = None;
        }
    }

    fn retention_hours(&self) -> f64 {
        let config = self.engine.config();
        let longest_timeframe = config
            .correlation
            .timeframes
            .iter()
            .map(|t| t.hours)
            .fold(0.0, f64::max);
        (config.aggregator.time_window_hours * 2.0).max(longest_timeframe)
    }

    fn prune_history(&mut self) {
        let Some(newest) = self.history.iter().map(|p| p.timestamp()).max() else {
            return;
        };
        let cutoff = window_start(newest, hours_to_duration(self.retention_hours()));
        let before = self.history.len();
        self.history.retain(|p| p.timestamp() >= cutoff);

        let pruned = before - self.history.len();
        if pruned > 0 {
            debug!(pruned, retained = self.history.len(), "Pruned sentiment history");
        }
    }
}

fn error_event(request: &'static str, error: impl std::fmt::Display) -> EngineEvent {
    EngineEvent::Error {
        request,
        message: error.to_string(),
    }
}

fn config_event(request: &'static str, component: &'static str, outcome: Result<()>) -> EngineEvent {
    match outcome {
        Ok(()) => EngineEvent::ConfigUpdated { component },
        Err(e) => error_event(request, e),
    }
}
