//! Sentiment records: canonical data points, aggregates and the fear/greed index

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{clamp_score, clamp_unit};

/// Origin family of a data point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    News,
    Social,
}

/// Canonical sentiment observation
///
/// Produced once by the normalizer and never mutated afterwards, so the fields
/// are private. Bounded fields are clamped in [`SentimentDataPoint::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentDataPoint {
    source: String,
    kind: SourceKind,
    score: f64,
    magnitude: f64,
    confidence: f64,
    timestamp: DateTime<Utc>,
    weight: f64,
    engagement: Option<u64>,
    is_influencer: bool,
    symbols: BTreeSet<String>,
}

/// Constructor arguments for [`SentimentDataPoint`]
#[derive(Debug, Clone)]
pub struct DataPointParams {
    pub source: String,
    pub kind: SourceKind,
    pub score: f64,
    pub magnitude: f64,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub weight: f64,
    pub engagement: Option<u64>,
    pub is_influencer: bool,
    pub symbols: BTreeSet<String>,
}

impl SentimentDataPoint {
    pub fn new(params: DataPointParams) -> Self {
        let weight = if params.weight.is_finite() {
            params.weight.max(0.0)
        } else {
            0.0
        };

        Self {
            source: params.source.to_lowercase(),
            kind: params.kind,
            score: clamp_score(params.score),
            magnitude: clamp_unit(params.magnitude),
            confidence: clamp_unit(params.confidence),
            timestamp: params.timestamp,
            weight,
            engagement: params.engagement,
            is_influencer: params.is_influencer,
            symbols: params
                .symbols
                .into_iter()
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Base weight after source reliability and flag boosts
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn engagement(&self) -> Option<u64> {
        self.engagement
    }

    pub fn is_influencer(&self) -> bool {
        self.is_influencer
    }

    pub fn symbols(&self) -> &BTreeSet<String> {
        &self.symbols
    }

    /// Symbol membership, case-insensitive
    pub fn mentions(&self, symbol: &str) -> bool {
        self.symbols.contains(&symbol.trim().to_uppercase())
    }
}

/// Five-level sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    VeryPositive,
}

impl SentimentLabel {
    /// Band a score; lower bounds are inclusive
    pub fn from_score(score: f64) -> Self {
        if score >= 60.0 {
            SentimentLabel::VeryPositive
        } else if score >= 20.0 {
            SentimentLabel::Positive
        } else if score >= -20.0 {
            SentimentLabel::Neutral
        } else if score >= -60.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::VeryNegative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::VeryNegative => "very_negative",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Positive => "positive",
            SentimentLabel::VeryPositive => "very_positive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Deteriorating,
}

/// Half-over-half movement of the scores inside one window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentTrend {
    pub direction: TrendDirection,
    /// `|Δ| / 100`, in `[0, 1]`
    pub strength: f64,
    /// Score points per hour
    pub velocity: f64,
}

impl SentimentTrend {
    pub fn stable() -> Self {
        Self {
            direction: TrendDirection::Stable,
            strength: 0.0,
            velocity: 0.0,
        }
    }
}

/// Per-source contribution to an aggregate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceBreakdown {
    pub count: usize,
    pub avg_score: f64,
    pub avg_weight: f64,
}

/// One symbol's sentiment over one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSentiment {
    pub symbol: String,
    pub score: f64,
    pub magnitude: f64,
    pub label: SentimentLabel,
    pub confidence: f64,
    pub trend: SentimentTrend,
    /// Score delta against the preceding window of equal length
    pub change: f64,
    /// Keyed by source id; ordered for stable serialization
    pub sources: BTreeMap<String, SourceBreakdown>,
    pub data_points: usize,
    pub time_window_hours: f64,
    pub last_updated: DateTime<Utc>,
}

/// Timestamped score, the sentiment side of correlation and divergence input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentSample {
    pub timestamp: DateTime<Utc>,
    pub score: f64,
}

impl SentimentSample {
    pub fn new(timestamp: DateTime<Utc>, score: f64) -> Self {
        Self { timestamp, score }
    }
}

impl From<&SentimentDataPoint> for SentimentSample {
    fn from(point: &SentimentDataPoint) -> Self {
        Self::new(point.timestamp(), point.score())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FearGreedLabel {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl FearGreedLabel {
    pub fn from_value(value: f64) -> Self {
        if value >= 75.0 {
            FearGreedLabel::ExtremeGreed
        } else if value >= 55.0 {
            FearGreedLabel::Greed
        } else if value >= 45.0 {
            FearGreedLabel::Neutral
        } else if value >= 25.0 {
            FearGreedLabel::Fear
        } else {
            FearGreedLabel::ExtremeFear
        }
    }
}

/// Composite 0-100 market mood
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FearGreedIndex {
    pub value: f64,
    pub label: FearGreedLabel,
    pub timestamp: DateTime<Utc>,
}
