//! Source normalization
//!
//! Maps news and social records into canonical [`SentimentDataPoint`]s. The base
//! weight of each point is the source reliability from the injected
//! [`SourceWeights`] table multiplied by the fixed flag boosts; recency,
//! engagement and influencer weighting happen later in the aggregator.
//!
//! Items without a finite sentiment score are not valid observations and are
//! skipped rather than counted as neutral.

use sentiment_config::SourceWeights;
use sentiment_types::{DataPointParams, NewsItem, SentimentDataPoint, SocialPost, SourceKind};
use tracing::debug;

/// Confidence assigned to scored news, which carries no confidence field
pub const NEWS_CONFIDENCE: f64 = 0.7;

/// Confidence for social posts whose classifier reported none
pub const DEFAULT_SOCIAL_CONFIDENCE: f64 = 0.5;

pub struct Normalizer {
    weights: SourceWeights,
}

impl Normalizer {
    pub fn new(weights: SourceWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &SourceWeights {
        &self.weights
    }

    pub fn normalize_news(&self, item: &NewsItem) -> Option<SentimentDataPoint> {
        let score = finite_score(item.sentiment_score)?;
        let boosts = self.weights.boosts();

        let mut weight = self.weights.base_weight(&item.source);
        if item.is_important.unwrap_or(false) {
            weight *= boosts.important;
        }
        if item.is_trending.unwrap_or(false) {
            weight *= boosts.trending;
        }

        Some(SentimentDataPoint::new(DataPointParams {
            source: item.source.clone(),
            kind: SourceKind::News,
            score,
            magnitude: magnitude_or_default(item.sentiment_magnitude, score),
            confidence: NEWS_CONFIDENCE,
            timestamp: item.published_at,
            weight,
            engagement: item.votes,
            is_influencer: false,
            symbols: item.symbols.iter().cloned().collect(),
        }))
    }

    pub fn normalize_social(&self, post: &SocialPost) -> Option<SentimentDataPoint> {
        let score = finite_score(post.sentiment_score)?;
        let boosts = self.weights.boosts();
        let is_influencer = post.is_influencer.unwrap_or(false);

        let mut weight = self.weights.base_weight(&post.platform);
        if is_influencer {
            weight *= boosts.influencer;
        }
        if post.is_verified.unwrap_or(false) {
            weight *= boosts.verified;
        }

        let confidence = post
            .sentiment_confidence
            .filter(|c| c.is_finite())
            .unwrap_or(DEFAULT_SOCIAL_CONFIDENCE);

        Some(SentimentDataPoint::new(DataPointParams {
            source: post.platform.clone(),
            kind: SourceKind::Social,
            score,
            magnitude: magnitude_or_default(post.sentiment_magnitude, score),
            confidence,
            timestamp: post.created_at,
            weight,
            engagement: Some(post.engagement()),
            is_influencer,
            symbols: post.symbols.iter().cloned().collect(),
        }))
    }

    /// Normalize a mixed batch, dropping unscored items
    pub fn normalize_batch(&self, news: &[NewsItem], social: &[SocialPost]) -> Vec<SentimentDataPoint> {
        let mut points = Vec::with_capacity(news.len() + social.len());
        points.extend(news.iter().filter_map(|item| self.normalize_news(item)));
        points.extend(social.iter().filter_map(|post| self.normalize_social(post)));

        let dropped = news.len() + social.len() - points.len();
        if dropped > 0 {
            debug!(dropped, kept = points.len(), "Skipped unscored source items");
        }
        points
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(SourceWeights::default())
    }
}

fn finite_score(score: Option<f64>) -> Option<f64> {
    score.filter(|s| s.is_finite())
}

/// Explicit magnitude, else the score's own intensity
fn magnitude_or_default(magnitude: Option<f64>, score: f64) -> f64 {
    magnitude
        .filter(|m| m.is_finite())
        .unwrap_or_else(|| score.abs() / 100.0)
}
