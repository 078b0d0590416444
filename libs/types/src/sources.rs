//! Raw source records
//!
//! Field-level shape of the items delivered by news and social connectors.
//! Classification already happened upstream, so the sentiment fields are
//! optional: connectors that could not score an item leave them empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// News article or aggregator headline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Publisher id (e.g. `coindesk`, `cryptopanic`)
    pub source: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub sentiment_magnitude: Option<f64>,
    /// Community votes, used as the engagement count
    #[serde(default)]
    pub votes: Option<u64>,
    #[serde(default)]
    pub is_important: Option<bool>,
    #[serde(default)]
    pub is_trending: Option<bool>,
    #[serde(default)]
    pub symbols: Vec<String>,
}

/// Social post from Twitter, Reddit and similar platforms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    /// Platform id (e.g. `twitter`, `reddit`)
    pub platform: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub sentiment_magnitude: Option<f64>,
    #[serde(default)]
    pub sentiment_confidence: Option<f64>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub replies: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub retweets: Option<u64>,
    #[serde(default)]
    pub upvotes: Option<u64>,
    #[serde(default)]
    pub is_influencer: Option<bool>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub symbols: Vec<String>,
}

impl SocialPost {
    /// Combined interaction count; views count at 1/100 of an interaction
    pub fn engagement(&self) -> u64 {
        self.likes
            .saturating_add(self.replies)
            .saturating_add(self.retweets.unwrap_or(0))
            .saturating_add(self.upvotes.unwrap_or(0))
            .saturating_add(self.views / 100)
    }
}
