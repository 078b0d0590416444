//! Source reliability table
//!
//! Read-only once built: the normalizer receives a `SourceWeights` at
//! construction and there is no update path. Deployments override it through
//! the config file instead of code changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ConfigError, Result};

/// Multiplicative boosts applied by the normalizer for item flags
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceBoosts {
    pub important: f64,
    pub trending: f64,
    pub influencer: f64,
    pub verified: f64,
}

impl Default for SourceBoosts {
    fn default() -> Self {
        Self {
            important: 1.5,
            trending: 1.2,
            influencer: 1.3,
            verified: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceWeights {
    weights: BTreeMap<String, f64>,
    default_weight: f64,
    boosts: SourceBoosts,
}

impl Default for SourceWeights {
    fn default() -> Self {
        // News outlets rank above social platforms
        let weights = [
            ("coindesk", 0.9),
            ("cointelegraph", 0.85),
            ("theblock", 0.85),
            ("decrypt", 0.8),
            ("cryptopanic", 0.75),
            ("rss", 0.7),
            ("twitter", 0.6),
            ("reddit", 0.5),
        ]
        .into_iter()
        .map(|(source, weight)| (source.to_string(), weight))
        .collect();

        Self {
            weights,
            default_weight: 0.5,
            boosts: SourceBoosts::default(),
        }
    }
}

impl SourceWeights {
    /// Build a table; source ids are matched case-insensitively
    pub fn new<I, S>(weights: I, default_weight: f64, boosts: SourceBoosts) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        Self {
            weights: weights
                .into_iter()
                .map(|(source, weight)| (source.as_ref().to_lowercase(), weight))
                .collect(),
            default_weight,
            boosts,
        }
    }

    /// Reliability weight for a source, falling back to the default
    pub fn base_weight(&self, source: &str) -> f64 {
        self.weights
            .get(&source.to_lowercase())
            .copied()
            .unwrap_or(self.default_weight)
    }

    pub fn default_weight(&self) -> f64 {
        self.default_weight
    }

    pub fn boosts(&self) -> &SourceBoosts {
        &self.boosts
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        let entries = self
            .weights
            .iter()
            .map(|(source, weight)| (source.as_str(), *weight))
            .chain([
                ("<default>", self.default_weight),
                ("<boost:important>", self.boosts.important),
                ("<boost:trending>", self.boosts.trending),
                ("<boost:influencer>", self.boosts.influencer),
                ("<boost:verified>", self.boosts.verified),
            ]);

        for (source, weight) in entries {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidSourceWeight {
                    source_id: source.to_string(),
                    value: weight,
                });
            }
        }
        Ok(())
    }
}
