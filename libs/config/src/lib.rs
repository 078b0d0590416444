//! # Sentiment Engine Configuration
//!
//! Structured configuration for every engine component, with the defaults the
//! engine ships with and the validation rules applied at update time.
//!
//! ## Features
//!
//! - **Component Configs**: aggregator, fear & greed, correlation, divergence
//!   and signal thresholds as plain serde structs
//! - **Source Weights**: immutable reliability table injected into the
//!   normalizer at construction
//! - **Validation**: [`ConfigError`] for every rejected setting, raised before a
//!   config is swapped in, never during a calculation
//! - **Loading**: TOML files with `SENTIMENT__*` environment overrides
//!
//! ## Usage
//!
//! ```rust
//! use sentiment_config::{EngineConfig, FearGreedWeights};
//!
//! let mut config = EngineConfig::default();
//! assert!(config.validate().is_ok());
//!
//! config.fear_greed.weights = FearGreedWeights {
//!     sentiment: 0.5,
//!     volume: 0.25,
//!     volatility: 0.2,
//!     momentum: 0.15,
//! };
//! assert!(config.fear_greed.validate().is_err());
//! ```

pub mod components;
pub mod error;
pub mod loader;
pub mod sources;

pub use components::{
    AggregatorConfig, CorrelationConfig, DivergenceConfig, EngineConfig, FearGreedConfig,
    FearGreedWeights, SignalConfig, TimeframeConfig, MAX_WINDOW_HOURS,
};
pub use error::{ConfigError, Result};
pub use loader::{load_config_file, resolve_config_path};
pub use sources::{SourceBoosts, SourceWeights};
