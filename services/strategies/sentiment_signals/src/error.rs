//! Error types for the sentiment signals engine

use sentiment_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Too few aligned points to report a correlation
    #[error("Insufficient data: {required} aligned points required, {actual} available")]
    InsufficientData { required: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
