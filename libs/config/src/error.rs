//! Configuration validation errors

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("time window must be in (0, {max}] hours, got {hours}", max = crate::components::MAX_WINDOW_HOURS)]
    InvalidTimeWindow { hours: f64 },

    #[error("{component}: min_data_points must be positive")]
    InvalidMinDataPoints { component: &'static str },

    #[error("fear & greed weights must sum to 1.0, got {sum}")]
    WeightsDoNotSumToOne { sum: f64 },

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("source weight for '{source_id}' must be non-negative and finite, got {value}")]
    InvalidSourceWeight { source_id: String, value: f64 },

    #[error("invalid timeframe '{label}': {reason}")]
    InvalidTimeframe { label: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Check `value` lies in `[min, max]` and is not NaN
pub(crate) fn ensure_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_nan() || value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
