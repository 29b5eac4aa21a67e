//! Configuration validation framework

use crate::{ConfigError, ConfigResult};

/// Log levels accepted by `telemetry.log_level`
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Trait for validating configuration values
pub trait Validate {
    /// Validate this configuration object
    ///
    /// # Errors
    /// Returns validation errors if the configuration is invalid
    fn validate(&self) -> ConfigResult<()>;
}

/// Validate a value is within a range
///
/// # Errors
/// Returns `ConfigError::OutOfRange` if value is outside the specified range
pub fn validate_range(value: u64, min: u64, max: u64, field_name: &str) -> ConfigResult<()> {
    if value < min || value > max {
        Err(ConfigError::OutOfRange {
            field: field_name.to_string(),
            value,
            min,
            max,
        })
    } else {
        Ok(())
    }
}

/// Validate a string is not empty
///
/// # Errors
/// Returns `ConfigError::MissingField` if the string is empty or whitespace-only
pub fn validate_non_empty(value: &str, field_name: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingField {
            field: field_name.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Validate a float is finite and not negative (prices, exchange rates)
///
/// # Errors
/// Returns `ConfigError::InvalidValue` for NaN, infinities and negative values
pub fn validate_non_negative_f64(value: f64, field_name: &str) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: field_name.to_string(),
            reason: format!("expected a finite, non-negative number, got {value}"),
        })
    }
}

/// Validate a log level name
///
/// # Errors
/// Returns `ConfigError::InvalidValue` if the level is not a known tracing level
pub fn validate_log_level(level: &str, field_name: &str) -> ConfigResult<()> {
    if LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: field_name.to_string(),
            reason: format!("expected one of {}, got '{level}'", LOG_LEVELS.join(", ")),
        })
    }
}
