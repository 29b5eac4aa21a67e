//! Strategy-specific size parameters
//!
//! A `SplitterConfig` is usually decoded from a small JSON object that a user
//! edited by hand, so decoding is strict: unknown keys, strings, fractions and
//! negative numbers are all rejected with a [`ConfigError`] instead of being
//! coerced.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON key for the maximum segment size
pub const CHUNK_SIZE_KEY: &str = "chunk_size";
/// JSON key for the overlap between consecutive segments
pub const CHUNK_OVERLAP_KEY: &str = "chunk_overlap";

/// Size and overlap parameters for the size-based splitting strategies
///
/// Both fields are optional: a missing value means "use the strategy
/// default" (see [`SplitterConfig::or_defaults`]). The structural strategy
/// ignores this configuration entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// Maximum tokens per segment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,

    /// Tokens shared between consecutive segments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_overlap: Option<usize>,
}

impl SplitterConfig {
    /// A configuration carrying no parameters
    pub const fn empty() -> Self {
        Self {
            chunk_size: None,
            chunk_overlap: None,
        }
    }

    /// A configuration with both parameters set
    pub const fn sized(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: Some(chunk_size),
            chunk_overlap: Some(chunk_overlap),
        }
    }

    /// Whether no parameter is set
    pub const fn is_empty(&self) -> bool {
        self.chunk_size.is_none() && self.chunk_overlap.is_none()
    }

    /// Fill unset parameters from `defaults`
    #[must_use]
    pub const fn or_defaults(self, defaults: &Self) -> Self {
        Self {
            chunk_size: match self.chunk_size {
                Some(size) => Some(size),
                None => defaults.chunk_size,
            },
            chunk_overlap: match self.chunk_overlap {
                Some(overlap) => Some(overlap),
                None => defaults.chunk_overlap,
            },
        }
    }

    /// Resolve the `(chunk_size, chunk_overlap)` window
    ///
    /// A missing overlap is treated as zero.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingField` if `chunk_size` is unset,
    /// `ConfigError::InvalidValue` if it is zero, and
    /// `ConfigError::InvalidOverlap` if `chunk_overlap >= chunk_size`.
    pub fn window(&self) -> ConfigResult<(usize, usize)> {
        let size = self.chunk_size.ok_or_else(|| ConfigError::MissingField {
            field: CHUNK_SIZE_KEY.to_string(),
        })?;
        if size == 0 {
            return Err(ConfigError::InvalidValue {
                field: CHUNK_SIZE_KEY.to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }

        let overlap = self.chunk_overlap.unwrap_or(0);
        if overlap >= size {
            return Err(ConfigError::InvalidOverlap { size, overlap });
        }

        Ok((size, overlap))
    }

    /// Decode a configuration from JSON text
    ///
    /// An empty or whitespace-only string decodes to [`SplitterConfig::empty`].
    ///
    /// # Errors
    /// Returns `ConfigError::Serialization` for malformed JSON and the errors
    /// of [`SplitterConfig::from_json_value`] for well-formed but invalid input.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        if json.trim().is_empty() {
            return Ok(Self::empty());
        }
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    /// Decode a configuration from a JSON value
    ///
    /// `null` decodes to an empty configuration. A `null` field is treated as
    /// unset.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` when the value is not an object or a
    /// field is not a non-negative integer, and `ConfigError::UnknownField`
    /// for keys other than `chunk_size` and `chunk_overlap`.
    pub fn from_json_value(value: &Value) -> ConfigResult<Self> {
        let map = match value {
            Value::Null => return Ok(Self::empty()),
            Value::Object(map) => map,
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "splitter_config".to_string(),
                    reason: format!("expected a JSON object, got {other}"),
                });
            }
        };

        let mut config = Self::empty();
        for (key, field_value) in map {
            match key.as_str() {
                CHUNK_SIZE_KEY => config.chunk_size = parse_count(key, field_value)?,
                CHUNK_OVERLAP_KEY => config.chunk_overlap = parse_count(key, field_value)?,
                _ => {
                    return Err(ConfigError::UnknownField {
                        field: key.clone(),
                    });
                }
            }
        }

        Ok(config)
    }

    /// Encode as a pretty-printed JSON object
    ///
    /// # Errors
    /// Returns `ConfigError::Serialization` if encoding fails
    pub fn to_json_pretty(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse one size field, rejecting anything but a non-negative integer
fn parse_count(field: &str, value: &Value) -> ConfigResult<Option<usize>> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        field: field.to_string(),
        reason,
    };

    match value {
        Value::Null => Ok(None),
        Value::Number(number) => {
            if let Some(count) = number.as_u64() {
                usize::try_from(count)
                    .map(Some)
                    .map_err(|_| invalid(format!("{count} does not fit in memory")))
            } else if number.as_i64().is_some() {
                Err(invalid(format!("must not be negative, got {number}")))
            } else {
                Err(invalid(format!("must be an integer, got {number}")))
            }
        }
        other => Err(invalid(format!("must be a number, got {other}"))),
    }
}
