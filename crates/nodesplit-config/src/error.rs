//! Configuration error types

use thiserror::Error;

/// Configuration-related errors
///
/// Every variant is raised before any segmentation work starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No splitting strategy is registered under this name
    #[error("Unknown splitting strategy: {name} (available: {available})")]
    UnknownStrategy { name: String, available: String },

    /// No token counter is registered for this model identifier
    #[error("Unknown tokenizer model: {model}")]
    UnknownTokenizerModel { model: String },

    /// Overlap must stay strictly below the chunk size
    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({size})")]
    InvalidOverlap { size: usize, overlap: usize },

    /// A field holds a value of the wrong type or sign
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// A key the splitter configuration does not understand
    #[error("Unknown configuration field: {field}")]
    UnknownField { field: String },

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Invalid range value
    #[error("Value {value} is out of range for {field} (expected {min}-{max})")]
    OutOfRange {
        field: String,
        value: u64,
        min: u64,
        max: u64,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    /// A configuration could not be expressed as TOML for layering
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error message
    #[error("Configuration error: {message}")]
    Generic { message: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
