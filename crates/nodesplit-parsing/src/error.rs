//! Error types for the parsing crate
//!
//! Two kinds of failure exist: the caller supplied a bad configuration
//! (fix the parameters) or the tokenizer could not handle some text (check
//! the tokenizer). Both surface unchanged to the immediate caller.

use nodesplit_config::ConfigError;
use thiserror::Error;

/// Segmentation-specific error types
#[derive(Error, Debug)]
pub enum SegmentationError {
    /// Invalid strategy name, tokenizer model or splitter parameters
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The token counter failed on a given string
    #[error("Tokenization error ({model}): {message}")]
    Tokenization { model: String, message: String },
}

impl SegmentationError {
    /// Create a tokenization error for the named counter
    pub fn tokenization(model: &str, message: impl Into<String>) -> Self {
        Self::Tokenization {
            model: model.to_string(),
            message: message.into(),
        }
    }

    /// Create a configuration error with a free-form message
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(ConfigError::Generic {
            message: message.into(),
        })
    }

    /// Whether the caller should fix parameters
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Whether the tokenizer failed
    pub const fn is_tokenization(&self) -> bool {
        matches!(self, Self::Tokenization { .. })
    }
}

/// Result type alias for segmentation operations
pub type SegmentationResult<T> = Result<T, SegmentationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinguishable() {
        let config_err: SegmentationError = ConfigError::UnknownStrategy {
            name: "Nope".to_string(),
            available: "A, B".to_string(),
        }
        .into();
        assert!(config_err.is_configuration());
        assert!(!config_err.is_tokenization());
        assert!(config_err.to_string().contains("Nope"));

        let token_err = SegmentationError::tokenization("cl100k_base", "bad bytes");
        assert!(token_err.is_tokenization());
        assert!(!token_err.is_configuration());
        assert_eq!(
            token_err.to_string(),
            "Tokenization error (cl100k_base): bad bytes"
        );
    }
}
