//! Centralized configuration management for nodesplit
//!
//! Provides type-safe, validated configuration with support for multiple
//! sources (defaults, TOML files, environment).
//!
//! Configuration follows a simple hierarchy:
//! 1. Safe defaults (defined as constants)
//! 2. TOML file values
//! 3. Environment variable overrides
//! 4. Runtime validation

pub mod error;
pub mod source;
pub mod splitter;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use splitter::SplitterConfig;

use std::str::FromStr;

// =============================================================================
// SAFE DEFAULTS
// =============================================================================

// Tokenizer Configuration
/// Tokenizer model used when none is configured (cl100k_base)
pub const DEFAULT_TOKENIZER_MODEL: &str = "gpt-35-turbo";

// Splitter Configuration
/// Strategy used when none is configured
pub const DEFAULT_STRATEGY: &str = "MarkdownNodeParser";
const DEFAULT_INCLUDE_HEADER_PATH: bool = true;
/// Separator placed between ancestor headers in rendered segments
pub const DEFAULT_HEADER_SEPARATOR: &str = " > ";
const MAX_CHUNK_SIZE: u64 = 1_000_000;

// Pricing Configuration
/// Azure OpenAI ada embeddings: $0.0001 per 1000 tokens
pub const DEFAULT_COST_PER_TOKEN: f64 = 0.0001 / 1000.0;
/// USD to NOK
pub const DEFAULT_CURRENCY_RATE: f64 = 10.5;
const DEFAULT_CURRENCY: &str = "NOK";

// Display Configuration
const DEFAULT_BAR_ICON: &str = "🟦";
const DEFAULT_TOKENS_PER_ICON: usize = 100;

// Telemetry Configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_JSON_LOGS: bool = false;

/// Core configuration for the nodesplit application
///
/// Every section has safe defaults, so a partial TOML file only needs the
/// keys it wants to change.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ApplicationConfig {
    /// Token counting configuration
    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    /// Strategy selection and strategy parameters
    #[serde(default)]
    pub splitter: SplitterSettings,

    /// Pricing used for cost estimates
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Report rendering settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Tokenizer configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Model identifier resolved through the token counter registry
    /// (e.g. "gpt-35-turbo", "gpt-4o", "cl100k_base", "whitespace")
    pub model: String,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_TOKENIZER_MODEL.to_string(),
        }
    }
}

/// Strategy selection and parameters
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SplitterSettings {
    /// Registered strategy name
    pub strategy: String,

    /// Optional chunk size override; strategy default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,

    /// Optional chunk overlap override; strategy default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_overlap: Option<usize>,

    /// Prefix rendered segments with their ancestor header chain
    pub include_header_path: bool,

    /// Separator between headers in the rendered chain
    pub header_separator: String,
}

impl Default for SplitterSettings {
    fn default() -> Self {
        Self {
            strategy: DEFAULT_STRATEGY.to_string(),
            chunk_size: None,
            chunk_overlap: None,
            include_header_path: DEFAULT_INCLUDE_HEADER_PATH,
            header_separator: DEFAULT_HEADER_SEPARATOR.to_string(),
        }
    }
}

impl SplitterSettings {
    /// The size parameters as a `SplitterConfig`
    pub const fn splitter_config(&self) -> SplitterConfig {
        SplitterConfig {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
        }
    }
}

/// Pricing for cost estimates
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Price of one embedded token in USD
    pub cost_per_token: f64,

    /// Exchange rate from USD to `currency`
    pub currency_rate: f64,

    /// Currency label printed next to estimates
    pub currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            cost_per_token: DEFAULT_COST_PER_TOKEN,
            currency_rate: DEFAULT_CURRENCY_RATE,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Report rendering settings
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Icon repeated once per `tokens_per_icon` tokens
    pub bar_icon: String,

    /// Tokens represented by one icon
    pub tokens_per_icon: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            bar_icon: DEFAULT_BAR_ICON.to_string(),
            tokens_per_icon: DEFAULT_TOKENS_PER_ICON,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Fallback tracing level when `RUST_LOG` is unset
    pub log_level: String,

    /// Emit JSON log lines
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_logs: DEFAULT_JSON_LOGS,
        }
    }
}

/// Parse an environment value; a set but unparsable value is an error
fn parse_var<T, F>(lookup: &F, key: &str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue {
            field: key.to_string(),
            reason: format!("cannot parse '{raw}'"),
        })
}

impl ApplicationConfig {
    /// Apply `NODESPLIT_*` environment variables on top of this configuration
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for unparsable numeric or boolean values
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Keys use the `NODESPLIT_<SECTION>_<FIELD>` naming of the environment
    /// source; unset keys leave the current value untouched.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` naming the first key whose value
    /// does not parse
    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("NODESPLIT_TOKENIZER_MODEL") {
            self.tokenizer.model = model;
        }

        if let Some(strategy) = lookup("NODESPLIT_SPLITTER_STRATEGY") {
            self.splitter.strategy = strategy;
        }
        if let Some(size) = parse_var(&lookup, "NODESPLIT_SPLITTER_CHUNK_SIZE")? {
            self.splitter.chunk_size = Some(size);
        }
        if let Some(overlap) = parse_var(&lookup, "NODESPLIT_SPLITTER_CHUNK_OVERLAP")? {
            self.splitter.chunk_overlap = Some(overlap);
        }
        if let Some(include) = parse_var(&lookup, "NODESPLIT_SPLITTER_INCLUDE_HEADER_PATH")? {
            self.splitter.include_header_path = include;
        }
        if let Some(separator) = lookup("NODESPLIT_SPLITTER_HEADER_SEPARATOR") {
            self.splitter.header_separator = separator;
        }

        if let Some(cost) = parse_var(&lookup, "NODESPLIT_PRICING_COST_PER_TOKEN")? {
            self.pricing.cost_per_token = cost;
        }
        if let Some(rate) = parse_var(&lookup, "NODESPLIT_PRICING_CURRENCY_RATE")? {
            self.pricing.currency_rate = rate;
        }
        if let Some(currency) = lookup("NODESPLIT_PRICING_CURRENCY") {
            self.pricing.currency = currency;
        }

        if let Some(icon) = lookup("NODESPLIT_DISPLAY_BAR_ICON") {
            self.display.bar_icon = icon;
        }
        if let Some(per_icon) = parse_var(&lookup, "NODESPLIT_DISPLAY_TOKENS_PER_ICON")? {
            self.display.tokens_per_icon = per_icon;
        }

        if let Some(level) = lookup("NODESPLIT_LOG_LEVEL") {
            self.telemetry.log_level = level;
        }
        if let Some(json) = parse_var(&lookup, "NODESPLIT_LOG_JSON")? {
            self.telemetry.json_logs = json;
        }

        Ok(self)
    }
}

impl validation::Validate for TokenizerConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_non_empty(&self.model, "tokenizer.model")
    }
}

impl validation::Validate for SplitterSettings {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_non_empty(&self.strategy, "splitter.strategy")?;
        if let Some(size) = self.chunk_size {
            validation::validate_range(size as u64, 1, MAX_CHUNK_SIZE, "splitter.chunk_size")?;
        }
        if let (Some(size), Some(overlap)) = (self.chunk_size, self.chunk_overlap)
            && overlap >= size
        {
            return Err(ConfigError::InvalidOverlap { size, overlap });
        }
        Ok(())
    }
}

impl validation::Validate for PricingConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_non_negative_f64(self.cost_per_token, "pricing.cost_per_token")?;
        validation::validate_non_negative_f64(self.currency_rate, "pricing.currency_rate")?;
        validation::validate_non_empty(&self.currency, "pricing.currency")
    }
}

impl validation::Validate for DisplayConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_non_empty(&self.bar_icon, "display.bar_icon")?;
        validation::validate_range(
            self.tokens_per_icon as u64,
            1,
            MAX_CHUNK_SIZE,
            "display.tokens_per_icon",
        )
    }
}

impl validation::Validate for TelemetryConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_log_level(&self.log_level, "telemetry.log_level")
    }
}

impl validation::Validate for ApplicationConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.tokenizer.validate()?;
        self.splitter.validate()?;
        self.pricing.validate()?;
        self.display.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validate;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_uses_safe_defaults() {
        let config = ApplicationConfig::default();

        assert_eq!(config.tokenizer.model, DEFAULT_TOKENIZER_MODEL);
        assert_eq!(config.splitter.strategy, DEFAULT_STRATEGY);
        assert!(config.splitter.splitter_config().is_empty());
        assert!(config.splitter.include_header_path);
        assert!((config.pricing.cost_per_token - 1e-7).abs() < f64::EPSILON);
        assert!((config.pricing.currency_rate - 10.5).abs() < f64::EPSILON);
        assert_eq!(config.pricing.currency, "NOK");
        assert_eq!(config.display.tokens_per_icon, 100);
    }

    #[test]
    fn test_defaults_are_valid() {
        let validation_result = ApplicationConfig::default().validate();
        assert!(
            validation_result.is_ok(),
            "defaults should be valid: {validation_result:?}"
        );
    }

    #[test]
    fn test_overrides_apply_on_top_of_defaults() {
        let config = ApplicationConfig::default()
            .with_overrides(lookup_from(&[
                ("NODESPLIT_TOKENIZER_MODEL", "gpt-4o"),
                ("NODESPLIT_SPLITTER_STRATEGY", "TokenTextSplitter"),
                ("NODESPLIT_SPLITTER_CHUNK_SIZE", "256"),
                ("NODESPLIT_SPLITTER_CHUNK_OVERLAP", "16"),
                ("NODESPLIT_PRICING_CURRENCY", "USD"),
                ("NODESPLIT_PRICING_CURRENCY_RATE", "1.0"),
                ("NODESPLIT_LOG_JSON", "true"),
            ]))
            .expect("overrides parse");

        assert_eq!(config.tokenizer.model, "gpt-4o");
        assert_eq!(config.splitter.strategy, "TokenTextSplitter");
        assert_eq!(
            config.splitter.splitter_config(),
            SplitterConfig::sized(256, 16)
        );
        assert_eq!(config.pricing.currency, "USD");
        assert!((config.pricing.currency_rate - 1.0).abs() < f64::EPSILON);
        assert!(config.telemetry.json_logs);
        // untouched sections keep defaults
        assert_eq!(config.display, DisplayConfig::default());
    }

    #[test]
    fn test_unparsable_overrides_are_rejected() {
        let err = ApplicationConfig::default()
            .with_overrides(lookup_from(&[("NODESPLIT_SPLITTER_CHUNK_SIZE", "lots")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "NODESPLIT_SPLITTER_CHUNK_SIZE"
        ));
        assert!(err.to_string().contains("lots"));

        let err = ApplicationConfig::default()
            .with_overrides(lookup_from(&[("NODESPLIT_PRICING_CURRENCY_RATE", "ten")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validation_rejects_overlap_not_below_size() {
        let mut config = ApplicationConfig::default();
        config.splitter.chunk_size = Some(64);
        config.splitter.chunk_overlap = Some(64);

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverlap { .. }));
    }

    #[test]
    fn test_validation_rejects_bad_pricing_and_logging() {
        let mut config = ApplicationConfig::default();
        config.pricing.currency_rate = -1.0;
        assert!(config.validate().is_err());

        let mut config = ApplicationConfig::default();
        config.telemetry.log_level = "invalid-level".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("telemetry.log_level"));

        let mut config = ApplicationConfig::default();
        config.display.tokens_per_icon = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ApplicationConfig = toml::from_str(
            r#"
            [splitter]
            strategy = "SentenceSplitter"
            chunk_size = 512

            [pricing]
            currency = "EUR"
            "#,
        )
        .expect("partial config parses");

        assert_eq!(config.splitter.strategy, "SentenceSplitter");
        assert_eq!(config.splitter.chunk_size, Some(512));
        assert_eq!(config.splitter.chunk_overlap, None);
        assert_eq!(config.splitter.header_separator, DEFAULT_HEADER_SEPARATOR);
        assert_eq!(config.pricing.currency, "EUR");
        assert!((config.pricing.currency_rate - DEFAULT_CURRENCY_RATE).abs() < f64::EPSILON);
        assert_eq!(config.tokenizer.model, DEFAULT_TOKENIZER_MODEL);
    }

    #[test]
    fn test_configuration_serialization_roundtrip() {
        let mut original = ApplicationConfig::default();
        original.splitter.chunk_size = Some(128);

        let toml_string = toml::to_string(&original).expect("serializes to TOML");
        assert!(toml_string.contains("[splitter]"));

        let parsed: ApplicationConfig = toml::from_str(&toml_string).expect("parses back");
        assert_eq!(parsed, original);
    }
}
