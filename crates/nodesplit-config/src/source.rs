//! Configuration source loading and composition

use crate::validation::Validate;
use crate::{ApplicationConfig, ConfigResult};
use std::path::{Path, PathBuf};

/// Trait for loading configuration from different sources
pub trait ConfigurationSource {
    /// Layer this source on top of `base`
    ///
    /// # Errors
    /// Returns configuration loading errors
    fn load(&self, base: ApplicationConfig) -> ConfigResult<ApplicationConfig>;

    /// Get the name of this configuration source
    fn name(&self) -> &str;

    /// Get the priority of this source (higher number = higher priority)
    fn priority(&self) -> u8;

    /// Whether a failure to load this source aborts loading
    fn is_required(&self) -> bool {
        false
    }
}

/// Load configuration from environment variables
pub struct EnvironmentSource;

impl ConfigurationSource for EnvironmentSource {
    fn load(&self, base: ApplicationConfig) -> ConfigResult<ApplicationConfig> {
        base.with_env_overrides()
    }

    fn name(&self) -> &'static str {
        "environment"
    }

    fn priority(&self) -> u8 {
        100 // Highest priority - environment variables override everything
    }

    /// A variable that is set but unparsable must not be skipped silently
    fn is_required(&self) -> bool {
        true
    }
}

/// Load configuration from TOML file
pub struct TomlFileSource {
    path: PathBuf,
    required: bool,
}

impl TomlFileSource {
    /// An optional file; a missing or broken file is logged and skipped
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: false,
        }
    }

    /// A file the user asked for explicitly; failures abort loading
    pub fn required<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: true,
        }
    }

    /// The per-user config file (`<config dir>/nodesplit/config.toml`), if the
    /// platform has a config directory
    pub fn user_default() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join("nodesplit").join("config.toml")))
    }

    /// Path this source reads from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Overlay `layer` onto `base`, recursing into tables present in both
fn merge_toml(base: &mut toml::Value, layer: toml::Value) {
    match (base, layer) {
        (toml::Value::Table(existing), toml::Value::Table(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => merge_toml(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

impl ConfigurationSource for TomlFileSource {
    fn load(&self, base: ApplicationConfig) -> ConfigResult<ApplicationConfig> {
        let content = std::fs::read_to_string(&self.path)?;
        let layer: toml::Value = toml::from_str(&content)?;

        // Keys missing from the file keep the value of the layers below
        let mut merged = toml::Value::try_from(&base)?;
        merge_toml(&mut merged, layer);
        let config: ApplicationConfig = merged.try_into()?;
        Ok(config)
    }

    fn name(&self) -> &'static str {
        "toml_file"
    }

    fn priority(&self) -> u8 {
        50 // Medium priority - below env vars, above defaults
    }

    fn is_required(&self) -> bool {
        self.required
    }
}

/// Type alias for configuration sources
type ConfigSources = Vec<Box<dyn ConfigurationSource>>;

/// Configuration loader that combines multiple sources
pub struct ConfigurationLoader {
    sources: ConfigSources,
}

impl ConfigurationLoader {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    #[must_use]
    pub fn add_source(mut self, source: Box<dyn ConfigurationSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Load configuration from all sources with priority ordering
    ///
    /// Starts from defaults and layers sources from lowest to highest
    /// priority. Optional sources that fail are skipped with a warning.
    ///
    /// # Errors
    /// Returns the error of a failing required source, or validation errors
    /// for the merged configuration
    pub fn load(&self) -> ConfigResult<ApplicationConfig> {
        let mut config = ApplicationConfig::default();

        let mut sorted_sources = self.sources.iter().collect::<Vec<_>>();
        sorted_sources.sort_by_key(|source| source.priority());

        for source in sorted_sources {
            match source.load(config.clone()) {
                Ok(layered) => {
                    tracing::debug!("Loaded configuration from source: {}", source.name());
                    config = layered;
                }
                Err(e) if source.is_required() => return Err(e),
                Err(e) => {
                    tracing::warn!("Failed to load from source {}: {}", source.name(), e);
                }
            }
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigurationLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use std::io::Write;

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn test_loader_without_sources_yields_defaults() {
        let config = ConfigurationLoader::new().load().expect("defaults load");
        assert_eq!(config, ApplicationConfig::default());
    }

    #[test]
    fn test_toml_source_is_applied() {
        let file = write_toml(
            r#"
            [tokenizer]
            model = "cl100k_base"

            [splitter]
            strategy = "TokenTextSplitter"
            chunk_size = 100
            chunk_overlap = 20
            "#,
        );

        let config = ConfigurationLoader::new()
            .add_source(Box::new(TomlFileSource::required(file.path())))
            .load()
            .expect("config loads");

        assert_eq!(config.tokenizer.model, "cl100k_base");
        assert_eq!(config.splitter.strategy, "TokenTextSplitter");
        assert_eq!(config.splitter.chunk_size, Some(100));
    }

    #[test]
    fn test_later_file_keeps_keys_it_does_not_set() {
        let user_file = write_toml(
            r#"
            [tokenizer]
            model = "cl100k_base"

            [splitter]
            strategy = "SentenceSplitter"
            chunk_size = 400

            [pricing]
            currency = "EUR"
            "#,
        );
        let explicit_file = write_toml(
            r#"
            [splitter]
            chunk_overlap = 40
            "#,
        );

        let config = ConfigurationLoader::new()
            .add_source(Box::new(TomlFileSource::new(user_file.path())))
            .add_source(Box::new(TomlFileSource::required(explicit_file.path())))
            .load()
            .expect("config loads");

        assert_eq!(config.tokenizer.model, "cl100k_base");
        assert_eq!(config.splitter.strategy, "SentenceSplitter");
        assert_eq!(config.splitter.chunk_size, Some(400));
        assert_eq!(config.splitter.chunk_overlap, Some(40));
        assert_eq!(config.pricing.currency, "EUR");
    }

    #[test]
    fn test_file_values_override_lower_layers() {
        let mut base = ApplicationConfig::default();
        base.splitter.chunk_size = Some(100);
        base.display.bar_icon = "#".to_string();

        let file = write_toml(
            r#"
            [splitter]
            chunk_size = 50
            "#,
        );
        let config = TomlFileSource::required(file.path())
            .load(base)
            .expect("file layers");

        assert_eq!(config.splitter.chunk_size, Some(50));
        assert_eq!(config.display.bar_icon, "#");
    }

    #[test]
    fn test_missing_optional_file_is_skipped() {
        let config = ConfigurationLoader::new()
            .add_source(Box::new(TomlFileSource::new("/definitely/not/here.toml")))
            .load()
            .expect("optional source failure is tolerated");
        assert_eq!(config, ApplicationConfig::default());
    }

    #[test]
    fn test_missing_required_file_fails() {
        let err = ConfigurationLoader::new()
            .add_source(Box::new(TomlFileSource::required("/definitely/not/here.toml")))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let file = write_toml(
            r#"
            [splitter]
            chunk_size = 10
            chunk_overlap = 10
            "#,
        );

        let err = ConfigurationLoader::new()
            .add_source(Box::new(TomlFileSource::required(file.path())))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverlap { .. }));
    }

    #[test]
    fn test_broken_toml_reports_parse_error() {
        let file = write_toml("[splitter\nchunk_size = ");
        let err = ConfigurationLoader::new()
            .add_source(Box::new(TomlFileSource::required(file.path())))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::TomlParsing(_)));
    }
}
