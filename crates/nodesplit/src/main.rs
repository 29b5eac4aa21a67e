//! Main entry point for the nodesplit command-line tool

// Internal modules
mod output;

// Internal imports (std, crate)
use crate::output::{JsonReport, render_text};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use nodesplit_common::{LoggingOptions, init_logging, initialize_environment};
use nodesplit_config::source::{ConfigurationLoader, EnvironmentSource, TomlFileSource};
use nodesplit_config::validation::Validate;
use nodesplit_config::{ApplicationConfig, SplitterConfig};
use nodesplit_parsing::{
    Document, RenderOptions, SegmentationEngine, StrategyRegistry, TokenCounterRegistry,
};
use nodesplit_stats::StatisticsReporter;

/// nodesplit - split markdown documents into nodes and estimate embedding cost
///
/// Reads a document from a file or stdin, splits it with the chosen strategy
/// and prints every node with its token counts, followed by totals and the
/// estimated cost of embedding it.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Document to split ("-" or omitted reads stdin)
    input: Option<PathBuf>,

    /// Splitting strategy (see --list-strategies)
    #[arg(short, long)]
    strategy: Option<String>,

    /// Tokenizer model (see --list-models)
    #[arg(short, long)]
    model: Option<String>,

    /// Strategy parameters as JSON, e.g. '{"chunk_size": 512, "chunk_overlap": 64}'
    #[arg(long)]
    splitter_config: Option<String>,

    /// Configuration file path (TOML format)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Document metadata as key=value, repeatable
    #[arg(long = "metadata", value_parser = parse_key_value)]
    metadata: Vec<(String, String)>,

    /// Do not prefix rendered nodes with their header chain
    #[arg(long)]
    no_header_path: bool,

    /// Print segments and statistics as JSON
    #[arg(long)]
    json: bool,

    /// List registered strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// List supported tokenizer models and exit
    #[arg(long)]
    list_models: bool,

    /// Print the default parameters of a strategy as JSON and exit
    #[arg(long, value_name = "STRATEGY")]
    show_defaults: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Also write JSON logs to daily-rotated files in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.trim().is_empty() {
        return Err(format!("empty metadata key in '{raw}'"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

fn main() -> anyhow::Result<()> {
    initialize_environment();
    let args = Args::parse();

    let config = load_config(&args)?;

    let _logging_guard = init_logging(&LoggingOptions {
        level: config.telemetry.log_level.clone(),
        json: config.telemetry.json_logs,
        log_dir: args.log_dir.clone(),
    })?;
    tracing::debug!(?config, "Configuration loaded");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.list_strategies {
        for name in StrategyRegistry::new().list_available_strategies() {
            writeln!(out, "{name}")?;
        }
        return Ok(());
    }

    let counters = TokenCounterRegistry::new();
    if args.list_models {
        for model in counters.list_models() {
            writeln!(out, "{model}")?;
        }
        return Ok(());
    }

    let counter = counters
        .for_model(&config.tokenizer.model)
        .context("Failed to load tokenizer")?;
    let engine = SegmentationEngine::new(Arc::clone(&counter), RenderOptions::from(&config.splitter));

    if let Some(name) = &args.show_defaults {
        let defaults = engine.default_config_for(name)?;
        writeln!(out, "{}", defaults.to_json_pretty()?)?;
        return Ok(());
    }

    let text = read_input(args.input.as_ref())?;
    let document = args
        .metadata
        .iter()
        .fold(Document::new(text), |document, (key, value)| {
            document.with_metadata(key, value)
        });

    let splitter_config = splitter_config(&config, args.splitter_config.as_deref())?;
    let strategy = engine
        .strategy(&config.splitter.strategy)
        .context("Failed to select splitting strategy")?;
    let effective = splitter_config.or_defaults(&strategy.default_config());

    let segments = SegmentationEngine::run(&document, strategy.as_ref(), &splitter_config)
        .context("Failed to split document")?;
    let report = StatisticsReporter::new(counter)
        .summarize(&segments)
        .context("Failed to count tokens")?;

    if args.json {
        let json = JsonReport::new(
            strategy.name(),
            &config.tokenizer.model,
            effective,
            &segments,
            &report,
            &config.pricing,
        )
        .to_json()?;
        writeln!(out, "{json}")?;
    } else {
        let text = render_text(&segments, &report, &config.display, &config.pricing)?;
        write!(out, "{text}")?;
    }

    out.flush()?;
    Ok(())
}

/// Defaults, then the user config file, then `--config`, then environment,
/// then command-line flags
fn load_config(args: &Args) -> anyhow::Result<ApplicationConfig> {
    let mut loader = ConfigurationLoader::new();
    if let Some(user_file) = TomlFileSource::user_default() {
        loader = loader.add_source(Box::new(user_file));
    }
    if let Some(path) = &args.config {
        loader = loader.add_source(Box::new(TomlFileSource::required(path)));
    }
    loader = loader.add_source(Box::new(EnvironmentSource));

    let mut config = loader.load().context("Failed to load configuration")?;

    if let Some(strategy) = &args.strategy {
        config.splitter.strategy.clone_from(strategy);
    }
    if let Some(model) = &args.model {
        config.tokenizer.model.clone_from(model);
    }
    if let Some(level) = &args.log_level {
        config.telemetry.log_level.clone_from(level);
    }
    if args.no_header_path {
        config.splitter.include_header_path = false;
    }

    config.validate().context("Invalid command-line options")?;
    Ok(config)
}

/// Size parameters from the configuration, overridden field by field by the
/// `--splitter-config` JSON
fn splitter_config(
    config: &ApplicationConfig,
    json: Option<&str>,
) -> anyhow::Result<SplitterConfig> {
    let configured = config.splitter.splitter_config();
    let Some(json) = json else {
        return Ok(configured);
    };

    let overrides = SplitterConfig::from_json_str(json).context("Invalid --splitter-config")?;
    Ok(overrides.or_defaults(&configured))
}

fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            if text.is_empty() {
                tracing::warn!("No input on stdin");
            }
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("source=README.md").expect("valid"),
            ("source".to_string(), "README.md".to_string())
        );
        assert_eq!(
            parse_key_value("note=a=b").expect("valid"),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=value").is_err());
    }

    #[test]
    fn test_splitter_config_json_overrides_settings() {
        let mut config = ApplicationConfig::default();
        config.splitter.chunk_size = Some(512);
        config.splitter.chunk_overlap = Some(64);

        let merged = splitter_config(&config, Some(r#"{"chunk_overlap": 10}"#)).expect("valid");
        assert_eq!(merged, SplitterConfig::sized(512, 10));

        let untouched = splitter_config(&config, None).expect("valid");
        assert_eq!(untouched, SplitterConfig::sized(512, 64));

        assert!(splitter_config(&config, Some(r#"{"chunk_size": "big"}"#)).is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "nodesplit",
            "doc.md",
            "--strategy",
            "TokenTextSplitter",
            "--splitter-config",
            r#"{"chunk_size": 100}"#,
            "--metadata",
            "source=doc.md",
            "--json",
        ])
        .expect("parses");

        assert_eq!(args.input, Some(PathBuf::from("doc.md")));
        assert_eq!(args.strategy.as_deref(), Some("TokenTextSplitter"));
        assert_eq!(args.metadata, vec![("source".to_string(), "doc.md".to_string())]);
        assert!(args.json);
        assert!(!args.list_strategies);
    }

    #[test]
    fn test_clap_definition_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
