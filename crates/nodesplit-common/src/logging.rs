//! Tracing subscriber setup for the nodesplit binary

use anyhow::Context;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// File name prefix for rotated log files
const LOG_FILE_PREFIX: &str = "nodesplit.log";

/// Options controlling where and how log events are written
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Fallback filter directive when `RUST_LOG` is not set (e.g. "info")
    pub level: String,
    /// Emit JSON lines on stderr instead of human-readable text
    pub json: bool,
    /// Optional directory for daily-rotated JSON log files
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}

/// Keeps the non-blocking writers alive; drop it only at process exit
#[must_use = "dropping the guard stops log delivery"]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

/// Install the global tracing subscriber
///
/// Events always go to stderr so stdout stays clean for report output.
/// `RUST_LOG` takes precedence over `options.level`.
///
/// # Errors
/// Returns an error if the filter directive is invalid, the log directory
/// cannot be created, or a global subscriber is already installed.
pub fn init_logging(options: &LoggingOptions) -> anyhow::Result<LoggingGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&options.level))
        .with_context(|| format!("Invalid log level '{}'", options.level))?;

    let mut guards = Vec::new();

    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());
    guards.push(stderr_guard);

    let stderr_json = options
        .json
        .then(|| fmt::layer().json().with_writer(stderr_writer.clone()));
    let stderr_plain = (!options.json).then(|| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(stderr_writer)
    });

    let file_layer = match &options.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
            let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
            guards.push(file_guard);
            Some(fmt::layer().json().with_writer(file_writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_json)
        .with(stderr_plain)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LoggingGuard { _guards: guards })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = LoggingOptions::default();
        assert_eq!(options.level, "info");
        assert!(!options.json);
        assert!(options.log_dir.is_none());
    }
}
