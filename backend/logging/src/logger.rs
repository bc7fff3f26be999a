//! Structured Logger
//!
//! Wraps `tracing` with a console layer and a daily-rolling JSON file layer,
//! with environment-based level control (`RUST_LOG` wins over the config).

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "lenstext.log";

/// Where console log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleOutput {
    /// Human-readable lines on stderr; stdout stays free for recognized text.
    Stderr,
    /// Newline-delimited JSON on stderr.
    Json,
    /// No console output (the terminal UI owns the screen).
    Off,
}

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub level: String,
    pub dir: Option<PathBuf>,
    pub console: ConsoleOutput,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            console: ConsoleOutput::Stderr,
        }
    }
}

/// Initialize the global logger.
///
/// The returned guard flushes the file writer on drop and must be held for the
/// life of the process. Calling this twice keeps the first subscriber.
pub fn init_logger(settings: &LogSettings) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let (file_layer, guard) = match &settings.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = match settings.console {
        ConsoleOutput::Stderr => Some(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .boxed(),
        ),
        ConsoleOutput::Json => Some(fmt::layer().json().with_writer(std::io::stderr).boxed()),
        ConsoleOutput::Off => None,
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("logs");
        let settings = LogSettings {
            level: "debug".into(),
            dir: Some(log_dir.clone()),
            console: ConsoleOutput::Off,
        };
        let guard = init_logger(&settings).unwrap();
        assert!(guard.is_some());
        assert!(log_dir.is_dir());
    }
}
