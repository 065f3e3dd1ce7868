//! Log setup: one file per day under the log directory, plus the console
//! when running in the foreground.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Appender writing `<dir>/<YYYY-MM-DD>.log`, switching files at midnight UTC.
pub fn daily_appender(dir: &Path) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_suffix("log")
        .build(dir)
        .with_context(|| format!("Failed to open log directory {}", dir.display()))
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the configured level.
pub fn init(config: &LoggingConfig, foreground: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("Invalid log level {:?}", config.level))?;

    let file_layer = fmt::layer()
        .with_writer(daily_appender(&config.dir)?)
        .with_ansi(false);
    let console_layer = foreground.then(|| fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(())
}
