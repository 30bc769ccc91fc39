//! File logging. The console owns the terminal, so nothing is written to
//! stdout or stderr; events go to `{log_dir}/brutus.log`.

use crate::args::LogLevel;
use crate::config::Config;
use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILE_NAME: &str = "brutus.log";

/// Filter precedence: `--log-level`, then RUST_LOG, then the config file.
pub fn build_filter(level: Option<LogLevel>, config: &Config) -> EnvFilter {
    if let Some(level) = level {
        return EnvFilter::new(level.to_string());
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn init(level: Option<LogLevel>, config: &Config) -> Result<WorkerGuard> {
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(build_filter(level, config))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("failed to install the log subscriber")?;

    tracing::debug!(log_dir = %log_dir.display(), "logging initialised");
    Ok(guard)
}
