use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{PipelineError, Result};

/// Build the filter from `RUST_LOG`, falling back to the configured level
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Daily-rolling appender in `config.dir`, creating the directory first
fn file_appender(config: &LoggingConfig) -> Result<Option<RollingFileAppender>> {
    let Some(dir) = &config.dir else {
        return Ok(None);
    };
    fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_name)
        .build(dir)
        .map_err(|e| PipelineError::Logging(format!("{}: {e}", dir.display())))?;
    Ok(Some(appender))
}

/// Initializes console logging and, when a log directory is configured,
/// a daily-rolling JSON file.
///
/// Fails before installing any subscriber when the log directory cannot be
/// used. The returned guard flushes the file writer on drop, so keep it
/// alive for the whole run.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match file_appender(config)? {
        Some(appender) => {
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(non_blocking_writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(guard)
}
