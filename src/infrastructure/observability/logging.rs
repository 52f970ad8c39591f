use crate::config::ObservabilityEnvConfig;
use crate::infrastructure::observability::redaction::{RedactingMakeWriter, Redactor};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;

/// Installs the global subscriber: human-readable lines on stderr plus JSON
/// lines in a daily-rotated file. Both sinks go through the redactor.
///
/// Keep the returned guard alive until exit so buffered file output is flushed.
pub fn init_logging(config: &ObservabilityEnvConfig, redactor: Arc<Redactor>) -> Result<WorkerGuard> {
    let path = Path::new(&config.log_file);
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("bot.log");

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_name)
        .max_log_files(5)
        .build(directory)
        .with_context(|| format!("Failed to open log file {}", config.log_file))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(RedactingMakeWriter::new(std::io::stderr, Arc::clone(&redactor)));

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(RedactingMakeWriter::new(file_writer, redactor));

    let filter = tracing_subscriber::EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
