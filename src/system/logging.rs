//! Logging system initialization
//!
//! Builds the global logging pipeline from [`LoggingConfig`], installs it as
//! the global default dispatcher and registers the resulting
//! [`LogContext`](crate::control::LogContext) so levels and configuration
//! can be changed afterwards.

use std::path::Path;

use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::LoggingConfig;
use crate::control::{
    Appender, Configuration, LogContext, LogFormat, RollPeriod, descriptor, init_log_context,
};
use crate::errors::{LogUtilError, Result};

/// Keeps the non-blocking writer alive; pending records are flushed when
/// it is dropped.
#[must_use = "dropping the guard stops the background log writer"]
pub struct LoggingGuard {
    _worker: Option<WorkerGuard>,
}

/// Initialize logging system based on configuration
///
/// **Note**: This should be called only once during application startup.
/// A second call fails with `AlreadyInitialized`.
///
/// # Returns
/// * `LoggingGuard` - Must be kept alive for the duration of the program
///   to ensure non-blocking log writes are flushed
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard> {
    let format: LogFormat = config.format.parse()?;
    let configuration = initial_configuration(config)?;

    let pipeline = LogContext::builder(configuration)
        .format(format)
        .ansi(config.is_console())
        .non_blocking(config.non_blocking)
        .build()?;

    tracing::dispatcher::set_global_default(pipeline.dispatch)?;
    init_log_context(pipeline.context)?;

    debug!(format = ?format, "Logging initialized");

    Ok(LoggingGuard {
        _worker: pipeline.guard,
    })
}

/// The configuration `init_logging` starts from: the descriptor when one is
/// configured, otherwise the level directives and file settings.
pub fn initial_configuration(config: &LoggingConfig) -> Result<Configuration> {
    if let Some(descriptor_path) = config.descriptor.as_deref().filter(|p| !p.is_empty()) {
        let text = std::fs::read_to_string(descriptor_path).map_err(|e| {
            LogUtilError::io(format!("Failed to read {}: {}", descriptor_path, e))
        })?;
        return descriptor::parse(&text);
    }

    let configuration = Configuration::from_directives(&config.level)?;
    Ok(configuration.with_appender(file_appender(config)))
}

fn file_appender(config: &LoggingConfig) -> Appender {
    let log_file = match config.file.as_deref() {
        Some(file) if !file.is_empty() => file,
        _ => return Appender::stdout(),
    };

    if config.enable_rotation {
        let path = Path::new(log_file);
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let prefix = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("logutil.log");
        Appender::RollingFile {
            name: "file".to_string(),
            directory: directory.to_path_buf(),
            prefix: prefix.to_string(),
            rotation: RollPeriod::Daily,
            max_files: Some(config.max_backups as usize),
        }
    } else {
        Appender::file("file", log_file)
    }
}
