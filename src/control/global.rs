//! Process-wide LogContext
//!
//! The context is installed once at startup and lives for the rest of the
//! process. The free functions here operate on it and fail with
//! `NotInitialized` until it exists.

use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use tracing::level_filters::LevelFilter;

use super::configuration::Configuration;
use super::context::LogContext;
use crate::errors::{LogUtilError, Result};

static LOG_CONTEXT: OnceLock<LogContext> = OnceLock::new();

/// Install the global LogContext. Only the first call succeeds.
pub fn init_log_context(context: LogContext) -> Result<()> {
    LOG_CONTEXT
        .set(context)
        .map_err(|_| LogUtilError::already_initialized("Global log context is already set"))
}

/// Returns None if the context has not been initialized.
pub fn get_log_context() -> Option<LogContext> {
    LOG_CONTEXT.get().cloned()
}

fn context() -> Result<&'static LogContext> {
    LOG_CONTEXT.get().ok_or_else(|| {
        LogUtilError::not_initialized("Call init_logging or init_log_context first")
    })
}

/// Override the level of a logger and return its previous level.
pub fn set_level(name: &str, level: LevelFilter) -> Result<LevelFilter> {
    context()?.set_level(name, level)
}

/// Reset the level of every logger, root included.
pub fn set_all_level(level: LevelFilter) -> Result<()> {
    context()?.set_all_level(level)
}

/// Reconfigure logging from the XML descriptor in `source`.
pub fn config<R: Read>(source: R) -> Result<()> {
    context()?.config(source)
}

pub fn config_file<P: AsRef<Path>>(path: P) -> Result<()> {
    context()?.config_file(path)
}

pub fn level(name: &str) -> Result<LevelFilter> {
    Ok(context()?.level(name))
}

pub fn configuration() -> Result<Configuration> {
    Ok(context()?.configuration())
}
