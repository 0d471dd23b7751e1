//! Runtime control of logger levels and configuration
//!
//! - `configuration`: root threshold, named logger nodes, appender
//! - `descriptor`: XML descriptor parsing
//! - `appender`: output destinations and the swappable writer
//! - `context`: the subscriber pipeline and the operations on it
//! - `global`: the process-wide context and free-function access

pub mod appender;
pub mod configuration;
pub mod context;
pub mod descriptor;
pub mod global;
mod level;

pub use appender::{Appender, ConsoleTarget, RollPeriod};
pub use configuration::{Configuration, LoggerConfig, ROOT_LOGGER_NAME};
pub use context::{LogContext, LogContextBuilder, LogFormat, Pipeline};
pub use global::{
    config, config_file, configuration, get_log_context, init_log_context, level, set_all_level,
    set_level,
};
pub use level::parse_level;
