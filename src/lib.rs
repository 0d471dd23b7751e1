//! logutil - panic reporting and runtime log control for `tracing`
//!
//! # Architecture
//! - `system::panic_handler`: process panic hook that reports panics to a
//!   logging sink instead of stderr
//! - `control`: change logger levels at runtime, or replace the whole
//!   logging configuration from an XML descriptor
//! - `system::logging`: build and install the global pipeline
//! - `config`: static settings from TOML and environment variables
//!
//! ```no_run
//! use logutil::config::StaticConfig;
//! use logutil::system::{UncaughtReporter, init_logging};
//! use tracing::level_filters::LevelFilter;
//!
//! let config = StaticConfig::load();
//! let _guard = init_logging(&config.logging)?;
//! UncaughtReporter::register();
//!
//! let previous = logutil::control::set_level("app::db", LevelFilter::DEBUG)?;
//! logutil::control::set_level("app::db", previous)?;
//! # Ok::<(), logutil::errors::LogUtilError>(())
//! ```

pub mod config;
pub mod control;
pub mod errors;
pub mod system;
