//! System-level modules
//!
//! - Logging initialization (global subscriber and context)
//! - Panic reporting into the logging system

pub mod logging;
pub mod panic_handler;

pub use logging::{LoggingGuard, init_logging};
pub use panic_handler::{
    CrashLogSink, HANDLER_IDENTITY, HANDLER_PROPERTY, PanicReport, ReportSink, TracingSink,
    UncaughtReporter, installed_handler,
};
