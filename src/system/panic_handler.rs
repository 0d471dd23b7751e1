//! Panic handler module
//!
//! Routes panics into the logging system instead of the default stderr
//! printout. The reporter replaces the process panic hook; the last
//! registration wins and there is no teardown.
//!
//! The hook runs for every panic, including ones later caught with
//! `catch_unwind`, on the panicking thread.

use std::backtrace::Backtrace;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic::{self, PanicHookInfo};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ThreadId};

use chrono::{DateTime, Utc};
use tracing::error;

use crate::errors::Result;

/// Name of the process-wide property recording the installed handler
pub const HANDLER_PROPERTY: &str = "logutil.uncaught.handler";

/// Value of [`HANDLER_PROPERTY`] once a reporter is registered
pub const HANDLER_IDENTITY: &str = concat!(module_path!(), "::UncaughtReporter");

static REGISTERED: AtomicBool = AtomicBool::new(false);

/// Identity of the registered panic reporter, if any
pub fn installed_handler() -> Option<&'static str> {
    REGISTERED
        .load(Ordering::Acquire)
        .then_some(HANDLER_IDENTITY)
}

/// Everything known about a panic at hook time
#[derive(Debug)]
pub struct PanicReport {
    pub thread_name: Option<String>,
    pub thread_id: ThreadId,
    pub message: String,
    pub location: String,
    pub backtrace: Backtrace,
    pub timestamp: DateTime<Utc>,
}

impl PanicReport {
    pub fn capture(info: &PanicHookInfo<'_>) -> Self {
        let payload = info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        let location = info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "Unknown location".to_string());

        let current = thread::current();

        Self {
            thread_name: current.name().map(str::to_owned),
            thread_id: current.id(),
            message,
            location,
            backtrace: Backtrace::force_capture(),
            timestamp: Utc::now(),
        }
    }

    /// Thread name, or its id for unnamed threads
    pub fn thread_label(&self) -> String {
        match &self.thread_name {
            Some(name) => name.clone(),
            None => format!("{:?}", self.thread_id),
        }
    }
}

/// Destination for panic reports
pub trait ReportSink: Send + Sync {
    fn report(&self, report: &PanicReport) -> Result<()>;
}

impl<F> ReportSink for F
where
    F: Fn(&PanicReport) -> Result<()> + Send + Sync,
{
    fn report(&self, report: &PanicReport) -> Result<()> {
        self(report)
    }
}

/// Default sink: an ERROR event on the `uncaught` target. Unless a logger
/// is configured for that target, the root threshold governs it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn report(&self, report: &PanicReport) -> Result<()> {
        error!(
            target: "uncaught",
            thread = %report.thread_label(),
            thread_id = ?report.thread_id,
            location = %report.location,
            backtrace = %report.backtrace,
            "unhandled panic caught: {}",
            report.message
        );
        Ok(())
    }
}

/// Appends a crash report block to a file
#[derive(Debug, Clone)]
pub struct CrashLogSink {
    path: PathBuf,
}

impl CrashLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for CrashLogSink {
    fn default() -> Self {
        Self::new("crash.log")
    }
}

impl ReportSink for CrashLogSink {
    fn report(&self, report: &PanicReport) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let timestamp = report.timestamp.format("%Y-%m-%d %H:%M:%S UTC");
        writeln!(file, "==========================================")?;
        writeln!(file, "Crash Report - {}", timestamp)?;
        writeln!(file, "==========================================")?;
        writeln!(file, "Thread: {}", report.thread_label())?;
        writeln!(file, "Message: {}", report.message)?;
        writeln!(file, "Location: {}", report.location)?;
        writeln!(file, "\nBacktrace:")?;
        writeln!(file, "{:?}", report.backtrace)?;
        writeln!(file, "==========================================\n")?;

        Ok(())
    }
}

/// Process panic hook that reports to a [`ReportSink`]
pub struct UncaughtReporter {
    sink: Box<dyn ReportSink>,
}

impl UncaughtReporter {
    /// Install with the default [`TracingSink`].
    pub fn register() {
        Self::register_with(TracingSink);
    }

    /// Install with an explicit sink.
    pub fn register_with<S: ReportSink + 'static>(sink: S) {
        let reporter = UncaughtReporter {
            sink: Box::new(sink),
        };

        // drop the std hook so the panic is not printed to stderr as well
        let _default_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info| reporter.handle(info)));

        REGISTERED.store(true, Ordering::Release);
    }

    fn handle(&self, info: &PanicHookInfo<'_>) {
        let report = PanicReport::capture(info);
        // An error escaping the hook would re-enter it or abort; drop it here.
        let _ = self.sink.report(&report);
    }
}
