//! Output appenders
//!
//! An [`Appender`] describes where formatted records go. The fmt layer
//! writes through a [`RoutedWriter`], whose destination is swapped in place
//! when a new configuration is applied, so the subscriber itself never has
//! to be rebuilt.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing_appender::rolling::{self, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;

use crate::errors::{LogUtilError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
}

impl std::str::FromStr for ConsoleTarget {
    type Err = LogUtilError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SYSTEM_OUT" | "STDOUT" => Ok(Self::Stdout),
            "SYSTEM_ERR" | "STDERR" => Ok(Self::Stderr),
            _ => Err(LogUtilError::descriptor(format!(
                "Invalid console target: '{}'. Valid: SYSTEM_OUT, SYSTEM_ERR",
                s
            ))),
        }
    }
}

/// Rotation period of a rolling file appender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollPeriod {
    Minutely,
    Hourly,
    Daily,
    Never,
}

impl std::str::FromStr for RollPeriod {
    type Err = LogUtilError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "minutely" => Ok(Self::Minutely),
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "never" => Ok(Self::Never),
            _ => Err(LogUtilError::descriptor(format!(
                "Invalid rotation: '{}'. Valid: minutely, hourly, daily, never",
                s
            ))),
        }
    }
}

impl From<RollPeriod> for Rotation {
    fn from(period: RollPeriod) -> Self {
        match period {
            RollPeriod::Minutely => Rotation::MINUTELY,
            RollPeriod::Hourly => Rotation::HOURLY,
            RollPeriod::Daily => Rotation::DAILY,
            RollPeriod::Never => Rotation::NEVER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Appender {
    Console {
        name: String,
        target: ConsoleTarget,
    },
    File {
        name: String,
        path: PathBuf,
        append: bool,
    },
    RollingFile {
        name: String,
        directory: PathBuf,
        prefix: String,
        rotation: RollPeriod,
        max_files: Option<usize>,
    },
}

impl Default for Appender {
    fn default() -> Self {
        Appender::stdout()
    }
}

impl Appender {
    pub fn stdout() -> Self {
        Appender::Console {
            name: "stdout".to_string(),
            target: ConsoleTarget::Stdout,
        }
    }

    /// Appending file appender
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Appender::File {
            name: name.into(),
            path: path.into(),
            append: true,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Appender::Console { name, .. }
            | Appender::File { name, .. }
            | Appender::RollingFile { name, .. } => name,
        }
    }

    /// Open the underlying output. Nothing is routed to it yet.
    pub fn open(&self) -> Result<Destination> {
        match self {
            Appender::Console { target, .. } => Ok(match target {
                ConsoleTarget::Stdout => Destination::Stdout,
                ConsoleTarget::Stderr => Destination::Stderr,
            }),
            Appender::File { path, append, .. } => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        LogUtilError::appender(format!(
                            "Failed to create log directory {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .append(*append)
                    .truncate(!*append)
                    .open(path)
                    .map_err(|e| {
                        LogUtilError::appender(format!(
                            "Failed to open log file {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                Ok(Destination::File(Mutex::new(file)))
            }
            Appender::RollingFile {
                directory,
                prefix,
                rotation,
                max_files,
                ..
            } => {
                let mut builder = rolling::Builder::new()
                    .rotation((*rotation).into())
                    .filename_prefix(prefix.trim_end_matches(".log"))
                    .filename_suffix("log");
                if let Some(max_files) = max_files {
                    builder = builder.max_log_files(*max_files);
                }
                let appender = builder.build(directory)?;
                Ok(Destination::Rolling(Mutex::new(appender)))
            }
        }
    }
}

/// An opened appender
pub enum Destination {
    Stdout,
    Stderr,
    File(Mutex<File>),
    Rolling(Mutex<RollingFileAppender>),
}

impl std::fmt::Debug for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::Stdout => write!(f, "Stdout"),
            Destination::Stderr => write!(f, "Stderr"),
            Destination::File(_) => write!(f, "File"),
            Destination::Rolling(_) => write!(f, "Rolling"),
        }
    }
}

impl Destination {
    fn write_bytes(&self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Destination::Stdout => io::stdout().write(buf),
            Destination::Stderr => io::stderr().write(buf),
            Destination::File(file) => file.lock().write(buf),
            Destination::Rolling(appender) => appender.lock().write(buf),
        }
    }

    fn flush_output(&self) -> io::Result<()> {
        match self {
            Destination::Stdout => io::stdout().flush(),
            Destination::Stderr => io::stderr().flush(),
            Destination::File(file) => file.lock().flush(),
            Destination::Rolling(appender) => appender.lock().flush(),
        }
    }
}

/// Writer whose destination can be replaced while loggers are active
#[derive(Clone)]
pub struct RoutedWriter {
    current: Arc<ArcSwap<Destination>>,
}

impl RoutedWriter {
    pub fn new(destination: Destination) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(destination)),
        }
    }

    /// Send subsequent records to `destination`. Writes already in flight
    /// finish on the previous one.
    pub fn route(&self, destination: Destination) {
        self.current.store(Arc::new(destination));
    }
}

/// Handle on the destination that was current when the record started
pub struct RoutedWrite {
    destination: Arc<Destination>,
}

impl Write for RoutedWrite {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.destination.write_bytes(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.destination.flush_output()
    }
}

impl<'a> MakeWriter<'a> for RoutedWriter {
    type Writer = RoutedWrite;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWrite {
            destination: self.current.load_full(),
        }
    }
}

// Lets the non-blocking worker own a RoutedWriter directly.
impl Write for RoutedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.current.load().write_bytes(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.current.load().flush_output()
    }
}
