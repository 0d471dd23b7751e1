//! Runtime logging context
//!
//! A [`LogContext`] owns the live [`Configuration`] and the handles that
//! push a changed configuration into an already running subscriber: the
//! reload handle of the [`Targets`] filter layer and the [`RoutedWriter`]
//! the fmt layer writes through.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::level_filters::LevelFilter;
use tracing::{Dispatch, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::{Layer, Layered, SubscriberExt};
use tracing_subscriber::{Registry, fmt, reload};

use super::appender::RoutedWriter;
use super::configuration::{Configuration, LoggerConfig};
use super::descriptor;
use crate::errors::{LogUtilError, Result};

type FilterHandle = reload::Handle<Targets, Registry>;
type Filtered = Layered<reload::Layer<Targets, Registry>, Registry>;

/// Record layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = LogUtilError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(LogUtilError::invalid_format(format!(
                "Invalid log format: '{}'. Valid: text, json",
                s
            ))),
        }
    }
}

/// A built subscriber together with the context that controls it
pub struct Pipeline {
    pub context: LogContext,
    /// Install with `tracing::dispatcher::set_global_default` or scope it
    /// with `tracing::dispatcher::with_default`.
    pub dispatch: Dispatch,
    /// Present when the writer is non-blocking; dropping it flushes
    /// pending records.
    pub guard: Option<WorkerGuard>,
}

pub struct LogContextBuilder {
    configuration: Configuration,
    format: LogFormat,
    ansi: bool,
    non_blocking: bool,
}

impl LogContextBuilder {
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    pub fn non_blocking(mut self, non_blocking: bool) -> Self {
        self.non_blocking = non_blocking;
        self
    }

    /// Open the configured appender and assemble
    /// `Registry -> reloadable Targets filter -> fmt layer`.
    pub fn build(self) -> Result<Pipeline> {
        let destination = self.configuration.appender().open()?;
        let writer = RoutedWriter::new(destination);

        let (make_writer, guard) = if self.non_blocking {
            let (non_blocking, guard) = tracing_appender::non_blocking(writer.clone());
            (BoxMakeWriter::new(non_blocking), Some(guard))
        } else {
            (BoxMakeWriter::new(writer.clone()), None)
        };

        let (filter, handle) = reload::Layer::new(self.configuration.to_targets());

        let fmt_layer: Box<dyn Layer<Filtered> + Send + Sync> = match self.format {
            LogFormat::Text => fmt::layer()
                .with_writer(make_writer)
                .with_ansi(self.ansi)
                .with_level(true)
                .with_thread_names(true)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(make_writer)
                .with_level(true)
                .with_thread_names(true)
                .boxed(),
        };

        let subscriber = Registry::default().with(filter).with(fmt_layer);

        let context = LogContext {
            inner: Arc::new(ContextInner {
                configuration: RwLock::new(self.configuration),
                handle,
                writer,
            }),
        };

        Ok(Pipeline {
            context,
            dispatch: Dispatch::new(subscriber),
            guard,
        })
    }
}

struct ContextInner {
    configuration: RwLock<Configuration>,
    handle: FilterHandle,
    writer: RoutedWriter,
}

/// Cheap to clone; all clones control the same subscriber.
#[derive(Clone)]
pub struct LogContext {
    inner: Arc<ContextInner>,
}

impl std::fmt::Debug for LogContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogContext")
            .field("configuration", &*self.inner.configuration.read())
            .finish()
    }
}

impl LogContext {
    pub fn builder(configuration: Configuration) -> LogContextBuilder {
        LogContextBuilder {
            configuration,
            format: LogFormat::Text,
            ansi: false,
            non_blocking: false,
        }
    }

    /// Snapshot of the live configuration
    pub fn configuration(&self) -> Configuration {
        self.inner.configuration.read().clone()
    }

    /// Threshold currently in effect for target `name`
    pub fn level(&self, name: &str) -> LevelFilter {
        self.inner.configuration.read().effective_level(name)
    }

    /// Override the threshold of the node governing `name` and return the
    /// threshold it had before.
    ///
    /// A name without its own node changes its nearest configured ancestor,
    /// or the root when there is none.
    pub fn set_level(&self, name: &str, level: LevelFilter) -> Result<LevelFilter> {
        let previous = self.update(|conf| conf.set_level(name, level))?;
        debug!(
            logger = %display_name(&previous),
            from = %previous.level,
            to = %level,
            "Logger level changed"
        );
        Ok(previous.level)
    }

    pub fn set_root_level(&self, level: LevelFilter) -> Result<LevelFilter> {
        self.set_level(super::ROOT_LOGGER_NAME, level)
    }

    /// Set the root and every configured logger to `level`.
    pub fn set_all_level(&self, level: LevelFilter) -> Result<()> {
        self.update(|conf| conf.set_all_levels(level))?;
        debug!(to = %level, "All logger levels changed");
        Ok(())
    }

    /// Replace the whole configuration with the descriptor read from
    /// `source`.
    ///
    /// The source is read to the end and parsed before anything changes;
    /// a read or parse failure leaves the running configuration as it was.
    pub fn config<R: Read>(&self, mut source: R) -> Result<()> {
        let mut text = String::new();
        source.read_to_string(&mut text)?;
        let configuration = descriptor::parse(&text)?;
        self.apply(configuration)
    }

    pub fn config_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            LogUtilError::io(format!("Failed to open {}: {}", path.display(), e))
        })?;
        self.config(std::io::BufReader::new(file))
    }

    /// Install `configuration` wholesale: filter thresholds and output.
    pub fn apply(&self, configuration: Configuration) -> Result<()> {
        let destination = configuration.appender().open()?;

        let mut current = self.inner.configuration.write();
        self.inner.handle.reload(configuration.to_targets())?;
        self.inner.writer.route(destination);
        *current = configuration;
        drop(current);

        debug!("Logging configuration reinitialized");
        Ok(())
    }

    /// Mutate a copy, push it to the filter, then commit. The filter reload
    /// rebuilds the callsite interest cache so active loggers see the new
    /// thresholds immediately.
    fn update<T>(&self, change: impl FnOnce(&mut Configuration) -> T) -> Result<T> {
        let mut current = self.inner.configuration.write();
        let mut next = current.clone();
        let out = change(&mut next);
        self.inner.handle.reload(next.to_targets())?;
        *current = next;
        Ok(out)
    }
}

fn display_name(logger: &LoggerConfig) -> &str {
    if logger.is_root() { "root" } else { &logger.name }
}
