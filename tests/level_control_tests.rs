use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use logutil::control::{
    self, Appender, Configuration, LogContext, LogFormat, Pipeline, ROOT_LOGGER_NAME, RollPeriod,
};
use logutil::errors::LogUtilError;
use tempfile::TempDir;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};

/// A local pipeline writing to a file in its own temp directory
struct Harness {
    pipeline: Pipeline,
    path: PathBuf,
    dir: TempDir,
}

impl Harness {
    fn new(configuration: Configuration) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let pipeline = LogContext::builder(configuration.with_appender(Appender::file("file", &path)))
            .build()
            .unwrap();
        Self {
            pipeline,
            path,
            dir,
        }
    }

    fn context(&self) -> &LogContext {
        &self.pipeline.context
    }

    fn emit(&self, f: impl FnOnce()) {
        tracing::dispatcher::with_default(&self.pipeline.dispatch, f);
    }

    fn output(&self) -> String {
        read(&self.path)
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}

/// Yields `prefix`, then fails as if the stream was cut off.
struct TruncatedReader {
    prefix: &'static [u8],
    sent: bool,
}

impl Read for TruncatedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.sent {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "stream cut off",
            ));
        }
        self.sent = true;
        let n = self.prefix.len().min(buf.len());
        buf[..n].copy_from_slice(&self.prefix[..n]);
        Ok(n)
    }
}

#[cfg(test)]
mod set_level_tests {
    use super::*;

    #[test]
    fn test_set_level_round_trip_restores_threshold() {
        let harness = Harness::new(
            Configuration::new(LevelFilter::INFO).with_logger("app::db", LevelFilter::DEBUG),
        );

        harness.emit(|| debug!(target: "app::db", "rt-visible-before"));

        let previous = harness.context().set_level("app::db", LevelFilter::WARN).unwrap();
        assert_eq!(previous, LevelFilter::DEBUG);
        harness.emit(|| debug!(target: "app::db", "rt-suppressed"));

        let replaced = harness.context().set_level("app::db", previous).unwrap();
        assert_eq!(replaced, LevelFilter::WARN);
        harness.emit(|| debug!(target: "app::db", "rt-visible-after"));

        let output = harness.output();
        assert!(output.contains("rt-visible-before"));
        assert!(!output.contains("rt-suppressed"));
        assert!(output.contains("rt-visible-after"));
        assert_eq!(harness.context().level("app::db"), LevelFilter::DEBUG);
    }

    #[test]
    fn test_set_level_on_descendant_changes_configured_ancestor() {
        let harness = Harness::new(
            Configuration::new(LevelFilter::INFO).with_logger("app::db", LevelFilter::INFO),
        );

        let previous = harness
            .context()
            .set_level("app::db::pool", LevelFilter::ERROR)
            .unwrap();
        assert_eq!(previous, LevelFilter::INFO);

        harness.emit(|| {
            warn!(target: "app::db", "desc-db-warn");
            warn!(target: "app::db::pool", "desc-pool-warn");
            warn!(target: "app::http", "desc-http-warn");
        });

        let output = harness.output();
        assert!(!output.contains("desc-db-warn"));
        assert!(!output.contains("desc-pool-warn"));
        assert!(output.contains("desc-http-warn"));

        let conf = harness.context().configuration();
        assert_eq!(conf.loggers().count(), 1);
        assert_eq!(conf.effective_level("app::db"), LevelFilter::ERROR);
    }

    // A name with no node of its own and no configured ancestor resolves to
    // the root node: the call changes the root threshold and returns it.
    #[test]
    fn test_set_level_on_unconfigured_name_changes_root() {
        let harness = Harness::new(
            Configuration::new(LevelFilter::INFO).with_logger("app::db", LevelFilter::WARN),
        );

        let previous = harness
            .context()
            .set_level("unconfigured::thing", LevelFilter::DEBUG)
            .unwrap();
        assert_eq!(previous, LevelFilter::INFO);

        let conf = harness.context().configuration();
        assert_eq!(conf.root_level(), LevelFilter::DEBUG);
        assert_eq!(conf.loggers().count(), 1);

        harness.emit(|| {
            debug!(target: "elsewhere", "unconf-root-debug");
            debug!(target: "app::db", "unconf-db-debug");
        });

        let output = harness.output();
        assert!(output.contains("unconf-root-debug"));
        assert!(!output.contains("unconf-db-debug"));
    }

    #[test]
    fn test_set_root_level() {
        let harness = Harness::new(Configuration::new(LevelFilter::WARN));

        assert_eq!(
            harness.context().set_root_level(LevelFilter::INFO).unwrap(),
            LevelFilter::WARN
        );
        assert_eq!(harness.context().level(ROOT_LOGGER_NAME), LevelFilter::INFO);

        harness.emit(|| info!(target: "anything", "root-info-visible"));
        assert!(harness.output().contains("root-info-visible"));
    }
}

#[cfg(test)]
mod set_all_level_tests {
    use super::*;

    #[test]
    fn test_set_all_level_silences_root_and_named_loggers() {
        let harness = Harness::new(
            Configuration::new(LevelFilter::INFO)
                .with_logger("app::http", LevelFilter::INFO)
                .with_logger("app::db", LevelFilter::TRACE),
        );

        harness.emit(|| {
            info!(target: "elsewhere", "all-root-before");
            info!(target: "app::http", "all-http-before");
        });

        harness.context().set_all_level(LevelFilter::ERROR).unwrap();

        harness.emit(|| {
            info!(target: "elsewhere", "all-root-after");
            info!(target: "app::http", "all-http-after");
            debug!(target: "app::db", "all-db-after");
            error!(target: "app::http", "all-http-error");
        });

        let output = harness.output();
        assert!(output.contains("all-root-before"));
        assert!(output.contains("all-http-before"));
        assert!(!output.contains("all-root-after"));
        assert!(!output.contains("all-http-after"));
        assert!(!output.contains("all-db-after"));
        assert!(output.contains("all-http-error"));

        let conf = harness.context().configuration();
        assert_eq!(conf.root_level(), LevelFilter::ERROR);
        assert!(conf.loggers().all(|l| l.level == LevelFilter::ERROR));
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    fn descriptor(path: &Path) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <Configuration>
              <Appenders>
                <File name="main" fileName="{}"/>
              </Appenders>
              <Loggers>
                <Root level="info"><AppenderRef ref="main"/></Root>
                <Logger name="app::db" level="warn"/>
              </Loggers>
            </Configuration>"#,
            path.display()
        )
    }

    #[test]
    fn test_minimal_descriptor_applies_logger_level() {
        let harness = Harness::new(
            Configuration::new(LevelFilter::INFO).with_logger("app::db", LevelFilter::DEBUG),
        );

        harness
            .context()
            .config(descriptor(&harness.path).as_bytes())
            .unwrap();

        harness.emit(|| {
            info!(target: "app::db", "cfg-db-info");
            warn!(target: "app::db", "cfg-db-warn");
            info!(target: "elsewhere", "cfg-root-info");
        });

        let output = harness.output();
        assert!(!output.contains("cfg-db-info"));
        assert!(output.contains("cfg-db-warn"));
        assert!(output.contains("cfg-root-info"));
        assert_eq!(harness.context().level("app::db"), LevelFilter::WARN);
    }

    #[test]
    fn test_descriptor_replaces_configuration_wholesale() {
        let harness = Harness::new(
            Configuration::new(LevelFilter::INFO).with_logger("app::cache", LevelFilter::TRACE),
        );
        let second = harness.dir.path().join("second.log");

        harness
            .context()
            .config(descriptor(&second).as_bytes())
            .unwrap();

        let conf = harness.context().configuration();
        assert_eq!(
            conf.loggers().map(|l| l.name).collect::<Vec<_>>(),
            vec!["app::db".to_string()]
        );

        harness.emit(|| {
            debug!(target: "app::cache", "whole-cache-debug");
            info!(target: "elsewhere", "whole-routed");
        });

        assert!(!harness.output().contains("whole-routed"));
        let routed = read(&second);
        assert!(routed.contains("whole-routed"));
        assert!(!routed.contains("whole-cache-debug"));
    }

    #[test]
    fn test_truncated_stream_is_io_error() {
        let harness = Harness::new(
            Configuration::new(LevelFilter::INFO).with_logger("app::db", LevelFilter::DEBUG),
        );
        let before = harness.context().configuration();

        let reader = TruncatedReader {
            prefix: b"<Configuration><Loggers><Root level=\"off\"/>",
            sent: false,
        };
        let err = harness.context().config(reader).unwrap_err();

        assert!(matches!(err, LogUtilError::Io(_)));
        assert_eq!(harness.context().configuration(), before);

        harness.emit(|| debug!(target: "app::db", "trunc-still-debug"));
        assert!(harness.output().contains("trunc-still-debug"));
    }

    #[test]
    fn test_malformed_descriptor_changes_nothing() {
        let harness = Harness::new(Configuration::new(LevelFilter::INFO));
        let before = harness.context().configuration();

        let err = harness
            .context()
            .config("<Configuration><Loggers>".as_bytes())
            .unwrap_err();

        assert!(matches!(err, LogUtilError::Descriptor(_)));
        assert_eq!(harness.context().configuration(), before);
    }

    #[test]
    fn test_config_file() {
        let harness = Harness::new(Configuration::new(LevelFilter::INFO));
        let xml = harness.dir.path().join("log.xml");
        fs::write(&xml, descriptor(&harness.path)).unwrap();

        harness.context().config_file(&xml).unwrap();
        assert_eq!(harness.context().level("app::db::pool"), LevelFilter::WARN);

        let err = harness
            .context()
            .config_file(harness.dir.path().join("missing.xml"))
            .unwrap_err();
        assert!(matches!(err, LogUtilError::Io(_)));
    }
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    #[test]
    fn test_non_blocking_json_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("json.log");
        let mut pipeline = LogContext::builder(
            Configuration::new(LevelFilter::INFO).with_appender(Appender::file("file", &path)),
        )
        .format(LogFormat::Json)
        .non_blocking(true)
        .build()
        .unwrap();
        assert!(pipeline.guard.is_some());

        tracing::dispatcher::with_default(&pipeline.dispatch, || {
            info!(target: "json::x", "json-line")
        });
        pipeline
            .context
            .set_level("json::x", LevelFilter::WARN)
            .unwrap();
        tracing::dispatcher::with_default(&pipeline.dispatch, || {
            info!(target: "json::x", "json-hidden")
        });

        // the worker flushes everything queued when its guard goes away
        drop(pipeline.guard.take());

        let output = read(&path);
        let line = output.lines().find(|l| l.contains("json-line")).unwrap();
        assert!(line.starts_with('{'));
        assert!(line.contains(r#""level":"INFO""#));
        assert!(line.contains(r#""message":"json-line""#));
        assert!(line.contains(r#""target":"json::x""#));
        assert!(!output.contains("json-hidden"));
    }

    #[test]
    fn test_rolling_file_appender() {
        let dir = tempfile::tempdir().unwrap();
        let appender = Appender::RollingFile {
            name: "rolling".to_string(),
            directory: dir.path().to_path_buf(),
            prefix: "app.log".to_string(),
            rotation: RollPeriod::Never,
            max_files: Some(2),
        };
        let pipeline = LogContext::builder(
            Configuration::new(LevelFilter::INFO).with_appender(appender),
        )
        .build()
        .unwrap();

        tracing::dispatcher::with_default(&pipeline.dispatch, || info!("rolled-record"));

        let files: Vec<PathBuf> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("app"));
        assert!(name.ends_with(".log"));
        assert!(read(&files[0]).contains("rolled-record"));
    }
}

#[cfg(test)]
mod global_tests {
    use super::*;

    // nothing in this test binary installs the global context
    #[test]
    fn test_free_functions_require_initialization() {
        assert!(control::get_log_context().is_none());
        assert!(matches!(
            control::set_level("app", LevelFilter::DEBUG),
            Err(LogUtilError::NotInitialized(_))
        ));
        assert!(matches!(
            control::set_all_level(LevelFilter::DEBUG),
            Err(LogUtilError::NotInitialized(_))
        ));
        assert!(matches!(
            control::config("<Configuration/>".as_bytes()),
            Err(LogUtilError::NotInitialized(_))
        ));
        assert!(matches!(
            control::level("app"),
            Err(LogUtilError::NotInitialized(_))
        ));
    }
}
