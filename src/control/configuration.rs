//! Logger configuration model
//!
//! A [`Configuration`] is the root threshold, the named logger nodes and the
//! output appender. Logger names are `tracing` targets; a node governs every
//! target it prefixes, the most specific node winning, which is exactly how
//! the [`Targets`] filter built from it matches events.

use std::collections::BTreeMap;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;

use super::appender::Appender;
use super::level::parse_level;
use crate::errors::{LogUtilError, Result};

/// Name of the root logger node
pub const ROOT_LOGGER_NAME: &str = "";

/// A named logger node and its threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub name: String,
    pub level: LevelFilter,
}

impl LoggerConfig {
    pub fn is_root(&self) -> bool {
        self.name == ROOT_LOGGER_NAME
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    root: LevelFilter,
    loggers: BTreeMap<String, LevelFilter>,
    appender: Appender,
}

impl Default for Configuration {
    /// Root at `error` with console output, matching an empty descriptor.
    fn default() -> Self {
        Self::new(LevelFilter::ERROR)
    }
}

impl Configuration {
    pub fn new(root: LevelFilter) -> Self {
        Self {
            root,
            loggers: BTreeMap::new(),
            appender: Appender::default(),
        }
    }

    /// Parse `info,app::db=debug` style directives. A bare level sets the
    /// root; later entries override earlier ones.
    pub fn from_directives(directives: &str) -> Result<Self> {
        let mut configuration = Self::new(LevelFilter::INFO);
        for directive in directives.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.split_once('=') {
                Some((name, level)) => {
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(LogUtilError::invalid_level(format!(
                            "Missing logger name in directive '{}'",
                            directive
                        )));
                    }
                    configuration
                        .loggers
                        .insert(name.to_string(), parse_level(level)?);
                }
                None => configuration.root = parse_level(directive)?,
            }
        }
        Ok(configuration)
    }

    pub fn with_logger(mut self, name: impl Into<String>, level: LevelFilter) -> Self {
        let name = name.into();
        if name == ROOT_LOGGER_NAME {
            self.root = level;
        } else {
            self.loggers.insert(name, level);
        }
        self
    }

    pub fn with_appender(mut self, appender: Appender) -> Self {
        self.appender = appender;
        self
    }

    pub fn root_level(&self) -> LevelFilter {
        self.root
    }

    pub fn appender(&self) -> &Appender {
        &self.appender
    }

    /// Explicitly configured loggers, root excluded, ordered by name
    pub fn loggers(&self) -> impl Iterator<Item = LoggerConfig> + '_ {
        self.loggers.iter().map(|(name, level)| LoggerConfig {
            name: name.clone(),
            level: *level,
        })
    }

    /// The node that governs `name`: the longest configured logger name
    /// prefixing it, or the root node.
    ///
    /// Matching is a plain string prefix, not split on `::` segments, so
    /// `application` is governed by `app`. This is the rule the [`Targets`]
    /// filter applies to event targets.
    pub fn logger_config(&self, name: &str) -> LoggerConfig {
        let governing = self
            .loggers
            .iter()
            .filter(|(configured, _)| {
                !name.is_empty() && name.starts_with(configured.as_str())
            })
            .max_by_key(|(configured, _)| configured.len());

        match governing {
            Some((configured, level)) => LoggerConfig {
                name: configured.clone(),
                level: *level,
            },
            None => LoggerConfig {
                name: ROOT_LOGGER_NAME.to_string(),
                level: self.root,
            },
        }
    }

    /// Threshold in effect for events on target `name`
    pub fn effective_level(&self, name: &str) -> LevelFilter {
        self.logger_config(name).level
    }

    /// Set the threshold of the node governing `name`, returning the node
    /// as it was before the change.
    pub(crate) fn set_level(&mut self, name: &str, level: LevelFilter) -> LoggerConfig {
        let previous = self.logger_config(name);
        if previous.is_root() {
            self.root = level;
        } else {
            self.loggers.insert(previous.name.clone(), level);
        }
        previous
    }

    pub(crate) fn set_all_levels(&mut self, level: LevelFilter) {
        self.root = level;
        for configured in self.loggers.values_mut() {
            *configured = level;
        }
    }

    pub fn to_targets(&self) -> Targets {
        Targets::new()
            .with_default(self.root)
            .with_targets(self.loggers.iter().map(|(name, level)| (name.clone(), *level)))
    }
}
