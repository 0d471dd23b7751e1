//! XML configuration descriptor
//!
//! ```xml
//! <Configuration>
//!   <Appenders>
//!     <Console name="stdout" target="SYSTEM_OUT"/>
//!     <File name="file" fileName="logs/app.log" append="true"/>
//!     <RollingFile name="roll" directory="logs" prefix="app" rotation="daily" maxFiles="5"/>
//!   </Appenders>
//!   <Loggers>
//!     <Root level="info">
//!       <AppenderRef ref="file"/>
//!     </Root>
//!     <Logger name="app::db" level="warn"/>
//!   </Loggers>
//! </Configuration>
//! ```
//!
//! Records go to the appender the root references, else the first one
//! declared, else stdout. Without a `<Root>` the root level is `error`.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::level_filters::LevelFilter;

use super::appender::{Appender, ConsoleTarget, RollPeriod};
use super::configuration::Configuration;
use super::level::parse_level;
use crate::errors::{LogUtilError, Result};

#[derive(Debug, Deserialize)]
struct ConfigurationNode {
    #[serde(rename = "Appenders", default)]
    appenders: Option<AppendersNode>,
    #[serde(rename = "Loggers", default)]
    loggers: Option<LoggersNode>,
}

#[derive(Debug, Deserialize)]
struct AppendersNode {
    #[serde(rename = "$value", default)]
    items: Vec<AppenderNode>,
}

#[derive(Debug, Deserialize)]
enum AppenderNode {
    Console(ConsoleNode),
    File(FileNode),
    RollingFile(RollingFileNode),
}

#[derive(Debug, Deserialize)]
struct ConsoleNode {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@target", default)]
    target: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileNode {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@fileName")]
    file_name: String,
    #[serde(rename = "@append", default)]
    append: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RollingFileNode {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@directory")]
    directory: String,
    #[serde(rename = "@prefix", default)]
    prefix: Option<String>,
    #[serde(rename = "@rotation", default)]
    rotation: Option<String>,
    #[serde(rename = "@maxFiles", default)]
    max_files: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct LoggersNode {
    #[serde(rename = "$value", default)]
    items: Vec<LoggerNode>,
}

#[derive(Debug, Deserialize)]
enum LoggerNode {
    Root(RootNode),
    Logger(NamedLoggerNode),
}

#[derive(Debug, Deserialize)]
struct RootNode {
    #[serde(rename = "@level", default)]
    level: Option<String>,
    #[serde(rename = "AppenderRef", default)]
    appender_refs: Vec<AppenderRefNode>,
}

#[derive(Debug, Deserialize)]
struct NamedLoggerNode {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@level", default)]
    level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AppenderRefNode {
    #[serde(rename = "@ref")]
    reference: String,
}

impl AppenderNode {
    fn into_appender(self) -> Result<Appender> {
        match self {
            AppenderNode::Console(node) => Ok(Appender::Console {
                name: node.name,
                target: match node.target {
                    Some(target) => target.parse()?,
                    None => ConsoleTarget::Stdout,
                },
            }),
            AppenderNode::File(node) => Ok(Appender::File {
                name: node.name,
                path: PathBuf::from(node.file_name),
                append: node.append.unwrap_or(true),
            }),
            AppenderNode::RollingFile(node) => {
                let prefix = node.prefix.unwrap_or_else(|| node.name.clone());
                Ok(Appender::RollingFile {
                    name: node.name,
                    directory: PathBuf::from(node.directory),
                    prefix,
                    rotation: match node.rotation {
                        Some(rotation) => rotation.parse()?,
                        None => RollPeriod::Daily,
                    },
                    max_files: node.max_files,
                })
            }
        }
    }
}

/// Parse a descriptor into a complete configuration. Nothing is opened or
/// applied here.
pub fn parse(text: &str) -> Result<Configuration> {
    let node: ConfigurationNode = quick_xml::de::from_str(text)?;

    let mut appenders = Vec::new();
    let mut seen = HashSet::new();
    for item in node.appenders.map(|a| a.items).unwrap_or_default() {
        let appender = item.into_appender()?;
        if !seen.insert(appender.name().to_string()) {
            return Err(LogUtilError::descriptor(format!(
                "Duplicate appender name: '{}'",
                appender.name()
            )));
        }
        appenders.push(appender);
    }

    let mut root: Option<RootNode> = None;
    let mut named = Vec::new();
    for item in node.loggers.map(|l| l.items).unwrap_or_default() {
        match item {
            LoggerNode::Root(node) => {
                if root.replace(node).is_some() {
                    return Err(LogUtilError::descriptor("More than one <Root> logger"));
                }
            }
            LoggerNode::Logger(node) => named.push(node),
        }
    }

    let root_level = match root.as_ref().and_then(|r| r.level.as_deref()) {
        Some(level) => parse_level(level)?,
        None => LevelFilter::ERROR,
    };

    let reference = root
        .as_ref()
        .and_then(|r| r.appender_refs.first())
        .map(|r| r.reference.as_str());
    let appender = match reference {
        Some(reference) => appenders
            .iter()
            .find(|a| a.name() == reference)
            .cloned()
            .ok_or_else(|| {
                LogUtilError::descriptor(format!("Unknown appender reference: '{}'", reference))
            })?,
        None => appenders.into_iter().next().unwrap_or_default(),
    };

    let mut configuration = Configuration::new(root_level).with_appender(appender);
    for logger in named {
        if logger.name.is_empty() {
            return Err(LogUtilError::descriptor("<Logger> without a name"));
        }
        let level = match logger.level.as_deref() {
            Some(level) => parse_level(level)?,
            None => root_level,
        };
        configuration = configuration.with_logger(logger.name, level);
    }

    Ok(configuration)
}
