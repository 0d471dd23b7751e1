//! Textual log levels
//!
//! Accepts the usual `tracing` names plus the `fatal` and `all` aliases
//! found in XML logging descriptors.

use tracing::level_filters::LevelFilter;

use crate::errors::{LogUtilError, Result};

/// Parse a level name, case-insensitively.
pub fn parse_level(value: &str) -> Result<LevelFilter> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" | "none" => Ok(LevelFilter::OFF),
        "fatal" | "error" => Ok(LevelFilter::ERROR),
        "warn" | "warning" => Ok(LevelFilter::WARN),
        "info" => Ok(LevelFilter::INFO),
        "debug" => Ok(LevelFilter::DEBUG),
        "trace" | "all" => Ok(LevelFilter::TRACE),
        _ => Err(LogUtilError::invalid_level(format!(
            "Invalid log level: '{}'. Valid: off, fatal, error, warn, info, debug, trace, all",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_names() {
        assert_eq!(parse_level("error").unwrap(), LevelFilter::ERROR);
        assert_eq!(parse_level("WARN").unwrap(), LevelFilter::WARN);
        assert_eq!(parse_level(" Info ").unwrap(), LevelFilter::INFO);
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level("trace").unwrap(), LevelFilter::TRACE);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::OFF);
    }

    #[test]
    fn test_descriptor_aliases() {
        assert_eq!(parse_level("FATAL").unwrap(), LevelFilter::ERROR);
        assert_eq!(parse_level("ALL").unwrap(), LevelFilter::TRACE);
        assert_eq!(parse_level("warning").unwrap(), LevelFilter::WARN);
    }

    #[test]
    fn test_unknown_level() {
        let err = parse_level("verbose").unwrap_err();
        assert!(matches!(err, LogUtilError::InvalidLevel(_)));
        assert!(err.to_string().contains("verbose"));
    }
}
