//! Log severity taxonomy with a strict total order.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

/// Message severity, ordered by increasing seriousness. "Minimum severity K"
/// means K or more severe, so the filter is simply `level >= min`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fail,
}

impl LogLevel {
    /// Parses a level case-insensitively. Unknown values are an input error,
    /// spelled with the accepted names so the caller can self-correct.
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FAIL" => Ok(LogLevel::Fail),
            _ => Err(ToolError::InvalidInput(format!(
                "Invalid log_level '{value}'. Must be one of: DEBUG, ERROR, FAIL, INFO, TRACE, WARN"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_order_matches_taxonomy() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Fail);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(LogLevel::parse("fail").unwrap(), LogLevel::Fail);
        assert_eq!(LogLevel::parse("Warn").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::parse("TRACE").unwrap(), LogLevel::Trace);
    }

    #[test]
    fn unknown_level_is_invalid_input() {
        let err = LogLevel::parse("CRITICAL").unwrap_err();
        assert!(err.to_string().contains("Invalid log_level 'CRITICAL'"));
    }

    #[test]
    fn minimum_filter_is_a_threshold() {
        let min = LogLevel::Warn;
        assert!(LogLevel::Fail >= min);
        assert!(LogLevel::Error >= min);
        assert!(LogLevel::Warn >= min);
        assert!(LogLevel::Info < min);
    }

    #[test]
    fn serializes_uppercase() {
        assert_eq!(serde_json::to_value(LogLevel::Fail).unwrap(), "FAIL");
    }
}
