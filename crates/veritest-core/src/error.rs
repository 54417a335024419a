//! Error taxonomy shared by every tool operation.

use thiserror::Error;

/// Error type for all core operations.
///
/// Domain errors cross the HTTP boundary as in-band `{"error": ...}` payloads
/// (see [`ToolError::to_payload`]); only request-shape violations are rejected
/// with a non-2xx status at the gateway, before reaching this crate.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Malformed or unsafe caller input, rejected before any filesystem or
    /// process access.
    #[error("{0}")]
    InvalidInput(String),

    /// The named suite has no matching definition file. Carries the set of
    /// currently discoverable suite names so the caller can self-correct.
    #[error("Suite '{name}' not found")]
    SuiteNotFound { name: String, available: Vec<String> },

    /// A required artifact or directory does not exist yet.
    #[error("{0}")]
    NotFound(String),

    /// The engine raised, or exited without producing the expected report.
    /// Distinguished from [`ToolError::MalformedReport`] so callers can tell
    /// "did not run" from "ran but unreadable".
    #[error("Execution failed: {message}")]
    ExecutionFailure {
        message: String,
        return_code: Option<i32>,
        timestamp: String,
    },

    /// The report artifact exists but cannot be read as the expected format.
    #[error("Result parsing failed: {message}")]
    MalformedReport {
        message: String,
        return_code: Option<i32>,
        timestamp: Option<String>,
    },

    /// Unexpected filesystem failure. Reported to callers as a generic
    /// payload; the detail stays in server-side logs.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// The in-band JSON error shape returned to tool callers.
    pub fn to_payload(&self) -> serde_json::Value {
        match self {
            ToolError::SuiteNotFound { available, .. } => serde_json::json!({
                "error": self.to_string(),
                "available_suites": available,
            }),
            ToolError::ExecutionFailure {
                return_code,
                timestamp,
                ..
            } => {
                let mut payload = serde_json::json!({
                    "error": self.to_string(),
                    "timestamp": timestamp,
                });
                if let Some(rc) = return_code {
                    payload["return_code"] = serde_json::json!(rc);
                }
                payload
            }
            ToolError::MalformedReport {
                return_code,
                timestamp,
                ..
            } => {
                let mut payload = serde_json::json!({ "error": self.to_string() });
                if let Some(rc) = return_code {
                    payload["return_code"] = serde_json::json!(rc);
                }
                if let Some(ts) = timestamp {
                    payload["timestamp"] = serde_json::json!(ts);
                }
                payload
            }
            ToolError::Io(_) => serde_json::json!({ "error": "Internal error" }),
            _ => serde_json::json!({ "error": self.to_string() }),
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, ToolError>;
