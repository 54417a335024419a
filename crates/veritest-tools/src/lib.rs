//! Agent-facing tools over the compliance-suite core.
//!
//! Four tools, dispatched by name through [`ToolRegistry`]:
//!
//!   1. `list_available_tests` — discover suite definitions and their docs.
//!   2. `execute_test_suite`   — run a suite and return structured results.
//!   3. `get_latest_results`   — re-read the most recent report artifact.
//!   4. `search_test_logs`     — search historical log messages by keyword
//!      and severity.

pub use veritest_core::{AgentTool, ToolInfo, ToolRegistry};

mod execute_suite;
mod latest_results;
mod search_logs;

pub use execute_suite::ExecuteSuite;
pub use latest_results::LatestResults;
pub use list_tests::ListTests;
pub use search_logs::SearchLogs;

use std::sync::Arc;

use veritest_core::{CoreConfig, Result, SuiteExecutor, TestEngine, ToolError};

/// Builds the standard four-tool registry from configuration.
pub fn standard_registry(config: &CoreConfig, engine: Arc<dyn TestEngine>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(ListTests::new(config.suites_path())));
    registry.register(Arc::new(ExecuteSuite::new(SuiteExecutor::new(
        config.suites_path(),
        config.results_path(),
        engine,
    ))));
    registry.register(Arc::new(LatestResults::new(config.results_path())));
    registry.register(Arc::new(SearchLogs::new(config.results_path())));
    registry
}

/// Pulls a required string field out of a tool payload.
pub(crate) fn required_str(payload: &Option<serde_json::Value>, key: &str) -> Result<String> {
    payload
        .as_ref()
        .and_then(|p| p.get(key))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| ToolError::InvalidInput(format!("{key} is required")))
}

/// Pulls an optional string field out of a tool payload. An explicit empty
/// string is treated as absent.
pub(crate) fn optional_str(payload: &Option<serde_json::Value>, key: &str) -> Option<String> {
    payload
        .as_ref()
        .and_then(|p| p.get(key))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
