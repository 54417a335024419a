//! Tool 3: historical result retrieval.

use std::path::PathBuf;

use async_trait::async_trait;

use veritest_core::{
    latest_report, parse_report, project_relative, validate_identifier, AgentTool, Result,
    ToolError,
};

use crate::optional_str;

const TOOL_NAME: &str = "get_latest_results";

/// Re-reads the most recent report artifact and returns its normalized view.
/// Payload: `{ "suite_name": "<name>" }` to scope to one suite; omit or pass
/// an empty string for the most recent result across all suites.
pub struct LatestResults {
    results_dir: PathBuf,
}

impl LatestResults {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }
}

#[async_trait]
impl AgentTool for LatestResults {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Parse the most recent output.xml."
    }

    async fn execute(&self, payload: Option<serde_json::Value>) -> Result<serde_json::Value> {
        let suite_name = optional_str(&payload, "suite_name");
        if let Some(name) = suite_name.as_deref() {
            validate_identifier(name, "suite_name", false)?;
        }
        tracing::info!(suite = ?suite_name, "{TOOL_NAME} called");

        let Some(artifact) = latest_report(&self.results_dir, suite_name.as_deref()) else {
            let scope = suite_name
                .as_deref()
                .map(|n| format!(" for suite '{n}'"))
                .unwrap_or_default();
            return Err(ToolError::NotFound(format!(
                "No output.xml found{scope}. Run execute_test_suite first."
            )));
        };

        let mut report = parse_report(&artifact)?;
        report.source = Some(project_relative(&artifact));
        serde_json::to_value(&report)
            .map_err(|e| ToolError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}
