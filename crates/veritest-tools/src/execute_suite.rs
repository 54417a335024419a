//! Tool 2: suite execution.

use async_trait::async_trait;

use veritest_core::{AgentTool, Result, SuiteExecutor, ToolError};

use crate::required_str;

const TOOL_NAME: &str = "execute_test_suite";

/// Runs one suite through the configured engine and returns its normalized
/// report. Payload: `{ "suite_name": "<stem of the .robot file>" }`.
pub struct ExecuteSuite {
    executor: SuiteExecutor,
}

impl ExecuteSuite {
    pub fn new(executor: SuiteExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl AgentTool for ExecuteSuite {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Run a test suite and return results."
    }

    async fn execute(&self, payload: Option<serde_json::Value>) -> Result<serde_json::Value> {
        let suite_name = required_str(&payload, "suite_name")?;
        tracing::info!(suite = %suite_name, "{TOOL_NAME} called");
        let report = self.executor.execute(&suite_name).await?;
        serde_json::to_value(&report)
            .map_err(|e| ToolError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::process::ExitStatusExt;
    use std::path::Path;
    use std::process::{ExitStatus, Output};
    use std::sync::Arc;

    use veritest_core::{EngineOutputs, TestEngine};

    const REPORT: &str = r#"<robot>
<suite id="s1" name="demo">
<test id="s1-t1" name="Only Check">
<status status="PASS" elapsed="0.02"/>
</test>
<status status="PASS" elapsed="0.03"/>
</suite>
</robot>"#;

    struct StubEngine;

    #[async_trait]
    impl TestEngine for StubEngine {
        async fn run(
            &self,
            _suite_file: &Path,
            outputs: &EngineOutputs,
        ) -> std::io::Result<Output> {
            fs::write(&outputs.report, REPORT)?;
            Ok(Output {
                status: ExitStatus::from_raw(0),
                stdout: Vec::new(),
                stderr: Vec::new(),
            })
        }
    }

    fn fixture() -> (tempfile::TempDir, ExecuteSuite) {
        let dir = tempfile::tempdir().unwrap();
        let suites = dir.path().join("suites");
        fs::create_dir_all(&suites).unwrap();
        fs::write(suites.join("demo.robot"), "*** Test Cases ***\n").unwrap();
        let executor =
            SuiteExecutor::new(suites, dir.path().join("results"), Arc::new(StubEngine));
        (dir, ExecuteSuite::new(executor))
    }

    #[tokio::test]
    async fn payload_must_carry_a_suite_name() {
        let (_dir, tool) = fixture();
        for payload in [None, Some(serde_json::json!({})), Some(serde_json::json!({"suite_name": 7}))] {
            let err = tool.execute(payload).await.unwrap_err();
            assert!(matches!(err, ToolError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn execution_result_is_wire_shaped() {
        let (_dir, tool) = fixture();
        let out = tool
            .execute(Some(serde_json::json!({"suite_name": "demo"})))
            .await
            .unwrap();
        assert_eq!(out["suite"], "demo");
        assert_eq!(out["status"], "PASS");
        assert_eq!(out["passed"], 1);
        assert_eq!(out["return_code"], 0);
        assert!(out["timestamp"].is_string());
        assert_eq!(out["tests"][0]["duration_s"], 0.02);
    }
}
