//! Tool 4: log search.

use std::path::PathBuf;

use async_trait::async_trait;

use veritest_core::{search_logs, AgentTool, LogLevel, Result, ToolError};

use crate::{optional_str, required_str};

const TOOL_NAME: &str = "search_test_logs";
const MAX_KEYWORD_LEN: usize = 200;

/// Searches every historical report artifact for log messages matching a
/// keyword at or above a severity. Payload:
/// `{ "keyword": "<substring>", "log_level": "FAIL" }`; `log_level` defaults
/// to FAIL when omitted.
pub struct SearchLogs {
    results_dir: PathBuf,
}

impl SearchLogs {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }
}

/// Keywords are free text, but never null bytes and never unbounded.
fn validate_keyword(keyword: &str) -> Result<()> {
    if keyword.contains('\0') {
        return Err(ToolError::InvalidInput(
            "keyword contains invalid characters".to_string(),
        ));
    }
    if keyword.chars().count() > MAX_KEYWORD_LEN {
        return Err(ToolError::InvalidInput(
            "keyword is too long (max 200 characters)".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl AgentTool for SearchLogs {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Search log messages by keyword and level."
    }

    async fn execute(&self, payload: Option<serde_json::Value>) -> Result<serde_json::Value> {
        let keyword = required_str(&payload, "keyword")?;
        validate_keyword(&keyword)?;
        let min_level = match optional_str(&payload, "log_level") {
            Some(level) => LogLevel::parse(&level)?,
            None => LogLevel::Fail,
        };
        tracing::info!(keyword = %keyword, level = %min_level, "{TOOL_NAME} called");

        let matches = search_logs(&self.results_dir, &keyword, min_level)?;
        tracing::info!("{TOOL_NAME} found {} match(es)", matches.len());
        serde_json::to_value(&matches)
            .map_err(|e| ToolError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const REPORT: &str = r#"<robot>
<suite id="s1" name="disk_encryption">
<test id="s1-t1" name="Volume Encrypted">
<msg timestamp="20260105 12:00:00.000" level="FAIL">Volume C: is not encrypted</msg>
<status status="FAIL" elapsed="0.2"/>
</test>
<test id="s1-t2" name="Key Escrow">
<msg timestamp="20260105 12:00:00.500" level="INFO">recovery key archived</msg>
<status status="PASS" elapsed="0.1"/>
</test>
<status status="FAIL" elapsed="0.4"/>
</suite>
</robot>"#;

    fn fixture() -> (tempfile::TempDir, SearchLogs) {
        let dir = tempfile::tempdir().unwrap();
        let suite_dir = dir.path().join("disk_encryption");
        fs::create_dir_all(&suite_dir).unwrap();
        fs::write(suite_dir.join("output.xml"), REPORT).unwrap();
        let tool = SearchLogs::new(dir.path().to_path_buf());
        (dir, tool)
    }

    #[tokio::test]
    async fn level_defaults_to_fail() {
        let (_dir, tool) = fixture();
        let out = tool
            .execute(Some(serde_json::json!({"keyword": ""})))
            .await
            .unwrap();
        let entries = out.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["level"], "FAIL");
        assert_eq!(entries[0]["test"], "Volume Encrypted");
    }

    #[tokio::test]
    async fn explicit_level_widens_the_search() {
        let (_dir, tool) = fixture();
        let out = tool
            .execute(Some(serde_json::json!({"keyword": "", "log_level": "info"})))
            .await
            .unwrap();
        assert_eq!(out.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn keyword_is_required() {
        let (_dir, tool) = fixture();
        let err = tool.execute(Some(serde_json::json!({}))).await.unwrap_err();
        assert_eq!(err.to_string(), "keyword is required");
    }

    #[tokio::test]
    async fn keyword_guards_reject_nul_and_oversize() {
        let (_dir, tool) = fixture();

        let err = tool
            .execute(Some(serde_json::json!({"keyword": "bad\u{0}byte"})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "keyword contains invalid characters");

        let long = "x".repeat(201);
        let err = tool
            .execute(Some(serde_json::json!({"keyword": long})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "keyword is too long (max 200 characters)");

        let exact = "x".repeat(200);
        assert!(tool
            .execute(Some(serde_json::json!({"keyword": exact})))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn unknown_level_is_rejected_with_the_valid_set() {
        let (_dir, tool) = fixture();
        let err = tool
            .execute(Some(serde_json::json!({"keyword": "x", "log_level": "LOUD"})))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid log_level 'LOUD'. Must be one of: DEBUG, ERROR, FAIL, INFO, TRACE, WARN"
        );
    }

    #[tokio::test]
    async fn no_artifacts_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let tool = SearchLogs::new(dir.path().to_path_buf());
        let err = tool
            .execute(Some(serde_json::json!({"keyword": "x"})))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No output.xml files found. Run execute_test_suite first."
        );
    }
}
