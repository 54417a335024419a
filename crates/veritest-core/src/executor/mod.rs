//! Sandboxed suite execution.
//!
//! Suite names are validated and resolved against the configured suites
//! directory before anything touches a process; callers can never address a
//! file outside that tree. Each run writes its artifacts into a per-suite
//! subdirectory of the results tree, overwriting the previous run.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::discovery;
use crate::error::{Result, ToolError};
use crate::report::{self, ExecutionReport};
use crate::validate::validate_identifier;

/// Artifact paths handed to the engine for one run.
#[derive(Debug, Clone)]
pub struct EngineOutputs {
    /// Machine-readable report the executor parses afterwards.
    pub report: PathBuf,
    /// Human-readable execution log.
    pub log: PathBuf,
    /// Human-readable summary report.
    pub html_report: PathBuf,
}

/// Seam between the executor and the concrete engine process, so execution
/// flow can be tested without a real engine installed.
#[async_trait]
pub trait TestEngine: Send + Sync {
    async fn run(&self, suite_file: &Path, outputs: &EngineOutputs) -> std::io::Result<Output>;
}

/// Runs the Robot Framework CLI as a child process.
#[derive(Debug, Clone)]
pub struct RobotEngine {
    command: String,
}

impl RobotEngine {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl TestEngine for RobotEngine {
    async fn run(&self, suite_file: &Path, outputs: &EngineOutputs) -> std::io::Result<Output> {
        // Callers may drop this future on a timeout; the child must not keep
        // writing into the artifact directory after that.
        tokio::process::Command::new(&self.command)
            .kill_on_drop(true)
            .arg("--output")
            .arg(&outputs.report)
            .arg("--log")
            .arg(&outputs.log)
            .arg("--report")
            .arg(&outputs.html_report)
            .arg(suite_file)
            .output()
            .await
    }
}

/// Resolves, runs, and reports a single suite execution.
pub struct SuiteExecutor {
    suites_dir: PathBuf,
    results_dir: PathBuf,
    engine: Arc<dyn TestEngine>,
}

impl SuiteExecutor {
    pub fn new(
        suites_dir: impl Into<PathBuf>,
        results_dir: impl Into<PathBuf>,
        engine: Arc<dyn TestEngine>,
    ) -> Self {
        Self {
            suites_dir: suites_dir.into(),
            results_dir: results_dir.into(),
            engine,
        }
    }

    /// Executes `suite_name` and returns its normalized report, stamped with
    /// the engine's exit code and the UTC start time of this run.
    pub async fn execute(&self, suite_name: &str) -> Result<ExecutionReport> {
        validate_identifier(suite_name, "suite_name", false)?;

        let suite_file = self.suites_dir.join(format!("{suite_name}.robot"));
        if !suite_file.is_file() {
            return Err(ToolError::SuiteNotFound {
                name: suite_name.to_string(),
                available: discovery::suite_names(&self.suites_dir),
            });
        }

        let out_dir = self.results_dir.join(suite_name);
        std::fs::create_dir_all(&out_dir)?;
        let outputs = EngineOutputs {
            report: out_dir.join("output.xml"),
            log: out_dir.join("log.html"),
            html_report: out_dir.join("report.html"),
        };

        let timestamp = Utc::now().to_rfc3339();
        tracing::info!(suite = suite_name, "executing test suite");

        let output = self
            .engine
            .run(&suite_file, &outputs)
            .await
            .map_err(|e| ToolError::ExecutionFailure {
                message: format!("Failed to launch test engine: {e}"),
                return_code: None,
                timestamp: timestamp.clone(),
            })?;
        let return_code = output.status.code();

        if !outputs.report.is_file() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let mut message =
                String::from("output.xml was not created, execution may have crashed");
            if !stderr.is_empty() {
                message.push_str(": ");
                message.push_str(stderr);
            }
            tracing::error!(suite = suite_name, ?return_code, "engine produced no report");
            return Err(ToolError::ExecutionFailure {
                message,
                return_code,
                timestamp,
            });
        }

        let mut parsed = report::parse_report(&outputs.report).map_err(|e| match e {
            ToolError::MalformedReport { message, .. } => ToolError::MalformedReport {
                message,
                return_code,
                timestamp: Some(timestamp.clone()),
            },
            other => other,
        })?;
        parsed.return_code = return_code;
        parsed.timestamp = Some(timestamp);
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    const PASSING_REPORT: &str = r#"<robot>
<suite id="s1" name="demo">
<test id="s1-t1" name="First Check">
<status status="PASS" elapsed="0.05"/>
</test>
<status status="PASS" elapsed="0.06"/>
</suite>
</robot>"#;

    fn exit(code: i32) -> ExitStatus {
        ExitStatus::from_raw(code << 8)
    }

    /// Writes a canned report like a real engine run would.
    struct StubEngine {
        xml: &'static str,
        exit_code: i32,
    }

    #[async_trait]
    impl TestEngine for StubEngine {
        async fn run(
            &self,
            _suite_file: &Path,
            outputs: &EngineOutputs,
        ) -> std::io::Result<Output> {
            fs::write(&outputs.report, self.xml)?;
            Ok(Output {
                status: exit(self.exit_code),
                stdout: Vec::new(),
                stderr: Vec::new(),
            })
        }
    }

    /// Exits without writing any artifact, like an interpreter crash.
    struct CrashEngine;

    #[async_trait]
    impl TestEngine for CrashEngine {
        async fn run(
            &self,
            _suite_file: &Path,
            _outputs: &EngineOutputs,
        ) -> std::io::Result<Output> {
            Ok(Output {
                status: exit(252),
                stdout: Vec::new(),
                stderr: b"Traceback (most recent call last)".to_vec(),
            })
        }
    }

    /// The engine binary itself cannot be spawned.
    struct MissingEngine;

    #[async_trait]
    impl TestEngine for MissingEngine {
        async fn run(
            &self,
            _suite_file: &Path,
            _outputs: &EngineOutputs,
        ) -> std::io::Result<Output> {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No such file or directory",
            ))
        }
    }

    fn fixture(engine: Arc<dyn TestEngine>) -> (tempfile::TempDir, SuiteExecutor) {
        let dir = tempfile::tempdir().unwrap();
        let suites = dir.path().join("suites");
        fs::create_dir_all(&suites).unwrap();
        fs::write(suites.join("demo.robot"), "*** Test Cases ***\n").unwrap();
        let executor = SuiteExecutor::new(suites, dir.path().join("results"), engine);
        (dir, executor)
    }

    #[tokio::test]
    async fn execute_returns_stamped_report() {
        let (_dir, executor) = fixture(Arc::new(StubEngine {
            xml: PASSING_REPORT,
            exit_code: 0,
        }));
        let report = executor.execute("demo").await.unwrap();
        assert_eq!(report.suite, "demo");
        assert_eq!(report.total, 1);
        assert_eq!(report.passed, 1);
        assert_eq!(report.return_code, Some(0));
        let ts = report.timestamp.unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[tokio::test]
    async fn unknown_suite_lists_available_alternatives() {
        let (_dir, executor) = fixture(Arc::new(CrashEngine));
        let err = executor.execute("missing").await.unwrap_err();
        match err {
            ToolError::SuiteNotFound { name, available } => {
                assert_eq!(name, "missing");
                assert_eq!(available, vec!["demo".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsafe_names_are_rejected_before_resolution() {
        let (_dir, executor) = fixture(Arc::new(CrashEngine));
        for name in ["../demo", "demo;rm", "a/b", "demo$HOME"] {
            let err = executor.execute(name).await.unwrap_err();
            assert!(matches!(err, ToolError::InvalidInput(_)), "accepted {name}");
        }
    }

    #[tokio::test]
    async fn missing_report_becomes_execution_failure() {
        let (_dir, executor) = fixture(Arc::new(CrashEngine));
        let err = executor.execute("demo").await.unwrap_err();
        match err {
            ToolError::ExecutionFailure {
                message,
                return_code,
                ..
            } => {
                assert!(message.contains("output.xml was not created"));
                assert!(message.contains("Traceback"));
                assert_eq!(return_code, Some(252));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparseable_report_keeps_run_metadata() {
        let (_dir, executor) = fixture(Arc::new(StubEngine {
            xml: "<robot><suite name=\"demo\"></test></robot>",
            exit_code: 1,
        }));
        let err = executor.execute("demo").await.unwrap_err();
        match err {
            ToolError::MalformedReport {
                return_code,
                timestamp,
                ..
            } => {
                assert_eq!(return_code, Some(1));
                assert!(timestamp.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn dropped_execution_kills_the_engine_process() {
        use std::os::unix::fs::PermissionsExt;
        use std::time::Duration;

        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("engine.pid");
        let script = dir.path().join("fake-engine");
        fs::write(
            &script,
            format!("#!/bin/sh\necho $$ > {}\nexec sleep 60\n", pid_file.display()),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let suites = dir.path().join("suites");
        fs::create_dir_all(&suites).unwrap();
        fs::write(suites.join("demo.robot"), "*** Test Cases ***\n").unwrap();
        let executor = SuiteExecutor::new(
            suites,
            dir.path().join("results"),
            Arc::new(RobotEngine::new(script.display().to_string())),
        );

        let outcome =
            tokio::time::timeout(Duration::from_millis(500), executor.execute("demo")).await;
        assert!(outcome.is_err(), "engine should still be sleeping");

        let pid: u32 = fs::read_to_string(&pid_file).unwrap().trim().parse().unwrap();
        let proc_entry = format!("/proc/{pid}/stat");
        let mut reaped = false;
        for _ in 0..100 {
            let alive = match fs::read_to_string(&proc_entry) {
                // A zombie has been killed, just not reaped yet.
                Ok(stat) => !stat.contains(") Z"),
                Err(_) => false,
            };
            if !alive {
                reaped = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(reaped, "engine process survived the dropped execution");
    }

    #[tokio::test]
    async fn launch_failure_has_no_return_code() {
        let (_dir, executor) = fixture(Arc::new(MissingEngine));
        let err = executor.execute("demo").await.unwrap_err();
        match err {
            ToolError::ExecutionFailure {
                message,
                return_code,
                ..
            } => {
                assert!(message.contains("Failed to launch test engine"));
                assert_eq!(return_code, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
