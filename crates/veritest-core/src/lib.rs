//! veritest-core: compliance-suite core (identifier validation, suite discovery,
//! sandboxed execution, report normalization, result location, and log search).
//!
//! Everything here is a pure function of the filesystem's current state plus its
//! inputs; the only durable state is the results tree written by the executor.

mod config;
mod discovery;
mod error;
mod executor;
mod locator;
mod paths;
mod registry;
mod report;
mod severity;
mod validate;

pub use config::CoreConfig;
pub use discovery::{extract_suite_doc, list_suites, suite_names, SuiteDescriptor};
pub use error::{Result, ToolError};
pub use executor::{EngineOutputs, RobotEngine, SuiteExecutor, TestEngine};
pub use locator::{all_reports, latest_report};
pub use paths::project_relative;
pub use registry::{AgentTool, ToolInfo, ToolRegistry};
pub use report::{parse_report, ExecutionReport, SuiteStatus, TestOutcome, TestStatus};
pub use severity::LogLevel;
pub use validate::validate_identifier;

/// Search-result attribution for messages logged outside any test case.
pub const SUITE_LEVEL: &str = "(suite-level)";

pub use report::search::{search_logs, LogEntry};
