//! Execution-report model and the `output.xml` normalizer.

pub mod search;

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

/// Suite-level aggregate verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SuiteStatus {
    Pass,
    Fail,
}

/// Per-test verdict. Engine-native statuses other than PASS are
/// FAIL-equivalent here; SKIP still counts into the aggregate `skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Pass,
    Fail,
}

/// Outcome of a single test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOutcome {
    pub name: String,
    pub status: TestStatus,
    /// Engine message for the test, empty when none.
    pub message: String,
    #[serde(rename = "duration_s")]
    pub duration_seconds: f64,
    pub tags: Vec<String>,
}

/// Canonical, normalized view of one execution report. Derived entirely from
/// a report artifact and never mutated after construction.
///
/// Invariant: `total == passed + failed + skipped`. Counts are derived from
/// the parsed tests, so it holds by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub suite: String,
    pub status: SuiteStatus,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    #[serde(rename = "elapsed_s")]
    pub elapsed_seconds: f64,
    pub tests: Vec<TestOutcome>,
    /// The engine's exit status; present only on reports produced by an
    /// execution, not on historical reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_code: Option<i32>,
    /// UTC execution start time; present only on execution results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Origin report path when read from history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Rounds a seconds value to millisecond precision.
fn round_ms(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

pub(crate) fn attr(element: &BytesStart<'_>, name: &str) -> Option<String> {
    element
        .try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

/// Elapsed seconds of a `<status>` element. Newer engines carry an `elapsed`
/// attribute in seconds; older ones carry `starttime`/`endtime` strings.
fn status_elapsed(element: &BytesStart<'_>) -> f64 {
    if let Some(elapsed) = attr(element, "elapsed") {
        return elapsed.parse().unwrap_or(0.0);
    }
    let (Some(start), Some(end)) = (attr(element, "starttime"), attr(element, "endtime")) else {
        return 0.0;
    };
    let fmt = "%Y%m%d %H:%M:%S%.f";
    match (
        chrono::NaiveDateTime::parse_from_str(&start, fmt),
        chrono::NaiveDateTime::parse_from_str(&end, fmt),
    ) {
        (Ok(s), Ok(e)) => (e - s).num_milliseconds().max(0) as f64 / 1000.0,
        _ => 0.0,
    }
}

fn malformed(message: impl Into<String>) -> ToolError {
    ToolError::MalformedReport {
        message: message.into(),
        return_code: None,
        timestamp: None,
    }
}

#[derive(Default)]
struct PendingTest {
    name: String,
    raw_status: String,
    message: String,
    duration_seconds: f64,
    tags: Vec<String>,
}

#[derive(Default)]
struct ParseState {
    suite_name: Option<String>,
    suite_raw_status: Option<String>,
    suite_elapsed: Option<f64>,
    suite_depth: usize,
    tests: Vec<TestOutcome>,
    passed: usize,
    failed: usize,
    skipped: usize,
    current_test: Option<PendingTest>,
}

impl ParseState {
    /// The parent of a `<status>` element decides what it describes: the
    /// current test, the root suite, or a keyword we do not track.
    fn on_status(&mut self, element: &BytesStart<'_>, parent: Option<&[u8]>) {
        match parent {
            Some(b"test") => {
                if let Some(test) = self.current_test.as_mut() {
                    test.raw_status = attr(element, "status").unwrap_or_default();
                    test.duration_seconds = round_ms(status_elapsed(element));
                }
            }
            Some(b"suite") if self.suite_depth == 1 => {
                self.suite_raw_status = attr(element, "status");
                self.suite_elapsed = Some(round_ms(status_elapsed(element)));
            }
            _ => {}
        }
    }

    fn finish_test(&mut self) {
        let Some(pending) = self.current_test.take() else {
            return;
        };
        match pending.raw_status.as_str() {
            "PASS" => self.passed += 1,
            "SKIP" => self.skipped += 1,
            _ => self.failed += 1,
        }
        self.tests.push(TestOutcome {
            name: pending.name,
            status: if pending.raw_status == "PASS" {
                TestStatus::Pass
            } else {
                TestStatus::Fail
            },
            message: pending.message.trim().to_string(),
            duration_seconds: pending.duration_seconds,
            tags: pending.tags,
        });
    }

    fn into_report(self) -> Result<ExecutionReport> {
        let suite = self
            .suite_name
            .ok_or_else(|| malformed("no <suite> element found"))?;
        let elapsed_seconds = self
            .suite_elapsed
            .unwrap_or_else(|| round_ms(self.tests.iter().map(|t| t.duration_seconds).sum()));
        let status = match self.suite_raw_status.as_deref() {
            Some("PASS") => SuiteStatus::Pass,
            Some(_) => SuiteStatus::Fail,
            None if self.failed == 0 => SuiteStatus::Pass,
            None => SuiteStatus::Fail,
        };
        Ok(ExecutionReport {
            suite,
            status,
            total: self.tests.len(),
            passed: self.passed,
            failed: self.failed,
            skipped: self.skipped,
            elapsed_seconds,
            tests: self.tests,
            return_code: None,
            timestamp: None,
            source: None,
        })
    }
}

/// Parses a report artifact from disk into the canonical result record.
pub fn parse_report(path: &Path) -> Result<ExecutionReport> {
    let xml = fs::read_to_string(path).map_err(|e| ToolError::MalformedReport {
        message: format!("cannot read {}: {e}", path.display()),
        return_code: None,
        timestamp: None,
    })?;
    parse_report_str(&xml)
}

pub(crate) fn parse_report_str(xml: &str) -> Result<ExecutionReport> {
    let mut reader = Reader::from_str(xml);
    let mut state = ParseState::default();

    // Open-element stack; only names matter for parent lookups.
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut capturing_message = false;
    let mut capturing_tag = false;
    let mut tag_buf = String::new();

    loop {
        match reader.read_event() {
            Err(e) => return Err(malformed(e.to_string())),
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let local = e.local_name().as_ref().to_vec();
                match local.as_slice() {
                    b"suite" => {
                        state.suite_depth += 1;
                        if state.suite_name.is_none() {
                            state.suite_name = attr(&e, "name");
                        }
                    }
                    b"test" => {
                        state.current_test = Some(PendingTest {
                            name: attr(&e, "name").unwrap_or_default(),
                            ..PendingTest::default()
                        });
                    }
                    b"status" => {
                        let parent = stack.last().map(|v| v.as_slice());
                        capturing_message =
                            state.current_test.is_some() && parent == Some(b"test");
                        state.on_status(&e, parent);
                    }
                    b"tag" => {
                        if state.current_test.is_some() {
                            capturing_tag = true;
                            tag_buf.clear();
                        }
                    }
                    _ => {}
                }
                stack.push(local);
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"status" {
                    state.on_status(&e, stack.last().map(|v| v.as_slice()));
                }
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| malformed(e.to_string()))?;
                if capturing_message {
                    if let Some(test) = state.current_test.as_mut() {
                        test.message.push_str(&text);
                    }
                } else if capturing_tag {
                    tag_buf.push_str(&text);
                }
            }
            Ok(Event::End(e)) => {
                match e.local_name().as_ref() {
                    b"suite" => state.suite_depth = state.suite_depth.saturating_sub(1),
                    b"status" => capturing_message = false,
                    b"tag" => {
                        if capturing_tag {
                            let tag = tag_buf.trim().to_string();
                            if !tag.is_empty() {
                                if let Some(test) = state.current_test.as_mut() {
                                    test.tags.push(tag);
                                }
                            }
                            capturing_tag = false;
                        }
                    }
                    b"test" => state.finish_test(),
                    _ => {}
                }
                stack.pop();
            }
            Ok(_) => {}
        }
    }

    state.into_report()
}
