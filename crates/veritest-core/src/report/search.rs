//! Log search across historical report artifacts.
//!
//! The report format only links parent to child, so the enclosing test for a
//! message is recovered from the open-element context maintained during a
//! single streaming walk of each artifact.

use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};
use crate::locator;
use crate::report::attr;
use crate::severity::LogLevel;
use crate::SUITE_LEVEL;

/// One matching log message. Constructed only as search output, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub suite: String,
    /// Owning test name, or [`SUITE_LEVEL`] when no enclosing test exists.
    pub test: String,
    pub level: LogLevel,
    /// Engine-native timestamp string, not reparsed.
    pub timestamp: String,
    pub message: String,
}

/// Scans every historical report artifact for messages matching `keyword`
/// (case-insensitive substring; empty matches everything) at `min_level` or
/// more severe. Artifacts are visited newest-modified first; within one
/// artifact, messages appear in document order.
///
/// Individual malformed artifacts are skipped with a warning, not fatal.
pub fn search_logs(results_dir: &Path, keyword: &str, min_level: LogLevel) -> Result<Vec<LogEntry>> {
    let artifacts = locator::all_reports(results_dir);
    if artifacts.is_empty() {
        return Err(ToolError::NotFound(
            "No output.xml files found. Run execute_test_suite first.".to_string(),
        ));
    }

    let keyword_lower = keyword.to_lowercase();
    let mut matches = Vec::new();

    for artifact in artifacts {
        let suite = artifact
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let xml = match fs::read_to_string(&artifact) {
            Ok(xml) => xml,
            Err(e) => {
                tracing::warn!("Skipping unreadable report {}: {}", artifact.display(), e);
                continue;
            }
        };
        // Matches found before a mid-document breakage must not leak out, so
        // each artifact is searched into its own buffer first.
        let mut artifact_matches = Vec::new();
        match search_artifact(&xml, &suite, &keyword_lower, min_level, &mut artifact_matches) {
            Ok(()) => matches.extend(artifact_matches),
            Err(e) => {
                tracing::warn!("Skipping malformed report {}: {}", artifact.display(), e);
            }
        }
    }

    Ok(matches)
}

struct PendingMessage {
    level: Option<LogLevel>,
    timestamp: String,
    text: String,
}

fn search_artifact(
    xml: &str,
    suite: &str,
    keyword_lower: &str,
    min_level: LogLevel,
    out: &mut Vec<LogEntry>,
) -> std::result::Result<(), quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    // Names of the currently open test cases; the innermost one owns any
    // message encountered before its end tag.
    let mut open_tests: Vec<String> = Vec::new();
    let mut pending: Option<PendingMessage> = None;

    let mut emit = |pending: PendingMessage, open_tests: &[String]| {
        let Some(level) = pending.level else {
            return;
        };
        if level < min_level {
            return;
        }
        if !keyword_lower.is_empty() && !pending.text.to_lowercase().contains(keyword_lower) {
            return;
        }
        out.push(LogEntry {
            suite: suite.to_string(),
            test: open_tests
                .last()
                .cloned()
                .unwrap_or_else(|| SUITE_LEVEL.to_string()),
            level,
            timestamp: pending.timestamp,
            message: pending.text.trim().to_string(),
        });
    };

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) => match e.local_name().as_ref() {
                b"test" => open_tests.push(attr(&e, "name").unwrap_or_default()),
                b"msg" => {
                    pending = Some(PendingMessage {
                        level: attr(&e, "level").and_then(|l| LogLevel::parse(&l).ok()),
                        timestamp: attr(&e, "timestamp")
                            .or_else(|| attr(&e, "time"))
                            .unwrap_or_default(),
                        text: String::new(),
                    });
                }
                _ => {}
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"msg" {
                    emit(
                        PendingMessage {
                            level: attr(&e, "level").and_then(|l| LogLevel::parse(&l).ok()),
                            timestamp: attr(&e, "timestamp")
                                .or_else(|| attr(&e, "time"))
                                .unwrap_or_default(),
                            text: String::new(),
                        },
                        &open_tests,
                    );
                }
            }
            Event::Text(t) => {
                if let Some(msg) = pending.as_mut() {
                    msg.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some(msg) = pending.as_mut() {
                    msg.text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"test" => {
                    open_tests.pop();
                }
                b"msg" => {
                    if let Some(msg) = pending.take() {
                        emit(msg, &open_tests);
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }
    Ok(())
}
