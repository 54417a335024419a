//! Suite discovery: scan the suites directory and extract lightweight metadata.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};
use crate::paths::project_relative;

/// One discoverable test suite. Produced fresh on every discovery call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteDescriptor {
    /// Suite name, derived from the file stem.
    pub name: String,
    /// Relative path to the definition file.
    pub file: String,
    /// Suite-level documentation string, possibly empty.
    pub description: String,
}

/// Enumerates `.robot` definition files in `suites_dir`, in lexicographic
/// order by filename. A missing directory is an explicit error value; an
/// empty directory yields an empty list.
pub fn list_suites(suites_dir: &Path) -> Result<Vec<SuiteDescriptor>> {
    if !suites_dir.is_dir() {
        return Err(ToolError::NotFound(format!(
            "Tests directory not found: {}",
            suites_dir.display()
        )));
    }

    let mut files: Vec<_> = fs::read_dir(suites_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "robot"))
        .collect();
    files.sort();

    Ok(files
        .into_iter()
        .map(|path| SuiteDescriptor {
            name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            file: project_relative(&path),
            description: extract_suite_doc(&path),
        })
        .collect())
}

/// Names of the currently discoverable suites; missing directory yields an
/// empty list. Used for the "available suites" hint on a failed lookup.
pub fn suite_names(suites_dir: &Path) -> Vec<String> {
    list_suites(suites_dir)
        .map(|suites| suites.into_iter().map(|s| s.name).collect())
        .unwrap_or_default()
}

/// Extracts the suite-level `Documentation` value from a `.robot` file.
///
/// Only the `*** Settings ***` section is scanned. Continuation lines
/// (`...`) are joined with the primary line by single spaces. Files with no
/// settings section, no documentation, or malformed structure yield an empty
/// string; this never fails.
pub fn extract_suite_doc(robot_file: &Path) -> String {
    let Ok(content) = fs::read_to_string(robot_file) else {
        return String::new();
    };

    let mut doc_lines: Vec<String> = Vec::new();
    let mut in_settings = false;
    let mut capturing = false;

    for raw_line in content.lines() {
        let line = raw_line.trim();

        if line == "*** Settings ***" {
            in_settings = true;
            continue;
        }
        if line.starts_with("*** ") && in_settings {
            break; // left the settings table
        }
        if !in_settings {
            continue;
        }

        if capturing {
            if let Some(rest) = line.strip_prefix("...") {
                doc_lines.push(rest.trim().to_string());
                continue;
            }
            // first non-continuation line ends the documentation value
            capturing = false;
        }

        if line.to_lowercase().starts_with("documentation") {
            let mut parts = line.splitn(2, char::is_whitespace);
            parts.next();
            if let Some(value) = parts.next() {
                doc_lines.push(value.trim().to_string());
            }
            capturing = true;
        }
    }

    doc_lines.join(" ").trim().to_string()
}
