//! Result location: find report artifacts across the suite-scoped directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// All `*/output.xml` artifacts under `results_dir`, most recently modified
/// first. Ties are broken by path so the order is stable within a run.
/// Missing or empty directories yield an empty list, never an error.
pub fn all_reports(results_dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(results_dir) else {
        return Vec::new();
    };

    let mut candidates: Vec<(SystemTime, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path().join("output.xml"))
        .filter(|p| p.is_file())
        .map(|p| {
            let mtime = fs::metadata(&p)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (mtime, p)
        })
        .collect();

    candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    candidates.into_iter().map(|(_, p)| p).collect()
}

/// The most recently produced report artifact, optionally scoped to one
/// suite. "No candidates" is a valid outcome, distinct from error.
pub fn latest_report(results_dir: &Path, suite_name: Option<&str>) -> Option<PathBuf> {
    match suite_name {
        Some(name) => {
            let target = results_dir.join(name).join("output.xml");
            target.is_file().then_some(target)
        }
        None => all_reports(results_dir).into_iter().next(),
    }
}
