//! Path presentation for caller-facing fields.

use std::path::Path;

/// Renders a path for a tool response: relative to the process working
/// directory when it lies inside it, unchanged otherwise. Configured
/// relative directories already render relative and pass through untouched.
pub fn project_relative(path: &Path) -> String {
    match std::env::current_dir() {
        Ok(root) => path.strip_prefix(&root).unwrap_or(path).display().to_string(),
        Err(_) => path.display().to_string(),
    }
}
