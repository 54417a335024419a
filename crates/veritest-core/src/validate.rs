//! Identifier validation: the single shared gate in front of every filesystem
//! path build and process invocation.

use crate::error::{Result, ToolError};

/// Characters that must never appear in an externally supplied identifier.
const FORBIDDEN: &[char] = &[
    '/', '\\', ';', '|', '&', '$', '`', '<', '>', '"', '\'', '\0',
];

/// Maximum identifier length (leading letter plus 63 more characters).
const MAX_LEN: usize = 64;

/// Checks that `value` is safe to interpolate into a filesystem path or hand
/// toward a subprocess. Returns the value unchanged on success; no
/// normalization is performed.
///
/// Call this at every boundary that touches the filesystem or the process
/// layer. Never trust a value's having passed validation in a different layer.
pub fn validate_identifier<'a>(value: &'a str, field: &str, allow_empty: bool) -> Result<&'a str> {
    if value.is_empty() {
        if allow_empty {
            return Ok(value);
        }
        return Err(ToolError::InvalidInput(format!("{field} cannot be empty")));
    }
    if value.contains("..") || value.chars().any(|c| FORBIDDEN.contains(&c)) {
        return Err(ToolError::InvalidInput(format!(
            "{field} contains forbidden characters. \
             Only alphanumeric characters and underscores are allowed."
        )));
    }
    let mut chars = value.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !starts_with_letter || !rest_ok || value.len() > MAX_LEN {
        return Err(ToolError::InvalidInput(format!(
            "{field} must start with a letter and contain only \
             alphanumeric characters and underscores (max 64 chars)."
        )));
    }
    Ok(value)
}
