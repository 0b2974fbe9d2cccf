//! Shape checks for request parameters.

use crate::DocumentError;

/// Check that `filename` is a bare filename.
///
/// # Errors
///
/// Returns [`DocumentError::BadRequest`] if it is empty, is `.` or `..`, or
/// contains a path separator or a NUL byte.
pub fn validate_filename(filename: &str) -> Result<(), DocumentError> {
    if filename.is_empty() {
        return Err(DocumentError::BadRequest("filename is empty".to_owned()));
    }
    if filename.contains(['/', '\\', '\0']) || matches!(filename, "." | "..") {
        return Err(DocumentError::BadRequest(format!(
            "filename must not contain path components: {filename:?}"
        )));
    }
    Ok(())
}

/// Check that `branch` looks like a ref name.
///
/// # Errors
///
/// Returns [`DocumentError::BadRequest`] if it is empty or contains
/// whitespace, control characters or `..`.
pub fn validate_branch(branch: &str) -> Result<(), DocumentError> {
    if branch.is_empty() {
        return Err(DocumentError::BadRequest("branch is empty".to_owned()));
    }
    if branch.contains("..") || branch.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(DocumentError::BadRequest(format!(
            "invalid branch name: {branch:?}"
        )));
    }
    Ok(())
}
