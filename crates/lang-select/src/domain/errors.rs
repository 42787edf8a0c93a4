//! Domain-specific errors.

use thiserror::Error;

/// Failures surfaced by the selection layer.
///
/// Extraction and formatting never raise for malformed input; the worst case
/// there is an empty collection or a line treated as narrative. An empty
/// collection is an outcome, not an error.
#[derive(Debug, Error)]
pub enum SelectError {
    /// The requested picker is not installed or could not be spawned.
    #[error("picker tool '{tool}' unavailable: {reason}")]
    ToolUnavailable { tool: String, reason: String },
    /// The picker ran but exited abnormally or produced unusable output.
    #[error("picker tool '{tool}' failed: {reason}")]
    ToolExecution { tool: String, reason: String },
}
