// Approval error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;
use std::path::{Path, PathBuf};

/// Approval error code constants
///
/// Single source of truth for the numeric codes reported by
/// [`ApprovalError::code`].
///
/// Error code range: 3001-3003
pub struct ApprovalErrorCodes {}

impl ApprovalErrorCodes {
    /// Reference (`.ok`) file does not exist
    pub const MISSING_REFERENCE: i32 = 3001;

    /// Captured output differs from the reference file
    pub const CONTENT_MISMATCH: i32 = 3002;

    /// Reading or writing an approval artifact failed
    pub const IO_FAILURE: i32 = 3003;
}

/// Log an approval error with structured context
///
/// This function logs approval errors with structured fields including:
/// - error_code: Numeric error code for programmatic handling
/// - component: The component where the error occurred
/// - message: Human-readable error message
/// - context: Additional contextual information
pub fn log_approval_error(err: &ApprovalError, context: &str) {
    error!(
        "Approval error in {}: code={}, component=ApprovalSession, message={}",
        context,
        err.code(),
        err.message().lines().next().unwrap_or_default()
    );
}

/// Approval-related errors
///
/// Both verdict failures (`MissingReference`, `ContentMismatch`) are raised
/// only after the received artifact has been written.
///
/// Error code ranges: 3001-3003
#[derive(Debug, Clone, PartialEq)]
pub enum ApprovalError {
    /// Reference file is absent; the capture was written to `received`
    MissingReference { approved: PathBuf, received: PathBuf },

    /// Capture differs from the reference; `diff` is a unified diff
    ContentMismatch { diff: String, received: PathBuf },

    /// Artifact could not be read or written
    Io { path: PathBuf, details: String },
}

impl ApprovalError {
    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        ApprovalError::Io {
            path: path.to_path_buf(),
            details: err.to_string(),
        }
    }

    /// Path of the received artifact written for a failed verdict.
    pub fn received_path(&self) -> Option<&Path> {
        match self {
            ApprovalError::MissingReference { received, .. }
            | ApprovalError::ContentMismatch { received, .. } => Some(received),
            _ => None,
        }
    }
}

impl ErrorCode for ApprovalError {
    fn code(&self) -> i32 {
        match self {
            ApprovalError::MissingReference { .. } => ApprovalErrorCodes::MISSING_REFERENCE,
            ApprovalError::ContentMismatch { .. } => ApprovalErrorCodes::CONTENT_MISMATCH,
            ApprovalError::Io { .. } => ApprovalErrorCodes::IO_FAILURE,
        }
    }

    fn message(&self) -> String {
        match self {
            ApprovalError::MissingReference { approved, .. } => {
                format!("Missing {} file!", approved.display())
            }
            ApprovalError::ContentMismatch { diff, .. } => {
                format!("Content does not match:\n{}", diff)
            }
            ApprovalError::Io { path, details } => {
                format!("I/O failure on {}: {}", path.display(), details)
            }
        }
    }
}

impl fmt::Display for ApprovalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApprovalError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for ApprovalError {}
