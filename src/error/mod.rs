// Error types for the approval workflow
//
// This module defines custom error types for golden-master comparison,
// providing structured error handling with stable numeric error codes.

mod approval;

pub use approval::{log_approval_error, ApprovalError, ApprovalErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
