//! Structured error handling and exit codes.

use serde::Serialize;

use crate::scanner::TraversalError;

/// Exit codes for the halcyon binary.
///
/// - 0: Success (completed normally, duplicates found)
/// - 1: General error (configuration, access or any other failure)
/// - 2: No duplicates found (completed normally, no duplicates)
/// - 130: Interrupted (Ctrl+C or scan timeout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Scan completed and duplicates were found.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Interrupted: Scan was cancelled before completion.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "HC000",
            Self::GeneralError => "HC001",
            Self::NoDuplicates => "HC002",
            Self::Interrupted => "HC130",
        }
    }

    /// Exit code for a failed run.
    ///
    /// A cancelled traversal anywhere in the error chain maps to
    /// `Interrupted`; everything else is a `GeneralError`.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        let cancelled = err
            .chain()
            .filter_map(|cause| cause.downcast_ref::<TraversalError>())
            .any(TraversalError::is_cancelled);
        if cancelled {
            Self::Interrupted
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "HC001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including causes
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
