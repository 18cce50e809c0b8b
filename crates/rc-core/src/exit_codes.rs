//! Exit codes for the rc-core CLI.
//!
//! Exit codes communicate the outcome of a run without requiring output
//! parsing.
//!
//! Exit code ranges:
//! - 0-1: Operational outcomes (clean run, partial run)
//! - 10-19: User/input errors (recoverable by fixing arguments or files)
//! - 20-29: Internal errors (bugs, I/O)

use rc_common::{Error, ErrorCategory};

/// Exit codes for rc-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Operational Outcomes (0-1)
    // ========================================================================
    /// Every requested patient was generated
    Clean = 0,

    /// Some diseases or patients were skipped
    PartialRun = 1,

    // ========================================================================
    // User / Input Errors (10-19)
    // ========================================================================
    /// Invalid arguments
    ArgsError = 10,

    /// Ontology or annotation input is malformed
    InputError = 11,

    /// Sampling configuration is invalid
    ConfigError = 12,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Clean and partial runs both produced output.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean | ExitCode::PartialRun)
    }

    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::PartialRun => "OK_PARTIAL",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Exit code for a fatal error.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Io(_) => ExitCode::IoError,
            Error::Json(_) => ExitCode::InputError,
            Error::UnknownDisease { .. } => ExitCode::ArgsError,
            _ => match err.category() {
                ErrorCategory::Config => ExitCode::ConfigError,
                ErrorCategory::Ontology | ErrorCategory::Annotation => ExitCode::InputError,
                ErrorCategory::Sampling => ExitCode::InputError,
                ErrorCategory::Io => ExitCode::IoError,
            },
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
