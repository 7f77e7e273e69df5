//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success - every sketch converted
//! - `1`: General error - unspecified failure
//! - `4-8`: Specific failure classes, see [`ExitCode`]
//! - `126-255`: Reserved by shell

use crate::error::ConvertError;

/// Standard exit codes for CLI operations.
///
/// These codes follow Unix conventions where 0 indicates success,
/// and non-zero values indicate various error conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Failed to parse a sketch (code 4)
    ParseError = 4,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,

    /// Operation not supported for this input (code 8)
    UnsupportedOperation = 8,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

impl ExitCode {
    /// Convert a `ConvertError` to the appropriate exit code.
    ///
    /// Maps specific error types to semantic exit codes that scripts
    /// can use to tell failure classes apart.
    pub fn from_error(error: &ConvertError) -> Self {
        match error {
            ConvertError::Parse { .. } => ExitCode::ParseError,
            ConvertError::FileRead { .. }
            | ConvertError::FileWrite { .. }
            | ConvertError::CreateDir { .. } => ExitCode::IoError,
            ConvertError::InvalidFileName { .. } => ExitCode::UnsupportedOperation,
            ConvertError::ParserInit(_) => ExitCode::GeneralError,
        }
    }

    /// Exit code of a batch: the first failure wins, success otherwise.
    pub fn from_results<'a, T, I>(results: I) -> Self
    where
        T: 'a,
        I: IntoIterator<Item = &'a Result<T, ConvertError>>,
    {
        results
            .into_iter()
            .find_map(|result| result.as_ref().err().map(Self::from_error))
            .unwrap_or(ExitCode::Success)
    }

    /// Check if this exit code indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// Code used in JSON envelopes for failures that no `ConvertError`
    /// describes
    pub fn status_code(&self) -> &'static str {
        match self {
            ExitCode::Success => "OK",
            ExitCode::GeneralError => "GENERAL_ERROR",
            ExitCode::ParseError => "PARSE_ERROR",
            ExitCode::IoError => "IO_ERROR",
            ExitCode::ConfigError => "CONFIG_ERROR",
            ExitCode::UnsupportedOperation => "UNSUPPORTED_OPERATION",
        }
    }
}
