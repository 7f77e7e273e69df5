//! Error types for sketch conversion
//!
//! This module provides structured error types using thiserror so that every
//! failure carries the offending path and an actionable message.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for converting a single sketch
#[derive(Error, Debug)]
pub enum ConvertError {
    /// File system errors
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create output directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot derive an output name from '{path}'")]
    InvalidFileName { path: PathBuf },

    /// Parsing errors
    #[error("{0}")]
    ParserInit(ParseError),

    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: ParseError,
    },
}

impl ConvertError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::FileWrite { .. } => "FILE_WRITE_ERROR",
            Self::CreateDir { .. } => "CREATE_DIR_ERROR",
            Self::InvalidFileName { .. } => "INVALID_FILE_NAME",
            Self::ParserInit(_) => "PARSER_INIT_ERROR",
            Self::Parse { .. } => "PARSE_ERROR",
        }
        .to_string()
    }

    /// Path of the file or directory the error refers to
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::FileRead { path, .. }
            | Self::FileWrite { path, .. }
            | Self::CreateDir { path, .. }
            | Self::InvalidFileName { path }
            | Self::Parse { path, .. } => Some(path),
            Self::ParserInit(_) => None,
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::FileRead { .. } => vec![
                "Check that the file exists and you have read permissions",
                "Ensure the path points to a file, not a directory",
            ],
            Self::FileWrite { .. } | Self::CreateDir { .. } => vec![
                "Check that the output directory is writable",
                "Pass a different directory with --output",
            ],
            Self::InvalidFileName { .. } => {
                vec!["Rename the sketch so its name does not start with '.'"]
            }
            Self::Parse {
                source: ParseError::SyntaxError { .. },
                ..
            } => vec![
                "Fix the syntax error reported above and run again",
                "Set parser.reject_syntax_errors = false to convert anyway",
            ],
            Self::Parse {
                source: ParseError::InvalidUtf8,
                ..
            } => vec!["Re-save the sketch with UTF-8 encoding"],
            Self::ParserInit(_) => vec!["Rebuild ino2cpp; the bundled C++ grammar failed to load"],
            Self::Parse { .. } => vec![],
        }
    }
}

/// Errors specific to parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to initialize {language} parser: {reason}")]
    ParserInit { language: String, reason: String },

    #[error("Failed to parse code at line {line}, column {column}: {reason}")]
    SyntaxError {
        line: u32,
        column: u32,
        reason: String,
    },

    #[error("Invalid UTF-8 in source file")]
    InvalidUtf8,
}

/// Result type alias for conversion operations
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Result type alias for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Helper trait for attaching a path to I/O errors
pub trait ErrorContext<T> {
    /// Map a read failure on `path`
    fn read_context(self, path: &std::path::Path) -> ConvertResult<T>;

    /// Map a write failure on `path`
    fn write_context(self, path: &std::path::Path) -> ConvertResult<T>;
}

impl<T> ErrorContext<T> for Result<T, std::io::Error> {
    fn read_context(self, path: &std::path::Path) -> ConvertResult<T> {
        self.map_err(|source| ConvertError::FileRead {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_context(self, path: &std::path::Path) -> ConvertResult<T> {
        self.map_err(|source| ConvertError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}
