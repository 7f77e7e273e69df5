//! Batch reports and errors, as text or as a JSON envelope.

use crate::convert::Conversion;
use crate::error::{ConvertError, ConvertResult};
use crate::io::exit_code::ExitCode;
use crate::io::format::{ErrorDetails, JsonResponse, OutputFormat, ResponseMeta};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

/// Per-file entry of a batch report
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileReport {
    Converted {
        input: PathBuf,
        header: PathBuf,
        source: PathBuf,
        declarations: Vec<String>,
    },
    Failed {
        input: PathBuf,
        code: String,
        message: String,
        suggestions: Vec<String>,
    },
}

/// Summary of one invocation over several sketches
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub converted: usize,
    pub failed: usize,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    /// Build a report, pairing each result with the input it came from
    pub fn new(inputs: &[PathBuf], results: &[ConvertResult<Conversion>]) -> Self {
        let files: Vec<FileReport> = inputs
            .iter()
            .zip(results)
            .map(|(input, result)| match result {
                Ok(conversion) => FileReport::Converted {
                    input: conversion.input.clone(),
                    header: conversion.header.clone(),
                    source: conversion.source.clone(),
                    declarations: conversion
                        .signatures
                        .iter()
                        .map(|sig| sig.to_declaration())
                        .collect(),
                },
                Err(error) => FileReport::Failed {
                    input: input.clone(),
                    code: error.status_code(),
                    message: error.to_string(),
                    suggestions: ErrorDetails::from_error(error).suggestions,
                },
            })
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        Self {
            converted: results.len() - failed,
            failed,
            files,
        }
    }
}

/// Writes everything the binary prints. Each method returns the exit code
/// matching what it printed.
pub struct OutputManager {
    format: OutputFormat,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl OutputManager {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
        }
    }

    /// Output manager writing to the given streams instead of stdio
    pub fn new_with_writers(
        format: OutputFormat,
        stdout: Box<dyn Write>,
        stderr: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            stdout,
            stderr,
        }
    }

    /// A failure that ends the run before any sketch is converted
    pub fn error(&mut self, error: &ConvertError) -> io::Result<ExitCode> {
        match self.format {
            OutputFormat::Json => {
                let response = JsonResponse::from_error(error);
                writeln!(self.stderr, "{}", serde_json::to_string_pretty(&response)?)?;
            }
            OutputFormat::Text => {
                self.write_text_error(error)?;
            }
        }
        Ok(ExitCode::from_error(error))
    }

    /// Settings could not be loaded. Text mode keeps the plain
    /// `Configuration error:` line.
    pub fn config_error(&mut self, message: &str) -> io::Result<ExitCode> {
        let code = ExitCode::ConfigError;
        match self.format {
            OutputFormat::Json => {
                let response = JsonResponse::error(
                    code,
                    message,
                    &[
                        "Check the path given to --config",
                        "Check the TOML syntax of the settings file",
                    ],
                );
                writeln!(self.stderr, "{}", serde_json::to_string_pretty(&response)?)?;
            }
            OutputFormat::Text => writeln!(self.stderr, "Configuration error: {message}")?,
        }
        Ok(code)
    }

    /// Output the results of a batch conversion.
    ///
    /// Text mode prints one line per converted file on stdout and each
    /// failure on stderr. JSON mode prints a single envelope on stdout.
    /// The returned exit code is that of the first failure.
    pub fn report(
        &mut self,
        inputs: &[PathBuf],
        results: &[ConvertResult<Conversion>],
        meta: Option<ResponseMeta>,
    ) -> io::Result<ExitCode> {
        let exit_code = ExitCode::from_results(results);

        match self.format {
            OutputFormat::Json => {
                let report = BatchReport::new(inputs, results);
                let first_error = results.iter().find_map(|r| r.as_ref().err());
                let mut response = match first_error {
                    None => JsonResponse::success(&report),
                    Some(error) => {
                        let message = format!(
                            "{} of {} files failed",
                            report.failed,
                            results.len()
                        );
                        JsonResponse::partial(&report, error, &message)
                    }
                };
                if let Some(meta) = meta {
                    response = response.with_meta(meta);
                }
                writeln!(self.stdout, "{}", serde_json::to_string_pretty(&response)?)?;
            }
            OutputFormat::Text => {
                for result in results {
                    match result {
                        Ok(conversion) => writeln!(self.stdout, "{conversion}")?,
                        Err(error) => self.write_text_error(error)?,
                    }
                }
            }
        }
        Ok(exit_code)
    }

    fn write_text_error(&mut self, error: &ConvertError) -> io::Result<()> {
        writeln!(self.stderr, "Error: {error}")?;
        for suggestion in error.recovery_suggestions() {
            writeln!(self.stderr, "  Suggestion: {suggestion}")?;
        }
        Ok(())
    }
}
