//! Sketch to source/header conversion
//!
//! A [`Converter`] owns one parser and an output directory. Each call to
//! [`Converter::convert`] reads a sketch, writes `<name>.h` with one forward
//! declaration per top-level function, and writes `<name>.cpp` holding the
//! original bytes behind two include lines.

use crate::config::Settings;
use crate::error::{ConvertError, ConvertResult, ErrorContext, ParseError};
use crate::parsing::{CppParser, DeclarationParser};
use crate::types::FunctionSignature;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Include line every generated source starts with
pub const ARDUINO_INCLUDE: &str = "#include <Arduino.h>";

/// Outcome of converting one sketch
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub input: PathBuf,
    pub header: PathBuf,
    pub source: PathBuf,
    pub signatures: Vec<FunctionSignature>,
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}, {} ({} declarations)",
            self.input.display(),
            self.header.display(),
            self.source.display(),
            self.signatures.len()
        )
    }
}

pub struct Converter<P = CppParser> {
    parser: P,
    output_dir: PathBuf,
}

impl Converter<CppParser> {
    /// Build a converter from settings, creating the output directory if
    /// it does not exist yet
    pub fn from_settings(settings: &Settings) -> ConvertResult<Self> {
        let parser = CppParser::with_config(&settings.parser).map_err(ConvertError::ParserInit)?;
        Self::new(parser, &settings.output_dir)
    }
}

impl<P: DeclarationParser> Converter<P> {
    pub fn new(parser: P, output_dir: impl AsRef<Path>) -> ConvertResult<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        ensure_output_dir(&output_dir)?;
        Ok(Self { parser, output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Convert one sketch.
    ///
    /// The header is written before the source. Nothing is cleaned up when
    /// a later step fails.
    pub fn convert(&mut self, input: impl AsRef<Path>) -> ConvertResult<Conversion> {
        let input = input.as_ref();
        let name = sketch_name(input)?;

        let bytes = std::fs::read(input).read_context(input)?;
        let code = std::str::from_utf8(&bytes).map_err(|_| ConvertError::Parse {
            path: input.to_path_buf(),
            source: ParseError::InvalidUtf8,
        })?;

        debug!(
            "parsing {} as {}",
            input.display(),
            self.parser.language_name()
        );
        let signatures =
            self.parser
                .parse_declarations(code)
                .map_err(|source| ConvertError::Parse {
                    path: input.to_path_buf(),
                    source,
                })?;
        for sig in &signatures {
            debug!(
                "{}:{}: {}",
                input.display(),
                sig.line,
                sig.to_declaration()
            );
        }

        let header_name = format!("{name}.h");
        let header = self.output_dir.join(&header_name);
        let source = self.output_dir.join(format!("{name}.cpp"));

        std::fs::write(&header, render_header(&signatures)).write_context(&header)?;

        info!("writing to {}", source.display());
        std::fs::write(&source, render_source(&header_name, &bytes)).write_context(&source)?;

        Ok(Conversion {
            input: input.to_path_buf(),
            header,
            source,
            signatures,
        })
    }

    /// Convert every sketch in order.
    ///
    /// A failure is logged and recorded, then the next file is attempted.
    pub fn convert_all<I, S>(&mut self, inputs: I) -> Vec<ConvertResult<Conversion>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        inputs
            .into_iter()
            .map(|input| {
                let result = self.convert(input.as_ref());
                if let Err(e) = &result {
                    error!("{e}");
                }
                result
            })
            .collect()
    }
}

/// Create the output directory and any missing parents
pub fn ensure_output_dir(dir: &Path) -> ConvertResult<()> {
    if dir.is_dir() {
        return Ok(());
    }
    info!("Creating output directory {}", dir.display());
    std::fs::create_dir_all(dir).map_err(|source| ConvertError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Output base name: the file name up to its first `.`
pub fn sketch_name(input: &Path) -> ConvertResult<String> {
    let invalid = || ConvertError::InvalidFileName {
        path: input.to_path_buf(),
    };
    let file_name = input.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
    let name = file_name.split('.').next().unwrap_or_default();
    if name.is_empty() {
        return Err(invalid());
    }
    Ok(name.to_string())
}

/// One forward declaration per line, newline terminated
pub fn render_header(signatures: &[FunctionSignature]) -> String {
    signatures
        .iter()
        .map(|sig| format!("{sig}\n"))
        .collect()
}

/// The original bytes preceded by the Arduino and self includes
pub fn render_source(header_name: &str, original: &[u8]) -> Vec<u8> {
    let prelude = format!("{ARDUINO_INCLUDE}\n#include \"{header_name}\"\n");
    let mut out = Vec::with_capacity(prelude.len() + original.len());
    out.extend_from_slice(prelude.as_bytes());
    out.extend_from_slice(original);
    out
}
