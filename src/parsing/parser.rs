//! Declaration parser trait
//!
//! This module defines the narrow interface between the converter and
//! whatever syntax parser produces the top-level declarations of a sketch.

use crate::error::ParseResult;
use crate::types::FunctionSignature;

/// Common interface for parsers that enumerate top-level functions
pub trait DeclarationParser {
    /// Parse source code and return every top-level function declaration
    /// in source order.
    ///
    /// Only declarations at file scope are returned. Class members,
    /// namespace contents and anything inside a function body are skipped.
    fn parse_declarations(&mut self, code: &str) -> ParseResult<Vec<FunctionSignature>>;

    /// Human readable name of the grammar, used in log messages
    fn language_name(&self) -> &'static str;
}
