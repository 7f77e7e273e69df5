/// Arduino sketch to C++ source/header conversion
pub mod config;
pub mod convert;
pub mod error;
pub mod io;
pub mod logging;
pub mod parsing;
pub mod types;

// Explicit exports for better API clarity
pub use config::{ParserConfig, Settings};
pub use convert::{Conversion, Converter};
pub use error::{ConvertError, ConvertResult, ParseError, ParseResult};
pub use parsing::{CppParser, DeclarationParser};
pub use types::FunctionSignature;
