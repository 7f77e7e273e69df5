//! C++ declaration parser backed by tree-sitter

pub mod parser;

pub use parser::CppParser;
