pub mod cpp;
pub mod parser;

pub use cpp::CppParser;
pub use parser::DeclarationParser;
