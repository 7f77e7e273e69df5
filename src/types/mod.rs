use serde::Serialize;
use std::fmt;

/// A top-level function declaration found in a sketch.
///
/// Created from parser output and consumed when the header is written.
/// Two records with the same text are indistinguishable; `line` is only
/// carried for logging and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSignature {
    /// Result type as spelled in the source, e.g. `const char *`
    pub result_type: String,
    /// Name plus parameter list, e.g. `blink(int, unsigned long)`
    pub display_name: String,
    /// 1-based line of the declaration
    pub line: u32,
}

impl FunctionSignature {
    pub fn new(result_type: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            result_type: result_type.into(),
            display_name: display_name.into(),
            line: 0,
        }
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    /// Forward declaration as it appears in the header
    pub fn to_declaration(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {};", self.result_type, self.display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_rendering() {
        let sig = FunctionSignature::new("void", "setup()");
        assert_eq!(sig.to_declaration(), "void setup();");

        let sig = FunctionSignature::new("const char *", "label(int)").with_line(12);
        assert_eq!(sig.to_declaration(), "const char * label(int);");
        assert_eq!(sig.line, 12);
    }

    #[test]
    fn test_line_is_not_part_of_rendering() {
        let a = FunctionSignature::new("int", "f()").with_line(1);
        let b = FunctionSignature::new("int", "f()").with_line(9);
        assert_eq!(a.to_declaration(), b.to_declaration());
    }
}
