//! C++ declaration parser implementation
//!
//! Walks the top level of a tree-sitter C++ syntax tree and renders every
//! free function it finds as a [`FunctionSignature`].

use crate::config::ParserConfig;
use crate::error::{ParseError, ParseResult};
use crate::parsing::DeclarationParser;
use crate::types::FunctionSignature;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;
use tree_sitter::{Node, Parser};

/// Preprocessor conditionals do not open a scope, so their items are
/// still at file scope.
const PREPROC_GROUPS: &[&str] = &[
    "preproc_if",
    "preproc_ifdef",
    "preproc_else",
    "preproc_elif",
    "preproc_elifdef",
];

/// Qualifiers that tree-sitter files under `type_qualifier` but which are
/// not part of the result type.
const NON_TYPE_QUALIFIERS: &[&str] = &["constexpr", "consteval", "constinit", "mutable"];

/// Attribute macros from the AVR and ESP cores that expand to nothing the
/// grammar needs to see
pub const ATTRIBUTE_MACROS: &[&str] = &[
    "PROGMEM",
    "IRAM_ATTR",
    "ICACHE_RAM_ATTR",
    "ICACHE_FLASH_ATTR",
    "DRAM_ATTR",
    "RTC_DATA_ATTR",
    "RTC_NOINIT_ATTR",
    "WORD_ALIGNED_ATTR",
];

static ATTRIBUTE_MACRO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"\b(?:{})\b", ATTRIBUTE_MACROS.join("|"));
    Regex::new(&pattern).expect("attribute macro pattern is valid")
});

pub struct CppParser {
    parser: Parser,
    reject_syntax_errors: bool,
}

impl std::fmt::Debug for CppParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CppParser")
            .field("language", &"C++")
            .field("reject_syntax_errors", &self.reject_syntax_errors)
            .finish()
    }
}

impl CppParser {
    /// Create a strict parser that rejects sources with syntax errors
    pub fn new() -> ParseResult<Self> {
        Self::with_config(&ParserConfig::default())
    }

    pub fn with_config(config: &ParserConfig) -> ParseResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .map_err(|e| ParseError::ParserInit {
                language: "C++".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            parser,
            reject_syntax_errors: config.reject_syntax_errors,
        })
    }

    /// Visit the items of a file-scope container (the translation unit or
    /// a preprocessor group)
    fn collect_top_level(node: Node, scope: &mut FileScope) {
        for i in 0..node.child_count() {
            let Some(child) = node.child(i) else {
                continue;
            };
            match child.kind() {
                "function_definition" | "declaration" => {
                    Self::collect_from_declaration(child, scope);
                }
                "preproc_def" | "preproc_function_def" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        scope.record_value(name);
                    }
                }
                "enum_specifier" => scope.record_enumerators(child),
                kind if PREPROC_GROUPS.contains(&kind) => {
                    Self::collect_top_level(child, scope);
                }
                _ => {}
            }
        }
    }

    /// Extract one signature per function declarator of a definition or
    /// declaration. Other declarators are remembered as file-scope values.
    fn collect_from_declaration(node: Node, scope: &mut FileScope) {
        let code = scope.code;
        if let Some(type_node) = node.child_by_field_name("type") {
            scope.record_enumerators(type_node);
        }
        let Some(base_type) = Self::base_type(node, code) else {
            return;
        };
        let is_definition = node.kind() == "function_definition";

        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();

        for declarator in declarators {
            let Some((function, suffix)) = Self::resolve_function_declarator(declarator, code)
            else {
                if let Some(name) = declared_name(declarator) {
                    scope.record_value(name);
                }
                continue;
            };
            // `LiquidCrystal lcd(rs, en);` parses like a prototype
            if !is_definition && scope.is_constructor_call(function) {
                if let Some(name) = declared_name(declarator) {
                    scope.record_value(name);
                }
                continue;
            }
            let Some(display_name) = Self::display_name(function, code) else {
                continue;
            };

            let result_type = match trailing_return_type(function, code) {
                Some(trailing) => trailing,
                None if suffix.is_empty() => base_type.clone(),
                None => format!("{base_type} {suffix}"),
            };

            scope.signatures.push(
                FunctionSignature::new(result_type, display_name)
                    .with_line(node.start_position().row as u32 + 1),
            );
        }
    }

    /// Type qualifiers and type specifier preceding the first declarator.
    ///
    /// Storage classes, attributes and `virtual` are dropped.
    fn base_type(node: Node, code: &str) -> Option<String> {
        let type_node = node.child_by_field_name("type")?;
        let first_declarator = node.child_by_field_name("declarator")?;

        let mut parts = Vec::new();
        for i in 0..node.child_count() {
            let Some(child) = node.child(i) else {
                continue;
            };
            if child == first_declarator {
                break;
            }
            if child == type_node {
                parts.push(collapse_whitespace(&code[child.byte_range()]));
            } else if child.kind() == "type_qualifier" {
                let qualifier = &code[child.byte_range()];
                if !NON_TYPE_QUALIFIERS.contains(&qualifier) {
                    parts.push(qualifier.to_string());
                }
            }
        }

        Some(parts.join(" "))
    }

    /// Follow pointer and reference declarators down to a function
    /// declarator, collecting the tokens they add to the result type.
    ///
    /// Anything else on the way (arrays, parentheses, initializers) means
    /// the declarator names a variable, not a function.
    fn resolve_function_declarator<'tree>(
        mut node: Node<'tree>,
        code: &str,
    ) -> Option<(Node<'tree>, String)> {
        let mut suffix = String::new();
        loop {
            match node.kind() {
                "function_declarator" => return Some((node, suffix.trim_end().to_string())),
                "pointer_declarator" => {
                    suffix.push('*');
                    for i in 0..node.child_count() {
                        if let Some(child) = node.child(i) {
                            if child.kind() == "type_qualifier" {
                                suffix.push(' ');
                                suffix.push_str(&code[child.byte_range()]);
                                suffix.push(' ');
                            }
                        }
                    }
                    node = node.child_by_field_name("declarator")?;
                }
                "reference_declarator" => {
                    let mut inner = None;
                    for i in 0..node.child_count() {
                        let Some(child) = node.child(i) else {
                            continue;
                        };
                        if child.is_named() {
                            inner = Some(child);
                        } else if matches!(child.kind(), "&" | "&&") {
                            suffix.push_str(child.kind());
                        }
                    }
                    node = inner?;
                }
                _ => return None,
            }
        }
    }

    /// Render `name(param, ...)` for a free function declarator.
    ///
    /// Returns `None` for qualified names (out-of-line members, namespace
    /// members), destructors and template specializations.
    fn display_name(function: Node, code: &str) -> Option<String> {
        let name_node = function.child_by_field_name("declarator")?;
        if !matches!(name_node.kind(), "identifier" | "operator_name") {
            return None;
        }
        let name = &code[name_node.byte_range()];

        let mut params = Vec::new();
        if let Some(list) = function.child_by_field_name("parameters") {
            for i in 0..list.child_count() {
                let Some(param) = list.child(i) else {
                    continue;
                };
                match param.kind() {
                    "parameter_declaration"
                    | "optional_parameter_declaration"
                    | "variadic_parameter_declaration" => {
                        params.push(Self::parameter_type(param, code));
                    }
                    "variadic_parameter" | "..." => params.push("...".to_string()),
                    _ => {}
                }
            }
        }

        if params.len() == 1 && params[0] == "void" {
            params.clear();
        }

        Some(format!("{name}({})", params.join(", ")))
    }

    /// Parameter declaration text without its name, default value or
    /// comments
    fn parameter_type(param: Node, code: &str) -> String {
        let mut end = param.end_byte();
        if param.kind() == "optional_parameter_declaration" {
            if let Some(default) = param.child_by_field_name("default_value") {
                // Everything from the `=` onwards belongs to the default.
                for i in 0..param.child_count() {
                    if let Some(child) = param.child(i) {
                        if child.kind() == "=" {
                            end = child.start_byte();
                            break;
                        }
                    }
                }
                end = end.min(default.start_byte());
            }
        }

        let mut excluded = Vec::new();
        if let Some(name) = param
            .child_by_field_name("declarator")
            .and_then(declared_name)
        {
            excluded.push(name.byte_range());
        }
        collect_comments(param, &mut excluded);
        excluded.sort_by_key(|range| range.start);

        let mut text = String::new();
        let mut pos = param.start_byte();
        for range in excluded {
            if range.start >= end {
                break;
            }
            if range.start > pos {
                text.push_str(&code[pos..range.start]);
            }
            text.push(' ');
            pos = pos.max(range.end);
        }
        if pos < end {
            text.push_str(&code[pos..end]);
        }

        collapse_whitespace(&text)
    }

    /// Locate the first error or missing node, reported 1-based
    fn first_syntax_error(node: Node, code: &str) -> Option<ParseError> {
        if node.is_error() || node.is_missing() {
            let position = node.start_position();
            let reason = if node.is_missing() {
                format!("missing '{}'", node.kind())
            } else {
                let snippet: String = code[node.byte_range()]
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .chars()
                    .take(40)
                    .collect();
                format!("unexpected '{}'", snippet.trim())
            };
            return Some(ParseError::SyntaxError {
                line: position.row as u32 + 1,
                column: position.column as u32 + 1,
                reason,
            });
        }

        if !node.has_error() {
            return None;
        }

        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                if let Some(error) = Self::first_syntax_error(child, code) {
                    return Some(error);
                }
            }
        }
        None
    }
}

impl DeclarationParser for CppParser {
    fn parse_declarations(&mut self, code: &str) -> ParseResult<Vec<FunctionSignature>> {
        let masked = mask_attribute_macros(code);
        let code = masked.as_ref();
        let tree = self
            .parser
            .parse(code, None)
            .ok_or_else(|| ParseError::SyntaxError {
                line: 1,
                column: 1,
                reason: "parser produced no syntax tree".to_string(),
            })?;
        let root = tree.root_node();

        if root.has_error() {
            let error = Self::first_syntax_error(root, code).unwrap_or(ParseError::SyntaxError {
                line: 1,
                column: 1,
                reason: "syntax error".to_string(),
            });
            if self.reject_syntax_errors {
                return Err(error);
            }
            tracing::warn!("continuing past syntax error: {error}");
        }

        let mut scope = FileScope::new(code);
        Self::collect_top_level(root, &mut scope);
        Ok(scope.signatures)
    }

    fn language_name(&self) -> &'static str {
        "C++"
    }
}

/// Names seen so far that denote values at file scope, plus the
/// signatures found so far
struct FileScope<'code> {
    code: &'code str,
    values: HashSet<&'code str>,
    signatures: Vec<FunctionSignature>,
}

impl<'code> FileScope<'code> {
    fn new(code: &'code str) -> Self {
        Self {
            code,
            values: HashSet::new(),
            signatures: Vec::new(),
        }
    }

    fn record_value(&mut self, name: Node) {
        let code = self.code;
        self.values.insert(&code[name.byte_range()]);
    }

    fn record_enumerators(&mut self, node: Node) {
        if node.kind() != "enum_specifier" {
            return;
        }
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        for i in 0..body.child_count() {
            if let Some(name) = body
                .child(i)
                .filter(|child| child.kind() == "enumerator")
                .and_then(|child| child.child_by_field_name("name"))
            {
                self.record_value(name);
            }
        }
    }

    /// A prototype whose "parameter types" are really arguments: a bare
    /// name that is a known value or is spelled like a macro constant.
    fn is_constructor_call(&self, function: Node) -> bool {
        let Some(list) = function.child_by_field_name("parameters") else {
            return false;
        };
        (0..list.child_count())
            .filter_map(|i| list.child(i))
            .filter(|param| param.kind() == "parameter_declaration")
            .any(|param| {
                if param.child_by_field_name("declarator").is_some() {
                    return false;
                }
                let Some(type_node) = param.child_by_field_name("type") else {
                    return false;
                };
                if type_node.kind() != "type_identifier" || param.named_child_count() != 1 {
                    return false;
                }
                let name = &self.code[type_node.byte_range()];
                self.values.contains(name) || is_constant_style(name)
            })
    }
}

/// `LED_BUILTIN`, `DHT22`, `A0`. Single letters are left alone since they
/// are usually type names.
fn is_constant_style(name: &str) -> bool {
    name.len() > 1
        && name.starts_with(|c: char| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Type named after `->` in the function declarator, if any
fn trailing_return_type(function: Node, code: &str) -> Option<String> {
    let trailing = (0..function.child_count())
        .filter_map(|i| function.child(i))
        .find(|child| child.kind() == "trailing_return_type")?;
    let type_text = match trailing.named_child(0) {
        Some(descriptor) => &code[descriptor.byte_range()],
        None => code[trailing.byte_range()].trim_start_matches("->"),
    };
    Some(collapse_whitespace(type_text))
}

/// Replace Arduino placement and section attribute macros with spaces of
/// the same length, keeping byte offsets and line numbers intact.
fn mask_attribute_macros(code: &str) -> Cow<'_, str> {
    ATTRIBUTE_MACRO_PATTERN.replace_all(code, |caps: &Captures| " ".repeat(caps[0].len()))
}

/// Identifier introduced by a (possibly abstract) declarator
fn declared_name(node: Node) -> Option<Node> {
    match node.kind() {
        "identifier" => Some(node),
        "pointer_declarator" | "array_declarator" | "function_declarator" | "init_declarator" => {
            node.child_by_field_name("declarator").and_then(declared_name)
        }
        "reference_declarator" | "parenthesized_declarator" => {
            for i in 0..node.child_count() {
                if let Some(child) = node.child(i) {
                    if child.is_named() {
                        if let Some(name) = declared_name(child) {
                            return Some(name);
                        }
                    }
                }
            }
            None
        }
        _ => None,
    }
}

fn collect_comments(node: Node, out: &mut Vec<Range<usize>>) {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == "comment" {
                out.push(child.byte_range());
            } else {
                collect_comments(child, out);
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
