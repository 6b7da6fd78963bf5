//! Go front end built on tree-sitter: lists a file's top-level function and
//! method declarations with their source extents.
//!
//! Positions follow `go/token` conventions (1-based line, 1-based byte column).

use std::ops::Range;

use tree_sitter::{Language, Node, Parser, Point};

use crate::error::{GoberturaError, Result};

const BOM: &str = "\u{FEFF}";

/// A line/column location in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Self::new(point.row as u32 + 1, point.column as u32 + 1)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Textual extent of a declaration. `end` is just past its last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// A top-level `func` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    /// Byte range of the receiver's type expression, for methods.
    pub receiver: Option<Range<usize>>,
    pub span: Span,
}

/// Function and method declarations of one file, in source order.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub funcs: Vec<FuncDecl>,
}

fn parse_error(file_name: &str, pos: Position, message: impl Into<String>) -> GoberturaError {
    GoberturaError::Parse {
        file: file_name.to_string(),
        line: pos.line as usize,
        column: pos.column as usize,
        message: message.into(),
    }
}

/// Position just past `text`, used to locate failures outside the tree.
fn end_of(text: &str) -> Position {
    let line = text.matches('\n').count() as u32 + 1;
    let column = text.len() - text.rfind('\n').map_or(0, |idx| idx + 1);
    Position::new(line, column as u32 + 1)
}

/// First error or missing node, depth first.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    found
}

/// Parse a Go source file into its function declarations.
///
/// `file_name` is only used to label errors. Any syntax error in the file is
/// a failure.
pub fn parse_file(file_name: &str, src: &[u8]) -> Result<SourceFile> {
    let text = std::str::from_utf8(src).map_err(|e| {
        let valid = std::str::from_utf8(&src[..e.valid_up_to()]).unwrap_or_default();
        parse_error(file_name, end_of(valid), "invalid UTF-8 encoding")
    })?;

    // A leading BOM is skipped by the Go scanner but still counts toward
    // byte columns, so blank it out instead of dropping it.
    let text = match text.strip_prefix(BOM) {
        Some(rest) => format!("{}{}", " ".repeat(BOM.len()), rest),
        None => text.to_string(),
    };

    let language: Language = tree_sitter_go::LANGUAGE.into();
    let mut parser = Parser::new();
    parser.set_language(&language)?;
    let tree = parser
        .parse(&text, None)
        .ok_or_else(|| parse_error(file_name, Position::new(1, 1), "parse cancelled"))?;
    let root = tree.root_node();

    if let Some(node) = first_error(root) {
        let message = if node.is_missing() {
            format!("expected {}", node.kind())
        } else {
            "syntax error".to_string()
        };
        return Err(parse_error(file_name, node.start_position().into(), message));
    }

    let mut funcs = Vec::new();
    let mut seen_package = false;
    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        match node.kind() {
            "comment" => {}
            "package_clause" => seen_package = true,
            _ if !seen_package => {
                return Err(parse_error(
                    file_name,
                    node.start_position().into(),
                    "expected 'package'",
                ))
            }
            "function_declaration" => funcs.push(func_decl(file_name, &text, node, None)?),
            "method_declaration" => {
                let receiver = receiver_type(file_name, node)?;
                funcs.push(func_decl(file_name, &text, node, Some(receiver))?);
            }
            "import_declaration" | "const_declaration" | "type_declaration"
            | "var_declaration" => {}
            _ => {
                return Err(parse_error(
                    file_name,
                    node.start_position().into(),
                    "non-declaration statement outside function body",
                ))
            }
        }
    }
    if !seen_package {
        return Err(parse_error(file_name, end_of(&text), "expected 'package'"));
    }

    Ok(SourceFile { funcs })
}

fn func_decl(
    file_name: &str,
    text: &str,
    node: Node<'_>,
    receiver: Option<Range<usize>>,
) -> Result<FuncDecl> {
    let name = node.child_by_field_name("name").ok_or_else(|| {
        parse_error(file_name, node.start_position().into(), "expected function name")
    })?;
    Ok(FuncDecl {
        name: text[name.byte_range()].to_string(),
        receiver,
        span: Span {
            start: node.start_position().into(),
            end: node.end_position().into(),
        },
    })
}

/// Byte range of the type in a receiver list `(name T)` / `(T)`.
fn receiver_type(file_name: &str, method: Node<'_>) -> Result<Range<usize>> {
    let no_receiver =
        || parse_error(file_name, method.start_position().into(), "method has no receiver");

    let list = method.child_by_field_name("receiver").ok_or_else(no_receiver)?;
    let mut cursor = list.walk();
    let param = list
        .named_children(&mut cursor)
        .find(|n| n.kind() == "parameter_declaration")
        .ok_or_else(no_receiver)?;
    let ty = param.child_by_field_name("type").ok_or_else(no_receiver)?;
    Ok(ty.byte_range())
}
