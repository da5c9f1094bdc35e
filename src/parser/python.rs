// Python parser using tree-sitter

use crate::error::{Error, Result};
use tree_sitter::{Node, Parser, Tree};

/// Parser for Python source text
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::language();
        parser
            .set_language(&language)
            .map_err(|e| Error::parser(format!("Failed to set Python language: {}", e)))?;
        Ok(Self { parser })
    }

    /// Parse Python source into a syntax tree.
    ///
    /// tree-sitter recovers from syntax errors; any ERROR or MISSING node in
    /// the result is reported as a parse error instead.
    pub fn parse(&mut self, source: &str) -> Result<Tree> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| Error::parser("Failed to parse source"))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(syntax_error(&root, source.as_bytes()));
        }

        Ok(tree)
    }
}

/// Build a parse error from the first ERROR or MISSING node in source order
fn syntax_error(root: &Node, source: &[u8]) -> Error {
    let node = first_error(*root).unwrap_or(*root);
    let pos = node.start_position();

    let message = if node.is_missing() {
        format!("missing `{}`", node.kind())
    } else {
        match node.utf8_text(source).ok().and_then(snippet) {
            Some(text) => format!("invalid syntax near `{}`", text),
            None => "invalid syntax".to_string(),
        }
    };

    Error::parse(message, pos.row + 1, pos.column + 1)
}

/// Pre-order search with an explicit stack; error trees can nest as deep as
/// the input does
fn first_error(root: Node) -> Option<Node> {
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    None
}

/// First line of the offending text, kept short
fn snippet(text: &str) -> Option<String> {
    let line = text.lines().next()?.trim();
    if line.is_empty() {
        return None;
    }
    Some(line.chars().take(40).collect())
}
