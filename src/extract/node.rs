// Closed set of syntax-tree node kinds the extractor handles

use tree_sitter::Node;

/// Handling tag for a tree-sitter Python node.
///
/// Every node maps to exactly one tag; `Other` covers everything without a
/// dedicated rule and is walked generically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Import,
    ImportFrom,
    FutureImport,
    Class,
    Function,
    Decorated,
    Assignment,
    For,
    While,
    Call,
    Print,
    Return,
    Other,
}

impl NodeKind {
    pub fn of(node: &Node) -> Self {
        match node.kind() {
            "import_statement" => NodeKind::Import,
            "import_from_statement" => NodeKind::ImportFrom,
            "future_import_statement" => NodeKind::FutureImport,
            "class_definition" => NodeKind::Class,
            "function_definition" => NodeKind::Function,
            "decorated_definition" => NodeKind::Decorated,
            "assignment" => NodeKind::Assignment,
            "for_statement" => NodeKind::For,
            "while_statement" => NodeKind::While,
            "call" => NodeKind::Call,
            // Python 2 style `print x`
            "print_statement" => NodeKind::Print,
            "return_statement" => NodeKind::Return,
            _ => NodeKind::Other,
        }
    }
}
