//! Extractor: walks a Python syntax tree and produces documentation entries.
//!
//! The walk is a single depth-first pass in declaration order. Each node is
//! tagged with a [`NodeKind`] and dispatched to one handling rule; kinds
//! without a rule are walked generically so their inner constructs are still
//! found. Definitions found inside a class or function body become children
//! of that definition, everything else is emitted at top level.

pub mod entry;
pub mod node;
pub mod text;

pub use entry::{Category, Entry};
pub use node::NodeKind;

use crate::config::ExtractConfig;
use crate::error::{Error, Result};
use tree_sitter::{Node, Tree};

/// Stateless entry extractor
#[derive(Debug, Clone)]
pub struct Extractor {
    max_depth: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(&ExtractConfig::default())
    }
}

impl Extractor {
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            max_depth: config.max_depth,
        }
    }

    /// Extract entries from a parsed tree. `source` must be the text the
    /// tree was parsed from.
    pub fn extract(&self, tree: &Tree, source: &str) -> Result<Vec<Entry>> {
        let mut walk = Walk {
            source: source.as_bytes(),
            max_depth: self.max_depth,
            entries: Vec::new(),
        };
        walk.visit_children(tree.root_node(), 0, None)?;

        tracing::debug!(entries = walk.entries.len(), "Extracted entries");
        Ok(walk.entries)
    }
}

/// State of one extraction pass
struct Walk<'s> {
    source: &'s [u8],
    max_depth: usize,
    entries: Vec<Entry>,
}

impl<'s> Walk<'s> {
    /// `owner` collects definitions when walking inside a class or function body
    fn visit(&mut self, node: Node, depth: usize, owner: Option<&mut Vec<Entry>>) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::DepthExceeded {
                limit: self.max_depth,
                line: line_of(&node),
            });
        }

        match NodeKind::of(&node) {
            NodeKind::Import => {
                self.push(self.import(&node));
                Ok(())
            }
            NodeKind::ImportFrom | NodeKind::FutureImport => {
                self.push(self.import_from(&node));
                Ok(())
            }
            NodeKind::Class => self.definition(node, Category::ClassDef, depth, owner),
            NodeKind::Function => self.definition(node, Category::FunctionDef, depth, owner),
            NodeKind::Decorated => match node.child_by_field_name("definition") {
                Some(definition) => self.visit(definition, depth + 1, owner),
                None => Ok(()),
            },
            NodeKind::Assignment => self.assignment(node, depth, owner),
            NodeKind::For | NodeKind::While => self.loop_statement(node, depth, owner),
            NodeKind::Call => {
                self.push(self.call(&node));
                self.visit_children(node, depth, owner)
            }
            NodeKind::Print => {
                self.push(self.print(&node));
                self.visit_children(node, depth, owner)
            }
            NodeKind::Return => {
                self.push(self.return_statement(&node));
                Ok(())
            }
            NodeKind::Other => self.visit_children(node, depth, owner),
        }
    }

    fn visit_children(
        &mut self,
        node: Node,
        depth: usize,
        mut owner: Option<&mut Vec<Entry>>,
    ) -> Result<()> {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child, depth + 1, owner.as_deref_mut())?;
        }
        Ok(())
    }

    fn push(&mut self, entry: Option<Entry>) {
        if let Some(entry) = entry {
            self.entries.push(entry);
        }
    }

    fn text(&self, node: Option<Node>) -> Option<String> {
        text::summary(&node?, self.source)
    }

    /// `import a, b as c`
    fn import(&self, node: &Node) -> Option<Entry> {
        let mut cursor = node.walk();
        let names: Vec<String> = node
            .children_by_field_name("name", &mut cursor)
            .filter_map(|name| self.imported_name(&name))
            .collect();

        if names.is_empty() {
            return None;
        }
        Some(Entry::new(Category::Import, names.join(", "), line_of(node)))
    }

    /// `from a import b as c` and `from __future__ import x`
    fn import_from(&self, node: &Node) -> Option<Entry> {
        let module = if node.kind() == "future_import_statement" {
            "__future__".to_string()
        } else {
            self.text(node.child_by_field_name("module_name"))?
        };

        let mut names = Vec::new();
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            if let Some(name) = self.imported_name(&name) {
                names.push(name);
            }
        }
        let mut cursor = node.walk();
        if node
            .named_children(&mut cursor)
            .any(|child| child.kind() == "wildcard_import")
        {
            names.push("*".to_string());
        }

        let detail = if names.is_empty() {
            None
        } else {
            Some(names.join(", "))
        };
        Some(Entry::new(Category::Import, module, line_of(node)).with_detail(detail))
    }

    fn imported_name(&self, node: &Node) -> Option<String> {
        if node.kind() == "aliased_import" {
            let name = self.text(node.child_by_field_name("name"))?;
            return match self.text(node.child_by_field_name("alias")) {
                Some(alias) => Some(format!("{} as {}", name, alias)),
                None => Some(name),
            };
        }
        self.text(Some(*node))
    }

    fn definition(
        &mut self,
        node: Node,
        category: Category,
        depth: usize,
        owner: Option<&mut Vec<Entry>>,
    ) -> Result<()> {
        let Some(name) = self.text(node.child_by_field_name("name")) else {
            return Ok(());
        };
        let body = node.child_by_field_name("body");
        let docstring = body.and_then(|b| text::docstring(&b, self.source));
        let entry = Entry::new(category, name, line_of(&node)).with_detail(docstring);

        match owner {
            Some(siblings) => {
                let children = self.body(body, depth)?;
                siblings.push(entry.with_children(children));
            }
            None => {
                // Pushed before the body so lines stay in source order
                let index = self.entries.len();
                self.entries.push(entry);
                let children = self.body(body, depth)?;
                self.entries[index].children = children;
            }
        }
        Ok(())
    }

    /// Walk a definition body, returning the definitions nested in it
    fn body(&mut self, body: Option<Node>, depth: usize) -> Result<Vec<Entry>> {
        let mut children = Vec::new();
        if let Some(body) = body {
            self.visit_children(body, depth + 1, Some(&mut children))?;
        }
        Ok(children)
    }

    /// `a = b = value`, `x: int = 5`, `a, b = pair`
    fn assignment(
        &mut self,
        node: Node,
        depth: usize,
        owner: Option<&mut Vec<Entry>>,
    ) -> Result<()> {
        let mut targets = Vec::new();
        let mut current = node;
        let value = loop {
            if let Some(target) = self.text(current.child_by_field_name("left")) {
                targets.push(target);
            }
            match current.child_by_field_name("right") {
                Some(right) if right.kind() == "assignment" => current = right,
                right => break right,
            }
        };

        if !targets.is_empty() {
            let entry = Entry::new(Category::Assignment, targets.join(", "), line_of(&node))
                .with_detail(self.text(value));
            self.entries.push(entry);
        }

        match value {
            Some(value) => self.visit(value, depth + 1, owner),
            None => Ok(()),
        }
    }

    fn loop_statement(
        &mut self,
        node: Node,
        depth: usize,
        mut owner: Option<&mut Vec<Entry>>,
    ) -> Result<()> {
        let (name, header) = if node.kind() == "for_statement" {
            let target = self.text(node.child_by_field_name("left"));
            let iterable = self.text(node.child_by_field_name("right"));
            let keyword = if has_async_keyword(&node) { "async for" } else { "for" };
            let header = match (&target, &iterable) {
                (Some(t), Some(i)) => Some(format!("{} {} in {}", keyword, t, i)),
                _ => None,
            };
            (target.unwrap_or_default(), header)
        } else {
            let header = self
                .text(node.child_by_field_name("condition"))
                .map(|c| format!("while {}", c));
            (String::new(), header)
        };

        if let Some(header) = header {
            self.entries
                .push(Entry::new(Category::Loop, name, line_of(&node)).with_detail(Some(header)));
        }

        for field in ["body", "alternative"] {
            if let Some(child) = node.child_by_field_name(field) {
                self.visit(child, depth + 1, owner.as_deref_mut())?;
            }
        }
        Ok(())
    }

    fn call(&self, node: &Node) -> Option<Entry> {
        let name = self.text(node.child_by_field_name("function"))?;
        let args = node
            .child_by_field_name("arguments")
            .and_then(|a| text::arguments(&a, self.source));
        Some(Entry::new(Category::Call, name, line_of(node)).with_detail(args))
    }

    fn print(&self, node: &Node) -> Option<Entry> {
        let mut cursor = node.walk();
        let args: Vec<String> = node
            .named_children(&mut cursor)
            .filter_map(|arg| match arg.kind() {
                "parenthesized_expression" => text::arguments(&arg, self.source),
                _ => text::summary(&arg, self.source),
            })
            .collect();
        let detail = if args.is_empty() {
            None
        } else {
            Some(args.join(", "))
        };
        Some(Entry::new(Category::Call, "print", line_of(node)).with_detail(detail))
    }

    fn return_statement(&self, node: &Node) -> Option<Entry> {
        let mut cursor = node.walk();
        let value = node
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment");
        Some(Entry::new(Category::Return, "", line_of(node)).with_detail(self.text(value)))
    }
}

fn line_of(node: &Node) -> usize {
    node.start_position().row + 1
}

fn has_async_keyword(node: &Node) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| child.kind() == "async");
    found
}
