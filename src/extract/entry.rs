// Documentation entries produced by the extractor
//
// Entries are plain data: the extractor builds them once per source file and
// the renderers only read them. They serialize to JSON so an entry sequence
// can be exported and rendered again later.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed classification used to group entries in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Import,
    ClassDef,
    FunctionDef,
    Assignment,
    Loop,
    Call,
    Return,
    /// A category this build does not know, e.g. from a newer JSON export
    Other,
}

impl Category {
    /// Rendering order of the output sections
    pub const ORDER: [Category; 8] = [
        Category::Import,
        Category::ClassDef,
        Category::FunctionDef,
        Category::Assignment,
        Category::Loop,
        Category::Call,
        Category::Return,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Import => "Import",
            Category::ClassDef => "ClassDef",
            Category::FunctionDef => "FunctionDef",
            Category::Assignment => "Assignment",
            Category::Loop => "Loop",
            Category::Call => "Call",
            Category::Return => "Return",
            Category::Other => "Other",
        }
    }

    /// Section heading used by the Markdown renderer
    pub fn heading(&self) -> &'static str {
        match self {
            Category::Import => "Imports",
            Category::ClassDef => "Classes",
            Category::FunctionDef => "Functions",
            Category::Assignment => "Assignments",
            Category::Loop => "Loops",
            Category::Call => "Function Calls",
            Category::Return => "Return Statements",
            Category::Other => "Other",
        }
    }

    /// Whether entries of this category carry a docstring and children
    pub fn is_definition(&self) -> bool {
        matches!(self, Category::ClassDef | Category::FunctionDef)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        match s {
            "Import" => Category::Import,
            "ClassDef" => Category::ClassDef,
            "FunctionDef" => Category::FunctionDef,
            "Assignment" => Category::Assignment,
            "Loop" => Category::Loop,
            "Call" => Category::Call,
            "Return" => Category::Return,
            _ => Category::Other,
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Category::from(s.as_str())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of extracted documentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub category: Category,
    /// Identifier or short label; empty when not applicable
    #[serde(default)]
    pub name: String,
    /// Docstring for definitions, source summary for everything else
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// 1-based line where the construct begins
    pub line: usize,
    /// Nested definitions (classes and functions only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Entry>,
}

impl Entry {
    pub fn new(category: Category, name: impl Into<String>, line: usize) -> Self {
        Self {
            category,
            name: name.into(),
            detail: None,
            line,
            children: Vec::new(),
        }
    }

    /// Attach a detail; empty text counts as no detail
    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail.filter(|d| !d.is_empty());
        self
    }

    pub fn with_children(mut self, children: Vec<Entry>) -> Self {
        self.children = children;
        self
    }
}
