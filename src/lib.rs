//! Codexplain - Markdown documentation for a Python source file
//!
//! Parses one Python file with tree-sitter, walks the syntax tree into an
//! ordered list of documentation entries (imports, classes, functions,
//! assignments, loops, calls, returns) and renders them as Markdown.

pub mod cli;
pub mod config;
pub mod documenter;
pub mod error;
pub mod extract;
pub mod output;
pub mod parser;
pub mod session;

// Re-export main types
pub use config::{Config, OutputFormat};
pub use documenter::{document, Documenter};
pub use error::{Error, Result};
pub use extract::{Category, Entry, Extractor};
pub use output::{HtmlRenderer, MarkdownRenderer};
pub use parser::PythonParser;
pub use session::{Session, Upload};
