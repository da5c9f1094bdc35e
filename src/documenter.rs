// Documentation pipeline: source text -> syntax tree -> entries -> Markdown

use crate::config::Config;
use crate::error::Result;
use crate::extract::{Entry, Extractor};
use crate::output::MarkdownRenderer;
use crate::parser::PythonParser;

/// Runs the parse, extract and render steps for one source text at a time.
///
/// Holds a tree-sitter parser, so each thread needs its own instance; nothing
/// carries over from one call to the next.
pub struct Documenter {
    parser: PythonParser,
    extractor: Extractor,
    renderer: MarkdownRenderer,
}

impl Documenter {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            parser: PythonParser::new()?,
            extractor: Extractor::new(&config.extract),
            renderer: MarkdownRenderer::new(&config.output),
        })
    }

    /// Parse and extract; fails on syntax errors with no partial result
    pub fn extract(&mut self, source: &str) -> Result<Vec<Entry>> {
        let tree = self.parser.parse(source)?;
        self.extractor.extract(&tree, source)
    }

    pub fn render(&self, entries: &[Entry]) -> String {
        self.renderer.render(entries)
    }

    /// Full pipeline to Markdown
    pub fn document(&mut self, source: &str) -> Result<String> {
        let entries = self.extract(source)?;
        Ok(self.render(&entries))
    }
}

/// Document source text with the default configuration
pub fn document(source: &str) -> Result<String> {
    Documenter::new(&Config::default())?.document(source)
}
