// Markdown renderer
//
// Groups entries into one section per category in a fixed order. Within a
// section entries keep the order they arrive in, which is source order for
// anything produced by the extractor.

use crate::config::OutputConfig;
use crate::extract::{Category, Entry};

/// Text used when there is nothing to document
pub const NO_CONSTRUCTS: &str = "_No constructs found._";

/// Renders an entry sequence as a Markdown document
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    title: String,
    line_numbers: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(&OutputConfig::default())
    }
}

impl MarkdownRenderer {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            title: config.title.clone(),
            line_numbers: config.line_numbers,
        }
    }

    /// Render the document. Never fails; an empty sequence yields a minimal
    /// document saying no constructs were found.
    pub fn render(&self, entries: &[Entry]) -> String {
        let mut md = format!("# {}\n\n", self.title);

        if entries.is_empty() {
            md.push_str(NO_CONSTRUCTS);
            md.push('\n');
            return md;
        }

        let sections: Vec<String> = Category::ORDER
            .iter()
            .filter_map(|category| self.section(*category, entries))
            .collect();
        md.push_str(&sections.join("\n"));
        md
    }

    fn section(&self, category: Category, entries: &[Entry]) -> Option<String> {
        let items: Vec<&Entry> = entries.iter().filter(|e| e.category == category).collect();
        if items.is_empty() {
            return None;
        }

        let mut md = format!("## {}\n\n", category.heading());
        for entry in items {
            self.item(&mut md, entry, 0);
        }
        Some(md)
    }

    fn item(&self, md: &mut String, entry: &Entry, level: usize) {
        let indent = "  ".repeat(level);
        md.push_str(&indent);
        md.push_str("- ");
        md.push_str(&label(entry));
        if self.line_numbers {
            md.push_str(&format!(" (line {})", entry.line));
        }
        md.push('\n');

        if entry.category.is_definition() {
            if let Some(doc) = &entry.detail {
                for line in doc.lines() {
                    md.push_str(&indent);
                    if line.is_empty() {
                        md.push_str("  >\n");
                    } else {
                        md.push_str(&format!("  > {}\n", line));
                    }
                }
            }
        }

        for child in &entry.children {
            self.item(md, child, level + 1);
        }
    }
}

/// One-line label of an entry, by category
fn label(entry: &Entry) -> String {
    let detail = entry.detail.as_deref();
    match entry.category {
        Category::Import => match detail {
            Some(names) => format!("from {} import {}", code(&entry.name), code(names)),
            None => code(&entry.name),
        },
        Category::ClassDef => format!("class {}", code(&entry.name)),
        Category::FunctionDef => format!("def {}", code(&entry.name)),
        Category::Assignment => match detail {
            Some(value) => code(&format!("{} = {}", entry.name, value)),
            None => code(&entry.name),
        },
        Category::Loop => code(detail.unwrap_or(&entry.name)),
        Category::Call => code(&format!("{}({})", entry.name, detail.unwrap_or(""))),
        Category::Return => match detail {
            Some(value) => code(&format!("return {}", value)),
            None => code("return"),
        },
        Category::Other => match detail {
            Some(d) if entry.name.is_empty() => code(d),
            Some(d) => format!("{}: {}", code(&entry.name), d),
            None => code(&entry.name),
        },
    }
}

/// Inline code span that survives backticks in `text`.
///
/// The fence is one backtick longer than the longest run inside, and the
/// text is padded with a space where CommonMark would otherwise merge it
/// with the fence or strip its own edge spaces.
fn code(text: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }

    let fence = "`".repeat(longest + 1);
    let edge_spaces = text.starts_with(' ') && text.ends_with(' ') && !text.trim().is_empty();
    let pad = if text.starts_with('`') || text.ends_with('`') || edge_spaces {
        " "
    } else {
        ""
    };

    format!("{fence}{pad}{text}{pad}{fence}")
}
