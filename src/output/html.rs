// HTML pages
//
// Shows the generated documentation next to the original source: a
// standalone report for `analyze --format html`, and the interactive upload
// page served by `codexplain serve`.

use crate::config::OutputConfig;
use crate::error::Result;
use crate::extract::Entry;
use crate::output::templates::TemplateEngine;
use crate::session::Session;
use pulldown_cmark::{html, Event, Options, Parser};
use tera::Context;

/// Renders documentation and source side by side
pub struct HtmlRenderer {
    title: String,
    template_engine: TemplateEngine,
}

impl HtmlRenderer {
    pub fn new(config: &OutputConfig) -> Result<Self> {
        Ok(Self {
            title: config.title.clone(),
            template_engine: TemplateEngine::new()?,
        })
    }

    /// Standalone report page for one documented file
    pub fn render_report(
        &self,
        filename: Option<&str>,
        source: &str,
        entries: &[Entry],
        markdown: &str,
    ) -> Result<String> {
        let mut context = Context::new();
        context.insert("title", &self.title);
        context.insert("filename", &filename);
        context.insert("source", source);
        context.insert("markdown_html", &markdown_to_html(markdown));
        context.insert("entry_count", &count(entries));

        self.template_engine.render("report.html", &context)
    }

    /// Upload page showing the state of one session
    pub fn render_page(&self, session: &Session, max_upload_bytes: usize) -> Result<String> {
        let mut context = Context::new();
        context.insert("title", &self.title);
        context.insert("session", session);
        context.insert("max_upload_bytes", &max_upload_bytes);

        if let Session::Documented { entries, markdown, .. } = session {
            context.insert("markdown_html", &markdown_to_html(markdown));
            context.insert("entry_count", &count(entries));
        }

        self.template_engine.render("app.html", &context)
    }
}

/// Convert generated Markdown to HTML. Raw HTML in the input is shown as
/// text, never passed through.
fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::empty()).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, parser);
    out
}

/// Entries including nested definitions
fn count(entries: &[Entry]) -> usize {
    entries.iter().map(|e| 1 + count(&e.children)).sum()
}
