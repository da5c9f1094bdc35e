// Template engine for generating HTML output

use crate::error::Result;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

/// Template engine wrapping Tera with custom filters and templates
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("base.html", include_str!("../../templates/base.html.tera")),
            ("report.html", include_str!("../../templates/report.html.tera")),
            ("app.html", include_str!("../../templates/app.html.tera")),
        ])?;

        tera.register_filter("pluralize", pluralize);
        tera.register_filter("code_block", code_block);

        Ok(Self { tera })
    }

    /// Render a template with context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Pluralize a word based on count
fn pluralize(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let count = value.as_u64().unwrap_or(0);
    let singular = args
        .get("singular")
        .and_then(|v| v.as_str())
        .unwrap_or("item");
    let default_plural = format!("{}s", singular);
    let plural = args
        .get("plural")
        .and_then(|v| v.as_str())
        .unwrap_or(&default_plural);

    if count == 1 {
        Ok(Value::String(format!("{} {}", count, singular)))
    } else {
        Ok(Value::String(format!("{} {}", count, plural)))
    }
}

/// Escaped source listing with line numbers
fn code_block(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let code = value.as_str().unwrap_or("");
    let lines: Vec<String> = code
        .lines()
        .enumerate()
        .map(|(i, line)| format!("<span class=\"ln\">{}</span>{}", i + 1, html_escape(line)))
        .collect();

    Ok(Value::String(format!(
        "<pre class=\"source\"><code class=\"language-python\">{}</code></pre>",
        lines.join("\n")
    )))
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
