// Output generation module

pub mod html;
pub mod markdown;
pub mod templates;

pub use html::HtmlRenderer;
pub use markdown::{MarkdownRenderer, NO_CONSTRUCTS};
pub use templates::TemplateEngine;
