//! Document renderer - Markdown with embedded components to HTML
//!
//! A body is compiled into a tree, every component tag resolved against a
//! fixed [`Bindings`] table, and the tree written out as HTML. Rendering is
//! all-or-nothing and keeps no state between calls.

mod bindings;
mod highlight;
mod html;
mod live;
mod tags;
mod tree;

use serde::Serialize;
use std::sync::Arc;

pub use bindings::{Bindings, Component, ComponentInput, Slot};
pub use highlight::Highlighter;
pub use live::{LiveOutput, LiveRenderer, LiveState};
pub use tags::Props;
pub use tree::{compile, Document, Heading, Node};

use crate::config::HighlightConfig;
use crate::error::RenderError;
use crate::helpers::{error_panel, html_escape};
use html::HtmlWriter;

/// HTML of a rendered body plus its outline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDocument {
    pub html: String,
    pub headings: Vec<Heading>,
}

impl RenderedDocument {
    /// Nested list of links to the document's headings
    pub fn toc_html(&self) -> String {
        toc_html(&self.headings)
    }
}

/// Render a body against a binding table
pub fn render(body: &str, bindings: &Bindings) -> Result<RenderedDocument, RenderError> {
    let document = compile(body, bindings)?;
    let html = HtmlWriter::new(bindings).write(&document.nodes)?;
    Ok(RenderedDocument {
        html,
        headings: document.headings,
    })
}

/// Table of contents for an outline; levels are nested relative to the
/// shallowest heading
pub fn toc_html(headings: &[Heading]) -> String {
    let Some(base) = headings.iter().map(|h| h.level).min() else {
        return String::new();
    };

    let mut html = String::from(r#"<ol class="toc">"#);
    let mut depth = 0usize;
    let mut open_item = false;

    for heading in headings {
        let level = usize::from(heading.level - base);
        while depth < level {
            html.push_str(r#"<ol class="toc-child">"#);
            depth += 1;
            open_item = false;
        }
        while depth > level {
            html.push_str("</li></ol>");
            depth -= 1;
            open_item = true;
        }
        if open_item {
            html.push_str("</li>");
        }
        html.push_str(&format!(
            r##"<li class="toc-item toc-level-{}"><a class="toc-link" href="#{}">{}</a>"##,
            heading.level,
            html_escape(&heading.id),
            html_escape(&heading.text)
        ));
        open_item = true;
    }

    while depth > 0 {
        html.push_str("</li></ol>");
        depth -= 1;
    }
    html.push_str("</li></ol>");
    html
}

/// Result of a render that never fails: on error the HTML is an error
/// panel followed by the escaped body
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutcome {
    pub html: String,
    pub headings: Vec<Heading>,
    pub error: Option<String>,
}

/// A binding table ready to render documents
#[derive(Debug, Clone)]
pub struct Renderer {
    bindings: Arc<Bindings>,
}

impl Renderer {
    pub fn new(bindings: Bindings) -> Self {
        Self {
            bindings: Arc::new(bindings),
        }
    }

    /// Renderer with the standard components, highlighting as configured
    pub fn standard(config: &HighlightConfig) -> Self {
        let highlighter = Arc::new(Highlighter::from_config(config));
        Self::new(Bindings::standard(highlighter))
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Check a body without producing HTML
    pub fn compile(&self, body: &str) -> Result<Document, RenderError> {
        compile(body, &self.bindings)
    }

    pub fn render(&self, body: &str) -> Result<RenderedDocument, RenderError> {
        render(body, &self.bindings)
    }

    pub fn render_or_fallback(&self, body: &str) -> RenderOutcome {
        match self.render(body) {
            Ok(doc) => RenderOutcome {
                html: doc.html,
                headings: doc.headings,
                error: None,
            },
            Err(e) => {
                tracing::warn!("Render failed: {}", e);
                let message = e.to_string();
                RenderOutcome {
                    html: error_panel(&message, body),
                    headings: Vec::new(),
                    error: Some(message),
                }
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::standard(&HighlightConfig::default())
    }
}
