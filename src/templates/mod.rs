//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping is on for every
//! template; rendered document bodies are inserted with `| safe`.

use anyhow::Result;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::content::parse_date_string;
use crate::helpers::{strip_html, truncate};

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("listing.html", include_str!("site/listing.html")),
            ("article.html", include_str!("site/article.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            // Partials
            ("partials/card.html", include_str!("site/partials/card.html")),
            ("partials/pager.html", include_str!("site/partials/pager.html")),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 160,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    Ok(tera::Value::String(truncate(&s, length, Some(&omission))))
}

/// Tera filter: reformat a front-matter date with a strftime pattern
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "%B %-d, %Y".to_string(),
    };

    // Unparseable dates are shown as written
    match parse_date_string(&s) {
        Some(date) => Ok(tera::Value::String(date.format(&format).to_string())),
        None => Ok(tera::Value::String(s)),
    }
}
