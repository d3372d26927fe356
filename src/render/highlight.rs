//! Code block highlighting with syntect

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;
use crate::helpers::html_escape;

const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Syntax highlighter shared by every render
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Option<Theme>,
    line_numbers: bool,
}

impl Highlighter {
    /// Create a highlighter with the default theme and line numbers
    pub fn new() -> Self {
        Self::with_options(DEFAULT_THEME, true)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = match themes.remove(theme) {
            Some(found) => Some(found),
            None => {
                tracing::warn!("Unknown highlight theme '{}', using {}", theme, DEFAULT_THEME);
                themes
                    .remove(DEFAULT_THEME)
                    .or_else(|| themes.into_values().next())
            }
        };

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            line_numbers,
        }
    }

    /// Highlighter as configured, or a plain one when highlighting is off
    pub fn from_config(config: &HighlightConfig) -> Self {
        if config.enable {
            Self::with_options(&config.theme, config.line_number)
        } else {
            Self {
                syntax_set: SyntaxSet::load_defaults_newlines(),
                theme: None,
                line_numbers: config.line_number,
            }
        }
    }

    /// Highlight a code block
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.filter(|l| !l.is_empty()).unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let highlighted = self.theme.as_ref().and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme)
                .map_err(|e| tracing::debug!("Highlighting {} failed: {}", lang, e))
                .ok()
        });

        let inner = highlighted.unwrap_or_else(|| {
            format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                html_escape(lang),
                html_escape(code)
            )
        });

        if self.line_numbers {
            self.add_line_numbers(code, &inner, lang)
        } else {
            inner
        }
    }

    /// Wrap highlighted code in a table with a line number gutter
    fn add_line_numbers(&self, code: &str, highlighted: &str, lang: &str) -> String {
        let line_count = code.lines().count().max(1);

        let gutter = (1..=line_count)
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            html_escape(lang),
            gutter,
            highlighted
        )
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_with_line_numbers() {
        let highlighter = Highlighter::new();
        let html = highlighter.highlight("fn main() {}\nlet x = 1;\n", Some("rust"));
        assert!(html.contains(r#"<figure class="highlight rust">"#));
        assert!(html.contains(r#"<span class="line-number">2</span>"#));
        assert!(!html.contains(r#"<span class="line-number">3</span>"#));
    }

    #[test]
    fn test_plain_when_disabled() {
        let config = HighlightConfig {
            enable: false,
            line_number: false,
            ..Default::default()
        };
        let highlighter = Highlighter::from_config(&config);
        let html = highlighter.highlight("a < b", None);
        assert_eq!(
            html,
            r#"<pre><code class="language-text">a &lt; b</code></pre>"#
        );
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let highlighter = Highlighter::with_options("no-such-theme", false);
        let html = highlighter.highlight("x = 1\n", Some("python"));
        assert!(html.contains("<pre"));
        assert!(html.contains("style="));
    }
}
