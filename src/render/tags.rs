//! Tag scanning for the component dialect
//!
//! Splits raw HTML and text runs into tags and text, parses component
//! props and screens raw HTML for elements that could run script.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::error::RenderError;

/// Component props in declaration order
pub type Props = IndexMap<String, Value>;

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(
        r#"(?s)(?P<comment><!--.*?-->)|<(?P<close>/)?(?P<name>[A-Za-z][A-Za-z0-9-]*)(?P<attrs>(?:\s+[^\s"'=<>/{}]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|\{(?:[^{}]|\{[^{}]*\})*\}|[^\s"'=<>`{}]+))?)*)\s*(?P<selfclose>/)?>"#
    )
    .unwrap();
    static ref ATTR_RE: Regex = Regex::new(
        r#"([^\s"'=<>/{}]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|\{((?:[^{}]|\{[^{}]*\})*)\}|([^\s"'=<>`{}]+)))?"#
    )
    .unwrap();
    static ref COMPONENT_HINT_RE: Regex = Regex::new(r"</?[A-Z]").unwrap();
    static ref MARKUP_RE: Regex = Regex::new(r"<[A-Za-z/]").unwrap();
    static ref MODULE_RE: Regex = Regex::new(
        r#"^(?:import\s+(?:[\w$*{}\s,]+\s+from\s+)?["']|export\s+(?:default\b|const\b|let\b|var\b|function\b|async\b|class\b|\{|\*))"#
    )
    .unwrap();
}

/// Elements that execute or embed foreign content
const DISALLOWED_ELEMENTS: [&str; 5] = ["script", "style", "iframe", "object", "embed"];

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment<'a> {
    Text(&'a str),
    Comment(&'a str),
    Tag(TagToken<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TagToken<'a> {
    pub name: &'a str,
    pub closing: bool,
    pub self_closing: bool,
    pub attrs: &'a str,
    pub raw: &'a str,
    /// Byte offset of the tag within the scanned input
    pub offset: usize,
}

impl TagToken<'_> {
    /// Capitalised tags are components, lowercase ones are plain HTML
    pub fn is_component(&self) -> bool {
        self.name.starts_with(|c: char| c.is_ascii_uppercase())
    }
}

pub(crate) fn scan(input: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in TOKEN_RE.captures_iter(input) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            segments.push(Segment::Text(&input[last..whole.start()]));
        }

        if caps.name("comment").is_some() {
            segments.push(Segment::Comment(whole.as_str()));
        } else {
            segments.push(Segment::Tag(TagToken {
                name: caps.name("name").map_or("", |m| m.as_str()),
                closing: caps.name("close").is_some(),
                self_closing: caps.name("selfclose").is_some(),
                attrs: caps.name("attrs").map_or("", |m| m.as_str()),
                raw: whole.as_str(),
                offset: whole.start(),
            }));
        }
        last = whole.end();
    }

    if last < input.len() {
        segments.push(Segment::Text(&input[last..]));
    }
    segments
}

/// Whether a text run may contain component tags
pub(crate) fn has_component_hint(text: &str) -> bool {
    COMPONENT_HINT_RE.is_match(text)
}

/// Whether text left over after tokenizing still opens a tag
pub(crate) fn has_markup(text: &str) -> bool {
    MARKUP_RE.is_match(text)
}

/// A line consisting of exactly one component tag
pub(crate) fn is_component_line(line: &str) -> bool {
    match scan(line.trim()).as_slice() {
        [Segment::Tag(tag)] => tag.is_component(),
        _ => false,
    }
}

/// An ESM `import`/`export` statement
pub(crate) fn is_module_statement(line: &str) -> bool {
    MODULE_RE.is_match(line)
}

/// Parse the attribute list of a component tag
pub(crate) fn parse_props(component: &str, attrs: &str, line: usize) -> Result<Props, RenderError> {
    let mut props = Props::new();

    for caps in ATTR_RE.captures_iter(attrs) {
        let name = caps[1].to_string();
        let quoted = caps.get(2).or(caps.get(3)).or(caps.get(5));

        let value = if let Some(value) = quoted {
            Value::String(value.as_str().to_string())
        } else if let Some(expr) = caps.get(4) {
            parse_expression(expr.as_str()).map_err(|message| RenderError::InvalidProp {
                component: component.to_string(),
                prop: name.clone(),
                message,
                line,
            })?
        } else {
            Value::Bool(true)
        };

        props.insert(name, value);
    }

    Ok(props)
}

/// `{...}` prop values must be literals: JSON or a single-quoted string
fn parse_expression(expr: &str) -> Result<Value, String> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err("empty expression".to_string());
    }

    if let Some(inner) = expr
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        if !inner.contains('\'') {
            return Ok(Value::String(inner.to_string()));
        }
    }

    serde_json::from_str(expr).map_err(|_| format!("'{{{}}}' is not a literal value", expr))
}

/// Reject raw HTML that could run script
pub(crate) fn check_intrinsic(tag: &TagToken<'_>) -> Result<(), String> {
    let name = tag.name.to_ascii_lowercase();
    if DISALLOWED_ELEMENTS.contains(&name.as_str()) {
        return Err(format!("<{}> is not allowed in content", name));
    }

    for caps in ATTR_RE.captures_iter(tag.attrs) {
        let attr = &caps[1];
        let is_handler = attr.len() > 2
            && attr
                .get(..2)
                .map_or(false, |prefix| prefix.eq_ignore_ascii_case("on"));
        if is_handler {
            return Err(format!("event handler attribute '{}' is not allowed", attr));
        }

        let value = caps.get(2).or(caps.get(3)).or(caps.get(5));
        if let Some(value) = value {
            if value
                .as_str()
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("javascript:")
            {
                return Err(format!("javascript: URL in '{}' is not allowed", attr));
            }
        }
    }

    Ok(())
}
