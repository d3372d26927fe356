//! Component binding table
//!
//! Maps component names (and the intrinsic elements `pre`, `h1`..`h6`,
//! `table`, `img`, `a`) to the code that renders them. The table is fixed
//! when a [`Renderer`](super::Renderer) is built; content can only refer to
//! what is registered here.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::highlight::Highlighter;
use super::tags::Props;
use crate::error::RenderError;
use crate::helpers::html_escape;

lazy_static! {
    static ref YOUTUBE_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap();
}

const CALLOUT_TYPES: [&str; 5] = ["info", "note", "tip", "warning", "danger"];

/// A named child component, rendered, handed to its parent
#[derive(Debug, Clone)]
pub struct Slot {
    pub name: String,
    pub props: Props,
    /// The slot's rendered children
    pub html: String,
}

/// Everything a component sees when it renders
#[derive(Debug)]
pub struct ComponentInput<'a> {
    pub name: &'a str,
    pub props: &'a Props,
    /// Rendered children
    pub children: &'a str,
    /// Plain text of the children
    pub text: &'a str,
    /// Direct child components
    pub slots: &'a [Slot],
}

impl ComponentInput<'_> {
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// A prop as a string; numbers and booleans are stringified
    pub fn prop_str(&self, key: &str) -> Option<String> {
        match self.props.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn require_str(&self, key: &str) -> Result<String, RenderError> {
        self.prop_str(key)
            .ok_or_else(|| RenderError::component(self.name, format!("missing '{}' prop", key)))
    }

    pub fn prop_bool(&self, key: &str) -> bool {
        match self.props.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        }
    }
}

/// Something that can render a component
pub trait Component: Send + Sync {
    fn render(&self, input: &ComponentInput<'_>) -> Result<String, RenderError>;
}

impl<F> Component for F
where
    F: Fn(&ComponentInput<'_>) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, input: &ComponentInput<'_>) -> Result<String, RenderError> {
        self(input)
    }
}

/// Name to component lookup
#[derive(Clone, Default)]
pub struct Bindings {
    components: HashMap<String, Arc<dyn Component>>,
}

impl Bindings {
    /// An empty table: plain Markdown rendering, every component unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// The site's standard components and intrinsic overrides
    pub fn standard(highlighter: Arc<Highlighter>) -> Self {
        let mut bindings = Self::new();

        let pre = highlighter.clone();
        bindings.bind_fn("pre", move |input: &ComponentInput<'_>| {
            let code = input.prop_str("code").unwrap_or_default();
            let lang = input.prop_str("language");
            Ok(pre.highlight(&code, lang.as_deref()))
        });

        for level in 1..=6u8 {
            bindings.bind_fn(&format!("h{}", level), move |input: &ComponentInput<'_>| {
                Ok(heading_anchor(level, input))
            });
        }

        bindings.bind_fn("table", |input: &ComponentInput<'_>| {
            Ok(format!(
                r#"<div class="table-wrapper"><table>{}</table></div>"#,
                input.children
            ))
        });
        bindings.bind_fn("img", |input: &ComponentInput<'_>| Ok(lazy_image(input)));
        bindings.bind_fn("a", |input: &ComponentInput<'_>| Ok(link(input)));

        let advanced = highlighter;
        bindings.bind_fn("AdvancedCode", move |input: &ComponentInput<'_>| {
            advanced_code(&advanced, input)
        });
        bindings.bind_fn("CodeTabs", code_tabs);
        bindings.bind_fn("Tab", |input: &ComponentInput<'_>| {
            Ok(format!(r#"<div class="tab">{}</div>"#, input.children))
        });
        bindings.bind_fn("Callout", callout);
        bindings.bind_fn("YouTube", youtube);

        bindings
    }

    pub fn bind(&mut self, name: &str, component: impl Component + 'static) -> &mut Self {
        self.insert(name, Arc::new(component))
    }

    pub fn bind_fn<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&ComponentInput<'_>) -> Result<String, RenderError> + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(f))
    }

    pub fn insert(&mut self, name: &str, component: Arc<dyn Component>) -> &mut Self {
        self.components.insert(name.to_string(), component);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Component>> {
        self.components.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindings")
            .field("components", &self.names())
            .finish()
    }
}

fn attr(name: &str, value: &str) -> String {
    format!(r#" {}="{}""#, name, html_escape(value))
}

fn heading_anchor(level: u8, input: &ComponentInput<'_>) -> String {
    let id = input.prop_str("id").unwrap_or_default();
    let class = input
        .prop_str("class")
        .map(|c| attr("class", &c))
        .unwrap_or_default();
    format!(
        r##"<h{0} id="{1}"{2}><a class="anchor" href="#{1}" aria-hidden="true">#</a>{3}</h{0}>"##,
        level,
        html_escape(&id),
        class,
        input.children
    )
}

fn lazy_image(input: &ComponentInput<'_>) -> String {
    let src = input.prop_str("src").unwrap_or_default();
    let alt = input.prop_str("alt").unwrap_or_default();
    let img = format!(
        r#"<img{}{} loading="lazy" decoding="async">"#,
        attr("src", &src),
        attr("alt", &alt)
    );

    match input.prop_str("title").filter(|t| !t.is_empty()) {
        Some(caption) => format!(
            r#"<figure class="image">{}<figcaption>{}</figcaption></figure>"#,
            img,
            html_escape(&caption)
        ),
        None => img,
    }
}

fn is_external(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("//")
}

fn link(input: &ComponentInput<'_>) -> String {
    let href = input.prop_str("href").unwrap_or_default();
    let mut attrs = attr("href", &href);
    if let Some(title) = input.prop_str("title") {
        attrs.push_str(&attr("title", &title));
    }
    if is_external(&href) {
        attrs.push_str(r#" target="_blank" rel="noopener noreferrer""#);
    }
    format!("<a{}>{}</a>", attrs, input.children)
}

fn advanced_code(highlighter: &Highlighter, input: &ComponentInput<'_>) -> Result<String, RenderError> {
    let language = input
        .prop_str("language")
        .or_else(|| input.prop_str("lang"));

    let (code, body) = match input.prop_str("code") {
        Some(code) => {
            let body = highlighter.highlight(&code, language.as_deref());
            (code, body)
        }
        None if !input.text.trim().is_empty() => (input.text.to_string(), input.children.to_string()),
        None => return Err(RenderError::component(input.name, "needs a 'code' prop or a code block")),
    };

    let title = input
        .prop_str("title")
        .or_else(|| language.clone())
        .unwrap_or_else(|| "Code".to_string());

    let mut header = format!(
        r#"<span class="advanced-code-title">{}</span>"#,
        html_escape(&title)
    );
    if let Some(file) = input.prop_str("filename") {
        header.push_str(&format!(
            r#"<span class="advanced-code-file">{}</span>"#,
            html_escape(&file)
        ));
    }

    Ok(format!(
        r#"<div class="advanced-code"><div class="advanced-code-header">{}<button type="button" class="copy-button"{}>Copy</button></div>{}</div>"#,
        header,
        attr("data-code", code.trim_end()),
        body
    ))
}

fn code_tabs(input: &ComponentInput<'_>) -> Result<String, RenderError> {
    let tabs: Vec<&Slot> = input.slots.iter().filter(|s| s.name == "Tab").collect();
    if tabs.is_empty() {
        return Err(RenderError::component(input.name, "needs at least one <Tab>"));
    }

    let mut nav = String::new();
    let mut panels = String::new();
    for (i, tab) in tabs.iter().enumerate() {
        let label = ["label", "title", "language"]
            .iter()
            .find_map(|key| tab.props.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Tab {}", i + 1));
        let active = if i == 0 { " active" } else { "" };

        nav.push_str(&format!(
            r#"<button type="button" role="tab" class="code-tab{}" data-tab="{}">{}</button>"#,
            active,
            i,
            html_escape(&label)
        ));
        panels.push_str(&format!(
            r#"<div class="code-tab-panel{}" role="tabpanel" data-tab="{}"{}>{}</div>"#,
            active,
            i,
            if i == 0 { "" } else { " hidden" },
            tab.html
        ));
    }

    Ok(format!(
        r#"<div class="code-tabs"><div class="code-tabs-nav" role="tablist">{}</div>{}</div>"#,
        nav, panels
    ))
}

fn callout(input: &ComponentInput<'_>) -> Result<String, RenderError> {
    let kind = input.prop_str("type").unwrap_or_else(|| "info".to_string());
    if !CALLOUT_TYPES.contains(&kind.as_str()) {
        return Err(RenderError::component(
            input.name,
            format!("unknown type '{}'", kind),
        ));
    }

    let title = input
        .prop_str("title")
        .map(|t| format!(r#"<p class="callout-title">{}</p>"#, html_escape(&t)))
        .unwrap_or_default();

    Ok(format!(
        r#"<aside class="callout callout-{}" role="note">{}<div class="callout-body">{}</div></aside>"#,
        kind, title, input.children
    ))
}

fn youtube(input: &ComponentInput<'_>) -> Result<String, RenderError> {
    let id = input.require_str("id")?;
    if !YOUTUBE_ID_RE.is_match(&id) {
        return Err(RenderError::component(
            input.name,
            format!("'{}' is not a video id", id),
        ));
    }
    let title = input
        .prop_str("title")
        .unwrap_or_else(|| "YouTube video".to_string());

    Ok(format!(
        r#"<div class="video-embed"><iframe src="https://www.youtube-nocookie.com/embed/{}"{} loading="lazy" allow="accelerometer; encrypted-media; picture-in-picture" allowfullscreen></iframe></div>"#,
        id,
        attr("title", &title)
    ))
}
