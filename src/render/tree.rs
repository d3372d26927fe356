//! Compile a document body into a render tree
//!
//! Markdown structure comes from pulldown-cmark. Component tags arrive as
//! raw HTML (or, for props pulldown-cmark does not recognise as HTML, as
//! text) and are matched up on a frame stack so that Markdown between an
//! opening and a closing tag becomes the component's children. Every
//! component name is resolved against the binding table at compile time.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;

use super::bindings::Bindings;
use super::tags::{self, Props, Segment, TagToken};
use crate::error::RenderError;
use crate::helpers::html_escape;

/// A node of the render tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An intrinsic HTML element produced by Markdown syntax
    Element {
        name: String,
        attrs: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Text(String),
    /// Inline code span
    Code(String),
    CodeBlock {
        lang: Option<String>,
        code: String,
    },
    Image {
        src: String,
        alt: String,
        title: String,
    },
    /// Raw HTML passed through from the body
    Html(String),
    Component {
        name: String,
        props: Props,
        children: Vec<Node>,
    },
}

/// An entry of the document outline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// A compiled document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub nodes: Vec<Node>,
    pub headings: Vec<Heading>,
}

/// Plain text content of a list of nodes
pub fn plain_text(nodes: &[Node]) -> String {
    let mut text = String::new();
    collect_text(nodes, &mut text);
    text
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) | Node::Code(t) => out.push_str(t),
            Node::CodeBlock { code, .. } => out.push_str(code),
            Node::Image { alt, .. } => out.push_str(alt),
            Node::Element { children, .. } | Node::Component { children, .. } => {
                collect_text(children, out)
            }
            Node::Html(_) => {}
        }
    }
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Compile `body` against `bindings`
pub fn compile(body: &str, bindings: &Bindings) -> Result<Document, RenderError> {
    let source = Source::normalize(body)?;
    let mut compiler = Compiler::new(&source, bindings);

    for (event, range) in Parser::new_ext(&source.text, options()).into_offset_iter() {
        compiler.event(event, range)?;
    }

    compiler.finish()
}

const PLACEHOLDER_PREFIX: &str = "<!--folio-component:";
const PLACEHOLDER_SUFFIX: &str = "-->";

/// Body text prepared for the Markdown parser.
///
/// A component tag standing alone on a line is swapped for a placeholder
/// comment between blank lines, so it always becomes its own HTML block
/// and the lines around it are parsed as Markdown. `line_map` maps each
/// prepared line back to the authored line for error messages.
struct Source {
    text: String,
    line_starts: Vec<usize>,
    line_map: Vec<usize>,
    /// Tag text and authored line of every placeholder
    components: Vec<(String, usize)>,
}

impl Source {
    fn normalize(body: &str) -> Result<Self, RenderError> {
        let mut source = Source {
            text: String::with_capacity(body.len() + 64),
            line_starts: Vec::new(),
            line_map: Vec::new(),
            components: Vec::new(),
        };
        let mut fence: Option<(char, usize)> = None;
        let mut prev_blank = true;

        for (idx, line) in body.lines().enumerate() {
            let lineno = idx + 1;
            let trimmed = line.trim();

            if let Some((marker, len)) = fence {
                if closes_fence(trimmed, marker, len) {
                    fence = None;
                }
                source.push_line(line, lineno);
                continue;
            }

            if let Some(opened) = opens_fence(trimmed) {
                fence = Some(opened);
                source.push_line(line, lineno);
                prev_blank = false;
                continue;
            }

            if prev_blank && tags::is_module_statement(line) {
                return Err(RenderError::ModuleStatement { line: lineno });
            }

            let indent = line.len() - line.trim_start().len();
            if indent < 4 && tags::is_component_line(trimmed) {
                if !prev_blank {
                    source.push_line("", lineno);
                }
                let placeholder = format!(
                    "{}{}{}",
                    PLACEHOLDER_PREFIX,
                    source.components.len(),
                    PLACEHOLDER_SUFFIX
                );
                source.components.push((trimmed.to_string(), lineno));
                source.push_line(&placeholder, lineno);
                source.push_line("", lineno);
                prev_blank = true;
                continue;
            }

            source.push_line(line, lineno);
            prev_blank = trimmed.is_empty();
        }

        Ok(source)
    }

    fn push_line(&mut self, line: &str, lineno: usize) {
        self.line_starts.push(self.text.len());
        self.line_map.push(lineno);
        self.text.push_str(line);
        self.text.push('\n');
    }

    /// Authored line number of a byte offset into `text`
    fn line_of(&self, offset: usize) -> usize {
        let idx = self.line_starts.partition_point(|&start| start <= offset);
        self.line_map
            .get(idx.saturating_sub(1))
            .copied()
            .unwrap_or(1)
    }

    /// The component line a placeholder comment stands for
    fn component(&self, comment: &str) -> Option<(&str, usize)> {
        let idx: usize = comment
            .strip_prefix(PLACEHOLDER_PREFIX)?
            .strip_suffix(PLACEHOLDER_SUFFIX)?
            .parse()
            .ok()?;
        self.components
            .get(idx)
            .map(|(tag, line)| (tag.as_str(), *line))
    }
}

fn opens_fence(trimmed: &str) -> Option<(char, usize)> {
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    (len >= 3).then_some((marker, len))
}

fn closes_fence(trimmed: &str, marker: char, len: usize) -> bool {
    let run = trimmed.chars().take_while(|c| *c == marker).count();
    run >= len && trimmed[run * marker.len_utf8()..].trim().is_empty()
}

enum FrameKind {
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Heading {
        level: u8,
        id: Option<String>,
        classes: Vec<String>,
    },
    Table {
        aligns: Vec<Alignment>,
    },
    TableHead,
    CodeBlock {
        lang: Option<String>,
    },
    Image {
        src: String,
        title: String,
    },
    Component {
        name: String,
        props: Props,
        line: usize,
    },
    /// Markdown containers with no HTML of their own
    Transparent,
}

struct Frame {
    kind: FrameKind,
    children: Vec<Node>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }
}

struct Compiler<'a> {
    source: &'a Source,
    bindings: &'a Bindings,
    root: Vec<Node>,
    stack: Vec<Frame>,
    headings: Vec<Heading>,
    heading_ids: HashMap<String, usize>,
    /// Adjacent text events, joined before scanning for tags
    pending: Option<PendingText>,
}

struct PendingText {
    text: String,
    offset: usize,
    /// Positions in `text` of `<` written as `\<` or an entity
    escaped: Vec<usize>,
}

impl<'a> Compiler<'a> {
    fn new(source: &'a Source, bindings: &'a Bindings) -> Self {
        Self {
            source,
            bindings,
            root: Vec::new(),
            stack: Vec::new(),
            headings: Vec::new(),
            heading_ids: HashMap::new(),
            pending: None,
        }
    }

    fn push(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(frame) => frame.children.push(node),
            None => self.root.push(node),
        }
    }

    fn in_code_block(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Frame {
                kind: FrameKind::CodeBlock { .. },
                ..
            })
        )
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) -> Result<(), RenderError> {
        if let Event::Text(text) = &event {
            self.push_text(text, range);
            return Ok(());
        }
        self.flush_text()?;
        let offset = range.start;

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(TagEnd::HtmlBlock) => Ok(()),
            Event::End(_) => self.end(),
            Event::Code(code) => {
                self.push(Node::Code(code.to_string()));
                Ok(())
            }
            Event::Html(html) | Event::InlineHtml(html) => self.html(&html, offset),
            Event::SoftBreak => {
                self.push(Node::Text("\n".to_string()));
                Ok(())
            }
            Event::HardBreak => {
                self.push(element("br", Vec::new()));
                Ok(())
            }
            Event::Rule => {
                self.push(element("hr", Vec::new()));
                Ok(())
            }
            Event::TaskListMarker(checked) => {
                let checked = if checked { " checked" } else { "" };
                self.push(Node::Html(format!(
                    r#"<input type="checkbox" disabled{}>"#,
                    checked
                )));
                Ok(())
            }
            Event::FootnoteReference(label) => {
                let label = html_escape(&label);
                self.push(Node::Html(format!(
                    r##"<sup class="footnote-reference"><a href="#fn-{0}">{0}</a></sup>"##,
                    label
                )));
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn start(&mut self, tag: Tag<'_>) -> Result<(), RenderError> {
        let kind = match tag {
            Tag::HtmlBlock => return Ok(()),
            Tag::Paragraph => element_frame("p", Vec::new()),
            Tag::Heading {
                level, id, classes, ..
            } => FrameKind::Heading {
                level: level as u8,
                id: id.map(|id| id.to_string()),
                classes: classes.iter().map(|c| c.to_string()).collect(),
            },
            Tag::BlockQuote(_) => element_frame("blockquote", Vec::new()),
            Tag::CodeBlock(kind) => FrameKind::CodeBlock {
                lang: match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(|lang| lang.to_string()),
                    CodeBlockKind::Indented => None,
                },
            },
            Tag::List(Some(start)) => {
                let attrs = if start == 1 {
                    Vec::new()
                } else {
                    vec![("start".to_string(), start.to_string())]
                };
                element_frame("ol", attrs)
            }
            Tag::List(None) => element_frame("ul", Vec::new()),
            Tag::Item => element_frame("li", Vec::new()),
            Tag::FootnoteDefinition(label) => element_frame(
                "div",
                vec![
                    ("class".to_string(), "footnote-definition".to_string()),
                    ("id".to_string(), format!("fn-{}", label)),
                ],
            ),
            Tag::Table(aligns) => FrameKind::Table { aligns },
            Tag::TableHead => FrameKind::TableHead,
            Tag::TableRow => element_frame("tr", Vec::new()),
            Tag::TableCell => self.table_cell(),
            Tag::Emphasis => element_frame("em", Vec::new()),
            Tag::Strong => element_frame("strong", Vec::new()),
            Tag::Strikethrough => element_frame("del", Vec::new()),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut attrs = vec![("href".to_string(), dest_url.to_string())];
                if !title.is_empty() {
                    attrs.push(("title".to_string(), title.to_string()));
                }
                element_frame("a", attrs)
            }
            Tag::Image {
                dest_url, title, ..
            } => FrameKind::Image {
                src: dest_url.to_string(),
                title: title.to_string(),
            },
            _ => FrameKind::Transparent,
        };

        self.stack.push(Frame::new(kind));
        Ok(())
    }

    fn table_cell(&self) -> FrameKind {
        let (in_head, column) = match self.stack.last() {
            Some(frame) => (
                matches!(frame.kind, FrameKind::TableHead),
                frame.children.len(),
            ),
            None => (false, 0),
        };

        let align = self.stack.iter().rev().find_map(|frame| match &frame.kind {
            FrameKind::Table { aligns } => aligns.get(column).copied(),
            _ => None,
        });

        let mut attrs = Vec::new();
        let style = match align {
            Some(Alignment::Left) => Some("left"),
            Some(Alignment::Center) => Some("center"),
            Some(Alignment::Right) => Some("right"),
            _ => None,
        };
        if let Some(style) = style {
            attrs.push(("style".to_string(), format!("text-align: {}", style)));
        }

        element_frame(if in_head { "th" } else { "td" }, attrs)
    }

    fn end(&mut self) -> Result<(), RenderError> {
        let Some(frame) = self.stack.pop() else {
            return Ok(());
        };
        let children = frame.children;

        let node = match frame.kind {
            FrameKind::Component { name, line, .. } => {
                return Err(RenderError::UnclosedComponent { name, line });
            }
            FrameKind::Transparent => {
                for child in children {
                    self.push(child);
                }
                return Ok(());
            }
            FrameKind::Element { name, attrs } => Node::Element {
                name,
                attrs,
                children,
            },
            FrameKind::Heading { level, id, classes } => {
                let text = plain_text(&children).trim().to_string();
                let id = self.unique_id(id.unwrap_or_else(|| slug::slugify(&text)));
                self.headings.push(Heading {
                    level,
                    id: id.clone(),
                    text,
                });

                let mut attrs = vec![("id".to_string(), id)];
                if !classes.is_empty() {
                    attrs.push(("class".to_string(), classes.join(" ")));
                }
                Node::Element {
                    name: format!("h{}", level),
                    attrs,
                    children,
                }
            }
            FrameKind::Table { .. } => {
                let mut head = Vec::new();
                let mut rows = Vec::new();
                for child in children {
                    match &child {
                        Node::Element { name, .. } if name == "thead" => head.push(child),
                        _ => rows.push(child),
                    }
                }
                if !rows.is_empty() {
                    head.push(element("tbody", rows));
                }
                element("table", head)
            }
            FrameKind::TableHead => element("thead", vec![element("tr", children)]),
            FrameKind::CodeBlock { lang } => Node::CodeBlock {
                lang,
                code: plain_text(&children),
            },
            FrameKind::Image { src, title } => Node::Image {
                src,
                alt: plain_text(&children),
                title,
            },
        };

        self.push(node);
        Ok(())
    }

    /// Queue decoded text, remembering which `<` were escaped in the source
    fn push_text(&mut self, text: &str, range: Range<usize>) {
        let source = self.source;
        let raw = source.text.get(range.clone()).unwrap_or("");
        let escaped_start = is_escaped(&source.text, range.start) || raw.starts_with("\\<");
        // decoded `<` with none in the source came from an entity
        let from_entity = !raw.contains('<');

        let pending = self.pending.get_or_insert_with(|| PendingText {
            text: String::new(),
            offset: range.start,
            escaped: Vec::new(),
        });
        let base = pending.text.len();
        for (idx, _) in text.match_indices('<') {
            if from_entity || (idx == 0 && escaped_start) {
                pending.escaped.push(base + idx);
            }
        }
        pending.text.push_str(text);
    }

    fn flush_text(&mut self) -> Result<(), RenderError> {
        let Some(PendingText {
            text,
            offset,
            escaped,
        }) = self.pending.take()
        else {
            return Ok(());
        };

        if self.in_code_block() || !tags::has_component_hint(&text) {
            self.push(Node::Text(text));
            return Ok(());
        }

        // Component tags whose props pulldown-cmark did not accept as HTML
        for segment in tags::scan(&text) {
            match segment {
                Segment::Tag(tag) if tag.is_component() && !escaped.contains(&tag.offset) => {
                    let line = self.source.line_of(offset + tag.offset);
                    self.component_tag(&tag, line)?
                }
                Segment::Tag(TagToken { raw, .. }) | Segment::Comment(raw) | Segment::Text(raw) => {
                    self.push(Node::Text(raw.to_string()))
                }
            }
        }
        Ok(())
    }

    fn html(&mut self, html: &str, offset: usize) -> Result<(), RenderError> {
        let source = self.source;

        if let Some((line_text, line)) = source.component(html.trim()) {
            for segment in tags::scan(line_text) {
                if let Segment::Tag(tag) = segment {
                    self.component_tag(&tag, line)?;
                }
            }
            return Ok(());
        }

        for segment in tags::scan(html) {
            match segment {
                Segment::Tag(tag) if tag.is_component() => {
                    let line = source.line_of(offset + tag.offset);
                    self.component_tag(&tag, line)?
                }
                Segment::Tag(tag) => {
                    tags::check_intrinsic(&tag).map_err(|message| {
                        RenderError::DisallowedHtml {
                            message,
                            line: self.source.line_of(offset + tag.offset),
                        }
                    })?;
                    self.push(Node::Html(tag.raw.to_string()));
                }
                Segment::Text(raw) if tags::has_markup(raw) => {
                    return Err(RenderError::DisallowedHtml {
                        message: "unrecognised HTML tag".to_string(),
                        line: source.line_of(offset),
                    });
                }
                Segment::Comment(raw) | Segment::Text(raw) => {
                    if !raw.is_empty() {
                        self.push(Node::Html(raw.to_string()));
                    }
                }
            }
        }
        Ok(())
    }

    fn component_tag(&mut self, tag: &TagToken<'_>, line: usize) -> Result<(), RenderError> {
        if tag.closing {
            return self.close_component(tag.name, line);
        }

        if !self.bindings.contains(tag.name) {
            return Err(RenderError::UnknownComponent {
                name: tag.name.to_string(),
                line,
            });
        }

        let props = tags::parse_props(tag.name, tag.attrs, line)?;
        if tag.self_closing {
            self.push(Node::Component {
                name: tag.name.to_string(),
                props,
                children: Vec::new(),
            });
        } else {
            self.stack.push(Frame::new(FrameKind::Component {
                name: tag.name.to_string(),
                props,
                line,
            }));
        }
        Ok(())
    }

    fn close_component(&mut self, name: &str, line: usize) -> Result<(), RenderError> {
        let open = match self.stack.last() {
            Some(Frame {
                kind: FrameKind::Component { name: open, .. },
                ..
            }) => open.clone(),
            _ => {
                return Err(RenderError::UnexpectedClosingTag {
                    name: name.to_string(),
                    line,
                })
            }
        };

        if open != name {
            return Err(RenderError::MismatchedClosingTag {
                expected: open,
                found: name.to_string(),
                line,
            });
        }

        if let Some(Frame {
            kind: FrameKind::Component { name, props, .. },
            children,
        }) = self.stack.pop()
        {
            self.push(Node::Component {
                name,
                props,
                children,
            });
        }
        Ok(())
    }

    fn unique_id(&mut self, base: String) -> String {
        let base = if base.is_empty() {
            "section".to_string()
        } else {
            base
        };
        let count = self.heading_ids.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        id
    }

    fn finish(mut self) -> Result<Document, RenderError> {
        self.flush_text()?;

        if let Some(Frame {
            kind: FrameKind::Component { name, line, .. },
            ..
        }) = self
            .stack
            .into_iter()
            .rev()
            .find(|frame| matches!(frame.kind, FrameKind::Component { .. }))
        {
            return Err(RenderError::UnclosedComponent { name, line });
        }

        Ok(Document {
            nodes: self.root,
            headings: self.headings,
        })
    }
}

/// Whether the byte at `at` follows an odd run of backslashes
fn is_escaped(text: &str, at: usize) -> bool {
    text.get(..at).map_or(false, |before| {
        before.bytes().rev().take_while(|b| *b == b'\\').count() % 2 == 1
    })
}

fn element_frame(name: &str, attrs: Vec<(String, String)>) -> FrameKind {
    FrameKind::Element {
        name: name.to_string(),
        attrs,
    }
}

fn element(name: &str, children: Vec<Node>) -> Node {
    Node::Element {
        name: name.to_string(),
        attrs: Vec::new(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::bindings::ComponentInput;
    use serde_json::json;

    fn bindings() -> Bindings {
        let mut bindings = Bindings::new();
        for name in ["Widget", "Callout", "Tabs", "Tab", "Chart"] {
            bindings.bind_fn(name, |input: &ComponentInput<'_>| {
                Ok(input.children.to_string())
            });
        }
        bindings
    }

    fn compile_ok(body: &str) -> Document {
        compile(body, &bindings()).unwrap()
    }

    fn find_component<'n>(nodes: &'n [Node], wanted: &str) -> Option<&'n Node> {
        for node in nodes {
            match node {
                Node::Component { name, .. } if name == wanted => return Some(node),
                Node::Element { children, .. } | Node::Component { children, .. } => {
                    if let Some(found) = find_component(children, wanted) {
                        return Some(found);
                    }
                }
                _ => {}
            }
        }
        None
    }

    #[test]
    fn test_inline_component_in_paragraph() {
        let doc = compile_ok("Some **bold** text with a <Widget foo=\"1\" /> embed");
        match &doc.nodes[0] {
            Node::Element { name, children, .. } => {
                assert_eq!(name, "p");
                assert!(children
                    .iter()
                    .any(|c| matches!(c, Node::Element { name, .. } if name == "strong")));
            }
            other => panic!("unexpected node {:?}", other),
        }
        match find_component(&doc.nodes, "Widget") {
            Some(Node::Component { props, children, .. }) => {
                assert_eq!(props["foo"], json!("1"));
                assert!(children.is_empty());
            }
            other => panic!("widget not found: {:?}", other),
        }
    }

    #[test]
    fn test_block_component_children_are_markdown() {
        let doc = compile_ok("<Callout type=\"info\">\nSome *emphasis* here\n</Callout>\n\nAfter");
        assert_eq!(doc.nodes.len(), 2);
        match &doc.nodes[0] {
            Node::Component { name, children, .. } => {
                assert_eq!(name, "Callout");
                assert!(matches!(&children[0], Node::Element { name, .. } if name == "p"));
                assert_eq!(plain_text(children), "Some emphasis here");
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_nested_components_with_code() {
        let body = "<Tabs>\n<Tab label=\"Rust\">\n```rust\nfn main() {}\n```\n</Tab>\n<Tab label=\"Go\">\n```go\nfunc main() {}\n```\n</Tab>\n</Tabs>\n";
        let doc = compile_ok(body);
        assert_eq!(doc.nodes.len(), 1);
        match &doc.nodes[0] {
            Node::Component { name, children, .. } => {
                assert_eq!(name, "Tabs");
                let tabs: Vec<_> = children
                    .iter()
                    .filter(|c| matches!(c, Node::Component { .. }))
                    .collect();
                assert_eq!(tabs.len(), 2);
                match tabs[0] {
                    Node::Component { props, children, .. } => {
                        assert_eq!(props["label"], json!("Rust"));
                        assert_eq!(
                            children[0],
                            Node::CodeBlock {
                                lang: Some("rust".to_string()),
                                code: "fn main() {}\n".to_string(),
                            }
                        );
                    }
                    _ => unreachable!(),
                }
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_expression_props() {
        let doc = compile_ok("Intro\n<Chart data={[1, 2]} title={'Sales'} />\nOutro");
        assert_eq!(doc.nodes.len(), 3);
        match &doc.nodes[1] {
            Node::Component { name, props, .. } => {
                assert_eq!(name, "Chart");
                assert_eq!(props["data"], json!([1, 2]));
                assert_eq!(props["title"], json!("Sales"));
            }
            other => panic!("unexpected node {:?}", other),
        }

        let doc = compile_ok("inline <Chart data={[3]} /> chart");
        assert!(find_component(&doc.nodes, "Chart").is_some());

        let err = compile("<Chart data={load()} />", &bindings()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidProp { line: 1, .. }));
    }

    #[test]
    fn test_tags_inside_code_are_literal() {
        let doc = compile_ok("```jsx\n<Unknown />\n```\n\nUse `<Unknown />` inline.");
        assert!(matches!(&doc.nodes[0], Node::CodeBlock { code, .. } if code == "<Unknown />\n"));
        assert!(find_component(&doc.nodes, "Unknown").is_none());
    }

    #[test]
    fn test_unknown_component_fails_closed() {
        let err = compile("# Title\n\ntext <Missing />", &bindings()).unwrap_err();
        assert_eq!(
            err,
            RenderError::UnknownComponent {
                name: "Missing".to_string(),
                line: 3,
            }
        );
    }

    #[test]
    fn test_unbalanced_components() {
        let err = compile("intro\n\n<Callout>\n\nbody", &bindings()).unwrap_err();
        assert_eq!(
            err,
            RenderError::UnclosedComponent {
                name: "Callout".to_string(),
                line: 3,
            }
        );

        let err = compile("</Callout>", &bindings()).unwrap_err();
        assert!(matches!(err, RenderError::UnexpectedClosingTag { .. }));

        let err = compile("<Tabs>\n</Tab>", &bindings()).unwrap_err();
        assert!(matches!(err, RenderError::MismatchedClosingTag { .. }));

        let err = compile("a <Widget> b\n\nc </Widget>", &bindings()).unwrap_err();
        assert!(matches!(err, RenderError::UnclosedComponent { .. }));
    }

    #[test]
    fn test_module_statements_rejected() {
        let err = compile("# Hi\n\nimport Chart from './chart'\n", &bindings()).unwrap_err();
        assert_eq!(err, RenderError::ModuleStatement { line: 3 });

        // inside a fence it is just code
        assert!(compile("```js\nimport x from 'y'\n```", &bindings()).is_ok());
    }

    #[test]
    fn test_disallowed_html() {
        let err = compile("hello\n\n<script>alert(1)</script>\n", &bindings()).unwrap_err();
        assert!(matches!(err, RenderError::DisallowedHtml { line: 3, .. }));

        let err = compile("hello\n\n<img src=x onerror=alert(1)//>\n", &bindings()).unwrap_err();
        assert!(matches!(err, RenderError::DisallowedHtml { line: 3, .. }));

        let doc = compile_ok("<div class=\"note\">\nraw\n</div>");
        assert!(doc.nodes.iter().all(|n| matches!(n, Node::Html(_))));
    }

    #[test]
    fn test_escaped_tags_stay_literal() {
        let doc = compile("Use Vec&lt;String&gt; for lists.", &Bindings::new()).unwrap();
        assert_eq!(plain_text(&doc.nodes), "Use Vec<String> for lists.");
        assert!(find_component(&doc.nodes, "String").is_none());

        let doc = compile("Write \\<Widget /> literally.", &Bindings::new()).unwrap();
        assert_eq!(plain_text(&doc.nodes), "Write <Widget /> literally.");

        // an escaped tag next to a real one
        let doc = compile_ok("&lt;Widget /> or <Widget foo={1} />");
        assert!(find_component(&doc.nodes, "Widget").is_some());
        assert!(plain_text(&doc.nodes).starts_with("<Widget /> or "));
    }

    #[test]
    fn test_headings_get_unique_ids() {
        let doc = compile_ok("# Intro\n\n## Setup\n\n## Setup\n\n### Custom {#my-id}\n");
        let ids: Vec<_> = doc.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "setup", "setup-1", "my-id"]);
        assert_eq!(doc.headings[3].level, 3);
        assert_eq!(doc.headings[3].text, "Custom");
    }

    #[test]
    fn test_table_structure() {
        let doc = compile_ok("| a | b |\n|:--|--:|\n| 1 | 2 |\n");
        match &doc.nodes[0] {
            Node::Element { name, children, .. } => {
                assert_eq!(name, "table");
                assert_eq!(children.len(), 2);
                match &children[1] {
                    Node::Element { name, children, .. } => {
                        assert_eq!(name, "tbody");
                        match &children[0] {
                            Node::Element { children: cells, .. } => match &cells[1] {
                                Node::Element { name, attrs, .. } => {
                                    assert_eq!(name, "td");
                                    assert_eq!(attrs[0].1, "text-align: right");
                                }
                                other => panic!("unexpected cell {:?}", other),
                            },
                            other => panic!("unexpected row {:?}", other),
                        }
                    }
                    other => panic!("unexpected node {:?}", other),
                }
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_compile_is_deterministic() {
        let body = "# A\n\n<Callout>\n\n- one\n- two\n\n</Callout>\n";
        assert_eq!(compile_ok(body), compile_ok(body));
    }
}
