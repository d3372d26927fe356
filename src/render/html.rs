//! Render tree to HTML

use serde_json::Value;

use super::bindings::{Bindings, ComponentInput, Slot};
use super::tags::Props;
use super::tree::{plain_text, Node};
use crate::error::RenderError;
use crate::helpers::html_escape;

const VOID_ELEMENTS: [&str; 3] = ["br", "hr", "img"];

pub(crate) struct HtmlWriter<'a> {
    bindings: &'a Bindings,
}

impl<'a> HtmlWriter<'a> {
    pub fn new(bindings: &'a Bindings) -> Self {
        Self { bindings }
    }

    pub fn write(&self, nodes: &[Node]) -> Result<String, RenderError> {
        let mut out = String::new();
        self.nodes(nodes, &mut out)?;
        Ok(out)
    }

    fn nodes(&self, nodes: &[Node], out: &mut String) -> Result<(), RenderError> {
        for node in nodes {
            self.node(node, out)?;
        }
        Ok(())
    }

    fn node(&self, node: &Node, out: &mut String) -> Result<(), RenderError> {
        match node {
            Node::Text(text) => out.push_str(&html_escape(text)),
            Node::Code(code) => {
                out.push_str("<code>");
                out.push_str(&html_escape(code));
                out.push_str("</code>");
            }
            Node::Html(html) => out.push_str(html),
            Node::CodeBlock { lang, code } => {
                let mut props = Props::new();
                props.insert("code".to_string(), Value::String(code.clone()));
                if let Some(lang) = lang {
                    props.insert("language".to_string(), Value::String(lang.clone()));
                }
                let fallback = || {
                    let class = lang
                        .as_ref()
                        .map(|l| format!(r#" class="language-{}""#, html_escape(l)))
                        .unwrap_or_default();
                    format!("<pre><code{}>{}</code></pre>", class, html_escape(code))
                };
                out.push_str(&self.intrinsic("pre", &props, &html_escape(code), code, fallback)?);
            }
            Node::Image { src, alt, title } => {
                let mut props = Props::new();
                props.insert("src".to_string(), Value::String(src.clone()));
                props.insert("alt".to_string(), Value::String(alt.clone()));
                if !title.is_empty() {
                    props.insert("title".to_string(), Value::String(title.clone()));
                }
                let fallback = || format!("<img{}>", attributes(&props));
                out.push_str(&self.intrinsic("img", &props, "", alt, fallback)?);
            }
            Node::Element {
                name,
                attrs,
                children,
            } => {
                let inner = self.write(children)?;
                let props: Props = attrs
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                let fallback = || {
                    if VOID_ELEMENTS.contains(&name.as_str()) {
                        format!("<{}{}>", name, attributes(&props))
                    } else {
                        format!("<{0}{1}>{2}</{0}>", name, attributes(&props), inner)
                    }
                };
                let text = plain_text(children);
                out.push_str(&self.intrinsic(name, &props, &inner, &text, fallback)?);
            }
            Node::Component {
                name,
                props,
                children,
            } => {
                let (_, html) = self.component(name, props, children)?;
                out.push_str(&html);
            }
        }
        Ok(())
    }

    /// Render through a binding when one overrides the element
    fn intrinsic(
        &self,
        name: &str,
        props: &Props,
        children: &str,
        text: &str,
        fallback: impl FnOnce() -> String,
    ) -> Result<String, RenderError> {
        match self.bindings.get(name) {
            Some(component) => component.render(&ComponentInput {
                name,
                props,
                children,
                text,
                slots: &[],
            }),
            None => Ok(fallback()),
        }
    }

    /// Returns the rendered children and the component's own output
    fn component(
        &self,
        name: &str,
        props: &Props,
        children: &[Node],
    ) -> Result<(String, String), RenderError> {
        let Some(component) = self.bindings.get(name) else {
            return Err(RenderError::component(name, "no binding"));
        };

        let mut inner = String::new();
        let mut slots = Vec::new();
        for child in children {
            match child {
                Node::Component {
                    name: child_name,
                    props: child_props,
                    children: grandchildren,
                } => {
                    let (slot_html, html) = self.component(child_name, child_props, grandchildren)?;
                    slots.push(Slot {
                        name: child_name.clone(),
                        props: child_props.clone(),
                        html: slot_html,
                    });
                    inner.push_str(&html);
                }
                other => self.node(other, &mut inner)?,
            }
        }

        let text = plain_text(children);
        let html = component.render(&ComponentInput {
            name,
            props,
            children: &inner,
            text: &text,
            slots: &slots,
        })?;
        Ok((inner, html))
    }
}

fn attributes(props: &Props) -> String {
    props
        .iter()
        .map(|(k, v)| match v {
            Value::String(s) => format!(r#" {}="{}""#, k, html_escape(s)),
            other => format!(r#" {}="{}""#, k, html_escape(&other.to_string())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tree::compile;

    fn write(body: &str, bindings: &Bindings) -> String {
        let doc = compile(body, bindings).unwrap();
        HtmlWriter::new(bindings).write(&doc.nodes).unwrap()
    }

    #[test]
    fn test_plain_markdown() {
        let bindings = Bindings::new();
        assert_eq!(
            write("# Hi\n\nSome **bold** & <em>raw</em>", &bindings),
            "<h1 id=\"hi\">Hi</h1><p>Some <strong>bold</strong> &amp; <em>raw</em></p>"
        );
        assert_eq!(
            write("```rust\nlet a = 1 < 2;\n```", &bindings),
            "<pre><code class=\"language-rust\">let a = 1 &lt; 2;\n</code></pre>"
        );
        assert_eq!(
            write("![alt](/x.png \"t\")\n\n---", &bindings),
            "<p><img src=\"/x.png\" alt=\"alt\" title=\"t\"></p><hr>"
        );
    }

    #[test]
    fn test_nested_components_and_slots() {
        let mut bindings = Bindings::new();
        bindings.bind_fn("Tabs", |input: &ComponentInput<'_>| {
            let labels: Vec<String> = input
                .slots
                .iter()
                .map(|s| format!("{}={}", s.props["label"].as_str().unwrap_or(""), s.html))
                .collect();
            Ok(labels.join("|"))
        });
        bindings.bind_fn("Tab", |input: &ComponentInput<'_>| {
            Ok(format!("[{}]", input.children))
        });

        let html = write(
            "<Tabs>\n<Tab label=\"a\">\none\n</Tab>\n<Tab label=\"b\">\ntwo\n</Tab>\n</Tabs>",
            &bindings,
        );
        assert_eq!(html, "a=<p>one</p>|b=<p>two</p>");
    }

    #[test]
    fn test_component_errors_propagate() {
        let mut bindings = Bindings::new();
        bindings.bind_fn("Broken", |input: &ComponentInput<'_>| {
            Err(RenderError::component(input.name, "always fails"))
        });
        let doc = compile("<Broken />", &bindings).unwrap();
        let err = HtmlWriter::new(&bindings).write(&doc.nodes).unwrap_err();
        assert_eq!(
            err,
            RenderError::Component {
                name: "Broken".to_string(),
                message: "always fails".to_string(),
            }
        );
    }
}
