//! Render one record to HTML

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::content::ContentKind;
use crate::Folio;

/// Full article page, or only the rendered body. A body that fails to
/// render is an error here rather than an inline panel.
pub fn render(folio: &Folio, kind: ContentKind, slug: &str, body_only: bool) -> Result<String> {
    let index = folio.collection(kind);

    if body_only {
        let record = index.get_by_slug(slug)?;
        let document = folio
            .renderer()
            .render(&record.body)
            .with_context(|| format!("failed to render {}", record.source.display()))?;
        return Ok(document.html);
    }

    folio.pages()?.article(&index, slug)
}

pub fn run(
    folio: &Folio,
    kind: ContentKind,
    slug: &str,
    body_only: bool,
    output: Option<&Path>,
) -> Result<()> {
    let html = render(folio, kind, slug, body_only)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, html)?;
            tracing::info!("Wrote {} '{}' to {:?}", kind, slug, path);
        }
        None => println!("{}", html),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContentError;

    fn site(body: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("content/blog");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("post.mdx"),
            format!("---\ntitle: Post\ndescription: d\ndate: 2024-01-01\n---\n{}", body),
        )
        .unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "highlight:\n  enable: false\n  line_number: false\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_body_only() {
        let dir = site("Hello *there*\n\n```rust\nfn main() {}\n```\n");
        let folio = Folio::new(dir.path()).unwrap();
        let html = render(&folio, ContentKind::Post, "post", true).unwrap();
        assert_eq!(
            html,
            "<p>Hello <em>there</em></p><pre><code class=\"language-rust\">fn main() {}\n</code></pre>"
        );
    }

    #[test]
    fn test_full_page_to_file() {
        let dir = site("Body");
        let folio = Folio::new(dir.path()).unwrap();
        let out = dir.path().join("out/post.html");

        run(&folio, ContentKind::Post, "post", false, Some(&out)).unwrap();
        let html = fs::read_to_string(&out).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<p>Body</p>"));
    }

    #[test]
    fn test_errors() {
        let dir = site("<Nope />");
        let folio = Folio::new(dir.path()).unwrap();

        let err = render(&folio, ContentKind::Post, "post", true).unwrap_err();
        assert!(format!("{:#}", err).contains("unknown component <Nope>"));

        let err = render(&folio, ContentKind::Post, "missing", true).unwrap_err();
        assert!(err.downcast_ref::<ContentError>().unwrap().is_not_found());
    }
}
