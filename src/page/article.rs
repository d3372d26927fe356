//! Article pages: rendered body, outline, navigation and related records

use serde::Serialize;

use super::RecordSummary;
use crate::config::SiteConfig;
use crate::content::ContentRecord;
use crate::helpers::{listing_path, record_path};
use crate::render::{toc_html, Renderer};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavLink {
    pub title: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticlePage {
    pub record: RecordSummary,
    pub html: String,
    /// Empty when the document has no headings or failed to render
    pub toc: String,
    pub error: Option<String>,
    pub tags: Vec<NavLink>,
    pub prev: Option<NavLink>,
    pub next: Option<NavLink>,
    pub related: Vec<RecordSummary>,
}

/// Records sharing the most tags with `record`, newest first among equals.
/// Records with no tag in common are never related.
pub fn related<'a>(record: &ContentRecord, all: &'a [ContentRecord], count: usize) -> Vec<&'a ContentRecord> {
    let mut scored: Vec<(usize, &ContentRecord)> = all
        .iter()
        .filter(|other| other.slug != record.slug)
        .map(|other| {
            let shared = other.tags.iter().filter(|t| record.has_tag(t)).count();
            (shared, other)
        })
        .filter(|(shared, _)| *shared > 0)
        .collect();

    scored.sort_by(|(a_shared, a), (b_shared, b)| {
        b_shared
            .cmp(a_shared)
            .then_with(|| b.published_at.cmp(&a.published_at))
            .then_with(|| a.slug.cmp(&b.slug))
    });

    scored.into_iter().take(count).map(|(_, r)| r).collect()
}

fn nav_link(config: &SiteConfig, record: &ContentRecord) -> NavLink {
    NavLink {
        title: record.title.clone(),
        path: record_path(config, record.kind, &record.slug),
    }
}

/// Assemble an article page. A body that fails to render becomes an
/// inline error panel; the rest of the page is unaffected.
pub fn build_article(
    config: &SiteConfig,
    renderer: &Renderer,
    record: &ContentRecord,
    all: &[ContentRecord],
) -> ArticlePage {
    let outcome = renderer.render_or_fallback(&record.body);

    let tags = record
        .tags
        .iter()
        .map(|tag| NavLink {
            title: tag.clone(),
            path: listing_path(config, record.kind, Some(tag), None, 1),
        })
        .collect();

    ArticlePage {
        record: RecordSummary::new(config, record),
        toc: toc_html(&outcome.headings),
        html: outcome.html,
        error: outcome.error,
        tags,
        prev: record.prev(all).map(|r| nav_link(config, r)),
        next: record.next(all).map(|r| nav_link(config, r)),
        related: related(record, all, config.related_count)
            .into_iter()
            .map(|r| RecordSummary::new(config, r))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::tests::record;
    use crate::render::Bindings;

    fn slugs(records: &[&ContentRecord]) -> Vec<String> {
        records.iter().map(|r| r.slug.clone()).collect()
    }

    #[test]
    fn test_related_ranks_by_shared_tags_then_date() {
        let all = vec![
            record("newest", "N", "2024-06-01", &["rust"]),
            record("both", "B", "2024-01-01", &["rust", "web"]),
            record("current", "C", "2024-03-01", &["Rust", "web"]),
            record("older", "O", "2023-01-01", &["web"]),
            record("unrelated", "U", "2024-07-01", &["css"]),
        ];
        let current = &all[2];
        assert_eq!(slugs(&related(current, &all, 3)), vec!["both", "newest", "older"]);
        assert_eq!(slugs(&related(current, &all, 1)), vec!["both"]);
        assert!(related(&all[4], &all, 3).is_empty());
    }

    #[test]
    fn test_article_navigation_and_body() {
        let mut all = vec![
            record("third", "Third", "2024-03-01", &[]),
            record("second", "Second", "2024-02-01", &[]),
            record("first", "First", "2024-01-01", &[]),
        ];
        all[1].body = "## Part one\n\nHello".to_string();

        let page = build_article(&SiteConfig::default(), &Renderer::new(Bindings::new()), &all[1], &all);
        assert_eq!(
            page.prev,
            Some(NavLink {
                title: "Third".to_string(),
                path: "/blog/third".to_string(),
            })
        );
        assert_eq!(page.next.as_ref().map(|n| n.path.as_str()), Some("/blog/first"));
        assert_eq!(page.html, "<h2 id=\"part-one\">Part one</h2><p>Hello</p>");
        assert!(page.toc.contains("href=\"#part-one\""));
        assert!(page.error.is_none());
    }

    #[test]
    fn test_render_failure_is_inline() {
        let mut broken = record("broken", "Broken", "2024-01-01", &["rust"]);
        broken.body = "Intro\n\n<Chart />".to_string();
        let all = vec![broken.clone()];

        let page = build_article(&SiteConfig::default(), &Renderer::new(Bindings::new()), &broken, &all);
        assert!(page.error.as_deref().unwrap_or("").contains("<Chart>"));
        assert!(page.html.contains("render-error"));
        assert!(page.toc.is_empty());
        assert_eq!(page.record.title, "Broken");
        assert_eq!(page.tags[0].path, "/blog?tag=rust");
    }
}
