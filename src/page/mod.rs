//! Page assembly - binds records and rendered documents to templates

pub mod article;
pub mod listing;

use anyhow::Result;
use chrono::{Datelike, Local};
use serde::Serialize;
use tera::Context;

use crate::config::SiteConfig;
use crate::content::{ContentIndex, ContentKind, ContentRecord};
use crate::helpers::{listing_path, record_path, url_for};
use crate::render::Renderer;
use crate::templates::TemplateRenderer;

pub use article::{build_article, related, ArticlePage, NavLink};
pub use listing::{build_listing, filter_records, Facet, ListingPage, ListingQuery, Pagination};

/// Records shown per section on the home page
const HOME_RECENT: usize = 5;

/// What listings and cards show of a record
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub kind: ContentKind,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub author: Option<String>,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub number: Option<u32>,
    pub reading_time: String,
    pub path: String,
}

impl RecordSummary {
    pub fn new(config: &SiteConfig, record: &ContentRecord) -> Self {
        Self {
            kind: record.kind,
            slug: record.slug.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            date: record.date.clone(),
            author: record.author.clone(),
            image: record.image.clone(),
            tags: record.tags.clone(),
            number: record.number,
            reading_time: record.reading_time.clone(),
            path: record_path(config, record.kind, &record.slug),
        }
    }
}

/// Renders whole HTML pages
pub struct PageAssembler {
    config: SiteConfig,
    renderer: Renderer,
    templates: TemplateRenderer,
}

impl PageAssembler {
    pub fn new(config: SiteConfig, renderer: Renderer) -> Result<Self> {
        Ok(Self {
            config,
            renderer,
            templates: TemplateRenderer::new()?,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    fn base_context(&self, current_path: &str) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.config);
        context.insert("root", &url_for(&self.config, ""));
        context.insert("current_path", current_path);
        context.insert("current_year", &Local::now().year());
        context.insert("version", env!("CARGO_PKG_VERSION"));
        context
    }

    /// Home page with the newest posts and editions
    pub fn home(&self, posts: &ContentIndex, editions: &ContentIndex) -> Result<String> {
        let recent = |index: &ContentIndex| -> Result<Vec<RecordSummary>> {
            Ok(index
                .get_all()?
                .iter()
                .take(HOME_RECENT)
                .map(|r| RecordSummary::new(&self.config, r))
                .collect())
        };

        let mut context = self.base_context(&url_for(&self.config, ""));
        context.insert("posts", &recent(posts)?);
        context.insert("editions", &recent(editions)?);
        context.insert("posts_path", &listing_path(&self.config, ContentKind::Post, None, None, 1));
        context.insert(
            "editions_path",
            &listing_path(&self.config, ContentKind::Edition, None, None, 1),
        );

        self.templates.render("home.html", &context)
    }

    /// Article page for `slug`; `ContentError::NotFound` propagates
    pub fn article(&self, index: &ContentIndex, slug: &str) -> Result<String> {
        let record = index.get_by_slug(slug)?;
        let all = index.get_all()?;
        let page = build_article(&self.config, &self.renderer, &record, &all);

        if let Some(error) = &page.error {
            tracing::warn!("{} '{}' rendered with errors: {}", record.kind, slug, error);
        }

        let mut context = self.base_context(&page.record.path);
        context.insert("article", &page);
        self.templates.render("article.html", &context)
    }

    /// Listing page of one content kind
    pub fn listing(&self, index: &ContentIndex, query: &ListingQuery) -> Result<String> {
        let records = index.get_all()?;
        let page = build_listing(&self.config, index.kind(), &records, query);

        let mut context = self.base_context(&page.path);
        context.insert("page", &page);
        self.templates.render("listing.html", &context)
    }

    pub fn not_found(&self, path: &str) -> Result<String> {
        let mut context = self.base_context(path);
        context.insert("path", path);
        self.templates.render("not_found.html", &context)
    }
}
