//! folio: a content engine for a portfolio blog and newsletter
//!
//! Content lives in flat Markdown files with front-matter. This crate
//! loads and indexes those files, renders their bodies (Markdown with
//! embedded components resolved against a fixed table) and assembles
//! pages with Tera templates, served by a small axum application.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod page;
pub mod render;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::{ContentIndex, ContentKind, ContentLoader};
use page::PageAssembler;
use render::Renderer;

/// The main folio application
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Root of the content tree
    pub content_dir: PathBuf,
    /// Static files served as-is
    pub static_dir: PathBuf,
}

impl Folio {
    /// Create a new instance from a site directory. `_config.yml` is
    /// optional; every setting has a default.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            static_dir,
        })
    }

    /// Directory holding records of `kind`
    pub fn dir_for(&self, kind: ContentKind) -> PathBuf {
        match kind {
            ContentKind::Post => self.content_dir.join(&self.config.posts_dir),
            ContentKind::Edition => self.content_dir.join(&self.config.editions_dir),
        }
    }

    /// Index of one content kind
    pub fn collection(&self, kind: ContentKind) -> ContentIndex {
        ContentIndex::new(ContentLoader::new(kind, self.dir_for(kind), &self.config))
    }

    pub fn posts(&self) -> ContentIndex {
        self.collection(ContentKind::Post)
    }

    pub fn editions(&self) -> ContentIndex {
        self.collection(ContentKind::Edition)
    }

    /// Renderer with the standard component table
    pub fn renderer(&self) -> Renderer {
        Renderer::standard(&self.config.highlight)
    }

    pub fn pages(&self) -> Result<PageAssembler> {
        PageAssembler::new(self.config.clone(), self.renderer())
    }
}
