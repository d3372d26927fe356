//! Content loader - turns one content file into a record

use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::record::{count_words, reading_time};
use super::{ContentKind, ContentRecord, FrontMatter};
use crate::config::SiteConfig;
use crate::error::ContentError;

lazy_static! {
    static ref SLUG_RE: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").unwrap();
}

/// Whether a slug is safe to turn into a file name
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

/// Loads records of one content kind from its directory
#[derive(Debug, Clone)]
pub struct ContentLoader {
    kind: ContentKind,
    dir: PathBuf,
    extensions: Vec<String>,
    words_per_minute: usize,
}

impl ContentLoader {
    /// Create a loader for `dir`, using the extensions and reading speed from `config`
    pub fn new(kind: ContentKind, dir: impl Into<PathBuf>, config: &SiteConfig) -> Self {
        Self {
            kind,
            dir: dir.into(),
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            words_per_minute: config.words_per_minute,
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Content files directly inside the directory, sorted by file name.
    /// A missing directory is an empty collection.
    pub fn list_files(&self) -> Result<Vec<PathBuf>, ContentError> {
        if !self.dir.exists() {
            tracing::debug!("Content directory {:?} does not exist", self.dir);
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {:?}: {}", self.dir, e);
                    continue;
                }
            };

            let path = entry.path();
            let hidden = entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with('.') || name.starts_with('_'))
                .unwrap_or(true);

            if entry.file_type().is_file() && !hidden && self.is_content_file(path) {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    /// Load a published record by its file name slug.
    ///
    /// Invalid slugs, missing files, unreadable or malformed files and
    /// unpublished records are all `NotFound`.
    pub fn get_by_slug(&self, slug: &str) -> Result<ContentRecord, ContentError> {
        if !is_valid_slug(slug) {
            tracing::debug!("Rejected {} slug {:?}", self.kind, slug);
            return Err(ContentError::NotFound(slug.to_string()));
        }

        let mut candidates = self
            .extensions
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", slug, ext)))
            .filter(|path| path.is_file());

        let path = match (candidates.next(), candidates.next()) {
            (None, _) => return Err(ContentError::NotFound(slug.to_string())),
            (Some(first), Some(second)) => {
                return Err(ContentError::DuplicateSlug {
                    slug: slug.to_string(),
                    first,
                    second,
                })
            }
            (Some(path), None) => path,
        };

        let record = match self.load_file(&path) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!("Treating {:?} as missing: {}", path, e);
                return Err(ContentError::NotFound(slug.to_string()));
            }
        };

        // An explicit `slug` key moves the record to another route
        if !record.published || record.slug != slug {
            return Err(ContentError::NotFound(slug.to_string()));
        }

        Ok(record)
    }

    /// Load a single record from a file
    pub fn load_file(&self, path: &Path) -> Result<ContentRecord, ContentError> {
        let content = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (fm, body) = FrontMatter::parse(&content).map_err(|e| ContentError::parse(path, e))?;

        let title = required(path, "title", fm.title.as_deref())?;
        let description = required(path, "description", fm.description.as_deref())?;
        let date = required(path, "date", fm.date.as_deref())?;
        let published_at = fm
            .parse_date()
            .ok_or_else(|| ContentError::parse(path, format!("invalid date '{}'", date)))?;

        let slug = match fm.slug.as_deref() {
            Some(explicit) if is_valid_slug(explicit) => explicit.to_string(),
            Some(explicit) => {
                return Err(ContentError::parse(
                    path,
                    format!("invalid slug '{}'", explicit),
                ))
            }
            None => file_slug(path)
                .ok_or_else(|| ContentError::parse(path, "file name is not a valid slug"))?,
        };

        let number = match self.kind {
            ContentKind::Edition => Some(
                fm.number
                    .ok_or_else(|| ContentError::parse(path, "missing required field 'number'"))?,
            ),
            ContentKind::Post => fm.number,
        };

        let tags = match self.kind {
            ContentKind::Edition if !fm.topics.is_empty() => fm.topics,
            _ => fm.tags,
        };

        let word_count = count_words(body);

        Ok(ContentRecord {
            kind: self.kind,
            slug,
            title,
            description,
            date,
            published_at,
            updated: fm.updated,
            author: fm.author,
            image: fm.image,
            tags,
            published: fm.published,
            number,
            body: body.to_string(),
            reading_time: reading_time(word_count, self.words_per_minute),
            word_count,
            source: path.to_path_buf(),
            extra: fm.extra,
        })
    }

    fn is_content_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|ext| ext.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }
}

fn required(path: &Path, field: &str, value: Option<&str>) -> Result<String, ContentError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(ContentError::parse(
            path,
            format!("missing required field '{}'", field),
        )),
    }
}

/// Slug derived from the file stem
fn file_slug(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| is_valid_slug(s))
        .map(str::to_string)
}
