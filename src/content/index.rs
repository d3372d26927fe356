//! Content index - every published record of one kind, in listing order

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::loader::{is_valid_slug, ContentLoader};
use super::{ContentKind, ContentRecord};
use crate::error::ContentError;

/// Aggregates all records of a content kind. Nothing is cached: every call
/// re-reads the directory.
#[derive(Debug, Clone)]
pub struct ContentIndex {
    loader: ContentLoader,
}

impl ContentIndex {
    pub fn new(loader: ContentLoader) -> Self {
        Self { loader }
    }

    pub fn kind(&self) -> ContentKind {
        self.loader.kind()
    }

    pub fn loader(&self) -> &ContentLoader {
        &self.loader
    }

    /// All published records, sorted for listing.
    ///
    /// Files that fail to load are logged and skipped. Two published
    /// records sharing a slug abort the listing.
    pub fn get_all(&self) -> Result<Vec<ContentRecord>, ContentError> {
        let mut records = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for record in self.published()? {
            if let Some(&existing) = seen.get(&record.slug) {
                let first: &ContentRecord = &records[existing];
                return Err(ContentError::DuplicateSlug {
                    slug: record.slug,
                    first: first.source.clone(),
                    second: record.source,
                });
            }

            seen.insert(record.slug.clone(), records.len());
            records.push(record);
        }

        records.sort_by(|a, b| a.listing_cmp(b));

        tracing::debug!("Indexed {} {} records", records.len(), self.kind());
        Ok(records)
    }

    /// Look a published record up by slug, whether it comes from the file
    /// name or an explicit `slug` key. A slug claimed by two files is a
    /// `DuplicateSlug` error, as in `get_all`.
    pub fn get_by_slug(&self, slug: &str) -> Result<ContentRecord, ContentError> {
        if !is_valid_slug(slug) {
            return Err(ContentError::NotFound(slug.to_string()));
        }

        let mut matches = self.published()?.into_iter().filter(|r| r.slug == slug);
        match (matches.next(), matches.next()) {
            (None, _) => Err(ContentError::NotFound(slug.to_string())),
            (Some(first), Some(second)) => Err(ContentError::DuplicateSlug {
                slug: slug.to_string(),
                first: first.source,
                second: second.source,
            }),
            (Some(record), None) => Ok(record),
        }
    }

    /// Every loadable, published record in file name order
    fn published(&self) -> Result<Vec<ContentRecord>, ContentError> {
        let mut records = Vec::new();

        for path in self.loader.list_files()? {
            let record = match self.loader.load_file(&path) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            if !record.published {
                tracing::debug!("Skipping unpublished {:?}", path);
                continue;
            }

            records.push(record);
        }

        Ok(records)
    }

    /// Sorted union of every published record's tags (topics for editions)
    pub fn all_tags(&self) -> Result<Vec<String>, ContentError> {
        Ok(collect_tags(&self.get_all()?))
    }

    /// Tag usage counts, sorted by tag
    pub fn tag_counts(&self) -> Result<BTreeMap<String, usize>, ContentError> {
        Ok(count_tags(&self.get_all()?))
    }
}

/// Sorted set union of the records' tags
pub fn collect_tags(records: &[ContentRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|r| r.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// How many records carry each tag
pub fn count_tags(records: &[ContentRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        for tag in &record.tags {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}
