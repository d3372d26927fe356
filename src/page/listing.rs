//! Listing pages: tag filter, search, pagination and facets

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::RecordSummary;
use crate::config::SiteConfig;
use crate::content::{ContentKind, ContentRecord};
use crate::helpers::listing_path;

/// Query string of a listing page
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListingQuery {
    pub tag: Option<String>,
    pub q: Option<String>,
    pub page: Option<usize>,
}

impl ListingQuery {
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// Lowercased search terms
    pub fn terms(&self) -> Vec<String> {
        self.search()
            .map(|q| q.split_whitespace().map(str::to_lowercase).collect())
            .unwrap_or_default()
    }
}

/// Every term must appear in the title, the description or a tag
pub fn matches_search(record: &ContentRecord, terms: &[String]) -> bool {
    let title = record.title.to_lowercase();
    let description = record.description.to_lowercase();
    let tags: Vec<String> = record.tags.iter().map(|t| t.to_ascii_lowercase()).collect();

    terms.iter().all(|term| {
        title.contains(term.as_str())
            || description.contains(term.as_str())
            || tags.iter().any(|t| t.contains(term.as_str()))
    })
}

/// Records passing the query's tag filter and search, in listing order
pub fn filter_records<'a>(records: &'a [ContentRecord], query: &ListingQuery) -> Vec<&'a ContentRecord> {
    let terms = query.terms();
    records
        .iter()
        .filter(|r| query.tag().map_or(true, |tag| r.has_tag(tag)))
        .filter(|r| matches_search(r, &terms))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Facet {
    pub name: String,
    pub count: usize,
    pub active: bool,
    /// Link that selects this facet, or clears it when active
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub current: usize,
    pub total_pages: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub prev_path: Option<String>,
    pub next_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub kind: ContentKind,
    pub title: String,
    pub facet_label: &'static str,
    pub path: String,
    pub clear_path: String,
    pub tag: Option<String>,
    pub q: Option<String>,
    pub items: Vec<RecordSummary>,
    pub pagination: Pagination,
    pub facets: Vec<Facet>,
}

/// Build a listing page from the records of one kind, already sorted
pub fn build_listing(
    config: &SiteConfig,
    kind: ContentKind,
    records: &[ContentRecord],
    query: &ListingQuery,
) -> ListingPage {
    let tag = query.tag();
    let search = query.search();
    let matching = filter_records(records, query);

    let per_page = config.per_page.max(1);
    let total_items = matching.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    // out of range pages show the nearest real one
    let current = query.page.unwrap_or(1).clamp(1, total_pages);

    let items = matching
        .iter()
        .skip((current - 1) * per_page)
        .take(per_page)
        .map(|r| RecordSummary::new(config, r))
        .collect();

    let pagination = Pagination {
        current,
        total_pages,
        per_page,
        total_items,
        prev_path: (current > 1).then(|| listing_path(config, kind, tag, search, current - 1)),
        next_path: (current < total_pages)
            .then(|| listing_path(config, kind, tag, search, current + 1)),
    };

    let facets = facet_counts(records)
        .into_iter()
        .map(|(name, count)| {
            let active = tag.map_or(false, |t| t.eq_ignore_ascii_case(&name));
            let path = if active {
                listing_path(config, kind, None, search, 1)
            } else {
                listing_path(config, kind, Some(&name), search, 1)
            };
            Facet {
                name,
                count,
                active,
                path,
            }
        })
        .collect();

    ListingPage {
        kind,
        title: kind.label().to_string(),
        facet_label: kind.facet(),
        path: listing_path(config, kind, None, None, 1),
        clear_path: listing_path(config, kind, None, None, 1),
        tag: tag.map(str::to_string),
        q: search.map(str::to_string),
        items,
        pagination,
        facets,
    }
}

/// Tag counts merged regardless of case, since the tag filter ignores it.
/// A facet is named by the spelling of its newest record.
fn facet_counts(records: &[ContentRecord]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, (String, usize)> = BTreeMap::new();
    for record in records {
        let keys: BTreeSet<String> = record.tags.iter().map(|t| t.to_ascii_lowercase()).collect();
        for key in keys {
            let name = record
                .tags
                .iter()
                .find(|t| t.eq_ignore_ascii_case(&key))
                .cloned()
                .unwrap_or_else(|| key.clone());
            counts.entry(key).or_insert((name, 0)).1 += 1;
        }
    }
    counts.into_values().collect()
}
