//! Content records shared by blog posts and newsletter editions

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The two parallel content kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Edition,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Post, ContentKind::Edition];

    /// URL segment the kind is routed under
    pub fn route(&self) -> &'static str {
        match self {
            ContentKind::Post => "blog",
            ContentKind::Edition => "newsletter",
        }
    }

    /// Human-readable section name
    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Post => "Blog",
            ContentKind::Edition => "Newsletter",
        }
    }

    /// What the tag facet is called for this kind
    pub fn facet(&self) -> &'static str {
        match self {
            ContentKind::Post => "tags",
            ContentKind::Edition => "topics",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Post => f.write_str("post"),
            ContentKind::Edition => f.write_str("edition"),
        }
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" | "posts" | "blog" => Ok(ContentKind::Post),
            "edition" | "editions" | "newsletter" => Ok(ContentKind::Edition),
            other => Err(format!(
                "unknown content kind '{}', expected post or edition",
                other
            )),
        }
    }
}

/// One loaded content file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub kind: ContentKind,

    /// Routing key, unique within a kind
    pub slug: String,

    pub title: String,

    pub description: String,

    /// Publication date exactly as authored
    pub date: String,

    /// Parsed publication date used for ordering
    #[serde(skip)]
    pub published_at: NaiveDateTime,

    pub updated: Option<String>,

    pub author: Option<String>,

    pub image: Option<String>,

    /// Tags for posts, topics for editions
    pub tags: Vec<String>,

    pub published: bool,

    /// Edition sequence number
    pub number: Option<u32>,

    /// Raw document body after the front-matter block
    pub body: String,

    pub reading_time: String,

    pub word_count: usize,

    /// Source file path
    #[serde(skip)]
    pub source: PathBuf,

    /// Custom front-matter fields
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl ContentRecord {
    /// Topics of a newsletter edition (alias of `tags`)
    pub fn topics(&self) -> &[String] {
        &self.tags
    }

    /// Whether the record carries `tag`, ignoring case
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Listing order: newest (or highest numbered) first, slug breaks ties
    pub fn listing_cmp(&self, other: &Self) -> Ordering {
        let primary = match self.kind {
            ContentKind::Post => other.published_at.cmp(&self.published_at),
            ContentKind::Edition => other
                .number
                .cmp(&self.number)
                .then_with(|| other.published_at.cmp(&self.published_at)),
        };
        primary.then_with(|| self.slug.cmp(&other.slug))
    }

    /// The record listed just before this one (newer)
    pub fn prev<'a>(&self, records: &'a [ContentRecord]) -> Option<&'a ContentRecord> {
        let pos = records.iter().position(|r| r.slug == self.slug)?;
        if pos > 0 {
            Some(&records[pos - 1])
        } else {
            None
        }
    }

    /// The record listed just after this one (older)
    pub fn next<'a>(&self, records: &'a [ContentRecord]) -> Option<&'a ContentRecord> {
        let pos = records.iter().position(|r| r.slug == self.slug)?;
        records.get(pos + 1)
    }
}

/// Count words the way reading-time estimates do: whitespace separated
/// tokens that contain at least one alphanumeric character
pub fn count_words(body: &str) -> usize {
    body.split_whitespace()
        .filter(|word| word.chars().any(char::is_alphanumeric))
        .count()
}

/// Format a reading time estimate, never less than one minute
pub fn reading_time(words: usize, words_per_minute: usize) -> String {
    let wpm = words_per_minute.max(1);
    let minutes = words.div_ceil(wpm).max(1);
    format!("{} min read", minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(kind: ContentKind, slug: &str, date: &str, number: Option<u32>) -> ContentRecord {
        let published_at = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ContentRecord {
            kind,
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            description: String::new(),
            date: date.to_string(),
            published_at,
            updated: None,
            author: None,
            image: None,
            tags: vec!["Rust".to_string()],
            published: true,
            number,
            body: String::new(),
            reading_time: reading_time(0, 200),
            word_count: 0,
            source: PathBuf::from(format!("{}.md", slug)),
            extra: IndexMap::new(),
        }
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(0, 200), "1 min read");
        assert_eq!(reading_time(200, 200), "1 min read");
        assert_eq!(reading_time(201, 200), "2 min read");
        assert_eq!(reading_time(1000, 250), "4 min read");
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("# Hello, world!\n\n- one\n- two ---"), 4);
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn test_post_order_newest_first_then_slug() {
        let mut records = vec![
            record(ContentKind::Post, "b", "2024-01-01", None),
            record(ContentKind::Post, "c", "2024-06-01", None),
            record(ContentKind::Post, "a", "2024-01-01", None),
        ];
        records.sort_by(|x, y| x.listing_cmp(y));
        let slugs: Vec<_> = records.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_edition_order_by_number() {
        let mut records = vec![
            record(ContentKind::Edition, "first", "2024-09-01", Some(1)),
            record(ContentKind::Edition, "third", "2024-01-01", Some(3)),
            record(ContentKind::Edition, "second", "2024-05-01", Some(2)),
        ];
        records.sort_by(|x, y| x.listing_cmp(y));
        let slugs: Vec<_> = records.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_prev_next() {
        let records = vec![
            record(ContentKind::Post, "new", "2024-03-01", None),
            record(ContentKind::Post, "mid", "2024-02-01", None),
            record(ContentKind::Post, "old", "2024-01-01", None),
        ];
        let mid = &records[1];
        assert_eq!(mid.prev(&records).map(|r| r.slug.as_str()), Some("new"));
        assert_eq!(mid.next(&records).map(|r| r.slug.as_str()), Some("old"));
        assert!(records[0].prev(&records).is_none());
        assert!(records[2].next(&records).is_none());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("blog".parse::<ContentKind>(), Ok(ContentKind::Post));
        assert_eq!("edition".parse::<ContentKind>(), Ok(ContentKind::Edition));
        assert!("page".parse::<ContentKind>().is_err());
        assert!(record(ContentKind::Post, "x", "2024-01-01", None).has_tag("rust"));
    }
}
