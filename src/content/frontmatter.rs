//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Why a metadata block could not be read
#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("file does not start with a front-matter block")]
    Missing,

    #[error("front-matter block opened with '{0}' is never closed")]
    Unterminated(&'static str),

    #[error("invalid YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML front-matter: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter data from a post or newsletter edition
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub updated: Option<String>,
    pub slug: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,
    /// Newsletter editions call their tags topics
    #[serde(deserialize_with = "string_or_vec", default)]
    pub topics: Vec<String>,
    /// Edition sequence number
    pub number: Option<u32>,
    #[serde(default = "default_published")]
    pub published: bool,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

fn default_published() -> bool {
    true
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            date: None,
            updated: None,
            slug: None,
            author: None,
            image: None,
            tags: Vec::new(),
            topics: Vec::new(),
            number: None,
            published: true,
            extra: IndexMap::new(),
        }
    }
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, body)
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        if content.starts_with("---") {
            let (meta, body) = split_block(content, "---")?;
            return Ok((Self::parse_yaml(meta)?, body));
        }

        if content.starts_with("+++") {
            let (meta, body) = split_block(content, "+++")?;
            return Ok((Self::parse_toml(meta)?, body));
        }

        Err(FrontMatterError::Missing)
    }

    fn parse_yaml(meta: &str) -> Result<Self, FrontMatterError> {
        if meta.trim().is_empty() {
            return Ok(FrontMatter::default());
        }
        Ok(serde_yaml::from_str(meta)?)
    }

    fn parse_toml(meta: &str) -> Result<Self, FrontMatterError> {
        let mut table: toml::Table = toml::from_str(meta)?;

        // TOML has a native datetime type; records keep dates as authored text
        for (_, value) in table.iter_mut() {
            if let toml::Value::Datetime(dt) = value {
                *value = toml::Value::String(dt.to_string());
            }
        }

        Ok(toml::Value::Table(table).try_into()?)
    }

    /// Parse the date string into a timestamp
    pub fn parse_date(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(parse_date_string)
    }
}

/// Split `delim\n<meta>\ndelim\n<body>` into meta and body
fn split_block<'a>(
    content: &'a str,
    delim: &'static str,
) -> Result<(&'a str, &'a str), FrontMatterError> {
    let rest = &content[delim.len()..];
    let newline = rest.find('\n').ok_or(FrontMatterError::Unterminated(delim))?;

    // `---title: x` is not an opening delimiter
    if !rest[..newline].trim().is_empty() {
        return Err(FrontMatterError::Missing);
    }

    let meta_start = newline + 1;
    let mut offset = meta_start;
    for line in rest[meta_start..].split_inclusive('\n') {
        if line.trim_end() == delim {
            let meta = &rest[meta_start..offset];
            let body = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);
            return Ok((meta, body));
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated(delim))
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // RFC 3339 / ISO 8601 with offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    None
}
