//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;
use crate::content::ContentKind;

/// Characters left alone in query values
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://example.com/blog/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Encode a single query or path value
pub fn encode_url(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Path of a record's article page
pub fn record_path(config: &SiteConfig, kind: ContentKind, slug: &str) -> String {
    url_for(config, &format!("{}/{}", kind.route(), encode_url(slug)))
}

/// Path of a listing page with its filters; empty filters and the first
/// page are left out
pub fn listing_path(
    config: &SiteConfig,
    kind: ContentKind,
    tag: Option<&str>,
    query: Option<&str>,
    page: usize,
) -> String {
    let mut params = Vec::new();
    if let Some(tag) = tag.filter(|t| !t.is_empty()) {
        params.push(format!("tag={}", encode_url(tag)));
    }
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        params.push(format!("q={}", encode_url(query)));
    }
    if page > 1 {
        params.push(format!("page={}", page));
    }

    let path = url_for(config, kind.route());
    if params.is_empty() {
        path
    } else {
        format!("{}?{}", path, params.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://example.com".to_string(),
            root: "/site/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/css/style.css"), "/site/css/style.css");
        assert_eq!(url_for(&config, ""), "/site/");
        assert_eq!(url_for(&SiteConfig::default(), "blog"), "/blog");
    }

    #[test]
    fn test_full_url_for() {
        assert_eq!(
            full_url_for(&test_config(), "/about/"),
            "https://example.com/site/about/"
        );
    }

    #[test]
    fn test_record_path() {
        let config = SiteConfig::default();
        assert_eq!(record_path(&config, ContentKind::Post, "hello-world"), "/blog/hello-world");
        assert_eq!(record_path(&config, ContentKind::Edition, "issue_7"), "/newsletter/issue_7");
    }

    #[test]
    fn test_listing_path() {
        let config = SiteConfig::default();
        assert_eq!(listing_path(&config, ContentKind::Post, None, None, 1), "/blog");
        assert_eq!(
            listing_path(&config, ContentKind::Post, Some("c++"), Some("async io"), 2),
            "/blog?tag=c%2B%2B&q=async%20io&page=2"
        );
    }
}
