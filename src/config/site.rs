//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub content_dir: String,
    pub posts_dir: String,
    pub editions_dir: String,
    pub static_dir: String,

    // Writing
    /// Recognised content extensions, in lookup order
    pub extensions: Vec<String>,
    pub words_per_minute: usize,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Listing
    pub per_page: usize,
    pub related_count: usize,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub menu: Vec<MenuItem>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: String::new(),
            language: "en".to_string(),

            url: "http://localhost:3000".to_string(),
            root: "/".to_string(),

            content_dir: "content".to_string(),
            posts_dir: "blog".to_string(),
            editions_dir: "newsletter".to_string(),
            static_dir: "public".to_string(),

            extensions: vec!["mdx".to_string(), "md".to_string(), "markdown".to_string()],
            words_per_minute: 200,
            highlight: HighlightConfig::default(),

            per_page: 10,
            related_count: 3,

            server: ServerConfig::default(),

            menu: vec![
                MenuItem::new("Blog", "/blog"),
                MenuItem::new("Newsletter", "/newsletter"),
            ],
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    /// syntect theme name
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: true,
        }
    }
}

/// Development server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Navigation entry rendered in the page header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
}

impl MenuItem {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Folio");
        assert_eq!(config.extensions, vec!["mdx", "md", "markdown"]);
        assert_eq!(config.words_per_minute, 200);
        assert_eq!(config.menu.len(), 2);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Portfolio
author: Test User
posts_dir: posts
per_page: 5
highlight:
  line_number: false
server:
  port: 8080
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Portfolio");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.posts_dir, "posts");
        assert_eq!(config.editions_dir, "newsletter");
        assert_eq!(config.per_page, 5);
        assert!(!config.highlight.line_number);
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.ip, "127.0.0.1");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "title: From Disk\nwords_per_minute: 250\n").unwrap();

        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.title, "From Disk");
        assert_eq!(config.words_per_minute, 250);
    }
}
