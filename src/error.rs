//! Error types for content loading and document rendering

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading content records
#[derive(Error, Debug)]
pub enum ContentError {
    /// No published record answers to this slug
    #[error("content not found: {0}")]
    NotFound(String),

    /// Front-matter is malformed or a required field is missing
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Two published files resolve to the same slug
    #[error("duplicate slug '{slug}' in {} and {}", first.display(), second.display())]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        ContentError::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether the routing layer should answer with a 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound(_))
    }
}

/// Errors raised while compiling or executing a document body
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("line {line}: unknown component <{name}>")]
    UnknownComponent { name: String, line: usize },

    #[error("line {line}: <{name}> is never closed")]
    UnclosedComponent { name: String, line: usize },

    #[error("line {line}: closing tag </{name}> has no matching opening tag")]
    UnexpectedClosingTag { name: String, line: usize },

    #[error("line {line}: expected </{expected}> but found </{found}>")]
    MismatchedClosingTag {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("line {line}: invalid prop '{prop}' on <{component}>: {message}")]
    InvalidProp {
        component: String,
        prop: String,
        message: String,
        line: usize,
    },

    #[error("line {line}: import/export statements are not supported")]
    ModuleStatement { line: usize },

    #[error("line {line}: {message}")]
    DisallowedHtml { message: String, line: usize },

    #[error("<{name}> failed to render: {message}")]
    Component { name: String, message: String },
}

impl RenderError {
    /// Shorthand used by component bindings to report bad input
    pub fn component(name: &str, message: impl ToString) -> Self {
        RenderError::Component {
            name: name.to_string(),
            message: message.to_string(),
        }
    }
}
