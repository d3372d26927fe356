//! Content module - front-matter parsing, record loading and indexing

mod frontmatter;
pub mod index;
pub mod loader;
mod record;

pub use frontmatter::{parse_date_string, FrontMatter, FrontMatterError};
pub use index::ContentIndex;
pub use loader::ContentLoader;
pub use record::{count_words, reading_time, ContentKind, ContentRecord};
