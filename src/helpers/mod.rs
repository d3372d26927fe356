//! Helper functions shared by the renderer, page assembly and templates

mod html;
mod url;

pub use html::*;
pub use url::*;
