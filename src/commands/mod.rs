//! CLI subcommands

pub mod check;
pub mod list;
pub mod preview;
pub mod render;
