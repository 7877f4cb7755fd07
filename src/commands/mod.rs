//! CLI subcommands

pub mod backup;
pub mod list;
pub mod new;
pub mod render;
pub mod search;
pub mod slug;
