//! Content module - post model, markup rendering, slugs and search

mod frontmatter;
pub mod markdown;
mod post;
pub mod search;
pub mod slug;

pub use frontmatter::FrontMatter;
pub use markdown::{render, ContentBlock, Segment};
pub use post::{split_list, ColumnNames, NewPost, Post, PostDraft, StoreName, TableRow};
pub use self::slug::SlugError;
