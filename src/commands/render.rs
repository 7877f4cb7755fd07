//! Render a post file with the line-based markup

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::content::{render, FrontMatter};
use crate::helpers::{render_html, BlockStyle};

/// Print the blocks of a file's body, or its HTML when `html` is set.
///
/// Front-matter, when present, is skipped.
pub fn run(path: &Path, html: bool) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let (_, body) = FrontMatter::parse(&content)?;

    if html {
        print!("{}", render_html(body, BlockStyle::Body));
    } else {
        for block in render(body) {
            println!("{:?}", block);
        }
    }

    Ok(())
}
