//! Search posts from the command line

use anyhow::Result;

use crate::content::search::MIN_QUERY_CHARS;
use crate::helpers::{full_url_for, post_path, search_path};
use crate::AchandoOferta;

pub async fn run(app: &AchandoOferta, query: &str) -> Result<()> {
    if query.trim().chars().count() < MIN_QUERY_CHARS {
        anyhow::bail!("Query must have at least {} characters", MIN_QUERY_CHARS);
    }

    let posts = app.post_service().search(query).await?;
    println!("Results for {:?} ({}):", query.trim(), posts.len());
    for post in posts {
        println!("  {} [{}]", post.title, post_path(&post.slug));
    }
    println!("Open: {}", full_url_for(&app.config, &search_path(query)));

    Ok(())
}
