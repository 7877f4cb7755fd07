//! List posts

use anyhow::Result;

use crate::helpers::format_date_br;
use crate::AchandoOferta;

/// Print every post, newest first
pub async fn run(app: &AchandoOferta) -> Result<()> {
    let posts = app.post_service().list().await?;

    println!("Posts ({}):", posts.len());
    for post in posts {
        let date = post
            .display_date()
            .map(|d| format_date_br(&d))
            .unwrap_or_else(|| "--/--/----".to_string());
        println!("  {} - {} [{}]", date, post.title, post.slug);
    }

    Ok(())
}
