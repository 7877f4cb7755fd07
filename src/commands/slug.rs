//! Preview the slug a new post would get

use anyhow::Result;

use crate::AchandoOferta;

pub async fn run(app: &AchandoOferta, title: &str) -> Result<()> {
    let slug = app.post_service().allocate_slug(title).await?;
    println!("{}", slug);
    Ok(())
}
