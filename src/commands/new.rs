//! Publish a post from a markdown file with front-matter

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::content::{FrontMatter, Post};
use crate::helpers::post_path;
use crate::AchandoOferta;

/// Create a post from `path`.
///
/// The body is the main content; text before `<!-- more -->` becomes the
/// initial content.
pub async fn create_post(app: &AchandoOferta, path: &Path) -> Result<Post> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    let (front_matter, body) = FrontMatter::parse(&content)?;
    let draft = front_matter.into_draft(body);

    let post = app.post_service().create(draft).await?;
    println!("Created: {} ({})", post.title, post_path(&post.slug));

    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_post_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = AchandoOferta::offline(dir.path()).unwrap();
        let path = dir.path().join("fone.md");
        fs::write(
            &path,
            "---\ntitle: Fone JBL\nauthor: Ana\nexcerpt: Bom e barato\ncategories: Áudio, Ofertas\n---\n> Destaque\n<!-- more -->\n## Review\n",
        )
        .unwrap();

        let post = create_post(&app, &path).await.unwrap();
        assert_eq!(post.slug, "fone-jbl");
        assert_eq!(post.content, "## Review");
        assert_eq!(post.content_initial.as_deref(), Some("> Destaque"));
        assert_eq!(post.categories, vec!["Áudio", "Ofertas"]);

        let again = create_post(&app, &path).await.unwrap();
        assert_eq!(again.slug, "fone-jbl-1");
    }

    #[tokio::test]
    async fn test_missing_fields_fail() {
        let dir = tempfile::tempdir().unwrap();
        let app = AchandoOferta::offline(dir.path()).unwrap();
        let path = dir.path().join("vazio.md");
        fs::write(&path, "---\ntitle: Só título\n---\ntexto\n").unwrap();
        assert!(create_post(&app, &path).await.is_err());
    }
}
