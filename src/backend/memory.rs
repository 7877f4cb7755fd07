//! In-process backend for tests and offline runs

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{BackendError, ObjectStore, PostStore, Result, StoredObject};
use crate::content::{NewPost, Post, PostDraft};

#[derive(Default)]
struct Tables {
    next_id: i64,
    posts: Vec<Post>,
    categories: Vec<serde_json::Value>,
}

/// Keeps tables and buckets in memory.
///
/// Enforces the unique index on `posts.slug` the way the hosted database does,
/// so a racing insert surfaces as [`BackendError::Duplicate`].
#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
    buckets: RwLock<BTreeMap<String, BTreeMap<String, (Vec<u8>, String)>>>,
    base_url: String,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            base_url: "memory://storage".to_string(),
            ..Default::default()
        }
    }

    /// Number of stored objects in a bucket
    pub async fn object_count(&self, bucket: &str) -> usize {
        self.buckets
            .read()
            .await
            .get(bucket)
            .map(|b| b.len())
            .unwrap_or(0)
    }
}

fn post_from_draft(id: i64, slug: String, draft: &PostDraft) -> Post {
    Post {
        id,
        title: draft.title.clone(),
        slug,
        excerpt: draft.excerpt.clone(),
        content: draft.content.clone(),
        content_initial: Some(draft.content_initial.clone()).filter(|s| !s.is_empty()),
        image_url: draft.image_url.clone(),
        author: draft.author.clone(),
        categories: draft.categories.clone(),
        keywords: draft.keywords.clone(),
        published_at: None,
        created_at: None,
        updated_at: None,
        has_table: draft.has_table,
        table_data: draft.table_data.clone(),
        use_third_column: draft.use_third_column,
        column_names: Some(draft.column_names.clone()),
        affiliate_link: Some(draft.affiliate_link.clone()).filter(|s| !s.is_empty()),
        store_name: draft.store_name,
    }
}

#[async_trait]
impl PostStore for MemoryBackend {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        let mut posts = self.tables.read().await.posts.clone();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(posts)
    }

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().any(|p| p.slug == slug))
    }

    async fn insert_post(&self, record: &NewPost<'_>) -> Result<Post> {
        let mut tables = self.tables.write().await;
        if tables.posts.iter().any(|p| p.slug == record.slug) {
            return Err(BackendError::Duplicate(format!(
                "posts_slug_key ({})",
                record.slug
            )));
        }

        tables.next_id += 1;
        let mut post = post_from_draft(tables.next_id, record.slug.clone(), record.draft);
        post.created_at = Some(record.created_at);
        // Column default of the hosted table
        post.published_at = Some(Utc::now());
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: i64, slug: &str, draft: &PostDraft) -> Result<Post> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("post {}", id)))?;

        let mut updated = post_from_draft(id, slug.to_string(), draft);
        updated.published_at = existing.published_at;
        updated.created_at = existing.created_at;
        updated.updated_at = Some(Utc::now());
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete_post(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.posts.retain(|p| p.id != id);
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<serde_json::Value>> {
        Ok(self.tables.read().await.categories.clone())
    }

    async fn replace_all(
        &self,
        posts: &[serde_json::Value],
        categories: &[serde_json::Value],
    ) -> Result<()> {
        let posts: Vec<Post> = posts
            .iter()
            .map(|v| serde_json::from_value(v.clone()))
            .collect::<std::result::Result<_, _>>()?;

        let mut tables = self.tables.write().await;
        tables.next_id = posts.iter().map(|p| p.id).max().unwrap_or(0);
        tables.posts = posts;
        tables.categories = categories.to_vec();
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let mut buckets = self.buckets.write().await;
        let objects = buckets.entry(bucket.to_string()).or_default();
        if objects.contains_key(path) {
            return Err(BackendError::Duplicate(format!("{}/{}", bucket, path)));
        }
        objects.insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>> {
        self.buckets
            .read()
            .await
            .get(bucket)
            .and_then(|objects| objects.get(path))
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| BackendError::NotFound(format!("{}/{}", bucket, path)))
    }

    async fn list(&self, bucket: &str) -> Result<Vec<StoredObject>> {
        let buckets = self.buckets.read().await;
        Ok(buckets
            .get(bucket)
            .map(|objects| {
                objects
                    .keys()
                    .map(|name| StoredObject {
                        name: name.clone(),
                        created_at: None,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn remove(&self, bucket: &str, path: &str) -> Result<()> {
        if let Some(objects) = self.buckets.write().await.get_mut(bucket) {
            objects.remove(path);
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, bucket, path)
    }
}
