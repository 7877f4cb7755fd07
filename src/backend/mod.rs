//! Storage collaborators
//!
//! All persistence lives in the hosted backend: the `posts` and `categories`
//! tables and the `post-images` / `backups` buckets. The rest of the crate only
//! talks to it through [`PostStore`] and [`ObjectStore`], so tests and offline
//! runs can swap in [`MemoryBackend`].

mod memory;
mod rest;

pub use memory::MemoryBackend;
pub use rest::RestBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::{NewPost, Post, PostDraft};

/// Bucket holding uploaded post images
pub const IMAGE_BUCKET: &str = "post-images";

/// Bucket holding JSON backups
pub const BACKUP_BUCKET: &str = "backups";

/// Errors reported by a storage backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode backend response: {0}")]
    Decode(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("permission denied: {0}")]
    Permission(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else {
            BackendError::Request(e.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// An object listed in a bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Access to the `posts` and `categories` tables
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts, newest `published_at` first
    async fn list_posts(&self) -> Result<Vec<Post>>;

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// Whether any post already uses `slug`
    async fn slug_exists(&self, slug: &str) -> Result<bool>;

    async fn insert_post(&self, post: &NewPost<'_>) -> Result<Post>;

    /// Overwrite the editable fields of post `id`, keeping `slug`
    async fn update_post(&self, id: i64, slug: &str, draft: &PostDraft) -> Result<Post>;

    async fn delete_post(&self, id: i64) -> Result<()>;

    /// Raw rows of the `categories` table
    async fn list_categories(&self) -> Result<Vec<serde_json::Value>>;

    /// Delete every post and category, then insert the given rows
    async fn replace_all(
        &self,
        posts: &[serde_json::Value],
        categories: &[serde_json::Value],
    ) -> Result<()>;
}

/// Access to the object storage buckets
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<()>;

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>>;

    async fn list(&self, bucket: &str) -> Result<Vec<StoredObject>>;

    async fn remove(&self, bucket: &str, path: &str) -> Result<()>;

    /// Public URL of an object, without checking that it exists
    fn public_url(&self, bucket: &str, path: &str) -> String;
}
