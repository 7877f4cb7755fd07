//! REST client for the hosted backend-as-a-service
//!
//! Tables are reached through the PostgREST-style `/rest/v1/<table>` endpoint
//! and buckets through `/storage/v1/object`. Every request carries the
//! project key both as `apikey` and as a bearer token.

use async_trait::async_trait;
use chrono::Utc;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;

use super::{BackendError, ObjectStore, PostStore, Result, StoredObject};
use crate::content::{NewPost, Post, PostDraft};

/// Characters left alone in object paths and filter values
const SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode(value: &str) -> String {
    utf8_percent_encode(value, SAFE).to_string()
}

/// Client for the hosted backend
pub struct RestBackend {
    client: Client,
    base_url: String,
    key: String,
}

impl RestBackend {
    pub fn new(base_url: &str, key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        tracing::debug!("Backend client for {}", base_url);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    fn table_url(&self, table: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{}", self.base_url, table)
        } else {
            format!("{}/rest/v1/{}?{}", self.base_url, table, query)
        }
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            encode(bucket),
            encode(path)
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    /// Send and turn non-2xx answers into a [`BackendError`]
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::warn!("Backend answered {}: {}", status, message);
        Err(classify_failure(status, message))
    }

    async fn select<T: serde::de::DeserializeOwned>(&self, table: &str, query: &str) -> Result<Vec<T>> {
        let response = self.send(self.client.get(self.table_url(table, query))).await?;
        Ok(response.json().await?)
    }

    async fn write_rows<B: Serialize + ?Sized>(
        &self,
        request: RequestBuilder,
        body: &B,
    ) -> Result<Vec<Post>> {
        let response = self
            .send(request.header("Prefer", "return=representation").json(body))
            .await?;
        Ok(response.json().await?)
    }
}

fn classify_failure(status: StatusCode, message: String) -> BackendError {
    let lower = message.to_lowercase();
    if status == StatusCode::NOT_FOUND {
        BackendError::NotFound(message)
    } else if status == StatusCode::CONFLICT || lower.contains("duplicate") {
        BackendError::Duplicate(message)
    } else if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || lower.contains("security policy")
    {
        BackendError::Permission(message)
    } else {
        BackendError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

#[derive(Serialize)]
struct PostPatch<'a> {
    #[serde(flatten)]
    draft: &'a PostDraft,
    slug: &'a str,
    updated_at: chrono::DateTime<Utc>,
}

#[async_trait]
impl PostStore for RestBackend {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        self.select("posts", "select=*&order=published_at.desc").await
    }

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let query = format!("select=*&slug=eq.{}&limit=1", encode(slug));
        let rows: Vec<Post> = self.select("posts", &query).await?;
        Ok(rows.into_iter().next())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let query = format!("select=id&slug=eq.{}&limit=1", encode(slug));
        let rows: Vec<serde_json::Value> = self.select("posts", &query).await?;
        Ok(!rows.is_empty())
    }

    async fn insert_post(&self, record: &NewPost<'_>) -> Result<Post> {
        let request = self.client.post(self.table_url("posts", ""));
        let rows = self.write_rows(request, &[record]).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::Decode("insert returned no rows".to_string()))
    }

    async fn update_post(&self, id: i64, slug: &str, draft: &PostDraft) -> Result<Post> {
        let request = self
            .client
            .patch(self.table_url("posts", &format!("id=eq.{}", id)));
        let patch = PostPatch {
            draft,
            slug,
            updated_at: Utc::now(),
        };
        let rows = self.write_rows(request, &patch).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("post {}", id)))
    }

    async fn delete_post(&self, id: i64) -> Result<()> {
        let url = self.table_url("posts", &format!("id=eq.{}", id));
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<serde_json::Value>> {
        self.select("categories", "select=*").await
    }

    async fn replace_all(
        &self,
        posts: &[serde_json::Value],
        categories: &[serde_json::Value],
    ) -> Result<()> {
        for table in ["posts", "categories"] {
            let url = self.table_url(table, "id=neq.0");
            self.send(self.client.delete(url)).await?;
        }

        for (table, rows) in [("posts", posts), ("categories", categories)] {
            if rows.is_empty() {
                continue;
            }
            let request = self.client.post(self.table_url(table, "")).json(rows);
            self.send(request).await?;
            tracing::info!("Restored {} rows into {}", rows.len(), table);
        }

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for RestBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let request = self
            .client
            .post(self.object_url(bucket, path))
            .header("content-type", content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes);
        self.send(request).await?;
        Ok(())
    }

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>> {
        let response = self.send(self.client.get(self.object_url(bucket, path))).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn list(&self, bucket: &str) -> Result<Vec<StoredObject>> {
        let url = format!("{}/storage/v1/object/list/{}", self.base_url, encode(bucket));
        let body = serde_json::json!({
            "prefix": "",
            "sortBy": { "column": "created_at", "order": "desc" },
        });
        let response = self.send(self.client.post(url).json(&body)).await?;
        Ok(response.json().await?)
    }

    async fn remove(&self, bucket: &str, path: &str) -> Result<()> {
        let url = format!("{}/storage/v1/object/{}", self.base_url, encode(bucket));
        let body = serde_json::json!({ "prefixes": [path] });
        self.send(self.client.delete(url).json(&body)).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            encode(bucket),
            encode(path)
        )
    }
}
