//! JSON backups of the posts and categories tables

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::backend::{ObjectStore, PostStore, StoredObject, BACKUP_BUCKET};
use crate::error::{Result, ServiceError};

/// Contents of a backup file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    pub timestamp: String,
    pub posts: Vec<serde_json::Value>,
    #[serde(default)]
    pub categories: Vec<serde_json::Value>,
}

/// Creates, lists and restores backups in the backup bucket
#[derive(Clone)]
pub struct BackupService {
    posts: Arc<dyn PostStore>,
    objects: Arc<dyn ObjectStore>,
}

impl BackupService {
    pub fn new(posts: Arc<dyn PostStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { posts, objects }
    }

    /// Snapshot both tables into `backup-<timestamp>.json`, returning the file name
    pub async fn create(&self) -> Result<String> {
        let posts = self
            .posts
            .list_posts()
            .await?
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(crate::backend::BackendError::from)?;
        let categories = self.posts.list_categories().await?;

        let backup = Backup {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            posts,
            categories,
        };
        let file = format!("backup-{}.json", backup.timestamp);
        let bytes = serde_json::to_vec_pretty(&backup).map_err(crate::backend::BackendError::from)?;

        self.objects
            .upload(BACKUP_BUCKET, &file, bytes, "application/json")
            .await?;
        tracing::info!(
            "Backup {} written ({} posts, {} categories)",
            file,
            backup.posts.len(),
            backup.categories.len()
        );
        Ok(file)
    }

    /// Backup files, newest first
    pub async fn list(&self) -> Result<Vec<StoredObject>> {
        let mut files: Vec<StoredObject> = self
            .objects
            .list(BACKUP_BUCKET)
            .await?
            .into_iter()
            .filter(|o| o.name.ends_with(".json"))
            .collect();
        files.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(files)
    }

    /// Replace both tables with the contents of `file`, returning its timestamp
    pub async fn restore(&self, file: &str) -> Result<String> {
        let bytes = self.objects.download(BACKUP_BUCKET, file).await?;
        let backup: Backup = serde_json::from_slice(&bytes).map_err(|e| ServiceError::Backup {
            file: file.to_string(),
            message: e.to_string(),
        })?;

        self.posts
            .replace_all(&backup.posts, &backup.categories)
            .await?;
        tracing::info!(
            "Restored {} ({} posts) from {}",
            file,
            backup.posts.len(),
            backup.timestamp
        );
        Ok(backup.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::content::PostDraft;
    use crate::services::PostService;

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            excerpt: "Resumo".to_string(),
            content: "Texto".to_string(),
            author: "Ana".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_backup_and_restore() {
        let backend = Arc::new(MemoryBackend::new());
        let posts = PostService::new(backend.clone(), backend.clone(), 1024);
        let backups = BackupService::new(backend.clone(), backend.clone());

        posts.create(draft("Primeiro")).await.unwrap();
        posts.create(draft("Segundo")).await.unwrap();

        let file = backups.create().await.unwrap();
        assert!(file.starts_with("backup-"));
        assert!(file.ends_with("Z.json"));
        assert_eq!(backups.list().await.unwrap()[0].name, file);

        posts.delete("primeiro").await.unwrap();
        posts.create(draft("Terceiro")).await.unwrap();

        backups.restore(&file).await.unwrap();
        let mut slugs: Vec<String> = posts
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        slugs.sort();
        assert_eq!(slugs, vec!["primeiro", "segundo"]);
    }

    #[tokio::test]
    async fn test_restore_rejects_invalid_file() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .upload(BACKUP_BUCKET, "broken.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();
        let backups = BackupService::new(backend.clone(), backend);

        assert!(matches!(
            backups.restore("broken.json").await,
            Err(ServiceError::Backup { .. })
        ));
        assert!(matches!(
            backups.restore("missing.json").await,
            Err(ServiceError::Backend(_))
        ));
    }
}
