//! achando-oferta: affiliate product blog
//!
//! Posts live in a hosted backend and are written with a small line-based
//! markup (`##`/`###` headings, `>` quotes, `-` items, `[text](url)` links).
//! This crate renders that markup, allocates unique post slugs, and serves the
//! site and its password-gated editor.

pub mod backend;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod server;
pub mod services;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use backend::{MemoryBackend, ObjectStore, PostStore, RestBackend};
use services::{BackupService, PostService};

/// The main application
#[derive(Clone)]
pub struct AchandoOferta {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Static assets directory
    pub public_dir: PathBuf,
    posts: Arc<dyn PostStore>,
    objects: Arc<dyn ObjectStore>,
}

impl AchandoOferta {
    /// Load `_config.yml` from `base_dir`, apply environment overrides and
    /// connect to the configured backend.
    ///
    /// With `offline`, or without backend credentials, posts are kept in memory.
    pub fn new<P: AsRef<Path>>(base_dir: P, offline: bool) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = Self::load_config(&base_dir)?;

        let credentials = if offline {
            None
        } else {
            config
                .backend
                .credentials()
                .map(|(url, key)| (url.to_string(), key.to_string()))
        };
        let app = match credentials {
            Some((url, key)) => {
                tracing::info!("Using backend at {}", url);
                let backend = Arc::new(RestBackend::new(&url, &key)?);
                Self::with_backend(config, base_dir, backend.clone(), backend)
            }
            None => {
                if !offline {
                    tracing::warn!("No backend credentials configured, keeping posts in memory");
                }
                let backend = Arc::new(MemoryBackend::new());
                Self::with_backend(config, base_dir, backend.clone(), backend)
            }
        };

        Ok(app)
    }

    /// Like [`AchandoOferta::new`] with the in-memory backend
    pub fn offline<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        Self::new(base_dir, true)
    }

    /// Build over explicit stores
    pub fn with_backend(
        config: config::SiteConfig,
        base_dir: PathBuf,
        posts: Arc<dyn PostStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        let public_dir = base_dir.join(&config.public_dir);
        Self {
            config,
            base_dir,
            public_dir,
            posts,
            objects,
        }
    }

    fn load_config(base_dir: &Path) -> Result<config::SiteConfig> {
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn post_service(&self) -> PostService {
        PostService::new(
            self.posts.clone(),
            self.objects.clone(),
            self.config.max_image_bytes,
        )
    }

    pub fn backup_service(&self) -> BackupService {
        BackupService::new(self.posts.clone(), self.objects.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_new_reads_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "title: Ofertas\npublic_dir: static\nbackend:\n  url: https://x.example.co\n  key: k\n",
        )
        .unwrap();

        let app = AchandoOferta::offline(dir.path()).unwrap();
        assert_eq!(app.config.title, "Ofertas");
        assert_eq!(app.public_dir, dir.path().join("static"));
    }

    #[test]
    fn test_bad_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_config.yml"), "latest_posts: [1, 2]\n").unwrap();
        assert!(AchandoOferta::offline(dir.path()).is_err());
    }

    #[tokio::test]
    async fn test_offline_services_share_store() {
        let dir = tempfile::tempdir().unwrap();
        let app = AchandoOferta::offline(dir.path()).unwrap();
        assert!(app.post_service().list().await.unwrap().is_empty());
        app.backup_service().create().await.unwrap();
        assert_eq!(app.backup_service().list().await.unwrap().len(), 1);
    }
}
