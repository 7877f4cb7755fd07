//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding `backend.url`
pub const ENV_BACKEND_URL: &str = "BACKEND_URL";
/// Environment variable overriding `backend.key`
pub const ENV_BACKEND_KEY: &str = "BACKEND_KEY";
/// Environment variable overriding `admin_password`
pub const ENV_ADMIN_PASSWORD: &str = "ADMIN_PASSWORD";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub logo_url: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,

    // Home page
    /// Posts listed under "Últimos Posts"
    pub latest_posts: usize,

    // Editor
    /// Password for the editor pages. Editing is disabled when unset.
    pub admin_password: Option<String>,
    /// Largest accepted image upload, in bytes
    pub max_image_bytes: usize,

    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Achando Oferta".to_string(),
            description: "As melhores ofertas e análises de produtos".to_string(),
            language: "pt-BR".to_string(),
            logo_url: "https://achandooferta.com.br/logo.png".to_string(),

            url: "https://achandooferta.com.br".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),

            latest_posts: 6,

            admin_password: None,
            max_image_bytes: 5 * 1024 * 1024,

            backend: BackendConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`; empty values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_BACKEND_URL) {
            self.backend.url = Some(url);
        }
        if let Some(key) = get(ENV_BACKEND_KEY) {
            self.backend.key = Some(key);
        }
        if let Some(password) = get(ENV_ADMIN_PASSWORD) {
            self.admin_password = Some(password);
        }

        if self.admin_password.is_none() {
            tracing::warn!("{} is not set, the editor is disabled", ENV_ADMIN_PASSWORD);
        }
    }
}

/// Hosted backend connection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub key: Option<String>,
}

impl BackendConfig {
    /// URL and key, when both are present
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.url.as_deref(), self.key.as_deref()) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Some((url, key)),
            _ => None,
        }
    }
}
