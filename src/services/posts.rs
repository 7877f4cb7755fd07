//! Post workflows: listing, creation with slug allocation, edits and uploads

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::backend::{BackendError, ObjectStore, PostStore, IMAGE_BUCKET};
use crate::content::{search, slug, NewPost, Post, PostDraft};
use crate::error::{Result, ServiceError};

static UPLOAD_NONCE: AtomicU64 = AtomicU64::new(0);

/// Post operations over the injected stores
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostStore>,
    objects: Arc<dyn ObjectStore>,
    max_image_bytes: usize,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        objects: Arc<dyn ObjectStore>,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            posts,
            objects,
            max_image_bytes,
        }
    }

    /// All posts, newest first
    pub async fn list(&self) -> Result<Vec<Post>> {
        Ok(self.posts.list_posts().await?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Post> {
        self.posts
            .get_post_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::NotFound(slug.to_string()))
    }

    /// Posts matching `query`, newest first
    pub async fn search(&self, query: &str) -> Result<Vec<Post>> {
        let posts = self.list().await?;
        Ok(search::search(&posts, query).into_iter().cloned().collect())
    }

    /// Slug a new post titled `title` would get right now
    pub async fn allocate_slug(&self, title: &str) -> Result<String> {
        let store = self.posts.clone();
        let slug = slug::allocate(title, move |candidate| {
            let store = store.clone();
            async move { store.slug_exists(&candidate).await }
        })
        .await?;
        Ok(slug)
    }

    /// Create a post under a freshly allocated slug.
    ///
    /// Nothing is inserted unless the slug lookups all succeeded.
    pub async fn create(&self, draft: PostDraft) -> Result<Post> {
        validate(&draft)?;
        let draft = draft.normalized();

        let slug = self.allocate_slug(&draft.title).await?;
        let record = NewPost {
            draft: &draft,
            slug,
            created_at: Utc::now(),
        };

        let post = self.posts.insert_post(&record).await?;
        tracing::info!("Created post {} ({})", post.slug, post.id);
        Ok(post)
    }

    /// Replace the editable fields of the post at `slug`; the slug never changes
    pub async fn update(&self, slug: &str, draft: PostDraft) -> Result<Post> {
        validate(&draft)?;
        let existing = self.get_by_slug(slug).await?;
        let post = self
            .posts
            .update_post(existing.id, &existing.slug, &draft.normalized())
            .await?;
        tracing::info!("Updated post {} ({})", post.slug, post.id);
        Ok(post)
    }

    /// Delete the post at `slug` along with its image, if it was uploaded here
    pub async fn delete(&self, slug: &str) -> Result<()> {
        let existing = self.get_by_slug(slug).await?;
        self.posts.delete_post(existing.id).await?;
        tracing::info!("Deleted post {} ({})", existing.slug, existing.id);

        if self.is_uploaded_image(&existing.image_url) {
            if let Err(e) = self.delete_image(&existing.image_url).await {
                tracing::warn!("Could not remove image {}: {}", existing.image_url, e);
            }
        }
        Ok(())
    }

    /// Store an image in the post image bucket and return its public URL
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        if bytes.is_empty() {
            return Err(ServiceError::Validation(
                "Nenhum arquivo selecionado".to_string(),
            ));
        }
        if !content_type.starts_with("image/") {
            return Err(ServiceError::Validation(
                "O arquivo deve ser uma imagem".to_string(),
            ));
        }
        if bytes.len() > self.max_image_bytes {
            return Err(ServiceError::Validation(format!(
                "A imagem deve ter no máximo {}MB",
                self.max_image_bytes / (1024 * 1024)
            )));
        }

        let path = format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            UPLOAD_NONCE.fetch_add(1, Ordering::Relaxed),
            file_extension(file_name, content_type)
        );
        tracing::debug!(
            "Uploading {} as {} ({:.2}MB)",
            file_name,
            path,
            bytes.len() as f64 / 1024.0 / 1024.0
        );

        self.objects
            .upload(IMAGE_BUCKET, &path, bytes, content_type)
            .await
            .map_err(|e| {
                tracing::error!("Image upload failed: {}", e);
                ServiceError::Upload(match e {
                    BackendError::Duplicate(_) => {
                        "Uma imagem com este nome já existe. Tente novamente.".to_string()
                    }
                    BackendError::Permission(_) => format!(
                        "Erro de permissão. O bucket {} precisa ser configurado.",
                        IMAGE_BUCKET
                    ),
                    other => format!("Erro ao fazer upload: {}", other),
                })
            })?;

        Ok(self.objects.public_url(IMAGE_BUCKET, &path))
    }

    fn is_uploaded_image(&self, image_url: &str) -> bool {
        !image_url.is_empty() && image_url.starts_with(&self.objects.public_url(IMAGE_BUCKET, ""))
    }

    /// Remove an uploaded image given its public URL
    pub async fn delete_image(&self, image_url: &str) -> Result<()> {
        let Some(name) = image_url.rsplit('/').next().filter(|n| !n.is_empty()) else {
            return Ok(());
        };
        self.objects.remove(IMAGE_BUCKET, name).await?;
        Ok(())
    }
}

fn validate(draft: &PostDraft) -> Result<()> {
    match draft.missing_field() {
        Some(field) => Err(ServiceError::Validation(format!(
            "Preencha o campo {}",
            field
        ))),
        None => Ok(()),
    }
}

/// Extension for a stored upload: the file's own, else the MIME subtype
fn file_extension(file_name: &str, content_type: &str) -> String {
    let from_name = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty());
    let raw = from_name.unwrap_or_else(|| content_type.trim_start_matches("image/"));

    let ext: String = raw
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if ext.is_empty() {
        "img".to_string()
    } else {
        ext
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn service_with(backend: Arc<MemoryBackend>) -> PostService {
        PostService::new(backend.clone(), backend, 5 * 1024 * 1024)
    }

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            excerpt: "Resumo".to_string(),
            content: "## Conteúdo".to_string(),
            author: "Ana".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_allocates_unique_slugs() {
        let backend = Arc::new(MemoryBackend::new());
        let service = service_with(backend.clone());

        let first = service.create(draft("São Paulo!!")).await.unwrap();
        let second = service.create(draft("São Paulo")).await.unwrap();
        let third = service.create(draft("sao paulo")).await.unwrap();

        assert_eq!(first.slug, "sao-paulo");
        assert_eq!(second.slug, "sao-paulo-1");
        assert_eq!(third.slug, "sao-paulo-2");
        assert_eq!(service.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let service = service_with(Arc::new(MemoryBackend::new()));
        let mut d = draft("Título");
        d.author.clear();
        match service.create(d).await {
            Err(ServiceError::Validation(msg)) => assert!(msg.contains("Autor")),
            other => panic!("unexpected {:?}", other),
        }
    }

    /// Store whose slug lookups fail, recording whether an insert happened
    #[derive(Default)]
    struct FailingLookup {
        inserted: Mutex<bool>,
    }

    #[async_trait]
    impl PostStore for FailingLookup {
        async fn list_posts(&self) -> crate::backend::Result<Vec<Post>> {
            Ok(Vec::new())
        }
        async fn get_post_by_slug(&self, _: &str) -> crate::backend::Result<Option<Post>> {
            Ok(None)
        }
        async fn slug_exists(&self, _: &str) -> crate::backend::Result<bool> {
            Err(BackendError::Status {
                status: 503,
                message: "unavailable".to_string(),
            })
        }
        async fn insert_post(&self, _: &NewPost<'_>) -> crate::backend::Result<Post> {
            *self.inserted.lock().unwrap() = true;
            Err(BackendError::Request("should not insert".to_string()))
        }
        async fn update_post(
            &self,
            _: i64,
            _: &str,
            _: &PostDraft,
        ) -> crate::backend::Result<Post> {
            unreachable!()
        }
        async fn delete_post(&self, _: i64) -> crate::backend::Result<()> {
            unreachable!()
        }
        async fn list_categories(&self) -> crate::backend::Result<Vec<serde_json::Value>> {
            Ok(Vec::new())
        }
        async fn replace_all(
            &self,
            _: &[serde_json::Value],
            _: &[serde_json::Value],
        ) -> crate::backend::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_lookup_failure_aborts_creation() {
        let store = Arc::new(FailingLookup::default());
        let service = PostService::new(store.clone(), Arc::new(MemoryBackend::new()), 1024);

        let result = service.create(draft("Oferta")).await;
        assert!(matches!(
            result,
            Err(ServiceError::Slug(slug::SlugError::LookupFailed { .. }))
        ));
        assert!(!*store.inserted.lock().unwrap());
    }

    #[tokio::test]
    async fn test_update_keeps_slug() {
        let service = service_with(Arc::new(MemoryBackend::new()));
        let created = service.create(draft("Fone JBL")).await.unwrap();

        let mut edited = draft("Fone JBL Tune 510");
        edited.has_table = false;
        edited.table_data = vec![Default::default()];
        let updated = service.update(&created.slug, edited).await.unwrap();

        assert_eq!(updated.slug, "fone-jbl");
        assert_eq!(updated.title, "Fone JBL Tune 510");
        assert!(updated.table_data.is_empty());
        assert!(matches!(
            service.update("nao-existe", draft("x")).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let service = service_with(Arc::new(MemoryBackend::new()));
        let created = service.create(draft("Apagar")).await.unwrap();
        service.delete(&created.slug).await.unwrap();
        assert!(matches!(
            service.get_by_slug(&created.slug).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_search() {
        let service = service_with(Arc::new(MemoryBackend::new()));
        service.create(draft("Fone JBL")).await.unwrap();
        service.create(draft("Notebook")).await.unwrap();
        let found = service.search("jbl").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].slug, "fone-jbl");
        assert!(service.search("j").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_image() {
        let backend = Arc::new(MemoryBackend::new());
        let service = service_with(backend.clone());

        let url = service
            .upload_image("Foto Produto.PNG", "image/png", vec![0; 10])
            .await
            .unwrap();
        assert!(url.starts_with("memory://storage/post-images/"));
        assert!(url.ends_with(".png"));
        assert_eq!(backend.object_count(IMAGE_BUCKET).await, 1);

        service.delete_image(&url).await.unwrap();
        assert_eq!(backend.object_count(IMAGE_BUCKET).await, 0);
    }

    #[tokio::test]
    async fn test_delete_removes_uploaded_image() {
        let backend = Arc::new(MemoryBackend::new());
        let service = service_with(backend.clone());

        let url = service
            .upload_image("foto.png", "image/png", vec![1])
            .await
            .unwrap();
        let mut with_image = draft("Com Imagem");
        with_image.image_url = url;
        let post = service.create(with_image).await.unwrap();

        let mut external = draft("Imagem Externa");
        external.image_url = "https://cdn.loja.com/x.png".to_string();
        let other = service.create(external).await.unwrap();

        service.delete(&post.slug).await.unwrap();
        assert_eq!(backend.object_count(IMAGE_BUCKET).await, 0);
        service.delete(&other.slug).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_validation() {
        let service = service_with(Arc::new(MemoryBackend::new()));

        let err = service.upload_image("a.png", "image/png", Vec::new()).await;
        assert!(matches!(err, Err(ServiceError::Validation(m)) if m == "Nenhum arquivo selecionado"));

        let err = service.upload_image("a.pdf", "application/pdf", vec![1]).await;
        assert!(matches!(err, Err(ServiceError::Validation(m)) if m == "O arquivo deve ser uma imagem"));

        let err = service
            .upload_image("a.jpg", "image/jpeg", vec![0; 5 * 1024 * 1024 + 1])
            .await;
        assert!(matches!(err, Err(ServiceError::Validation(m)) if m == "A imagem deve ter no máximo 5MB"));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("foto.JPG", "image/jpeg"), "jpg");
        assert_eq!(file_extension("sem-extensao", "image/webp"), "webp");
        assert_eq!(file_extension("x.", "image/svg+xml"), "svgxml");
    }
}
