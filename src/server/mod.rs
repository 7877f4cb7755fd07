//! Blog server: public pages, the editor and static assets

mod admin;
mod error;
mod pages;

pub use error::AppError;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::SiteConfig;
use crate::services::PostService;
use crate::templates::TemplateRenderer;
use crate::AchandoOferta;

/// Multipart framing on top of the image itself
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Server state
pub struct AppState {
    pub config: SiteConfig,
    pub public_dir: PathBuf,
    pub posts: PostService,
    pub templates: TemplateRenderer,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(app: &AchandoOferta) -> Result<Self> {
        Ok(Self {
            config: app.config.clone(),
            public_dir: app.public_dir.clone(),
            posts: app.post_service(),
            templates: TemplateRenderer::new()?,
        })
    }
}

/// Build the router over `state`
pub fn router(state: SharedState) -> Router {
    let upload_limit = state.config.max_image_bytes + UPLOAD_OVERHEAD_BYTES;
    let assets = ServeDir::new(&state.public_dir)
        .fallback(pages::not_found.with_state(state.clone()));

    Router::new()
        .route("/", get(pages::index))
        .route("/posts", get(pages::posts))
        .route("/search", get(pages::search))
        .route("/about", get(pages::about))
        .route("/privacy", get(pages::privacy))
        .route("/terms", get(pages::terms))
        .route("/blog/:slug", get(pages::post))
        .route(
            "/blog/:slug/edit",
            get(admin::edit_gate).post(admin::edit_submit),
        )
        .route("/admin/new", get(admin::new_gate).post(admin::new_submit))
        .route("/admin/delete/:slug", post(admin::delete))
        .route(
            "/admin/upload",
            post(admin::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(app: &AchandoOferta, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::new(app)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
