//! Public pages

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tera::Context;

use super::{AppError, SharedState};
use crate::content::search::MIN_QUERY_CHARS;
use crate::error::ServiceError;
use crate::templates::{PostData, TemplateRenderer};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

fn render(state: &SharedState, template: &str, context: &Context) -> Result<Html<String>, AppError> {
    Ok(Html(state.templates.render(template, context)?))
}

pub async fn index(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    let posts = state.posts.list().await?;
    let mut posts = posts.iter().map(|p| PostData::new(p, &state.config));

    let featured = posts.next();
    let latest: Vec<PostData> = posts.take(state.config.latest_posts).collect();

    let mut context = TemplateRenderer::base_context(&state.config);
    context.insert("featured", &featured);
    context.insert("latest", &latest);
    render(&state, "index.html", &context)
}

pub async fn posts(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    let posts: Vec<PostData> = state
        .posts
        .list()
        .await?
        .iter()
        .map(|p| PostData::new(p, &state.config))
        .collect();

    let mut context = TemplateRenderer::base_context(&state.config);
    context.insert("posts", &posts);
    render(&state, "posts.html", &context)
}

pub async fn post(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let post = match state.posts.get_by_slug(&slug).await {
        Ok(post) => post,
        Err(ServiceError::NotFound(_)) => {
            return not_found_page(&state, "Post não encontrado");
        }
        Err(e) => return Err(e.into()),
    };

    let data = PostData::new(&post, &state.config);
    let mut context = TemplateRenderer::base_context(&state.config);
    context.insert("json_ld", &data.json_ld(&state.config));
    context.insert("post", &data);
    Ok(render(&state, "post.html", &context)?.into_response())
}

pub async fn search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, AppError> {
    let query = params.q.trim().to_string();
    let too_short = query.chars().count() < MIN_QUERY_CHARS;

    let posts: Vec<PostData> = if too_short {
        Vec::new()
    } else {
        state
            .posts
            .search(&query)
            .await?
            .iter()
            .map(|p| PostData::new(p, &state.config))
            .collect()
    };
    tracing::debug!("Search {:?}: {} results", query, posts.len());

    let mut context = TemplateRenderer::base_context(&state.config);
    context.insert("query", &query);
    context.insert("too_short", &too_short);
    context.insert("min_chars", &MIN_QUERY_CHARS);
    context.insert("posts", &posts);
    render(&state, "search.html", &context)
}

pub async fn about(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    render(&state, "about.html", &TemplateRenderer::base_context(&state.config))
}

pub async fn privacy(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    render(&state, "privacy.html", &TemplateRenderer::base_context(&state.config))
}

pub async fn terms(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    render(&state, "terms.html", &TemplateRenderer::base_context(&state.config))
}

/// Fallback for anything neither routed nor in the public directory
pub async fn not_found(State(state): State<SharedState>) -> Result<Response, AppError> {
    not_found_page(&state, "Página não encontrada")
}

fn not_found_page(state: &SharedState, message: &str) -> Result<Response, AppError> {
    let mut context = TemplateRenderer::base_context(&state.config);
    context.insert("message", message);
    let page = render(state, "not_found.html", &context)?;
    Ok((StatusCode::NOT_FOUND, page).into_response())
}
