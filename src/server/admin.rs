//! Password-gated editor: create, edit, delete and image upload

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::json;

use super::{AppError, SharedState};
use crate::content::{split_list, ColumnNames, PostDraft, StoreName};
use crate::error::ServiceError;
use crate::helpers;
use crate::templates::{parse_table, EditorData, TemplateRenderer};

const NEW_POST_ACTION: &str = "/admin/new";

/// Fields posted by the gate and the editor
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EditorForm {
    /// "unlock" from the gate, "save" from the editor
    pub stage: String,
    pub password: String,

    pub title: String,
    pub excerpt: String,
    pub content_initial: String,
    pub content: String,
    pub author: String,
    pub categories: String,
    pub keywords: String,
    pub image_url: String,
    pub affiliate_link: String,
    pub store_name: String,

    /// Checkboxes are only sent when checked
    pub has_table: Option<String>,
    pub use_third_column: Option<String>,
    pub col1_name: String,
    pub col2_name: String,
    pub col3_name: String,
    pub table: String,
}

impl EditorForm {
    fn is_save(&self) -> bool {
        self.stage == "save"
    }

    pub fn to_draft(&self) -> PostDraft {
        let defaults = ColumnNames::default();
        let name_or = |value: &str, default: String| {
            let value = value.trim();
            if value.is_empty() {
                default
            } else {
                value.to_string()
            }
        };

        PostDraft {
            title: self.title.trim().to_string(),
            excerpt: self.excerpt.clone(),
            content: self.content.clone(),
            content_initial: self.content_initial.clone(),
            author: self.author.trim().to_string(),
            categories: split_list(&self.categories),
            keywords: split_list(&self.keywords),
            image_url: self.image_url.trim().to_string(),
            has_table: self.has_table.is_some(),
            table_data: parse_table(&self.table),
            use_third_column: self.use_third_column.is_some(),
            column_names: ColumnNames {
                col1: name_or(&self.col1_name, defaults.col1),
                col2: name_or(&self.col2_name, defaults.col2),
                col3: Some(name_or(
                    &self.col3_name,
                    defaults.col3.unwrap_or_default(),
                )),
            },
            affiliate_link: self.affiliate_link.trim().to_string(),
            store_name: StoreName::from_key(&self.store_name),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteForm {
    pub password: String,
}

/// Why a request did not pass the password gate
enum Denied {
    Disabled,
    WrongPassword,
}

impl Denied {
    fn status(&self) -> StatusCode {
        match self {
            Denied::Disabled => StatusCode::FORBIDDEN,
            Denied::WrongPassword => StatusCode::UNAUTHORIZED,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Denied::Disabled => "O editor está desativado",
            Denied::WrongPassword => "Senha incorreta",
        }
    }
}

fn authorize(state: &SharedState, password: &str) -> Result<(), Denied> {
    match state.config.admin_password.as_deref() {
        None => Err(Denied::Disabled),
        Some(expected) if constant_time_eq(expected.as_bytes(), password.as_bytes()) => {
            Ok(())
        }
        Some(_) => Err(Denied::WrongPassword),
    }
}

/// Compares every byte regardless of where the first mismatch is
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn gate_page(
    state: &SharedState,
    action: &str,
    error: Option<&str>,
    status: StatusCode,
) -> Result<Response, AppError> {
    let mut context = TemplateRenderer::base_context(&state.config);
    context.insert("action", action);
    context.insert("error", &error);
    context.insert("enabled", &state.config.admin_password.is_some());
    let page = state.templates.render("gate.html", &context)?;
    Ok((status, Html(page)).into_response())
}

fn denied_page(state: &SharedState, action: &str, denied: Denied) -> Result<Response, AppError> {
    tracing::warn!("Editor access denied on {}: {}", action, denied.message());
    gate_page(state, action, Some(denied.message()), denied.status())
}

fn editor_page(
    state: &SharedState,
    draft: &PostDraft,
    slug: Option<&str>,
    password: &str,
    error: Option<String>,
) -> Result<Response, AppError> {
    let status = if error.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };

    let mut context = TemplateRenderer::base_context(&state.config);
    context.insert("editor", &EditorData::new(draft, slug));
    context.insert("password", password);
    context.insert("error", &error);
    let page = state.templates.render("editor.html", &context)?;
    Ok((status, Html(page)).into_response())
}

pub async fn new_gate(State(state): State<SharedState>) -> Result<Response, AppError> {
    gate_page(&state, NEW_POST_ACTION, None, StatusCode::OK)
}

pub async fn new_submit(
    State(state): State<SharedState>,
    Form(form): Form<EditorForm>,
) -> Result<Response, AppError> {
    if let Err(denied) = authorize(&state, &form.password) {
        return denied_page(&state, NEW_POST_ACTION, denied);
    }
    if !form.is_save() {
        return editor_page(&state, &PostDraft::default(), None, &form.password, None);
    }

    let draft = form.to_draft();
    match state.posts.create(draft.clone()).await {
        Ok(post) => Ok(Redirect::to(&helpers::post_path(&post.slug)).into_response()),
        Err(e) if e.is_user_error() => {
            editor_page(&state, &draft, None, &form.password, Some(e.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn edit_gate(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let post = state.posts.get_by_slug(&slug).await?;
    let action = format!("{}/edit", helpers::post_path(&post.slug));
    gate_page(&state, &action, None, StatusCode::OK)
}

pub async fn edit_submit(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    Form(form): Form<EditorForm>,
) -> Result<Response, AppError> {
    let action = format!("{}/edit", helpers::post_path(&slug));
    if let Err(denied) = authorize(&state, &form.password) {
        return denied_page(&state, &action, denied);
    }

    if !form.is_save() {
        let post = state.posts.get_by_slug(&slug).await?;
        return editor_page(&state, &post.draft(), Some(&post.slug), &form.password, None);
    }

    let draft = form.to_draft();
    match state.posts.update(&slug, draft.clone()).await {
        Ok(post) => Ok(Redirect::to(&helpers::post_path(&post.slug)).into_response()),
        Err(e) if e.is_user_error() => editor_page(
            &state,
            &draft,
            Some(&slug),
            &form.password,
            Some(e.to_string()),
        ),
        Err(e) => Err(e.into()),
    }
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Result<Response, AppError> {
    if let Err(denied) = authorize(&state, &form.password) {
        let action = format!("{}/edit", helpers::post_path(&slug));
        return denied_page(&state, &action, denied);
    }
    state.posts.delete(&slug).await?;
    Ok(Redirect::to("/posts").into_response())
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Multipart upload with `password` and `file` fields; answers `{"url": ...}`
pub async fn upload(State(state): State<SharedState>, mut multipart: Multipart) -> Response {
    let mut password = String::new();
    let mut file: Option<(String, String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.body_text()),
        };

        match field.name() {
            Some("password") => match field.text().await {
                Ok(text) => password = text,
                Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.body_text()),
            },
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some((file_name, content_type, bytes.to_vec())),
                    Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.body_text()),
                }
            }
            _ => {}
        }
    }

    if let Err(denied) = authorize(&state, &password) {
        return json_error(denied.status(), denied.message());
    }

    let (file_name, content_type, bytes) = file.unwrap_or_default();
    match state
        .posts
        .upload_image(&file_name, &content_type, bytes)
        .await
    {
        Ok(url) => Json(json!({ "url": url })).into_response(),
        Err(e @ ServiceError::Validation(_)) => json_error(StatusCode::BAD_REQUEST, &e.to_string()),
        Err(e) => json_error(e.status_code(), &e.to_string()),
    }
}
