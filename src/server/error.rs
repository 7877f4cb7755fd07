//! Mapping of service failures to HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::backend::BackendError;
use crate::content::SlugError;
use crate::error::ServiceError;

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Slug(SlugError::EmptyTitle(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Slug(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Upload(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Backup { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Backend(BackendError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServiceError::Backend(BackendError::Permission(_)) => StatusCode::FORBIDDEN,
            ServiceError::Backend(BackendError::Duplicate(_)) => StatusCode::CONFLICT,
            ServiceError::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Whether the editor should show this error next to the form
    pub fn is_user_error(&self) -> bool {
        self.status_code() == StatusCode::UNPROCESSABLE_ENTITY
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}

/// Error returned by page handlers
pub enum AppError {
    Service(ServiceError),
    Render(anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        AppError::Service(e)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Render(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Service(e) => e.into_response(),
            AppError::Render(e) => {
                tracing::error!("Template error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }
        }
    }
}
