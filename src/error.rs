//! Error types for the post workflows

use thiserror::Error;

use crate::backend::BackendError;
use crate::content::SlugError;

/// Errors surfaced to the editor and the CLI
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Input the user has to fix. The message is shown as-is.
    #[error("{0}")]
    Validation(String),

    #[error("post not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Slug(#[from] SlugError),

    /// Image upload failed. The message is shown as-is.
    #[error("{0}")]
    Upload(String),

    #[error("invalid backup {file}: {message}")]
    Backup { file: String, message: String },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
