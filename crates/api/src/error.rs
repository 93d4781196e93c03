use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use storefront_core::error::{CoreError, FieldError};
use storefront_core::image_store::ImageStoreError;

use crate::response::ApiResponse;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the standard [`ApiResponse`]
/// envelope; server-side failures never expose their detail to the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `storefront_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The image store failed to persist an upload.
    #[error("Image store error: {0}")]
    ImageStore(#[from] ImageStoreError),

    /// The request could not be read (malformed multipart body, bad part).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A create request carried no `files` part at all.
    #[error("File is required")]
    FileRequired,
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let envelope: ApiResponse<Vec<FieldError>> = match &self {
            AppError::Core(CoreError::NotFound { entity, id }) => {
                tracing::debug!(entity, id, "Entity not found");
                ApiResponse::empty(StatusCode::NOT_FOUND, format!("{entity} not found"))
            }
            AppError::Core(CoreError::Validation(errors)) => {
                ApiResponse::new(StatusCode::BAD_REQUEST, "Bad Request", errors.clone())
            }
            AppError::BadRequest(msg) => {
                tracing::debug!(error = %msg, "Rejected malformed request");
                ApiResponse::empty(StatusCode::BAD_REQUEST, "Bad Request")
            }
            AppError::FileRequired => {
                ApiResponse::empty(StatusCode::BAD_REQUEST, "File is required")
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                server_error()
            }
            AppError::ImageStore(err) => {
                tracing::error!(error = %err, "Image store error");
                server_error()
            }
        };

        envelope.into_response()
    }
}

fn server_error() -> ApiResponse<Vec<FieldError>> {
    ApiResponse::empty(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
}
