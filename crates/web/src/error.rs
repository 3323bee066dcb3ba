//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before responding; the client only ever sees a
//! generic message for those.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use qwerty_town_core::{BusinessError, MenuError, PanelConfigError};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{FusionBrainError, UploadError};
use crate::store::StoreError;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Reading or writing the JSON data files failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Logo generation failed upstream.
    #[error("Image generation error: {0}")]
    ImageGeneration(#[from] FusionBrainError),

    /// Uploaded file was rejected or could not be stored.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An optional integration is not configured.
    #[error("Unavailable: {0}")]
    Unavailable(&'static str),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Store(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ImageGeneration(FusionBrainError::Storage(err)) | Self::Upload(err)
                if !err.is_client_error() =>
            {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::ImageGeneration(_) => StatusCode::BAD_GATEWAY,
            Self::Upload(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            StatusCode::BAD_GATEWAY => "Image generation service error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(serde_json::json!({ "detail": message }))).into_response()
    }
}

impl From<BusinessError> for AppError {
    fn from(err: BusinessError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<PanelConfigError> for AppError {
    fn from(err: PanelConfigError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<MenuError> for AppError {
    fn from(err: MenuError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
