use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::store::StoreError;

/// Error returned by every handler and by the attendance reconciler.
///
/// `Internal` keeps the underlying store message in `details`; it is meant
/// for diagnostics, the frontend only shows `error`.
#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}: {}", context, details)]
    Internal { context: String, details: String },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn internal(context: impl Into<String>, details: impl std::fmt::Display) -> Self {
        AppError::Internal {
            context: context.into(),
            details: details.to_string(),
        }
    }

    /// Maps a store failure onto the HTTP taxonomy. A missing foreign key
    /// (unknown employee) is the caller's fault, everything else is ours.
    pub fn from_store(context: &str, err: StoreError) -> Self {
        match err {
            StoreError::Reference(message) => AppError::Validation(message),
            other => AppError::internal(context, other),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Internal { context, details } => json!({
                "error": context,
                "details": details
            }),
            other => json!({ "error": other.to_string() }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
