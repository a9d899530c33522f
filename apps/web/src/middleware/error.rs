//! Error handling - every failure renders as an HTML page.

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use askama::Template;

use scribe_core::error::{DomainError, RepoError};
use scribe_core::ports::StorageError;

use crate::templates::{ErrorTemplate, NotFoundTemplate};

/// Application-level error type rendered through the error templates.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn page(&self) -> Result<String, askama::Error> {
        match self {
            AppError::NotFound(_) => NotFoundTemplate { viewer: None }.render(),
            other => ErrorTemplate {
                viewer: None,
                status: other.status_code().as_u16(),
                title: other
                    .status_code()
                    .canonical_reason()
                    .unwrap_or("Error")
                    .to_string(),
            }
            .render(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound(detail) => tracing::debug!("Not found: {}", detail),
            AppError::Internal(detail) => tracing::error!("Internal error: {}", detail),
            other => tracing::warn!("{}", other),
        }

        let body = self.page().unwrap_or_else(|e| {
            tracing::error!("Failed to render error page: {}", e);
            self.status_code().to_string()
        });

        HttpResponse::build(self.status_code())
            .content_type(ContentType::html())
            .body(body)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => AppError::NotFound(err.to_string()),
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::Forbidden => AppError::Forbidden,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::BadRequest(msg),
            RepoError::Connection(msg) => {
                AppError::Internal(format!("Database connection error: {msg}"))
            }
            RepoError::Query(msg) => AppError::Internal(format!("Database query error: {msg}")),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Internal(format!("Media storage error: {err}"))
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Internal(format!("Template error: {err}"))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
