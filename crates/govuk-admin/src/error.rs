//! Application error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::filter::FilterError;
use crate::pagination::PaginationError;
use crate::theme::ManifestError;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid filter: {0}")]
    Filter(#[from] FilterError),

    #[error("invalid page: {0}")]
    Pagination(#[from] PaginationError),

    #[error("asset manifest error")]
    Manifest(#[from] ManifestError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) | AppError::Manifest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Filter(FilterError::PageOutOfRange { .. }) | AppError::Pagination(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::BadRequest(_) | AppError::Filter(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            AppError::Manifest(e) => {
                tracing::error!(error = %e, "asset manifest error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
