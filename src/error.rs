use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{models::MovieId, store::StoreError, translate::TranslationError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("movie {0} not found")]
    NotFound(MovieId),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Translation(#[from] TranslationError),
}

/// Outcome kind reported to callers; wire formatting is derived from it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Success,
    NotFound,
    ValidationError,
    ServerError,
}

impl Classification {
    pub fn status_code(self) -> StatusCode {
        match self {
            Classification::Success => StatusCode::OK,
            Classification::NotFound => StatusCode::NOT_FOUND,
            Classification::ValidationError => StatusCode::BAD_REQUEST,
            Classification::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn classification(&self) -> Classification {
        match self {
            AppError::Validation(_) => Classification::ValidationError,
            AppError::NotFound(_) => Classification::NotFound,
            AppError::Store(_) | AppError::Translation(_) => Classification::ServerError,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: Classification,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.classification();
        if status == Classification::ServerError {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody { status, message: self.to_string() };
        (status.status_code(), Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
