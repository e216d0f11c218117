use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use super::store::StoreError;
use super::{ErrorResponse, json_response};
use crate::core::EngineError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("{0}: field is required")]
    MissingField(&'static str),
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error("goal {0} not found")]
    NotFound(Uuid),
    #[error("goal store unavailable")]
    StoreUnavailable,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(_) | ApiError::MissingField(_) | ApiError::Malformed(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn field(&self) -> Option<&'static str> {
        match self {
            ApiError::Engine(err) => Some(err.field()),
            ApiError::MissingField(field) => Some(*field),
            ApiError::Malformed(_) | ApiError::NotFound(_) | ApiError::StoreUnavailable => None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => ApiError::NotFound(id),
            StoreError::Unavailable => ApiError::StoreUnavailable,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::Malformed(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        ApiError::Malformed(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        ApiError::Malformed(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = status.as_u16(), error = %self, "request rejected");
        json_response(
            status,
            ErrorResponse {
                error: self.to_string(),
                field: self.field(),
            },
        )
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
