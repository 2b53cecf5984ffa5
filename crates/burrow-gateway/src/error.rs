use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use burrow_analytics::AnalyticsError;
use burrow_core::{CoreError, ShortenerError};
use burrow_redirector::RedirectorError;
use thiserror::Error;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    AllocationExhausted(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AllocationExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::AllocationExhausted(_) => "allocation_exhausted",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(error: CoreError) -> Self {
        AppError::InvalidInput(error.to_string())
    }
}

impl From<ShortenerError> for AppError {
    fn from(error: ShortenerError) -> Self {
        match error {
            ShortenerError::InvalidInput(msg) => AppError::InvalidInput(msg),
            e @ ShortenerError::AllocationExhausted { .. } => {
                AppError::AllocationExhausted(e.to_string())
            }
            e @ (ShortenerError::GenerationUnavailable(_) | ShortenerError::Storage(_)) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<AnalyticsError> for AppError {
    fn from(error: AnalyticsError) -> Self {
        match error {
            AnalyticsError::InvalidInput(msg) => AppError::InvalidInput(msg),
            e @ AnalyticsError::MappingNotFound(_) => AppError::NotFound(e.to_string()),
            e @ (AnalyticsError::UnknownMapping(_) | AnalyticsError::Storage(_)) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<RedirectorError> for AppError {
    fn from(error: RedirectorError) -> Self {
        AppError::Internal(error.to_string())
    }
}
