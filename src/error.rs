//! Error type shared by all handlers

use crate::engine::EngineError;
use crate::models::{ApiResponse, RecordError};
use crate::validation::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(String),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{} not found", what))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Engine(EngineError::Validation(_))
            | AppError::Engine(EngineError::State(_))
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Engine(EngineError::Permission(_)) => StatusCode::FORBIDDEN,
            AppError::Engine(EngineError::NotFound(_)) | AppError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::Engine(EngineError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Record(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

/// Result type returned by handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::from(ValidationError::SameTeam), StatusCode::BAD_REQUEST),
            (AppError::from(EngineError::state("wrong status")), StatusCode::BAD_REQUEST),
            (AppError::from(EngineError::permission("no")), StatusCode::FORBIDDEN),
            (AppError::from(EngineError::conflict("taken")), StatusCode::CONFLICT),
            (AppError::not_found("Booking"), StatusCode::NOT_FOUND),
            (AppError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (AppError::from(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status(), expected, "{}", error);
        }
    }

    #[test]
    fn test_database_details_are_hidden() {
        let response = AppError::from(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_engine_messages_pass_through() {
        let error = AppError::from(EngineError::conflict("This slot has already been taken"));
        assert_eq!(error.to_string(), "This slot has already been taken");
    }
}
