use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_types::{FieldError, ValidationCode, ValidationErrors};
use database::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
}

impl AppError {
    fn malformed(field: &str, message: String) -> Self {
        AppError::Validation(ValidationErrors::single(FieldError::new(
            field,
            message,
            ValidationCode::Malformed,
        )))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::malformed("body", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::malformed("query", rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::malformed("path", rejection.body_text())
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Database(DbError::NotFound(entity)) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{entity} not found") }),
            ),
            AppError::Database(DbError::Conflict(conflict)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": conflict.message() }),
            ),
            AppError::Database(err @ DbError::HasDependents(_)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": err.to_string() }),
            ),
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An internal database error occurred" }),
                )
            }
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "Validation failed", "fields": errors }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
