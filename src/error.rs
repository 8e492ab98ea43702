// src/error.rs
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Database(sqlx::Error),
    NotFound(String),
    Validation(String),
    Conflict(String),
    // Customer deletion guard: distinguished from a generic conflict so the
    // caller can show a targeted message
    HasReceipts(String),
    Report(String),
    Document(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn has_receipts(msg: impl Into<String>) -> Self {
        AppError::HasReceipts(msg.into())
    }

    pub fn report(msg: impl Into<String>) -> Self {
        AppError::Report(msg.into())
    }

    pub fn document(msg: impl Into<String>) -> Self {
        AppError::Document(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Database(ref e) => {
                tracing::error!(?e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Database error occurred".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            AppError::HasReceipts(msg) => (StatusCode::CONFLICT, "has_associated_receipts", msg),
            AppError::Report(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "report_failed", msg),
            AppError::Document(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "document_failed", msg),
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}
