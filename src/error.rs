use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::sheets::SheetsError;

#[derive(Debug)]
pub enum AppError {
    /// Body could not be parsed.
    Parse(String),
    /// Strict mode only: body unparseable or failed the field shape check.
    Invalid(String),
    Auth(String),
    Read(String),
    Write(String),
}

impl AppError {
    /// Classify a failure of the value-range read.
    pub fn reading(err: SheetsError) -> Self {
        match err {
            SheetsError::Auth(e) => AppError::Auth(e.to_string()),
            other => AppError::Read(other.to_string()),
        }
    }

    /// Classify a failure of the append.
    pub fn writing(err: SheetsError) -> Self {
        match err {
            SheetsError::Auth(e) => AppError::Auth(e.to_string()),
            other => AppError::Write(other.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Invalid(_) => StatusCode::BAD_REQUEST,
            AppError::Parse(_) | AppError::Auth(_) | AppError::Read(_) | AppError::Write(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Parse(msg) => write!(f, "Parse Error: {msg}"),
            AppError::Invalid(msg) => write!(f, "Validation Error: {msg}"),
            AppError::Auth(msg) => write!(f, "Auth Error: {msg}"),
            AppError::Read(msg) => write!(f, "Read Error: {msg}"),
            AppError::Write(msg) => write!(f, "Write Error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Parse(msg) | AppError::Invalid(msg) => msg.clone(),
            AppError::Auth(detail) => {
                let reference = Uuid::now_v7();
                tracing::error!(%reference, "Authentication failed: {detail}");
                format!("Failed to authenticate with the spreadsheet service (ref {reference})")
            }
            AppError::Read(detail) => {
                let reference = Uuid::now_v7();
                tracing::error!(%reference, "Sheet read failed: {detail}");
                format!("Failed to read the sheet (ref {reference})")
            }
            AppError::Write(detail) => {
                let reference = Uuid::now_v7();
                tracing::error!(%reference, "Row append failed: {detail}");
                format!("Failed to append the row (ref {reference})")
            }
        };

        (status, axum::Json(format!("Error: {message}"))).into_response()
    }
}
