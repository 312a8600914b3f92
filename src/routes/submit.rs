use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::state::SharedState;
use crate::submission::pipeline;

pub const SUCCESS_MESSAGE: &str = "Row added successfully to Google Sheets!";

pub async fn submit(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let result = pipeline::run(&state, content_type, &body).await?;
    tracing::debug!("Submission stored in row {}", result.row_index);

    Ok((StatusCode::OK, Json(SUCCESS_MESSAGE)).into_response())
}
