use crate::error::AppError;
use crate::sheets::{self, a1};
use crate::state::SharedState;

use super::{fields, parser};

pub struct PipelineResult {
    pub row_index: u32,
    pub updated_range: Option<String>,
}

/// Parse one submission and append it below the sheet's populated rows.
///
/// The append is only attempted once the row index has been read.
pub async fn run(
    state: &SharedState,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<PipelineResult, AppError> {
    let strict = state.config.strict_fields;
    // Strict mode treats a malformed body as the caller's fault
    let reject: fn(String) -> AppError = if strict {
        AppError::Invalid
    } else {
        AppError::Parse
    };

    let raw = parser::parse_body(content_type, body).map_err(reject)?;
    let submission = fields::extract(&raw, strict).map_err(reject)?;

    let warnings = fields::validate(&submission);
    if !warnings.is_empty() {
        tracing::debug!("Field warnings: {:?}", warnings);
    }

    let table = state.config.table_name.as_str();
    let row_index = sheets::resolve_next_row(state.sheets.as_ref(), table)
        .await
        .map_err(AppError::reading)?;

    let range = a1::cell(table, "A", row_index);
    let response = state
        .sheets
        .append_values(&range, &[submission.to_row()])
        .await
        .map_err(AppError::writing)?;

    let updated_range = response.updates.and_then(|u| u.updated_range);
    tracing::info!(
        "Appended submission at {range} (updated {})",
        updated_range.as_deref().unwrap_or("unknown range")
    );

    Ok(PipelineResult {
        row_index,
        updated_range,
    })
}
