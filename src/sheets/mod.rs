pub mod a1;
pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::AuthError;

pub use client::SheetsClient;

/// `spreadsheets.values` resource. Absent `values` means the range is empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Vec<Value>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: Option<u32>,
    #[serde(default)]
    pub updated_cells: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    #[serde(default)]
    pub table_range: Option<String>,
    #[serde(default)]
    pub updates: Option<UpdateValuesResponse>,
}

#[derive(Debug)]
pub enum SheetsError {
    Auth(AuthError),
    Transport(String),
    Api { status: u16, message: String },
    Decode(String),
}

impl std::fmt::Display for SheetsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetsError::Auth(err) => write!(f, "{err}"),
            SheetsError::Transport(msg) => write!(f, "Sheets request failed: {msg}"),
            SheetsError::Api { status, message } => write!(f, "Sheets API error ({status}): {message}"),
            SheetsError::Decode(msg) => write!(f, "Unreadable Sheets response: {msg}"),
        }
    }
}

impl std::error::Error for SheetsError {}

impl From<AuthError> for SheetsError {
    fn from(err: AuthError) -> Self {
        SheetsError::Auth(err)
    }
}

/// The two value operations the intake flow needs.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    async fn get_values(&self, range: &str) -> Result<ValueRange, SheetsError>;

    /// Append rows starting at `range`, storing values verbatim (RAW).
    async fn append_values(
        &self,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<AppendValuesResponse, SheetsError>;
}

/// 1-based index of the first row below the populated data.
///
/// Header rows are not special-cased: the API returns rows from row 1, so
/// a header is already part of the count.
pub fn next_row_index(range: &ValueRange) -> u32 {
    row_after(range.values.as_ref().map_or(0, Vec::len))
}

/// Row below `count` populated rows, saturating at `u32::MAX`.
pub fn row_after(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX).saturating_add(1)
}

pub async fn resolve_next_row(sheets: &dyn SheetsApi, table_name: &str) -> Result<u32, SheetsError> {
    let range = sheets.get_values(&a1::sheet_range(table_name)).await?;
    Ok(next_row_index(&range))
}
