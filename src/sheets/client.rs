use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;

use crate::auth::TokenSource;

use super::{AppendValuesResponse, SheetsApi, SheetsError, ValueRange};

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Sheets v4 REST client bound to one spreadsheet.
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
    tokens: Arc<dyn TokenSource>,
}

impl SheetsClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        spreadsheet_id: &str,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, String> {
        let base_url = Url::parse(base_url).map_err(|e| format!("Invalid Sheets API URL: {e}"))?;
        if base_url.cannot_be_a_base() {
            return Err(format!("Invalid Sheets API URL: {base_url}"));
        }

        Ok(Self {
            http,
            base_url,
            spreadsheet_id: spreadsheet_id.to_string(),
            tokens,
        })
    }

    /// `{base}/v4/spreadsheets/{id}/values/{last_segment}` with every segment
    /// percent-encoded.
    fn values_url(&self, last_segment: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", last_segment]);
        }
        url
    }

    async fn bearer(&self) -> Result<String, SheetsError> {
        Ok(self.tokens.access_token().await?.token)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, SheetsError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| SheetsError::Transport(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<GoogleErrorBody>(&body)
            .map(|b| match b.error.status {
                Some(s) => format!("{s}: {}", b.error.message),
                None => b.error.message,
            })
            .unwrap_or_else(|_| body.chars().take(256).collect());
        return Err(SheetsError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| SheetsError::Decode(e.to_string()))
}

#[async_trait]
impl SheetsApi for SheetsClient {
    async fn get_values(&self, range: &str) -> Result<ValueRange, SheetsError> {
        let token = self.bearer().await?;
        let url = self.values_url(range);

        tracing::debug!("GET values {range}");

        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SheetsError::Transport(e.to_string()))?;

        read_json(resp).await
    }

    async fn append_values(
        &self,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<AppendValuesResponse, SheetsError> {
        let token = self.bearer().await?;
        let mut url = self.values_url(&format!("{range}:append"));
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        tracing::debug!("APPEND {} row(s) at {range}", rows.len());

        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": rows,
            }))
            .send()
            .await
            .map_err(|e| SheetsError::Transport(e.to_string()))?;

        read_json(resp).await
    }
}
