use std::sync::Arc;
use std::time::Duration;

use crate::auth::{SPREADSHEETS_SCOPE, ServiceAccountAuthenticator};
use crate::config::Config;
use crate::sheets::{SheetsApi, SheetsClient};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub sheets: Arc<dyn SheetsApi>,
}

impl AppState {
    /// Wire the authenticator and Sheets client from config. Errors here are
    /// startup failures.
    pub fn from_config(config: Config) -> Result<SharedState, String> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

        let tokens = Arc::new(ServiceAccountAuthenticator::new(
            &config.service_account,
            SPREADSHEETS_SCOPE,
            http.clone(),
        )?);

        let sheets = SheetsClient::new(
            http,
            &config.sheets_api_url,
            &config.spreadsheet_id,
            tokens,
        )?;

        Ok(Self::with_sheets(config, Arc::new(sheets)))
    }

    pub fn with_sheets(config: Config, sheets: Arc<dyn SheetsApi>) -> SharedState {
        Arc::new(AppState { config, sheets })
    }
}
