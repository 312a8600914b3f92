use std::net::IpAddr;

use crate::credentials::{self, ServiceAccountKey};

pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub spreadsheet_id: String,
    pub table_name: String,
    pub service_account: ServiceAccountKey,
    pub sheets_api_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub request_timeout_secs: u64,
    pub strict_fields: bool,
    pub cors_origins: Vec<String>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` is this over
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let spreadsheet_id = required(&lookup, "SPREADSHEET_ID")?;
        let table_name = required(&lookup, "TABLE_NAME")?;

        let encoded = required(&lookup, "BASE64_ENCODED_SERVICE_ACCOUNT")?;
        let service_account = credentials::decode_service_account(&encoded)
            .map_err(|e| format!("Invalid BASE64_ENCODED_SERVICE_ACCOUNT: {e}"))?;

        let sheets_api_url = or_default(&lookup, "SHEETS_API_URL", DEFAULT_SHEETS_API_URL)
            .trim_end_matches('/')
            .to_string();

        let host: IpAddr = or_default(&lookup, "SHEETDROP_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid SHEETDROP_HOST: {e}"))?;

        let port: u16 = or_default(&lookup, "SHEETDROP_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid SHEETDROP_PORT: {e}"))?;

        let max_body_size: usize = or_default(&lookup, "SHEETDROP_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid SHEETDROP_MAX_BODY_SIZE: {e}"))?;

        let request_timeout_secs: u64 =
            or_default(&lookup, "SHEETDROP_REQUEST_TIMEOUT_SECS", "30")
                .parse()
                .map_err(|e| format!("Invalid SHEETDROP_REQUEST_TIMEOUT_SECS: {e}"))?;

        let strict_fields = match or_default(&lookup, "SHEETDROP_STRICT_FIELDS", "false")
            .to_ascii_lowercase()
            .as_str()
        {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" | "" => false,
            other => return Err(format!("Invalid SHEETDROP_STRICT_FIELDS: {other}")),
        };

        let cors_origins: Vec<String> = or_default(&lookup, "SHEETDROP_CORS_ORIGINS", "")
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();

        let log_level = or_default(&lookup, "SHEETDROP_LOG_LEVEL", "info");

        Ok(Config {
            spreadsheet_id,
            table_name,
            service_account,
            sheets_api_url,
            host,
            port,
            max_body_size,
            request_timeout_secs,
            strict_fields,
            cors_origins,
            log_level,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format!("Missing required environment variable: {key}"))
}

fn or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}
