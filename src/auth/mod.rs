pub mod jwt;
pub mod service_account;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use service_account::ServiceAccountAuthenticator;

/// OAuth scope granting read/write access to spreadsheet values.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// True if the token is still usable `margin_secs` from now.
    pub fn is_fresh(&self, now: DateTime<Utc>, margin_secs: i64) -> bool {
        self.expires_at - chrono::Duration::seconds(margin_secs) > now
    }
}

#[derive(Debug)]
pub enum AuthError {
    Signing(String),
    Transport(String),
    Rejected { status: u16, message: String },
    Decode(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Signing(msg) => write!(f, "Could not sign token assertion: {msg}"),
            AuthError::Transport(msg) => write!(f, "Token endpoint unreachable: {msg}"),
            AuthError::Rejected { status, message } => {
                write!(f, "Token endpoint rejected assertion ({status}): {message}")
            }
            AuthError::Decode(msg) => write!(f, "Unreadable token response: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken, AuthError>;
}
