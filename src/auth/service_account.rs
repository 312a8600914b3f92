use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::credentials::ServiceAccountKey;

use super::jwt::{self, AssertionClaims};
use super::{AccessToken, AuthError, TokenSource};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Tokens are refreshed this many seconds before they expire.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges signed service-account assertions for bearer tokens.
pub struct ServiceAccountAuthenticator {
    client_email: String,
    key_id: Option<String>,
    token_uri: String,
    scope: String,
    signing_key: EncodingKey,
    client: reqwest::Client,
    cached: RwLock<Option<AccessToken>>,
}

impl ServiceAccountAuthenticator {
    /// Fails if the private key in `key` is not a valid RSA PEM.
    pub fn new(key: &ServiceAccountKey, scope: &str, client: reqwest::Client) -> Result<Self, String> {
        let signing_key = jwt::signing_key(&key.private_key)?;

        Ok(Self {
            client_email: key.client_email.clone(),
            key_id: key.private_key_id.clone(),
            token_uri: key.token_uri.clone(),
            scope: scope.to_string(),
            signing_key,
            client,
            cached: RwLock::new(None),
        })
    }

    async fn fetch_token(&self) -> Result<AccessToken, AuthError> {
        let now = Utc::now();
        let claims = AssertionClaims::new(&self.client_email, &self.scope, &self.token_uri, now);
        let assertion = jwt::encode_assertion(&claims, &self.signing_key, self.key_id.as_deref())
            .map_err(AuthError::Signing)?;

        let resp = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| match e.error_description {
                    Some(desc) => format!("{}: {desc}", e.error),
                    None => e.error,
                })
                .unwrap_or_else(|_| body.chars().take(256).collect());
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::Decode(e.to_string()))?;

        tracing::debug!(
            "Obtained access token for {} (expires in {}s)",
            self.client_email,
            parsed.expires_in
        );

        Ok(AccessToken {
            token: parsed.access_token,
            expires_at: now + Duration::seconds(parsed.expires_in),
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountAuthenticator {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        {
            let guard = self.cached.read().await;
            if let Some(token) = guard.as_ref().filter(|t| t.is_fresh(Utc::now(), REFRESH_MARGIN_SECS)) {
                return Ok(token.clone());
            }
        }

        let mut guard = self.cached.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = guard.as_ref().filter(|t| t.is_fresh(Utc::now(), REFRESH_MARGIN_SECS)) {
            return Ok(token.clone());
        }

        let token = self.fetch_token().await?;
        *guard = Some(token.clone());
        Ok(token)
    }
}
