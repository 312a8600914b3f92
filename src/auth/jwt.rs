use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

/// Lifetime Google accepts for a self-signed assertion.
const ASSERTION_LIFETIME_MINUTES: i64 = 60;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AssertionClaims {
    pub fn new(client_email: &str, scope: &str, token_uri: &str, now: DateTime<Utc>) -> Self {
        Self {
            iss: client_email.to_string(),
            scope: scope.to_string(),
            aud: token_uri.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(ASSERTION_LIFETIME_MINUTES)).timestamp(),
        }
    }
}

pub fn signing_key(private_key_pem: &str) -> Result<EncodingKey, String> {
    EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
        .map_err(|e| format!("Invalid service account private key: {e}"))
}

pub fn encode_assertion(
    claims: &AssertionClaims,
    key: &EncodingKey,
    key_id: Option<&str>,
) -> Result<String, String> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key_id.map(|k| k.to_string());
    encode(&header, claims, key).map_err(|e| format!("JWT encode failed: {e}"))
}
