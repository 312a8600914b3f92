use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::Deserialize;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const BLOB_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A Google service account key file, as downloaded from the cloud console.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("client_id", &self.client_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug)]
pub enum CredentialError {
    Base64(base64::DecodeError),
    Utf8(std::string::FromUtf8Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialError::Base64(e) => write!(f, "service account blob is not valid base64: {e}"),
            CredentialError::Utf8(e) => write!(f, "service account blob is not valid UTF-8: {e}"),
            CredentialError::Json(e) => write!(f, "service account JSON is invalid: {e}"),
        }
    }
}

impl std::error::Error for CredentialError {}

/// Decode a base64-wrapped service account JSON document.
///
/// Whitespace inside the blob is ignored and trailing `=` padding is optional,
/// so values pasted from `base64 -w 76` or a web encoder both work.
pub fn decode_service_account(blob: &str) -> Result<ServiceAccountKey, CredentialError> {
    let compact: String = blob.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BLOB_ENGINE
        .decode(compact.as_bytes())
        .map_err(CredentialError::Base64)?;
    let text = String::from_utf8(bytes).map_err(CredentialError::Utf8)?;
    serde_json::from_str(&text).map_err(CredentialError::Json)
}
