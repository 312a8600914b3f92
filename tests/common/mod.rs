#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde_json::{Value, json};
use tokio::sync::Barrier;

use sheetdrop::auth::SPREADSHEETS_SCOPE;
use sheetdrop::auth::jwt::AssertionClaims;
use sheetdrop::config::Config;
use sheetdrop::state::AppState;

pub const PRIVATE_KEY_PEM: &str = include_str!("../fixtures/test-service-account.pem");
pub const PUBLIC_KEY_PEM: &str = include_str!("../fixtures/test-service-account.pub.pem");

pub const SPREADSHEET_ID: &str = "test-spreadsheet";
pub const CLIENT_EMAIL: &str = "intake@test-project.iam.gserviceaccount.com";
pub const ISSUED_TOKEN: &str = "ya29.test-access-token";

/// One call to `values:append` as seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedAppend {
    pub range: String,
    pub value_input_option: Option<String>,
    pub values: Vec<Vec<String>>,
}

/// In-process stand-in for the Google token endpoint and Sheets v4 values API.
pub struct MockGoogle {
    pub base_url: String,
    pub rows: Mutex<Vec<Vec<String>>>,
    pub appends: Mutex<Vec<RecordedAppend>>,
    pub read_ranges: Mutex<Vec<String>>,
    pub token_requests: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_appends: AtomicBool,
    pub reject_tokens: AtomicBool,
    pub read_barrier: Mutex<Option<Arc<Barrier>>>,
}

impl MockGoogle {
    pub fn token_uri(&self) -> String {
        format!("{}/token", self.base_url)
    }

    pub fn set_rows(&self, rows: &[&[&str]]) {
        *self.rows.lock().unwrap() = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
    }

    pub fn appends(&self) -> Vec<RecordedAppend> {
        self.appends.lock().unwrap().clone()
    }

    pub fn reads(&self) -> usize {
        self.read_ranges.lock().unwrap().len()
    }

    pub fn hold_reads(&self, parties: usize) {
        *self.read_barrier.lock().unwrap() = Some(Arc::new(Barrier::new(parties)));
    }
}

fn google_error(status: StatusCode, message: &str, reason: &str) -> Response {
    (
        status,
        Json(json!({
            "error": { "code": status.as_u16(), "message": message, "status": reason }
        })),
    )
        .into_response()
}

fn check_request(headers: &HeaderMap, spreadsheet_id: &str) -> Result<(), Response> {
    let expected = format!("Bearer {ISSUED_TOKEN}");
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return Err(google_error(
            StatusCode::UNAUTHORIZED,
            "Request had invalid authentication credentials.",
            "UNAUTHENTICATED",
        ));
    }

    if spreadsheet_id != SPREADSHEET_ID {
        return Err(google_error(
            StatusCode::NOT_FOUND,
            "Requested entity was not found.",
            "NOT_FOUND",
        ));
    }

    Ok(())
}

async fn token(State(mock): State<Arc<MockGoogle>>, Form(form): Form<HashMap<String, String>>) -> Response {
    mock.token_requests.fetch_add(1, Ordering::SeqCst);

    if mock.reject_tokens.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "Invalid JWT Signature." })),
        )
            .into_response();
    }

    if form.get("grant_type").map(String::as_str) != Some("urn:ietf:params:oauth:grant-type:jwt-bearer") {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "unsupported_grant_type" }))).into_response();
    }

    let Some(assertion) = form.get("assertion") else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_request" }))).into_response();
    };

    let key = DecodingKey::from_rsa_pem(PUBLIC_KEY_PEM.as_bytes()).expect("fixture public key");
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[mock.token_uri()]);
    validation.set_issuer(&[CLIENT_EMAIL]);

    match jsonwebtoken::decode::<AssertionClaims>(assertion, &key, &validation) {
        Ok(data) if data.claims.scope == SPREADSHEETS_SCOPE => (
            StatusCode::OK,
            Json(json!({ "access_token": ISSUED_TOKEN, "expires_in": 3599, "token_type": "Bearer" })),
        )
            .into_response(),
        Ok(_) => (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_scope" }))).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": e.to_string() })),
        )
            .into_response(),
    }
}

async fn get_values(
    State(mock): State<Arc<MockGoogle>>,
    Path((spreadsheet_id, range)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = check_request(&headers, &spreadsheet_id) {
        return resp;
    }

    mock.read_ranges.lock().unwrap().push(range.clone());

    if mock.fail_reads.load(Ordering::SeqCst) {
        return google_error(StatusCode::SERVICE_UNAVAILABLE, "The service is currently unavailable.", "UNAVAILABLE");
    }

    let rows = mock.rows.lock().unwrap().clone();
    let barrier = mock.read_barrier.lock().unwrap().clone();
    if let Some(barrier) = barrier {
        barrier.wait().await;
    }

    if rows.is_empty() {
        Json(json!({ "range": format!("{range}!A1:Z1000"), "majorDimension": "ROWS" })).into_response()
    } else {
        Json(json!({
            "range": format!("{range}!A1:D{}", rows.len()),
            "majorDimension": "ROWS",
            "values": rows,
        }))
        .into_response()
    }
}

async fn append_values(
    State(mock): State<Arc<MockGoogle>>,
    Path((spreadsheet_id, range)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = check_request(&headers, &spreadsheet_id) {
        return resp;
    }

    let Some(range) = range.strip_suffix(":append") else {
        return google_error(StatusCode::NOT_FOUND, "Unknown method", "NOT_FOUND");
    };

    if mock.fail_appends.load(Ordering::SeqCst) {
        return google_error(
            StatusCode::TOO_MANY_REQUESTS,
            "Quota exceeded for quota metric 'Write requests' of service 'sheets.googleapis.com' for consumer 'project_number:123'.",
            "RESOURCE_EXHAUSTED",
        );
    }

    let values: Vec<Vec<String>> = serde_json::from_value(body["values"].clone()).unwrap_or_default();

    mock.appends.lock().unwrap().push(RecordedAppend {
        range: range.to_string(),
        value_input_option: query.get("valueInputOption").cloned(),
        values: values.clone(),
    });

    let sheet = range.split('!').next().unwrap_or(range).to_string();
    let row = {
        let mut rows = mock.rows.lock().unwrap();
        rows.extend(values.iter().cloned());
        rows.len()
    };

    Json(json!({
        "spreadsheetId": spreadsheet_id,
        "tableRange": format!("{sheet}!A1:D{}", row.saturating_sub(values.len())),
        "updates": {
            "spreadsheetId": spreadsheet_id,
            "updatedRange": format!("{sheet}!A{row}:D{row}"),
            "updatedRows": values.len(),
            "updatedColumns": 4,
            "updatedCells": values.len() * 4,
        }
    }))
    .into_response()
}

pub async fn spawn_mock_google() -> Arc<MockGoogle> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock Google server");
    let addr = listener.local_addr().unwrap();

    let mock = Arc::new(MockGoogle {
        base_url: format!("http://{addr}"),
        rows: Mutex::new(Vec::new()),
        appends: Mutex::new(Vec::new()),
        read_ranges: Mutex::new(Vec::new()),
        token_requests: AtomicUsize::new(0),
        fail_reads: AtomicBool::new(false),
        fail_appends: AtomicBool::new(false),
        reject_tokens: AtomicBool::new(false),
        read_barrier: Mutex::new(None),
    });

    let router = Router::new()
        .route("/token", post(token))
        .route(
            "/v4/spreadsheets/{spreadsheet_id}/values/{range}",
            get(get_values).post(append_values),
        )
        .with_state(mock.clone());

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Mock server failed");
    });

    mock
}

pub fn service_account_json(token_uri: &str) -> Value {
    json!({
        "type": "service_account",
        "project_id": "test-project",
        "private_key_id": "test-key-id",
        "private_key": PRIVATE_KEY_PEM,
        "client_email": CLIENT_EMAIL,
        "client_id": "100000000000000000001",
        "token_uri": token_uri,
    })
}

pub fn encoded_service_account(token_uri: &str) -> String {
    STANDARD.encode(service_account_json(token_uri).to_string())
}

#[derive(Debug, Clone)]
pub struct TestOptions {
    pub spreadsheet_id: String,
    pub table_name: String,
    pub strict_fields: bool,
    pub max_body_size: usize,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            spreadsheet_id: SPREADSHEET_ID.to_string(),
            table_name: "Sheet1".to_string(),
            strict_fields: false,
            max_body_size: 65536,
        }
    }
}

/// A running app wired to a mock Google backend.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub google: Arc<MockGoogle>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Submit a JSON body, return (body, status).
    pub async fn submit_json(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/"))
            .json(data)
            .send()
            .await
            .expect("submit json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit a raw body with an explicit content type, return (body, status).
    pub async fn submit_raw(&self, path: &str, content_type: &str, body: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .header("content-type", content_type)
            .body(body.to_string())
            .send()
            .await
            .expect("submit raw failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit form-urlencoded data, return (body, status).
    pub async fn submit_form(&self, data: &[(&str, &str)]) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/"))
            .form(data)
            .send()
            .await
            .expect("submit form failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn config_for(google: &MockGoogle, options: &TestOptions) -> Config {
    let mut env = HashMap::new();
    env.insert("SPREADSHEET_ID", options.spreadsheet_id.clone());
    env.insert("TABLE_NAME", options.table_name.clone());
    env.insert("BASE64_ENCODED_SERVICE_ACCOUNT", encoded_service_account(&google.token_uri()));
    env.insert("SHEETS_API_URL", google.base_url.clone());
    env.insert("SHEETDROP_STRICT_FIELDS", options.strict_fields.to_string());
    env.insert("SHEETDROP_MAX_BODY_SIZE", options.max_body_size.to_string());
    env.insert("SHEETDROP_REQUEST_TIMEOUT_SECS", "5".to_string());
    env.insert("SHEETDROP_LOG_LEVEL", "warn".to_string());

    Config::from_lookup(|key| env.get(key).cloned()).expect("test config")
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(TestOptions::default()).await
}

pub async fn spawn_app_with(options: TestOptions) -> TestApp {
    let google = spawn_mock_google().await;
    let config = config_for(&google, &options);

    let state = AppState::from_config(config).expect("Failed to build app state");
    let app = sheetdrop::build_app(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        google,
    }
}
