// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use waste_portal::config::Config;
use waste_portal::models::SessionUser;
use waste_portal::routes::create_router;
use waste_portal::services::session::{create_session_token, SESSION_COOKIE};
use waste_portal::services::DepositService;
use waste_portal::AppState;

/// A report id the fake backend knows about.
#[allow(dead_code)]
pub const KNOWN_REPORT_ID: &str = "65f1a2b3c4d5e6f708192a3b";

/// Canned answers for the fake backend. `None` makes the endpoint fail.
#[derive(Clone)]
pub struct FakeResponses {
    pub benefits: Option<Value>,
    pub wallet: Option<Value>,
    pub redeem_status: StatusCode,
    pub redeem_delay: Duration,
    pub validate: Option<Value>,
    pub report: Option<Value>,
    pub verify: Option<Value>,
    pub place_name: Option<String>,
}

impl Default for FakeResponses {
    fn default() -> Self {
        Self {
            benefits: Some(json!([
                {"id": "b_small", "name": "Compost Bag", "coins_required": 300,
                 "description": "A bag of compost", "validity_days": 30},
                {"id": "b_exact", "name": "Bus Pass", "coins_required": 800,
                 "description": "One week of buses", "validity_days": 7},
                {"id": "b_large", "name": "Bicycle", "coins_required": 5000,
                 "description": "A city bicycle", "validity_days": 365}
            ])),
            wallet: Some(json!({
                "id": "w_live", "user_id": "user_123", "balance": 800,
                "total_earned": 1200, "total_spent": 400,
                "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"
            })),
            redeem_status: StatusCode::OK,
            redeem_delay: Duration::ZERO,
            validate: Some(json!({
                "is_valid": true,
                "message": "Waste detected",
                "confidence_score": 91,
                "waste_types": "Plastic, Paper",
                "severity": "high",
                "recyclable_items": [{"type": "PET bottle", "confidence": 88}],
                "report_id": KNOWN_REPORT_ID
            })),
            report: Some(json!({
                "_id": KNOWN_REPORT_ID,
                "image_url": "/uploads/before.jpg",
                "description": "Overflowing bin",
                "location": {"coordinates": [77.59, 12.97], "placeName": "MG Road"},
                "timestamp": "2024-03-20T10:00:00Z",
                "status": "unverified",
                "severity": "Medium"
            })),
            verify: Some(json!({
                "status": "verified", "is_same_location": true,
                "is_clean": true, "improvement_percentage": 95.0
            })),
            place_name: Some("MG Road, Bengaluru, Karnataka, India".to_string()),
        }
    }
}

struct FakeState {
    responses: FakeResponses,
    requests: Mutex<Vec<String>>,
    form_fields: Mutex<Vec<String>>,
}

/// In-process stand-in for the waste backend and the geocoder.
pub struct FakeBackend {
    pub url: String,
    state: Arc<FakeState>,
}

#[allow(dead_code)]
impl FakeBackend {
    pub async fn start(responses: FakeResponses) -> Self {
        let state = Arc::new(FakeState {
            responses,
            requests: Mutex::new(Vec::new()),
            form_fields: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/reverse", get(reverse))
            .route("/auth/authority/login", post(authority_login))
            .route("/auth/authority/register", post(authority_register))
            .route("/api/waste/validate", post(validate))
            .route("/api/waste/reports/{id}", get(report))
            .route("/api/waste/reports/{id}/verify-cleanup", post(verify))
            .route("/api/digital-wallet/benefits", get(benefits))
            .route("/api/digital-wallet/redeem", post(redeem))
            .route("/api/digital-wallet/{user_id}", get(wallet))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url, state }
    }

    /// Every request seen so far, as `METHOD path`.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Number of requests whose path starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.split_once(' ').is_some_and(|(_, path)| path.starts_with(prefix)))
            .count()
    }

    /// Multipart fields received, as `name=value` (files as `name=<bytes>`).
    pub fn form_fields(&self) -> Vec<String> {
        self.state.form_fields.lock().unwrap().clone()
    }
}

async fn record(
    State(state): State<Arc<FakeState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    state
        .requests
        .lock()
        .unwrap()
        .push(format!("{} {}", request.method(), request.uri().path()));
    next.run(request).await
}

fn canned(value: &Option<Value>, missing: StatusCode) -> Response {
    match value {
        Some(body) => Json(body.clone()).into_response(),
        None => (missing, "unavailable").into_response(),
    }
}

async fn collect_fields(state: &FakeState, mut multipart: Multipart) {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let entry = if field.file_name().is_some() {
            let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            format!("{}=<{} bytes>", name, len)
        } else {
            format!("{}={}", name, field.text().await.unwrap_or_default())
        };
        state.form_fields.lock().unwrap().push(entry);
    }
}

async fn reverse(State(state): State<Arc<FakeState>>) -> Response {
    match &state.responses.place_name {
        Some(name) => Json(json!({"display_name": name})).into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

async fn authority_login(Json(body): Json<Value>) -> Response {
    if body["username"] == "ward7" && body["password"] == "secret" {
        (
            [(header::SET_COOKIE, "authority_token=abc123; Path=/; HttpOnly")],
            Json(json!({"message": "Welcome back"})),
        )
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid username or password"})),
        )
            .into_response()
    }
}

async fn authority_register(Json(body): Json<Value>) -> Response {
    if body["username"] == "taken" {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Username already registered"})),
        )
            .into_response()
    } else {
        Json(json!({"message": "created"})).into_response()
    }
}

async fn validate(State(state): State<Arc<FakeState>>, multipart: Multipart) -> Response {
    collect_fields(&state, multipart).await;
    canned(&state.responses.validate, StatusCode::INTERNAL_SERVER_ERROR)
}

async fn report(State(state): State<Arc<FakeState>>) -> Response {
    canned(&state.responses.report, StatusCode::NOT_FOUND)
}

async fn verify(State(state): State<Arc<FakeState>>, multipart: Multipart) -> Response {
    collect_fields(&state, multipart).await;
    canned(&state.responses.verify, StatusCode::INTERNAL_SERVER_ERROR)
}

async fn benefits(State(state): State<Arc<FakeState>>) -> Response {
    canned(&state.responses.benefits, StatusCode::INTERNAL_SERVER_ERROR)
}

async fn wallet(State(state): State<Arc<FakeState>>) -> Response {
    canned(&state.responses.wallet, StatusCode::INTERNAL_SERVER_ERROR)
}

async fn redeem(State(state): State<Arc<FakeState>>) -> Response {
    tokio::time::sleep(state.responses.redeem_delay).await;
    let status = state.responses.redeem_status;
    (status, Json(json!({"ok": status.is_success()}))).into_response()
}

/// Create a test app whose outbound calls go to `backend`.
#[allow(dead_code)]
pub fn create_test_app(backend: &FakeBackend) -> (axum::Router, Arc<AppState>) {
    create_test_app_with(backend, |_| {})
}

/// Like [`create_test_app`], with a chance to adjust the config first.
#[allow(dead_code)]
pub fn create_test_app_with(
    backend: &FakeBackend,
    configure: impl FnOnce(&mut Config),
) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.backend_url = backend.url.clone();
    config.geocoder_url = backend.url.clone();
    configure(&mut config);

    let state = Arc::new(AppState::new(config, DepositService::builtin()).unwrap());
    (create_router(state.clone()), state)
}

/// The signed-in user used by the tests.
#[allow(dead_code)]
pub fn test_user() -> SessionUser {
    SessionUser {
        email: "asha@example.com".to_string(),
        display_name: "Asha".to_string(),
        avatar_url: None,
    }
}

/// `Cookie` header value carrying a valid session.
#[allow(dead_code)]
pub fn session_cookie(state: &AppState) -> String {
    let token = create_session_token(&test_user(), &state.config.session_signing_key).unwrap();
    format!("{}={}", SESSION_COOKIE, token)
}

/// One part of a multipart test body.
#[allow(dead_code)]
pub enum FormPart<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

const BOUNDARY: &str = "----waste-portal-test-boundary";

/// Build a `multipart/form-data` request.
#[allow(dead_code)]
pub fn multipart_request(uri: &str, cookie: Option<&str>, parts: &[FormPart<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            FormPart::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            FormPart::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

/// Build a JSON request.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Build a bodiless GET request.
#[allow(dead_code)]
pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
