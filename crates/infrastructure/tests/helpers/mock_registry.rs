#![allow(dead_code)]
//! In-process registry and token endpoint served by axum on loopback.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct RegistryState {
    devices: Mutex<HashMap<String, (StatusCode, String)>>,
    requests: Mutex<Vec<RecordedRequest>>,
    delay: Mutex<Option<Duration>>,
}

pub struct MockRegistryServer {
    addr: SocketAddr,
    state: Arc<RegistryState>,
}

impl MockRegistryServer {
    pub async fn start() -> Self {
        let state = Arc::new(RegistryState::default());
        let app = Router::new()
            .route("/{site}/devices/{device}", get(device_handler))
            .with_state(Arc::clone(&state));

        let addr = serve(app).await;
        Self { addr, state }
    }

    /// `http://127.0.0.1:{port}`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn set_device(&self, id: &str, body: String) {
        self.set_response(id, StatusCode::OK, body);
    }

    pub fn set_response(&self, id: &str, status: StatusCode, body: String) {
        self.state
            .devices
            .lock()
            .unwrap()
            .insert(id.to_string(), (status, body));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = Some(delay);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn device_handler(
    State(state): State<Arc<RegistryState>>,
    Path((site, device)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    state.requests.lock().unwrap().push(RecordedRequest {
        path: format!("/{}/devices/{}", site, device),
        authorization: header_value(&headers, header::AUTHORIZATION),
    });

    let delay = *state.delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let entry = state.devices.lock().unwrap().get(&device).cloned();
    match entry {
        Some((status, body)) => (status, body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub authorization: Option<String>,
    pub form: HashMap<String, String>,
}

struct TokenState {
    calls: AtomicUsize,
    status: Mutex<StatusCode>,
    expires_in: Mutex<Option<u64>>,
    requests: Mutex<Vec<TokenRequest>>,
}

pub struct MockTokenServer {
    addr: SocketAddr,
    state: Arc<TokenState>,
}

impl MockTokenServer {
    pub async fn start() -> Self {
        let state = Arc::new(TokenState {
            calls: AtomicUsize::new(0),
            status: Mutex::new(StatusCode::OK),
            expires_in: Mutex::new(Some(3600)),
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/token", post(token_handler))
            .with_state(Arc::clone(&state));

        let addr = serve(app).await;
        Self { addr, state }
    }

    pub fn token_url(&self) -> String {
        format!("http://{}/token", self.addr)
    }

    pub fn set_status(&self, status: StatusCode) {
        *self.state.status.lock().unwrap() = status;
    }

    pub fn set_expires_in(&self, expires_in: Option<u64>) {
        *self.state.expires_in.lock().unwrap() = expires_in;
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<TokenRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

/// Tokens are numbered by issue order: `token-1`, `token-2`, ...
async fn token_handler(
    State(state): State<Arc<TokenState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let call = state.calls.fetch_add(1, Ordering::SeqCst) + 1;
    state.requests.lock().unwrap().push(TokenRequest {
        authorization: header_value(&headers, header::AUTHORIZATION),
        form,
    });

    let status = *state.status.lock().unwrap();
    if !status.is_success() {
        return (status, "denied").into_response();
    }

    let expires_in = *state.expires_in.lock().unwrap();
    let mut body = serde_json::json!({
        "access_token": format!("token-{}", call),
        "token_type": "Bearer",
    });
    if let Some(expires_in) = expires_in {
        body["expires_in"] = serde_json::json!(expires_in);
    }

    Json(body).into_response()
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
