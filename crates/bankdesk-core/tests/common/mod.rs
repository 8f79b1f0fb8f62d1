//! Throwaway banking backend for integration tests.
//!
//! Serves the endpoints the client uses on an ephemeral localhost port,
//! records every call, and lets a test force a status per endpoint.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use bankdesk_core::api::endpoints;

/// One request as the backend saw it
#[derive(Debug, Clone)]
pub struct Call {
    pub path: &'static str,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct BackendState {
    statuses: Mutex<HashMap<&'static str, StatusCode>>,
    calls: Mutex<Vec<Call>>,
}

impl BackendState {
    fn record(&self, path: &'static str, headers: &HeaderMap, body: Option<Value>) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.calls.lock().unwrap().push(Call {
            path,
            authorization,
            body,
        });
    }

    fn status(&self, path: &'static str, default: StatusCode) -> StatusCode {
        self.statuses
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(default)
    }
}

pub struct FakeBackend {
    pub base_url: String,
    state: Arc<BackendState>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());
        let router = Router::new()
            .route(endpoints::LOGIN, post(login))
            .route(endpoints::CREATE_USER, post(create_user))
            .route(endpoints::LOGGED_IN_USER, get(logged_in_user))
            .route(endpoints::LOGOUT, get(logout))
            .route(endpoints::CREATE_ACCOUNT, post(create_account))
            .route("/api/users/auth/refreshToken", post(refresh_token))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Force `path` to answer with `status`
    pub fn respond_with(&self, path: &'static str, status: StatusCode) {
        self.state.statuses.lock().unwrap().insert(path, status);
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.state
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.path == path)
            .cloned()
            .collect()
    }
}

type Shared = State<Arc<BackendState>>;

fn rejection() -> Json<Value> {
    Json(json!({"message": "Error with Data Passed. Try Again!"}))
}

/// Protected endpoints: no bearer is forbidden, the token "expired" is unauthorized.
fn check_bearer(headers: &HeaderMap) -> Option<StatusCode> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    match header.and_then(|h| h.strip_prefix("Bearer ")) {
        None => Some(StatusCode::FORBIDDEN),
        Some("expired") => Some(StatusCode::UNAUTHORIZED),
        Some(_) => None,
    }
}

fn user_body() -> Value {
    json!({
        "id": 42,
        "firstName": "Ada",
        "lastName": "Lovelace",
        "username": "ada",
        "accountList": [
            {"id": 1, "accountType": "CURRENT", "accountNumber": "1000000001", "balance": 250.75}
        ]
    })
}

async fn login(
    State(state): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record(endpoints::LOGIN, &headers, Some(body));
    let status = state.status(endpoints::LOGIN, StatusCode::OK);
    if !status.is_success() {
        return (status, rejection());
    }
    (
        status,
        Json(json!({"accessToken": "X", "refreshToken": "Y", "message": "User Login Was Successful."})),
    )
}

async fn create_user(
    State(state): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record(endpoints::CREATE_USER, &headers, Some(body));
    let status = state.status(endpoints::CREATE_USER, StatusCode::CREATED);
    if !status.is_success() {
        return (status, rejection());
    }
    (
        status,
        Json(json!({"accessToken": "S1", "refreshToken": "S2", "message": "User Registration Was Successful."})),
    )
}

async fn logged_in_user(State(state): Shared, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    state.record(endpoints::LOGGED_IN_USER, &headers, None);
    if let Some(status) = check_bearer(&headers) {
        return (status, Json(json!({})));
    }
    let status = state.status(endpoints::LOGGED_IN_USER, StatusCode::OK);
    if !status.is_success() {
        return (status, Json(json!({"message": "No User Found."})));
    }
    (status, Json(user_body()))
}

async fn logout(State(state): Shared, headers: HeaderMap) -> StatusCode {
    state.record(endpoints::LOGOUT, &headers, None);
    state.status(endpoints::LOGOUT, StatusCode::OK)
}

async fn create_account(
    State(state): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record(endpoints::CREATE_ACCOUNT, &headers, Some(body.clone()));
    if let Some(status) = check_bearer(&headers) {
        return (status, Json(json!({})));
    }
    let status = state.status(endpoints::CREATE_ACCOUNT, StatusCode::CREATED);
    if !status.is_success() {
        return (status, rejection());
    }
    (
        status,
        Json(json!({
            "id": 2,
            "accountNumber": "1000000002",
            "balance": 0.0,
            "transactionList": [],
            "accountType": body["accountType"],
        })),
    )
}

async fn refresh_token(State(state): Shared, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    state.record("/api/users/auth/refreshToken", &headers, None);
    let status = state.status("/api/users/auth/refreshToken", StatusCode::OK);
    if !status.is_success() {
        return (status, rejection());
    }
    (
        status,
        Json(json!({"accessToken": "R1", "refreshToken": "R2", "message": "New Token Generated."})),
    )
}
