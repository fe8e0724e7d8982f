//! In-process mock of the auth service shared by the integration tests.
//!
//! It implements the four `/auth/*` endpoints with a refresh cookie
//! (`refresh_token`, `Path=/auth`, rotated on every grant) plus a `GET /me`
//! endpoint that requires a bearer access token. Switches on the shared state
//! make it misbehave (success status without a body, slow responses).

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{AUTHORIZATION, COOKIE, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::net::TcpListener;

pub const EMAIL: &str = "a@test.com";
pub const PASSWORD: &str = "Passw0rd!";

#[derive(Default)]
pub struct MockState {
    pub users: HashMap<String, (Value, String)>,
    pub refresh: HashMap<String, String>,
    pub access: HashMap<String, String>,
    pub counter: u32,
    pub login_without_body: bool,
    pub login_delay: Option<Duration>,
    pub authorization: Vec<(String, Option<String>)>,
}

pub type Shared = Arc<Mutex<MockState>>;

impl MockState {
    pub fn with_user(mut self, id: &str, email: &str, password: &str) -> Self {
        let user = json!({"id": id, "email": email, "createdAt": "2024-01-01T00:00:00Z"});
        self.users
            .insert(email.to_string(), (user, password.to_string()));
        self
    }

    fn issue(&mut self, email: &str) -> (String, String) {
        self.counter += 1;
        let access = format!("tok{}", self.counter);
        let refresh = format!("r{}", self.counter);
        self.access.insert(access.clone(), email.to_string());
        self.refresh.insert(refresh.clone(), email.to_string());
        (access, refresh)
    }

    fn record(&mut self, path: &str, headers: &HeaderMap) {
        let value = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.authorization.push((path.to_string(), value));
    }
}

fn grant(status: StatusCode, user: &Value, access: &str, refresh: &str) -> Response {
    (
        status,
        [(SET_COOKIE, format!("refresh_token={refresh}; Path=/auth; HttpOnly"))],
        Json(json!({"user": user, "accessToken": access})),
    )
        .into_response()
}

fn credentials(body: &Bytes) -> Option<(String, String)> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let email = value.get("email")?.as_str()?.trim().to_string();
    let password = value.get("password")?.as_str()?.to_string();
    (!email.is_empty() && !password.is_empty()).then_some((email, password))
}

fn refresh_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get(COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|pair| pair.trim().strip_prefix("refresh_token="))
        .map(str::to_string)
}

async fn register(State(state): State<Shared>, body: Bytes) -> Response {
    let Some((email, password)) = credentials(&body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let mut state = state.lock().unwrap();
    if state.users.contains_key(&email) {
        return (StatusCode::CONFLICT, Json(json!({"error": "exists"}))).into_response();
    }

    let id = format!("u{}", state.users.len() + 1);
    let user = json!({"id": id, "email": email, "createdAt": "2024-02-02T00:00:00Z"});
    state.users.insert(email.clone(), (user.clone(), password));
    let (access, refresh) = state.issue(&email);
    grant(StatusCode::CREATED, &user, &access, &refresh)
}

async fn login(State(state): State<Shared>, body: Bytes) -> Response {
    let delay = state.lock().unwrap().login_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let Some((email, password)) = credentials(&body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let mut state = state.lock().unwrap();
    if state.login_without_body {
        return StatusCode::OK.into_response();
    }

    let user = match state.users.get(&email) {
        Some((user, stored)) if *stored == password => user.clone(),
        _ => return StatusCode::UNAUTHORIZED.into_response(),
    };

    let (access, refresh) = state.issue(&email);
    grant(StatusCode::OK, &user, &access, &refresh)
}

async fn refresh(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    state.record("/auth/refresh", &headers);

    let Some(email) = refresh_cookie(&headers).and_then(|token| state.refresh.remove(&token)) else {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "no session"}))).into_response();
    };

    let user = state.users[&email].0.clone();
    let (access, refresh) = state.issue(&email);
    grant(StatusCode::OK, &user, &access, &refresh)
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    state.record("/auth/logout", &headers);

    match refresh_cookie(&headers).and_then(|token| state.refresh.remove(&token)) {
        Some(_) => (
            StatusCode::NO_CONTENT,
            [(SET_COOKIE, "refresh_token=; Max-Age=0; Path=/auth".to_string())],
        )
            .into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    state.record("/me", &headers);

    let email = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| state.access.get(token).cloned());

    match email {
        Some(email) => Json(state.users[&email].0.clone()).into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

pub async fn spawn_server(state: MockState) -> (SocketAddr, Shared) {
    let shared: Shared = Arc::new(Mutex::new(state));

    let app = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/me", get(me))
        .with_state(Arc::clone(&shared));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, shared)
}
