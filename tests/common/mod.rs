//! Common test helpers for integration tests.
//!
//! # Note
//!
//! `#![allow(dead_code)]` is needed because each integration test file is
//! compiled as its own crate and uses only part of these helpers.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use chrono::{Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use tower::ServiceExt;

use todo_board::api::{AppState, Templates, create_router};
use todo_board::application::{InvalidationSignal, TodoService};
use todo_board::domain::{Clock, Timestamp, TodoDraft, TodoId};
use todo_board::infrastructure::InMemoryTodoRepository;

// =============================================================================
// Clock
// =============================================================================

/// Clock that advances one minute on every read.
///
/// Records created one after another get strictly increasing timestamps.
pub struct ManualClock {
    current: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(Timestamp::from_datetime(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        ))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let mut current = self.current.lock();
        let now = *current;
        *current = Timestamp::from_datetime(*now.as_datetime() + Duration::minutes(1));
        now
    }
}

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// Creates a test `AppState` over an in-memory store.
pub fn create_test_app_state() -> AppState {
    let service = TodoService::new(
        Arc::new(InMemoryTodoRepository::new()),
        Arc::new(ManualClock::default()),
        InvalidationSignal::new(),
    )
    .with_listing_cache(16);
    AppState::new(service, Templates::new().unwrap())
}

/// Creates a router over a fresh test state.
pub fn create_test_app() -> (Router, AppState) {
    let state = create_test_app_state();
    (create_router(state.clone()), state)
}

/// Creates a todo directly through the service.
pub async fn seed(state: &AppState, title: &str, description: &str) -> TodoId {
    state
        .service
        .create(&TodoDraft::new(title, description).unwrap())
        .await
        .unwrap()
}

/// Creates `count` todos titled `Todo 1` through `Todo {count}`, oldest first.
pub async fn seed_numbered(state: &AppState, count: usize) -> Vec<TodoId> {
    let mut ids = Vec::with_capacity(count);
    for index in 1..=count {
        ids.push(seed(state, &format!("Todo {index}"), "").await);
    }
    ids
}

// =============================================================================
// Request Helpers
// =============================================================================

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn form_request(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
        .unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}
