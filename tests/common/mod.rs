#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use preserve_explorer::{
    api::create_app_router,
    app_state::AppState,
    config::{Config, ADMIN_TOKEN, CACHE_TTL_SECS, DATABASE_URL},
    infrastructure::{AdministratorsOnly, MemoryStorage},
};

pub const TOKEN: &str = "test-admin-token-0001";

pub fn app() -> Router {
    let config = Config::from_lookup(|key| match key {
        ADMIN_TOKEN => Some(TOKEN.to_string()),
        CACHE_TTL_SECS => Some("300".to_string()),
        DATABASE_URL => Some("sqlite::memory:".to_string()),
        _ => None,
    })
    .expect("test configuration is valid");

    let state = AppState::with_storage(
        config,
        Arc::new(MemoryStorage::new()),
        Arc::new(AdministratorsOnly),
    );
    create_app_router(state)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn admin(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", TOKEN));
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send(app, request).await
}

/// Create a preserve through the admin API and return its id
pub async fn create(app: &Router, draft: Value) -> i64 {
    let (status, body) = admin(app, "POST", "/admin/preserves", Some(draft)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body["id"].as_i64().unwrap()
}
