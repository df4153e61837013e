#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use newday::api::router;
use newday::config::AppConfig;
use newday::db;
use newday::relay::{RelayClient, RelayConfig, RelayError, RelayEvent};
use newday::state::AppState;

pub const API_KEY: &str = "test-n8n-key";

/// Captures outbound events instead of posting them.
#[derive(Default)]
pub struct RecordingRelay {
    events: Mutex<Vec<Value>>,
    fail: bool,
}

impl RecordingRelay {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<Value> {
        self.events.lock().unwrap().clone()
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|e| e["event"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

#[async_trait]
impl RelayClient for RecordingRelay {
    async fn deliver(&self, event: &RelayEvent) -> Result<(), RelayError> {
        self.events
            .lock()
            .unwrap()
            .push(serde_json::to_value(event).unwrap());
        if self.fail {
            Err(RelayError::HttpStatus(502))
        } else {
            Ok(())
        }
    }

    fn is_configured(&self) -> bool {
        true
    }
}

pub fn test_config(api_key: Option<&str>) -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        allowed_origins: vec!["http://localhost:3000".to_string()],
        relay: RelayConfig {
            webhook_url: Some("http://n8n.test/webhook".to_string()),
            api_key: api_key.map(str::to_string),
            timeout: Duration::from_secs(5),
        },
    }
}

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    pub relay: Arc<RecordingRelay>,
}

pub async fn build_test_app(api_key: Option<&str>, relay: RecordingRelay) -> TestApp {
    let pool = db::in_memory_pool().await.expect("Failed to create test db");
    let relay = Arc::new(relay);
    let state = AppState::new(pool.clone(), relay.clone(), test_config(api_key));
    TestApp {
        app: router(state),
        pool,
        relay,
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, json_request("POST", uri, body, None)).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, json_request("PUT", uri, body, None)).await
}

pub fn json_request(method: &str, uri: &str, body: Value, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
