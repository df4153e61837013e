pub mod auth;
pub mod courses;
pub mod extract;
pub mod n8n;
pub mod webinars;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::AppError;
use crate::seed::{self, PopulateReport};
use crate::state::AppState;

const DEFAULT_PAGE_LIMIT: i64 = 100;

/// `?skip=&limit=` for list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

impl Pagination {
    pub fn validate(self) -> Result<Self, AppError> {
        if self.skip < 0 || self.limit < 0 {
            return Err(AppError::BadRequest(
                "skip and limit must not be negative".to_string(),
            ));
        }
        Ok(self)
    }
}

pub fn router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/populate-database", post(populate_database))
        .nest("/api/courses", courses::router())
        .nest("/api/webinars", webinars::router())
        .nest("/api/participants", webinars::participant_router())
        .nest("/api/n8n", n8n::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Origins that fail to parse are skipped with a warning.
pub fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(auth::API_KEY_HEADER),
        ])
        .allow_credentials(true)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to NewDay Platform API" }))
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn populate_database(State(state): State<AppState>) -> Result<Json<PopulateReport>, AppError> {
    let report = seed::populate(&state.db).await?;
    Ok(Json(report))
}
