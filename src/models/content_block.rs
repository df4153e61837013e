use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use sqlx::types::Json;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentBlock {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub content_type: String,
    pub content_data: Json<Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of both create and full-replacement update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlockRequest {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub content_type: String,
    pub content_data: Value,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

pub(crate) fn default_active() -> bool {
    true
}
