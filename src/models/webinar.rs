use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use sqlx::types::Json;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Webinar {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration_days: i64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One lesson of a webinar. `content` holds the morning/evening sections,
/// `questions` the reflection prompts shown to participants.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WebinarDay {
    pub id: i64,
    pub webinar_id: i64,
    pub day_number: i64,
    pub title: String,
    pub content: Json<Value>,
    pub visual_test_data: Option<Json<Value>>,
    pub questions: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VisualTest {
    pub id: i64,
    pub day_id: i64,
    pub image_url: Option<String>,
    pub options: Json<Vec<String>>,
    pub correct_answer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWebinar {
    pub title: String,
    pub description: Option<String>,
    pub duration_days: i64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWebinarDay {
    pub day_number: i64,
    pub title: String,
    pub content: Value,
    pub questions: Vec<String>,
    pub visual_test_data: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVisualTest {
    pub image_url: Option<String>,
    pub options: Vec<String>,
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebinarDetail {
    #[serde(flatten)]
    pub webinar: Webinar,
    pub days: Vec<WebinarDay>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebinarDayDetail {
    #[serde(flatten)]
    pub day: WebinarDay,
    pub visual_tests: Vec<VisualTest>,
}
