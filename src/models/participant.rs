use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Enrollment state. Only moves forward: enrolled → in_progress → completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CompletionStatus {
    Enrolled,
    InProgress,
    Completed,
}

impl CompletionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionStatus::Enrolled => "enrolled",
            CompletionStatus::InProgress => "in_progress",
            CompletionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub id: i64,
    pub user_id: i64,
    pub webinar_id: i64,
    pub enrollment_date: DateTime<Utc>,
    pub completion_status: CompletionStatus,
    pub current_day: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A participant's answer to one question of one day. Never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Response {
    pub id: i64,
    pub participant_id: i64,
    pub day_id: i64,
    pub question_id: Option<i64>,
    pub response_text: String,
    pub response_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResponseRequest {
    pub day_number: i64,
    pub question_id: Option<i64>,
    pub response_text: String,
}
