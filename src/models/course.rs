use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::content_block::default_active;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration_days: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRequest {
    pub title: String,
    pub description: Option<String>,
    pub duration_days: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Assignment of a content block to a course.
///
/// `frequency` is kept as free text: values other than the ones understood by
/// [`Frequency::parse`] are stored but never scheduled.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseBlock {
    pub id: i64,
    pub course_id: i64,
    pub content_block_id: i64,
    pub frequency: String,
    pub time_of_day: String,
    pub day_of_week: Option<String>,
    pub order_in_day: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseBlockRequest {
    pub course_id: i64,
    pub content_block_id: i64,
    #[serde(default = "default_frequency")]
    pub frequency: String,
    #[serde(default = "default_time_of_day")]
    pub time_of_day: String,
    pub day_of_week: Option<String>,
    #[serde(default = "default_order_in_day")]
    pub order_in_day: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseBlockRequest {
    pub frequency: Option<String>,
    pub time_of_day: Option<String>,
    pub day_of_week: Option<String>,
    pub order_in_day: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CourseSchedule {
    pub id: i64,
    pub course_id: i64,
    pub day_number: i64,
    pub content_block_id: i64,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub is_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    EveryOtherDay,
    Weekly,
}

impl Frequency {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(Frequency::Daily),
            "every_other_day" => Some(Frequency::EveryOtherDay),
            "weekly" => Some(Frequency::Weekly),
            _ => None,
        }
    }

    /// Whether a block with this frequency lands on `day` (1-based).
    ///
    /// Parity and week position are absolute to the course, not to the
    /// assignment's `day_of_week`.
    pub fn includes(self, day: i64) -> bool {
        match self {
            Frequency::Daily => true,
            Frequency::EveryOtherDay => day % 2 == 1,
            Frequency::Weekly => day % 7 == 1,
        }
    }
}

fn default_frequency() -> String {
    "daily".to_string()
}

fn default_time_of_day() -> String {
    "morning".to_string()
}

fn default_order_in_day() -> i64 {
    1
}
