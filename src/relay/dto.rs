use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{CompletionStatus, Participant, Response, Webinar};

/// Outbound events, tagged by the `event` field n8n workflows switch on.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RelayEvent {
    ParticipantProgress(ProgressEvent),
    WebinarCompletion(CompletionEvent),
    EnrollmentConfirmation(EnrollmentConfirmation),
}

impl RelayEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RelayEvent::ParticipantProgress(_) => "participant_progress",
            RelayEvent::WebinarCompletion(_) => "webinar_completion",
            RelayEvent::EnrollmentConfirmation(_) => "enrollment_confirmation",
        }
    }

    pub fn event_id(&self) -> Uuid {
        match self {
            RelayEvent::ParticipantProgress(e) => e.event_id,
            RelayEvent::WebinarCompletion(e) => e.event_id,
            RelayEvent::EnrollmentConfirmation(e) => e.event_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantSnapshot {
    pub id: i64,
    pub user_id: i64,
    pub webinar_id: i64,
    pub webinar_title: String,
    pub enrollment_date: DateTime<Utc>,
    pub completion_status: CompletionStatus,
    pub current_day: i64,
    pub total_days: i64,
}

impl ParticipantSnapshot {
    pub fn new(participant: &Participant, webinar: &Webinar) -> Self {
        Self {
            id: participant.id,
            user_id: participant.user_id,
            webinar_id: participant.webinar_id,
            webinar_title: webinar.title.clone(),
            enrollment_date: participant.enrollment_date,
            completion_status: participant.completion_status,
            current_day: participant.current_day,
            total_days: webinar.duration_days,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseSnapshot {
    pub id: i64,
    pub day_id: i64,
    pub question_id: Option<i64>,
    pub response_text: String,
    pub response_timestamp: DateTime<Utc>,
}

impl From<&Response> for ResponseSnapshot {
    fn from(resp: &Response) -> Self {
        Self {
            id: resp.id,
            day_id: resp.day_id,
            question_id: resp.question_id,
            response_text: resp.response_text.clone(),
            response_timestamp: resp.response_timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub participant: ParticipantSnapshot,
    pub responses: Vec<ResponseSnapshot>,
    pub progress_percentage: f64,
}

impl ProgressEvent {
    pub fn new(participant: &Participant, webinar: &Webinar, responses: &[Response]) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            participant: ParticipantSnapshot::new(participant, webinar),
            responses: responses.iter().map(ResponseSnapshot::from).collect(),
            progress_percentage: progress_percentage(
                participant.current_day,
                webinar.duration_days,
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionSnapshot {
    pub id: i64,
    pub user_id: i64,
    pub webinar_id: i64,
    pub webinar_title: String,
    pub enrollment_date: DateTime<Utc>,
    pub completion_date: DateTime<Utc>,
    pub total_days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionEvent {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub participant: CompletionSnapshot,
}

impl CompletionEvent {
    pub fn new(participant: &Participant, webinar: &Webinar) -> Self {
        let now = Utc::now();
        Self {
            event_id: Uuid::new_v4(),
            timestamp: now,
            participant: CompletionSnapshot {
                id: participant.id,
                user_id: participant.user_id,
                webinar_id: participant.webinar_id,
                webinar_title: webinar.title.clone(),
                enrollment_date: participant.enrollment_date,
                completion_date: now,
                total_days: webinar.duration_days,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentConfirmation {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub participant_id: i64,
    pub user_id: i64,
    pub webinar_id: i64,
}

impl EnrollmentConfirmation {
    pub fn new(participant: &Participant) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            participant_id: participant.id,
            user_id: participant.user_id,
            webinar_id: participant.webinar_id,
        }
    }
}

/// `current_day / total_days * 100`, or 0 for a zero-length webinar.
pub fn progress_percentage(current_day: i64, total_days: i64) -> f64 {
    if total_days <= 0 {
        return 0.0;
    }
    current_day as f64 / total_days as f64 * 100.0
}

/// Inbound webhook body: `{"event": "...", "data": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentData {
    pub user_id: i64,
    pub webinar_id: i64,
    #[serde(default)]
    pub enrollment_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentUpdateData {
    pub webinar_id: i64,
    pub day_number: i64,
    pub content: Value,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProgressUpdateData {
    pub participant_id: i64,
    pub day_completed: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reminder {
    pub participant_id: i64,
    pub user_id: i64,
    pub webinar_id: i64,
    pub webinar_title: String,
    pub current_day: i64,
    pub completion_status: CompletionStatus,
}
