use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::{participants, webinars};
use crate::error::AppError;
use crate::models::{Participant, Webinar};
use crate::relay::RelayClient;
use crate::relay::dto::{
    CompletionEvent, ContentUpdateData, EnrollmentConfirmation, EnrollmentData, ProgressEvent,
    ProgressUpdateData, RelayEvent, Reminder, WebhookEnvelope,
};
use crate::services::progress::{self, AdvanceOutcome};

const REMINDER_AFTER_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub enum Enrollment {
    Created(Participant),
    Existing(Participant),
}

impl Enrollment {
    pub fn participant(&self) -> &Participant {
        match self {
            Enrollment::Created(p) | Enrollment::Existing(p) => p,
        }
    }
}

/// Bridges n8n and local state: builds outbound events and applies inbound ones.
pub struct RelayService {
    db: SqlitePool,
    relay: Arc<dyn RelayClient>,
}

impl RelayService {
    pub fn new(db: SqlitePool, relay: Arc<dyn RelayClient>) -> Self {
        Self { db, relay }
    }

    /// Delivery is best-effort: failures are logged and reported as `false`.
    async fn dispatch(&self, event: RelayEvent) -> bool {
        match self.relay.deliver(&event).await {
            Ok(()) => true,
            Err(e) => {
                warn!("failed to deliver {} event {}: {}", event.name(), event.event_id(), e);
                false
            }
        }
    }

    async fn load(&self, participant_id: i64) -> Result<(Participant, Webinar), AppError> {
        let participant = participants::find_participant(&self.db, participant_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Participant with ID {} not found", participant_id))
            })?;
        let webinar = webinars::find_webinar(&self.db, participant.webinar_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Webinar with ID {} not found", participant.webinar_id))
            })?;
        Ok((participant, webinar))
    }

    pub async fn send_progress(&self, participant_id: i64) -> Result<bool, AppError> {
        let (participant, webinar) = self.load(participant_id).await?;
        let responses = participants::fetch_responses(&self.db, participant.id).await?;
        let event = ProgressEvent::new(&participant, &webinar, &responses);
        Ok(self.dispatch(RelayEvent::ParticipantProgress(event)).await)
    }

    pub async fn send_completion(&self, participant_id: i64) -> Result<bool, AppError> {
        let (participant, webinar) = self.load(participant_id).await?;
        let event = CompletionEvent::new(&participant, &webinar);
        Ok(self.dispatch(RelayEvent::WebinarCompletion(event)).await)
    }

    pub async fn enroll(&self, data: &EnrollmentData) -> Result<Enrollment, AppError> {
        let enrollment_date = parse_enrollment_date(data.enrollment_date.as_deref(), Utc::now())?;

        if webinars::find_webinar(&self.db, data.webinar_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Webinar with ID {} not found",
                data.webinar_id
            )));
        }

        let created = participants::insert_participant_if_absent(
            &self.db,
            data.user_id,
            data.webinar_id,
            enrollment_date,
        )
        .await?;

        let Some(participant) = created else {
            let existing = participants::find_enrollment(&self.db, data.user_id, data.webinar_id)
                .await?
                .ok_or(AppError::InternalServerError)?;
            info!(
                "user {} already enrolled in webinar {}",
                data.user_id, data.webinar_id
            );
            return Ok(Enrollment::Existing(existing));
        };

        info!(
            "enrolled user {} in webinar {} as participant {}",
            participant.user_id, participant.webinar_id, participant.id
        );
        let confirmation = EnrollmentConfirmation::new(&participant);
        self.dispatch(RelayEvent::EnrollmentConfirmation(confirmation))
            .await;

        Ok(Enrollment::Created(participant))
    }

    pub async fn update_content(&self, data: &ContentUpdateData) -> Result<(), AppError> {
        if !data.content.as_object().is_some_and(|fields| !fields.is_empty()) {
            return Err(AppError::BadRequest(
                "content must be a non-empty JSON object".to_string(),
            ));
        }

        let day = webinars::find_day(&self.db, data.webinar_id, data.day_number)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Day {} of webinar {} not found",
                    data.day_number, data.webinar_id
                ))
            })?;

        webinars::update_day_content(&self.db, day.id, &data.content).await?;
        info!(
            "updated content for webinar {} day {}",
            data.webinar_id, data.day_number
        );
        Ok(())
    }

    /// Advances the participant, then notifies n8n. Notification failures never
    /// undo the committed progress.
    pub async fn update_progress(&self, data: ProgressUpdateData) -> Result<AdvanceOutcome, AppError> {
        let outcome = progress::advance(&self.db, data.participant_id, data.day_completed).await?;

        if let AdvanceOutcome::Advanced {
            participant,
            webinar,
            completed,
        } = &outcome
        {
            if *completed {
                let event = CompletionEvent::new(participant, webinar);
                self.dispatch(RelayEvent::WebinarCompletion(event)).await;
            }

            match participants::fetch_responses(&self.db, participant.id).await {
                Ok(responses) => {
                    let event = ProgressEvent::new(participant, webinar, &responses);
                    self.dispatch(RelayEvent::ParticipantProgress(event)).await;
                }
                Err(e) => warn!(
                    "skipping progress event for participant {}: {}",
                    participant.id, e
                ),
            }
        }

        Ok(outcome)
    }

    pub async fn reminders(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>, AppError> {
        let mut reminders = Vec::new();

        for participant in participants::fetch_unfinished_participants(&self.db).await? {
            let Some(webinar) = webinars::find_webinar(&self.db, participant.webinar_id).await? else {
                continue;
            };
            let last_response = participants::find_latest_response(&self.db, participant.id)
                .await?
                .map(|r| r.response_timestamp);

            if needs_reminder(now, participant.enrollment_date, last_response) {
                reminders.push(Reminder {
                    participant_id: participant.id,
                    user_id: participant.user_id,
                    webinar_id: participant.webinar_id,
                    webinar_title: webinar.title,
                    current_day: participant.current_day,
                    completion_status: participant.completion_status,
                });
            }
        }

        Ok(reminders)
    }

    /// Routes a generic `{event, data}` webhook. Returns the acknowledgment message.
    pub async fn handle_webhook(&self, envelope: WebhookEnvelope) -> Result<&'static str, AppError> {
        match envelope.event.as_str() {
            "enrollment_data" => {
                let data: EnrollmentData = parse_data(&envelope)?;
                self.enroll(&data).await?;
                Ok("Enrollment processed")
            }
            "content_update" => {
                let data: ContentUpdateData = parse_data(&envelope)?;
                self.update_content(&data).await?;
                Ok("Content update processed")
            }
            "progress_update" => {
                let data: ProgressUpdateData = parse_data(&envelope)?;
                match self.update_progress(data).await? {
                    AdvanceOutcome::Advanced { .. } => Ok("Progress update processed"),
                    AdvanceOutcome::NotAdvanced => Err(AppError::BadRequest(
                        "Failed to process progress update".to_string(),
                    )),
                }
            }
            other => Err(AppError::BadRequest(format!("Unknown event type: {}", other))),
        }
    }
}

fn parse_data<T: serde::de::DeserializeOwned>(envelope: &WebhookEnvelope) -> Result<T, AppError> {
    serde_json::from_value(envelope.data.clone()).map_err(|e| {
        AppError::BadRequest(format!("Invalid {} payload: {}", envelope.event, e))
    })
}

/// Accepts RFC 3339, a naive ISO-8601 timestamp (taken as UTC) or a bare date.
/// A missing value means "now".
pub fn parse_enrollment_date(
    raw: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(now);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(AppError::BadRequest(format!("Invalid enrollment_date: {}", raw)))
}

/// Silent for a day: no answer since enrollment, or the latest answer is old.
pub fn needs_reminder(
    now: DateTime<Utc>,
    enrollment_date: DateTime<Utc>,
    last_response: Option<DateTime<Utc>>,
) -> bool {
    let since = last_response.unwrap_or(enrollment_date);
    now - since >= TimeDelta::hours(REMINDER_AFTER_HOURS)
}
