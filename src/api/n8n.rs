use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};

use crate::api::auth::RelayAuth;
use crate::api::extract::{AppJson, AppPath};
use crate::error::AppError;
use crate::relay::dto::{
    ContentUpdateData, EnrollmentData, ProgressUpdateData, Reminder, WebhookEnvelope,
};
use crate::services::AdvanceOutcome;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Ack {
    pub status: &'static str,
    pub message: String,
}

impl Ack {
    fn success(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: "success",
            message: message.into(),
        })
    }

    fn failed(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: "failed",
            message: message.into(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ReminderList {
    pub status: &'static str,
    pub count: usize,
    pub reminders: Vec<Reminder>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhook", post(receive_webhook))
        .route("/enroll", post(enroll))
        .route("/update-content", post(update_content))
        .route("/update-progress", post(update_progress))
        .route("/reminders", get(reminders))
        .route("/send-progress/{participant_id}", post(send_progress))
        .route("/send-completion/{participant_id}", post(send_completion))
        .route("/health", get(health))
}

async fn receive_webhook(
    State(state): State<AppState>,
    _auth: RelayAuth,
    AppJson(envelope): AppJson<WebhookEnvelope>,
) -> Result<Json<Ack>, AppError> {
    let message = state.relay_service().handle_webhook(envelope).await?;
    Ok(Ack::success(message))
}

async fn enroll(
    State(state): State<AppState>,
    _auth: RelayAuth,
    AppJson(data): AppJson<EnrollmentData>,
) -> Result<Json<Ack>, AppError> {
    state.relay_service().enroll(&data).await?;
    Ok(Ack::success("Participant enrolled"))
}

async fn update_content(
    State(state): State<AppState>,
    _auth: RelayAuth,
    AppJson(data): AppJson<ContentUpdateData>,
) -> Result<Json<Ack>, AppError> {
    state.relay_service().update_content(&data).await?;
    Ok(Ack::success("Content updated"))
}

async fn update_progress(
    State(state): State<AppState>,
    _auth: RelayAuth,
    AppJson(data): AppJson<ProgressUpdateData>,
) -> Result<Json<Ack>, AppError> {
    match state.relay_service().update_progress(data).await? {
        AdvanceOutcome::Advanced { .. } => Ok(Ack::success("Progress updated")),
        AdvanceOutcome::NotAdvanced => Err(AppError::BadRequest(
            "Failed to update progress".to_string(),
        )),
    }
}

async fn reminders(
    State(state): State<AppState>,
    _auth: RelayAuth,
) -> Result<Json<ReminderList>, AppError> {
    let reminders = state.relay_service().reminders(Utc::now()).await?;
    Ok(Json(ReminderList {
        status: "success",
        count: reminders.len(),
        reminders,
    }))
}

async fn send_progress(
    State(state): State<AppState>,
    _auth: RelayAuth,
    AppPath(participant_id): AppPath<i64>,
) -> Result<Json<Ack>, AppError> {
    if state.relay_service().send_progress(participant_id).await? {
        Ok(Ack::success("Progress data sent to n8n"))
    } else {
        Ok(Ack::failed("Failed to send progress data"))
    }
}

async fn send_completion(
    State(state): State<AppState>,
    _auth: RelayAuth,
    AppPath(participant_id): AppPath<i64>,
) -> Result<Json<Ack>, AppError> {
    if state.relay_service().send_completion(participant_id).await? {
        Ok(Ack::success("Completion event sent to n8n"))
    } else {
        Ok(Ack::failed("Failed to send completion event"))
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "n8n-integration",
        "timestamp": Utc::now().to_rfc3339(),
        "n8n_webhook_configured": state.relay.is_configured(),
        "n8n_api_key_configured": state.config.relay.api_key.is_some(),
    }))
}
