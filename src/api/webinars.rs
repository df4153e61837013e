use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::extract::{AppJson, AppPath};
use crate::db::{participants, webinars};
use crate::error::AppError;
use crate::models::{
    NewResponseRequest, Participant, Response, Webinar, WebinarDayDetail, WebinarDetail,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_webinars))
        .route("/{id}", get(get_webinar))
        .route("/{id}/days/{day_number}", get(get_day))
}

pub fn participant_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(get_participant))
        .route("/{id}/responses", post(record_response).get(list_responses))
}

async fn list_webinars(State(state): State<AppState>) -> Result<Json<Vec<Webinar>>, AppError> {
    let found = webinars::fetch_webinars(&state.db).await?;
    Ok(Json(found))
}

async fn get_webinar(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<WebinarDetail>, AppError> {
    let webinar = webinars::find_webinar(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Webinar not found".to_string()))?;
    let days = webinars::fetch_days(&state.db, id).await?;
    Ok(Json(WebinarDetail { webinar, days }))
}

async fn get_day(
    State(state): State<AppState>,
    AppPath((id, day_number)): AppPath<(i64, i64)>,
) -> Result<Json<WebinarDayDetail>, AppError> {
    let day = webinars::find_day(&state.db, id, day_number)
        .await?
        .ok_or_else(|| AppError::NotFound("Webinar day not found".to_string()))?;
    let visual_tests = webinars::fetch_visual_tests(&state.db, day.id).await?;
    Ok(Json(WebinarDayDetail { day, visual_tests }))
}

async fn require_participant(state: &AppState, id: i64) -> Result<Participant, AppError> {
    participants::find_participant(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))
}

async fn get_participant(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Participant>, AppError> {
    Ok(Json(require_participant(&state, id).await?))
}

/// Answers attach to a day of the participant's own webinar.
async fn record_response(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<NewResponseRequest>,
) -> Result<Json<Response>, AppError> {
    if req.response_text.trim().is_empty() {
        return Err(AppError::BadRequest("response_text must not be empty".to_string()));
    }

    let participant = require_participant(&state, id).await?;
    let day = webinars::find_day(&state.db, participant.webinar_id, req.day_number)
        .await?
        .ok_or_else(|| AppError::NotFound("Webinar day not found".to_string()))?;

    let response = participants::insert_response(
        &state.db,
        participant.id,
        day.id,
        req.question_id,
        &req.response_text,
    )
    .await?;
    Ok(Json(response))
}

async fn list_responses(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Vec<Response>>, AppError> {
    require_participant(&state, id).await?;
    let found = participants::fetch_responses(&state.db, id).await?;
    Ok(Json(found))
}
