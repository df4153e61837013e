use axum::extract::State;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;

use crate::api::Pagination;
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::db::{content_blocks, courses};
use crate::error::AppError;
use crate::models::{
    ContentBlock, ContentBlockRequest, Course, CourseBlock, CourseRequest, CourseSchedule,
    NewCourseBlockRequest, UpdateCourseBlockRequest,
};
use crate::services::schedule::{self, ScheduleBuildResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ScheduleQuery {
    day: Option<i64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blocks", get(list_blocks).post(create_block))
        .route("/blocks/{id}", get(get_block).put(update_block))
        .route("/", get(list_courses).post(create_course))
        .route("/{id}", get(get_course).put(update_course))
        .route("/{id}/blocks", get(list_course_blocks))
        .route("/{id}/schedule", get(get_schedule))
        .route("/course-blocks", post(create_course_block))
        .route("/course-blocks/{id}", put(update_course_block))
        .route("/build-course/{id}", post(build_course))
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn validate_block(req: &ContentBlockRequest) -> Result<(), AppError> {
    require_text("name", &req.name)?;
    require_text("category", &req.category)?;
    require_text("content_type", &req.content_type)
}

fn validate_course(req: &CourseRequest) -> Result<(), AppError> {
    require_text("title", &req.title)?;
    if req.duration_days < 1 {
        return Err(AppError::BadRequest(
            "duration_days must be at least 1".to_string(),
        ));
    }
    Ok(())
}

async fn require_course(state: &AppState, id: i64) -> Result<Course, AppError> {
    courses::find_course(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))
}

async fn create_block(
    State(state): State<AppState>,
    AppJson(req): AppJson<ContentBlockRequest>,
) -> Result<Json<ContentBlock>, AppError> {
    validate_block(&req)?;
    let block = content_blocks::insert_content_block(&state.db, &req).await?;
    Ok(Json(block))
}

async fn list_blocks(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<Pagination>,
) -> Result<Json<Vec<ContentBlock>>, AppError> {
    let page = page.validate()?;
    let blocks = content_blocks::fetch_content_blocks(&state.db, page.skip, page.limit).await?;
    Ok(Json(blocks))
}

async fn get_block(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ContentBlock>, AppError> {
    let block = content_blocks::find_content_block(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Content block not found".to_string()))?;
    Ok(Json(block))
}

async fn update_block(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<ContentBlockRequest>,
) -> Result<Json<ContentBlock>, AppError> {
    validate_block(&req)?;
    let block = content_blocks::update_content_block(&state.db, id, &req)
        .await?
        .ok_or_else(|| AppError::NotFound("Content block not found".to_string()))?;
    Ok(Json(block))
}

async fn create_course(
    State(state): State<AppState>,
    AppJson(req): AppJson<CourseRequest>,
) -> Result<Json<Course>, AppError> {
    validate_course(&req)?;
    let course = courses::insert_course(&state.db, &req).await?;
    Ok(Json(course))
}

async fn list_courses(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<Pagination>,
) -> Result<Json<Vec<Course>>, AppError> {
    let page = page.validate()?;
    let found = courses::fetch_courses(&state.db, page.skip, page.limit).await?;
    Ok(Json(found))
}

async fn get_course(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Course>, AppError> {
    Ok(Json(require_course(&state, id).await?))
}

async fn update_course(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<CourseRequest>,
) -> Result<Json<Course>, AppError> {
    validate_course(&req)?;
    let course = courses::update_course(&state.db, id, &req)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
    Ok(Json(course))
}

async fn create_course_block(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewCourseBlockRequest>,
) -> Result<Json<CourseBlock>, AppError> {
    require_course(&state, req.course_id).await?;
    if content_blocks::find_content_block(&state.db, req.content_block_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Content block not found".to_string()));
    }
    if req.order_in_day < 1 {
        return Err(AppError::BadRequest("order_in_day must be at least 1".to_string()));
    }

    let assignment = courses::insert_course_block(&state.db, &req).await?;
    Ok(Json(assignment))
}

async fn list_course_blocks(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Vec<CourseBlock>>, AppError> {
    require_course(&state, id).await?;
    let assignments = courses::fetch_course_blocks(&state.db, id).await?;
    Ok(Json(assignments))
}

/// Partial update: only the fields present in the body change.
async fn update_course_block(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateCourseBlockRequest>,
) -> Result<Json<CourseBlock>, AppError> {
    let mut assignment = courses::find_course_block(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course block not found".to_string()))?;

    if let Some(frequency) = req.frequency {
        assignment.frequency = frequency;
    }
    if let Some(time_of_day) = req.time_of_day {
        assignment.time_of_day = time_of_day;
    }
    if req.day_of_week.is_some() {
        assignment.day_of_week = req.day_of_week;
    }
    if let Some(order_in_day) = req.order_in_day {
        if order_in_day < 1 {
            return Err(AppError::BadRequest("order_in_day must be at least 1".to_string()));
        }
        assignment.order_in_day = order_in_day;
    }
    assignment.updated_at = Utc::now();

    if !courses::update_course_block(&state.db, &assignment).await? {
        return Err(AppError::NotFound("Course block not found".to_string()));
    }
    Ok(Json(assignment))
}

async fn build_course(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ScheduleBuildResult>, AppError> {
    let result = schedule::rebuild_schedule(&state.db, id).await?;
    Ok(Json(result))
}

async fn get_schedule(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppQuery(query): AppQuery<ScheduleQuery>,
) -> Result<Json<Vec<CourseSchedule>>, AppError> {
    require_course(&state, id).await?;
    let entries = courses::fetch_schedule(&state.db, id, query.day).await?;
    Ok(Json(entries))
}
