use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite};

use crate::models::{CompletionStatus, Participant, Response};

const PARTICIPANT_COLUMNS: &str = "id, user_id, webinar_id, enrollment_date, completion_status, current_day, created_at, updated_at";
const RESPONSE_COLUMNS: &str =
    "id, participant_id, day_id, question_id, response_text, response_timestamp";

pub async fn find_participant<'e, E>(db: E, id: i64) -> Result<Option<Participant>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = ?");
    sqlx::query_as::<_, Participant>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_enrollment<'e, E>(
    db: E,
    user_id: i64,
    webinar_id: i64,
) -> Result<Option<Participant>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE user_id = ? AND webinar_id = ?");
    sqlx::query_as::<_, Participant>(&sql)
        .bind(user_id)
        .bind(webinar_id)
        .fetch_optional(db)
        .await
}

/// Creates the enrollment unless the (user, webinar) pair already exists.
/// Returns `None` when the row was already there.
pub async fn insert_participant_if_absent<'e, E>(
    db: E,
    user_id: i64,
    webinar_id: i64,
    enrollment_date: DateTime<Utc>,
) -> Result<Option<Participant>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = Utc::now();
    let sql = format!(
        r#"
        INSERT INTO participants
            (user_id, webinar_id, enrollment_date, completion_status, current_day, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
        ON CONFLICT (user_id, webinar_id) DO NOTHING
        RETURNING {PARTICIPANT_COLUMNS}
        "#
    );

    sqlx::query_as::<_, Participant>(&sql)
        .bind(user_id)
        .bind(webinar_id)
        .bind(enrollment_date)
        .bind(CompletionStatus::Enrolled)
        .bind(now)
        .fetch_optional(db)
        .await
}

pub async fn update_progress<'e, E>(
    db: E,
    id: i64,
    current_day: i64,
    status: CompletionStatus,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE participants
        SET current_day = ?1,
            completion_status = ?2,
            updated_at = ?3
        WHERE id = ?4
        "#,
    )
    .bind(current_day)
    .bind(status)
    .bind(Utc::now())
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn fetch_unfinished_participants<'e, E>(db: E) -> Result<Vec<Participant>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE completion_status != 'completed' ORDER BY id"
    );
    sqlx::query_as::<_, Participant>(&sql).fetch_all(db).await
}

pub async fn insert_response<'e, E>(
    db: E,
    participant_id: i64,
    day_id: i64,
    question_id: Option<i64>,
    response_text: &str,
) -> Result<Response, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        INSERT INTO responses (participant_id, day_id, question_id, response_text, response_timestamp)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING {RESPONSE_COLUMNS}
        "#
    );

    sqlx::query_as::<_, Response>(&sql)
        .bind(participant_id)
        .bind(day_id)
        .bind(question_id)
        .bind(response_text)
        .bind(Utc::now())
        .fetch_one(db)
        .await
}

pub async fn fetch_responses<'e, E>(db: E, participant_id: i64) -> Result<Vec<Response>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {RESPONSE_COLUMNS} FROM responses WHERE participant_id = ? ORDER BY response_timestamp, id"
    );
    sqlx::query_as::<_, Response>(&sql)
        .bind(participant_id)
        .fetch_all(db)
        .await
}

pub async fn find_latest_response<'e, E>(
    db: E,
    participant_id: i64,
) -> Result<Option<Response>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {RESPONSE_COLUMNS} FROM responses WHERE participant_id = ? ORDER BY response_timestamp DESC, id DESC LIMIT 1"
    );
    sqlx::query_as::<_, Response>(&sql)
        .bind(participant_id)
        .fetch_optional(db)
        .await
}
