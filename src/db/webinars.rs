use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{Executor, Sqlite};

use crate::models::{NewVisualTest, NewWebinar, NewWebinarDay, VisualTest, Webinar, WebinarDay};

const WEBINAR_COLUMNS: &str =
    "id, title, description, duration_days, start_date, end_date, created_at, updated_at";
const DAY_COLUMNS: &str = "id, webinar_id, day_number, title, content, visual_test_data, questions, created_at, updated_at";
const VISUAL_TEST_COLUMNS: &str =
    "id, day_id, image_url, options, correct_answer, created_at, updated_at";

pub async fn insert_webinar<'e, E>(db: E, req: &NewWebinar) -> Result<Webinar, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = Utc::now();
    let sql = format!(
        r#"
        INSERT INTO webinars
            (title, description, duration_days, start_date, end_date, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
        RETURNING {WEBINAR_COLUMNS}
        "#
    );

    sqlx::query_as::<_, Webinar>(&sql)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.duration_days)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(now)
        .fetch_one(db)
        .await
}

pub async fn find_webinar<'e, E>(db: E, id: i64) -> Result<Option<Webinar>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {WEBINAR_COLUMNS} FROM webinars WHERE id = ?");
    sqlx::query_as::<_, Webinar>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_webinar_by_title<'e, E>(db: E, title: &str) -> Result<Option<Webinar>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {WEBINAR_COLUMNS} FROM webinars WHERE title = ? ORDER BY id LIMIT 1");
    sqlx::query_as::<_, Webinar>(&sql)
        .bind(title)
        .fetch_optional(db)
        .await
}

pub async fn fetch_webinars<'e, E>(db: E) -> Result<Vec<Webinar>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {WEBINAR_COLUMNS} FROM webinars ORDER BY id");
    sqlx::query_as::<_, Webinar>(&sql).fetch_all(db).await
}

/// Callers check `day_number` against the webinar duration first; the
/// UNIQUE (webinar_id, day_number) index rejects duplicates.
pub async fn insert_webinar_day<'e, E>(
    db: E,
    webinar_id: i64,
    day: &NewWebinarDay,
) -> Result<WebinarDay, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = Utc::now();
    let sql = format!(
        r#"
        INSERT INTO webinar_days
            (webinar_id, day_number, title, content, visual_test_data, questions, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        RETURNING {DAY_COLUMNS}
        "#
    );

    sqlx::query_as::<_, WebinarDay>(&sql)
        .bind(webinar_id)
        .bind(day.day_number)
        .bind(&day.title)
        .bind(Json(&day.content))
        .bind(day.visual_test_data.as_ref().map(Json))
        .bind(Json(&day.questions))
        .bind(now)
        .fetch_one(db)
        .await
}

pub async fn fetch_days<'e, E>(db: E, webinar_id: i64) -> Result<Vec<WebinarDay>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {DAY_COLUMNS} FROM webinar_days WHERE webinar_id = ? ORDER BY day_number");
    sqlx::query_as::<_, WebinarDay>(&sql)
        .bind(webinar_id)
        .fetch_all(db)
        .await
}

pub async fn find_day<'e, E>(
    db: E,
    webinar_id: i64,
    day_number: i64,
) -> Result<Option<WebinarDay>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {DAY_COLUMNS} FROM webinar_days WHERE webinar_id = ? AND day_number = ?");
    sqlx::query_as::<_, WebinarDay>(&sql)
        .bind(webinar_id)
        .bind(day_number)
        .fetch_optional(db)
        .await
}

pub async fn update_day_content<'e, E>(db: E, day_id: i64, content: &Value) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE webinar_days SET content = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(Json(content))
        .bind(Utc::now())
        .bind(day_id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn insert_visual_test<'e, E>(
    db: E,
    day_id: i64,
    test: &NewVisualTest,
) -> Result<VisualTest, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = Utc::now();
    let sql = format!(
        r#"
        INSERT INTO visual_tests (day_id, image_url, options, correct_answer, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        RETURNING {VISUAL_TEST_COLUMNS}
        "#
    );

    sqlx::query_as::<_, VisualTest>(&sql)
        .bind(day_id)
        .bind(&test.image_url)
        .bind(Json(&test.options))
        .bind(&test.correct_answer)
        .bind(now)
        .fetch_one(db)
        .await
}

pub async fn fetch_visual_tests<'e, E>(db: E, day_id: i64) -> Result<Vec<VisualTest>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {VISUAL_TEST_COLUMNS} FROM visual_tests WHERE day_id = ? ORDER BY id");
    sqlx::query_as::<_, VisualTest>(&sql)
        .bind(day_id)
        .fetch_all(db)
        .await
}
