use chrono::Utc;
use sqlx::{Executor, Sqlite};

use crate::models::{Course, CourseBlock, CourseRequest, CourseSchedule, NewCourseBlockRequest};

const COURSE_COLUMNS: &str =
    "id, title, description, duration_days, is_active, created_at, updated_at";
const COURSE_BLOCK_COLUMNS: &str = "id, course_id, content_block_id, frequency, time_of_day, day_of_week, order_in_day, created_at, updated_at";
const SCHEDULE_COLUMNS: &str =
    "id, course_id, day_number, content_block_id, scheduled_at, is_sent, created_at, updated_at";

pub async fn insert_course<'e, E>(db: E, req: &CourseRequest) -> Result<Course, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = Utc::now();
    let sql = format!(
        r#"
        INSERT INTO courses (title, description, duration_days, is_active, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        RETURNING {COURSE_COLUMNS}
        "#
    );

    sqlx::query_as::<_, Course>(&sql)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.duration_days)
        .bind(req.is_active)
        .bind(now)
        .fetch_one(db)
        .await
}

pub async fn fetch_courses<'e, E>(db: E, skip: i64, limit: i64) -> Result<Vec<Course>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY id LIMIT ? OFFSET ?");
    sqlx::query_as::<_, Course>(&sql)
        .bind(limit)
        .bind(skip)
        .fetch_all(db)
        .await
}

pub async fn find_course<'e, E>(db: E, id: i64) -> Result<Option<Course>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?");
    sqlx::query_as::<_, Course>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn update_course<'e, E>(
    db: E,
    id: i64,
    req: &CourseRequest,
) -> Result<Option<Course>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        UPDATE courses
        SET title = ?1,
            description = ?2,
            duration_days = ?3,
            is_active = ?4,
            updated_at = ?5
        WHERE id = ?6
        RETURNING {COURSE_COLUMNS}
        "#
    );

    sqlx::query_as::<_, Course>(&sql)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.duration_days)
        .bind(req.is_active)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_course_block<'e, E>(
    db: E,
    req: &NewCourseBlockRequest,
) -> Result<CourseBlock, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = Utc::now();
    let sql = format!(
        r#"
        INSERT INTO course_blocks
            (course_id, content_block_id, frequency, time_of_day, day_of_week, order_in_day,
            created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        RETURNING {COURSE_BLOCK_COLUMNS}
        "#
    );

    sqlx::query_as::<_, CourseBlock>(&sql)
        .bind(req.course_id)
        .bind(req.content_block_id)
        .bind(&req.frequency)
        .bind(&req.time_of_day)
        .bind(&req.day_of_week)
        .bind(req.order_in_day)
        .bind(now)
        .fetch_one(db)
        .await
}

pub async fn find_course_block<'e, E>(db: E, id: i64) -> Result<Option<CourseBlock>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COURSE_BLOCK_COLUMNS} FROM course_blocks WHERE id = ?");
    sqlx::query_as::<_, CourseBlock>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Assignments of a course in the order they appear within a day.
pub async fn fetch_course_blocks<'e, E>(db: E, course_id: i64) -> Result<Vec<CourseBlock>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {COURSE_BLOCK_COLUMNS} FROM course_blocks WHERE course_id = ? ORDER BY order_in_day, id"
    );
    sqlx::query_as::<_, CourseBlock>(&sql)
        .bind(course_id)
        .fetch_all(db)
        .await
}

pub async fn update_course_block<'e, E>(db: E, block: &CourseBlock) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE course_blocks
        SET frequency = ?1,
            time_of_day = ?2,
            day_of_week = ?3,
            order_in_day = ?4,
            updated_at = ?5
        WHERE id = ?6
        "#,
    )
    .bind(&block.frequency)
    .bind(&block.time_of_day)
    .bind(&block.day_of_week)
    .bind(block.order_in_day)
    .bind(block.updated_at)
    .bind(block.id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn delete_schedule<'e, E>(db: E, course_id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM course_schedules WHERE course_id = ?")
        .bind(course_id)
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}

pub async fn insert_schedule_entry<'e, E>(
    db: E,
    course_id: i64,
    day_number: i64,
    content_block_id: i64,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO course_schedules
            (course_id, day_number, content_block_id, scheduled_at, is_sent, created_at, updated_at)
        VALUES (?1, ?2, ?3, NULL, 0, ?4, ?4)
        "#,
    )
    .bind(course_id)
    .bind(day_number)
    .bind(content_block_id)
    .bind(now)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn fetch_schedule<'e, E>(
    db: E,
    course_id: i64,
    day_number: Option<i64>,
) -> Result<Vec<CourseSchedule>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        SELECT {SCHEDULE_COLUMNS}
        FROM course_schedules
        WHERE course_id = ?1 AND (?2 IS NULL OR day_number = ?2)
        ORDER BY day_number, id
        "#
    );
    sqlx::query_as::<_, CourseSchedule>(&sql)
        .bind(course_id)
        .bind(day_number)
        .fetch_all(db)
        .await
}
