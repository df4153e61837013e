use chrono::Utc;
use sqlx::types::Json;
use sqlx::{Executor, Sqlite};

use crate::models::{ContentBlock, ContentBlockRequest};

const BLOCK_COLUMNS: &str = "id, name, category, description, content_type, content_data, is_active, created_at, updated_at";

pub async fn insert_content_block<'e, E>(
    db: E,
    req: &ContentBlockRequest,
) -> Result<ContentBlock, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = Utc::now();
    let sql = format!(
        r#"
        INSERT INTO content_blocks
            (name, category, description, content_type, content_data, is_active, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        RETURNING {BLOCK_COLUMNS}
        "#
    );

    sqlx::query_as::<_, ContentBlock>(&sql)
        .bind(&req.name)
        .bind(&req.category)
        .bind(&req.description)
        .bind(&req.content_type)
        .bind(Json(&req.content_data))
        .bind(req.is_active)
        .bind(now)
        .fetch_one(db)
        .await
}

pub async fn fetch_content_blocks<'e, E>(
    db: E,
    skip: i64,
    limit: i64,
) -> Result<Vec<ContentBlock>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {BLOCK_COLUMNS} FROM content_blocks ORDER BY id LIMIT ? OFFSET ?");
    sqlx::query_as::<_, ContentBlock>(&sql)
        .bind(limit)
        .bind(skip)
        .fetch_all(db)
        .await
}

pub async fn find_content_block<'e, E>(db: E, id: i64) -> Result<Option<ContentBlock>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {BLOCK_COLUMNS} FROM content_blocks WHERE id = ?");
    sqlx::query_as::<_, ContentBlock>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Full replacement of every editable field.
pub async fn update_content_block<'e, E>(
    db: E,
    id: i64,
    req: &ContentBlockRequest,
) -> Result<Option<ContentBlock>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        UPDATE content_blocks
        SET name = ?1,
            category = ?2,
            description = ?3,
            content_type = ?4,
            content_data = ?5,
            is_active = ?6,
            updated_at = ?7
        WHERE id = ?8
        RETURNING {BLOCK_COLUMNS}
        "#
    );

    sqlx::query_as::<_, ContentBlock>(&sql)
        .bind(&req.name)
        .bind(&req.category)
        .bind(&req.description)
        .bind(&req.content_type)
        .bind(Json(&req.content_data))
        .bind(req.is_active)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn count_content_blocks<'e, E>(db: E) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM content_blocks")
        .fetch_one(db)
        .await
}
