pub mod content_blocks;
pub mod courses;
pub mod participants;
pub mod webinars;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// In-memory database with the schema applied. A single connection keeps
/// every query on the same memory database.
pub async fn in_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let pool = create_pool("sqlite::memory:", 1).await?;
    run_migrations(&pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;
    Ok(pool)
}

#[cfg(test)]
pub(crate) async fn setup_test_db() -> SqlitePool {
    in_memory_pool().await.expect("Failed to create test db")
}
