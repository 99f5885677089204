//! PostgreSQL persistence for the video catalog.
//!
//! Repositories are zero-sized structs with async methods taking `&PgPool`.
//! Operations that must commit several rows together (ordering changes, slug
//! allocation) open their own transaction; the building blocks they share
//! take `&mut PgConnection` so they compose inside it.

use sqlx::postgres::PgPoolOptions;
use vidcat_core::error::CoreError;

pub mod gate;
pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Errors from repository operations that enforce domain rules.
///
/// Plain reads return `sqlx::Error` directly.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Whether `err` is a PostgreSQL unique violation (23505) on `constraint`.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505") && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
