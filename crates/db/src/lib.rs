//! Store backends for the portal.
//!
//! Two interchangeable implementations of `internhub_core::store::Store`:
//!
//! - [`postgres::PgStore`] -- relational backing over sqlx/PostgreSQL, with
//!   uniqueness enforced by database constraints and associations in a join
//!   table.
//! - [`memory::MemoryStore`] -- document-style backing over in-process maps;
//!   also the test double for the HTTP and workflow suites.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Cheap connectivity probe used by the health endpoint.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
