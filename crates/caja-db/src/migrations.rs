//! Schema migrations.
//!
//! Migrations are plain SQL files under `migrations/sqlite/`, embedded at
//! compile time and applied in order on startup. sqlx records applied
//! versions in its own `_sqlx_migrations` table, so re-running is a no-op.
//!
//! The optional ledger tables are not part of the migration set; see
//! [`crate::capabilities`].

use crate::error::DbResult;
use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::info;

/// Embedded migration set.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies all pending migrations.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Running database migrations");
    MIGRATOR.run(pool).await?;
    info!("Migrations complete");
    Ok(())
}

/// Returns `(total, applied)` migration counts.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);
    Ok((total, applied as usize))
}

// =============================================================================
// Tests
// =============================================================================
