//! Optional-table capability detection.
//!
//! Four ledger tables are optional per deployment: a store that never
//! splits payments or audits actions simply runs without those tables.
//! Workflows consult a [`Capabilities`] snapshot, probed once when the
//! database opens, and skip the writes for absent ledgers instead of
//! failing on them.

use crate::error::DbResult;
use sqlx::SqlitePool;

/// Which optional ledger tables exist in this database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// `payments`: per-sale payment splits; also the preferred source for
    /// closing summaries.
    pub payment_ledger: bool,
    /// `stock_movements`: one row per stock delta, sale or intake.
    pub stock_movement: bool,
    /// `price_history`: one row per catalog price change at intake.
    pub price_history: bool,
    /// `audit_log`: best-effort operator action trail.
    pub audit_log: bool,
}

impl Capabilities {
    /// Probes `sqlite_master` for each optional table.
    pub async fn probe(pool: &SqlitePool) -> DbResult<Self> {
        Ok(Capabilities {
            payment_ledger: table_exists(pool, "payments").await?,
            stock_movement: table_exists(pool, "stock_movements").await?,
            price_history: table_exists(pool, "price_history").await?,
            audit_log: table_exists(pool, "audit_log").await?,
        })
    }
}

async fn table_exists(pool: &SqlitePool, name: &str) -> DbResult<bool> {
    let found: Option<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

/// Creates every optional ledger table that does not exist yet.
///
/// Called from [`crate::pool::Database::new`] when the configuration asks
/// for optional tables. Idempotent.
pub(crate) async fn create_optional_tables(pool: &SqlitePool) -> DbResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS payments (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            sale_id      INTEGER NOT NULL REFERENCES sales(id),
            amount_cents INTEGER NOT NULL,
            method       TEXT    NOT NULL,
            reference    TEXT
        )",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_payments_sale ON payments(sale_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS stock_movements (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id  INTEGER NOT NULL REFERENCES products(id),
            moved_at    TEXT    NOT NULL,
            delta_milli INTEGER NOT NULL,
            kind        TEXT    NOT NULL,
            ref_id      INTEGER
        )",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_stock_movements_product
         ON stock_movements(product_id, moved_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS price_history (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id       INTEGER NOT NULL REFERENCES products(id),
            changed_at       TEXT    NOT NULL,
            unit_cost_cents  INTEGER NOT NULL,
            sale_price_cents INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_price_history_product
         ON price_history(product_id, changed_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS audit_log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            logged_at TEXT    NOT NULL,
            operator  TEXT,
            action    TEXT    NOT NULL,
            entity    TEXT    NOT NULL,
            ref_id    INTEGER
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_probe_reports_absent_tables() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let caps = Capabilities::probe(db.pool()).await.unwrap();
        assert_eq!(caps, Capabilities::default());
    }

    #[tokio::test]
    async fn test_create_optional_tables_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        create_optional_tables(db.pool()).await.unwrap();
        create_optional_tables(db.pool()).await.unwrap();

        let caps = Capabilities::probe(db.pool()).await.unwrap();
        assert!(caps.payment_ledger && caps.stock_movement);
        assert!(caps.price_history && caps.audit_log);
    }
}
