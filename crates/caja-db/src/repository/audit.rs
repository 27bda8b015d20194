//! Best-effort audit trail.
//!
//! Audit rows are appended after a workflow commits, outside its
//! transaction. A missing table or a failed insert is logged and
//! swallowed: the trail must never fail or roll back the operation it
//! describes.

use crate::capabilities::Capabilities;
use crate::error::DbResult;
use caja_core::AuditEntry;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
    caps: Capabilities,
}

impl AuditRepository {
    pub fn new(pool: SqlitePool, caps: Capabilities) -> Self {
        Self { pool, caps }
    }

    /// Appends an audit row. No-op without the `audit_log` table; insert
    /// failures are logged at WARN and swallowed.
    pub async fn log(
        &self,
        operator: Option<&str>,
        action: &str,
        entity: &str,
        ref_id: Option<i64>,
    ) {
        if !self.caps.audit_log {
            return;
        }

        let result = sqlx::query(
            "INSERT INTO audit_log (logged_at, operator, action, entity, ref_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(Utc::now())
        .bind(operator)
        .bind(action)
        .bind(entity)
        .bind(ref_id)
        .execute(&self.pool)
        .await;

        if let Err(error) = result {
            warn!(%error, action, entity, "Audit append failed");
        }
    }

    /// Most recent audit rows, newest first. Empty without the table.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<AuditEntry>> {
        if !self.caps.audit_log {
            return Ok(Vec::new());
        }
        let entries = sqlx::query_as::<_, AuditEntry>(
            "SELECT id, logged_at, operator, action, entity, ref_id
             FROM audit_log ORDER BY id DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use caja_core::{Money, ProductInput, SaleDraft, SaleLineInput};

    #[tokio::test]
    async fn test_log_is_a_silent_noop_without_table() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        // must not error even though audit_log does not exist
        db.audit().log(Some("maria"), "SALE", "sales", Some(1)).await;
        assert!(db.audit().recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_workflows_leave_audit_rows() {
        let db = Database::new(DbConfig::in_memory().optional_tables(true)).await.unwrap();
        let product_id = db
            .products()
            .create(&ProductInput {
                name: "Jabon".to_string(),
                price: Money::from_cents(700),
                stock: None,
                barcode: None,
            })
            .await
            .unwrap();

        let completed = db
            .sales()
            .process_sale(&SaleDraft {
                lines: vec![SaleLineInput {
                    product_id,
                    quantity: caja_core::Quantity::from_units(1),
                    unit_price: Money::from_cents(700),
                }],
                ..Default::default()
            })
            .await
            .unwrap();

        let entries = db.audit().recent(10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "SALE");
        assert_eq!(entries[0].entity, "sales");
        assert_eq!(entries[0].ref_id, Some(completed.sale_id));
    }

    #[tokio::test]
    async fn test_manual_log_round_trip() {
        let db = Database::new(DbConfig::in_memory().optional_tables(true)).await.unwrap();

        db.audit().log(Some("maria"), "PRICE_CHANGE", "products", Some(3)).await;
        db.audit().log(None, "LOGIN", "operators", None).await;

        let entries = db.audit().recent(10).await.unwrap();
        assert_eq!(entries.len(), 2);
        // newest first
        assert_eq!(entries[0].action, "LOGIN");
        assert_eq!(entries[0].operator, None);
        assert_eq!(entries[1].operator.as_deref(), Some("maria"));
    }
}
