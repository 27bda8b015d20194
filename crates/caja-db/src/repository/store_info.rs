//! Store identity, a single-row table feeding receipt headers.

use crate::error::DbResult;
use caja_core::StoreInfo;
use sqlx::SqlitePool;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct StoreInfoRepository {
    pool: SqlitePool,
}

impl StoreInfoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetches the store identity; defaults when never saved.
    pub async fn get(&self) -> DbResult<StoreInfo> {
        let info = sqlx::query_as::<_, StoreInfo>(
            "SELECT name, tax_id, address, phone, footer_note FROM store_info WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(info.unwrap_or_default())
    }

    /// Saves the store identity, replacing any previous values.
    pub async fn save(&self, info: &StoreInfo) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO store_info (id, name, tax_id, address, phone, footer_note)
             VALUES (1, ?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 tax_id = excluded.tax_id,
                 address = excluded.address,
                 phone = excluded.phone,
                 footer_note = excluded.footer_note",
        )
        .bind(&info.name)
        .bind(info.tax_id.as_deref())
        .bind(info.address.as_deref())
        .bind(info.phone.as_deref())
        .bind(info.footer_note.as_deref())
        .execute(&self.pool)
        .await?;

        debug!(name = %info.name, "Store info saved");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
