//! Stock intake workflow and intake queries.

use crate::capabilities::Capabilities;
use crate::error::DbResult;
use crate::repository::audit::AuditRepository;
use caja_core::validation::{validate_cost, validate_price, validate_quantity};
use caja_core::{
    CoreError, Intake, IntakeDraft, IntakeOutcome, Money, MovementKind, PriceChange, Quantity,
    StockMovement,
};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct IntakeRepository {
    pool: SqlitePool,
    caps: Capabilities,
}

impl IntakeRepository {
    pub fn new(pool: SqlitePool, caps: Capabilities) -> Self {
        Self { pool, caps }
    }

    /// Records a stock delivery: adds quantity, applies the new catalog
    /// price, and writes the intake row plus optional ledgers, all in one
    /// transaction.
    ///
    /// The price is overwritten unconditionally; a price-history row is
    /// appended only when the price actually changed (and the ledger
    /// exists). Untracked products become tracked, starting from zero.
    /// Inactive products refuse intakes.
    pub async fn process_intake(&self, draft: &IntakeDraft) -> DbResult<IntakeOutcome> {
        validate_quantity(draft.quantity).map_err(CoreError::from)?;
        validate_cost(draft.unit_cost).map_err(CoreError::from)?;
        validate_price(draft.sale_price).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let row: Option<(Option<i64>, i64, bool)> = sqlx::query_as(
            "SELECT stock_milli, price_cents, is_active FROM products WHERE id = ?1",
        )
        .bind(draft.product_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((stock, price_cents, is_active)) = row else {
            return Err(CoreError::ProductNotFound { id: draft.product_id }.into());
        };
        if !is_active {
            return Err(CoreError::ProductInactive { id: draft.product_id }.into());
        }

        let previous_stock = stock.map(Quantity::from_milli);
        let new_stock = Quantity::from_milli(stock.unwrap_or(0) + draft.quantity.milli());
        let previous_price = Money::from_cents(price_cents);

        let now = Utc::now();
        // Additive stock update; the absolute price write is intentional
        // (the delivery's price always wins).
        sqlx::query(
            "UPDATE products
             SET stock_milli = COALESCE(stock_milli, 0) + ?2, price_cents = ?3, updated_at = ?4
             WHERE id = ?1",
        )
        .bind(draft.product_id)
        .bind(draft.quantity.milli())
        .bind(draft.sale_price.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "INSERT INTO intakes
                 (product_id, operator_id, received_at, quantity_milli,
                  unit_cost_cents, sale_price_cents)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(draft.product_id)
        .bind(draft.operator_id)
        .bind(now)
        .bind(draft.quantity.milli())
        .bind(draft.unit_cost.cents())
        .bind(draft.sale_price.cents())
        .execute(&mut *tx)
        .await?;
        let intake_id = result.last_insert_rowid();

        if self.caps.price_history && previous_price != draft.sale_price {
            sqlx::query(
                "INSERT INTO price_history (product_id, changed_at, unit_cost_cents, sale_price_cents)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(draft.product_id)
            .bind(now)
            .bind(draft.unit_cost.cents())
            .bind(draft.sale_price.cents())
            .execute(&mut *tx)
            .await?;
        }

        if self.caps.stock_movement {
            sqlx::query(
                "INSERT INTO stock_movements (product_id, moved_at, delta_milli, kind, ref_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(draft.product_id)
            .bind(now)
            .bind(draft.quantity.milli())
            .bind(MovementKind::Intake)
            .bind(intake_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(
            intake_id,
            product_id = draft.product_id,
            quantity = %draft.quantity,
            "Intake committed"
        );

        let operator = draft.operator_id.to_string();
        AuditRepository::new(self.pool.clone(), self.caps)
            .log(Some(operator.as_str()), MovementKind::Intake.as_str(), "intakes", Some(intake_id))
            .await;

        Ok(IntakeOutcome {
            intake_id,
            previous_stock,
            new_stock,
            previous_price,
            new_price: draft.sale_price,
        })
    }

    /// Most recent intakes, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Intake>> {
        let intakes = sqlx::query_as::<_, Intake>(
            "SELECT id, product_id, operator_id, received_at, quantity_milli,
                    unit_cost_cents, sale_price_cents
             FROM intakes ORDER BY received_at DESC, id DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(intakes)
    }

    /// Price history of a product, oldest first. Empty when the ledger
    /// does not exist.
    pub async fn price_history(&self, product_id: i64) -> DbResult<Vec<PriceChange>> {
        if !self.caps.price_history {
            return Ok(Vec::new());
        }
        let changes = sqlx::query_as::<_, PriceChange>(
            "SELECT id, product_id, changed_at, unit_cost_cents, sale_price_cents
             FROM price_history WHERE product_id = ?1 ORDER BY changed_at, id",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(changes)
    }

    /// Movement ledger of a product, oldest first, sale and intake rows
    /// alike. Empty when the ledger does not exist.
    pub async fn movements(&self, product_id: i64) -> DbResult<Vec<StockMovement>> {
        if !self.caps.stock_movement {
            return Ok(Vec::new());
        }
        let movements = sqlx::query_as::<_, StockMovement>(
            "SELECT id, product_id, moved_at, delta_milli, kind, ref_id
             FROM stock_movements WHERE product_id = ?1 ORDER BY moved_at, id",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }
}

// =============================================================================
// Tests
// =============================================================================
