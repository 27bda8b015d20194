//! Sale transaction workflow and sale queries.

use crate::capabilities::Capabilities;
use crate::error::{DbError, DbResult};
use crate::repository::audit::AuditRepository;
use caja_core::validation::{
    validate_percentage, validate_price, validate_quantity, validate_split_amount,
    validate_tendered,
};
use caja_core::{
    pricing, CompletedSale, CoreError, Money, MovementKind, PaymentSplit, Quantity, Sale,
    SaleDraft, SaleLine,
};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    caps: Capabilities,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool, caps: Capabilities) -> Self {
        Self { pool, caps }
    }

    /// Processes a complete cart into a committed sale.
    ///
    /// Everything happens in one transaction:
    ///
    /// ```text
    /// validate draft ──▶ price cart ──▶ BEGIN
    ///                                    │ pre-check stock, whole cart
    ///                                    │ insert header (id assigned here)
    ///                                    │ per line: insert + guarded decrement
    ///                                    │           + movement row (if ledger)
    ///                                    │ payment splits (if ledger)
    ///                                   COMMIT ──▶ audit (best effort)
    /// ```
    ///
    /// The pre-check walks the whole cart before any write, so a cart with
    /// one bad line reports that line and touches nothing. The per-line
    /// decrement is guarded (`WHERE stock_milli >= qty`): if stock vanished
    /// between pre-check and write, zero rows are affected and the whole
    /// sale rolls back with [`CoreError::InsufficientStock`]. Products with
    /// `NULL` stock are untracked and never read or decremented.
    ///
    /// Payment splits, when present, must sum exactly to the computed
    /// total; they are persisted only when the payment ledger exists.
    pub async fn process_sale(&self, draft: &SaleDraft) -> DbResult<CompletedSale> {
        if draft.lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        for line in &draft.lines {
            validate_quantity(line.quantity).map_err(CoreError::from)?;
            validate_price(line.unit_price).map_err(CoreError::from)?;
        }
        validate_percentage("discount", draft.discount).map_err(CoreError::from)?;
        validate_percentage("surcharge", draft.surcharge).map_err(CoreError::from)?;
        if let Some(tendered) = draft.tendered {
            validate_tendered(tendered).map_err(CoreError::from)?;
        }
        for split in &draft.splits {
            validate_split_amount(split.amount).map_err(CoreError::from)?;
        }

        let total = pricing::final_total(&draft.lines, draft.discount, draft.surcharge);

        if !draft.splits.is_empty() {
            let splits_total =
                draft.splits.iter().fold(Money::zero(), |acc, s| acc + s.amount);
            if splits_total != total {
                return Err(CoreError::PaymentSplitMismatch { splits_total, sale_total: total }
                    .into());
            }
        }

        let mut tx = self.pool.begin().await?;

        // Pre-check the whole cart before writing anything, remembering
        // each product's stock so untracked lines skip the decrement.
        let mut stocks: Vec<Option<i64>> = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let row: Option<(Option<i64>,)> =
                sqlx::query_as("SELECT stock_milli FROM products WHERE id = ?1")
                    .bind(line.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let Some((stock,)) = row else {
                return Err(CoreError::ProductNotFound { id: line.product_id }.into());
            };
            if let Some(available) = stock {
                if available < line.quantity.milli() {
                    return Err(CoreError::InsufficientStock {
                        product_id: line.product_id,
                        available: Quantity::from_milli(available),
                        requested: line.quantity,
                    }
                    .into());
                }
            }
            stocks.push(stock);
        }

        let now = Utc::now();
        let change = draft.tendered.map(|tendered| {
            let change = tendered - total;
            if change.is_negative() {
                Money::zero()
            } else {
                change
            }
        });

        // Header first: the auto-assigned id anchors every other row.
        let result = sqlx::query(
            "INSERT INTO sales
                 (customer_id, sold_at, total_cents, payment_method,
                  tendered_cents, change_cents, discount_bps, surcharge_bps)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(draft.customer_id)
        .bind(now)
        .bind(total.cents())
        .bind(draft.payment_method.as_deref())
        .bind(draft.tendered.map(|m| m.cents()))
        .bind(change.map(|m| m.cents()))
        .bind(draft.discount.bps())
        .bind(draft.surcharge.bps())
        .execute(&mut *tx)
        .await?;
        let sale_id = result.last_insert_rowid();

        for (line, stock) in draft.lines.iter().zip(&stocks) {
            sqlx::query(
                "INSERT INTO sale_lines (sale_id, product_id, quantity_milli, unit_price_cents)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity.milli())
            .bind(line.unit_price.cents())
            .execute(&mut *tx)
            .await?;

            if stock.is_some() {
                let hit = sqlx::query(
                    "UPDATE products SET stock_milli = stock_milli - ?2, updated_at = ?3
                     WHERE id = ?1 AND stock_milli >= ?2",
                )
                .bind(line.product_id)
                .bind(line.quantity.milli())
                .bind(now)
                .execute(&mut *tx)
                .await?;

                if hit.rows_affected() == 0 {
                    // Stock no longer covers this line: either a competing
                    // sale drained it, or the cart repeats the product.
                    let available: Option<i64> =
                        sqlx::query_scalar("SELECT stock_milli FROM products WHERE id = ?1")
                            .bind(line.product_id)
                            .fetch_one(&mut *tx)
                            .await?;
                    return Err(CoreError::InsufficientStock {
                        product_id: line.product_id,
                        available: Quantity::from_milli(available.unwrap_or(0)),
                        requested: line.quantity,
                    }
                    .into());
                }
            }

            if self.caps.stock_movement {
                sqlx::query(
                    "INSERT INTO stock_movements (product_id, moved_at, delta_milli, kind, ref_id)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .bind(line.product_id)
                .bind(now)
                .bind(-line.quantity.milli())
                .bind(MovementKind::Sale)
                .bind(sale_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        if self.caps.payment_ledger {
            for split in &draft.splits {
                sqlx::query(
                    "INSERT INTO payments (sale_id, amount_cents, method, reference)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .bind(sale_id)
                .bind(split.amount.cents())
                .bind(&split.method)
                .bind(split.reference.as_deref())
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        debug!(sale_id, total = %total, lines = draft.lines.len(), "Sale committed");

        AuditRepository::new(self.pool.clone(), self.caps)
            .log(None, MovementKind::Sale.as_str(), "sales", Some(sale_id))
            .await;

        Ok(CompletedSale { sale_id, total })
    }

    /// Fetches a sale header by id.
    pub async fn header(&self, sale_id: i64) -> DbResult<Sale> {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT id, customer_id, sold_at, total_cents, payment_method,
                    tendered_cents, change_cents, discount_bps, surcharge_bps
             FROM sales WHERE id = ?1",
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;
        sale.ok_or_else(|| DbError::not_found("Sale", sale_id))
    }

    /// Fetches the lines of a sale, joined with product names.
    pub async fn lines(&self, sale_id: i64) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            "SELECT l.id, l.sale_id, l.product_id, p.name AS product_name,
                    l.quantity_milli, l.unit_price_cents
             FROM sale_lines l
             JOIN products p ON p.id = l.product_id
             WHERE l.sale_id = ?1
             ORDER BY l.id",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }

    /// Fetches the payment splits of a sale.
    ///
    /// Empty when the sale had no splits or the ledger does not exist.
    pub async fn payments(&self, sale_id: i64) -> DbResult<Vec<PaymentSplit>> {
        if !self.caps.payment_ledger {
            return Ok(Vec::new());
        }
        let payments = sqlx::query_as::<_, PaymentSplit>(
            "SELECT id, sale_id, amount_cents, method, reference
             FROM payments WHERE sale_id = ?1 ORDER BY id",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    /// Most recent sales, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT id, customer_id, sold_at, total_cents, payment_method,
                    tendered_cents, change_cents, discount_bps, surcharge_bps
             FROM sales ORDER BY sold_at DESC, id DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }
}

// =============================================================================
// Tests
// =============================================================================
