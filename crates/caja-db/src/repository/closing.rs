//! Cash closing workflow: period summaries and drawer reconciliation.

use crate::capabilities::Capabilities;
use crate::error::DbResult;
use crate::repository::audit::AuditRepository;
use caja_core::{closing, CashClosing, ClosingDraft, CoreError, Money, PeriodSummary};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ClosingRepository {
    pool: SqlitePool,
    caps: Capabilities,
}

impl ClosingRepository {
    pub fn new(pool: SqlitePool, caps: Capabilities) -> Self {
        Self { pool, caps }
    }

    /// Sums the period's payments into drawer buckets.
    ///
    /// When the payment ledger exists it is the source of truth, joined to
    /// sales for the period filter, so split payments land in the right
    /// buckets. Without it, each sale's single `payment_method` label is
    /// used as a fallback. Labels are classified in
    /// [`caja_core::PaymentClass`]; unrecognized ones are reported under
    /// `unclassified` instead of vanishing.
    pub async fn summarize_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<PeriodSummary> {
        if end < start {
            return Err(CoreError::InvalidPeriod { start, end }.into());
        }

        let rows: Vec<(Option<String>, i64)> = if self.caps.payment_ledger {
            sqlx::query_as(
                "SELECT p.method, SUM(p.amount_cents)
                 FROM payments p
                 JOIN sales s ON s.id = p.sale_id
                 WHERE s.sold_at >= ?1 AND s.sold_at <= ?2
                 GROUP BY p.method",
            )
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(
                "SELECT payment_method, SUM(total_cents)
                 FROM sales
                 WHERE sold_at >= ?1 AND sold_at <= ?2
                 GROUP BY payment_method",
            )
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?
        };

        let mut summary = PeriodSummary::zero();
        for (label, cents) in rows {
            summary.add(label.as_deref().unwrap_or(""), Money::from_cents(cents));
        }
        Ok(summary)
    }

    /// Persists a drawer reconciliation, deriving the expected cash and
    /// the variance from the draft's figures.
    pub async fn save_closing(&self, draft: &ClosingDraft) -> DbResult<i64> {
        if draft.period_end < draft.period_start {
            return Err(CoreError::InvalidPeriod {
                start: draft.period_start,
                end: draft.period_end,
            }
            .into());
        }

        let expected = closing::expected_cash(
            draft.opening_float,
            draft.cash_total,
            draft.external_income,
            draft.expenses,
        );
        let variance = closing::variance(draft.counted, expected);

        let result = sqlx::query(
            "INSERT INTO cash_closings
                 (period_start, period_end, opening_float_cents, cash_total_cents,
                  card_total_cents, transfer_total_cents, external_income_cents,
                  expenses_cents, expected_cents, counted_cents, variance_cents,
                  operator, notes, closed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .bind(draft.period_start)
        .bind(draft.period_end)
        .bind(draft.opening_float.cents())
        .bind(draft.cash_total.cents())
        .bind(draft.card_total.cents())
        .bind(draft.transfer_total.cents())
        .bind(draft.external_income.cents())
        .bind(draft.expenses.cents())
        .bind(expected.cents())
        .bind(draft.counted.cents())
        .bind(variance.cents())
        .bind(draft.operator.as_deref())
        .bind(draft.notes.as_deref())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, expected = %expected, variance = %variance, "Closing saved");

        AuditRepository::new(self.pool.clone(), self.caps)
            .log(draft.operator.as_deref(), "CLOSING", "cash_closings", Some(id))
            .await;

        Ok(id)
    }

    /// Most recent closings, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<CashClosing>> {
        let closings = sqlx::query_as::<_, CashClosing>(
            "SELECT id, period_start, period_end, opening_float_cents, cash_total_cents,
                    card_total_cents, transfer_total_cents, external_income_cents,
                    expenses_cents, expected_cents, counted_cents, variance_cents,
                    operator, notes, closed_at
             FROM cash_closings ORDER BY closed_at DESC, id DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(closings)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use caja_core::{Money, PaymentSplitInput, ProductInput, Quantity, SaleDraft, SaleLineInput};
    use chrono::Duration;

    async fn bare_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn ledger_db() -> Database {
        Database::new(DbConfig::in_memory().optional_tables(true)).await.unwrap()
    }

    /// Commits a sale of `total_cents` paid entirely with `method`.
    async fn sell(db: &Database, total_cents: i64, method: &str) {
        let product_id = db
            .products()
            .create(&ProductInput {
                name: format!("Item {}", total_cents),
                price: Money::from_cents(total_cents),
                stock: None,
                barcode: None,
            })
            .await
            .unwrap();

        let draft = SaleDraft {
            lines: vec![SaleLineInput {
                product_id,
                quantity: Quantity::from_units(1),
                unit_price: Money::from_cents(total_cents),
            }],
            payment_method: Some(method.to_string()),
            splits: vec![PaymentSplitInput {
                amount: Money::from_cents(total_cents),
                method: method.to_string(),
                reference: None,
            }],
            ..Default::default()
        };
        db.sales().process_sale(&draft).await.unwrap();
    }

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now - Duration::hours(1), now + Duration::hours(1))
    }

    #[tokio::test]
    async fn test_summary_from_payment_ledger_buckets_by_method() {
        let db = ledger_db().await;
        // cash 100, card 50, "Credito" 30, unknown 20
        sell(&db, 10_000, "cash").await;
        sell(&db, 5_000, "card").await;
        sell(&db, 3_000, "Credito").await;
        sell(&db, 2_000, "unknown-label").await;

        let (start, end) = window();
        let summary = db.closings().summarize_period(start, end).await.unwrap();

        assert_eq!(summary.cash, Money::from_cents(10_000));
        assert_eq!(summary.card, Money::from_cents(8_000));
        assert_eq!(summary.transfer, Money::zero());
        assert_eq!(summary.unclassified, Money::from_cents(2_000));
    }

    #[tokio::test]
    async fn test_summary_falls_back_to_sale_headers_without_ledger() {
        let db = bare_db().await;
        sell(&db, 4_000, "Efectivo").await;
        sell(&db, 6_000, "Tarjeta de crédito").await;
        sell(&db, 1_500, "Transferencia").await;

        let (start, end) = window();
        let summary = db.closings().summarize_period(start, end).await.unwrap();

        assert_eq!(summary.cash, Money::from_cents(4_000));
        assert_eq!(summary.card, Money::from_cents(6_000));
        assert_eq!(summary.transfer, Money::from_cents(1_500));
        assert_eq!(summary.unclassified, Money::zero());
    }

    #[tokio::test]
    async fn test_summary_excludes_sales_outside_period() {
        let db = bare_db().await;
        sell(&db, 5_000, "Efectivo").await;

        let now = Utc::now();
        let summary = db
            .closings()
            .summarize_period(now + Duration::hours(1), now + Duration::hours(2))
            .await
            .unwrap();
        assert_eq!(summary.grand_total(), Money::zero());
    }

    #[tokio::test]
    async fn test_inverted_period_is_rejected() {
        let db = bare_db().await;
        let now = Utc::now();

        let err =
            db.closings().summarize_period(now, now - Duration::seconds(1)).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidPeriod { .. })));
    }

    #[tokio::test]
    async fn test_save_closing_derives_expected_and_variance() {
        let db = bare_db().await;
        let (start, end) = window();

        // opening 50 + cash 100 + external 0 − expenses 20 = expected 130;
        // counted 125 → variance −5
        let id = db
            .closings()
            .save_closing(&ClosingDraft {
                period_start: start,
                period_end: end,
                opening_float: Money::from_cents(5_000),
                cash_total: Money::from_cents(10_000),
                card_total: Money::from_cents(8_000),
                transfer_total: Money::zero(),
                external_income: Money::zero(),
                expenses: Money::from_cents(2_000),
                counted: Money::from_cents(12_500),
                operator: Some("maria".to_string()),
                notes: None,
            })
            .await
            .unwrap();

        let closings = db.closings().list_recent(5).await.unwrap();
        assert_eq!(closings.len(), 1);
        let closing = &closings[0];
        assert_eq!(closing.id, id);
        assert_eq!(closing.expected(), Money::from_cents(13_000));
        assert_eq!(closing.variance(), Money::from_cents(-500));
        assert_eq!(closing.card_total(), Money::from_cents(8_000));
        assert_eq!(closing.operator.as_deref(), Some("maria"));
    }

    #[tokio::test]
    async fn test_save_closing_rejects_inverted_period() {
        let db = bare_db().await;
        let now = Utc::now();

        let err = db
            .closings()
            .save_closing(&ClosingDraft {
                period_start: now,
                period_end: now - Duration::hours(1),
                opening_float: Money::zero(),
                cash_total: Money::zero(),
                card_total: Money::zero(),
                transfer_total: Money::zero(),
                external_income: Money::zero(),
                expenses: Money::zero(),
                counted: Money::zero(),
                operator: None,
                notes: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidPeriod { .. })));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cash_closings")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_summarize_then_save_round_trip() {
        let db = ledger_db().await;
        sell(&db, 10_000, "Efectivo").await;
        sell(&db, 5_000, "Tarjeta").await;

        let (start, end) = window();
        let summary = db.closings().summarize_period(start, end).await.unwrap();

        let id = db
            .closings()
            .save_closing(&ClosingDraft {
                period_start: start,
                period_end: end,
                opening_float: Money::from_cents(2_000),
                cash_total: summary.cash,
                card_total: summary.card,
                transfer_total: summary.transfer,
                external_income: Money::zero(),
                expenses: Money::zero(),
                counted: Money::from_cents(12_000),
                operator: None,
                notes: Some("cierre de prueba".to_string()),
            })
            .await
            .unwrap();

        let closings = db.closings().list_recent(1).await.unwrap();
        assert_eq!(closings[0].id, id);
        // expected = 20 + 100 = 120, counted 120 → balanced drawer
        assert_eq!(closings[0].expected(), Money::from_cents(12_000));
        assert!(closings[0].variance().is_zero());
    }
}
