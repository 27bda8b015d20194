//! Receipt assembly.
//!
//! A receipt is a pure data payload (store identity, sale header, lines,
//! payment splits) for whatever renders it: a printer daemon, a UI, a
//! JSON endpoint. Assembly runs after the sale has committed and is
//! fire-and-forget from the sale's perspective: a failure here is the
//! caller's to log, never a reason to touch the committed sale.

use crate::error::DbResult;
use crate::pool::Database;
use caja_core::{Money, PaymentSplit, Sale, SaleLine, StoreInfo};
use serde::Serialize;

/// Everything a renderer needs to print one receipt.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptData {
    pub store: StoreInfo,
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
    pub payments: Vec<PaymentSplit>,
}

impl ReceiptData {
    pub fn total(&self) -> Money {
        self.sale.total()
    }

    pub fn change(&self) -> Option<Money> {
        self.sale.change()
    }
}

/// Assembles the receipt for a committed sale.
///
/// Fails with `NotFound` for unknown sale ids; payments are empty when
/// the payment ledger does not exist.
pub async fn build_receipt(db: &Database, sale_id: i64) -> DbResult<ReceiptData> {
    let sales = db.sales();
    let sale = sales.header(sale_id).await?;
    let lines = sales.lines(sale_id).await?;
    let payments = sales.payments(sale_id).await?;
    let store = db.store_info().get().await?;

    Ok(ReceiptData { store, sale, lines, payments })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use caja_core::{
        PaymentSplitInput, ProductInput, Quantity, Rate, SaleDraft, SaleLineInput,
    };

    #[tokio::test]
    async fn test_receipt_carries_store_lines_and_payments() {
        let db = Database::new(DbConfig::in_memory().optional_tables(true)).await.unwrap();

        db.store_info()
            .save(&StoreInfo {
                name: "Almacén Don Luis".to_string(),
                footer_note: Some("¡Gracias por su compra!".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let product_id = db
            .products()
            .create(&ProductInput {
                name: "Picada surtida".to_string(),
                price: Money::from_cents(2500),
                stock: Some(Quantity::from_units(5)),
                barcode: None,
            })
            .await
            .unwrap();

        let completed = db
            .sales()
            .process_sale(&SaleDraft {
                lines: vec![SaleLineInput {
                    product_id,
                    quantity: Quantity::from_units(2),
                    unit_price: Money::from_cents(2500),
                }],
                discount: Rate::from_percentage(10.0),
                tendered: Some(Money::from_cents(5000)),
                splits: vec![PaymentSplitInput {
                    amount: Money::from_cents(4500),
                    method: "Efectivo".to_string(),
                    reference: None,
                }],
                ..Default::default()
            })
            .await
            .unwrap();

        let receipt = build_receipt(&db, completed.sale_id).await.unwrap();
        assert_eq!(receipt.store.name, "Almacén Don Luis");
        assert_eq!(receipt.total(), Money::from_cents(4500));
        assert_eq!(receipt.change(), Some(Money::from_cents(500)));
        assert_eq!(receipt.lines.len(), 1);
        assert_eq!(receipt.lines[0].product_name, "Picada surtida");
        assert_eq!(receipt.lines[0].line_total(), Money::from_cents(5000));
        assert_eq!(receipt.payments.len(), 1);
    }

    #[tokio::test]
    async fn test_receipt_serializes_for_renderers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = db
            .products()
            .create(&ProductInput {
                name: "Factura".to_string(),
                price: Money::from_cents(350),
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
                    quantity: Quantity::from_units(1),
                    unit_price: Money::from_cents(350),
                }],
                ..Default::default()
            })
            .await
            .unwrap();

        let receipt = build_receipt(&db, completed.sale_id).await.unwrap();
        let json = serde_json::to_string(&receipt).unwrap();
        assert!(json.contains("\"lines\""));
        assert!(json.contains("Factura"));
        // no ledger, so payments serialize as an empty list
        assert!(json.contains("\"payments\":[]"));
    }

    #[tokio::test]
    async fn test_unknown_sale_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = build_receipt(&db, 404).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
