//! Core domain types for the POS engine.
//!
//! Persisted records keep their database representation (raw `*_cents`,
//! `*_milli`, and `*_bps` integers) and expose typed accessors, so row
//! mapping stays trivial while arithmetic always goes through [`Money`],
//! [`Quantity`], and [`Rate`]. Input types (`SaleDraft`, `IntakeDraft`,
//! `ClosingDraft`) are fully typed from the start.

use crate::money::{Money, Quantity};
use crate::pricing;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Rates
// =============================================================================

/// A percentage stored in basis points (1/100th of a percent).
///
/// 1000 basis points = 10%. Discounts and surcharges are expressed this
/// way so cart pricing stays in integer arithmetic end to end.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage, e.g. `10.0` for 10%.
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Value in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Value as a percentage for display.
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A product in the catalog.
///
/// `stock_milli` is `None` for products whose inventory is not tracked
/// (services, made-to-order items). Untracked products always sell; their
/// stock is never read or written by a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    pub stock_milli: Option<i64>,
    pub is_active: bool,
    pub barcode: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Current sale price.
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Current stock, if inventory is tracked.
    pub fn stock(&self) -> Option<Quantity> {
        self.stock_milli.map(Quantity::from_milli)
    }

    /// Whether inventory is tracked for this product.
    pub fn is_tracked(&self) -> bool {
        self.stock_milli.is_some()
    }

    /// Whether current stock covers `quantity`. Untracked products always
    /// cover any quantity.
    pub fn can_cover(&self, quantity: Quantity) -> bool {
        match self.stock_milli {
            Some(stock) => stock >= quantity.milli(),
            None => true,
        }
    }
}

/// Input for creating or fully updating a catalog product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: Money,
    /// `None` marks the product as untracked.
    pub stock: Option<Quantity>,
    pub barcode: Option<String>,
}

// =============================================================================
// Sales
// =============================================================================

/// A committed sale header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub sold_at: DateTime<Utc>,
    pub total_cents: i64,
    pub payment_method: Option<String>,
    pub tendered_cents: Option<i64>,
    pub change_cents: Option<i64>,
    pub discount_bps: u32,
    pub surcharge_bps: u32,
}

impl Sale {
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    pub fn tendered(&self) -> Option<Money> {
        self.tendered_cents.map(Money::from_cents)
    }

    pub fn change(&self) -> Option<Money> {
        self.change_cents.map(Money::from_cents)
    }

    pub fn discount(&self) -> Rate {
        Rate::from_bps(self.discount_bps)
    }

    pub fn surcharge(&self) -> Rate {
        Rate::from_bps(self.surcharge_bps)
    }
}

/// A committed sale line, joined with the product name for display.
///
/// Quantity and unit price are snapshots taken at sale time; later catalog
/// edits do not rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity_milli: i64,
    pub unit_price_cents: i64,
}

impl SaleLine {
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line amount rounded to cents, for receipt display.
    pub fn line_total(&self) -> Money {
        pricing::line_total(self.quantity(), self.unit_price())
    }
}

/// One line of a cart about to be sold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SaleLineInput {
    pub product_id: i64,
    pub quantity: Quantity,
    pub unit_price: Money,
}

/// One split of a mixed payment (e.g. half cash, half card).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSplitInput {
    pub amount: Money,
    pub method: String,
    pub reference: Option<String>,
}

/// A complete cart ready to be processed into a sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleDraft {
    pub customer_id: Option<i64>,
    pub lines: Vec<SaleLineInput>,
    pub discount: Rate,
    pub surcharge: Rate,
    pub payment_method: Option<String>,
    pub tendered: Option<Money>,
    /// When non-empty, the splits must sum exactly to the sale total.
    pub splits: Vec<PaymentSplitInput>,
}

/// The outcome of a committed sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSale {
    pub sale_id: i64,
    pub total: Money,
}

/// A persisted payment split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentSplit {
    pub id: i64,
    pub sale_id: i64,
    pub amount_cents: i64,
    pub method: String,
    pub reference: Option<String>,
}

impl PaymentSplit {
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Stock movements
// =============================================================================

/// Why a stock movement happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    /// Stock left the store through a sale (negative delta).
    Sale,
    /// Stock arrived through an intake (positive delta).
    Intake,
}

impl MovementKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Sale => "SALE",
            MovementKind::Intake => "INTAKE",
        }
    }
}

/// One row of the stock movement ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: i64,
    pub product_id: i64,
    pub moved_at: DateTime<Utc>,
    pub delta_milli: i64,
    pub kind: MovementKind,
    /// Id of the sale or intake that caused the movement.
    pub ref_id: Option<i64>,
}

impl StockMovement {
    pub fn delta(&self) -> Quantity {
        Quantity::from_milli(self.delta_milli)
    }
}

// =============================================================================
// Intakes
// =============================================================================

/// A stock delivery about to be recorded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntakeDraft {
    pub operator_id: i64,
    pub product_id: i64,
    pub quantity: Quantity,
    pub unit_cost: Money,
    /// New catalog price, applied unconditionally.
    pub sale_price: Money,
}

/// The outcome of a committed intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeOutcome {
    pub intake_id: i64,
    /// `None` when the product was untracked before this intake.
    pub previous_stock: Option<Quantity>,
    pub new_stock: Quantity,
    pub previous_price: Money,
    pub new_price: Money,
}

impl IntakeOutcome {
    /// Whether this intake changed the catalog price.
    pub fn price_changed(&self) -> bool {
        self.previous_price != self.new_price
    }
}

/// A committed intake record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Intake {
    pub id: i64,
    pub product_id: i64,
    pub operator_id: i64,
    pub received_at: DateTime<Utc>,
    pub quantity_milli: i64,
    pub unit_cost_cents: i64,
    pub sale_price_cents: i64,
}

impl Intake {
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }

    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }
}

/// One row of the price history ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PriceChange {
    pub id: i64,
    pub product_id: i64,
    pub changed_at: DateTime<Utc>,
    pub unit_cost_cents: i64,
    pub sale_price_cents: i64,
}

impl PriceChange {
    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }

    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }
}

// =============================================================================
// Cash closings
// =============================================================================

/// A drawer reconciliation about to be recorded.
///
/// Method totals usually start from [`crate::closing::PeriodSummary`] and
/// may be adjusted by the operator before saving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosingDraft {
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub opening_float: Money,
    pub cash_total: Money,
    pub card_total: Money,
    pub transfer_total: Money,
    pub external_income: Money,
    pub expenses: Money,
    /// Cash physically counted in the drawer.
    pub counted: Money,
    pub operator: Option<String>,
    pub notes: Option<String>,
}

/// A committed cash closing, with the derived expectation and variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashClosing {
    pub id: i64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub opening_float_cents: i64,
    pub cash_total_cents: i64,
    pub card_total_cents: i64,
    pub transfer_total_cents: i64,
    pub external_income_cents: i64,
    pub expenses_cents: i64,
    pub expected_cents: i64,
    pub counted_cents: i64,
    pub variance_cents: i64,
    pub operator: Option<String>,
    pub notes: Option<String>,
    pub closed_at: DateTime<Utc>,
}

impl CashClosing {
    pub fn opening_float(&self) -> Money {
        Money::from_cents(self.opening_float_cents)
    }

    pub fn cash_total(&self) -> Money {
        Money::from_cents(self.cash_total_cents)
    }

    pub fn card_total(&self) -> Money {
        Money::from_cents(self.card_total_cents)
    }

    pub fn transfer_total(&self) -> Money {
        Money::from_cents(self.transfer_total_cents)
    }

    pub fn expected(&self) -> Money {
        Money::from_cents(self.expected_cents)
    }

    pub fn counted(&self) -> Money {
        Money::from_cents(self.counted_cents)
    }

    /// Counted minus expected. Negative means the drawer is short.
    pub fn variance(&self) -> Money {
        Money::from_cents(self.variance_cents)
    }
}

// =============================================================================
// Registry: customers, operators, store identity
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Operator {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOperator {
    pub username: String,
    pub display_name: String,
    pub role: String,
}

impl Default for NewOperator {
    fn default() -> Self {
        NewOperator {
            username: String::new(),
            display_name: String::new(),
            role: "cashier".to_string(),
        }
    }
}

/// Store identity printed on receipt headers and footers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StoreInfo {
    pub name: String,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub footer_note: Option<String>,
}

/// One row of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditEntry {
    pub id: i64,
    pub logged_at: DateTime<Utc>,
    pub operator: Option<String>,
    pub action: String,
    pub entity: String,
    pub ref_id: Option<i64>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_conversions() {
        assert_eq!(Rate::from_percentage(10.0).bps(), 1000);
        assert_eq!(Rate::from_percentage(2.5).bps(), 250);
        assert_eq!(Rate::from_bps(1500).percentage(), 15.0);
        assert!(Rate::zero().is_zero());
        assert_eq!(Rate::default(), Rate::zero());
    }

    #[test]
    fn test_product_stock_cover() {
        let mut product = Product {
            id: 1,
            name: "Yerba 1kg".to_string(),
            price_cents: 1050,
            stock_milli: Some(2000),
            is_active: true,
            barcode: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(product.is_tracked());
        assert!(product.can_cover(Quantity::from_units(2)));
        assert!(!product.can_cover(Quantity::from_milli(2001)));

        product.stock_milli = None;
        assert!(!product.is_tracked());
        assert!(product.can_cover(Quantity::from_units(1_000_000)));
    }

    #[test]
    fn test_sale_accessors() {
        let sale = Sale {
            id: 7,
            customer_id: None,
            sold_at: Utc::now(),
            total_cents: 2250,
            payment_method: Some("Efectivo".to_string()),
            tendered_cents: Some(2500),
            change_cents: Some(250),
            discount_bps: 1000,
            surcharge_bps: 0,
        };

        assert_eq!(sale.total(), Money::from_cents(2250));
        assert_eq!(sale.change(), Some(Money::from_cents(250)));
        assert_eq!(sale.discount().percentage(), 10.0);
        assert!(sale.surcharge().is_zero());
    }

    #[test]
    fn test_sale_line_total_rounds_to_cents() {
        let line = SaleLine {
            id: 1,
            sale_id: 1,
            product_id: 1,
            product_name: "Queso cremoso".to_string(),
            quantity_milli: 1250, // 1.250 kg
            unit_price_cents: 999, // $9.99/kg
        };

        // 1.250 × 9.99 = 12.4875 → $12.49
        assert_eq!(line.line_total(), Money::from_cents(1249));
    }

    #[test]
    fn test_movement_kind_labels() {
        assert_eq!(MovementKind::Sale.as_str(), "SALE");
        assert_eq!(MovementKind::Intake.as_str(), "INTAKE");
    }

    #[test]
    fn test_intake_outcome_price_changed() {
        let outcome = IntakeOutcome {
            intake_id: 1,
            previous_stock: None,
            new_stock: Quantity::from_units(10),
            previous_price: Money::from_cents(500),
            new_price: Money::from_cents(550),
        };
        assert!(outcome.price_changed());

        let same = IntakeOutcome { new_price: Money::from_cents(500), ..outcome };
        assert!(!same.price_changed());
    }
}
