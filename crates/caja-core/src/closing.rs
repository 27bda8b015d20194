//! Cash closing: payment classification and drawer reconciliation math.
//!
//! Payment method labels are free text (operators type "Efectivo",
//! "Tarjeta crédito", "debito", ...), so period totals are bucketed by
//! case-insensitive substring matching against a fixed synonym list.
//! Labels that match nothing land in an explicit `unclassified` bucket
//! rather than silently disappearing, so a drawer that does not balance
//! can be traced to the label that caused it.

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// The drawer bucket a payment method label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentClass {
    Cash,
    Card,
    Transfer,
    /// Label matched no known synonym.
    Unclassified,
}

/// Substrings recognized as cash payments.
const CASH_TOKENS: &[&str] = &["efec", "cash", "contado"];

/// Substrings recognized as card payments, debit or credit.
const CARD_TOKENS: &[&str] = &["tarj", "card", "credi", "crédi", "debit", "débito"];

/// Substrings recognized as bank transfers.
const TRANSFER_TOKENS: &[&str] = &["transf", "deposito", "depósito"];

impl PaymentClass {
    /// Classifies a free-text payment method label.
    ///
    /// Matching is case-insensitive and checks cash, then card, then
    /// transfer; the first bucket with a matching substring wins.
    ///
    /// ```
    /// use caja_core::PaymentClass;
    ///
    /// assert_eq!(PaymentClass::classify("Efectivo"), PaymentClass::Cash);
    /// assert_eq!(PaymentClass::classify("Tarjeta de crédito"), PaymentClass::Card);
    /// assert_eq!(PaymentClass::classify("vale interno"), PaymentClass::Unclassified);
    /// ```
    pub fn classify(label: &str) -> PaymentClass {
        let label = label.trim().to_lowercase();
        if CASH_TOKENS.iter().any(|t| label.contains(t)) {
            PaymentClass::Cash
        } else if CARD_TOKENS.iter().any(|t| label.contains(t)) {
            PaymentClass::Card
        } else if TRANSFER_TOKENS.iter().any(|t| label.contains(t)) {
            PaymentClass::Transfer
        } else {
            PaymentClass::Unclassified
        }
    }
}

/// Per-bucket payment totals for a closing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub cash: Money,
    pub card: Money,
    pub transfer: Money,
    pub unclassified: Money,
}

impl PeriodSummary {
    pub fn zero() -> Self {
        PeriodSummary::default()
    }

    /// Adds an amount under the bucket its label classifies into.
    pub fn add(&mut self, label: &str, amount: Money) {
        match PaymentClass::classify(label) {
            PaymentClass::Cash => self.cash += amount,
            PaymentClass::Card => self.card += amount,
            PaymentClass::Transfer => self.transfer += amount,
            PaymentClass::Unclassified => self.unclassified += amount,
        }
    }

    /// Sum of every bucket, including unclassified.
    pub fn grand_total(&self) -> Money {
        self.cash + self.card + self.transfer + self.unclassified
    }
}

/// Cash expected in the drawer at closing time.
///
/// Only cash flows through the drawer: card and transfer income never
/// does, and expenses are assumed paid from it.
pub fn expected_cash(
    opening_float: Money,
    cash_total: Money,
    external_income: Money,
    expenses: Money,
) -> Money {
    opening_float + cash_total + external_income - expenses
}

/// Counted minus expected. Negative means the drawer is short.
pub fn variance(counted: Money, expected: Money) -> Money {
    counted - expected
}

// =============================================================================
// Tests
// =============================================================================
