//! Error types for domain rule violations.
//!
//! [`CoreError`] is the business-rule taxonomy: every variant names a
//! reason an operation was refused, carrying enough context to act on it
//! (which product, how much stock, which period). Storage faults are not
//! represented here; the persistence layer wraps them separately.

use crate::money::{Money, Quantity};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// A domain rule violation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A cart or intake referenced a product id that does not exist.
    #[error("Product not found: {id}")]
    ProductNotFound { id: i64 },

    /// Intake refused because the product is deactivated.
    #[error("Product {id} is inactive and cannot receive stock")]
    ProductInactive { id: i64 },

    /// Tracked stock does not cover the requested quantity.
    ///
    /// Raised both by the pre-check over the whole cart and by the
    /// guarded decrement, so a cart that loses a race to the last unit
    /// fails the same way as one that never had stock:
    ///
    /// ```text
    /// ┌──────────┐   pre-check    ┌───────────┐   guarded     ┌────────┐
    /// │   cart   │ ─────────────▶ │ stock ok? │ ────────────▶ │ commit │
    /// └──────────┘                └─────┬─────┘   decrement   └────────┘
    ///                                   │ no (either step)
    ///                                   ▼
    ///                          InsufficientStock
    /// ```
    #[error(
        "Insufficient stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: i64,
        available: Quantity,
        requested: Quantity,
    },

    /// A sale draft with no line items.
    #[error("Cart has no line items")]
    EmptyCart,

    /// Payment splits were provided but do not sum to the sale total.
    #[error("Payment splits total {splits_total} does not match sale total {sale_total}")]
    PaymentSplitMismatch {
        splits_total: Money,
        sale_total: Money,
    },

    /// A reporting or closing period that ends before it starts.
    #[error("Invalid period: end {end} precedes start {start}")]
    InvalidPeriod {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Field-level input validation failure.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// A field-level input validation failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} cannot be negative")]
    Negative { field: String },

    #[error("{field} has an invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience alias for domain operations.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Tests
// =============================================================================
