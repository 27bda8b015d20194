//! # Caja Core
//!
//! Domain types and business rules for the Caja point-of-sale engine.
//!
//! This crate is the dependency-free heart of the system. Every rule that
//! decides what a sale costs, whether stock covers a cart, or how a cash
//! drawer should balance lives here, where it can be tested without a
//! database.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                caja-core                    │
//! │                                             │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────────┐  │
//! │  │  money  │  │ pricing │  │   closing   │  │
//! │  │ Money   │  │ cart    │  │ classify +  │  │
//! │  │ Quantity│  │ totals  │  │ drawer math │  │
//! │  └─────────┘  └─────────┘  └─────────────┘  │
//! │  ┌─────────┐  ┌──────────┐  ┌────────────┐  │
//! │  │  types  │  │validation│  │   error    │  │
//! │  └─────────┘  └──────────┘  └────────────┘  │
//! └──────────────────────┬──────────────────────┘
//!                        │ consumed by
//!                        ▼
//!              caja-db (storage engine)
//! ```
//!
//! ## Design principles
//!
//! 1. **Integer arithmetic only**: money is cents, quantities are
//!    thousandths, rates are basis points. No floating point touches a
//!    total.
//! 2. **Pure functions**: pricing and closing math take values and return
//!    values. Persistence decides when to call them, never how.
//! 3. **Explicit failures**: every rejected operation maps to a variant of
//!    [`CoreError`], so callers can branch on the cause instead of parsing
//!    messages.

pub mod closing;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

pub use closing::{PaymentClass, PeriodSummary};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Quantity};
pub use types::*;
