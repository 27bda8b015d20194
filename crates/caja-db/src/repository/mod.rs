//! Repositories: all SQL lives here.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Repository pattern                  │
//! │                                                     │
//! │   callers (app / tests)                             │
//! │        │  typed drafts in, typed records out        │
//! │        ▼                                            │
//! │   SaleRepository::process_sale(&SaleDraft)          │
//! │        │  one transaction per workflow              │
//! │        ▼                                            │
//! │   SQLite (pool)                                     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Three repositories run transactional workflows (`sale`, `intake`,
//! `closing`); the rest are catalog and registry maintenance. Repositories
//! that write optional ledgers carry the [`Capabilities`](crate::Capabilities)
//! snapshot and branch on it instead of probing tables per call.

pub mod audit;
pub mod closing;
pub mod customer;
pub mod intake;
pub mod operator;
pub mod product;
pub mod sale;
pub mod store_info;
