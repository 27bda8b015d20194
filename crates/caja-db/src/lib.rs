//! # Caja DB
//!
//! SQLite storage engine for the Caja point-of-sale system.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                    caja-db                       │
//! │                                                  │
//! │  ┌──────────┐   ┌────────────┐   ┌────────────┐  │
//! │  │   pool   │──▶│ migrations │   │capabilities│  │
//! │  │ Database │   │  (sqlx)    │   │  (probe)   │  │
//! │  └────┬─────┘   └────────────┘   └────────────┘  │
//! │       │ hands out                                │
//! │       ▼                                          │
//! │  ┌────────────────────────────────────────────┐  │
//! │  │              repositories                  │  │
//! │  │  sale · intake · closing · product ·       │  │
//! │  │  customer · operator · store_info · audit  │  │
//! │  └────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Key decisions
//!
//! - **Explicit handle**: every repository is reached through [`Database`];
//!   nothing in the crate touches a global connection.
//! - **Capability probing**: the optional ledger tables (payments,
//!   stock_movements, price_history, audit_log) are detected once at
//!   startup; workflows branch on [`Capabilities`] instead of probing
//!   per operation.
//! - **Transactional workflows**: a sale, an intake, or a closing commits
//!   all of its rows or none of them. Receipt assembly and audit logging
//!   happen after commit and never fail the workflow.

pub mod capabilities;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod receipt;
pub mod repository;

pub use capabilities::Capabilities;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use receipt::{build_receipt, ReceiptData};
pub use repository::audit::AuditRepository;
pub use repository::closing::ClosingRepository;
pub use repository::customer::CustomerRepository;
pub use repository::intake::IntakeRepository;
pub use repository::operator::OperatorRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::store_info::StoreInfoRepository;
