//! Database connection pool and configuration.
//!
//! ## Connection lifecycle
//!
//! ```text
//! ┌──────────┐     ┌─────────────────────────────────┐
//! │ DbConfig │ ──▶ │          Database::new          │
//! └──────────┘     │                                 │
//!                  │  1. open pool (WAL, FKs on)     │
//!                  │  2. run migrations              │
//!                  │  3. create optional tables      │
//!                  │     (only if configured)        │
//!                  │  4. probe capabilities once     │
//!                  └───────────────┬─────────────────┘
//!                                  ▼
//!                       Database { pool, caps }
//!                                  │
//!                  products() · sales() · intakes() · ...
//! ```
//!
//! The capability probe runs exactly once per open; repositories receive
//! a copy of the result and never query `sqlite_master` again.

use crate::capabilities::{self, Capabilities};
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::audit::AuditRepository;
use crate::repository::closing::ClosingRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::intake::IntakeRepository;
use crate::repository::operator::OperatorRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::store_info::StoreInfoRepository;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite file, or `:memory:` for tests.
    pub database_path: PathBuf,
    /// Maximum pool connections.
    pub max_connections: u32,
    /// Minimum idle connections to keep open.
    pub min_connections: u32,
    /// How long to wait for a connection from the pool.
    pub acquire_timeout: Duration,
    /// How long an idle connection may live.
    pub idle_timeout: Duration,
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout: Duration,
    /// Apply pending migrations on open.
    pub run_migrations: bool,
    /// Create the optional ledger tables (payments, stock_movements,
    /// price_history, audit_log) on open. Off by default; existing
    /// databases that already have them are detected either way.
    pub optional_tables: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig {
            database_path: PathBuf::from("caja.db"),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
            optional_tables: false,
        }
    }
}

impl DbConfig {
    /// Configuration for a file-backed database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig { database_path: path.into(), ..Default::default() }
    }

    /// Configuration for an in-memory database (tests).
    ///
    /// In-memory SQLite gives each connection its own private database, so
    /// the pool is capped at a single connection.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            ..Default::default()
        }
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Enables creation of the optional ledger tables on open.
    pub fn optional_tables(mut self, enabled: bool) -> Self {
        self.optional_tables = enabled;
        self
    }

    /// Skips migrations on open; the schema must already exist.
    pub fn skip_migrations(mut self) -> Self {
        self.run_migrations = false;
        self
    }
}

/// Handle to the POS database.
///
/// Cheap to clone; all clones share one pool and the capability snapshot
/// taken at open time. Repositories are handed out by the accessor
/// methods and borrow nothing, so they can be moved into tasks freely.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    caps: Capabilities,
}

impl Database {
    /// Opens the database, applies migrations, and probes capabilities.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening database");

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(config.busy_timeout)
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        if config.run_migrations {
            migrations::run_migrations(&pool).await?;
        }

        if config.optional_tables {
            capabilities::create_optional_tables(&pool).await?;
        }

        let caps = Capabilities::probe(&pool).await?;
        info!(
            payment_ledger = caps.payment_ledger,
            stock_movement = caps.stock_movement,
            price_history = caps.price_history,
            audit_log = caps.audit_log,
            "Database ready"
        );

        Ok(Database { pool, caps })
    }

    /// The capability snapshot taken when the database was opened.
    pub const fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Raw pool access, for ad-hoc queries outside the repositories.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone(), self.caps)
    }

    pub fn intakes(&self) -> IntakeRepository {
        IntakeRepository::new(self.pool.clone(), self.caps)
    }

    pub fn closings(&self) -> ClosingRepository {
        ClosingRepository::new(self.pool.clone(), self.caps)
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    pub fn operators(&self) -> OperatorRepository {
        OperatorRepository::new(self.pool.clone())
    }

    pub fn store_info(&self) -> StoreInfoRepository {
        StoreInfoRepository::new(self.pool.clone())
    }

    pub fn audit(&self) -> AuditRepository {
        AuditRepository::new(self.pool.clone(), self.caps)
    }

    /// Closes all pool connections gracefully.
    pub async fn close(&self) {
        info!("Closing database connections");
        self.pool.close().await;
    }

    /// Returns true if the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_opens_without_optional_tables() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        let caps = db.capabilities();
        assert!(!caps.payment_ledger);
        assert!(!caps.stock_movement);
        assert!(!caps.price_history);
        assert!(!caps.audit_log);
    }

    #[tokio::test]
    async fn test_optional_tables_created_when_configured() {
        let db = Database::new(DbConfig::in_memory().optional_tables(true)).await.unwrap();

        let caps = db.capabilities();
        assert!(caps.payment_ledger);
        assert!(caps.stock_movement);
        assert!(caps.price_history);
        assert!(caps.audit_log);
    }

    #[tokio::test]
    async fn test_reopened_file_keeps_probed_capabilities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caja.db");

        // first open creates the ledgers
        {
            let db = Database::new(DbConfig::new(&path).optional_tables(true)).await.unwrap();
            assert!(db.capabilities().payment_ledger);
            db.close().await;
        }

        // second open does not ask for them, but the probe still finds them
        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert!(db.capabilities().payment_ledger);
        assert!(db.capabilities().audit_log);
        db.close().await;
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/store.db")
            .max_connections(10)
            .busy_timeout(Duration::from_secs(2))
            .optional_tables(true);

        assert_eq!(config.database_path, PathBuf::from("/tmp/store.db"));
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.busy_timeout, Duration::from_secs(2));
        assert!(config.optional_tables);
        assert!(config.run_migrations);
    }
}
