//! Customer registry.
//!
//! Minimal on purpose: sales only need an optional customer reference for
//! account tracking, so this stays a flat create/lookup surface.

use crate::error::DbResult;
use caja_core::validation::validate_customer_name;
use caja_core::{CoreError, Customer, NewCustomer};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a customer and returns its id.
    pub async fn create(&self, new: &NewCustomer) -> DbResult<i64> {
        validate_customer_name(&new.name).map_err(CoreError::from)?;

        let result = sqlx::query(
            "INSERT INTO customers (name, document, phone, email, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(new.name.trim())
        .bind(new.document.as_deref())
        .bind(new.phone.as_deref())
        .bind(new.email.as_deref())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, name = %new.name.trim(), "Customer created");
        Ok(id)
    }

    /// Fetches a customer by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, document, phone, email, created_at
             FROM customers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    /// Lists customers ordered by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT id, name, document, phone, email, created_at
             FROM customers ORDER BY name LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }
}

// =============================================================================
// Tests
// =============================================================================
