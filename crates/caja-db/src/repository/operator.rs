//! Operator registry.
//!
//! Operators are referenced by intakes and named in closings and audit
//! rows. Authentication lives outside this crate; no credentials are
//! stored here.

use crate::error::{DbError, DbResult};
use caja_core::validation::validate_username;
use caja_core::{CoreError, NewOperator, Operator};
use sqlx::SqlitePool;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct OperatorRepository {
    pool: SqlitePool,
}

impl OperatorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates an operator and returns its id. A blank display name falls
    /// back to the username.
    pub async fn create(&self, new: &NewOperator) -> DbResult<i64> {
        validate_username(&new.username).map_err(CoreError::from)?;

        let username = new.username.trim();
        let display_name =
            if new.display_name.trim().is_empty() { username } else { new.display_name.trim() };

        let result = sqlx::query(
            "INSERT INTO operators (username, display_name, role, is_active)
             VALUES (?1, ?2, ?3, 1)",
        )
        .bind(username)
        .bind(display_name)
        .bind(&new.role)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, username, "Operator created");
        Ok(id)
    }

    /// Fetches an operator by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Operator>> {
        let operator = sqlx::query_as::<_, Operator>(
            "SELECT id, username, display_name, role, is_active
             FROM operators WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(operator)
    }

    /// Fetches an operator by username (login path).
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<Operator>> {
        let operator = sqlx::query_as::<_, Operator>(
            "SELECT id, username, display_name, role, is_active
             FROM operators WHERE username = ?1",
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(operator)
    }

    /// Lists active operators ordered by username.
    pub async fn list_active(&self) -> DbResult<Vec<Operator>> {
        let operators = sqlx::query_as::<_, Operator>(
            "SELECT id, username, display_name, role, is_active
             FROM operators WHERE is_active = 1 ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(operators)
    }

    /// Activates or deactivates an operator.
    pub async fn set_active(&self, id: i64, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE operators SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Operator", id));
        }
        debug!(id, active, "Operator active flag set");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
