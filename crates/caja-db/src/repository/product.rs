//! Product catalog repository.
//!
//! Catalog maintenance only: creation, edits, activation, and manual stock
//! corrections. Stock changes caused by selling or receiving goods go
//! through [`super::sale`] and [`super::intake`] so they stay transactional
//! with their ledgers.

use crate::error::{DbError, DbResult};
use caja_core::validation::{validate_barcode, validate_price, validate_product_name};
use caja_core::{CoreError, Money, Product, ProductInput, Quantity};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a product and returns its id.
    pub async fn create(&self, input: &ProductInput) -> DbResult<i64> {
        validate_product_name(&input.name).map_err(CoreError::from)?;
        validate_price(input.price).map_err(CoreError::from)?;
        if let Some(barcode) = &input.barcode {
            validate_barcode(barcode).map_err(CoreError::from)?;
        }

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO products (name, price_cents, stock_milli, is_active, barcode, created_at, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4, ?5, ?5)",
        )
        .bind(input.name.trim())
        .bind(input.price.cents())
        .bind(input.stock.map(|q| q.milli()))
        .bind(input.barcode.as_deref())
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, name = %input.name.trim(), "Product created");
        Ok(id)
    }

    /// Fetches a product by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price_cents, stock_milli, is_active, barcode, created_at, updated_at
             FROM products WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    /// Fetches a product by barcode (scanner path).
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price_cents, stock_milli, is_active, barcode, created_at, updated_at
             FROM products WHERE barcode = ?1",
        )
        .bind(barcode.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    /// Case-insensitive substring search over active product names.
    ///
    /// An empty query lists active products instead.
    pub async fn search_by_name(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return self.list_active(limit).await;
        }

        let pattern = format!("%{}%", trimmed);
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, price_cents, stock_milli, is_active, barcode, created_at, updated_at
             FROM products
             WHERE is_active = 1 AND name LIKE ?1
             ORDER BY name
             LIMIT ?2",
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Lists active products ordered by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, price_cents, stock_milli, is_active, barcode, created_at, updated_at
             FROM products
             WHERE is_active = 1
             ORDER BY name
             LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Overwrites every editable field, including absolute stock.
    pub async fn update(&self, id: i64, input: &ProductInput) -> DbResult<()> {
        validate_product_name(&input.name).map_err(CoreError::from)?;
        validate_price(input.price).map_err(CoreError::from)?;
        if let Some(barcode) = &input.barcode {
            validate_barcode(barcode).map_err(CoreError::from)?;
        }

        let result = sqlx::query(
            "UPDATE products
             SET name = ?2, price_cents = ?3, stock_milli = ?4, barcode = ?5, updated_at = ?6
             WHERE id = ?1",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.price.cents())
        .bind(input.stock.map(|q| q.milli()))
        .bind(input.barcode.as_deref())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        debug!(id, "Product updated");
        Ok(())
    }

    /// Activates or deactivates a product. Deactivated products are hidden
    /// from search and refuse intakes; historical sales keep referencing
    /// them.
    pub async fn set_active(&self, id: i64, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE products SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        debug!(id, active, "Product active flag set");
        Ok(())
    }

    /// Changes the sale price without touching anything else.
    pub async fn set_price(&self, id: i64, price: Money) -> DbResult<()> {
        validate_price(price).map_err(CoreError::from)?;

        let result = sqlx::query("UPDATE products SET price_cents = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(price.cents())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        debug!(id, price = %price, "Price changed");
        Ok(())
    }

    /// Applies a manual stock correction and returns the new level.
    ///
    /// Untracked products are treated as starting from zero, which turns
    /// them into tracked products. Corrections that would leave negative
    /// stock are refused.
    pub async fn adjust_stock(&self, id: i64, delta: Quantity) -> DbResult<Quantity> {
        let mut tx = self.pool.begin().await?;

        let stock: Option<Option<i64>> =
            sqlx::query_scalar("SELECT stock_milli FROM products WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(stock) = stock else {
            return Err(DbError::not_found("Product", id));
        };

        let current = stock.unwrap_or(0);
        let new_stock = current + delta.milli();
        if new_stock < 0 {
            return Err(CoreError::InsufficientStock {
                product_id: id,
                available: Quantity::from_milli(current),
                requested: Quantity::from_milli(-delta.milli()),
            }
            .into());
        }

        sqlx::query("UPDATE products SET stock_milli = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(new_stock)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(id, delta = %delta, new_stock, "Stock adjusted");
        Ok(Quantity::from_milli(new_stock))
    }

    /// Total number of products, active or not.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Tests
// =============================================================================
