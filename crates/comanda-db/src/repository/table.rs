//! # Dining Table Repository
//!
//! Database operations for dining tables.
//!
//! Tables are soft-deactivated, never deleted: historical orders keep a
//! valid `table_id` reference forever.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use comanda_core::DiningTable;

const TABLE_COLUMNS: &str =
    "id, restaurant_id, number, capacity, location, is_active, created_at, updated_at";

/// Repository for dining table database operations.
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    /// Creates a new TableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    /// Inserts a table.
    ///
    /// ## Errors
    /// `UniqueViolation` when the (restaurant, number) pair already exists.
    pub async fn insert(&self, table: &DiningTable) -> DbResult<()> {
        debug!(id = %table.id, number = table.number, "Inserting dining table");

        sqlx::query(
            r#"
            INSERT INTO dining_tables (
                id, restaurant_id, number, capacity, location,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&table.id)
        .bind(&table.restaurant_id)
        .bind(table.number)
        .bind(table.capacity)
        .bind(&table.location)
        .bind(table.is_active)
        .bind(table.created_at)
        .bind(table.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a table by ID (active or not).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<DiningTable>> {
        let table = sqlx::query_as::<_, DiningTable>(&format!(
            "SELECT {TABLE_COLUMNS} FROM dining_tables WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    /// Gets an active table by ID, failing with NotFound otherwise.
    ///
    /// This is the lookup the order builder uses: an inactive table behaves
    /// exactly like a missing one.
    pub async fn get_active(&self, id: &str) -> DbResult<DiningTable> {
        self.get_by_id(id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| DbError::not_found("Table", id))
    }

    /// Lists active tables for a restaurant, ordered by table number.
    pub async fn list_active(&self, restaurant_id: &str) -> DbResult<Vec<DiningTable>> {
        let tables = sqlx::query_as::<_, DiningTable>(&format!(
            r#"
            SELECT {TABLE_COLUMNS} FROM dining_tables
            WHERE restaurant_id = ?1 AND is_active = 1
            ORDER BY number
            "#
        ))
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    /// Updates a table's capacity and location.
    pub async fn update(&self, table: &DiningTable) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE dining_tables SET
                capacity = ?2,
                location = ?3,
                updated_at = ?4
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(&table.id)
        .bind(table.capacity)
        .bind(&table.location)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Table", &table.id));
        }

        Ok(())
    }

    /// Soft-deactivates a table.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE dining_tables SET is_active = 0, updated_at = ?2
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Table", id));
        }

        Ok(())
    }
}
