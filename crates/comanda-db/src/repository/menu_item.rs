//! # Menu Item Repository
//!
//! Database operations for menu items.
//!
//! ## Availability vs Active
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  is_active     - soft delete: item removed from the menu entirely       │
//! │  is_available  - temporary: out of stock today, back tomorrow           │
//! │                                                                         │
//! │  Orderable = is_active AND is_available                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use comanda_core::{MenuCategory, MenuItem};

const MENU_ITEM_COLUMNS: &str = "id, restaurant_id, name, category, price_cents, \
     is_available, is_active, created_at, updated_at";

/// Repository for menu item database operations.
#[derive(Debug, Clone)]
pub struct MenuItemRepository {
    pool: SqlitePool,
}

impl MenuItemRepository {
    /// Creates a new MenuItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MenuItemRepository { pool }
    }

    /// Inserts a menu item.
    pub async fn insert(&self, item: &MenuItem) -> DbResult<()> {
        debug!(id = %item.id, name = %item.name, "Inserting menu item");

        sqlx::query(
            r#"
            INSERT INTO menu_items (
                id, restaurant_id, name, category, price_cents,
                is_available, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&item.id)
        .bind(&item.restaurant_id)
        .bind(&item.name)
        .bind(item.category)
        .bind(item.price_cents)
        .bind(item.is_available)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a menu item by ID (active or not).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<MenuItem>> {
        let item = sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Gets an active menu item by ID, failing with NotFound otherwise.
    ///
    /// Availability is NOT checked here: the order builder distinguishes
    /// "not found" from "found but unavailable", so it needs the row back
    /// either way.
    pub async fn get_active(&self, id: &str) -> DbResult<MenuItem> {
        self.get_by_id(id)
            .await?
            .filter(|i| i.is_active)
            .ok_or_else(|| DbError::not_found("Menu item", id))
    }

    /// Lists active menu items for a restaurant, optionally by category.
    pub async fn list_active(
        &self,
        restaurant_id: &str,
        category: Option<MenuCategory>,
    ) -> DbResult<Vec<MenuItem>> {
        let items = match category {
            Some(cat) => {
                sqlx::query_as::<_, MenuItem>(&format!(
                    r#"
                    SELECT {MENU_ITEM_COLUMNS} FROM menu_items
                    WHERE restaurant_id = ?1 AND is_active = 1 AND category = ?2
                    ORDER BY name
                    "#
                ))
                .bind(restaurant_id)
                .bind(cat)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, MenuItem>(&format!(
                    r#"
                    SELECT {MENU_ITEM_COLUMNS} FROM menu_items
                    WHERE restaurant_id = ?1 AND is_active = 1
                    ORDER BY category, name
                    "#
                ))
                .bind(restaurant_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(items)
    }

    /// Updates a menu item's name, category and price.
    pub async fn update(&self, item: &MenuItem) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE menu_items SET
                name = ?2,
                category = ?3,
                price_cents = ?4,
                updated_at = ?5
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.category)
        .bind(item.price_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Menu item", &item.id));
        }

        Ok(())
    }

    /// Toggles temporary availability (out of stock / back in stock).
    pub async fn set_availability(&self, id: &str, available: bool) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE menu_items SET is_available = ?2, updated_at = ?3
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(available)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Menu item", id));
        }

        Ok(())
    }

    /// Soft-deactivates a menu item.
    ///
    /// Orders that already snapshot this item are unaffected.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE menu_items SET is_active = 0, updated_at = ?2
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Menu item", id));
        }

        Ok(())
    }
}
