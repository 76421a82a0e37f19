//! # Restaurant Repository
//!
//! Database operations for restaurants (tenants).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use comanda_core::Restaurant;

/// Repository for restaurant database operations.
#[derive(Debug, Clone)]
pub struct RestaurantRepository {
    pool: SqlitePool,
}

impl RestaurantRepository {
    /// Creates a new RestaurantRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RestaurantRepository { pool }
    }

    /// Inserts a restaurant.
    pub async fn insert(&self, restaurant: &Restaurant) -> DbResult<()> {
        debug!(id = %restaurant.id, name = %restaurant.name, "Inserting restaurant");

        sqlx::query(
            r#"
            INSERT INTO restaurants (
                id, name, email, phone, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&restaurant.id)
        .bind(&restaurant.name)
        .bind(&restaurant.email)
        .bind(&restaurant.phone)
        .bind(restaurant.is_active)
        .bind(restaurant.created_at)
        .bind(restaurant.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a restaurant by ID (active or not).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Restaurant>> {
        let restaurant = sqlx::query_as::<_, Restaurant>(
            r#"
            SELECT id, name, email, phone, is_active, created_at, updated_at
            FROM restaurants
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(restaurant)
    }

    /// Gets an active restaurant by ID, failing with NotFound otherwise.
    pub async fn get_active(&self, id: &str) -> DbResult<Restaurant> {
        self.get_by_id(id)
            .await?
            .filter(|r| r.is_active)
            .ok_or_else(|| DbError::not_found("Restaurant", id))
    }

    /// Lists all active restaurants.
    pub async fn list_active(&self) -> DbResult<Vec<Restaurant>> {
        let restaurants = sqlx::query_as::<_, Restaurant>(
            r#"
            SELECT id, name, email, phone, is_active, created_at, updated_at
            FROM restaurants
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(restaurants)
    }

    /// Soft-deactivates a restaurant.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE restaurants SET is_active = 0, updated_at = ?2
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Restaurant", id));
        }

        Ok(())
    }
}
