//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Order Lifecycle (database view)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Persistence                                 │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── insert() → order row + item rows in one transaction            │
//! │                                                                         │
//! │  2. EDIT (pending only, decided by the service layer)                  │
//! │     └── update_pending() → rewrite row + replace items, version-checked│
//! │                                                                         │
//! │  3. ADVANCE                                                             │
//! │     └── update_status() → stamp delivered_at / paid_at as appropriate  │
//! │                                                                         │
//! │  4. CLOSE                                                               │
//! │     └── mark_paid() / mark_cancelled()                                 │
//! │                                                                         │
//! │  Every write carries WHERE version = ? and bumps the version; a zero   │
//! │  row count means a concurrent writer won and the caller gets           │
//! │  VersionConflict.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use comanda_core::{Order, OrderItem, OrderStatus, PaymentMethod};

const ORDER_COLUMNS: &str = "id, order_number, restaurant_id, table_id, \
     customer_name, customer_phone, subtotal_cents, tax_cents, \
     manual_discount_cents, coupon_discount_cents, coupon_id, coupon_code, \
     total_cents, status, payment_method, notes, delivered_at, paid_at, \
     is_active, version, created_at, updated_at";

/// Filters for listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Restrict to one lifecycle state.
    pub status: Option<OrderStatus>,
    /// Restrict to one table.
    pub table_id: Option<String>,
    /// Include soft-deleted orders. Default: active only.
    pub include_inactive: bool,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order with all its line items in one transaction.
    ///
    /// ## Errors
    /// `UniqueViolation` when the order number collides (the caller retries
    /// with a fresh suffix).
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, order_number = %order.order_number, "Inserting order");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, restaurant_id, table_id,
                customer_name, customer_phone, subtotal_cents, tax_cents,
                manual_discount_cents, coupon_discount_cents, coupon_id, coupon_code,
                total_cents, status, payment_method, notes, delivered_at, paid_at,
                is_active, version, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, ?8,
                ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17, ?18,
                ?19, ?20, ?21, ?22
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.restaurant_id)
        .bind(&order.table_id)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(order.subtotal_cents)
        .bind(order.tax_cents)
        .bind(order.manual_discount_cents)
        .bind(order.coupon_discount_cents)
        .bind(&order.coupon_id)
        .bind(&order.coupon_code)
        .bind(order.total_cents)
        .bind(order.status)
        .bind(order.payment_method)
        .bind(&order.notes)
        .bind(order.delivered_at)
        .bind(order.paid_at)
        .bind(order.is_active)
        .bind(order.version)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, &order.items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Gets an order by ID, with items loaded.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match order {
            Some(mut order) => {
                order.items = self.get_items(&order.id).await?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// Gets an order by its business number, with items loaded.
    pub async fn get_by_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = ?1"
        ))
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        match order {
            Some(mut order) => {
                order.items = self.get_items(&order.id).await?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// Checks whether an order number is already taken.
    pub async fn number_exists(&self, order_number: &str) -> DbResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE order_number = ?1")
                .bind(order_number)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Lists orders for a restaurant, newest first, with items loaded.
    pub async fn list(
        &self,
        restaurant_id: &str,
        filter: &OrderFilter,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Order>> {
        // NULL-tolerant predicates keep the SQL static while every filter
        // stays optional.
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE restaurant_id = ?1
              AND (?2 IS NULL OR status = ?2)
              AND (?3 IS NULL OR table_id = ?3)
              AND (is_active = 1 OR ?4)
            ORDER BY created_at DESC
            LIMIT ?5 OFFSET ?6
            "#
        ))
        .bind(restaurant_id)
        .bind(filter.status)
        .bind(filter.table_id.as_deref())
        .bind(filter.include_inactive)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(orders.len());
        for mut order in orders {
            order.items = self.get_items(&order.id).await?;
            result.push(order);
        }

        Ok(result)
    }

    /// Gets all line items for an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, menu_item_id, name_snapshot,
                   quantity, unit_price_cents, line_total_cents, note
            FROM order_items
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Rewrites a pending order: all editable fields plus the full item set.
    ///
    /// ## Optimistic Concurrency
    /// `order.version` must match the stored row. On success the stored
    /// version is bumped; on mismatch (or if the order left Pending since it
    /// was read) the result is `VersionConflict`.
    pub async fn update_pending(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, version = order.version, "Rewriting pending order");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                table_id = ?2,
                customer_name = ?3,
                customer_phone = ?4,
                subtotal_cents = ?5,
                tax_cents = ?6,
                manual_discount_cents = ?7,
                coupon_discount_cents = ?8,
                coupon_id = ?9,
                coupon_code = ?10,
                total_cents = ?11,
                notes = ?12,
                version = version + 1,
                updated_at = ?13
            WHERE id = ?1 AND version = ?14 AND status = 'pending'
            "#,
        )
        .bind(&order.id)
        .bind(&order.table_id)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(order.subtotal_cents)
        .bind(order.tax_cents)
        .bind(order.manual_discount_cents)
        .bind(order.coupon_discount_cents)
        .bind(&order.coupon_id)
        .bind(&order.coupon_code)
        .bind(order.total_cents)
        .bind(&order.notes)
        .bind(order.updated_at)
        .bind(order.version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            return Err(DbError::version_conflict("Order", &order.id));
        }

        sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
            .bind(&order.id)
            .execute(&mut *tx)
            .await?;

        insert_items(&mut tx, &order.items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Updates an order's lifecycle state, stamping milestone timestamps.
    ///
    /// ## Timestamp Stamping
    /// - `Ready` stamps `delivered_at` (first time only)
    /// - `Paid` stamps `paid_at`
    ///
    /// The caller has already run the state-machine check; this method only
    /// guards against concurrent writers via the version check.
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        version: i64,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(id = %id, status = ?status, "Updating order status");

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = ?2,
                delivered_at = CASE
                    WHEN ?2 = 'ready' AND delivered_at IS NULL THEN ?3
                    ELSE delivered_at
                END,
                paid_at = CASE WHEN ?2 = 'paid' THEN ?3 ELSE paid_at END,
                version = version + 1,
                updated_at = ?3
            WHERE id = ?1 AND version = ?4
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .bind(version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::version_conflict("Order", id));
        }

        Ok(())
    }

    /// Closes an order as paid with the given payment method.
    pub async fn mark_paid(
        &self,
        id: &str,
        method: PaymentMethod,
        version: i64,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(id = %id, method = ?method, "Marking order paid");

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = 'paid',
                payment_method = ?2,
                paid_at = ?3,
                version = version + 1,
                updated_at = ?3
            WHERE id = ?1 AND version = ?4
            "#,
        )
        .bind(id)
        .bind(method)
        .bind(now)
        .bind(version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::version_conflict("Order", id));
        }

        Ok(())
    }

    /// Closes an order as cancelled. `notes` carries the cancellation reason
    /// already composed by the caller.
    pub async fn mark_cancelled(
        &self,
        id: &str,
        notes: Option<&str>,
        version: i64,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(id = %id, "Cancelling order");

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = 'cancelled',
                notes = ?2,
                version = version + 1,
                updated_at = ?3
            WHERE id = ?1 AND version = ?4
            "#,
        )
        .bind(id)
        .bind(notes)
        .bind(now)
        .bind(version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::version_conflict("Order", id));
        }

        Ok(())
    }

    /// Soft-deletes an order (hides it from default listings).
    pub async fn soft_delete(&self, id: &str, now: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET is_active = 0, version = version + 1, updated_at = ?2
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    /// Permanently deletes an order and its items.
    ///
    /// Line items go via ON DELETE CASCADE. The redemption ledger is NOT
    /// touched: redemptions are historical facts.
    pub async fn delete_permanent(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Permanently deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }
}

/// Inserts line items inside an open transaction.
async fn insert_items(
    tx: &mut Transaction<'_, Sqlite>,
    items: &[OrderItem],
) -> DbResult<()> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, menu_item_id, name_snapshot,
                quantity, unit_price_cents, line_total_cents, note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.menu_item_id)
        .bind(&item.name_snapshot)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.line_total_cents)
        .bind(&item.note)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
