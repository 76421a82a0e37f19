//! # Coupon Repository
//!
//! Database operations for coupons and the redemption ledger.
//!
//! ## Atomic Redemption
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  try_record_redemption                                  │
//! │                                                                         │
//! │  BEGIN TRANSACTION                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE coupons                                                         │
//! │     SET current_redemptions = current_redemptions + 1                   │
//! │   WHERE id = ?                                                          │
//! │     AND (max_redemptions IS NULL                                        │
//! │          OR current_redemptions < max_redemptions)                      │
//! │       │                                                                 │
//! │       ├── 0 rows affected → ROLLBACK, return Ok(false)                  │
//! │       │   (limit reached; caller decides what that means)               │
//! │       ▼                                                                 │
//! │  INSERT INTO coupon_redemptions (ledger row)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT, return Ok(true)                                                │
//! │                                                                         │
//! │  The guard lives in the WHERE clause, so two racing redeemers of the    │
//! │  last slot can never both succeed.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use comanda_core::{Coupon, CouponRedemption};

const COUPON_COLUMNS: &str = "id, code, description, kind, percentage_bps, \
     fixed_amount_cents, starts_at, expires_at, max_redemptions, \
     current_redemptions, minimum_subtotal_cents, discount_cap_cents, \
     restaurant_id, is_active, created_at, updated_at";

/// Repository for coupon database operations.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    /// Creates a new CouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Inserts a coupon.
    ///
    /// ## Errors
    /// `UniqueViolation` when the code is already taken.
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<()> {
        debug!(id = %coupon.id, code = %coupon.code, "Inserting coupon");

        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code, description, kind, percentage_bps,
                fixed_amount_cents, starts_at, expires_at, max_redemptions,
                current_redemptions, minimum_subtotal_cents, discount_cap_cents,
                restaurant_id, is_active, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12,
                ?13, ?14, ?15, ?16
            )
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(&coupon.description)
        .bind(coupon.kind)
        .bind(coupon.percentage_bps)
        .bind(coupon.fixed_amount_cents)
        .bind(coupon.starts_at)
        .bind(coupon.expires_at)
        .bind(coupon.max_redemptions)
        .bind(coupon.current_redemptions)
        .bind(coupon.minimum_subtotal_cents)
        .bind(coupon.discount_cap_cents)
        .bind(&coupon.restaurant_id)
        .bind(coupon.is_active)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a coupon by ID (active or not).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Coupon>> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// Gets a coupon by its (normalized, upper-case) code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// Lists coupons visible to a restaurant: its own plus global ones.
    pub async fn list_for_restaurant(&self, restaurant_id: &str) -> DbResult<Vec<Coupon>> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            r#"
            SELECT {COUPON_COLUMNS} FROM coupons
            WHERE restaurant_id = ?1 OR restaurant_id IS NULL
            ORDER BY code
            "#
        ))
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(coupons)
    }

    /// Activates or deactivates a coupon.
    ///
    /// Deactivation is the soft kill switch: the coupon keeps its window,
    /// counters and ledger, it just stops validating.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE coupons SET is_active = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", id));
        }

        Ok(())
    }

    /// Atomically consumes one redemption slot and writes the ledger row.
    ///
    /// ## Returns
    /// * `Ok(true)` - slot consumed, ledger row written
    /// * `Ok(false)` - redemption limit already reached; nothing written
    ///
    /// The counter increment and the ledger insert share one transaction,
    /// so the counter always equals the number of ledger rows.
    pub async fn try_record_redemption(
        &self,
        coupon_id: &str,
        order_id: &str,
        redeemed_by: &str,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE coupons SET
                current_redemptions = current_redemptions + 1,
                updated_at = ?2
            WHERE id = ?1
              AND is_active = 1
              AND (max_redemptions IS NULL
                   OR current_redemptions < max_redemptions)
            "#,
        )
        .bind(coupon_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            debug!(coupon_id = %coupon_id, "Redemption slot unavailable");
            return Ok(false);
        }

        let ledger_id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO coupon_redemptions (
                id, coupon_id, order_id, redeemed_by, redeemed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&ledger_id)
        .bind(coupon_id)
        .bind(order_id)
        .bind(redeemed_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(coupon_id = %coupon_id, order_id = %order_id, "Redemption recorded");
        Ok(true)
    }

    /// Permanently deletes a coupon and its redemption ledger.
    ///
    /// ## Errors
    /// * `NotFound` when the coupon does not exist
    /// * `ForeignKeyViolation` when historical orders still reference the
    ///   coupon; those must keep their discount record, so deactivate instead
    pub async fn delete_permanent(&self, id: &str) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query("DELETE FROM coupon_redemptions WHERE coupon_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM coupons WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            return Err(DbError::not_found("Coupon", id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(id = %id, "Coupon permanently deleted");
        Ok(())
    }

    /// Lists the redemption ledger for a coupon, oldest first.
    pub async fn redemptions(&self, coupon_id: &str) -> DbResult<Vec<CouponRedemption>> {
        let rows = sqlx::query_as::<_, CouponRedemption>(
            r#"
            SELECT id, coupon_id, order_id, redeemed_by, redeemed_at
            FROM coupon_redemptions
            WHERE coupon_id = ?1
            ORDER BY redeemed_at
            "#,
        )
        .bind(coupon_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use comanda_core::DiscountKind;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sample_coupon(code: &str, max_redemptions: Option<i64>) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            description: None,
            kind: DiscountKind::Percentage,
            percentage_bps: 1000,
            fixed_amount_cents: 0,
            starts_at: now - Duration::days(1),
            expires_at: now + Duration::days(30),
            max_redemptions,
            current_redemptions: 0,
            minimum_subtotal_cents: 0,
            discount_cap_cents: None,
            restaurant_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_by_code() {
        let db = test_db().await;
        let coupon = sample_coupon("VERANO-10", None);
        db.coupons().insert(&coupon).await.unwrap();

        let found = db.coupons().get_by_code("VERANO-10").await.unwrap().unwrap();
        assert_eq!(found.id, coupon.id);
        assert_eq!(found.percentage_bps, 1000);

        assert!(db.coupons().get_by_code("NADA").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = test_db().await;
        db.coupons().insert(&sample_coupon("DOBLE", None)).await.unwrap();

        let err = db
            .coupons()
            .insert(&sample_coupon("DOBLE", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_redemption_counter_never_overshoots() {
        let db = test_db().await;
        let coupon = sample_coupon("LIMITADO", Some(3));
        db.coupons().insert(&coupon).await.unwrap();

        let now = Utc::now();
        let mut granted = 0;
        for i in 0..5 {
            let ok = db
                .coupons()
                .try_record_redemption(&coupon.id, &format!("order-{i}"), "anon", now)
                .await
                .unwrap();
            if ok {
                granted += 1;
            }
        }

        // Exactly max slots granted, and the ledger agrees with the counter.
        assert_eq!(granted, 3);
        let fresh = db.coupons().get_by_id(&coupon.id).await.unwrap().unwrap();
        assert_eq!(fresh.current_redemptions, 3);
        assert_eq!(db.coupons().redemptions(&coupon.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_redemptions_respect_limit() {
        // File-backed pool so the racing redeemers hold separate connections.
        let path = std::env::temp_dir().join(format!("comanda-test-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(8))
            .await
            .unwrap();

        let coupon = sample_coupon("CARRERA", Some(3));
        db.coupons().insert(&coupon).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let repo = db.coupons();
            let coupon_id = coupon.id.clone();
            handles.push(tokio::spawn(async move {
                repo.try_record_redemption(&coupon_id, &format!("order-{i}"), "anon", Utc::now())
                    .await
                    .unwrap()
            }));
        }

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                granted += 1;
            }
        }

        // The last slot can only be won once.
        assert_eq!(granted, 3);
        let fresh = db.coupons().get_by_id(&coupon.id).await.unwrap().unwrap();
        assert_eq!(fresh.current_redemptions, 3);
        assert_eq!(db.coupons().redemptions(&coupon.id).await.unwrap().len(), 3);

        db.close().await;
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }

    #[tokio::test]
    async fn test_unlimited_coupon_always_redeems() {
        let db = test_db().await;
        let coupon = sample_coupon("SIEMPRE", None);
        db.coupons().insert(&coupon).await.unwrap();

        let now = Utc::now();
        for i in 0..10 {
            assert!(db
                .coupons()
                .try_record_redemption(&coupon.id, &format!("order-{i}"), "anon", now)
                .await
                .unwrap());
        }

        let fresh = db.coupons().get_by_id(&coupon.id).await.unwrap().unwrap();
        assert_eq!(fresh.current_redemptions, 10);
    }

    #[tokio::test]
    async fn test_deactivated_coupon_cannot_redeem() {
        let db = test_db().await;
        let coupon = sample_coupon("APAGADO", None);
        db.coupons().insert(&coupon).await.unwrap();
        db.coupons().set_active(&coupon.id, false).await.unwrap();

        let ok = db
            .coupons()
            .try_record_redemption(&coupon.id, "order-1", "anon", Utc::now())
            .await
            .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_delete_permanent_removes_ledger() {
        let db = test_db().await;
        let coupon = sample_coupon("BORRAR", None);
        db.coupons().insert(&coupon).await.unwrap();
        db.coupons()
            .try_record_redemption(&coupon.id, "order-1", "anon", Utc::now())
            .await
            .unwrap();

        db.coupons().delete_permanent(&coupon.id).await.unwrap();

        assert!(db.coupons().get_by_id(&coupon.id).await.unwrap().is_none());
        assert!(db.coupons().redemptions(&coupon.id).await.unwrap().is_empty());

        let err = db.coupons().delete_permanent(&coupon.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_for_restaurant_includes_globals() {
        let db = test_db().await;

        // A global coupon and nothing scoped: every restaurant sees it.
        db.coupons().insert(&sample_coupon("GLOBAL", None)).await.unwrap();

        let visible = db.coupons().list_for_restaurant("r-any").await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].code, "GLOBAL");
    }
}
