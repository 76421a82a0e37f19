//! # Coupon Service
//!
//! Coupon management and the dry-run validation endpoint.
//!
//! ## Validation vs Redemption
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  quote()               - answers "what would this coupon do?"          │
//! │                          Pure read; asking consumes NOTHING.           │
//! │                                                                         │
//! │  OrderService          - the only consumer of redemption slots,        │
//! │                          via CouponRepository::try_record_redemption.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use comanda_core::validation::{
    validate_coupon_code, validate_coupon_description, validate_coupon_window,
    validate_non_negative_cents, validate_percentage_bps,
};
use comanda_core::{CoreError, Coupon, CouponRedemption, DiscountKind, Money};
use comanda_db::Database;

use crate::dto::{CouponQuote, CreateCouponRequest};
use crate::error::{ApiError, ApiResult};

/// Resolves a coupon code against a restaurant and subtotal, running the
/// full check chain. Shared by the quote endpoint and the order builder.
///
/// ## Check Order
/// 1. Unknown code → `CouponNotFound`
/// 2. Wrong restaurant scope → `CouponNotApplicable`
/// 3. Validity (deactivated / window / limit) → `CouponInvalid`
/// 4. Subtotal below minimum → `CouponBelowMinimum`
pub(crate) async fn resolve_coupon(
    db: &Database,
    restaurant_id: &str,
    code: &str,
    subtotal: Money,
    now: DateTime<Utc>,
) -> ApiResult<Coupon> {
    let code = validate_coupon_code(code).map_err(CoreError::from)?;

    let coupon = db
        .coupons()
        .get_by_code(&code)
        .await?
        .ok_or_else(|| CoreError::CouponNotFound(code.clone()))?;

    if !coupon.applies_to_restaurant(restaurant_id) {
        return Err(CoreError::CouponNotApplicable { code }.into());
    }

    coupon
        .check_validity(now)
        .map_err(|reason| CoreError::CouponInvalid {
            code: code.clone(),
            reason,
        })?;

    if !coupon.meets_minimum(subtotal) {
        return Err(CoreError::CouponBelowMinimum {
            minimum_cents: coupon.minimum_subtotal_cents,
        }
        .into());
    }

    Ok(coupon)
}

/// Coupon management operations.
#[derive(Debug, Clone)]
pub struct CouponService {
    db: Database,
}

impl CouponService {
    /// Creates a new CouponService.
    pub fn new(db: Database) -> Self {
        CouponService { db }
    }

    /// Creates a coupon.
    ///
    /// The code is normalized to upper-case; duplicates are a conflict.
    pub async fn create_coupon(&self, req: CreateCouponRequest) -> ApiResult<Coupon> {
        debug!(code = %req.code, "create_coupon");

        let code = validate_coupon_code(&req.code).map_err(CoreError::from)?;
        let description = match req.description.as_deref() {
            Some(d) => Some(validate_coupon_description(d).map_err(CoreError::from)?),
            None => None,
        };
        let now = Utc::now();
        validate_coupon_window(req.starts_at, req.expires_at, now).map_err(CoreError::from)?;
        validate_non_negative_cents("minimumSubtotalCents", req.minimum_subtotal_cents)
            .map_err(CoreError::from)?;

        match req.kind {
            DiscountKind::Percentage => {
                validate_percentage_bps(req.percentage_bps).map_err(CoreError::from)?;
                if req.percentage_bps == 0 {
                    return Err(ApiError::validation(
                        "percentage must be positive for a percentage coupon",
                    ));
                }
            }
            DiscountKind::FixedAmount => {
                if req.fixed_amount_cents <= 0 {
                    return Err(ApiError::validation(
                        "fixedAmountCents must be positive for a fixed-amount coupon",
                    ));
                }
            }
        }
        if let Some(max) = req.max_redemptions {
            if max <= 0 {
                return Err(ApiError::validation("maxRedemptions must be positive"));
            }
        }
        if let Some(cap) = req.discount_cap_cents {
            if cap <= 0 {
                return Err(ApiError::validation("discountCapCents must be positive"));
            }
        }

        let coupon = Coupon {
            id: Uuid::new_v4().to_string(),
            code,
            description,
            kind: req.kind,
            percentage_bps: req.percentage_bps,
            fixed_amount_cents: req.fixed_amount_cents,
            starts_at: req.starts_at,
            expires_at: req.expires_at,
            max_redemptions: req.max_redemptions,
            current_redemptions: 0,
            minimum_subtotal_cents: req.minimum_subtotal_cents,
            discount_cap_cents: req.discount_cap_cents,
            restaurant_id: req.restaurant_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.db.coupons().insert(&coupon).await?;

        info!(code = %coupon.code, kind = ?coupon.kind, "Coupon created");
        Ok(coupon)
    }

    /// Dry-run validation: what would this coupon do to this subtotal?
    ///
    /// Runs the identical check chain the order builder uses, but consumes
    /// nothing; calling it any number of times changes no state.
    pub async fn quote(
        &self,
        restaurant_id: &str,
        code: &str,
        subtotal_cents: i64,
    ) -> ApiResult<CouponQuote> {
        validate_non_negative_cents("subtotalCents", subtotal_cents).map_err(CoreError::from)?;
        let subtotal = Money::from_cents(subtotal_cents);

        let coupon = resolve_coupon(&self.db, restaurant_id, code, subtotal, Utc::now()).await?;
        let discount = coupon.discount_for(subtotal);

        Ok(CouponQuote {
            code: coupon.code,
            discount_cents: discount.cents(),
            subtotal_cents,
            subtotal_after_cents: (subtotal - discount).clamp_non_negative().cents(),
        })
    }

    /// Gets a coupon by its code.
    pub async fn get_coupon(&self, code: &str) -> ApiResult<Coupon> {
        let code = validate_coupon_code(code).map_err(CoreError::from)?;
        self.db
            .coupons()
            .get_by_code(&code)
            .await?
            .ok_or_else(|| CoreError::CouponNotFound(code).into())
    }

    /// Lists coupons visible to a restaurant (its own plus globals).
    pub async fn list_coupons(&self, restaurant_id: &str) -> ApiResult<Vec<Coupon>> {
        Ok(self.db.coupons().list_for_restaurant(restaurant_id).await?)
    }

    /// Reactivates a coupon.
    pub async fn activate(&self, id: &str) -> ApiResult<()> {
        self.db.coupons().set_active(id, true).await?;
        info!(id = %id, "Coupon activated");
        Ok(())
    }

    /// Deactivates a coupon. Existing orders keep their discounts.
    pub async fn deactivate(&self, id: &str) -> ApiResult<()> {
        self.db.coupons().set_active(id, false).await?;
        info!(id = %id, "Coupon deactivated");
        Ok(())
    }

    /// Permanently deletes a coupon and its ledger. Fails while historical
    /// orders still reference it; deactivate those coupons instead.
    pub async fn delete_coupon(&self, id: &str) -> ApiResult<()> {
        self.db.coupons().delete_permanent(id).await?;
        info!(id = %id, "Coupon permanently deleted");
        Ok(())
    }

    /// Lists the redemption ledger for a coupon.
    pub async fn redemptions(&self, coupon_id: &str) -> ApiResult<Vec<CouponRedemption>> {
        Ok(self.db.coupons().redemptions(coupon_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use comanda_db::DbConfig;

    use crate::catalog::CatalogService;
    use crate::error::ErrorCode;

    async fn service() -> CouponService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CouponService::new(db)
    }

    fn percentage_request(code: &str, bps: u32) -> CreateCouponRequest {
        let now = Utc::now();
        CreateCouponRequest {
            code: code.to_string(),
            description: None,
            kind: DiscountKind::Percentage,
            percentage_bps: bps,
            fixed_amount_cents: 0,
            starts_at: now - Duration::days(1),
            expires_at: now + Duration::days(30),
            max_redemptions: None,
            minimum_subtotal_cents: 0,
            discount_cap_cents: None,
            restaurant_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_code() {
        let svc = service().await;
        let coupon = svc
            .create_coupon(percentage_request("  verano-10 ", 1000))
            .await
            .unwrap();
        assert_eq!(coupon.code, "VERANO-10");
        assert!(coupon.is_active);

        // Lookup is normalized the same way.
        let found = svc.get_coupon("verano-10").await.unwrap();
        assert_eq!(found.id, coupon.id);
    }

    #[tokio::test]
    async fn test_duplicate_code_is_conflict() {
        let svc = service().await;
        svc.create_coupon(percentage_request("VERANO-10", 1000))
            .await
            .unwrap();

        let err = svc
            .create_coupon(percentage_request("VERANO-10", 500))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_kind_consistency_enforced() {
        let svc = service().await;

        // A percentage coupon with no percentage makes no sense.
        let err = svc
            .create_coupon(percentage_request("ZERO", 0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // Neither does a fixed-amount coupon with no amount.
        let req = CreateCouponRequest {
            kind: DiscountKind::FixedAmount,
            percentage_bps: 0,
            ..percentage_request("FIXED", 0)
        };
        let err = svc.create_coupon(req).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_overlong_description_rejected() {
        let svc = service().await;
        let req = CreateCouponRequest {
            description: Some("x".repeat(501)),
            ..percentage_request("CHARLA", 1000)
        };
        let err = svc.create_coupon(req).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // At the bound it goes through.
        let req = CreateCouponRequest {
            description: Some("x".repeat(500)),
            ..percentage_request("CHARLA", 1000)
        };
        assert!(svc.create_coupon(req).await.is_ok());
    }

    #[tokio::test]
    async fn test_inverted_window_rejected() {
        let svc = service().await;
        let now = Utc::now();
        let req = CreateCouponRequest {
            starts_at: now + Duration::days(10),
            expires_at: now + Duration::days(1),
            ..percentage_request("BACKWARDS", 1000)
        };

        let err = svc.create_coupon(req).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_quote_computes_discount_without_consuming() {
        let svc = service().await;
        let coupon = svc
            .create_coupon(percentage_request("VERANO-10", 1000))
            .await
            .unwrap();

        // Ask three times; the answer never changes and nothing is spent.
        for _ in 0..3 {
            let quote = svc.quote("r-1", "VERANO-10", 2500).await.unwrap();
            assert_eq!(quote.discount_cents, 250);
            assert_eq!(quote.subtotal_after_cents, 2250);
        }

        let stored = svc.get_coupon("VERANO-10").await.unwrap();
        assert_eq!(stored.current_redemptions, 0);
        assert!(svc.redemptions(&coupon.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quote_unknown_code_not_found() {
        let svc = service().await;
        let err = svc.quote("r-1", "NADA", 2500).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_quote_expired_coupon_rejected() {
        let svc = service().await;
        let now = Utc::now();
        // Window entirely in the future, so the coupon is not yet usable.
        let req = CreateCouponRequest {
            starts_at: now + Duration::days(5),
            expires_at: now + Duration::days(10),
            ..percentage_request("PRONTO", 1000)
        };
        svc.create_coupon(req).await.unwrap();

        let err = svc.quote("r-1", "PRONTO", 2500).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("PRONTO"));
    }

    #[tokio::test]
    async fn test_quote_deactivated_coupon_rejected() {
        let svc = service().await;
        let coupon = svc
            .create_coupon(percentage_request("APAGADO", 1000))
            .await
            .unwrap();
        svc.deactivate(&coupon.id).await.unwrap();

        let err = svc.quote("r-1", "APAGADO", 2500).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // Reactivation brings it back.
        svc.activate(&coupon.id).await.unwrap();
        let quote = svc.quote("r-1", "APAGADO", 2500).await.unwrap();
        assert_eq!(quote.discount_cents, 250);
    }

    #[tokio::test]
    async fn test_quote_below_minimum_names_the_minimum() {
        let svc = service().await;
        let req = CreateCouponRequest {
            minimum_subtotal_cents: 3000,
            ..percentage_request("GRANDE", 1000)
        };
        svc.create_coupon(req).await.unwrap();

        let err = svc.quote("r-1", "GRANDE", 2500).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("3000"));

        // At exactly the minimum it applies.
        let quote = svc.quote("r-1", "GRANDE", 3000).await.unwrap();
        assert_eq!(quote.discount_cents, 300);
    }

    #[tokio::test]
    async fn test_list_scoped_and_global() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = CatalogService::new(db.clone());
        let mine = catalog
            .create_restaurant("El Fogón", None, None)
            .await
            .unwrap();
        let other = catalog
            .create_restaurant("La Otra Esquina", None, None)
            .await
            .unwrap();
        let svc = CouponService::new(db);

        svc.create_coupon(percentage_request("GLOBAL", 1000))
            .await
            .unwrap();
        let req = CreateCouponRequest {
            restaurant_id: Some(mine.id.clone()),
            ..percentage_request("PROPIO", 500)
        };
        svc.create_coupon(req).await.unwrap();
        let req = CreateCouponRequest {
            restaurant_id: Some(other.id),
            ..percentage_request("AJENO", 500)
        };
        svc.create_coupon(req).await.unwrap();

        let visible = svc.list_coupons(&mine.id).await.unwrap();
        let codes: Vec<&str> = visible.iter().map(|c| c.code.as_str()).collect();
        assert!(codes.contains(&"GLOBAL"));
        assert!(codes.contains(&"PROPIO"));
        assert!(!codes.contains(&"AJENO"));
    }
}
