//! # Coupon Entity
//!
//! Coupon validity rules and discount calculation.
//!
//! ## Responsibilities
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Coupon (this module)                           │
//! │                                                                         │
//! │  ✅ OWNS                               ❌ DOES NOT OWN                  │
//! │  ──────────────────────                ─────────────────────────        │
//! │  • Validity window checks              • Redemption recording           │
//! │  • Redemption-limit check              │   (atomic conditional update   │
//! │  • Percentage / fixed-amount math      │    in comanda-db; the counter  │
//! │  • Discount cap clamp                  │    must never oversell)        │
//! │                                        • Restaurant-scope enforcement   │
//! │                                          (service layer, needs context) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both operations here are pure: the clock is passed in, and
//! [`Coupon::discount_for`] can be called any number of times without
//! touching redemption state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Discount Kind
// =============================================================================

/// How a coupon's discount is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `subtotal × percentage`. Rate stored in basis points (0..=10000).
    Percentage,
    /// A flat amount, NOT scaled by the subtotal.
    FixedAmount,
}

// =============================================================================
// Coupon
// =============================================================================

/// A discount coupon.
///
/// ## Invariants
/// - `code` is upper-case, `^[A-Z0-9-]{3,20}$` (enforced at creation)
/// - `percentage_bps <= 10000`
/// - `current_redemptions <= max_redemptions` whenever the max is set;
///   guaranteed by the conditional increment in the coupon repository
/// - validity window is half-open: `[starts_at, expires_at)`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Coupon {
    pub id: String,
    /// Unique business code, normalized to upper-case ("VERANO-10").
    pub code: String,
    pub description: Option<String>,
    pub kind: DiscountKind,
    /// Percentage rate in basis points (1000 = 10%). Used when
    /// `kind == Percentage`.
    pub percentage_bps: u32,
    /// Flat discount in cents. Used when `kind == FixedAmount`.
    pub fixed_amount_cents: i64,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// None = unlimited redemptions.
    pub max_redemptions: Option<i64>,
    /// Monotonically increasing; never decremented, not even on cancellation.
    pub current_redemptions: i64,
    /// Order subtotal required before this coupon may be applied.
    pub minimum_subtotal_cents: i64,
    /// Optional upper bound on the absolute discount granted.
    pub discount_cap_cents: Option<i64>,
    /// None = valid at every restaurant.
    pub restaurant_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Rejection Reasons
// =============================================================================

/// Why a coupon failed validation. Exactly one reason is reported: the checks
/// run in a fixed priority order and the first failure wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponRejection {
    Deactivated,
    NotYetStarted,
    Expired,
    RedemptionLimitReached,
}

impl fmt::Display for CouponRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CouponRejection::Deactivated => "coupon is deactivated",
            CouponRejection::NotYetStarted => "coupon is not yet available",
            CouponRejection::Expired => "coupon has expired",
            CouponRejection::RedemptionLimitReached => "coupon redemption limit reached",
        };
        f.write_str(msg)
    }
}

impl Coupon {
    /// Checks whether the coupon can be redeemed at `now`.
    ///
    /// ## Check priority
    /// 1. `Deactivated` — `is_active` is false
    /// 2. `NotYetStarted` — `now < starts_at`
    /// 3. `Expired` — `now >= expires_at` (half-open window)
    /// 4. `RedemptionLimitReached` — max set and `current >= max`
    ///
    /// The first failing check's reason is returned; passing all four means
    /// the coupon is valid.
    pub fn check_validity(&self, now: DateTime<Utc>) -> Result<(), CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::Deactivated);
        }

        if now < self.starts_at {
            return Err(CouponRejection::NotYetStarted);
        }

        if now >= self.expires_at {
            return Err(CouponRejection::Expired);
        }

        if let Some(max) = self.max_redemptions {
            if self.current_redemptions >= max {
                return Err(CouponRejection::RedemptionLimitReached);
            }
        }

        Ok(())
    }

    /// Computes the discount this coupon grants on `subtotal`.
    ///
    /// Pure and idempotent: no redemption state is touched, and repeated
    /// calls with the same inputs return the same amount.
    ///
    /// ## Semantics
    /// - `Percentage`: `subtotal × bps / 10000`, half-up rounded
    /// - `FixedAmount`: the flat amount, regardless of subtotal
    /// - Result clamped to `discount_cap_cents` when a cap is configured
    /// - NOT clamped to the subtotal itself — keeping the order total from
    ///   going negative is the caller's policy (see `crate::order`)
    pub fn discount_for(&self, subtotal: Money) -> Money {
        let raw = match self.kind {
            DiscountKind::Percentage => subtotal.percent_bps(self.percentage_bps),
            DiscountKind::FixedAmount => Money::from_cents(self.fixed_amount_cents),
        };

        match self.discount_cap_cents {
            Some(cap) => raw.min(Money::from_cents(cap)),
            None => raw,
        }
    }

    /// Whether `subtotal` satisfies the coupon's minimum.
    #[inline]
    pub fn meets_minimum(&self, subtotal: Money) -> bool {
        subtotal.cents() >= self.minimum_subtotal_cents
    }

    /// Whether the coupon applies at the given restaurant.
    /// A coupon with no restaurant scope is global.
    #[inline]
    pub fn applies_to_restaurant(&self, restaurant_id: &str) -> bool {
        match &self.restaurant_id {
            Some(scope) => scope == restaurant_id,
            None => true,
        }
    }
}

// =============================================================================
// Redemption Ledger Entry
// =============================================================================

/// One row of the append-only redemption ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CouponRedemption {
    pub id: String,
    pub coupon_id: String,
    /// The order this redemption paid into.
    pub order_id: String,
    /// Authenticated caller, or the configured anonymous sentinel.
    pub redeemed_by: String,
    pub redeemed_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
