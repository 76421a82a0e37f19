//! # comanda-core: Pure Business Logic for Comanda
//!
//! This crate is the **heart** of Comanda. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Comanda Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 comanda-service (Orchestration)                 │   │
//! │  │    create_order, pay_order, validate_coupon, catalog CRUD      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ comanda-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  coupon   │  │   order   │  │   │
//! │  │   │  MenuItem │  │   Money   │  │  Coupon   │  │  pricing  │  │   │
//! │  │   │   Order   │  │  percent  │  │ validity  │  │  states   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  comanda-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Restaurant, DiningTable, MenuItem, Order, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`coupon`] - Coupon validity checks and discount computation
//! - [`order`] - Order pricing, state machine, order-number format
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **No Clock**: `now` is always a parameter, never read here
//! 4. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 5. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use comanda_core::coupon::{Coupon, DiscountKind};
//! use comanda_core::money::Money;
//!
//! let now = Utc::now();
//! let coupon = Coupon {
//!     id: "c-1".into(),
//!     code: "VERANO-10".into(),
//!     description: None,
//!     kind: DiscountKind::Percentage,
//!     percentage_bps: 1000, // 10%
//!     fixed_amount_cents: 0,
//!     starts_at: now - Duration::days(1),
//!     expires_at: now + Duration::days(30),
//!     max_redemptions: None,
//!     current_redemptions: 0,
//!     minimum_subtotal_cents: 0,
//!     discount_cap_cents: None,
//!     restaurant_id: None,
//!     is_active: true,
//!     created_at: now,
//!     updated_at: now,
//! };
//!
//! assert!(coupon.check_validity(now).is_ok());
//!
//! // 10% of $25.00 = $2.50
//! let discount = coupon.discount_for(Money::from_cents(2500));
//! assert_eq!(discount.cents(), 250);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coupon;
pub mod error;
pub mod money;
pub mod order;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use comanda_core::Money` instead of
// `use comanda_core::money::Money`

pub use coupon::{Coupon, CouponRedemption, CouponRejection, DiscountKind};
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use order::TotalPolicy;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single order
///
/// ## Business Reason
/// Prevents runaway orders and keeps tickets printable.
/// Can be made configurable per-restaurant in future versions.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity of a single line item
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// Also bounds the order-number-independent arithmetic comfortably.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of a per-item note.
pub const MAX_ITEM_NOTE_LEN: usize = 200;

/// Maximum length of free-text order notes.
pub const MAX_ORDER_NOTES_LEN: usize = 500;

/// Maximum length of a menu item name.
pub const MAX_MENU_ITEM_NAME_LEN: usize = 100;

/// Maximum length of a coupon description.
pub const MAX_COUPON_DESCRIPTION_LEN: usize = 500;
