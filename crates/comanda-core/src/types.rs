//! # Domain Types
//!
//! Core domain types used throughout Comanda.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    MenuItem     │   │      Order      │   │  DiningTable    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  category       │   │  order_number   │   │  number         │       │
//! │  │  price_cents    │   │  status         │   │  capacity       │       │
//! │  │  is_available   │   │  total_cents    │   │  location       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   OrderItem     │   │   OrderStatus   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name snapshot  │   │  Pending        │   │  Cash           │       │
//! │  │  price snapshot │   │  ... -> Paid    │   │  Card           │       │
//! │  │  line total     │   │  Cancelled      │   │  Transfer       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  (Coupon lives in its own module: crate::coupon)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists: (order_number, coupon code) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Restaurant
// =============================================================================

/// A restaurant (tenant). Orders, menu items, tables and scoped coupons
/// all hang off one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Whether the restaurant is active (soft delete).
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Dining Table
// =============================================================================

/// A physical table in a restaurant.
///
/// Created once and soft-deactivated; historical orders keep their reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: String,
    pub restaurant_id: String,
    /// Human-facing table number, unique within a restaurant.
    pub number: i64,
    /// Seat capacity.
    pub capacity: i64,
    /// Free-text location ("terraza", "salón principal", ...).
    pub location: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Menu Category
// =============================================================================

/// Closed set of menu categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum MenuCategory {
    Starter,
    Main,
    Dessert,
    Beverage,
}

// =============================================================================
// Menu Item
// =============================================================================

/// A dish or drink on a restaurant's menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: String,
    pub restaurant_id: String,
    /// Display name shown to diners and snapshotted into orders.
    pub name: String,
    pub category: MenuCategory,
    /// Price in cents (smallest currency unit).
    pub price_cents: i64,
    /// Temporarily out of stock / off the menu today.
    /// Independent of `is_active`: an active item can be unavailable.
    pub is_available: bool,
    /// Whether the item is active (soft delete).
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// An item can be ordered only when it is both active and available.
    #[inline]
    pub fn is_orderable(&self) -> bool {
        self.is_active && self.is_available
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The lifecycle state of an order.
///
/// `Paid` and `Cancelled` are terminal: once reached, no transition out is
/// permitted (see [`crate::order::check_transition`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Just placed; the only state in which the order may be edited.
    Pending,
    /// Kitchen is working on it.
    InPreparation,
    /// Ready for pickup/serving. Stamps `delivered_at`.
    Ready,
    /// On the table.
    Served,
    /// Paid and closed. Stamps `paid_at`. Terminal.
    Paid,
    /// Cancelled. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Terminal states admit no further transitions.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    /// No payment registered yet. The default until `pay_order` runs.
    Pending,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Pending
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer order.
///
/// Monetary identity maintained by the pricing code and verified in tests:
/// `total = subtotal + tax - (manual_discount + coupon_discount)`, subject to
/// the configured total policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    /// Human-readable business identifier: `ORD-YYYYMMDD-NNNNN`.
    /// Unique across all orders; consumers rely on this shape.
    pub order_number: String,
    pub restaurant_id: String,
    pub table_id: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    /// Line items. Loaded from their own table; not a column.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<OrderItem>,
    pub subtotal_cents: i64,
    /// Caller-supplied tax amount (not a rate).
    pub tax_cents: i64,
    /// Caller-supplied discount, independent of any coupon.
    pub manual_discount_cents: i64,
    /// Discount computed from the applied coupon, if any.
    pub coupon_discount_cents: i64,
    pub coupon_id: Option<String>,
    pub coupon_code: Option<String>,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    /// Stamped when the order reaches `Ready`.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Stamped when the order reaches `Paid`.
    pub paid_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    /// Optimistic concurrency token; every write increments it.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Combined discount (manual + coupon).
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.manual_discount_cents + self.coupon_discount_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
///
/// Uses the snapshot pattern to freeze menu data at order time: later catalog
/// price or name changes never retroactively alter an existing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    /// Menu item name at order time (frozen).
    pub name_snapshot: String,
    /// Quantity ordered (>= 1).
    pub quantity: i64,
    /// Unit price in cents at order time (frozen).
    pub unit_price_cents: i64,
    /// quantity × unit price.
    pub line_total_cents: i64,
    /// Per-item note ("sin cebolla").
    pub note: Option<String>,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::InPreparation.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
        assert!(!OrderStatus::Served.is_terminal());
    }

    #[test]
    fn test_payment_method_default() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Pending);
    }

    #[test]
    fn test_menu_item_orderable() {
        let now = Utc::now();
        let mut item = MenuItem {
            id: "i-1".into(),
            restaurant_id: "r-1".into(),
            name: "Pepián".into(),
            category: MenuCategory::Main,
            price_cents: 4500,
            is_available: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(item.is_orderable());

        // Active but temporarily unavailable: not orderable.
        item.is_available = false;
        assert!(!item.is_orderable());

        item.is_available = true;
        item.is_active = false;
        assert!(!item.is_orderable());
    }
}
