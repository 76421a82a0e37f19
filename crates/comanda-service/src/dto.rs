//! # Data Transfer Objects
//!
//! Request and response shapes crossing the service boundary. All DTOs use
//! camelCase serialization for API consumers; monetary fields are integer
//! cents like everywhere else.

use serde::{Deserialize, Serialize};

use comanda_core::{Order, OrderItem, PaymentMethod};

// =============================================================================
// Order Requests
// =============================================================================

/// One requested line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub menu_item_id: String,
    pub quantity: i64,
    /// Per-item note ("sin cebolla").
    #[serde(default)]
    pub note: Option<String>,
}

/// Request to create an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub table_id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub items: Vec<OrderItemRequest>,
    /// Caller-supplied tax amount in cents (not a rate).
    #[serde(default)]
    pub tax_cents: i64,
    /// Discount granted by staff, independent of any coupon.
    #[serde(default)]
    pub manual_discount_cents: i64,
    /// Coupon code to apply; normalized to upper-case before lookup.
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request to rewrite a pending order. Carries the complete new state;
/// totals are re-derived server-side, never taken from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub tax_cents: i64,
    #[serde(default)]
    pub manual_discount_cents: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request to close an order as paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayOrderRequest {
    pub payment_method: PaymentMethod,
}

// =============================================================================
// Order Responses
// =============================================================================

/// An order as presented to API consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub order_number: String,
    pub table_id: String,
    pub customer_name: String,
    pub items: Vec<OrderItemResponse>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub manual_discount_cents: i64,
    pub coupon_discount_cents: i64,
    pub coupon_code: Option<String>,
    pub total_cents: i64,
    pub status: comanda_core::OrderStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub note: Option<String>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            order_number: order.order_number,
            table_id: order.table_id,
            customer_name: order.customer_name,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            subtotal_cents: order.subtotal_cents,
            tax_cents: order.tax_cents,
            manual_discount_cents: order.manual_discount_cents,
            coupon_discount_cents: order.coupon_discount_cents,
            coupon_code: order.coupon_code,
            total_cents: order.total_cents,
            status: order.status,
            payment_method: order.payment_method,
            notes: order.notes,
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        OrderItemResponse {
            name: item.name_snapshot,
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
            line_total_cents: item.line_total_cents,
            note: item.note,
        }
    }
}

// =============================================================================
// Coupon Requests / Responses
// =============================================================================

/// Request to create a coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: comanda_core::DiscountKind,
    /// Basis points; required when kind is `percentage`.
    #[serde(default)]
    pub percentage_bps: u32,
    /// Cents; required when kind is `fixed_amount`.
    #[serde(default)]
    pub fixed_amount_cents: i64,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub max_redemptions: Option<i64>,
    #[serde(default)]
    pub minimum_subtotal_cents: i64,
    #[serde(default)]
    pub discount_cap_cents: Option<i64>,
    /// Omit for a coupon valid at every restaurant.
    #[serde(default)]
    pub restaurant_id: Option<String>,
}

/// Dry-run answer: what this coupon would do to the given subtotal.
/// Nothing is consumed by asking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponQuote {
    pub code: String,
    pub discount_cents: i64,
    pub subtotal_cents: i64,
    /// Subtotal minus discount, floored at zero for display.
    pub subtotal_after_cents: i64,
}
