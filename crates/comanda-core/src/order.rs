//! # Order Pricing & State Machine
//!
//! Pure order math and lifecycle rules. Everything here is deterministic:
//! the clock, random suffixes and persistence all live with the callers.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order State Machine                               │
//! │                                                                         │
//! │   Pending ──► InPreparation ──► Ready ──► Served ──► Paid (terminal)    │
//! │      │              │             │          │                          │
//! │      └──────────────┴─────────────┴──────────┴──► Cancelled (terminal)  │
//! │                                                                         │
//! │  Guard: BLANKET terminal lock, not strict adjacency.                    │
//! │  A Pending order may jump straight to Served; only Paid/Cancelled       │
//! │  refuse every transition (and Paid additionally refuses cancellation).  │
//! │                                                                         │
//! │  Edits (items, customer info, tax, discounts): Pending only.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::money::Money;
use crate::types::{OrderItem, OrderStatus};

// =============================================================================
// Pricing
// =============================================================================

/// How to resolve a total driven negative by discounts.
///
/// The original system never clamped and could in principle present a
/// negative total; the default here floors at zero. Both behaviors are kept
/// selectable so the choice stays an explicit configuration decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TotalPolicy {
    /// `total = max(0, subtotal + tax - discounts)`.
    #[default]
    ClampToZero,
    /// Raw arithmetic; the total may go negative.
    AllowNegative,
}

/// Line total for one item: `quantity × unit price`.
#[inline]
pub fn line_total(quantity: i64, unit_price: Money) -> Money {
    unit_price.multiply_quantity(quantity)
}

/// Order subtotal: the sum of snapshot line totals.
///
/// Works off the frozen `line_total_cents` values, so later catalog price
/// changes never alter the result.
pub fn order_subtotal(items: &[OrderItem]) -> Money {
    items
        .iter()
        .fold(Money::zero(), |acc, item| acc + item.line_total())
}

/// Order total: `subtotal + tax - (manual discount + coupon discount)`,
/// resolved through the given [`TotalPolicy`].
pub fn order_total(
    subtotal: Money,
    tax: Money,
    manual_discount: Money,
    coupon_discount: Money,
    policy: TotalPolicy,
) -> Money {
    let raw = subtotal + tax - manual_discount - coupon_discount;
    match policy {
        TotalPolicy::ClampToZero => raw.clamp_non_negative(),
        TotalPolicy::AllowNegative => raw,
    }
}

// =============================================================================
// State Machine
// =============================================================================

/// Validates a state transition request.
///
/// Terminal lock only: any transition out of `Paid` or `Cancelled` is a
/// conflict, including cancellation of a paid order. Everything else is
/// permitted — out-of-order jumps (Pending → Served) are accepted by design.
pub fn check_transition(current: OrderStatus, target: OrderStatus) -> Result<(), CoreError> {
    if current.is_terminal() {
        return Err(CoreError::OrderTerminal { current, target });
    }
    Ok(())
}

/// Validates that an order may receive a full-order edit.
///
/// Only `Pending` orders are editable; everything downstream has already
/// reached the kitchen.
pub fn check_editable(current: OrderStatus) -> Result<(), CoreError> {
    if current != OrderStatus::Pending {
        return Err(CoreError::OrderNotEditable { current });
    }
    Ok(())
}

// =============================================================================
// Order Numbers
// =============================================================================

/// Size of the per-day suffix space (5 decimal digits).
pub const ORDER_NUMBER_SUFFIX_SPACE: u32 = 100_000;

/// Formats an order number: `ORD-YYYYMMDD-NNNNN`.
///
/// This shape is a persisted, externally visible identifier — consumers
/// display it and look orders up by it, so the format is load-bearing.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use comanda_core::order::format_order_number;
///
/// let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
/// assert_eq!(format_order_number(date, 7), "ORD-20260824-00007");
/// ```
pub fn format_order_number(date: NaiveDate, suffix: u32) -> String {
    format!(
        "ORD-{}-{:05}",
        date.format("%Y%m%d"),
        suffix % ORDER_NUMBER_SUFFIX_SPACE
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
