//! # Error Types
//!
//! Domain-specific error types for comanda-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  comanda-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  comanda-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  comanda-service errors                                                │
//! │  └── ApiError         - What API consumers see (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → caller                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (code, ID, state, ...)
//! 3. Errors are enum variants, never String
//! 4. Every variant maps onto one of the API error kinds via [`CoreError::kind`]

use thiserror::Error;

use crate::coupon::CouponRejection;
use crate::types::OrderStatus;

// =============================================================================
// Error Kind
// =============================================================================

/// The machine-distinguishable error taxonomy exposed to API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced entity absent or inactive.
    NotFound,
    /// Malformed or out-of-range input, illegal field combination.
    Validation,
    /// State-machine violation, uniqueness violation, availability violation.
    Conflict,
    /// Exhausted retry budget or other failure the caller cannot fix by
    /// changing input.
    Internal,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations raised before any mutation:
/// the order builder and state machine validate eagerly, so a `CoreError`
/// always means nothing was written.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Table missing or soft-deactivated.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Menu item missing or soft-deactivated.
    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),

    /// Menu item exists and is active, but is flagged unavailable right now.
    #[error("Menu item \"{name}\" is currently unavailable")]
    MenuItemUnavailable { name: String },

    #[error("Restaurant not found: {0}")]
    RestaurantNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Coupon code unknown or the coupon is inactive.
    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    /// Coupon is scoped to a different restaurant.
    #[error("Coupon {code} does not apply to this restaurant")]
    CouponNotApplicable { code: String },

    /// Coupon failed its validity checks (window, limit, deactivation).
    #[error("Coupon {code} is not valid: {reason}")]
    CouponInvalid {
        code: String,
        reason: CouponRejection,
    },

    /// Order subtotal below the coupon's required minimum.
    #[error("Order subtotal below coupon minimum of {minimum_cents} cents")]
    CouponBelowMinimum { minimum_cents: i64 },

    /// The order is in a terminal state and refuses every transition.
    #[error("Order is {current:?}, cannot transition to {target:?}")]
    OrderTerminal {
        current: OrderStatus,
        target: OrderStatus,
    },

    /// Full-order edits are only allowed while Pending.
    #[error("Order is {current:?}, only pending orders can be edited")]
    OrderNotEditable { current: OrderStatus },

    /// Could not allocate a unique order number within the retry budget.
    #[error("Could not allocate a unique order number after {attempts} attempts")]
    OrderNumberExhausted { attempts: u32 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Maps the variant onto the API error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::TableNotFound(_)
            | CoreError::MenuItemNotFound(_)
            | CoreError::RestaurantNotFound(_)
            | CoreError::OrderNotFound(_)
            | CoreError::CouponNotFound(_) => ErrorKind::NotFound,

            CoreError::MenuItemUnavailable { .. }
            | CoreError::CouponNotApplicable { .. }
            | CoreError::OrderTerminal { .. }
            | CoreError::OrderNotEditable { .. } => ErrorKind::Conflict,

            CoreError::CouponInvalid { .. }
            | CoreError::CouponBelowMinimum { .. }
            | CoreError::Validation(_) => ErrorKind::Validation,

            CoreError::OrderNumberExhausted { .. } => ErrorKind::Internal,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when request input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (bad coupon code pattern, bad UUID, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Timestamps in the wrong order or an expiry in the past.
    #[error("{field} is invalid: {reason}")]
    InvalidWindow { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::MenuItemUnavailable {
            name: "Kak'ik".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Menu item \"Kak'ik\" is currently unavailable"
        );
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            CoreError::TableNotFound("t".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CoreError::MenuItemUnavailable { name: "x".into() }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            CoreError::CouponBelowMinimum {
                minimum_cents: 3000
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            CoreError::OrderTerminal {
                current: OrderStatus::Paid,
                target: OrderStatus::Cancelled,
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            CoreError::OrderNumberExhausted { attempts: 10 }.kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "customerName".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::Validation);
    }
}
