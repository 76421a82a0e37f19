//! # Validation Module
//!
//! Input validation utilities for Comanda.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Edge (HTTP framework, out of scope here)                     │
//! │  ├── Deserialization / type checks                                     │
//! │  └── Auth                                                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE — business rule validation                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints (coupon code, order number)                    │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Limits mirror the persisted schema: names 2-100, item notes ≤200,
//! order notes ≤500, coupon codes 3-20 upper-case `[A-Z0-9-]`.

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::{
    MAX_COUPON_DESCRIPTION_LEN, MAX_ITEM_NOTE_LEN, MAX_ITEM_QUANTITY, MAX_MENU_ITEM_NAME_LEN,
    MAX_ORDER_NOTES_LEN,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer name (2-100 characters after trimming).
///
/// ## Example
/// ```rust
/// use comanda_core::validation::validate_customer_name;
///
/// assert!(validate_customer_name("Juan Pérez").is_ok());
/// assert!(validate_customer_name("J").is_err());
/// assert!(validate_customer_name("").is_err());
/// ```
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customerName".to_string(),
        });
    }

    if name.chars().count() < 2 {
        return Err(ValidationError::TooShort {
            field: "customerName".to_string(),
            min: 2,
        });
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "customerName".to_string(),
            max: 100,
        });
    }

    Ok(name.to_string())
}

/// Validates an optional customer phone (≤20 characters).
pub fn validate_customer_phone(phone: &str) -> ValidationResult<String> {
    let phone = phone.trim();

    if phone.chars().count() > 20 {
        return Err(ValidationError::TooLong {
            field: "customerPhone".to_string(),
            max: 20,
        });
    }

    Ok(phone.to_string())
}

/// Validates and normalizes a coupon code.
///
/// ## Rules
/// - Upper-cased before anything else (codes are case-insensitive on input)
/// - 3-20 characters
/// - Only `A-Z`, `0-9` and hyphens
///
/// ## Returns
/// The normalized (upper-case, trimmed) code.
///
/// ## Example
/// ```rust
/// use comanda_core::validation::validate_coupon_code;
///
/// assert_eq!(validate_coupon_code("verano-10").unwrap(), "VERANO-10");
/// assert!(validate_coupon_code("x").is_err());
/// assert!(validate_coupon_code("HAS SPACE").is_err());
/// ```
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = code.trim().to_uppercase();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() < 3 {
        return Err(ValidationError::TooShort {
            field: "code".to_string(),
            min: 3,
        });
    }

    if code.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 20,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers and hyphens".to_string(),
        });
    }

    Ok(code)
}

/// Validates a menu item name (non-empty, ≤100 characters after trimming).
pub fn validate_menu_item_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_MENU_ITEM_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_MENU_ITEM_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates a coupon description (≤500 characters).
pub fn validate_coupon_description(description: &str) -> ValidationResult<String> {
    let description = description.trim();

    if description.chars().count() > MAX_COUPON_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_COUPON_DESCRIPTION_LEN,
        });
    }

    Ok(description.to_string())
}

/// Validates a per-item note (≤200 characters).
pub fn validate_item_note(note: &str) -> ValidationResult<String> {
    let note = note.trim();

    if note.chars().count() > MAX_ITEM_NOTE_LEN {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: MAX_ITEM_NOTE_LEN,
        });
    }

    Ok(note.to_string())
}

/// Validates free-text order notes (≤500 characters).
pub fn validate_order_notes(notes: &str) -> ValidationResult<String> {
    let notes = notes.trim();

    if notes.chars().count() > MAX_ORDER_NOTES_LEN {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_ORDER_NOTES_LEN,
        });
    }

    Ok(notes.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (>= 1)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a monetary amount that must be non-negative (prices, tax,
/// discounts, minimums). Zero is allowed.
pub fn validate_non_negative_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a percentage rate in basis points (0..=10000, i.e. 0-100%).
pub fn validate_percentage_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "percentage".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Window Validators
// =============================================================================

/// Validates a coupon validity window at creation time.
///
/// ## Rules
/// - `starts_at <= expires_at`
/// - `expires_at` must be in the future
pub fn validate_coupon_window(
    starts_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ValidationResult<()> {
    if starts_at > expires_at {
        return Err(ValidationError::InvalidWindow {
            field: "startsAt".to_string(),
            reason: "must not be after expiresAt".to_string(),
        });
    }

    if expires_at <= now {
        return Err(ValidationError::InvalidWindow {
            field: "expiresAt".to_string(),
            reason: "must be in the future".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
