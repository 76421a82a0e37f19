//! # API Error Type
//!
//! Unified error type for service operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Comanda                                │
//! │                                                                         │
//! │  Consumer                    Service Layer                              │
//! │  ────────                    ─────────────                              │
//! │                                                                         │
//! │  create_order(...)                                                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service Operation                                               │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Business Error? ── CoreError::OrderTerminal ──── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "CONFLICT", "message": "Order is Paid, cannot ..." }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Consumers branch on `code`; `message` is only for display.

use serde::Serialize;

use comanda_core::{CoreError, ErrorKind};
use comanda_db::DbError;

/// API error returned from service operations.
///
/// ## Serialization
/// This is what a consumer receives when an operation fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Table not found: 550e8400-..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// The taxonomy consumers are expected to branch on: missing entity, bad
/// input, state/uniqueness conflict, infrastructure failure, everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced entity absent or inactive (404)
    NotFound,

    /// Input validation failed (400/422)
    ValidationError,

    /// State machine or uniqueness violation (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }
}

/// Converts core errors to API errors via the core taxonomy.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match err.kind() {
            ErrorKind::NotFound => ErrorCode::NotFound,
            ErrorKind::Validation => ErrorCode::ValidationError,
            ErrorKind::Conflict => ErrorCode::Conflict,
            ErrorKind::Internal => ErrorCode::Internal,
        };
        ApiError::new(code, err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::VersionConflict { entity, id } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} {} was modified concurrently, retry", entity, id),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for service operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use comanda_core::OrderStatus;

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = CoreError::TableNotFound("t-1".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: ApiError = CoreError::OrderTerminal {
            current: OrderStatus::Paid,
            target: OrderStatus::Cancelled,
        }
        .into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: ApiError = CoreError::CouponBelowMinimum {
            minimum_cents: 3000,
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // Running out of order numbers is the server's problem, not the
        // caller's.
        let err: ApiError = CoreError::OrderNumberExhausted { attempts: 10 }.into();
        assert_eq!(err.code, ErrorCode::Internal);
    }

    #[test]
    fn test_db_error_mapping() {
        let err: ApiError = DbError::duplicate("coupons.code", "VERANO-10").into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: ApiError = DbError::version_conflict("Order", "o-1").into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: ApiError = DbError::not_found("Order", "o-1").into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
