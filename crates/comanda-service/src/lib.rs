//! # Comanda Service
//!
//! The orchestration layer between API consumers and the lower crates.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        comanda-service                                  │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐                  │
//! │  │ OrderService │  │CouponService │  │CatalogService│                  │
//! │  │  lifecycle + │  │  mgmt +      │  │  restaurants │                  │
//! │  │  pricing flow│  │  dry-run     │  │  tables, menu│                  │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘                  │
//! │         │                │                  │                          │
//! │         └────────────────┼──────────────────┘                          │
//! │                          ▼                                             │
//! │              comanda-db (repositories)                                 │
//! │              comanda-core (money, coupons, state machine)              │
//! │                                                                         │
//! │  Errors leave as ApiError { code, message }, serialized camelCase.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod config;
pub mod coupons;
pub mod dto;
pub mod error;
pub mod orders;

pub use catalog::CatalogService;
pub use config::ServiceConfig;
pub use coupons::CouponService;
pub use dto::{
    CouponQuote, CreateCouponRequest, CreateOrderRequest, OrderItemRequest, OrderItemResponse,
    OrderResponse, PayOrderRequest, UpdateOrderRequest,
};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use orders::OrderService;

/// Installs the process-wide tracing subscriber.
///
/// Filter comes from `RUST_LOG`, defaulting to `info` for our crates.
/// Call once at startup; returns an error if a subscriber is already set.
pub fn init_tracing() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,comanda_db=debug,comanda_service=debug"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}
