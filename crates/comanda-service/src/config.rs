//! # Service Configuration
//!
//! Runtime knobs for the service layer. Everything here has a sensible
//! default; construction is builder-style like `comanda_db::DbConfig`.

use comanda_core::TotalPolicy;

/// Configuration for the service layer.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// How to resolve a total driven negative by discounts.
    /// Default: clamp to zero.
    pub total_policy: TotalPolicy,

    /// Ledger identity recorded when no caller identity is supplied.
    pub anonymous_redeemer: String,

    /// How many random suffixes to try before giving up on allocating a
    /// unique order number.
    pub order_number_attempts: u32,

    /// Default page size for listings.
    pub default_page_size: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            total_policy: TotalPolicy::default(),
            anonymous_redeemer: "anonymous".to_string(),
            order_number_attempts: 10,
            default_page_size: 50,
        }
    }
}

impl ServiceConfig {
    /// Sets the total policy.
    pub fn total_policy(mut self, policy: TotalPolicy) -> Self {
        self.total_policy = policy;
        self
    }

    /// Sets the anonymous redeemer identity.
    pub fn anonymous_redeemer(mut self, id: impl Into<String>) -> Self {
        self.anonymous_redeemer = id.into();
        self
    }

    /// Sets the order number retry budget.
    pub fn order_number_attempts(mut self, attempts: u32) -> Self {
        self.order_number_attempts = attempts;
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
