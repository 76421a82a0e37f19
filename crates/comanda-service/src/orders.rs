//! # Order Service
//!
//! The order builder and lifecycle operations.
//!
//! ## Create Order Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        create_order                                     │
//! │                                                                         │
//! │  1. Validate input (name, notes, item count)                           │
//! │  2. Resolve table        ── missing/inactive → NOT_FOUND               │
//! │  3. Resolve menu items   ── snapshot name + price per line             │
//! │         │                   unavailable → CONFLICT                     │
//! │  4. Subtotal = Σ line totals                                           │
//! │  5. Coupon (optional)    ── scope, validity, minimum → typed errors    │
//! │  6. Total = subtotal + tax - discounts (policy-resolved)               │
//! │  7. Allocate ORD-YYYYMMDD-NNNNN (bounded random retry)                 │
//! │  8. INSERT order + items (one transaction)                             │
//! │  9. Record coupon redemption (best effort, never rolls back the order) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps 1-7 are pure validation and math; the first write happens at step 8,
//! so any error before it leaves the database untouched.

use chrono::Utc;
use rand::Rng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use comanda_core::order::{
    check_editable, check_transition, format_order_number, line_total, order_subtotal,
    order_total, ORDER_NUMBER_SUFFIX_SPACE,
};
use comanda_core::validation::{
    validate_customer_name, validate_customer_phone, validate_item_note, validate_non_negative_cents,
    validate_order_notes, validate_quantity,
};
use comanda_core::{
    CoreError, Money, Order, OrderItem, OrderStatus, PaymentMethod, MAX_ORDER_ITEMS,
};
use comanda_db::{Database, DbError, OrderFilter};

use crate::config::ServiceConfig;
use crate::coupons::resolve_coupon;
use crate::dto::{CreateOrderRequest, OrderItemRequest, OrderResponse, UpdateOrderRequest};
use crate::error::{ApiError, ApiResult};

/// Order lifecycle operations.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
    config: ServiceConfig,
}

impl OrderService {
    /// Creates a new OrderService.
    pub fn new(db: Database, config: ServiceConfig) -> Self {
        OrderService { db, config }
    }

    /// Creates an order.
    ///
    /// `redeemed_by` is the caller identity recorded in the coupon ledger;
    /// `None` falls back to the configured anonymous sentinel.
    pub async fn create_order(
        &self,
        restaurant_id: &str,
        redeemed_by: Option<&str>,
        req: CreateOrderRequest,
    ) -> ApiResult<OrderResponse> {
        debug!(restaurant_id = %restaurant_id, table_id = %req.table_id, "create_order");

        let customer_name = validate_customer_name(&req.customer_name).map_err(CoreError::from)?;
        let customer_phone = match req.customer_phone.as_deref() {
            Some(p) if !p.trim().is_empty() => {
                Some(validate_customer_phone(p).map_err(CoreError::from)?)
            }
            _ => None,
        };
        let notes = match req.notes.as_deref() {
            Some(n) if !n.trim().is_empty() => {
                Some(validate_order_notes(n).map_err(CoreError::from)?)
            }
            _ => None,
        };
        validate_non_negative_cents("taxCents", req.tax_cents).map_err(CoreError::from)?;
        validate_non_negative_cents("manualDiscountCents", req.manual_discount_cents)
            .map_err(CoreError::from)?;

        if req.items.is_empty() {
            return Err(ApiError::validation("Order must have at least one item"));
        }
        if req.items.len() > MAX_ORDER_ITEMS {
            return Err(ApiError::validation(format!(
                "Order cannot have more than {} items",
                MAX_ORDER_ITEMS
            )));
        }

        // Table must exist, be active, and belong to this restaurant.
        let table = self
            .db
            .tables()
            .get_by_id(&req.table_id)
            .await?
            .filter(|t| t.is_active && t.restaurant_id == restaurant_id)
            .ok_or_else(|| CoreError::TableNotFound(req.table_id.clone()))?;

        let order_id = Uuid::new_v4().to_string();
        let items = self
            .build_items(restaurant_id, &order_id, &req.items)
            .await?;
        let subtotal = order_subtotal(&items);

        // Coupon application. All checks run before anything is written.
        let (coupon, coupon_discount) = match req.coupon_code.as_deref() {
            Some(code) if !code.trim().is_empty() => {
                let coupon =
                    resolve_coupon(&self.db, restaurant_id, code, subtotal, Utc::now()).await?;
                let discount = coupon.discount_for(subtotal);
                (Some(coupon), discount)
            }
            _ => (None, Money::zero()),
        };

        let total = order_total(
            subtotal,
            Money::from_cents(req.tax_cents),
            Money::from_cents(req.manual_discount_cents),
            coupon_discount,
            self.config.total_policy,
        );

        let now = Utc::now();
        let mut order = Order {
            id: order_id,
            order_number: String::new(),
            restaurant_id: restaurant_id.to_string(),
            table_id: table.id,
            customer_name,
            customer_phone,
            items,
            subtotal_cents: subtotal.cents(),
            tax_cents: req.tax_cents,
            manual_discount_cents: req.manual_discount_cents,
            coupon_discount_cents: coupon_discount.cents(),
            coupon_id: coupon.as_ref().map(|c| c.id.clone()),
            coupon_code: coupon.as_ref().map(|c| c.code.clone()),
            total_cents: total.cents(),
            status: OrderStatus::Pending,
            payment_method: PaymentMethod::Pending,
            notes,
            delivered_at: None,
            paid_at: None,
            is_active: true,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        self.insert_with_unique_number(&mut order).await?;

        // Best-effort ledger write: the order stands even if this fails.
        // The resulting asymmetry (order has a coupon, ledger has no row)
        // is logged, never propagated.
        if let Some(coupon) = &coupon {
            let redeemer = redeemed_by.unwrap_or(&self.config.anonymous_redeemer);
            match self
                .db
                .coupons()
                .try_record_redemption(&coupon.id, &order.id, redeemer, now)
                .await
            {
                Ok(true) => {}
                Ok(false) => warn!(
                    coupon = %coupon.code,
                    order_id = %order.id,
                    "Coupon slot lost between validation and redemption"
                ),
                Err(e) => warn!(
                    coupon = %coupon.code,
                    order_id = %order.id,
                    error = %e,
                    "Failed to record coupon redemption"
                ),
            }
        }

        info!(
            order_number = %order.order_number,
            total_cents = order.total_cents,
            items = order.items.len(),
            "Order created"
        );

        Ok(OrderResponse::from(order))
    }

    /// Rewrites a pending order with new items, customer info and amounts.
    ///
    /// All totals are re-derived; a coupon applied at creation keeps its
    /// recorded discount recomputed against the new subtotal, but no new
    /// redemption is consumed.
    pub async fn update_order(&self, id: &str, req: UpdateOrderRequest) -> ApiResult<OrderResponse> {
        debug!(id = %id, "update_order");

        let current = self.get(id).await?;
        check_editable(current.status).map_err(ApiError::from)?;

        let customer_name = validate_customer_name(&req.customer_name).map_err(CoreError::from)?;
        let customer_phone = match req.customer_phone.as_deref() {
            Some(p) if !p.trim().is_empty() => {
                Some(validate_customer_phone(p).map_err(CoreError::from)?)
            }
            _ => None,
        };
        let notes = match req.notes.as_deref() {
            Some(n) if !n.trim().is_empty() => {
                Some(validate_order_notes(n).map_err(CoreError::from)?)
            }
            _ => None,
        };
        validate_non_negative_cents("taxCents", req.tax_cents).map_err(CoreError::from)?;
        validate_non_negative_cents("manualDiscountCents", req.manual_discount_cents)
            .map_err(CoreError::from)?;

        if req.items.is_empty() {
            return Err(ApiError::validation("Order must have at least one item"));
        }

        let items = self
            .build_items(&current.restaurant_id, &current.id, &req.items)
            .await?;
        let subtotal = order_subtotal(&items);

        // Recompute the coupon discount against the new subtotal.
        let coupon_discount = match &current.coupon_id {
            Some(coupon_id) => match self.db.coupons().get_by_id(coupon_id).await? {
                Some(coupon) => {
                    if !coupon.meets_minimum(subtotal) {
                        return Err(CoreError::CouponBelowMinimum {
                            minimum_cents: coupon.minimum_subtotal_cents,
                        }
                        .into());
                    }
                    coupon.discount_for(subtotal)
                }
                None => Money::zero(),
            },
            None => Money::zero(),
        };

        let total = order_total(
            subtotal,
            Money::from_cents(req.tax_cents),
            Money::from_cents(req.manual_discount_cents),
            coupon_discount,
            self.config.total_policy,
        );

        let updated = Order {
            customer_name,
            customer_phone,
            items,
            subtotal_cents: subtotal.cents(),
            tax_cents: req.tax_cents,
            manual_discount_cents: req.manual_discount_cents,
            coupon_discount_cents: coupon_discount.cents(),
            total_cents: total.cents(),
            notes,
            updated_at: Utc::now(),
            ..current
        };

        self.db.orders().update_pending(&updated).await?;

        info!(order_number = %updated.order_number, "Order updated");
        self.get_order(id).await
    }

    /// Advances an order's lifecycle state.
    ///
    /// Any non-terminal order accepts any target state, including skips;
    /// `Paid` and `Cancelled` refuse everything.
    pub async fn update_status(&self, id: &str, target: OrderStatus) -> ApiResult<OrderResponse> {
        debug!(id = %id, target = ?target, "update_status");

        let order = self.get(id).await?;
        check_transition(order.status, target).map_err(ApiError::from)?;

        self.db
            .orders()
            .update_status(id, target, order.version, Utc::now())
            .await?;

        info!(order_number = %order.order_number, status = ?target, "Order status updated");
        self.get_order(id).await
    }

    /// Closes an order as paid with an explicit payment method.
    pub async fn pay_order(&self, id: &str, method: PaymentMethod) -> ApiResult<OrderResponse> {
        debug!(id = %id, method = ?method, "pay_order");

        if method == PaymentMethod::Pending {
            return Err(ApiError::validation(
                "A concrete payment method is required to close an order",
            ));
        }

        let order = self.get(id).await?;
        check_transition(order.status, OrderStatus::Paid).map_err(ApiError::from)?;

        self.db
            .orders()
            .mark_paid(id, method, order.version, Utc::now())
            .await?;

        info!(order_number = %order.order_number, method = ?method, "Order paid");
        self.get_order(id).await
    }

    /// Cancels an order, recording the reason in its notes.
    pub async fn cancel_order(&self, id: &str, reason: Option<&str>) -> ApiResult<OrderResponse> {
        debug!(id = %id, "cancel_order");

        let order = self.get(id).await?;
        check_transition(order.status, OrderStatus::Cancelled).map_err(ApiError::from)?;

        let notes = match reason.map(str::trim).filter(|r| !r.is_empty()) {
            Some(reason) => Some(match &order.notes {
                Some(existing) => format!("{existing}\nCancelled: {reason}"),
                None => format!("Cancelled: {reason}"),
            }),
            None => order.notes.clone(),
        };

        self.db
            .orders()
            .mark_cancelled(id, notes.as_deref(), order.version, Utc::now())
            .await?;

        info!(order_number = %order.order_number, "Order cancelled");
        self.get_order(id).await
    }

    /// Gets an order by ID.
    pub async fn get_order(&self, id: &str) -> ApiResult<OrderResponse> {
        Ok(OrderResponse::from(self.get(id).await?))
    }

    /// Gets an order by its business number.
    pub async fn get_order_by_number(&self, order_number: &str) -> ApiResult<OrderResponse> {
        let order = self
            .db
            .orders()
            .get_by_number(order_number)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_number.to_string()))?;
        Ok(OrderResponse::from(order))
    }

    /// Lists orders for a restaurant, newest first.
    pub async fn list_orders(
        &self,
        restaurant_id: &str,
        filter: &OrderFilter,
        limit: Option<i64>,
        offset: i64,
    ) -> ApiResult<Vec<OrderResponse>> {
        let limit = limit.unwrap_or(self.config.default_page_size);
        let orders = self
            .db
            .orders()
            .list(restaurant_id, filter, limit, offset)
            .await?;
        Ok(orders.into_iter().map(OrderResponse::from).collect())
    }

    /// Soft-deletes an order (hides it from default listings).
    pub async fn delete_order(&self, id: &str) -> ApiResult<()> {
        self.db.orders().soft_delete(id, Utc::now()).await?;
        info!(id = %id, "Order soft-deleted");
        Ok(())
    }

    /// Permanently deletes an order and its items. The coupon ledger is
    /// untouched; redemptions are historical facts.
    pub async fn delete_order_permanent(&self, id: &str) -> ApiResult<()> {
        self.db.orders().delete_permanent(id).await?;
        info!(id = %id, "Order permanently deleted");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    async fn get(&self, id: &str) -> ApiResult<Order> {
        self.db
            .orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()).into())
    }

    /// Resolves item requests into frozen snapshots.
    async fn build_items(
        &self,
        restaurant_id: &str,
        order_id: &str,
        requests: &[OrderItemRequest],
    ) -> ApiResult<Vec<OrderItem>> {
        let mut items = Vec::with_capacity(requests.len());

        for req in requests {
            validate_quantity(req.quantity).map_err(CoreError::from)?;
            let note = match req.note.as_deref() {
                Some(n) if !n.trim().is_empty() => {
                    Some(validate_item_note(n).map_err(CoreError::from)?)
                }
                _ => None,
            };

            let menu_item = self
                .db
                .menu_items()
                .get_by_id(&req.menu_item_id)
                .await?
                .filter(|i| i.is_active && i.restaurant_id == restaurant_id)
                .ok_or_else(|| CoreError::MenuItemNotFound(req.menu_item_id.clone()))?;

            if !menu_item.is_available {
                return Err(CoreError::MenuItemUnavailable {
                    name: menu_item.name,
                }
                .into());
            }

            let unit_price = menu_item.price();
            items.push(OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.to_string(),
                menu_item_id: menu_item.id,
                name_snapshot: menu_item.name,
                quantity: req.quantity,
                unit_price_cents: unit_price.cents(),
                line_total_cents: line_total(req.quantity, unit_price).cents(),
                note,
            });
        }

        Ok(items)
    }

    /// Allocates a unique order number and inserts the order.
    ///
    /// Random 5-digit suffixes, retried on collision up to the configured
    /// budget. The UNIQUE index is the real guarantee; the pre-check just
    /// avoids burning an insert on an obvious collision.
    async fn insert_with_unique_number(&self, order: &mut Order) -> ApiResult<()> {
        let date = Utc::now().date_naive();

        for _ in 0..self.config.order_number_attempts {
            let suffix = rand::thread_rng().gen_range(0..ORDER_NUMBER_SUFFIX_SPACE);
            let candidate = format_order_number(date, suffix);

            if self.db.orders().number_exists(&candidate).await? {
                continue;
            }

            order.order_number = candidate;
            match self.db.orders().insert(order).await {
                Ok(()) => return Ok(()),
                // Lost the race on the UNIQUE index: try another suffix.
                Err(DbError::UniqueViolation { field, .. })
                    if field.contains("order_number") =>
                {
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(CoreError::OrderNumberExhausted {
            attempts: self.config.order_number_attempts,
        }
        .into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use comanda_core::{Coupon, DiscountKind, MenuCategory};
    use comanda_db::DbConfig;

    use crate::catalog::CatalogService;
    use crate::error::ErrorCode;

    struct Fixture {
        db: Database,
        orders: OrderService,
        restaurant_id: String,
        table_id: String,
        /// "Pepián", 25.00.
        pepian_id: String,
        /// "Kak'ik", 60.00.
        kakik_id: String,
    }

    async fn setup() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = CatalogService::new(db.clone());

        let restaurant = catalog
            .create_restaurant("El Fogón", None, None)
            .await
            .unwrap();
        let table = catalog
            .create_table(&restaurant.id, 1, 4, "terraza")
            .await
            .unwrap();
        let pepian = catalog
            .create_menu_item(&restaurant.id, "Pepián", MenuCategory::Main, 2500)
            .await
            .unwrap();
        let kakik = catalog
            .create_menu_item(&restaurant.id, "Kak'ik", MenuCategory::Main, 6000)
            .await
            .unwrap();

        Fixture {
            orders: OrderService::new(db.clone(), ServiceConfig::default()),
            db,
            restaurant_id: restaurant.id,
            table_id: table.id,
            pepian_id: pepian.id,
            kakik_id: kakik.id,
        }
    }

    fn item(menu_item_id: &str, quantity: i64) -> OrderItemRequest {
        OrderItemRequest {
            menu_item_id: menu_item_id.to_string(),
            quantity,
            note: None,
        }
    }

    fn request(fx: &Fixture) -> CreateOrderRequest {
        CreateOrderRequest {
            table_id: fx.table_id.clone(),
            customer_name: "María López".to_string(),
            customer_phone: None,
            items: vec![item(&fx.pepian_id, 1)],
            tax_cents: 0,
            manual_discount_cents: 0,
            coupon_code: None,
            notes: None,
        }
    }

    async fn seed_coupon(fx: &Fixture, coupon: &Coupon) {
        fx.db.coupons().insert(coupon).await.unwrap();
    }

    fn coupon(code: &str, kind: DiscountKind) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            description: None,
            kind,
            percentage_bps: 0,
            fixed_amount_cents: 0,
            starts_at: now - Duration::days(1),
            expires_at: now + Duration::days(30),
            max_redemptions: None,
            current_redemptions: 0,
            minimum_subtotal_cents: 0,
            discount_cap_cents: None,
            restaurant_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_order_totals() {
        let fx = setup().await;
        let mut req = request(&fx);
        req.tax_cents = 250;

        let order = fx
            .orders
            .create_order(&fx.restaurant_id, None, req)
            .await
            .unwrap();

        assert_eq!(order.subtotal_cents, 2500);
        assert_eq!(order.tax_cents, 250);
        assert_eq!(order.total_cents, 2750);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_method, PaymentMethod::Pending);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].name, "Pepián");
        assert!(order.order_number.starts_with("ORD-"));
        assert_eq!(order.order_number.len(), "ORD-YYYYMMDD-NNNNN".len());
    }

    #[tokio::test]
    async fn test_create_order_snapshots_prices() {
        let fx = setup().await;
        let req = CreateOrderRequest {
            items: vec![item(&fx.pepian_id, 2), item(&fx.kakik_id, 1)],
            ..request(&fx)
        };

        let order = fx
            .orders
            .create_order(&fx.restaurant_id, None, req)
            .await
            .unwrap();

        // 2 × 25.00 + 1 × 60.00
        assert_eq!(order.subtotal_cents, 11000);
        assert_eq!(order.items[0].line_total_cents, 5000);
        assert_eq!(order.items[1].line_total_cents, 6000);
    }

    #[tokio::test]
    async fn test_percentage_coupon_discount_and_ledger() {
        let fx = setup().await;
        let mut voucher = coupon("VERANO-10", DiscountKind::Percentage);
        voucher.percentage_bps = 1000;
        seed_coupon(&fx, &voucher).await;

        let req = CreateOrderRequest {
            coupon_code: Some("verano-10".to_string()),
            ..request(&fx)
        };
        let order = fx
            .orders
            .create_order(&fx.restaurant_id, Some("mesero-03"), req)
            .await
            .unwrap();

        // 10% of 25.00 is 2.50.
        assert_eq!(order.coupon_discount_cents, 250);
        assert_eq!(order.coupon_code.as_deref(), Some("VERANO-10"));
        assert_eq!(order.total_cents, 2250);

        let stored = fx
            .db
            .coupons()
            .get_by_code("VERANO-10")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.current_redemptions, 1);

        let ledger = fx.db.coupons().redemptions(&voucher.id).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].order_id, order.id);
        assert_eq!(ledger[0].redeemed_by, "mesero-03");
    }

    #[tokio::test]
    async fn test_fixed_coupon_honors_cap() {
        let fx = setup().await;
        let mut voucher = coupon("FIESTA", DiscountKind::FixedAmount);
        voucher.fixed_amount_cents = 500;
        voucher.discount_cap_cents = Some(300);
        seed_coupon(&fx, &voucher).await;

        let req = CreateOrderRequest {
            tax_cents: 250,
            coupon_code: Some("FIESTA".to_string()),
            ..request(&fx)
        };
        let order = fx
            .orders
            .create_order(&fx.restaurant_id, None, req)
            .await
            .unwrap();

        // Fixed 5.00 capped at 3.00: 25.00 + 2.50 - 3.00 = 24.50.
        assert_eq!(order.coupon_discount_cents, 300);
        assert_eq!(order.total_cents, 2450);
    }

    #[tokio::test]
    async fn test_coupon_below_minimum_writes_nothing() {
        let fx = setup().await;
        let mut voucher = coupon("GRANDE", DiscountKind::Percentage);
        voucher.percentage_bps = 1000;
        voucher.minimum_subtotal_cents = 3000;
        seed_coupon(&fx, &voucher).await;

        let req = CreateOrderRequest {
            coupon_code: Some("GRANDE".to_string()),
            ..request(&fx)
        };
        let err = fx
            .orders
            .create_order(&fx.restaurant_id, None, req)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // The failed attempt left no order and burned no redemption.
        let orders = fx
            .orders
            .list_orders(&fx.restaurant_id, &OrderFilter::default(), None, 0)
            .await
            .unwrap();
        assert!(orders.is_empty());
        let stored = fx
            .db
            .coupons()
            .get_by_code("GRANDE")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.current_redemptions, 0);
    }

    #[tokio::test]
    async fn test_unavailable_item_is_conflict() {
        let fx = setup().await;
        let catalog = CatalogService::new(fx.db.clone());
        catalog
            .set_menu_item_availability(&fx.pepian_id, false)
            .await
            .unwrap();

        let err = fx
            .orders
            .create_order(&fx.restaurant_id, None, request(&fx))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert!(err.message.contains("Pepián"));
    }

    #[tokio::test]
    async fn test_unknown_table_is_not_found() {
        let fx = setup().await;
        let req = CreateOrderRequest {
            table_id: "no-such-table".to_string(),
            ..request(&fx)
        };

        let err = fx
            .orders
            .create_order(&fx.restaurant_id, None, req)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_foreign_coupon_is_rejected() {
        let fx = setup().await;
        let other = CatalogService::new(fx.db.clone())
            .create_restaurant("La Otra Esquina", None, None)
            .await
            .unwrap();
        let mut voucher = coupon("AJENO", DiscountKind::Percentage);
        voucher.percentage_bps = 1000;
        voucher.restaurant_id = Some(other.id);
        seed_coupon(&fx, &voucher).await;

        let req = CreateOrderRequest {
            coupon_code: Some("AJENO".to_string()),
            ..request(&fx)
        };
        let err = fx
            .orders
            .create_order(&fx.restaurant_id, None, req)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_empty_order_rejected() {
        let fx = setup().await;
        let req = CreateOrderRequest {
            items: vec![],
            ..request(&fx)
        };

        let err = fx
            .orders
            .create_order(&fx.restaurant_id, None, req)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_update_order_rederives_totals() {
        let fx = setup().await;
        let order = fx
            .orders
            .create_order(&fx.restaurant_id, None, request(&fx))
            .await
            .unwrap();

        let updated = fx
            .orders
            .update_order(
                &order.id,
                UpdateOrderRequest {
                    customer_name: "María López".to_string(),
                    customer_phone: None,
                    items: vec![item(&fx.pepian_id, 2)],
                    tax_cents: 500,
                    manual_discount_cents: 0,
                    notes: Some("para llevar".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.subtotal_cents, 5000);
        assert_eq!(updated.total_cents, 5500);
        assert_eq!(updated.notes.as_deref(), Some("para llevar"));
    }

    #[tokio::test]
    async fn test_update_keeps_coupon_without_new_redemption() {
        let fx = setup().await;
        let mut voucher = coupon("VERANO-10", DiscountKind::Percentage);
        voucher.percentage_bps = 1000;
        seed_coupon(&fx, &voucher).await;

        let req = CreateOrderRequest {
            coupon_code: Some("VERANO-10".to_string()),
            ..request(&fx)
        };
        let order = fx
            .orders
            .create_order(&fx.restaurant_id, None, req)
            .await
            .unwrap();
        assert_eq!(order.coupon_discount_cents, 250);

        // Doubling the quantity doubles the 10% discount, but the
        // redemption counter stays where creation left it.
        let updated = fx
            .orders
            .update_order(
                &order.id,
                UpdateOrderRequest {
                    customer_name: "María López".to_string(),
                    customer_phone: None,
                    items: vec![item(&fx.pepian_id, 2)],
                    tax_cents: 0,
                    manual_discount_cents: 0,
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.coupon_discount_cents, 500);
        assert_eq!(updated.total_cents, 4500);

        let stored = fx
            .db
            .coupons()
            .get_by_code("VERANO-10")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.current_redemptions, 1);
    }

    #[tokio::test]
    async fn test_update_refused_once_in_preparation() {
        let fx = setup().await;
        let order = fx
            .orders
            .create_order(&fx.restaurant_id, None, request(&fx))
            .await
            .unwrap();

        fx.orders
            .update_status(&order.id, OrderStatus::InPreparation)
            .await
            .unwrap();

        let err = fx
            .orders
            .update_order(
                &order.id,
                UpdateOrderRequest {
                    customer_name: "María López".to_string(),
                    customer_phone: None,
                    items: vec![item(&fx.pepian_id, 2)],
                    tax_cents: 0,
                    manual_discount_cents: 0,
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_status_skips_allowed() {
        let fx = setup().await;
        let order = fx
            .orders
            .create_order(&fx.restaurant_id, None, request(&fx))
            .await
            .unwrap();

        // Pending straight to Served, skipping the kitchen states.
        let updated = fx
            .orders
            .update_status(&order.id, OrderStatus::Served)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Served);
    }

    #[tokio::test]
    async fn test_pay_requires_concrete_method() {
        let fx = setup().await;
        let order = fx
            .orders
            .create_order(&fx.restaurant_id, None, request(&fx))
            .await
            .unwrap();

        let err = fx
            .orders
            .pay_order(&order.id, PaymentMethod::Pending)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_paid_order_is_terminal() {
        let fx = setup().await;
        let order = fx
            .orders
            .create_order(&fx.restaurant_id, None, request(&fx))
            .await
            .unwrap();

        let paid = fx
            .orders
            .pay_order(&order.id, PaymentMethod::Card)
            .await
            .unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);
        assert_eq!(paid.payment_method, PaymentMethod::Card);

        let err = fx.orders.cancel_order(&order.id, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err = fx
            .orders
            .update_status(&order.id, OrderStatus::Pending)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_cancel_records_reason() {
        let fx = setup().await;
        let order = fx
            .orders
            .create_order(&fx.restaurant_id, None, request(&fx))
            .await
            .unwrap();

        let cancelled = fx
            .orders
            .cancel_order(&order.id, Some("cliente se retiró"))
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(
            cancelled.notes.as_deref(),
            Some("Cancelled: cliente se retiró")
        );
    }

    #[tokio::test]
    async fn test_get_by_number() {
        let fx = setup().await;
        let order = fx
            .orders
            .create_order(&fx.restaurant_id, None, request(&fx))
            .await
            .unwrap();

        let found = fx
            .orders
            .get_order_by_number(&order.order_number)
            .await
            .unwrap();
        assert_eq!(found.id, order.id);

        let err = fx
            .orders
            .get_order_by_number("ORD-19990101-00000")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_listing() {
        let fx = setup().await;
        let order = fx
            .orders
            .create_order(&fx.restaurant_id, None, request(&fx))
            .await
            .unwrap();

        fx.orders.delete_order(&order.id).await.unwrap();

        let visible = fx
            .orders
            .list_orders(&fx.restaurant_id, &OrderFilter::default(), None, 0)
            .await
            .unwrap();
        assert!(visible.is_empty());

        let all = fx
            .orders
            .list_orders(
                &fx.restaurant_id,
                &OrderFilter {
                    include_inactive: true,
                    ..OrderFilter::default()
                },
                None,
                0,
            )
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_negative_total_clamps_to_zero() {
        let fx = setup().await;
        let req = CreateOrderRequest {
            manual_discount_cents: 9000,
            ..request(&fx)
        };

        let order = fx
            .orders
            .create_order(&fx.restaurant_id, None, req)
            .await
            .unwrap();
        assert_eq!(order.total_cents, 0);
    }
}
