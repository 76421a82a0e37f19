//! # Repository Module
//!
//! Database repository implementations for Comanda.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Service Operation                                                     │
//! │       │                                                                 │
//! │       │  db.orders().get_by_number("ORD-20260824-00042")               │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── insert(&self, order)                                              │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── update_pending(&self, order)                                      │
//! │  └── update_status(&self, ...)                                         │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test (in-memory database)                                   │
//! │  • SQL is isolated in one place                                        │
//! │  • Can swap database implementations                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`RestaurantRepository`] - Restaurant (tenant) CRUD
//! - [`TableRepository`] - Dining table CRUD
//! - [`MenuItemRepository`] - Menu item CRUD and availability
//! - [`CouponRepository`] - Coupon CRUD and atomic redemption
//! - [`OrderRepository`] - Order and line item operations
//!
//! [`RestaurantRepository`]: restaurant::RestaurantRepository
//! [`TableRepository`]: table::TableRepository
//! [`MenuItemRepository`]: menu_item::MenuItemRepository
//! [`CouponRepository`]: coupon::CouponRepository
//! [`OrderRepository`]: order::OrderRepository

pub mod coupon;
pub mod menu_item;
pub mod order;
pub mod restaurant;
pub mod table;
