//! # Catalog Service
//!
//! CRUD for the entities orders are built from: restaurants, dining tables
//! and menu items. Everything here is soft-delete only; historical orders
//! keep valid references forever.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use comanda_core::validation::{validate_menu_item_name, validate_non_negative_cents};
use comanda_core::{
    CoreError, DiningTable, MenuCategory, MenuItem, Restaurant, ValidationError,
};
use comanda_db::Database;

use crate::error::{ApiError, ApiResult};

/// Catalog management operations.
#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    /// Creates a new CatalogService.
    pub fn new(db: Database) -> Self {
        CatalogService { db }
    }

    // -------------------------------------------------------------------------
    // Restaurants
    // -------------------------------------------------------------------------

    /// Creates a restaurant.
    pub async fn create_restaurant(
        &self,
        name: &str,
        email: Option<String>,
        phone: Option<String>,
    ) -> ApiResult<Restaurant> {
        debug!(name = %name, "create_restaurant");

        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::from(ValidationError::Required {
                field: "name".to_string(),
            })
            .into());
        }

        let now = Utc::now();
        let restaurant = Restaurant {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email,
            phone,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.db.restaurants().insert(&restaurant).await?;
        info!(id = %restaurant.id, name = %restaurant.name, "Restaurant created");
        Ok(restaurant)
    }

    /// Gets an active restaurant.
    pub async fn get_restaurant(&self, id: &str) -> ApiResult<Restaurant> {
        Ok(self.db.restaurants().get_active(id).await?)
    }

    /// Lists all active restaurants.
    pub async fn list_restaurants(&self) -> ApiResult<Vec<Restaurant>> {
        Ok(self.db.restaurants().list_active().await?)
    }

    // -------------------------------------------------------------------------
    // Dining Tables
    // -------------------------------------------------------------------------

    /// Creates a dining table.
    ///
    /// ## Errors
    /// Conflict when the table number is already taken in this restaurant.
    pub async fn create_table(
        &self,
        restaurant_id: &str,
        number: i64,
        capacity: i64,
        location: &str,
    ) -> ApiResult<DiningTable> {
        debug!(restaurant_id = %restaurant_id, number = number, "create_table");

        if number <= 0 {
            return Err(ApiError::validation("Table number must be positive"));
        }
        if capacity <= 0 {
            return Err(ApiError::validation("Table capacity must be positive"));
        }
        // Referential sanity before the FK fires a less readable error.
        self.get_restaurant(restaurant_id).await?;

        let now = Utc::now();
        let table = DiningTable {
            id: Uuid::new_v4().to_string(),
            restaurant_id: restaurant_id.to_string(),
            number,
            capacity,
            location: location.trim().to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.db.tables().insert(&table).await?;
        info!(id = %table.id, number = table.number, "Table created");
        Ok(table)
    }

    /// Gets an active table.
    pub async fn get_table(&self, id: &str) -> ApiResult<DiningTable> {
        Ok(self.db.tables().get_active(id).await?)
    }

    /// Lists active tables for a restaurant, by table number.
    pub async fn list_tables(&self, restaurant_id: &str) -> ApiResult<Vec<DiningTable>> {
        Ok(self.db.tables().list_active(restaurant_id).await?)
    }

    /// Updates a table's capacity and location.
    pub async fn update_table(
        &self,
        id: &str,
        capacity: i64,
        location: &str,
    ) -> ApiResult<DiningTable> {
        if capacity <= 0 {
            return Err(ApiError::validation("Table capacity must be positive"));
        }

        let mut table = self.get_table(id).await?;
        table.capacity = capacity;
        table.location = location.trim().to_string();
        self.db.tables().update(&table).await?;

        self.get_table(id).await
    }

    /// Soft-deactivates a table.
    pub async fn deactivate_table(&self, id: &str) -> ApiResult<()> {
        self.db.tables().deactivate(id).await?;
        info!(id = %id, "Table deactivated");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Menu Items
    // -------------------------------------------------------------------------

    /// Creates a menu item, available by default.
    pub async fn create_menu_item(
        &self,
        restaurant_id: &str,
        name: &str,
        category: MenuCategory,
        price_cents: i64,
    ) -> ApiResult<MenuItem> {
        debug!(restaurant_id = %restaurant_id, name = %name, "create_menu_item");

        let name = validate_menu_item_name(name).map_err(CoreError::from)?;
        validate_non_negative_cents("priceCents", price_cents).map_err(CoreError::from)?;
        self.get_restaurant(restaurant_id).await?;

        let now = Utc::now();
        let item = MenuItem {
            id: Uuid::new_v4().to_string(),
            restaurant_id: restaurant_id.to_string(),
            name,
            category,
            price_cents,
            is_available: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.db.menu_items().insert(&item).await?;
        info!(id = %item.id, name = %item.name, "Menu item created");
        Ok(item)
    }

    /// Gets an active menu item.
    pub async fn get_menu_item(&self, id: &str) -> ApiResult<MenuItem> {
        Ok(self.db.menu_items().get_active(id).await?)
    }

    /// Lists active menu items, optionally filtered by category.
    pub async fn list_menu(
        &self,
        restaurant_id: &str,
        category: Option<MenuCategory>,
    ) -> ApiResult<Vec<MenuItem>> {
        Ok(self.db.menu_items().list_active(restaurant_id, category).await?)
    }

    /// Updates a menu item's name, category and price.
    ///
    /// Existing orders keep their snapshots; only future orders see the
    /// new price.
    pub async fn update_menu_item(
        &self,
        id: &str,
        name: &str,
        category: MenuCategory,
        price_cents: i64,
    ) -> ApiResult<MenuItem> {
        let name = validate_menu_item_name(name).map_err(CoreError::from)?;
        validate_non_negative_cents("priceCents", price_cents).map_err(CoreError::from)?;

        let mut item = self.get_menu_item(id).await?;
        item.name = name;
        item.category = category;
        item.price_cents = price_cents;
        self.db.menu_items().update(&item).await?;

        self.get_menu_item(id).await
    }

    /// Marks a menu item out of stock / back in stock.
    pub async fn set_menu_item_availability(&self, id: &str, available: bool) -> ApiResult<()> {
        self.db.menu_items().set_availability(id, available).await?;
        info!(id = %id, available = available, "Menu item availability changed");
        Ok(())
    }

    /// Soft-deactivates a menu item.
    pub async fn deactivate_menu_item(&self, id: &str) -> ApiResult<()> {
        self.db.menu_items().deactivate(id).await?;
        info!(id = %id, "Menu item deactivated");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use comanda_db::DbConfig;

    use crate::error::ErrorCode;

    async fn service() -> CatalogService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CatalogService::new(db)
    }

    #[tokio::test]
    async fn test_restaurant_roundtrip() {
        let svc = service().await;
        let created = svc
            .create_restaurant("El Fogón", Some("hola@fogon.gt".to_string()), None)
            .await
            .unwrap();

        let found = svc.get_restaurant(&created.id).await.unwrap();
        assert_eq!(found.name, "El Fogón");
        assert_eq!(found.email.as_deref(), Some("hola@fogon.gt"));
    }

    #[tokio::test]
    async fn test_blank_restaurant_name_rejected() {
        let svc = service().await;
        let err = svc.create_restaurant("   ", None, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_duplicate_table_number_is_conflict() {
        let svc = service().await;
        let restaurant = svc.create_restaurant("El Fogón", None, None).await.unwrap();
        svc.create_table(&restaurant.id, 1, 4, "salón").await.unwrap();

        let err = svc
            .create_table(&restaurant.id, 1, 2, "terraza")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_table_update_and_deactivate() {
        let svc = service().await;
        let restaurant = svc.create_restaurant("El Fogón", None, None).await.unwrap();
        let table = svc.create_table(&restaurant.id, 1, 4, "salón").await.unwrap();

        let updated = svc.update_table(&table.id, 6, "terraza").await.unwrap();
        assert_eq!(updated.capacity, 6);
        assert_eq!(updated.location, "terraza");

        svc.deactivate_table(&table.id).await.unwrap();
        let err = svc.get_table(&table.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(svc.list_tables(&restaurant.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_menu_item_update_keeps_identity() {
        let svc = service().await;
        let restaurant = svc.create_restaurant("El Fogón", None, None).await.unwrap();
        let item = svc
            .create_menu_item(&restaurant.id, "Pepián", MenuCategory::Main, 2500)
            .await
            .unwrap();
        assert!(item.is_available);

        let updated = svc
            .update_menu_item(&item.id, "Pepián de pollo", MenuCategory::Main, 2800)
            .await
            .unwrap();
        assert_eq!(updated.id, item.id);
        assert_eq!(updated.name, "Pepián de pollo");
        assert_eq!(updated.price_cents, 2800);
    }

    #[tokio::test]
    async fn test_overlong_menu_item_name_rejected() {
        let svc = service().await;
        let restaurant = svc.create_restaurant("El Fogón", None, None).await.unwrap();
        let long_name = "x".repeat(101);

        let err = svc
            .create_menu_item(&restaurant.id, &long_name, MenuCategory::Main, 2500)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // The same bound holds on update.
        let item = svc
            .create_menu_item(&restaurant.id, "Pepián", MenuCategory::Main, 2500)
            .await
            .unwrap();
        let err = svc
            .update_menu_item(&item.id, &long_name, MenuCategory::Main, 2500)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let svc = service().await;
        let restaurant = svc.create_restaurant("El Fogón", None, None).await.unwrap();

        let err = svc
            .create_menu_item(&restaurant.id, "Gratis", MenuCategory::Beverage, -100)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_list_menu_filters_by_category() {
        let svc = service().await;
        let restaurant = svc.create_restaurant("El Fogón", None, None).await.unwrap();
        svc.create_menu_item(&restaurant.id, "Pepián", MenuCategory::Main, 2500)
            .await
            .unwrap();
        svc.create_menu_item(&restaurant.id, "Horchata", MenuCategory::Beverage, 800)
            .await
            .unwrap();

        let all = svc.list_menu(&restaurant.id, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let drinks = svc
            .list_menu(&restaurant.id, Some(MenuCategory::Beverage))
            .await
            .unwrap();
        assert_eq!(drinks.len(), 1);
        assert_eq!(drinks[0].name, "Horchata");
    }
}
