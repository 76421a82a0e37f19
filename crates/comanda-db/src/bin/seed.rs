//! # Seed Data Generator
//!
//! Populates the database with a demo restaurant for development.
//!
//! ## Usage
//! ```bash
//! # Seed with defaults
//! cargo run -p comanda-db --bin seed
//!
//! # Specify database path
//! cargo run -p comanda-db --bin seed -- --db ./data/comanda.db
//! ```
//!
//! ## Generated Data
//! - 1 restaurant ("La Comanda")
//! - 8 dining tables with varied capacity and location
//! - A menu across all four categories
//! - 4 coupons covering the interesting shapes:
//!   percentage, capped percentage, fixed amount, limited redemptions

use chrono::{Duration, Utc};
use std::env;
use uuid::Uuid;

use comanda_core::{Coupon, DiningTable, DiscountKind, MenuCategory, MenuItem, Restaurant};
use comanda_db::{Database, DbConfig};

/// Menu entries: (name, category, price in cents).
const MENU: &[(&str, MenuCategory, i64)] = &[
    ("Sopa de tortilla", MenuCategory::Starter, 650),
    ("Guacamole con totopos", MenuCategory::Starter, 550),
    ("Ensalada de la casa", MenuCategory::Starter, 700),
    ("Pepián de pollo", MenuCategory::Main, 1450),
    ("Kak'ik", MenuCategory::Main, 1550),
    ("Tacos al pastor", MenuCategory::Main, 1100),
    ("Enchiladas verdes", MenuCategory::Main, 1200),
    ("Chile relleno", MenuCategory::Main, 1250),
    ("Flan de caramelo", MenuCategory::Dessert, 450),
    ("Tres leches", MenuCategory::Dessert, 500),
    ("Churros", MenuCategory::Dessert, 400),
    ("Agua de jamaica", MenuCategory::Beverage, 250),
    ("Horchata", MenuCategory::Beverage, 250),
    ("Limonada", MenuCategory::Beverage, 300),
    ("Café de olla", MenuCategory::Beverage, 280),
];

/// Tables: (number, capacity, location).
const TABLES: &[(i64, i64, &str)] = &[
    (1, 2, "ventana"),
    (2, 2, "ventana"),
    (3, 4, "salón principal"),
    (4, 4, "salón principal"),
    (5, 4, "salón principal"),
    (6, 6, "salón principal"),
    (7, 6, "terraza"),
    (8, 8, "terraza"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./comanda_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Comanda Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./comanda_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    // Repositories log through tracing; route that to stderr, RUST_LOG-filtered.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("🌱 Comanda Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Skip if already seeded
    if !db.restaurants().list_active().await?.is_empty() {
        println!("⚠ Database already has restaurants");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    let restaurant_id = Uuid::new_v4().to_string();

    db.restaurants()
        .insert(&Restaurant {
            id: restaurant_id.clone(),
            name: "La Comanda".to_string(),
            email: Some("hola@lacomanda.example".to_string()),
            phone: Some("+502 5555 0101".to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
        .await?;
    println!("✓ Restaurant created");

    for (number, capacity, location) in TABLES {
        db.tables()
            .insert(&DiningTable {
                id: Uuid::new_v4().to_string(),
                restaurant_id: restaurant_id.clone(),
                number: *number,
                capacity: *capacity,
                location: location.to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }
    println!("✓ {} tables created", TABLES.len());

    for (name, category, price_cents) in MENU {
        db.menu_items()
            .insert(&MenuItem {
                id: Uuid::new_v4().to_string(),
                restaurant_id: restaurant_id.clone(),
                name: name.to_string(),
                category: *category,
                price_cents: *price_cents,
                is_available: true,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }
    println!("✓ {} menu items created", MENU.len());

    let coupons = [
        // Plain 10%, no strings attached
        coupon(
            "VERANO-10",
            DiscountKind::Percentage,
            1000,
            0,
            None,
            None,
            0,
            now,
        ),
        // 25% but capped at 5.00
        coupon(
            "FIESTA-25",
            DiscountKind::Percentage,
            2500,
            0,
            Some(500),
            None,
            0,
            now,
        ),
        // Flat 5.00 off orders of 30.00 or more
        coupon(
            "BIENVENIDA",
            DiscountKind::FixedAmount,
            0,
            500,
            None,
            None,
            3000,
            now,
        ),
        // First 50 redeemers only
        coupon(
            "PRIMEROS-50",
            DiscountKind::Percentage,
            1500,
            0,
            None,
            Some(50),
            0,
            now,
        ),
    ];

    for c in &coupons {
        db.coupons().insert(c).await?;
    }
    println!("✓ {} coupons created", coupons.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds a 90-day coupon with the given shape.
#[allow(clippy::too_many_arguments)]
fn coupon(
    code: &str,
    kind: DiscountKind,
    percentage_bps: u32,
    fixed_amount_cents: i64,
    discount_cap_cents: Option<i64>,
    max_redemptions: Option<i64>,
    minimum_subtotal_cents: i64,
    now: chrono::DateTime<Utc>,
) -> Coupon {
    Coupon {
        id: Uuid::new_v4().to_string(),
        code: code.to_string(),
        description: None,
        kind,
        percentage_bps,
        fixed_amount_cents,
        starts_at: now,
        expires_at: now + Duration::days(90),
        max_redemptions,
        current_redemptions: 0,
        minimum_subtotal_cents,
        discount_cap_cents,
        restaurant_id: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
