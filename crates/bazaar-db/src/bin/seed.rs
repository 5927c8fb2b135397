//! # Seed Data Generator
//!
//! Populates a database with demo vendors, products and unpaid orders so the
//! reconciliation tool has something to work on.
//!
//! ## Usage
//! ```bash
//! # 20 orders (default)
//! cargo run -p bazaar-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p bazaar-db --bin seed -- --orders 200 --db ./data/bazaar.db
//! ```
//!
//! ## Generated Data
//! - One vendor per entry in `VENDORS`; odd-indexed vendors have automatic
//!   stock deduction enabled
//! - Each vendor gets its catalogue with stock 0 - 60
//! - Each order has 1-3 lines drawn across vendors, so most orders are
//!   multi-vendor

use bazaar_core::{Order, PaymentMethod, Product, Vendor};
use bazaar_db::{Database, DbConfig};
use std::env;

/// Vendors and their catalogues: (business name, [(product, price in cents)])
const VENDORS: &[(&str, &[(&str, i64)])] = &[
    (
        "Loom & Thread",
        &[
            ("Silk Scarf", 20_000),
            ("Cotton Shawl", 12_500),
            ("Block Print Stole", 8_999),
            ("Pashmina Wrap", 45_000),
        ],
    ),
    (
        "Terracotta Works",
        &[
            ("Clay Mug", 5_000),
            ("Planter Small", 3_333),
            ("Planter Large", 7_450),
            ("Tea Set", 24_000),
        ],
    ),
    (
        "Spice Route",
        &[
            ("Garam Masala 100g", 1_250),
            ("Saffron 1g", 4_999),
            ("Cardamom 50g", 2_275),
        ],
    ),
    (
        "Brass Bazaar",
        &[
            ("Diya Pair", 2_999),
            ("Bell Hanging", 6_500),
            ("Incense Holder", 1_899),
        ],
    ),
];

const PAYMENT_METHODS: &[PaymentMethod] = &[
    PaymentMethod::Card,
    PaymentMethod::Upi,
    PaymentMethod::NetBanking,
    PaymentMethod::Wallet,
    PaymentMethod::CashOnDelivery,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut orders: usize = 20;
    let mut db_path = String::from("./bazaar_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    orders = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bazaar Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --orders <N>   Number of orders to generate (default: 20)");
                println!("  -d, --db <PATH>    Database file path (default: ./bazaar_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bazaar Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Orders:   {}", orders);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Vendors and catalogue
    let mut catalogue: Vec<Product> = Vec::new();
    for (vendor_idx, (business_name, products)) in VENDORS.iter().enumerate() {
        let slug: String = business_name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        let mut vendor = Vendor::new(*business_name, format!("{slug}@vendors.example"));
        vendor.auto_stock_deduction = vendor_idx % 2 == 1;
        db.vendors().insert(&vendor).await?;

        for (product_idx, (name, price_cents)) in products.iter().enumerate() {
            let sku = format!("{}-{:03}", &slug[..4].to_uppercase(), product_idx + 1);
            let mut product = Product::new(&vendor.id, sku, *name, *price_cents);
            product.stock = ((vendor_idx * 17 + product_idx * 11) % 61) as i64;

            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", product.sku, e);
                continue;
            }
            catalogue.push(product);
        }

        println!(
            "✓ Vendor {} ({} products, auto stock: {})",
            business_name,
            products.len(),
            vendor.auto_stock_deduction
        );
    }

    if catalogue.is_empty() {
        println!("⚠ No products inserted, skipping orders");
        return Ok(());
    }

    // Orders
    println!();
    println!("Generating orders...");
    let start = std::time::Instant::now();
    let mut generated = 0;

    for n in 0..orders {
        let method = PAYMENT_METHODS[n % PAYMENT_METHODS.len()];
        let mut order = Order::new(format!("customer-{:04}", n % 37), method);

        let lines = 1 + n % 3;
        for line in 0..lines {
            let product = &catalogue[(n * 7 + line * 5) % catalogue.len()];
            let quantity = 1 + ((n + line) % 4) as i64;
            order.push_item(&product.id, &product.name, quantity, product.price_cents);
        }

        if let Err(e) = db.orders().insert(&order).await {
            eprintln!("Failed to insert order {}: {}", order.id, e);
            continue;
        }
        generated += 1;
    }

    println!("✓ Generated {} orders in {:?}", generated, start.elapsed());
    println!();
    println!("✓ Seed complete! Mark orders paid with the reconcile tool.");

    Ok(())
}
