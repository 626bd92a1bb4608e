//! Database seeder for Lagera development and testing.
//!
//! Seeds a small product catalog plus sample documents in each lifecycle
//! stage, going through the repositories so reservations, movements and
//! stock counters come out consistent.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::str::FromStr;

use lagera_core::document::{InvoiceStatus, OrderStatus, SupplierOrderStatus};
use lagera_db::entities::{invoices, orders, products, supplier_orders};
use lagera_db::{
    CreateProductInput, DocumentItemInput, InvoiceInput, InvoiceRepository, OrderInput,
    OrderRepository, ProductRepository, SupplierOrderInput, SupplierOrderRepository,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = lagera_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding products...");
    seed_products(&db).await;

    println!("Seeding supplier orders...");
    seed_supplier_orders(&db).await;

    println!("Seeding orders...");
    seed_orders(&db).await;

    println!("Seeding invoices...");
    seed_invoices(&db).await;

    println!("Seeding complete!");
}

/// Seeds the product catalog with opening stock.
async fn seed_products(db: &DatabaseConnection) {
    let catalog = [
        ("SKU-0001", "Steel Anvil 25kg", "149.00", 40),
        ("SKU-0002", "Hex Bolt M8 (100 pack)", "12.50", 500),
        ("SKU-0003", "Pine Pallet 120x80", "9.90", 200),
        ("SKU-0004", "Packing Tape Roll", "2.35", 1000),
        ("SKU-0005", "Cardboard Box L", "1.80", 750),
        ("SKU-0006", "Pallet Wrap 500mm", "7.25", 120),
    ];

    let repo = ProductRepository::new(db.clone());
    let mut inserted = 0;

    for (sku, name, price, quantity) in catalog {
        if find_product(db, sku).await.is_some() {
            continue;
        }

        let input = CreateProductInput {
            sku: sku.to_string(),
            name: name.to_string(),
            unit_price: Decimal::from_str(price).unwrap(),
            initial_quantity: quantity,
        };

        if let Err(e) = repo.create(input).await {
            eprintln!("Failed to insert product {sku}: {e}");
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} products");
}

/// Seeds supplier orders: one completed receipt and one still in flight.
async fn seed_supplier_orders(db: &DatabaseConnection) {
    let today = Utc::now().date_naive();
    let repo = SupplierOrderRepository::new(db.clone());

    let documents = [
        (
            "SUP-2026-0001",
            "Nordic Forge AB",
            SupplierOrderStatus::Completed,
            today - Duration::days(14),
            vec![("SKU-0001", 10), ("SKU-0006", 60)],
        ),
        (
            "SUP-2026-0002",
            "Boxline Packaging",
            SupplierOrderStatus::Confirmed,
            today - Duration::days(2),
            vec![("SKU-0005", 300)],
        ),
    ];

    for (number, supplier, status, issued_on, lines) in documents {
        if supplier_order_exists(db, number).await {
            println!("  Supplier order {number} already exists, skipping...");
            continue;
        }

        let Some(items) = resolve_lines(db, &lines).await else {
            eprintln!("Failed to resolve products for supplier order {number}");
            continue;
        };

        let input = SupplierOrderInput {
            number: number.to_string(),
            supplier_name: supplier.to_string(),
            status,
            issued_on,
            notes: None,
            items,
        };

        match repo.create(input).await {
            Ok(result) => println!("  Created supplier order {}", result.supplier_order.number),
            Err(e) => eprintln!("Failed to insert supplier order {number}: {e}"),
        }
    }
}

/// Seeds orders: one reserving stock, one already completed.
async fn seed_orders(db: &DatabaseConnection) {
    let today = Utc::now().date_naive();
    let repo = OrderRepository::new(db.clone());

    let documents = [
        (
            "ORD-2026-0001",
            "Bergen Workshop",
            OrderStatus::InProgress,
            today - Duration::days(3),
            vec![("SKU-0001", 5), ("SKU-0002", 20)],
        ),
        (
            "ORD-2026-0002",
            "Havn Marine",
            OrderStatus::Completed,
            today - Duration::days(7),
            vec![("SKU-0003", 12)],
        ),
    ];

    for (number, customer, status, issued_on, lines) in documents {
        if order_exists(db, number).await {
            println!("  Order {number} already exists, skipping...");
            continue;
        }

        let Some(items) = resolve_lines(db, &lines).await else {
            eprintln!("Failed to resolve products for order {number}");
            continue;
        };

        let input = OrderInput {
            number: number.to_string(),
            customer_name: customer.to_string(),
            status,
            issued_on,
            notes: None,
            items,
            allow_shortfall: false,
        };

        match repo.create(input).await {
            Ok(result) => println!("  Created order {}", result.order.number),
            Err(e) => eprintln!("Failed to insert order {number}: {e}"),
        }
    }
}

/// Seeds one issued invoice, deducting stock on the spot.
async fn seed_invoices(db: &DatabaseConnection) {
    let today = Utc::now().date_naive();
    let repo = InvoiceRepository::new(db.clone());

    let number = "INV-2026-0001";
    if invoice_exists(db, number).await {
        println!("  Invoice {number} already exists, skipping...");
        return;
    }

    let lines = [("SKU-0004", 25), ("SKU-0005", 40)];
    let Some(items) = resolve_lines(db, &lines).await else {
        eprintln!("Failed to resolve products for invoice {number}");
        return;
    };

    let input = InvoiceInput {
        number: number.to_string(),
        customer_name: "Fjord Retail AS".to_string(),
        status: InvoiceStatus::Issued,
        issued_on: today - Duration::days(1),
        notes: None,
        items,
        allow_shortfall: false,
    };

    match repo.create(input).await {
        Ok(result) => println!("  Created invoice {}", result.invoice.number),
        Err(e) => eprintln!("Failed to insert invoice {number}: {e}"),
    }
}

/// Turns (sku, quantity) pairs into document items priced at the catalog price.
async fn resolve_lines(
    db: &DatabaseConnection,
    lines: &[(&str, i64)],
) -> Option<Vec<DocumentItemInput>> {
    let mut items = Vec::with_capacity(lines.len());
    for (sku, quantity) in lines {
        let product = find_product(db, sku).await?;
        items.push(DocumentItemInput {
            product_id: product.id,
            quantity: *quantity,
            unit_price: product.unit_price,
        });
    }
    Some(items)
}

async fn find_product(db: &DatabaseConnection, sku: &str) -> Option<products::Model> {
    products::Entity::find()
        .filter(products::Column::Sku.eq(sku))
        .one(db)
        .await
        .ok()
        .flatten()
}

async fn order_exists(db: &DatabaseConnection, number: &str) -> bool {
    orders::Entity::find()
        .filter(orders::Column::Number.eq(number))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
}

async fn invoice_exists(db: &DatabaseConnection, number: &str) -> bool {
    invoices::Entity::find()
        .filter(invoices::Column::Number.eq(number))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
}

async fn supplier_order_exists(db: &DatabaseConnection, number: &str) -> bool {
    supplier_orders::Entity::find()
        .filter(supplier_orders::Column::Number.eq(number))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
}
