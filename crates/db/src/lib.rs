//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for products, documents, and the stock ledger
//! - The [`StockLedger`] transactional API and document repositories
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    CreateProductInput, DocumentItemInput, InvoiceError, InvoiceFilter, InvoiceInput,
    InvoiceRepository, InvoiceWithItems, OrderError, OrderFilter, OrderInput, OrderRepository,
    OrderWithItems, ProductError, ProductRepository, StockError, StockLedger, SupplierOrderError,
    SupplierOrderFilter, SupplierOrderInput, SupplierOrderRepository, SupplierOrderWithItems,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
