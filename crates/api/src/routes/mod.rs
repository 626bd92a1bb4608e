//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod health;
pub mod invoices;
pub mod orders;
pub mod products;
pub mod stock;
pub mod supplier_orders;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(products::routes())
        .merge(stock::routes())
        .merge(orders::routes())
        .merge(invoices::routes())
        .merge(supplier_orders::routes())
}
