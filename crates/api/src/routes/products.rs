//! Product endpoints.
//!
//! Stock counters live on the product row; every response derives
//! `available_quantity` as physical minus reserved rather than reading a
//! stored column.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use lagera_db::entities::sea_orm_active_enums::{
    DocumentType, MovementDirection, MovementReason,
};
use lagera_db::entities::{products, stock_movements};
use lagera_db::{CreateProductInput, ProductError, ProductRepository};
use lagera_shared::types::{PageRequest, PageResponse};

use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a product.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// Stock keeping unit (unique).
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Unit price as a decimal string, e.g. "19.99".
    pub unit_price: String,
    /// Opening physical stock (defaults to 0).
    #[serde(default)]
    pub initial_quantity: i64,
}

/// Response for a product.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    /// Product ID.
    pub id: Uuid,
    /// Stock keeping unit.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Unit price as a decimal string.
    pub unit_price: String,
    /// Units physically on hand.
    pub physical_quantity: i64,
    /// Units held by active reservations.
    pub reserved_quantity: i64,
    /// Units free to promise: physical minus reserved.
    pub available_quantity: i64,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Response for a single stock movement.
#[derive(Debug, Serialize)]
pub struct MovementResponse {
    /// Movement ID.
    pub id: Uuid,
    /// Product ID.
    pub product_id: Uuid,
    /// Movement date (YYYY-MM-DD).
    pub moved_on: String,
    /// Direction: "inward" or "outward".
    pub direction: String,
    /// Quantity moved (always positive).
    pub quantity: i64,
    /// Business reason for the movement.
    pub reason: String,
    /// Source document type, if document-driven.
    pub document_type: Option<String>,
    /// Source document number, if document-driven.
    pub document_number: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/products` - Create a new product.
async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> impl IntoResponse {
    let unit_price = match Decimal::from_str(&payload.unit_price) {
        Ok(price) if price >= Decimal::ZERO => price,
        Ok(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_price",
                    "message": "Unit price must not be negative"
                })),
            )
                .into_response();
        }
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_price",
                    "message": "Unit price must be a decimal string"
                })),
            )
                .into_response();
        }
    };

    let repo = ProductRepository::new((*state.db).clone());
    let input = CreateProductInput {
        sku: payload.sku,
        name: payload.name,
        unit_price,
        initial_quantity: payload.initial_quantity,
    };

    match repo.create(input).await {
        Ok(product) => {
            info!(product_id = %product.id, sku = %product.sku, "Product created");
            (StatusCode::CREATED, Json(product_to_response(product))).into_response()
        }
        Err(ProductError::DuplicateSku(_)) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_sku",
                "message": "A product with this SKU already exists"
            })),
        )
            .into_response(),
        Err(ProductError::NegativeOpeningStock(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "negative_opening_stock",
                "message": "Opening stock must not be negative"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to create product");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// GET `/products` - List products with pagination.
async fn list_products(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let repo = ProductRepository::new((*state.db).clone());

    match repo.list(&page).await {
        Ok(response) => {
            let body = PageResponse {
                data: response
                    .data
                    .into_iter()
                    .map(product_to_response)
                    .collect::<Vec<_>>(),
                meta: response.meta,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list products");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// GET `/products/{id}` - Get a product by ID.
async fn get_product(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = ProductRepository::new((*state.db).clone());

    match repo.get(id).await {
        Ok(product) => (StatusCode::OK, Json(product_to_response(product))).into_response(),
        Err(ProductError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "product_not_found",
                "message": "Product not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to get product");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// GET `/products/{id}/movements` - List the movement log for a product.
///
/// Newest entries first.
async fn list_product_movements(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let repo = ProductRepository::new((*state.db).clone());

    match repo.list_movements(id, &page).await {
        Ok(response) => {
            let body = PageResponse {
                data: response
                    .data
                    .into_iter()
                    .map(movement_to_response)
                    .collect::<Vec<_>>(),
                meta: response.meta,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(ProductError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "product_not_found",
                "message": "Product not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list stock movements");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// Creates product routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", get(get_product))
        .route("/products/{id}/movements", get(list_product_movements))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn product_to_response(product: products::Model) -> ProductResponse {
    let available = product.physical_quantity - product.reserved_quantity;
    ProductResponse {
        id: product.id,
        sku: product.sku,
        name: product.name,
        unit_price: product.unit_price.to_string(),
        physical_quantity: product.physical_quantity,
        reserved_quantity: product.reserved_quantity,
        available_quantity: available,
        created_at: product.created_at.to_rfc3339(),
        updated_at: product.updated_at.to_rfc3339(),
    }
}

fn movement_to_response(movement: stock_movements::Model) -> MovementResponse {
    MovementResponse {
        id: movement.id,
        product_id: movement.product_id,
        moved_on: movement.moved_on.to_string(),
        direction: direction_to_string(&movement.direction).to_string(),
        quantity: movement.quantity,
        reason: reason_to_string(&movement.reason).to_string(),
        document_type: movement
            .document_type
            .as_ref()
            .map(|t| document_type_to_string(t).to_string()),
        document_number: movement.document_number,
        notes: movement.notes,
        created_at: movement.created_at.to_rfc3339(),
    }
}

fn direction_to_string(direction: &MovementDirection) -> &'static str {
    match direction {
        MovementDirection::Inward => "inward",
        MovementDirection::Outward => "outward",
    }
}

fn reason_to_string(reason: &MovementReason) -> &'static str {
    match reason {
        MovementReason::Purchase => "purchase",
        MovementReason::Sale => "sale",
        MovementReason::Return => "return",
        MovementReason::Inventory => "inventory",
        MovementReason::Correction => "correction",
    }
}

fn document_type_to_string(document_type: &DocumentType) -> &'static str {
    match document_type {
        DocumentType::Order => "order",
        DocumentType::Invoice => "invoice",
        DocumentType::SupplierOrder => "supplier_order",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_to_string() {
        assert_eq!(direction_to_string(&MovementDirection::Inward), "inward");
        assert_eq!(direction_to_string(&MovementDirection::Outward), "outward");
    }

    #[test]
    fn test_reason_to_string() {
        assert_eq!(reason_to_string(&MovementReason::Purchase), "purchase");
        assert_eq!(reason_to_string(&MovementReason::Sale), "sale");
        assert_eq!(reason_to_string(&MovementReason::Return), "return");
        assert_eq!(reason_to_string(&MovementReason::Inventory), "inventory");
        assert_eq!(reason_to_string(&MovementReason::Correction), "correction");
    }

    #[test]
    fn test_document_type_to_string() {
        assert_eq!(document_type_to_string(&DocumentType::Order), "order");
        assert_eq!(document_type_to_string(&DocumentType::Invoice), "invoice");
        assert_eq!(
            document_type_to_string(&DocumentType::SupplierOrder),
            "supplier_order"
        );
    }
}
