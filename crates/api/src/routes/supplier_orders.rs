//! Supplier order endpoints.
//!
//! Supplier orders bring stock in rather than out, so saves never hit the
//! availability guard: there is no shortfall to confirm on incoming goods.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use lagera_core::document::SupplierOrderStatus;
use lagera_db::entities::supplier_orders;
use lagera_db::{
    DocumentItemInput, StockError, SupplierOrderError, SupplierOrderFilter, SupplierOrderInput,
    SupplierOrderRepository, SupplierOrderWithItems,
};
use lagera_shared::types::{PageRequest, PageResponse};

use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating or updating a supplier order.
#[derive(Debug, Deserialize)]
pub struct SaveSupplierOrderRequest {
    /// Document number (unique across supplier orders).
    pub number: String,
    /// Supplier display name.
    pub supplier_name: String,
    /// Status: "draft", "confirmed", "in_transit", "completed" or "cancelled".
    pub status: String,
    /// Document date (YYYY-MM-DD).
    pub issued_on: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Line items.
    pub items: Vec<SupplierOrderItemRequest>,
}

/// Request body for a single supplier order line.
#[derive(Debug, Deserialize)]
pub struct SupplierOrderItemRequest {
    /// Product ID.
    pub product_id: Uuid,
    /// Quantity (must be positive).
    pub quantity: i64,
    /// Unit cost as a decimal string.
    pub unit_price: String,
}

/// Query parameters for listing supplier orders.
#[derive(Debug, Deserialize)]
pub struct ListSupplierOrdersQuery {
    /// Filter by status.
    pub status: Option<String>,
    /// Filter by document date range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Filter by document date range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default: 20, max: 100).
    pub per_page: Option<u32>,
}

/// Response for a supplier order with its items.
#[derive(Debug, Serialize)]
pub struct SupplierOrderResponse {
    /// Supplier order ID.
    pub id: Uuid,
    /// Document number.
    pub number: String,
    /// Supplier display name.
    pub supplier_name: String,
    /// Current status.
    pub status: String,
    /// Document date (YYYY-MM-DD).
    pub issued_on: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Sum of line totals, as a decimal string.
    pub total: String,
    /// Line items.
    pub items: Vec<SupplierOrderItemResponse>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Response for a single supplier order line.
#[derive(Debug, Serialize)]
pub struct SupplierOrderItemResponse {
    /// Line ID.
    pub id: Uuid,
    /// Product ID.
    pub product_id: Uuid,
    /// Product name captured at save time.
    pub product_name: String,
    /// Quantity.
    pub quantity: i64,
    /// Unit cost as a decimal string.
    pub unit_price: String,
    /// Quantity times unit cost, as a decimal string.
    pub line_total: String,
}

/// Response for a supplier order header in list results.
#[derive(Debug, Serialize)]
pub struct SupplierOrderListItem {
    /// Supplier order ID.
    pub id: Uuid,
    /// Document number.
    pub number: String,
    /// Supplier display name.
    pub supplier_name: String,
    /// Current status.
    pub status: String,
    /// Document date (YYYY-MM-DD).
    pub issued_on: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/supplier-orders` - Create a new supplier order.
async fn create_supplier_order(
    State(state): State<AppState>,
    Json(payload): Json<SaveSupplierOrderRequest>,
) -> impl IntoResponse {
    let input = match parse_save_request(payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let repo = SupplierOrderRepository::new((*state.db).clone());
    match repo.create(input).await {
        Ok(result) => {
            info!(
                supplier_order_id = %result.supplier_order.id,
                number = %result.supplier_order.number,
                "Supplier order created"
            );
            (
                StatusCode::CREATED,
                Json(supplier_order_to_response(result)),
            )
                .into_response()
        }
        Err(e) => supplier_order_error_response(e, "Failed to create supplier order"),
    }
}

/// PUT `/supplier-orders/{id}` - Update a supplier order.
async fn update_supplier_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveSupplierOrderRequest>,
) -> impl IntoResponse {
    let input = match parse_save_request(payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let repo = SupplierOrderRepository::new((*state.db).clone());
    match repo.update(id, input).await {
        Ok(result) => {
            info!(
                supplier_order_id = %result.supplier_order.id,
                number = %result.supplier_order.number,
                "Supplier order updated"
            );
            (StatusCode::OK, Json(supplier_order_to_response(result))).into_response()
        }
        Err(e) => supplier_order_error_response(e, "Failed to update supplier order"),
    }
}

/// GET `/supplier-orders` - List supplier orders with filters and pagination.
async fn list_supplier_orders(
    State(state): State<AppState>,
    Query(query): Query<ListSupplierOrdersQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        Some(value) => match SupplierOrderStatus::parse(value) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message":
                            "Status must be draft, confirmed, in_transit, completed or cancelled"
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let filter = SupplierOrderFilter {
        status,
        date_from: query.from,
        date_to: query.to,
    };
    let page = page_request(query.page, query.per_page);

    let repo = SupplierOrderRepository::new((*state.db).clone());
    match repo.list(filter, &page).await {
        Ok(response) => {
            let body = PageResponse {
                data: response
                    .data
                    .into_iter()
                    .map(supplier_order_to_list_item)
                    .collect::<Vec<_>>(),
                meta: response.meta,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => supplier_order_error_response(e, "Failed to list supplier orders"),
    }
}

/// GET `/supplier-orders/{id}` - Get a supplier order by ID.
async fn get_supplier_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = SupplierOrderRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(result) => (StatusCode::OK, Json(supplier_order_to_response(result))).into_response(),
        Err(e) => supplier_order_error_response(e, "Failed to get supplier order"),
    }
}

/// DELETE `/supplier-orders/{id}` - Delete a supplier order.
///
/// Takes back any stock a completed receipt had added.
async fn delete_supplier_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = SupplierOrderRepository::new((*state.db).clone());
    match repo.delete(id).await {
        Ok(()) => {
            info!(supplier_order_id = %id, "Supplier order deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => supplier_order_error_response(e, "Failed to delete supplier order"),
    }
}

/// Creates supplier order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/supplier-orders",
            get(list_supplier_orders).post(create_supplier_order),
        )
        .route(
            "/supplier-orders/{id}",
            get(get_supplier_order)
                .put(update_supplier_order)
                .delete(delete_supplier_order),
        )
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Validates a save request and converts it into repository input.
fn parse_save_request(
    payload: SaveSupplierOrderRequest,
) -> Result<SupplierOrderInput, Response> {
    let Some(status) = SupplierOrderStatus::parse(&payload.status) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_status",
                "message": "Status must be draft, confirmed, in_transit, completed or cancelled"
            })),
        )
            .into_response());
    };

    let mut items = Vec::with_capacity(payload.items.len());
    for item in &payload.items {
        let unit_price = match Decimal::from_str(&item.unit_price) {
            Ok(price) if price >= Decimal::ZERO => price,
            _ => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_price",
                        "message": "Unit cost must be a non-negative decimal string"
                    })),
                )
                    .into_response());
            }
        };
        items.push(DocumentItemInput {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price,
        });
    }

    Ok(SupplierOrderInput {
        number: payload.number,
        supplier_name: payload.supplier_name,
        status,
        issued_on: payload.issued_on,
        notes: payload.notes,
        items,
    })
}

/// Maps repository errors onto HTTP responses.
fn supplier_order_error_response(error: SupplierOrderError, context: &str) -> Response {
    match error {
        SupplierOrderError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "supplier_order_not_found",
                "message": "Supplier order not found"
            })),
        )
            .into_response(),
        SupplierOrderError::DuplicateNumber(_) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_number",
                "message": "A supplier order with this number already exists"
            })),
        )
            .into_response(),
        SupplierOrderError::Stock(StockError::ProductNotFound(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "product_not_found",
                "message": "A referenced product does not exist"
            })),
        )
            .into_response(),
        SupplierOrderError::Stock(StockError::InvalidQuantity(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_quantity",
                "message": "Quantity must be positive"
            })),
        )
            .into_response(),
        e => {
            error!(error = %e, "{context}");
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

fn supplier_order_to_response(result: SupplierOrderWithItems) -> SupplierOrderResponse {
    let mut total = Decimal::ZERO;
    let items: Vec<SupplierOrderItemResponse> = result
        .items
        .into_iter()
        .map(|item| {
            let line_total = item.unit_price * Decimal::from(item.quantity);
            total += line_total;
            SupplierOrderItemResponse {
                id: item.id,
                product_id: item.product_id,
                product_name: item.product_name,
                quantity: item.quantity,
                unit_price: item.unit_price.to_string(),
                line_total: line_total.to_string(),
            }
        })
        .collect();

    let supplier_order = result.supplier_order;
    SupplierOrderResponse {
        id: supplier_order.id,
        number: supplier_order.number,
        supplier_name: supplier_order.supplier_name,
        status: SupplierOrderStatus::from(supplier_order.status)
            .as_str()
            .to_string(),
        issued_on: supplier_order.issued_on.to_string(),
        notes: supplier_order.notes,
        total: total.to_string(),
        items,
        created_at: supplier_order.created_at.to_rfc3339(),
        updated_at: supplier_order.updated_at.to_rfc3339(),
    }
}

fn supplier_order_to_list_item(supplier_order: supplier_orders::Model) -> SupplierOrderListItem {
    SupplierOrderListItem {
        id: supplier_order.id,
        number: supplier_order.number,
        supplier_name: supplier_order.supplier_name,
        status: SupplierOrderStatus::from(supplier_order.status)
            .as_str()
            .to_string(),
        issued_on: supplier_order.issued_on.to_string(),
        created_at: supplier_order.created_at.to_rfc3339(),
        updated_at: supplier_order.updated_at.to_rfc3339(),
    }
}

fn page_request(page: Option<u32>, per_page: Option<u32>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest {
        page: page.unwrap_or(defaults.page),
        per_page: per_page.unwrap_or(defaults.per_page),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn save_request(status: &str) -> SaveSupplierOrderRequest {
        SaveSupplierOrderRequest {
            number: "SUP-2026-0001".to_string(),
            supplier_name: "Nordic Parts".to_string(),
            status: status.to_string(),
            issued_on: NaiveDate::from_ymd_opt(2026, 8, 15).unwrap(),
            notes: None,
            items: vec![],
        }
    }

    #[test]
    fn test_parse_save_request_accepts_known_statuses() {
        for status in ["draft", "confirmed", "in_transit", "completed", "cancelled"] {
            assert!(parse_save_request(save_request(status)).is_ok());
        }
    }

    #[test]
    fn test_parse_save_request_rejects_unknown_status() {
        assert!(parse_save_request(save_request("received")).is_err());
    }
}
