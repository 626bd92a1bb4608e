//! Customer order endpoints.
//!
//! Saving an order applies its stock side effects in the same database
//! transaction: reservations while in progress, deduction on completion.
//! A save that would overdraw available stock is rejected with 409 and a
//! shortfall report unless the client sets `allow_shortfall`.

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

use lagera_core::document::OrderStatus;
use lagera_db::entities::orders;
use lagera_db::{
    DocumentItemInput, OrderError, OrderFilter, OrderInput, OrderRepository, OrderWithItems,
    StockError,
};
use lagera_shared::types::{PageRequest, PageResponse};

use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating or updating an order.
#[derive(Debug, Deserialize)]
pub struct SaveOrderRequest {
    /// Document number (unique across orders).
    pub number: String,
    /// Customer display name.
    pub customer_name: String,
    /// Status: "new", "in_progress", "completed" or "cancelled".
    pub status: String,
    /// Document date (YYYY-MM-DD).
    pub issued_on: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Line items.
    pub items: Vec<OrderItemRequest>,
    /// Save even if available stock cannot cover the requested quantities.
    #[serde(default)]
    pub allow_shortfall: bool,
}

/// Request body for a single order line.
#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    /// Product ID.
    pub product_id: Uuid,
    /// Quantity (must be positive).
    pub quantity: i64,
    /// Unit price as a decimal string.
    pub unit_price: String,
}

/// Query parameters for listing orders.
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
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

/// Response for an order with its items.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Order ID.
    pub id: Uuid,
    /// Document number.
    pub number: String,
    /// Customer display name.
    pub customer_name: String,
    /// Current status.
    pub status: String,
    /// Document date (YYYY-MM-DD).
    pub issued_on: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Sum of line totals, as a decimal string.
    pub total: String,
    /// Line items.
    pub items: Vec<OrderItemResponse>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Response for a single order line.
#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    /// Line ID.
    pub id: Uuid,
    /// Product ID.
    pub product_id: Uuid,
    /// Product name captured at save time.
    pub product_name: String,
    /// Quantity.
    pub quantity: i64,
    /// Unit price as a decimal string.
    pub unit_price: String,
    /// Quantity times unit price, as a decimal string.
    pub line_total: String,
}

/// Response for an order header in list results.
#[derive(Debug, Serialize)]
pub struct OrderListItem {
    /// Order ID.
    pub id: Uuid,
    /// Document number.
    pub number: String,
    /// Customer display name.
    pub customer_name: String,
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

/// POST `/orders` - Create a new order.
async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<SaveOrderRequest>,
) -> impl IntoResponse {
    let input = match parse_save_request(payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let repo = OrderRepository::new((*state.db).clone());
    match repo.create(input).await {
        Ok(result) => {
            info!(order_id = %result.order.id, number = %result.order.number, "Order created");
            (StatusCode::CREATED, Json(order_to_response(result))).into_response()
        }
        Err(e) => order_error_response(e, "Failed to create order"),
    }
}

/// PUT `/orders/{id}` - Update an order.
///
/// The stock footprint of the previous revision is released or restored as
/// needed before the new revision takes effect.
async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveOrderRequest>,
) -> impl IntoResponse {
    let input = match parse_save_request(payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let repo = OrderRepository::new((*state.db).clone());
    match repo.update(id, input).await {
        Ok(result) => {
            info!(order_id = %result.order.id, number = %result.order.number, "Order updated");
            (StatusCode::OK, Json(order_to_response(result))).into_response()
        }
        Err(e) => order_error_response(e, "Failed to update order"),
    }
}

/// GET `/orders` - List orders with filters and pagination.
async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        Some(value) => match OrderStatus::parse(value) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": "Status must be new, in_progress, completed or cancelled"
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let filter = OrderFilter {
        status,
        date_from: query.from,
        date_to: query.to,
    };
    let page = page_request(query.page, query.per_page);

    let repo = OrderRepository::new((*state.db).clone());
    match repo.list(filter, &page).await {
        Ok(response) => {
            let body = PageResponse {
                data: response
                    .data
                    .into_iter()
                    .map(order_to_list_item)
                    .collect::<Vec<_>>(),
                meta: response.meta,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => order_error_response(e, "Failed to list orders"),
    }
}

/// GET `/orders/{id}` - Get an order by ID.
async fn get_order(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = OrderRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(result) => (StatusCode::OK, Json(order_to_response(result))).into_response(),
        Err(e) => order_error_response(e, "Failed to get order"),
    }
}

/// DELETE `/orders/{id}` - Delete an order.
///
/// Releases any reservations and restores deducted stock before the rows go.
async fn delete_order(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = OrderRepository::new((*state.db).clone());
    match repo.delete(id).await {
        Ok(()) => {
            info!(order_id = %id, "Order deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => order_error_response(e, "Failed to delete order"),
    }
}

/// Creates order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Validates a save request and converts it into repository input.
fn parse_save_request(payload: SaveOrderRequest) -> Result<OrderInput, Response> {
    let Some(status) = OrderStatus::parse(&payload.status) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_status",
                "message": "Status must be new, in_progress, completed or cancelled"
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
                        "message": "Unit price must be a non-negative decimal string"
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

    Ok(OrderInput {
        number: payload.number,
        customer_name: payload.customer_name,
        status,
        issued_on: payload.issued_on,
        notes: payload.notes,
        items,
        allow_shortfall: payload.allow_shortfall,
    })
}

/// Maps repository errors onto HTTP responses.
fn order_error_response(error: OrderError, context: &str) -> Response {
    match error {
        OrderError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "order_not_found",
                "message": "Order not found"
            })),
        )
            .into_response(),
        OrderError::DuplicateNumber(_) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_number",
                "message": "An order with this number already exists"
            })),
        )
            .into_response(),
        OrderError::InsufficientStock(report) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "insufficient_stock",
                "message": "Requested quantities exceed available stock",
                "shortfalls": report.shortfalls
            })),
        )
            .into_response(),
        OrderError::Stock(StockError::ProductNotFound(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "product_not_found",
                "message": "A referenced product does not exist"
            })),
        )
            .into_response(),
        OrderError::Stock(StockError::InvalidQuantity(_)) => (
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

fn order_to_response(result: OrderWithItems) -> OrderResponse {
    let mut total = Decimal::ZERO;
    let items: Vec<OrderItemResponse> = result
        .items
        .into_iter()
        .map(|item| {
            let line_total = item.unit_price * Decimal::from(item.quantity);
            total += line_total;
            OrderItemResponse {
                id: item.id,
                product_id: item.product_id,
                product_name: item.product_name,
                quantity: item.quantity,
                unit_price: item.unit_price.to_string(),
                line_total: line_total.to_string(),
            }
        })
        .collect();

    let order = result.order;
    OrderResponse {
        id: order.id,
        number: order.number,
        customer_name: order.customer_name,
        status: OrderStatus::from(order.status).as_str().to_string(),
        issued_on: order.issued_on.to_string(),
        notes: order.notes,
        total: total.to_string(),
        items,
        created_at: order.created_at.to_rfc3339(),
        updated_at: order.updated_at.to_rfc3339(),
    }
}

fn order_to_list_item(order: orders::Model) -> OrderListItem {
    OrderListItem {
        id: order.id,
        number: order.number,
        customer_name: order.customer_name,
        status: OrderStatus::from(order.status).as_str().to_string(),
        issued_on: order.issued_on.to_string(),
        created_at: order.created_at.to_rfc3339(),
        updated_at: order.updated_at.to_rfc3339(),
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

    fn save_request(status: &str) -> SaveOrderRequest {
        SaveOrderRequest {
            number: "ORD-2026-0001".to_string(),
            customer_name: "Acme".to_string(),
            status: status.to_string(),
            issued_on: NaiveDate::from_ymd_opt(2026, 8, 15).unwrap(),
            notes: None,
            items: vec![OrderItemRequest {
                product_id: Uuid::new_v4(),
                quantity: 3,
                unit_price: "19.99".to_string(),
            }],
            allow_shortfall: false,
        }
    }

    #[test]
    fn test_parse_save_request_accepts_known_statuses() {
        for status in ["new", "in_progress", "completed", "cancelled"] {
            assert!(parse_save_request(save_request(status)).is_ok());
        }
    }

    #[test]
    fn test_parse_save_request_rejects_unknown_status() {
        assert!(parse_save_request(save_request("shipped")).is_err());
    }

    #[test]
    fn test_parse_save_request_rejects_bad_price() {
        let mut request = save_request("new");
        request.items[0].unit_price = "-1".to_string();
        assert!(parse_save_request(request).is_err());

        let mut request = save_request("new");
        request.items[0].unit_price = "nineteen".to_string();
        assert!(parse_save_request(request).is_err());
    }

    #[test]
    fn test_page_request_defaults() {
        let page = page_request(None, None);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 20);

        let page = page_request(Some(3), Some(50));
        assert_eq!(page.page, 3);
        assert_eq!(page.per_page, 50);
    }
}
