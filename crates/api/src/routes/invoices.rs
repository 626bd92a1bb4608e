//! Customer invoice endpoints.
//!
//! Invoices skip the reservation phase: saving into the stock-affecting
//! pair of statuses (issued, paid) deducts physical stock immediately.
//! Shortfall saves follow the same 409-plus-report contract as orders.

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

use lagera_core::document::InvoiceStatus;
use lagera_db::entities::invoices;
use lagera_db::{
    DocumentItemInput, InvoiceError, InvoiceFilter, InvoiceInput, InvoiceRepository,
    InvoiceWithItems, StockError,
};
use lagera_shared::types::{PageRequest, PageResponse};

use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating or updating an invoice.
#[derive(Debug, Deserialize)]
pub struct SaveInvoiceRequest {
    /// Document number (unique across invoices).
    pub number: String,
    /// Billed customer display name.
    pub customer_name: String,
    /// Status: "draft", "issued", "paid" or "canceled".
    pub status: String,
    /// Document date (YYYY-MM-DD).
    pub issued_on: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Line items.
    pub items: Vec<InvoiceItemRequest>,
    /// Save even if available stock cannot cover the requested quantities.
    #[serde(default)]
    pub allow_shortfall: bool,
}

/// Request body for a single invoice line.
#[derive(Debug, Deserialize)]
pub struct InvoiceItemRequest {
    /// Product ID.
    pub product_id: Uuid,
    /// Quantity (must be positive).
    pub quantity: i64,
    /// Unit price as a decimal string.
    pub unit_price: String,
}

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
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

/// Response for an invoice with its items.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    /// Invoice ID.
    pub id: Uuid,
    /// Document number.
    pub number: String,
    /// Billed customer display name.
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
    pub items: Vec<InvoiceItemResponse>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Response for a single invoice line.
#[derive(Debug, Serialize)]
pub struct InvoiceItemResponse {
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

/// Response for an invoice header in list results.
#[derive(Debug, Serialize)]
pub struct InvoiceListItem {
    /// Invoice ID.
    pub id: Uuid,
    /// Document number.
    pub number: String,
    /// Billed customer display name.
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

/// POST `/invoices` - Create a new invoice.
async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<SaveInvoiceRequest>,
) -> impl IntoResponse {
    let input = match parse_save_request(payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let repo = InvoiceRepository::new((*state.db).clone());
    match repo.create(input).await {
        Ok(result) => {
            info!(
                invoice_id = %result.invoice.id,
                number = %result.invoice.number,
                "Invoice created"
            );
            (StatusCode::CREATED, Json(invoice_to_response(result))).into_response()
        }
        Err(e) => invoice_error_response(e, "Failed to create invoice"),
    }
}

/// PUT `/invoices/{id}` - Update an invoice.
async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveInvoiceRequest>,
) -> impl IntoResponse {
    let input = match parse_save_request(payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let repo = InvoiceRepository::new((*state.db).clone());
    match repo.update(id, input).await {
        Ok(result) => {
            info!(
                invoice_id = %result.invoice.id,
                number = %result.invoice.number,
                "Invoice updated"
            );
            (StatusCode::OK, Json(invoice_to_response(result))).into_response()
        }
        Err(e) => invoice_error_response(e, "Failed to update invoice"),
    }
}

/// GET `/invoices` - List invoices with filters and pagination.
async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListInvoicesQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        Some(value) => match InvoiceStatus::parse(value) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": "Status must be draft, issued, paid or canceled"
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let filter = InvoiceFilter {
        status,
        date_from: query.from,
        date_to: query.to,
    };
    let page = page_request(query.page, query.per_page);

    let repo = InvoiceRepository::new((*state.db).clone());
    match repo.list(filter, &page).await {
        Ok(response) => {
            let body = PageResponse {
                data: response
                    .data
                    .into_iter()
                    .map(invoice_to_list_item)
                    .collect::<Vec<_>>(),
                meta: response.meta,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => invoice_error_response(e, "Failed to list invoices"),
    }
}

/// GET `/invoices/{id}` - Get an invoice by ID.
async fn get_invoice(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(result) => (StatusCode::OK, Json(invoice_to_response(result))).into_response(),
        Err(e) => invoice_error_response(e, "Failed to get invoice"),
    }
}

/// DELETE `/invoices/{id}` - Delete an invoice.
///
/// Restores any stock the invoice had deducted before the rows go.
async fn delete_invoice(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());
    match repo.delete(id).await {
        Ok(()) => {
            info!(invoice_id = %id, "Invoice deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => invoice_error_response(e, "Failed to delete invoice"),
    }
}

/// Creates invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route(
            "/invoices/{id}",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Validates a save request and converts it into repository input.
fn parse_save_request(payload: SaveInvoiceRequest) -> Result<InvoiceInput, Response> {
    let Some(status) = InvoiceStatus::parse(&payload.status) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_status",
                "message": "Status must be draft, issued, paid or canceled"
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

    Ok(InvoiceInput {
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
fn invoice_error_response(error: InvoiceError, context: &str) -> Response {
    match error {
        InvoiceError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "invoice_not_found",
                "message": "Invoice not found"
            })),
        )
            .into_response(),
        InvoiceError::DuplicateNumber(_) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_number",
                "message": "An invoice with this number already exists"
            })),
        )
            .into_response(),
        InvoiceError::InsufficientStock(report) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "insufficient_stock",
                "message": "Requested quantities exceed available stock",
                "shortfalls": report.shortfalls
            })),
        )
            .into_response(),
        InvoiceError::Stock(StockError::ProductNotFound(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "product_not_found",
                "message": "A referenced product does not exist"
            })),
        )
            .into_response(),
        InvoiceError::Stock(StockError::InvalidQuantity(_)) => (
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

fn invoice_to_response(result: InvoiceWithItems) -> InvoiceResponse {
    let mut total = Decimal::ZERO;
    let items: Vec<InvoiceItemResponse> = result
        .items
        .into_iter()
        .map(|item| {
            let line_total = item.unit_price * Decimal::from(item.quantity);
            total += line_total;
            InvoiceItemResponse {
                id: item.id,
                product_id: item.product_id,
                product_name: item.product_name,
                quantity: item.quantity,
                unit_price: item.unit_price.to_string(),
                line_total: line_total.to_string(),
            }
        })
        .collect();

    let invoice = result.invoice;
    InvoiceResponse {
        id: invoice.id,
        number: invoice.number,
        customer_name: invoice.customer_name,
        status: InvoiceStatus::from(invoice.status).as_str().to_string(),
        issued_on: invoice.issued_on.to_string(),
        notes: invoice.notes,
        total: total.to_string(),
        items,
        created_at: invoice.created_at.to_rfc3339(),
        updated_at: invoice.updated_at.to_rfc3339(),
    }
}

fn invoice_to_list_item(invoice: invoices::Model) -> InvoiceListItem {
    InvoiceListItem {
        id: invoice.id,
        number: invoice.number,
        customer_name: invoice.customer_name,
        status: InvoiceStatus::from(invoice.status).as_str().to_string(),
        issued_on: invoice.issued_on.to_string(),
        created_at: invoice.created_at.to_rfc3339(),
        updated_at: invoice.updated_at.to_rfc3339(),
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

    fn save_request(status: &str) -> SaveInvoiceRequest {
        SaveInvoiceRequest {
            number: "INV-2026-0001".to_string(),
            customer_name: "Acme".to_string(),
            status: status.to_string(),
            issued_on: NaiveDate::from_ymd_opt(2026, 8, 15).unwrap(),
            notes: None,
            items: vec![],
            allow_shortfall: false,
        }
    }

    #[test]
    fn test_parse_save_request_accepts_known_statuses() {
        for status in ["draft", "issued", "paid", "canceled"] {
            assert!(parse_save_request(save_request(status)).is_ok());
        }
    }

    #[test]
    fn test_parse_save_request_rejects_order_spelling() {
        // Invoices use "canceled"; "cancelled" belongs to orders.
        assert!(parse_save_request(save_request("cancelled")).is_err());
    }
}
