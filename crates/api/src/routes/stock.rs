//! Stock availability endpoints.
//!
//! The availability check is advisory: it reports shortfalls without
//! reserving anything, so a client can warn the user before submitting a
//! document save.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use lagera_core::stock::{DocumentKind, DocumentRef, Shortfall};
use lagera_db::{DocumentItemInput, StockError, StockLedger};

use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for an availability check.
#[derive(Debug, Deserialize)]
pub struct CheckAvailabilityRequest {
    /// Requested lines; quantities for the same product are summed.
    pub items: Vec<AvailabilityItemRequest>,
    /// Document whose own reservations and deductions are added back,
    /// so that re-saving it does not count against itself.
    pub exclude: Option<ExcludeDocumentRequest>,
}

/// One requested line.
#[derive(Debug, Deserialize)]
pub struct AvailabilityItemRequest {
    /// Product ID.
    pub product_id: Uuid,
    /// Requested quantity (must be positive).
    pub quantity: i64,
}

/// Identifies the document to exclude from the check.
#[derive(Debug, Deserialize)]
pub struct ExcludeDocumentRequest {
    /// Document type: "order", "invoice" or "supplier_order".
    #[serde(rename = "type")]
    pub document_type: String,
    /// Document ID.
    pub id: Uuid,
    /// Document number.
    pub number: String,
}

/// Response for an availability check.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// True when every requested line can be satisfied.
    pub ok: bool,
    /// One entry per product that cannot cover its requested quantity.
    pub shortfalls: Vec<Shortfall>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/stock/availability` - Check whether requested quantities are available.
async fn check_availability(
    State(state): State<AppState>,
    Json(payload): Json<CheckAvailabilityRequest>,
) -> impl IntoResponse {
    let exclude = match payload.exclude {
        Some(request) => {
            let Some(kind) = DocumentKind::parse(&request.document_type) else {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_document_type",
                        "message": "Document type must be order, invoice or supplier_order"
                    })),
                )
                    .into_response();
            };
            Some(DocumentRef::new(kind, request.id, request.number))
        }
        None => None,
    };

    // Prices play no part in availability; zero keeps the input uniform.
    let items: Vec<DocumentItemInput> = payload
        .items
        .iter()
        .map(|item| DocumentItemInput {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: Decimal::ZERO,
        })
        .collect();

    match StockLedger::preview_availability(&*state.db, &items, exclude.as_ref()).await {
        Ok(report) => {
            let body = AvailabilityResponse {
                ok: report.is_satisfiable(),
                shortfalls: report.shortfalls,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(StockError::ProductNotFound(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "product_not_found",
                "message": "A referenced product does not exist"
            })),
        )
            .into_response(),
        Err(StockError::InvalidQuantity(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_quantity",
                "message": "Quantity must be positive"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to check availability");
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

/// Creates stock routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/stock/availability", post(check_availability))
}
