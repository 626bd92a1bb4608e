//! Stock domain types.
//!
//! This module defines the types exchanged between document editors and
//! the stock ledger: line items, document references, per-product stock
//! levels, and the shortfall report produced by availability checks.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A document line item as the ledger receives it from an editor.
///
/// The ledger never owns line items; each save passes the document's
/// current rows as input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The product the line refers to.
    pub product_id: Uuid,
    /// Product name, carried along for shortfall reporting.
    pub product_name: String,
    /// Quantity in whole units.
    pub quantity: i64,
}

impl LineItem {
    /// Creates a new line item.
    #[must_use]
    pub fn new(product_id: Uuid, product_name: impl Into<String>, quantity: i64) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            quantity,
        }
    }
}

/// The kind of business document that drives stock effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Sales order; reserves stock while in progress, deducts on completion.
    Order,
    /// Customer invoice; deducts stock when issued, no reservation phase.
    Invoice,
    /// Supplier order; adds stock on completion.
    SupplierOrder,
}

impl DocumentKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Invoice => "invoice",
            Self::SupplierOrder => "supplier_order",
        }
    }

    /// Parses a document kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "order" => Some(Self::Order),
            "invoice" => Some(Self::Invoice),
            "supplier_order" => Some(Self::SupplierOrder),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference identifying the document a ledger operation acts for.
///
/// Reservations are keyed by `(product, kind, id)`; movement entries are
/// tagged with `(kind, number)` so they can be found and reversed later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Document kind.
    pub kind: DocumentKind,
    /// Document id.
    pub id: Uuid,
    /// Human-readable document number (e.g. "ORD-2026-0001").
    pub number: String,
}

impl DocumentRef {
    /// Creates a new document reference.
    #[must_use]
    pub fn new(kind: DocumentKind, id: Uuid, number: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            number: number.into(),
        }
    }
}

/// Per-product stock state at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    /// Stock physically on hand. May go negative after an explicit override.
    pub physical: i64,
    /// Stock committed to in-progress orders. Never negative.
    pub reserved: i64,
}

impl StockLevel {
    /// Creates a new stock level.
    #[must_use]
    pub const fn new(physical: i64, reserved: i64) -> Self {
        Self { physical, reserved }
    }

    /// Stock that can still be freely promised.
    ///
    /// Always derived, never stored: `physical − reserved`.
    #[must_use]
    pub const fn available(&self) -> i64 {
        self.physical - self.reserved
    }
}

/// One unsatisfiable line in an availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    /// The product that cannot cover the request.
    pub product_id: Uuid,
    /// Product name, for rendering the confirmation dialog.
    pub product_name: String,
    /// Physical quantity on hand.
    pub physical: i64,
    /// Quantity reserved by other documents.
    pub reserved: i64,
    /// Quantity the requesting document could still take:
    /// `physical − reserved` plus the document's own prior allocation.
    pub available: i64,
    /// Quantity the document requests.
    pub requested: i64,
}

/// Result of an availability check.
///
/// Empty when every requested item is satisfiable. A non-empty report is
/// advisory, not an error: the caller decides whether to override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvailabilityReport {
    /// One entry per product that cannot cover its requested quantity.
    pub shortfalls: Vec<Shortfall>,
}

impl AvailabilityReport {
    /// Returns true when every requested item is satisfiable.
    #[must_use]
    pub fn is_satisfiable(&self) -> bool {
        self.shortfalls.is_empty()
    }

    /// Looks up the shortfall for a product, if any.
    #[must_use]
    pub fn shortfall_for(&self, product_id: Uuid) -> Option<&Shortfall> {
        self.shortfalls.iter().find(|s| s.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_kind_as_str() {
        assert_eq!(DocumentKind::Order.as_str(), "order");
        assert_eq!(DocumentKind::Invoice.as_str(), "invoice");
        assert_eq!(DocumentKind::SupplierOrder.as_str(), "supplier_order");
    }

    #[test]
    fn test_document_kind_parse() {
        assert_eq!(DocumentKind::parse("order"), Some(DocumentKind::Order));
        assert_eq!(DocumentKind::parse("INVOICE"), Some(DocumentKind::Invoice));
        assert_eq!(
            DocumentKind::parse("supplier_order"),
            Some(DocumentKind::SupplierOrder)
        );
        assert_eq!(DocumentKind::parse("receipt"), None);
    }

    #[test]
    fn test_document_kind_display() {
        assert_eq!(format!("{}", DocumentKind::SupplierOrder), "supplier_order");
    }

    #[test]
    fn test_available_is_derived() {
        let level = StockLevel::new(10, 4);
        assert_eq!(level.available(), 6);
    }

    #[test]
    fn test_available_can_go_negative() {
        // Physical below reservations after an override.
        let level = StockLevel::new(-2, 3);
        assert_eq!(level.available(), -5);
    }

    #[test]
    fn test_empty_report_is_satisfiable() {
        let report = AvailabilityReport::default();
        assert!(report.is_satisfiable());
        assert_eq!(report.shortfall_for(Uuid::new_v4()), None);
    }

    #[test]
    fn test_shortfall_lookup() {
        let product_id = Uuid::new_v4();
        let report = AvailabilityReport {
            shortfalls: vec![Shortfall {
                product_id,
                product_name: "Widget".to_string(),
                physical: 10,
                reserved: 8,
                available: 2,
                requested: 5,
            }],
        };
        assert!(!report.is_satisfiable());
        let shortfall = report.shortfall_for(product_id).expect("entry exists");
        assert_eq!(shortfall.requested, 5);
        assert_eq!(shortfall.available, 2);
    }
}
