//! Document status enumerations.
//!
//! Each document kind has its own closed status set. Unknown status
//! strings are rejected at the boundary via `parse`; nothing in the core
//! operates on free-form strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sales order lifecycle.
///
/// Orders progress `New → InProgress → Completed`, with `Cancelled`
/// reachable from any non-terminal state. `InProgress` reserves stock;
/// `Completed` consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order is being drafted; no stock effect.
    New,
    /// Order is confirmed; its line items are reserved.
    InProgress,
    /// Order is fulfilled; reserved stock has been physically deducted.
    Completed,
    /// Order is cancelled; no stock effect remains.
    Cancelled,
}

impl OrderStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "new" => Some(Self::New),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if this status holds reservations.
    #[must_use]
    pub fn reserves_stock(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Returns true if this status has physically deducted stock.
    #[must_use]
    pub fn consumes_stock(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Invoice lifecycle.
///
/// Invoices progress `Draft → Issued → Paid`, with `Canceled` reachable
/// from any state. Invoices have no reservation phase: entering
/// {Issued, Paid} deducts stock immediately, leaving it restores.
/// Moving between Issued and Paid has no stock effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Invoice is being drafted; no stock effect.
    Draft,
    /// Invoice has been issued; stock is deducted.
    Issued,
    /// Invoice has been paid; stock remains deducted.
    Paid,
    /// Invoice is canceled; no stock effect remains.
    Canceled,
}

impl InvoiceStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Issued => "issued",
            Self::Paid => "paid",
            Self::Canceled => "canceled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "issued" => Some(Self::Issued),
            "paid" => Some(Self::Paid),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }

    /// Returns true if this status has physically deducted stock.
    #[must_use]
    pub fn consumes_stock(&self) -> bool {
        matches!(self, Self::Issued | Self::Paid)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Supplier order lifecycle.
///
/// Supplier orders progress `Draft → Confirmed → InTransit → Completed`,
/// with `Cancelled` reachable from any state. Only `Completed` affects
/// stock: entering it adds the ordered quantities, leaving it takes them
/// back out. Supplier orders never reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierOrderStatus {
    /// Order is being drafted.
    Draft,
    /// Order has been confirmed with the supplier.
    Confirmed,
    /// Goods are on the way.
    InTransit,
    /// Goods have arrived; stock is incremented.
    Completed,
    /// Order is cancelled; no stock effect remains.
    Cancelled,
}

impl SupplierOrderStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Confirmed => "confirmed",
            Self::InTransit => "in_transit",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "confirmed" => Some(Self::Confirmed),
            "in_transit" => Some(Self::InTransit),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if this status has added stock.
    #[must_use]
    pub fn adds_stock(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for SupplierOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("shipped")]
    #[case("in progress")]
    #[case("done")]
    #[case("")]
    fn test_order_status_rejects_unknown(#[case] input: &str) {
        assert_eq!(OrderStatus::parse(input), None);
    }

    #[test]
    fn test_order_status_round_trip() {
        for status in [
            OrderStatus::New,
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("IN_PROGRESS"), Some(OrderStatus::InProgress));
        assert_eq!(OrderStatus::parse("shipped"), None);
    }

    #[test]
    fn test_invoice_status_round_trip() {
        for status in [
            InvoiceStatus::Draft,
            InvoiceStatus::Issued,
            InvoiceStatus::Paid,
            InvoiceStatus::Canceled,
        ] {
            assert_eq!(InvoiceStatus::parse(status.as_str()), Some(status));
        }
        // Invoices spell their terminal state with one L.
        assert_eq!(InvoiceStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_supplier_order_status_round_trip() {
        for status in [
            SupplierOrderStatus::Draft,
            SupplierOrderStatus::Confirmed,
            SupplierOrderStatus::InTransit,
            SupplierOrderStatus::Completed,
            SupplierOrderStatus::Cancelled,
        ] {
            assert_eq!(SupplierOrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SupplierOrderStatus::parse("delivered"), None);
    }

    #[test]
    fn test_order_stock_predicates() {
        assert!(OrderStatus::InProgress.reserves_stock());
        assert!(!OrderStatus::InProgress.consumes_stock());
        assert!(OrderStatus::Completed.consumes_stock());
        assert!(!OrderStatus::Completed.reserves_stock());
        assert!(!OrderStatus::New.reserves_stock());
        assert!(!OrderStatus::Cancelled.consumes_stock());
    }

    #[test]
    fn test_invoice_stock_predicates() {
        assert!(InvoiceStatus::Issued.consumes_stock());
        assert!(InvoiceStatus::Paid.consumes_stock());
        assert!(!InvoiceStatus::Draft.consumes_stock());
        assert!(!InvoiceStatus::Canceled.consumes_stock());
    }

    #[test]
    fn test_supplier_order_stock_predicates() {
        assert!(SupplierOrderStatus::Completed.adds_stock());
        assert!(!SupplierOrderStatus::InTransit.adds_stock());
        assert!(!SupplierOrderStatus::Cancelled.adds_stock());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", OrderStatus::InProgress), "in_progress");
        assert_eq!(format!("{}", InvoiceStatus::Canceled), "canceled");
        assert_eq!(format!("{}", SupplierOrderStatus::InTransit), "in_transit");
    }
}
