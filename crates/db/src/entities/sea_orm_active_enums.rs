//! `SeaORM` active enums mapping the Postgres enum types.
//!
//! Each enum mirrors a `CREATE TYPE … AS ENUM` in the initial migration.
//! Conversions to and from the `lagera-core` domain enums live here so the
//! repositories never match on status strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Postgres `document_type`: the document kind a ledger row belongs to.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "document_type")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Sales order.
    #[sea_orm(string_value = "order")]
    Order,
    /// Customer invoice.
    #[sea_orm(string_value = "invoice")]
    Invoice,
    /// Supplier order.
    #[sea_orm(string_value = "supplier_order")]
    SupplierOrder,
}

/// Postgres `reservation_status`: lifecycle of a stock reservation row.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reservation_status")]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Counted into the product's reserved quantity.
    #[sea_orm(string_value = "active")]
    Active,
    /// Released; kept for audit.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Converted into a physical deduction; kept for audit.
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Postgres `movement_direction`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_direction")]
#[serde(rename_all = "snake_case")]
pub enum MovementDirection {
    /// Stock entered the warehouse.
    #[sea_orm(string_value = "inward")]
    Inward,
    /// Stock left the warehouse.
    #[sea_orm(string_value = "outward")]
    Outward,
}

/// Postgres `movement_reason`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_reason")]
#[serde(rename_all = "snake_case")]
pub enum MovementReason {
    /// Goods received from a supplier.
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// Goods sold to a customer.
    #[sea_orm(string_value = "sale")]
    Sale,
    /// Goods returned by a customer.
    #[sea_orm(string_value = "return")]
    Return,
    /// Opening stock or stocktake result.
    #[sea_orm(string_value = "inventory")]
    Inventory,
    /// Manual correction.
    #[sea_orm(string_value = "correction")]
    Correction,
}

/// Postgres `order_status`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_status")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Being drafted; no stock effect.
    #[sea_orm(string_value = "new")]
    New,
    /// Confirmed; line items are reserved.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Fulfilled; stock has been deducted.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Cancelled; no stock effect remains.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Postgres `invoice_status`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being drafted; no stock effect.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Issued; stock is deducted.
    #[sea_orm(string_value = "issued")]
    Issued,
    /// Paid; stock remains deducted.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Canceled; no stock effect remains.
    #[sea_orm(string_value = "canceled")]
    Canceled,
}

/// Postgres `supplier_order_status`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "supplier_order_status")]
#[serde(rename_all = "snake_case")]
pub enum SupplierOrderStatus {
    /// Being drafted.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Confirmed with the supplier.
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Goods are on the way.
    #[sea_orm(string_value = "in_transit")]
    InTransit,
    /// Goods received; stock has been added.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<lagera_core::stock::DocumentKind> for DocumentType {
    fn from(kind: lagera_core::stock::DocumentKind) -> Self {
        match kind {
            lagera_core::stock::DocumentKind::Order => Self::Order,
            lagera_core::stock::DocumentKind::Invoice => Self::Invoice,
            lagera_core::stock::DocumentKind::SupplierOrder => Self::SupplierOrder,
        }
    }
}

impl From<DocumentType> for lagera_core::stock::DocumentKind {
    fn from(document_type: DocumentType) -> Self {
        match document_type {
            DocumentType::Order => Self::Order,
            DocumentType::Invoice => Self::Invoice,
            DocumentType::SupplierOrder => Self::SupplierOrder,
        }
    }
}

impl From<lagera_core::document::OrderStatus> for OrderStatus {
    fn from(status: lagera_core::document::OrderStatus) -> Self {
        match status {
            lagera_core::document::OrderStatus::New => Self::New,
            lagera_core::document::OrderStatus::InProgress => Self::InProgress,
            lagera_core::document::OrderStatus::Completed => Self::Completed,
            lagera_core::document::OrderStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<OrderStatus> for lagera_core::document::OrderStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::New => Self::New,
            OrderStatus::InProgress => Self::InProgress,
            OrderStatus::Completed => Self::Completed,
            OrderStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<lagera_core::document::InvoiceStatus> for InvoiceStatus {
    fn from(status: lagera_core::document::InvoiceStatus) -> Self {
        match status {
            lagera_core::document::InvoiceStatus::Draft => Self::Draft,
            lagera_core::document::InvoiceStatus::Issued => Self::Issued,
            lagera_core::document::InvoiceStatus::Paid => Self::Paid,
            lagera_core::document::InvoiceStatus::Canceled => Self::Canceled,
        }
    }
}

impl From<InvoiceStatus> for lagera_core::document::InvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Draft => Self::Draft,
            InvoiceStatus::Issued => Self::Issued,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Canceled => Self::Canceled,
        }
    }
}

impl From<lagera_core::document::SupplierOrderStatus> for SupplierOrderStatus {
    fn from(status: lagera_core::document::SupplierOrderStatus) -> Self {
        match status {
            lagera_core::document::SupplierOrderStatus::Draft => Self::Draft,
            lagera_core::document::SupplierOrderStatus::Confirmed => Self::Confirmed,
            lagera_core::document::SupplierOrderStatus::InTransit => Self::InTransit,
            lagera_core::document::SupplierOrderStatus::Completed => Self::Completed,
            lagera_core::document::SupplierOrderStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<SupplierOrderStatus> for lagera_core::document::SupplierOrderStatus {
    fn from(status: SupplierOrderStatus) -> Self {
        match status {
            SupplierOrderStatus::Draft => Self::Draft,
            SupplierOrderStatus::Confirmed => Self::Confirmed,
            SupplierOrderStatus::InTransit => Self::InTransit,
            SupplierOrderStatus::Completed => Self::Completed,
            SupplierOrderStatus::Cancelled => Self::Cancelled,
        }
    }
}
