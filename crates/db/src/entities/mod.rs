//! `SeaORM` entities for the Lagera schema.
//!
//! Stock quantities on [`products`] are maintained exclusively by the
//! repository layer inside transactions; no database triggers exist.

pub mod invoice_items;
pub mod invoices;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod sea_orm_active_enums;
pub mod stock_movements;
pub mod stock_reservations;
pub mod supplier_order_items;
pub mod supplier_orders;
