//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Document repositories run every save and delete as one
//! transaction spanning the stock ledger calls and the row writes.

pub mod invoice;
pub mod order;
pub mod product;
pub mod stock;
pub mod supplier_order;

pub use invoice::{InvoiceError, InvoiceFilter, InvoiceInput, InvoiceRepository, InvoiceWithItems};
pub use order::{OrderError, OrderFilter, OrderInput, OrderRepository, OrderWithItems};
pub use product::{CreateProductInput, ProductError, ProductRepository};
pub use stock::{same_stock_footprint, DocumentItemInput, StockError, StockLedger};
pub use supplier_order::{
    SupplierOrderError, SupplierOrderFilter, SupplierOrderInput, SupplierOrderRepository,
    SupplierOrderWithItems,
};
