//! Document lifecycle: status enumerations and the transition policy.
//!
//! # Modules
//!
//! - `status` - Closed status enums per document kind
//! - `transition` - Status-change to ledger-action mapping

pub mod status;
pub mod transition;

#[cfg(test)]
mod transition_props;

pub use status::{InvoiceStatus, OrderStatus, SupplierOrderStatus};
pub use transition::{StockAction, TransitionPlan, TransitionPolicy};
