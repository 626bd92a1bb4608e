//! Stock domain: levels, line items, and availability checking.
//!
//! # Modules
//!
//! - `types` - Line items, document references, stock levels, shortfalls
//! - `error` - Availability error types
//! - `availability` - Pure availability computation

pub mod availability;
pub mod error;
pub mod types;

#[cfg(test)]
mod availability_props;

pub use availability::AvailabilityService;
pub use error::AvailabilityError;
pub use types::{AvailabilityReport, DocumentKind, DocumentRef, LineItem, Shortfall, StockLevel};
