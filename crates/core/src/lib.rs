//! Core stock logic for Lagera.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, availability mathematics, and status transition rules live here.
//!
//! # Modules
//!
//! - `stock` - Stock levels, line items, availability checking
//! - `document` - Document status enumerations and transition policy

pub mod document;
pub mod stock;
