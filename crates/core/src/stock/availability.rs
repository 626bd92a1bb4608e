//! Availability checking for document line items.
//!
//! This module implements the pure half of the availability check: given
//! the requested line items, the current stock level per product, and the
//! quantity the edited document already holds, it decides which products
//! cannot cover the request. Persistence concerns (loading levels, reading
//! the document's reservations and movements) stay with the caller.

use uuid::Uuid;

use crate::stock::error::AvailabilityError;
use crate::stock::types::{AvailabilityReport, LineItem, Shortfall, StockLevel};

/// Stateless service computing availability reports.
///
/// Lookups are injected as closures so the calculation is testable without
/// a database and reusable against any storage.
pub struct AvailabilityService;

impl AvailabilityService {
    /// Computes the shortfall report for the requested items.
    ///
    /// Processing steps:
    /// 1. Aggregate requested quantities per product (a document may carry
    ///    several lines for the same product).
    /// 2. Resolve the current stock level per product.
    /// 3. Add the document's own prior allocation back to the available
    ///    quantity, so an edited document never competes with itself.
    /// 4. Emit a [`Shortfall`] for every product whose requested quantity
    ///    exceeds the adjusted availability.
    ///
    /// # Arguments
    /// * `items` - The document's current line items
    /// * `level_lookup` - Resolves the stock level for a product id
    /// * `prior_allocation` - Quantity the edited document already holds for
    ///   a product (its ACTIVE reservation plus recorded outward movements);
    ///   constant zero when creating a new document
    ///
    /// # Returns
    /// * `Ok(report)` - Empty report when every item is satisfiable
    /// * `Err(AvailabilityError::UnknownProduct)` - A line references a
    ///   product without a stock record
    pub fn check<L, P>(
        items: &[LineItem],
        level_lookup: L,
        prior_allocation: P,
    ) -> Result<AvailabilityReport, AvailabilityError>
    where
        L: Fn(Uuid) -> Option<StockLevel>,
        P: Fn(Uuid) -> i64,
    {
        let mut report = AvailabilityReport::default();

        for (product_id, product_name, requested) in aggregate_by_product(items) {
            let level =
                level_lookup(product_id).ok_or_else(|| AvailabilityError::UnknownProduct {
                    product_id,
                    product_name: product_name.clone(),
                })?;

            let own_allocation = prior_allocation(product_id);
            let available = level.available() + own_allocation;

            if requested > available {
                report.shortfalls.push(Shortfall {
                    product_id,
                    product_name,
                    physical: level.physical,
                    reserved: level.reserved,
                    available,
                    requested,
                });
            }
        }

        Ok(report)
    }
}

/// Sums requested quantities per product, preserving first-seen order.
fn aggregate_by_product(items: &[LineItem]) -> Vec<(Uuid, String, i64)> {
    let mut totals: Vec<(Uuid, String, i64)> = Vec::new();

    for item in items {
        match totals.iter_mut().find(|(id, _, _)| *id == item.product_id) {
            Some((_, _, total)) => *total += item.quantity,
            None => totals.push((item.product_id, item.product_name.clone(), item.quantity)),
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn levels(entries: &[(Uuid, i64, i64)]) -> HashMap<Uuid, StockLevel> {
        entries
            .iter()
            .map(|&(id, physical, reserved)| (id, StockLevel::new(physical, reserved)))
            .collect()
    }

    fn check_with(
        items: &[LineItem],
        stock: &HashMap<Uuid, StockLevel>,
        prior: &HashMap<Uuid, i64>,
    ) -> AvailabilityReport {
        AvailabilityService::check(
            items,
            |id| stock.get(&id).copied(),
            |id| prior.get(&id).copied().unwrap_or(0),
        )
        .expect("all products known")
    }

    #[test]
    fn test_satisfiable_request_returns_empty_report() {
        let product = Uuid::new_v4();
        let stock = levels(&[(product, 10, 0)]);
        let items = vec![LineItem::new(product, "Widget", 4)];

        let report = check_with(&items, &stock, &HashMap::new());
        assert!(report.is_satisfiable());
    }

    #[test]
    fn test_reserved_stock_is_not_available() {
        let product = Uuid::new_v4();
        // physical 10, reserved 8: only 2 free.
        let stock = levels(&[(product, 10, 8)]);
        let items = vec![LineItem::new(product, "Widget", 5)];

        let report = check_with(&items, &stock, &HashMap::new());
        let shortfall = report.shortfall_for(product).expect("shortfall expected");
        assert_eq!(shortfall.physical, 10);
        assert_eq!(shortfall.reserved, 8);
        assert_eq!(shortfall.available, 2);
        assert_eq!(shortfall.requested, 5);
    }

    #[test]
    fn test_edited_document_adds_back_its_own_allocation() {
        // The document currently reserves 4 of 10; physical 10, reserved 4.
        // Requesting 8 must compare against 10 - 4 + 4 = 10, not 6.
        let product = Uuid::new_v4();
        let stock = levels(&[(product, 10, 4)]);
        let prior = HashMap::from([(product, 4)]);
        let items = vec![LineItem::new(product, "Widget", 8)];

        let report = check_with(&items, &stock, &prior);
        assert!(report.is_satisfiable());
    }

    #[test]
    fn test_add_back_does_not_mask_real_shortfall() {
        let product = Uuid::new_v4();
        let stock = levels(&[(product, 10, 4)]);
        let prior = HashMap::from([(product, 4)]);
        let items = vec![LineItem::new(product, "Widget", 11)];

        let report = check_with(&items, &stock, &prior);
        let shortfall = report.shortfall_for(product).expect("shortfall expected");
        assert_eq!(shortfall.available, 10);
        assert_eq!(shortfall.requested, 11);
    }

    #[test]
    fn test_duplicate_lines_aggregate_before_comparing() {
        let product = Uuid::new_v4();
        let stock = levels(&[(product, 10, 0)]);
        let items = vec![
            LineItem::new(product, "Widget", 6),
            LineItem::new(product, "Widget", 6),
        ];

        let report = check_with(&items, &stock, &HashMap::new());
        let shortfall = report.shortfall_for(product).expect("12 > 10");
        assert_eq!(shortfall.requested, 12);
    }

    #[test]
    fn test_multiple_products_reported_independently() {
        let scarce = Uuid::new_v4();
        let plentiful = Uuid::new_v4();
        let stock = levels(&[(scarce, 1, 0), (plentiful, 100, 0)]);
        let items = vec![
            LineItem::new(scarce, "Rare part", 3),
            LineItem::new(plentiful, "Common part", 3),
        ];

        let report = check_with(&items, &stock, &HashMap::new());
        assert_eq!(report.shortfalls.len(), 1);
        assert!(report.shortfall_for(scarce).is_some());
        assert!(report.shortfall_for(plentiful).is_none());
    }

    #[test]
    fn test_unknown_product_is_an_error() {
        let product = Uuid::new_v4();
        let items = vec![LineItem::new(product, "Ghost", 1)];

        let result = AvailabilityService::check(&items, |_| None, |_| 0);
        assert!(matches!(
            result,
            Err(AvailabilityError::UnknownProduct { product_id, .. }) if product_id == product
        ));
    }

    #[test]
    fn test_negative_physical_still_reports_numbers() {
        // Overridden stock can be negative; the report reflects it as-is.
        let product = Uuid::new_v4();
        let stock = levels(&[(product, -2, 0)]);
        let items = vec![LineItem::new(product, "Widget", 1)];

        let report = check_with(&items, &stock, &HashMap::new());
        let shortfall = report.shortfall_for(product).expect("shortfall expected");
        assert_eq!(shortfall.physical, -2);
        assert_eq!(shortfall.available, -2);
    }

    #[test]
    fn test_empty_items_always_satisfiable() {
        let report = check_with(&[], &HashMap::new(), &HashMap::new());
        assert!(report.is_satisfiable());
    }
}
