//! Property-based tests for the availability service.

use proptest::prelude::*;
use uuid::Uuid;

use crate::stock::availability::AvailabilityService;
use crate::stock::types::{LineItem, StockLevel};

/// Strategy for generating random UUIDs.
fn arb_uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

/// Strategy for stock levels, including overridden (negative) physical stock.
fn arb_level() -> impl Strategy<Value = StockLevel> {
    (-1_000i64..10_000, 0i64..5_000).prop_map(|(physical, reserved)| StockLevel {
        physical,
        reserved,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property: a shortfall is emitted exactly when the requested quantity
    // exceeds available stock plus the document's own prior allocation.
    // =========================================================================

    #[test]
    fn prop_shortfall_iff_requested_exceeds_adjusted_available(
        product in arb_uuid(),
        level in arb_level(),
        prior in 0i64..5_000,
        requested in 1i64..20_000,
    ) {
        let items = vec![LineItem::new(product, "P", requested)];
        let report = AvailabilityService::check(
            &items,
            |_| Some(level),
            |_| prior,
        ).unwrap();

        let adjusted = level.available() + prior;
        if requested > adjusted {
            let shortfall = report.shortfall_for(product).expect("shortfall expected");
            prop_assert_eq!(shortfall.available, adjusted);
            prop_assert_eq!(shortfall.requested, requested);
            prop_assert_eq!(shortfall.physical, level.physical);
            prop_assert_eq!(shortfall.reserved, level.reserved);
        } else {
            prop_assert!(report.is_satisfiable());
        }
    }

    // =========================================================================
    // Property: re-requesting exactly the prior allocation is always
    // satisfiable while other documents leave any stock free.
    // =========================================================================

    #[test]
    fn prop_own_allocation_never_competes_with_itself(
        product in arb_uuid(),
        physical in 0i64..10_000,
        reserved_by_others in 0i64..5_000,
        own in 1i64..5_000,
    ) {
        prop_assume!(reserved_by_others <= physical);

        // The product's reserved figure includes this document's own share.
        let level = StockLevel::new(physical, reserved_by_others + own);
        let items = vec![LineItem::new(product, "P", own)];
        let report = AvailabilityService::check(&items, |_| Some(level), |_| own).unwrap();

        prop_assert!(report.is_satisfiable());
    }

    // =========================================================================
    // Property: splitting a quantity across duplicate lines changes nothing.
    // =========================================================================

    #[test]
    fn prop_duplicate_lines_equal_single_line(
        product in arb_uuid(),
        level in arb_level(),
        first in 1i64..1_000,
        second in 1i64..1_000,
    ) {
        let split = vec![
            LineItem::new(product, "P", first),
            LineItem::new(product, "P", second),
        ];
        let merged = vec![LineItem::new(product, "P", first + second)];

        let from_split = AvailabilityService::check(&split, |_| Some(level), |_| 0).unwrap();
        let from_merged = AvailabilityService::check(&merged, |_| Some(level), |_| 0).unwrap();

        prop_assert_eq!(from_split, from_merged);
    }

    // =========================================================================
    // Property: shortfalls only mention requested products, once each.
    // =========================================================================

    #[test]
    fn prop_shortfalls_subset_of_requested(
        products in proptest::collection::vec(arb_uuid(), 1..6),
        level in arb_level(),
        requested in 1i64..10_000,
    ) {
        let items: Vec<LineItem> = products
            .iter()
            .map(|&id| LineItem::new(id, "P", requested))
            .collect();
        let report = AvailabilityService::check(&items, |_| Some(level), |_| 0).unwrap();

        for shortfall in &report.shortfalls {
            prop_assert!(products.contains(&shortfall.product_id));
        }
        for &id in &products {
            let mentions = report
                .shortfalls
                .iter()
                .filter(|s| s.product_id == id)
                .count();
            prop_assert!(mentions <= 1);
        }
    }
}
