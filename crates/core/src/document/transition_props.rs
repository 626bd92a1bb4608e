//! Property-based tests for the transition policy.

use proptest::prelude::*;

use crate::document::status::{InvoiceStatus, OrderStatus, SupplierOrderStatus};
use crate::document::transition::{StockAction, TransitionPolicy};

fn arb_order_status() -> impl Strategy<Value = OrderStatus> {
    prop_oneof![
        Just(OrderStatus::New),
        Just(OrderStatus::InProgress),
        Just(OrderStatus::Completed),
        Just(OrderStatus::Cancelled),
    ]
}

fn arb_invoice_status() -> impl Strategy<Value = InvoiceStatus> {
    prop_oneof![
        Just(InvoiceStatus::Draft),
        Just(InvoiceStatus::Issued),
        Just(InvoiceStatus::Paid),
        Just(InvoiceStatus::Canceled),
    ]
}

fn arb_supplier_status() -> impl Strategy<Value = SupplierOrderStatus> {
    prop_oneof![
        Just(SupplierOrderStatus::Draft),
        Just(SupplierOrderStatus::Confirmed),
        Just(SupplierOrderStatus::InTransit),
        Just(SupplierOrderStatus::Completed),
        Just(SupplierOrderStatus::Cancelled),
    ]
}

fn arb_old_order() -> impl Strategy<Value = Option<OrderStatus>> {
    prop_oneof![Just(None), arb_order_status().prop_map(Some)]
}

fn arb_old_invoice() -> impl Strategy<Value = Option<InvoiceStatus>> {
    prop_oneof![Just(None), arb_invoice_status().prop_map(Some)]
}

fn arb_old_supplier() -> impl Strategy<Value = Option<SupplierOrderStatus>> {
    prop_oneof![Just(None), arb_supplier_status().prop_map(Some)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property: re-saving without status or item changes touches nothing.
    // =========================================================================

    #[test]
    fn prop_unchanged_order_resave_is_empty(status in arb_order_status()) {
        prop_assert!(TransitionPolicy::order_save(Some(status), status, false).is_empty());
    }

    #[test]
    fn prop_unchanged_invoice_resave_is_empty(status in arb_invoice_status()) {
        prop_assert!(TransitionPolicy::invoice_save(Some(status), status, false).is_empty());
    }

    #[test]
    fn prop_unchanged_supplier_resave_is_empty(status in arb_supplier_status()) {
        prop_assert!(
            TransitionPolicy::supplier_order_save(Some(status), status, false).is_empty()
        );
    }

    // =========================================================================
    // Property: teardown actions always come before application actions,
    // and the stale reservation is released before any new one is created.
    // =========================================================================

    #[test]
    fn prop_order_teardown_precedes_application(
        old in arb_old_order(),
        new in arb_order_status(),
        items_changed in any::<bool>(),
    ) {
        let plan = TransitionPolicy::order_save(old, new, items_changed);

        let teardown_positions: Vec<usize> = plan
            .actions
            .iter()
            .enumerate()
            .filter(|(_, a)| {
                matches!(a, StockAction::Restore | StockAction::ReleaseReservation)
            })
            .map(|(i, _)| i)
            .collect();
        let apply_positions: Vec<usize> = plan
            .actions
            .iter()
            .enumerate()
            .filter(|(_, a)| matches!(a, StockAction::Reserve | StockAction::Deduct))
            .map(|(i, _)| i)
            .collect();

        for teardown in &teardown_positions {
            for apply in &apply_positions {
                prop_assert!(teardown < apply);
            }
        }
    }

    #[test]
    fn prop_order_never_reserves_after_deducting(
        old in arb_old_order(),
        new in arb_order_status(),
        items_changed in any::<bool>(),
    ) {
        let plan = TransitionPolicy::order_save(old, new, items_changed);

        if let Some(deduct_at) = plan
            .actions
            .iter()
            .position(|a| matches!(a, StockAction::Deduct))
        {
            for action in &plan.actions[deduct_at..] {
                prop_assert!(!matches!(action, StockAction::Reserve));
            }
        }
    }

    // =========================================================================
    // Property: actions appear exactly when the status pair calls for them.
    // =========================================================================

    #[test]
    fn prop_order_reserve_iff_entering_in_progress(
        old in arb_old_order(),
        new in arb_order_status(),
        items_changed in any::<bool>(),
    ) {
        let plan = TransitionPolicy::order_save(old, new, items_changed);
        let noop_resave = old == Some(new) && !items_changed;

        let expected = new == OrderStatus::InProgress && !noop_resave;
        prop_assert_eq!(plan.contains(StockAction::Reserve), expected);
    }

    #[test]
    fn prop_order_restore_iff_leaving_completed_state(
        old in arb_old_order(),
        new in arb_order_status(),
        items_changed in any::<bool>(),
    ) {
        let plan = TransitionPolicy::order_save(old, new, items_changed);
        let noop_resave = old == Some(new) && !items_changed;

        let expected = old == Some(OrderStatus::Completed) && !noop_resave;
        prop_assert_eq!(plan.contains(StockAction::Restore), expected);
    }

    #[test]
    fn prop_order_never_restocks(
        old in arb_old_order(),
        new in arb_order_status(),
        items_changed in any::<bool>(),
    ) {
        let plan = TransitionPolicy::order_save(old, new, items_changed);
        prop_assert!(!plan.contains(StockAction::Restock));
    }

    // =========================================================================
    // Property: a document moving to its cancelled state only tears down.
    // =========================================================================

    #[test]
    fn prop_cancelled_order_applies_nothing(
        old in arb_old_order(),
        items_changed in any::<bool>(),
    ) {
        let plan = TransitionPolicy::order_save(old, OrderStatus::Cancelled, items_changed);
        prop_assert!(!plan.contains(StockAction::Reserve));
        prop_assert!(!plan.contains(StockAction::Deduct));
        prop_assert!(!plan.contains(StockAction::Restock));
    }

    #[test]
    fn prop_canceled_invoice_applies_nothing(
        old in arb_old_invoice(),
        items_changed in any::<bool>(),
    ) {
        let plan = TransitionPolicy::invoice_save(old, InvoiceStatus::Canceled, items_changed);
        prop_assert!(!plan.contains(StockAction::Deduct));
    }

    // =========================================================================
    // Property: invoices never reserve, and moves inside {Issued, Paid}
    // are silent.
    // =========================================================================

    #[test]
    fn prop_invoice_never_reserves(
        old in arb_old_invoice(),
        new in arb_invoice_status(),
        items_changed in any::<bool>(),
    ) {
        let plan = TransitionPolicy::invoice_save(old, new, items_changed);
        prop_assert!(!plan.contains(StockAction::Reserve));
        prop_assert!(!plan.contains(StockAction::ReleaseReservation));
        prop_assert!(!plan.contains(StockAction::Restock));
    }

    #[test]
    fn prop_invoice_moves_inside_consuming_set_are_silent(
        items_changed in any::<bool>(),
    ) {
        for (old, new) in [
            (InvoiceStatus::Issued, InvoiceStatus::Paid),
            (InvoiceStatus::Paid, InvoiceStatus::Issued),
        ] {
            let plan = TransitionPolicy::invoice_save(Some(old), new, items_changed);
            prop_assert!(plan.is_empty());
        }
    }

    // =========================================================================
    // Property: supplier orders never touch reservations or deduct.
    // =========================================================================

    #[test]
    fn prop_supplier_order_only_restocks_and_restores(
        old in arb_old_supplier(),
        new in arb_supplier_status(),
        items_changed in any::<bool>(),
    ) {
        let plan = TransitionPolicy::supplier_order_save(old, new, items_changed);
        prop_assert!(!plan.contains(StockAction::Reserve));
        prop_assert!(!plan.contains(StockAction::ReleaseReservation));
        prop_assert!(!plan.contains(StockAction::Deduct));
    }

    #[test]
    fn prop_supplier_restock_iff_entering_completed(
        old in arb_old_supplier(),
        new in arb_supplier_status(),
        items_changed in any::<bool>(),
    ) {
        let plan = TransitionPolicy::supplier_order_save(old, new, items_changed);
        let noop_resave = old == Some(new) && !items_changed;

        let expected = new == SupplierOrderStatus::Completed && !noop_resave;
        prop_assert_eq!(plan.contains(StockAction::Restock), expected);
    }

    // =========================================================================
    // Property: delete plans are pure teardown, at most one action.
    // =========================================================================

    #[test]
    fn prop_order_delete_is_pure_teardown(status in arb_order_status()) {
        let plan = TransitionPolicy::order_delete(status);
        prop_assert!(plan.actions.len() <= 1);
        for action in &plan.actions {
            prop_assert!(matches!(
                action,
                StockAction::Restore | StockAction::ReleaseReservation
            ));
        }
    }

    #[test]
    fn prop_invoice_delete_is_pure_teardown(status in arb_invoice_status()) {
        let plan = TransitionPolicy::invoice_delete(status);
        prop_assert!(plan.actions.len() <= 1);
        for action in &plan.actions {
            prop_assert!(matches!(action, StockAction::Restore));
        }
    }

    #[test]
    fn prop_supplier_delete_is_pure_teardown(status in arb_supplier_status()) {
        let plan = TransitionPolicy::supplier_order_delete(status);
        prop_assert!(plan.actions.len() <= 1);
        for action in &plan.actions {
            prop_assert!(matches!(action, StockAction::Restore));
        }
    }
}
