//! Transition policy mapping document status changes to ledger actions.
//!
//! Every document save and delete is translated into an ordered plan of
//! stock actions which the caller executes inside one database
//! transaction. The plan composes a teardown of the old status's standing
//! effects with an application of the new status's effects, so status
//! flips can be repeated in any sequence without drift.
//!
//! Standing effects per kind:
//! - Order: `InProgress` holds reservations, `Completed` holds a deduction
//! - Invoice: `Issued` and `Paid` hold a deduction (no reservation phase)
//! - SupplierOrder: `Completed` holds an addition

use crate::document::status::{InvoiceStatus, OrderStatus, SupplierOrderStatus};

/// A single ledger operation the policy instructs the caller to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAction {
    /// Cancel the document's ACTIVE reservations, releasing their quantities.
    ReleaseReservation,
    /// Upsert one ACTIVE reservation per current line item.
    Reserve,
    /// Subtract physical stock per line item, logging OUTWARD movements.
    Deduct,
    /// Add physical stock per line item, logging INWARD movements.
    Restock,
    /// Reverse and delete every movement recorded for the document.
    Restore,
}

/// Ordered ledger actions for one document save or delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionPlan {
    /// Actions to execute, in order, inside the caller's transaction.
    pub actions: Vec<StockAction>,
}

impl TransitionPlan {
    /// Returns true when no ledger call is needed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns true when the plan contains the given action.
    #[must_use]
    pub fn contains(&self, action: StockAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Stateless policy computing transition plans per document kind.
///
/// `old` is `None` when the document is being created. `items_changed`
/// reports whether the line items differ from the persisted rows; a
/// same-status save with unchanged items is a no-op, while changed items
/// force a teardown and re-application so ledger state always reflects
/// what is persisted.
pub struct TransitionPolicy;

impl TransitionPolicy {
    /// Plan for saving an order.
    ///
    /// | old → new | actions |
    /// |---|---|
    /// | * → New | none |
    /// | * → InProgress | release (when previously reserving), then reserve |
    /// | InProgress → Completed | release, then deduct |
    /// | * → Completed (no reservation held) | deduct |
    /// | Completed → not-Completed | restore |
    /// | InProgress → not-InProgress, not-Completed | release |
    /// | * → Cancelled | teardown of the old status, nothing dangles |
    ///
    /// Editing an `InProgress` order always releases the existing
    /// reservations before reserving again: the upsert alone would leave a
    /// dangling ACTIVE row for any product removed from the order.
    #[must_use]
    pub fn order_save(
        old: Option<OrderStatus>,
        new: OrderStatus,
        items_changed: bool,
    ) -> TransitionPlan {
        if old == Some(new) && !items_changed {
            return TransitionPlan::default();
        }

        let mut actions = Vec::new();

        match old {
            Some(status) if status.consumes_stock() => actions.push(StockAction::Restore),
            Some(status) if status.reserves_stock() => {
                actions.push(StockAction::ReleaseReservation);
            }
            _ => {}
        }

        if new.reserves_stock() {
            actions.push(StockAction::Reserve);
        } else if new.consumes_stock() {
            actions.push(StockAction::Deduct);
        }

        TransitionPlan { actions }
    }

    /// Plan for deleting an order: teardown of the current status only.
    #[must_use]
    pub fn order_delete(status: OrderStatus) -> TransitionPlan {
        let mut actions = Vec::new();
        if status.consumes_stock() {
            actions.push(StockAction::Restore);
        } else if status.reserves_stock() {
            actions.push(StockAction::ReleaseReservation);
        }
        TransitionPlan { actions }
    }

    /// Plan for saving an invoice.
    ///
    /// Stock-affecting set: {Issued, Paid}. Entering the set from outside
    /// deducts; leaving it restores; moving inside it (Issued ⇄ Paid)
    /// touches nothing. A same-status save inside the set with changed
    /// items restores and deducts again, keeping the movement log aligned
    /// with the persisted rows.
    #[must_use]
    pub fn invoice_save(
        old: Option<InvoiceStatus>,
        new: InvoiceStatus,
        items_changed: bool,
    ) -> TransitionPlan {
        if old == Some(new) && !items_changed {
            return TransitionPlan::default();
        }

        let was_consuming = old.is_some_and(|status| status.consumes_stock());
        let will_consume = new.consumes_stock();

        let actions = match (was_consuming, will_consume) {
            (true, true) if old == Some(new) => vec![StockAction::Restore, StockAction::Deduct],
            (true, true) | (false, false) => vec![],
            (true, false) => vec![StockAction::Restore],
            (false, true) => vec![StockAction::Deduct],
        };

        TransitionPlan { actions }
    }

    /// Plan for deleting an invoice.
    #[must_use]
    pub fn invoice_delete(status: InvoiceStatus) -> TransitionPlan {
        let mut actions = Vec::new();
        if status.consumes_stock() {
            actions.push(StockAction::Restore);
        }
        TransitionPlan { actions }
    }

    /// Plan for saving a supplier order.
    ///
    /// Only `Completed` affects stock: entering it restocks the ordered
    /// quantities, leaving it reverses the recorded additions (a direct
    /// decrement). Supplier orders never reserve.
    #[must_use]
    pub fn supplier_order_save(
        old: Option<SupplierOrderStatus>,
        new: SupplierOrderStatus,
        items_changed: bool,
    ) -> TransitionPlan {
        if old == Some(new) && !items_changed {
            return TransitionPlan::default();
        }

        let mut actions = Vec::new();
        if old.is_some_and(|status| status.adds_stock()) {
            actions.push(StockAction::Restore);
        }
        if new.adds_stock() {
            actions.push(StockAction::Restock);
        }

        TransitionPlan { actions }
    }

    /// Plan for deleting a supplier order.
    #[must_use]
    pub fn supplier_order_delete(status: SupplierOrderStatus) -> TransitionPlan {
        let mut actions = Vec::new();
        if status.adds_stock() {
            actions.push(StockAction::Restore);
        }
        TransitionPlan { actions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Order saves ==========

    #[test]
    fn test_new_order_in_progress_reserves() {
        let plan = TransitionPolicy::order_save(None, OrderStatus::InProgress, true);
        assert_eq!(plan.actions, vec![StockAction::Reserve]);
    }

    #[test]
    fn test_order_in_progress_to_completed_releases_then_deducts() {
        let plan = TransitionPolicy::order_save(
            Some(OrderStatus::InProgress),
            OrderStatus::Completed,
            false,
        );
        assert_eq!(
            plan.actions,
            vec![StockAction::ReleaseReservation, StockAction::Deduct]
        );
    }

    #[test]
    fn test_order_completed_without_reservation_phase_deducts_directly() {
        let plan = TransitionPolicy::order_save(Some(OrderStatus::New), OrderStatus::Completed, false);
        assert_eq!(plan.actions, vec![StockAction::Deduct]);
    }

    #[test]
    fn test_editing_in_progress_order_releases_before_reserving() {
        // Changing line items while InProgress: the stale reservation must go
        // before the new one is created.
        let plan = TransitionPolicy::order_save(
            Some(OrderStatus::InProgress),
            OrderStatus::InProgress,
            true,
        );
        assert_eq!(
            plan.actions,
            vec![StockAction::ReleaseReservation, StockAction::Reserve]
        );
    }

    #[test]
    fn test_unchanged_resave_is_a_no_op() {
        for status in [
            OrderStatus::New,
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            let plan = TransitionPolicy::order_save(Some(status), status, false);
            assert!(plan.is_empty(), "resave of {status} should do nothing");
        }
    }

    #[test]
    fn test_reopening_completed_order_restores() {
        let plan =
            TransitionPolicy::order_save(Some(OrderStatus::Completed), OrderStatus::New, false);
        assert_eq!(plan.actions, vec![StockAction::Restore]);
    }

    #[test]
    fn test_completed_back_to_in_progress_restores_then_reserves() {
        let plan = TransitionPolicy::order_save(
            Some(OrderStatus::Completed),
            OrderStatus::InProgress,
            false,
        );
        assert_eq!(plan.actions, vec![StockAction::Restore, StockAction::Reserve]);
    }

    #[test]
    fn test_cancelling_in_progress_order_releases() {
        let plan = TransitionPolicy::order_save(
            Some(OrderStatus::InProgress),
            OrderStatus::Cancelled,
            false,
        );
        assert_eq!(plan.actions, vec![StockAction::ReleaseReservation]);
    }

    #[test]
    fn test_cancelling_completed_order_restores() {
        let plan = TransitionPolicy::order_save(
            Some(OrderStatus::Completed),
            OrderStatus::Cancelled,
            false,
        );
        assert_eq!(plan.actions, vec![StockAction::Restore]);
    }

    #[test]
    fn test_editing_completed_order_restores_then_deducts() {
        let plan = TransitionPolicy::order_save(
            Some(OrderStatus::Completed),
            OrderStatus::Completed,
            true,
        );
        assert_eq!(plan.actions, vec![StockAction::Restore, StockAction::Deduct]);
    }

    // ========== Order deletes ==========

    #[test]
    fn test_deleting_completed_order_restores() {
        let plan = TransitionPolicy::order_delete(OrderStatus::Completed);
        assert_eq!(plan.actions, vec![StockAction::Restore]);
    }

    #[test]
    fn test_deleting_in_progress_order_releases() {
        let plan = TransitionPolicy::order_delete(OrderStatus::InProgress);
        assert_eq!(plan.actions, vec![StockAction::ReleaseReservation]);
    }

    #[test]
    fn test_deleting_new_order_touches_nothing() {
        assert!(TransitionPolicy::order_delete(OrderStatus::New).is_empty());
        assert!(TransitionPolicy::order_delete(OrderStatus::Cancelled).is_empty());
    }

    // ========== Invoice saves ==========

    #[test]
    fn test_issuing_invoice_deducts() {
        let plan =
            TransitionPolicy::invoice_save(Some(InvoiceStatus::Draft), InvoiceStatus::Issued, false);
        assert_eq!(plan.actions, vec![StockAction::Deduct]);
    }

    #[test]
    fn test_new_invoice_saved_as_issued_deducts() {
        let plan = TransitionPolicy::invoice_save(None, InvoiceStatus::Issued, true);
        assert_eq!(plan.actions, vec![StockAction::Deduct]);
    }

    #[test]
    fn test_issued_to_paid_has_no_stock_effect() {
        let plan =
            TransitionPolicy::invoice_save(Some(InvoiceStatus::Issued), InvoiceStatus::Paid, false);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_paid_back_to_issued_has_no_stock_effect() {
        let plan =
            TransitionPolicy::invoice_save(Some(InvoiceStatus::Paid), InvoiceStatus::Issued, false);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_demoting_issued_invoice_restores() {
        let plan =
            TransitionPolicy::invoice_save(Some(InvoiceStatus::Issued), InvoiceStatus::Draft, false);
        assert_eq!(plan.actions, vec![StockAction::Restore]);
    }

    #[test]
    fn test_canceling_paid_invoice_restores() {
        let plan =
            TransitionPolicy::invoice_save(Some(InvoiceStatus::Paid), InvoiceStatus::Canceled, false);
        assert_eq!(plan.actions, vec![StockAction::Restore]);
    }

    #[test]
    fn test_reissuing_canceled_invoice_deducts_again() {
        let plan = TransitionPolicy::invoice_save(
            Some(InvoiceStatus::Canceled),
            InvoiceStatus::Issued,
            false,
        );
        assert_eq!(plan.actions, vec![StockAction::Deduct]);
    }

    #[test]
    fn test_editing_issued_invoice_restores_then_deducts() {
        let plan =
            TransitionPolicy::invoice_save(Some(InvoiceStatus::Issued), InvoiceStatus::Issued, true);
        assert_eq!(plan.actions, vec![StockAction::Restore, StockAction::Deduct]);
    }

    #[test]
    fn test_deleting_issued_invoice_restores() {
        let plan = TransitionPolicy::invoice_delete(InvoiceStatus::Issued);
        assert_eq!(plan.actions, vec![StockAction::Restore]);
        assert!(TransitionPolicy::invoice_delete(InvoiceStatus::Draft).is_empty());
    }

    // ========== Supplier order saves ==========

    #[test]
    fn test_completing_supplier_order_restocks() {
        let plan = TransitionPolicy::supplier_order_save(
            Some(SupplierOrderStatus::InTransit),
            SupplierOrderStatus::Completed,
            false,
        );
        assert_eq!(plan.actions, vec![StockAction::Restock]);
    }

    #[test]
    fn test_supplier_order_draft_to_in_transit_touches_nothing() {
        let plan = TransitionPolicy::supplier_order_save(
            Some(SupplierOrderStatus::Draft),
            SupplierOrderStatus::InTransit,
            true,
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn test_demoting_completed_supplier_order_restores() {
        // Reversing INWARD movements is a direct decrement.
        let plan = TransitionPolicy::supplier_order_save(
            Some(SupplierOrderStatus::Completed),
            SupplierOrderStatus::InTransit,
            false,
        );
        assert_eq!(plan.actions, vec![StockAction::Restore]);
    }

    #[test]
    fn test_editing_completed_supplier_order_restores_then_restocks() {
        let plan = TransitionPolicy::supplier_order_save(
            Some(SupplierOrderStatus::Completed),
            SupplierOrderStatus::Completed,
            true,
        );
        assert_eq!(plan.actions, vec![StockAction::Restore, StockAction::Restock]);
    }

    #[test]
    fn test_deleting_completed_supplier_order_restores() {
        let plan = TransitionPolicy::supplier_order_delete(SupplierOrderStatus::Completed);
        assert_eq!(plan.actions, vec![StockAction::Restore]);
        assert!(TransitionPolicy::supplier_order_delete(SupplierOrderStatus::Draft).is_empty());
    }
}
