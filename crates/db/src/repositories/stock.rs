//! Stock ledger: the single write path for stock quantities.
//!
//! Every change to `physical_quantity` and `reserved_quantity` goes through
//! this module, inside a transaction owned by the caller. Product rows are
//! locked with `SELECT ... FOR UPDATE` in ascending id order before any
//! counter is read, so concurrent document saves serialize per product
//! instead of racing. Reservation rows carry the standing claims of
//! in-progress orders; movement rows are the append-only audit of every
//! physical change and the data `restore_document` reverses.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use lagera_core::document::{StockAction, TransitionPlan};
use lagera_core::stock::{
    AvailabilityError, AvailabilityReport, AvailabilityService, DocumentKind, DocumentRef,
    LineItem, StockLevel,
};

use crate::entities::sea_orm_active_enums::{
    DocumentType, MovementDirection, MovementReason, ReservationStatus,
};
use crate::entities::{products, stock_movements, stock_reservations};

/// Errors that can occur during stock ledger operations
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// One detail line of a stock-affecting document, as supplied by the caller.
///
/// The product name is resolved server-side from the catalog; callers only
/// send the id, quantity and agreed price.
#[derive(Debug, Clone)]
pub struct DocumentItemInput {
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price: Decimal,
}

/// Compares two item lists by their aggregated per-product quantities.
///
/// Reordering lines or splitting one line into two with the same total is
/// not a stock-relevant change; a same-status re-save with an unchanged
/// footprint must produce no ledger effect.
#[must_use]
pub fn same_stock_footprint(old: &[LineItem], new: &[LineItem]) -> bool {
    let mut old_totals = aggregate(old);
    let mut new_totals = aggregate(new);
    old_totals.sort_unstable();
    new_totals.sort_unstable();
    old_totals == new_totals
}

/// Sums quantities per product, preserving first-seen order.
fn aggregate(items: &[LineItem]) -> Vec<(Uuid, i64)> {
    let mut totals: Vec<(Uuid, i64)> = Vec::new();
    for item in items {
        match totals.iter_mut().find(|(id, _)| *id == item.product_id) {
            Some((_, total)) => *total += item.quantity,
            None => totals.push((item.product_id, item.quantity)),
        }
    }
    totals
}

/// Stateless ledger over the products / stock_reservations / stock_movements
/// tables.
///
/// Operations are associated functions taking any [`ConnectionTrait`]
/// implementor, so one document save can run every ledger call on its own
/// [`sea_orm::DatabaseTransaction`] and commit or roll back atomically.
pub struct StockLedger;

impl StockLedger {
    /// Locks the given product rows (`FOR UPDATE`, ascending id order).
    ///
    /// Callers that touch several ledger operations in one transaction lock
    /// the union of affected products up front so later per-operation locks
    /// find the rows already held.
    ///
    /// # Errors
    /// Returns [`StockError::ProductNotFound`] when any id has no row.
    pub async fn lock_products<C: ConnectionTrait>(
        conn: &C,
        product_ids: &[Uuid],
    ) -> Result<(), StockError> {
        Self::load_locked(conn, product_ids).await.map(|_| ())
    }

    /// Validates quantities, locks the referenced products and resolves the
    /// catalog name for each line.
    ///
    /// # Errors
    /// * [`StockError::InvalidQuantity`] - A line quantity is zero or negative
    /// * [`StockError::ProductNotFound`] - A line references an unknown product
    pub async fn resolve_items<C: ConnectionTrait>(
        conn: &C,
        inputs: &[DocumentItemInput],
    ) -> Result<Vec<LineItem>, StockError> {
        for input in inputs {
            if input.quantity <= 0 {
                return Err(StockError::InvalidQuantity(input.quantity));
            }
        }

        let ids: Vec<Uuid> = inputs.iter().map(|input| input.product_id).collect();
        let catalog = Self::load_locked(conn, &ids).await?;

        let mut items = Vec::with_capacity(inputs.len());
        for input in inputs {
            let product = catalog
                .get(&input.product_id)
                .ok_or(StockError::ProductNotFound(input.product_id))?;
            items.push(LineItem::new(
                input.product_id,
                product.name.clone(),
                input.quantity,
            ));
        }
        Ok(items)
    }

    /// Computes the shortfall report for the requested items.
    ///
    /// Pure read; never mutates and never locks. When `exclude` names the
    /// document being edited, its own standing allocation (ACTIVE reservation
    /// quantity plus recorded OUTWARD movement quantity per product) is added
    /// back before comparing, so a document never competes with itself. The
    /// add-back reads persisted ledger rows only.
    ///
    /// A non-empty report is not an error: the caller decides whether to
    /// override and drive stock negative.
    pub async fn check_availability<C: ConnectionTrait>(
        conn: &C,
        items: &[LineItem],
        exclude: Option<&DocumentRef>,
    ) -> Result<AvailabilityReport, StockError> {
        let mut ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let rows = products::Entity::find()
            .filter(products::Column::Id.is_in(ids))
            .all(conn)
            .await?;
        let levels: HashMap<Uuid, StockLevel> = rows
            .into_iter()
            .map(|p| (p.id, StockLevel::new(p.physical_quantity, p.reserved_quantity)))
            .collect();

        let mut prior: HashMap<Uuid, i64> = HashMap::new();
        if let Some(document) = exclude {
            let doc_type = DocumentType::from(document.kind);

            let reservations = stock_reservations::Entity::find()
                .filter(stock_reservations::Column::DocumentType.eq(doc_type.clone()))
                .filter(stock_reservations::Column::DocumentId.eq(document.id))
                .filter(stock_reservations::Column::Status.eq(ReservationStatus::Active))
                .all(conn)
                .await?;
            for row in reservations {
                *prior.entry(row.product_id).or_insert(0) += row.reserved_quantity;
            }

            let movements = stock_movements::Entity::find()
                .filter(stock_movements::Column::DocumentType.eq(doc_type))
                .filter(stock_movements::Column::DocumentNumber.eq(document.number.clone()))
                .filter(stock_movements::Column::Direction.eq(MovementDirection::Outward))
                .all(conn)
                .await?;
            for row in movements {
                *prior.entry(row.product_id).or_insert(0) += row.quantity;
            }
        }

        AvailabilityService::check(
            items,
            |id| levels.get(&id).copied(),
            |id| prior.get(&id).copied().unwrap_or(0),
        )
        .map_err(|err| match err {
            AvailabilityError::UnknownProduct { product_id, .. } => {
                StockError::ProductNotFound(product_id)
            }
        })
    }

    /// Ad-hoc availability preview for editors, outside any save.
    ///
    /// Resolves catalog names without locking and runs the same comparison
    /// a save performs. Quantities must be positive; prices are ignored.
    pub async fn preview_availability<C: ConnectionTrait>(
        conn: &C,
        inputs: &[DocumentItemInput],
        exclude: Option<&DocumentRef>,
    ) -> Result<AvailabilityReport, StockError> {
        for input in inputs {
            if input.quantity <= 0 {
                return Err(StockError::InvalidQuantity(input.quantity));
            }
        }

        let mut ids: Vec<Uuid> = inputs.iter().map(|input| input.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let rows = products::Entity::find()
            .filter(products::Column::Id.is_in(ids))
            .all(conn)
            .await?;
        let names: HashMap<Uuid, String> = rows.into_iter().map(|p| (p.id, p.name)).collect();

        let mut items = Vec::with_capacity(inputs.len());
        for input in inputs {
            let name = names
                .get(&input.product_id)
                .ok_or(StockError::ProductNotFound(input.product_id))?;
            items.push(LineItem::new(input.product_id, name.clone(), input.quantity));
        }

        Self::check_availability(conn, &items, exclude).await
    }

    /// Executes a transition plan's actions in order.
    ///
    /// `items` are the document's current lines (used by `Reserve`, `Deduct`
    /// and `Restock`); `moved_on` dates the movement entries. Teardown
    /// actions (`ReleaseReservation`, `Restore`) read persisted ledger rows
    /// and ignore `items` entirely.
    pub async fn apply_plan<C: ConnectionTrait>(
        conn: &C,
        plan: &TransitionPlan,
        document: &DocumentRef,
        items: &[LineItem],
        moved_on: NaiveDate,
    ) -> Result<(), StockError> {
        for action in &plan.actions {
            match action {
                StockAction::ReleaseReservation => {
                    Self::release_reservations(conn, document).await?;
                }
                StockAction::Reserve => Self::reserve(conn, document, items, None).await?,
                StockAction::Deduct => Self::deduct(conn, document, items, moved_on).await?,
                StockAction::Restock => Self::restock(conn, document, items, moved_on).await?,
                StockAction::Restore => Self::restore_document(conn, document).await?,
            }
        }
        Ok(())
    }

    /// Upserts one ACTIVE reservation per product and adjusts the reserved
    /// counter in the same step.
    ///
    /// An existing row for (product, document) is overwritten: quantity
    /// replaced, status forced back to ACTIVE. The product counter moves by
    /// the difference against the prior ACTIVE amount, so repeated saves
    /// never inflate it.
    pub async fn reserve<C: ConnectionTrait>(
        conn: &C,
        document: &DocumentRef,
        items: &[LineItem],
        notes: Option<&str>,
    ) -> Result<(), StockError> {
        let totals = aggregate(items);
        for &(_, quantity) in &totals {
            if quantity <= 0 {
                return Err(StockError::InvalidQuantity(quantity));
            }
        }

        let ids: Vec<Uuid> = totals.iter().map(|&(id, _)| id).collect();
        let mut catalog = Self::load_locked(conn, &ids).await?;
        let doc_type = DocumentType::from(document.kind);

        for (product_id, quantity) in totals {
            let existing = stock_reservations::Entity::find()
                .filter(stock_reservations::Column::ProductId.eq(product_id))
                .filter(stock_reservations::Column::DocumentType.eq(doc_type.clone()))
                .filter(stock_reservations::Column::DocumentId.eq(document.id))
                .one(conn)
                .await?;

            let prior_active = match &existing {
                Some(row) if row.status == ReservationStatus::Active => row.reserved_quantity,
                _ => 0,
            };

            match existing {
                Some(row) => {
                    let mut reservation: stock_reservations::ActiveModel = row.into();
                    reservation.reserved_quantity = Set(quantity);
                    reservation.status = Set(ReservationStatus::Active);
                    reservation.notes = Set(notes.map(ToString::to_string));
                    reservation.updated_at = Set(Utc::now().into());
                    reservation.update(conn).await?;
                }
                None => {
                    let now = Utc::now();
                    stock_reservations::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        product_id: Set(product_id),
                        document_type: Set(doc_type.clone()),
                        document_id: Set(document.id),
                        reserved_quantity: Set(quantity),
                        status: Set(ReservationStatus::Active),
                        notes: Set(notes.map(ToString::to_string)),
                        created_at: Set(now.into()),
                        updated_at: Set(now.into()),
                    }
                    .insert(conn)
                    .await?;
                }
            }

            let delta = quantity - prior_active;
            if delta != 0 {
                let product = catalog
                    .remove(&product_id)
                    .ok_or(StockError::ProductNotFound(product_id))?;
                Self::shift_reserved(conn, product, delta).await?;
            }
        }
        Ok(())
    }

    /// Marks every ACTIVE reservation of the document CANCELLED and
    /// subtracts each quantity from its product's reserved counter.
    ///
    /// Cancelled rows stay behind for audit. Releasing a document with no
    /// ACTIVE reservations is a no-op, so the call is idempotent.
    pub async fn release_reservations<C: ConnectionTrait>(
        conn: &C,
        document: &DocumentRef,
    ) -> Result<(), StockError> {
        let doc_type = DocumentType::from(document.kind);
        let rows = stock_reservations::Entity::find()
            .filter(stock_reservations::Column::DocumentType.eq(doc_type))
            .filter(stock_reservations::Column::DocumentId.eq(document.id))
            .filter(stock_reservations::Column::Status.eq(ReservationStatus::Active))
            .all(conn)
            .await?;
        if rows.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.product_id).collect();
        let mut catalog = Self::load_locked(conn, &ids).await?;

        for row in rows {
            let product_id = row.product_id;
            let quantity = row.reserved_quantity;

            let mut reservation: stock_reservations::ActiveModel = row.into();
            reservation.status = Set(ReservationStatus::Cancelled);
            reservation.updated_at = Set(Utc::now().into());
            reservation.update(conn).await?;

            let product = catalog
                .remove(&product_id)
                .ok_or(StockError::ProductNotFound(product_id))?;
            Self::shift_reserved(conn, product, -quantity).await?;
        }
        Ok(())
    }

    /// Subtracts physical stock per item and appends one OUTWARD movement
    /// per product with reason SALE.
    ///
    /// Availability is not re-checked here; the caller decides whether a
    /// shortfall blocks the save. Physical stock may go negative.
    pub async fn deduct<C: ConnectionTrait>(
        conn: &C,
        document: &DocumentRef,
        items: &[LineItem],
        moved_on: NaiveDate,
    ) -> Result<(), StockError> {
        Self::move_stock(
            conn,
            document,
            items,
            moved_on,
            MovementDirection::Outward,
            MovementReason::Sale,
        )
        .await
    }

    /// Adds physical stock per item and appends one INWARD movement per
    /// product with reason PURCHASE.
    pub async fn restock<C: ConnectionTrait>(
        conn: &C,
        document: &DocumentRef,
        items: &[LineItem],
        moved_on: NaiveDate,
    ) -> Result<(), StockError> {
        Self::move_stock(
            conn,
            document,
            items,
            moved_on,
            MovementDirection::Inward,
            MovementReason::Purchase,
        )
        .await
    }

    /// Reverses every movement recorded against the document and deletes
    /// those rows.
    ///
    /// OUTWARD quantities are added back to physical stock, INWARD ones
    /// subtracted. Reads only persisted rows, so it is correct regardless of
    /// what any editor currently displays. A document with no recorded
    /// movements is a no-op.
    pub async fn restore_document<C: ConnectionTrait>(
        conn: &C,
        document: &DocumentRef,
    ) -> Result<(), StockError> {
        let doc_type = DocumentType::from(document.kind);
        let rows = stock_movements::Entity::find()
            .filter(stock_movements::Column::DocumentType.eq(doc_type.clone()))
            .filter(stock_movements::Column::DocumentNumber.eq(document.number.clone()))
            .all(conn)
            .await?;
        if rows.is_empty() {
            return Ok(());
        }

        // Net effect to undo per product: outward rows come back, inward
        // rows leave again.
        let mut deltas: Vec<(Uuid, i64)> = Vec::new();
        for row in &rows {
            let signed = match row.direction {
                MovementDirection::Inward => -row.quantity,
                MovementDirection::Outward => row.quantity,
            };
            match deltas.iter_mut().find(|(id, _)| *id == row.product_id) {
                Some((_, total)) => *total += signed,
                None => deltas.push((row.product_id, signed)),
            }
        }

        let ids: Vec<Uuid> = deltas.iter().map(|&(id, _)| id).collect();
        let mut catalog = Self::load_locked(conn, &ids).await?;
        for (product_id, delta) in deltas {
            let product = catalog
                .remove(&product_id)
                .ok_or(StockError::ProductNotFound(product_id))?;
            if delta != 0 {
                Self::shift_physical(conn, product, delta).await?;
            }
        }

        stock_movements::Entity::delete_many()
            .filter(stock_movements::Column::DocumentType.eq(doc_type))
            .filter(stock_movements::Column::DocumentNumber.eq(document.number.clone()))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Re-tags the document's recorded movements with a new number.
    ///
    /// An edit may rename a document whose movements are already on file;
    /// without the retag a later restore would no longer find them.
    pub async fn retag_document<C: ConnectionTrait>(
        conn: &C,
        kind: DocumentKind,
        old_number: &str,
        new_number: &str,
    ) -> Result<(), StockError> {
        if old_number == new_number {
            return Ok(());
        }
        stock_movements::Entity::update_many()
            .col_expr(
                stock_movements::Column::DocumentNumber,
                Expr::value(new_number),
            )
            .filter(stock_movements::Column::DocumentType.eq(DocumentType::from(kind)))
            .filter(stock_movements::Column::DocumentNumber.eq(old_number))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Physically deletes the document's reservation rows, any status.
    ///
    /// ACTIVE amounts are subtracted from the reserved counters first.
    /// Called only on document deletion; everywhere else cancelled rows are
    /// kept for audit.
    pub async fn remove_reservations<C: ConnectionTrait>(
        conn: &C,
        document: &DocumentRef,
    ) -> Result<(), StockError> {
        let doc_type = DocumentType::from(document.kind);
        let rows = stock_reservations::Entity::find()
            .filter(stock_reservations::Column::DocumentType.eq(doc_type.clone()))
            .filter(stock_reservations::Column::DocumentId.eq(document.id))
            .all(conn)
            .await?;
        if rows.is_empty() {
            return Ok(());
        }

        let active_ids: Vec<Uuid> = rows
            .iter()
            .filter(|row| row.status == ReservationStatus::Active)
            .map(|row| row.product_id)
            .collect();
        let mut catalog = Self::load_locked(conn, &active_ids).await?;

        for row in &rows {
            if row.status != ReservationStatus::Active {
                continue;
            }
            let product = catalog
                .remove(&row.product_id)
                .ok_or(StockError::ProductNotFound(row.product_id))?;
            Self::shift_reserved(conn, product, -row.reserved_quantity).await?;
        }

        stock_reservations::Entity::delete_many()
            .filter(stock_reservations::Column::DocumentType.eq(doc_type))
            .filter(stock_reservations::Column::DocumentId.eq(document.id))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Reads the current stock level of a product, if it exists.
    pub async fn stock_level<C: ConnectionTrait>(
        conn: &C,
        product_id: Uuid,
    ) -> Result<Option<StockLevel>, StockError> {
        let product = products::Entity::find_by_id(product_id).one(conn).await?;
        Ok(product.map(|p| StockLevel::new(p.physical_quantity, p.reserved_quantity)))
    }

    /// Loads product rows under `FOR UPDATE`, keyed by id.
    ///
    /// Ids are deduplicated and the query orders by id, so every caller
    /// acquires locks in the same sequence.
    async fn load_locked<C: ConnectionTrait>(
        conn: &C,
        product_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, products::Model>, StockError> {
        let mut wanted: Vec<Uuid> = product_ids.to_vec();
        wanted.sort_unstable();
        wanted.dedup();
        if wanted.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = products::Entity::find()
            .filter(products::Column::Id.is_in(wanted.clone()))
            .order_by_asc(products::Column::Id)
            .lock_exclusive()
            .all(conn)
            .await?;

        let catalog: HashMap<Uuid, products::Model> =
            rows.into_iter().map(|row| (row.id, row)).collect();
        if let Some(missing) = wanted.iter().find(|id| !catalog.contains_key(id)) {
            return Err(StockError::ProductNotFound(*missing));
        }
        Ok(catalog)
    }

    /// Applies one signed physical change per product and logs the movement.
    async fn move_stock<C: ConnectionTrait>(
        conn: &C,
        document: &DocumentRef,
        items: &[LineItem],
        moved_on: NaiveDate,
        direction: MovementDirection,
        reason: MovementReason,
    ) -> Result<(), StockError> {
        let totals = aggregate(items);
        for &(_, quantity) in &totals {
            if quantity <= 0 {
                return Err(StockError::InvalidQuantity(quantity));
            }
        }

        let ids: Vec<Uuid> = totals.iter().map(|&(id, _)| id).collect();
        let mut catalog = Self::load_locked(conn, &ids).await?;
        let doc_type = DocumentType::from(document.kind);

        for (product_id, quantity) in totals {
            let signed = match direction {
                MovementDirection::Inward => quantity,
                MovementDirection::Outward => -quantity,
            };
            let product = catalog
                .remove(&product_id)
                .ok_or(StockError::ProductNotFound(product_id))?;
            Self::shift_physical(conn, product, signed).await?;

            stock_movements::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(product_id),
                moved_on: Set(moved_on),
                direction: Set(direction.clone()),
                quantity: Set(quantity),
                reason: Set(reason.clone()),
                document_type: Set(Some(doc_type.clone())),
                document_number: Set(Some(document.number.clone())),
                notes: Set(None),
                created_at: Set(Utc::now().into()),
            }
            .insert(conn)
            .await?;
        }
        Ok(())
    }

    async fn shift_physical<C: ConnectionTrait>(
        conn: &C,
        product: products::Model,
        delta: i64,
    ) -> Result<(), StockError> {
        let physical = product.physical_quantity + delta;
        let mut active: products::ActiveModel = product.into();
        active.physical_quantity = Set(physical);
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await?;
        Ok(())
    }

    async fn shift_reserved<C: ConnectionTrait>(
        conn: &C,
        product: products::Model,
        delta: i64,
    ) -> Result<(), StockError> {
        let reserved = product.reserved_quantity + delta;
        let mut active: products::ActiveModel = product.into();
        active.reserved_quantity = Set(reserved);
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: Uuid, quantity: i64) -> LineItem {
        LineItem::new(product_id, "Widget", quantity)
    }

    #[test]
    fn test_aggregate_sums_duplicate_products() {
        let product = Uuid::new_v4();
        let other = Uuid::new_v4();
        let totals = aggregate(&[item(product, 2), item(other, 1), item(product, 3)]);
        assert_eq!(totals, vec![(product, 5), (other, 1)]);
    }

    #[test]
    fn test_footprint_ignores_order_and_line_splits() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let old = vec![item(a, 5), item(b, 2)];
        let new = vec![item(b, 2), item(a, 3), item(a, 2)];
        assert!(same_stock_footprint(&old, &new));
    }

    #[test]
    fn test_footprint_detects_quantity_change() {
        let a = Uuid::new_v4();
        assert!(!same_stock_footprint(&[item(a, 5)], &[item(a, 4)]));
    }

    #[test]
    fn test_footprint_detects_product_swap() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(!same_stock_footprint(&[item(a, 5)], &[item(b, 5)]));
    }
}
