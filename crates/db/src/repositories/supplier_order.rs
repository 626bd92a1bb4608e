//! Supplier order repository for purchase document persistence and stock
//! transitions.
//!
//! Supplier orders only ever add stock: entering `Completed` restocks the
//! ordered quantities, leaving it reverses the recorded additions. There is
//! no reservation phase and no availability check; incoming goods cannot
//! shortfall.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use lagera_core::document::{SupplierOrderStatus, TransitionPolicy};
use lagera_core::stock::{DocumentKind, DocumentRef, LineItem};
use lagera_shared::types::{PageRequest, PageResponse};

use crate::entities::sea_orm_active_enums as db_enums;
use crate::entities::{supplier_order_items, supplier_orders};
use crate::repositories::stock::{
    same_stock_footprint, DocumentItemInput, StockError, StockLedger,
};

/// Error types for supplier order operations.
#[derive(Debug, thiserror::Error)]
pub enum SupplierOrderError {
    /// Supplier order not found.
    #[error("Supplier order not found: {0}")]
    NotFound(Uuid),

    /// Supplier order number already in use.
    #[error("Supplier order number already exists: {0}")]
    DuplicateNumber(String),

    /// Stock ledger error.
    #[error("Stock ledger error: {0}")]
    Stock(#[from] StockError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Full document state as the editor submits it on each save.
#[derive(Debug, Clone)]
pub struct SupplierOrderInput {
    /// Human-readable document number; unique across supplier orders.
    pub number: String,
    /// Supplier display name.
    pub supplier_name: String,
    /// Target status.
    pub status: SupplierOrderStatus,
    /// Document date; stamps any movement entries the save records.
    pub issued_on: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Line items; replace the persisted rows wholesale.
    pub items: Vec<DocumentItemInput>,
}

/// Filter options for listing supplier orders.
#[derive(Debug, Clone, Default)]
pub struct SupplierOrderFilter {
    /// Filter by status.
    pub status: Option<SupplierOrderStatus>,
    /// Earliest document date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest document date, inclusive.
    pub date_to: Option<NaiveDate>,
}

/// Supplier order header with its line items.
#[derive(Debug, Clone)]
pub struct SupplierOrderWithItems {
    /// Supplier order header.
    pub supplier_order: supplier_orders::Model,
    /// Line items.
    pub items: Vec<supplier_order_items::Model>,
}

/// Supplier order repository handling persistence and stock side effects.
#[derive(Debug, Clone)]
pub struct SupplierOrderRepository {
    db: DatabaseConnection,
}

impl SupplierOrderRepository {
    /// Creates a new supplier order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a supplier order, applying its status's stock effects
    /// atomically.
    ///
    /// Saving directly as `Completed` restocks in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The supplier order number is already in use
    /// - A line references an unknown product or a non-positive quantity
    /// - Database operation fails
    pub async fn create(
        &self,
        input: SupplierOrderInput,
    ) -> Result<SupplierOrderWithItems, SupplierOrderError> {
        let existing = supplier_orders::Entity::find()
            .filter(supplier_orders::Column::Number.eq(input.number.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(SupplierOrderError::DuplicateNumber(input.number));
        }

        let txn = self.db.begin().await?;

        let order_id = Uuid::new_v4();
        let document =
            DocumentRef::new(DocumentKind::SupplierOrder, order_id, input.number.clone());
        let plan = TransitionPolicy::supplier_order_save(None, input.status, true);

        let items = StockLedger::resolve_items(&txn, &input.items).await?;
        StockLedger::apply_plan(&txn, &plan, &document, &items, input.issued_on).await?;

        let supplier_order = Self::insert_header(&txn, order_id, &input).await?;
        let rows = Self::insert_items(&txn, order_id, &input.items, &items).await?;

        txn.commit().await?;

        Ok(SupplierOrderWithItems {
            supplier_order,
            items: rows,
        })
    }

    /// Updates a supplier order, translating the status change into ledger
    /// actions.
    ///
    /// Detail rows are replaced wholesale. Demoting a `Completed` order
    /// directly decrements the previously added stock.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The supplier order is not found
    /// - The new number clashes with another supplier order
    /// - A line references an unknown product or a non-positive quantity
    /// - Database operation fails
    pub async fn update(
        &self,
        order_id: Uuid,
        input: SupplierOrderInput,
    ) -> Result<SupplierOrderWithItems, SupplierOrderError> {
        let supplier_order = supplier_orders::Entity::find_by_id(order_id)
            .one(&self.db)
            .await?
            .ok_or(SupplierOrderError::NotFound(order_id))?;

        if input.number != supplier_order.number {
            let clash = supplier_orders::Entity::find()
                .filter(supplier_orders::Column::Number.eq(input.number.clone()))
                .one(&self.db)
                .await?;
            if clash.is_some() {
                return Err(SupplierOrderError::DuplicateNumber(input.number));
            }
        }

        let old_items = supplier_order_items::Entity::find()
            .filter(supplier_order_items::Column::SupplierOrderId.eq(order_id))
            .all(&self.db)
            .await?;

        let txn = self.db.begin().await?;

        let mut affected: Vec<Uuid> = old_items.iter().map(|row| row.product_id).collect();
        affected.extend(input.items.iter().map(|item| item.product_id));
        StockLedger::lock_products(&txn, &affected).await?;

        StockLedger::retag_document(
            &txn,
            DocumentKind::SupplierOrder,
            &supplier_order.number,
            &input.number,
        )
        .await?;

        let document = DocumentRef::new(DocumentKind::SupplierOrder, order_id, input.number.clone());
        let items = StockLedger::resolve_items(&txn, &input.items).await?;
        let old_footprint: Vec<LineItem> = old_items
            .iter()
            .map(|row| LineItem::new(row.product_id, row.product_name.clone(), row.quantity))
            .collect();
        let items_changed = !same_stock_footprint(&old_footprint, &items);

        let old_status = SupplierOrderStatus::from(supplier_order.status.clone());
        let plan = TransitionPolicy::supplier_order_save(Some(old_status), input.status, items_changed);

        StockLedger::apply_plan(&txn, &plan, &document, &items, input.issued_on).await?;

        let updated = Self::update_header(&txn, supplier_order, &input).await?;
        supplier_order_items::Entity::delete_many()
            .filter(supplier_order_items::Column::SupplierOrderId.eq(order_id))
            .exec(&txn)
            .await?;
        let rows = Self::insert_items(&txn, order_id, &input.items, &items).await?;

        txn.commit().await?;

        Ok(SupplierOrderWithItems {
            supplier_order: updated,
            items: rows,
        })
    }

    /// Deletes a supplier order, reversing its recorded additions if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the supplier order is not found or a database
    /// operation fails.
    pub async fn delete(&self, order_id: Uuid) -> Result<(), SupplierOrderError> {
        let supplier_order = supplier_orders::Entity::find_by_id(order_id)
            .one(&self.db)
            .await?
            .ok_or(SupplierOrderError::NotFound(order_id))?;

        let old_items = supplier_order_items::Entity::find()
            .filter(supplier_order_items::Column::SupplierOrderId.eq(order_id))
            .all(&self.db)
            .await?;

        let txn = self.db.begin().await?;

        let affected: Vec<Uuid> = old_items.iter().map(|row| row.product_id).collect();
        StockLedger::lock_products(&txn, &affected).await?;

        let document = DocumentRef::new(
            DocumentKind::SupplierOrder,
            supplier_order.id,
            supplier_order.number.clone(),
        );
        let plan = TransitionPolicy::supplier_order_delete(SupplierOrderStatus::from(
            supplier_order.status.clone(),
        ));
        StockLedger::apply_plan(&txn, &plan, &document, &[], supplier_order.issued_on).await?;
        StockLedger::remove_reservations(&txn, &document).await?;

        supplier_orders::Entity::delete_by_id(order_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Gets a supplier order by id with its line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the supplier order is not found or the query
    /// fails.
    pub async fn get(&self, order_id: Uuid) -> Result<SupplierOrderWithItems, SupplierOrderError> {
        let supplier_order = supplier_orders::Entity::find_by_id(order_id)
            .one(&self.db)
            .await?
            .ok_or(SupplierOrderError::NotFound(order_id))?;

        let items = supplier_order_items::Entity::find()
            .filter(supplier_order_items::Column::SupplierOrderId.eq(order_id))
            .order_by_asc(supplier_order_items::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(SupplierOrderWithItems {
            supplier_order,
            items,
        })
    }

    /// Lists supplier orders, newest document date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        filter: SupplierOrderFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<supplier_orders::Model>, SupplierOrderError> {
        let mut query = supplier_orders::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(
                supplier_orders::Column::Status.eq(db_enums::SupplierOrderStatus::from(status)),
            );
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(supplier_orders::Column::IssuedOn.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(supplier_orders::Column::IssuedOn.lte(date_to));
        }

        let paginator = query
            .order_by_desc(supplier_orders::Column::IssuedOn)
            .order_by_desc(supplier_orders::Column::CreatedAt)
            .paginate(&self.db, page.limit());

        let total = paginator.num_items().await?;
        let rows = paginator
            .fetch_page(u64::from(page.page.saturating_sub(1)))
            .await?;

        Ok(PageResponse::new(rows, page, total))
    }

    /// Inserts the supplier order header.
    async fn insert_header(
        txn: &DatabaseTransaction,
        order_id: Uuid,
        input: &SupplierOrderInput,
    ) -> Result<supplier_orders::Model, SupplierOrderError> {
        let now = Utc::now().into();
        let supplier_order = supplier_orders::ActiveModel {
            id: Set(order_id),
            number: Set(input.number.clone()),
            supplier_name: Set(input.supplier_name.clone()),
            status: Set(db_enums::SupplierOrderStatus::from(input.status)),
            issued_on: Set(input.issued_on),
            notes: Set(input.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(supplier_order.insert(txn).await?)
    }

    /// Overwrites the supplier order header from the submitted state.
    async fn update_header(
        txn: &DatabaseTransaction,
        supplier_order: supplier_orders::Model,
        input: &SupplierOrderInput,
    ) -> Result<supplier_orders::Model, SupplierOrderError> {
        let mut active: supplier_orders::ActiveModel = supplier_order.into();
        active.number = Set(input.number.clone());
        active.supplier_name = Set(input.supplier_name.clone());
        active.status = Set(db_enums::SupplierOrderStatus::from(input.status));
        active.issued_on = Set(input.issued_on);
        active.notes = Set(input.notes.clone());
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(txn).await?)
    }

    /// Inserts one detail row per input line, names resolved server-side.
    async fn insert_items(
        txn: &DatabaseTransaction,
        order_id: Uuid,
        inputs: &[DocumentItemInput],
        items: &[LineItem],
    ) -> Result<Vec<supplier_order_items::Model>, SupplierOrderError> {
        let now = Utc::now().into();
        let mut rows = Vec::with_capacity(inputs.len());
        for (input, item) in inputs.iter().zip(items) {
            let row = supplier_order_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                supplier_order_id: Set(order_id),
                product_id: Set(input.product_id),
                product_name: Set(item.product_name.clone()),
                quantity: Set(input.quantity),
                unit_price: Set(input.unit_price),
                created_at: Set(now),
            };
            rows.push(row.insert(txn).await?);
        }
        Ok(rows)
    }
}
