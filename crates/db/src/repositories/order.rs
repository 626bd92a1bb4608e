//! Order repository for sales order persistence and stock transitions.
//!
//! Every save receives the document's full state. The repository computes a
//! transition plan from the persisted status and the new one, then runs the
//! plan's ledger calls, the header write and the detail-row rewrite inside a
//! single database transaction.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use lagera_core::document::{OrderStatus, StockAction, TransitionPlan, TransitionPolicy};
use lagera_core::stock::{AvailabilityReport, DocumentKind, DocumentRef, LineItem};
use lagera_shared::types::{PageRequest, PageResponse};

use crate::entities::sea_orm_active_enums as db_enums;
use crate::entities::{order_items, orders};
use crate::repositories::stock::{
    same_stock_footprint, DocumentItemInput, StockError, StockLedger,
};

/// Error types for order operations.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// Order not found.
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    /// Order number already in use.
    #[error("Order number already exists: {0}")]
    DuplicateNumber(String),

    /// Requested quantities exceed available stock and no override was given.
    #[error("Insufficient stock for {} item(s)", .0.shortfalls.len())]
    InsufficientStock(AvailabilityReport),

    /// Stock ledger error.
    #[error("Stock ledger error: {0}")]
    Stock(#[from] StockError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Full document state as the editor submits it on each save.
#[derive(Debug, Clone)]
pub struct OrderInput {
    /// Human-readable document number; unique across orders.
    pub number: String,
    /// Customer display name.
    pub customer_name: String,
    /// Target status.
    pub status: OrderStatus,
    /// Document date; stamps any movement entries the save records.
    pub issued_on: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Line items; replace the persisted rows wholesale.
    pub items: Vec<DocumentItemInput>,
    /// Proceed despite a shortfall, driving stock negative.
    pub allow_shortfall: bool,
}

/// Filter options for listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Filter by status.
    pub status: Option<OrderStatus>,
    /// Earliest document date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest document date, inclusive.
    pub date_to: Option<NaiveDate>,
}

/// Order header with its line items.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    /// Order header.
    pub order: orders::Model,
    /// Line items.
    pub items: Vec<order_items::Model>,
}

/// Order repository handling persistence and stock side effects.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
}

impl OrderRepository {
    /// Creates a new order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an order, applying its status's stock effects atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The order number is already in use
    /// - A line references an unknown product or a non-positive quantity
    /// - Stock is insufficient and `allow_shortfall` is false
    /// - Database operation fails
    pub async fn create(&self, input: OrderInput) -> Result<OrderWithItems, OrderError> {
        let existing = orders::Entity::find()
            .filter(orders::Column::Number.eq(input.number.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(OrderError::DuplicateNumber(input.number));
        }

        let txn = self.db.begin().await?;

        let order_id = Uuid::new_v4();
        let document = DocumentRef::new(DocumentKind::Order, order_id, input.number.clone());
        let plan = TransitionPolicy::order_save(None, input.status, true);

        let items = StockLedger::resolve_items(&txn, &input.items).await?;
        Self::guard_stock(&txn, &plan, &document, &items, input.allow_shortfall).await?;
        StockLedger::apply_plan(&txn, &plan, &document, &items, input.issued_on).await?;

        let order = Self::insert_header(&txn, order_id, &input).await?;
        let rows = Self::insert_items(&txn, order_id, &input.items, &items).await?;

        txn.commit().await?;

        Ok(OrderWithItems { order, items: rows })
    }

    /// Updates an order, translating the status change into ledger actions.
    ///
    /// Detail rows are replaced wholesale. The transition plan compares the
    /// persisted status with the submitted one and the aggregated stock
    /// footprint of old vs new items, so a re-save without stock-relevant
    /// changes leaves the ledger untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The order is not found
    /// - The new number clashes with another order
    /// - A line references an unknown product or a non-positive quantity
    /// - Stock is insufficient and `allow_shortfall` is false
    /// - Database operation fails
    pub async fn update(
        &self,
        order_id: Uuid,
        input: OrderInput,
    ) -> Result<OrderWithItems, OrderError> {
        let order = orders::Entity::find_by_id(order_id)
            .one(&self.db)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        if input.number != order.number {
            let clash = orders::Entity::find()
                .filter(orders::Column::Number.eq(input.number.clone()))
                .one(&self.db)
                .await?;
            if clash.is_some() {
                return Err(OrderError::DuplicateNumber(input.number));
            }
        }

        let old_items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order_id))
            .all(&self.db)
            .await?;

        let txn = self.db.begin().await?;

        // One upfront lock over old and new products keeps lock order stable
        // for the ledger calls below.
        let mut affected: Vec<Uuid> = old_items.iter().map(|row| row.product_id).collect();
        affected.extend(input.items.iter().map(|item| item.product_id));
        StockLedger::lock_products(&txn, &affected).await?;

        StockLedger::retag_document(&txn, DocumentKind::Order, &order.number, &input.number)
            .await?;

        let document = DocumentRef::new(DocumentKind::Order, order_id, input.number.clone());
        let items = StockLedger::resolve_items(&txn, &input.items).await?;
        let old_footprint: Vec<LineItem> = old_items
            .iter()
            .map(|row| LineItem::new(row.product_id, row.product_name.clone(), row.quantity))
            .collect();
        let items_changed = !same_stock_footprint(&old_footprint, &items);

        let old_status = OrderStatus::from(order.status.clone());
        let plan = TransitionPolicy::order_save(Some(old_status), input.status, items_changed);

        Self::guard_stock(&txn, &plan, &document, &items, input.allow_shortfall).await?;
        StockLedger::apply_plan(&txn, &plan, &document, &items, input.issued_on).await?;

        let updated = Self::update_header(&txn, order, &input).await?;
        order_items::Entity::delete_many()
            .filter(order_items::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        let rows = Self::insert_items(&txn, order_id, &input.items, &items).await?;

        txn.commit().await?;

        Ok(OrderWithItems {
            order: updated,
            items: rows,
        })
    }

    /// Deletes an order, reversing whatever stock effects its current
    /// status holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or a database operation
    /// fails.
    pub async fn delete(&self, order_id: Uuid) -> Result<(), OrderError> {
        let order = orders::Entity::find_by_id(order_id)
            .one(&self.db)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        let old_items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order_id))
            .all(&self.db)
            .await?;

        let txn = self.db.begin().await?;

        let affected: Vec<Uuid> = old_items.iter().map(|row| row.product_id).collect();
        StockLedger::lock_products(&txn, &affected).await?;

        let document = DocumentRef::new(DocumentKind::Order, order.id, order.number.clone());
        let plan = TransitionPolicy::order_delete(OrderStatus::from(order.status.clone()));
        StockLedger::apply_plan(&txn, &plan, &document, &[], order.issued_on).await?;
        StockLedger::remove_reservations(&txn, &document).await?;

        // Detail rows go with the header (ON DELETE CASCADE).
        orders::Entity::delete_by_id(order_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Gets an order by id with its line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the query fails.
    pub async fn get(&self, order_id: Uuid) -> Result<OrderWithItems, OrderError> {
        let order = orders::Entity::find_by_id(order_id)
            .one(&self.db)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order_id))
            .order_by_asc(order_items::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(OrderWithItems { order, items })
    }

    /// Lists orders, newest document date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        filter: OrderFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<orders::Model>, OrderError> {
        let mut query = orders::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(orders::Column::Status.eq(db_enums::OrderStatus::from(status)));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(orders::Column::IssuedOn.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(orders::Column::IssuedOn.lte(date_to));
        }

        let paginator = query
            .order_by_desc(orders::Column::IssuedOn)
            .order_by_desc(orders::Column::CreatedAt)
            .paginate(&self.db, page.limit());

        let total = paginator.num_items().await?;
        let rows = paginator
            .fetch_page(u64::from(page.page.saturating_sub(1)))
            .await?;

        Ok(PageResponse::new(rows, page, total))
    }

    /// Runs the availability check when the plan will reserve or deduct.
    ///
    /// A shortfall aborts the save unless the caller allowed the override,
    /// in which case it is logged and stock may go negative.
    async fn guard_stock(
        txn: &DatabaseTransaction,
        plan: &TransitionPlan,
        document: &DocumentRef,
        items: &[LineItem],
        allow_shortfall: bool,
    ) -> Result<(), OrderError> {
        if !plan.contains(StockAction::Reserve) && !plan.contains(StockAction::Deduct) {
            return Ok(());
        }

        let report = StockLedger::check_availability(txn, items, Some(document)).await?;
        if report.is_satisfiable() {
            return Ok(());
        }
        if allow_shortfall {
            tracing::warn!(
                document = %document.number,
                shortfalls = report.shortfalls.len(),
                "shortfall override: saving order despite insufficient stock"
            );
            return Ok(());
        }
        Err(OrderError::InsufficientStock(report))
    }

    /// Inserts the order header.
    async fn insert_header(
        txn: &DatabaseTransaction,
        order_id: Uuid,
        input: &OrderInput,
    ) -> Result<orders::Model, OrderError> {
        let now = Utc::now().into();
        let order = orders::ActiveModel {
            id: Set(order_id),
            number: Set(input.number.clone()),
            customer_name: Set(input.customer_name.clone()),
            status: Set(db_enums::OrderStatus::from(input.status)),
            issued_on: Set(input.issued_on),
            notes: Set(input.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(order.insert(txn).await?)
    }

    /// Overwrites the order header from the submitted state.
    async fn update_header(
        txn: &DatabaseTransaction,
        order: orders::Model,
        input: &OrderInput,
    ) -> Result<orders::Model, OrderError> {
        let mut active: orders::ActiveModel = order.into();
        active.number = Set(input.number.clone());
        active.customer_name = Set(input.customer_name.clone());
        active.status = Set(db_enums::OrderStatus::from(input.status));
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
    ) -> Result<Vec<order_items::Model>, OrderError> {
        let now = Utc::now().into();
        let mut rows = Vec::with_capacity(inputs.len());
        for (input, item) in inputs.iter().zip(items) {
            let row = order_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
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
