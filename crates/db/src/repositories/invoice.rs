//! Invoice repository for customer invoice persistence and stock
//! transitions.
//!
//! Invoices have no reservation phase: entering the stock-affecting set
//! {Issued, Paid} deducts physical stock immediately, leaving it restores.
//! Moves inside the set (Issued ⇄ Paid) have no stock effect.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use lagera_core::document::{InvoiceStatus, StockAction, TransitionPlan, TransitionPolicy};
use lagera_core::stock::{AvailabilityReport, DocumentKind, DocumentRef, LineItem};
use lagera_shared::types::{PageRequest, PageResponse};

use crate::entities::sea_orm_active_enums as db_enums;
use crate::entities::{invoice_items, invoices};
use crate::repositories::stock::{
    same_stock_footprint, DocumentItemInput, StockError, StockLedger,
};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(Uuid),

    /// Invoice number already in use.
    #[error("Invoice number already exists: {0}")]
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
pub struct InvoiceInput {
    /// Human-readable document number; unique across invoices.
    pub number: String,
    /// Billed customer display name.
    pub customer_name: String,
    /// Target status.
    pub status: InvoiceStatus,
    /// Document date; stamps any movement entries the save records.
    pub issued_on: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Line items; replace the persisted rows wholesale.
    pub items: Vec<DocumentItemInput>,
    /// Proceed despite a shortfall, driving stock negative.
    pub allow_shortfall: bool,
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Filter by status.
    pub status: Option<InvoiceStatus>,
    /// Earliest document date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest document date, inclusive.
    pub date_to: Option<NaiveDate>,
}

/// Invoice header with its line items.
#[derive(Debug, Clone)]
pub struct InvoiceWithItems {
    /// Invoice header.
    pub invoice: invoices::Model,
    /// Line items.
    pub items: Vec<invoice_items::Model>,
}

/// Invoice repository handling persistence and stock side effects.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an invoice, applying its status's stock effects atomically.
    ///
    /// Saving directly as `Issued` or `Paid` deducts stock in the same
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The invoice number is already in use
    /// - A line references an unknown product or a non-positive quantity
    /// - Stock is insufficient and `allow_shortfall` is false
    /// - Database operation fails
    pub async fn create(&self, input: InvoiceInput) -> Result<InvoiceWithItems, InvoiceError> {
        let existing = invoices::Entity::find()
            .filter(invoices::Column::Number.eq(input.number.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(InvoiceError::DuplicateNumber(input.number));
        }

        let txn = self.db.begin().await?;

        let invoice_id = Uuid::new_v4();
        let document = DocumentRef::new(DocumentKind::Invoice, invoice_id, input.number.clone());
        let plan = TransitionPolicy::invoice_save(None, input.status, true);

        let items = StockLedger::resolve_items(&txn, &input.items).await?;
        Self::guard_stock(&txn, &plan, &document, &items, input.allow_shortfall).await?;
        StockLedger::apply_plan(&txn, &plan, &document, &items, input.issued_on).await?;

        let invoice = Self::insert_header(&txn, invoice_id, &input).await?;
        let rows = Self::insert_items(&txn, invoice_id, &input.items, &items).await?;

        txn.commit().await?;

        Ok(InvoiceWithItems {
            invoice,
            items: rows,
        })
    }

    /// Updates an invoice, translating the status change into ledger
    /// actions.
    ///
    /// Detail rows are replaced wholesale. `Issued → Paid` and back touch
    /// no stock; editing the items of an issued invoice restores the old
    /// deduction and deducts the new quantities.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The invoice is not found
    /// - The new number clashes with another invoice
    /// - A line references an unknown product or a non-positive quantity
    /// - Stock is insufficient and `allow_shortfall` is false
    /// - Database operation fails
    pub async fn update(
        &self,
        invoice_id: Uuid,
        input: InvoiceInput,
    ) -> Result<InvoiceWithItems, InvoiceError> {
        let invoice = invoices::Entity::find_by_id(invoice_id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(invoice_id))?;

        if input.number != invoice.number {
            let clash = invoices::Entity::find()
                .filter(invoices::Column::Number.eq(input.number.clone()))
                .one(&self.db)
                .await?;
            if clash.is_some() {
                return Err(InvoiceError::DuplicateNumber(input.number));
            }
        }

        let old_items = invoice_items::Entity::find()
            .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
            .all(&self.db)
            .await?;

        let txn = self.db.begin().await?;

        let mut affected: Vec<Uuid> = old_items.iter().map(|row| row.product_id).collect();
        affected.extend(input.items.iter().map(|item| item.product_id));
        StockLedger::lock_products(&txn, &affected).await?;

        StockLedger::retag_document(&txn, DocumentKind::Invoice, &invoice.number, &input.number)
            .await?;

        let document = DocumentRef::new(DocumentKind::Invoice, invoice_id, input.number.clone());
        let items = StockLedger::resolve_items(&txn, &input.items).await?;
        let old_footprint: Vec<LineItem> = old_items
            .iter()
            .map(|row| LineItem::new(row.product_id, row.product_name.clone(), row.quantity))
            .collect();
        let items_changed = !same_stock_footprint(&old_footprint, &items);

        let old_status = InvoiceStatus::from(invoice.status.clone());
        let plan = TransitionPolicy::invoice_save(Some(old_status), input.status, items_changed);

        Self::guard_stock(&txn, &plan, &document, &items, input.allow_shortfall).await?;
        StockLedger::apply_plan(&txn, &plan, &document, &items, input.issued_on).await?;

        let updated = Self::update_header(&txn, invoice, &input).await?;
        invoice_items::Entity::delete_many()
            .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
            .exec(&txn)
            .await?;
        let rows = Self::insert_items(&txn, invoice_id, &input.items, &items).await?;

        txn.commit().await?;

        Ok(InvoiceWithItems {
            invoice: updated,
            items: rows,
        })
    }

    /// Deletes an invoice, restoring its recorded deduction if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is not found or a database operation
    /// fails.
    pub async fn delete(&self, invoice_id: Uuid) -> Result<(), InvoiceError> {
        let invoice = invoices::Entity::find_by_id(invoice_id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(invoice_id))?;

        let old_items = invoice_items::Entity::find()
            .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
            .all(&self.db)
            .await?;

        let txn = self.db.begin().await?;

        let affected: Vec<Uuid> = old_items.iter().map(|row| row.product_id).collect();
        StockLedger::lock_products(&txn, &affected).await?;

        let document = DocumentRef::new(DocumentKind::Invoice, invoice.id, invoice.number.clone());
        let plan = TransitionPolicy::invoice_delete(InvoiceStatus::from(invoice.status.clone()));
        StockLedger::apply_plan(&txn, &plan, &document, &[], invoice.issued_on).await?;
        StockLedger::remove_reservations(&txn, &document).await?;

        invoices::Entity::delete_by_id(invoice_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Gets an invoice by id with its line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is not found or the query fails.
    pub async fn get(&self, invoice_id: Uuid) -> Result<InvoiceWithItems, InvoiceError> {
        let invoice = invoices::Entity::find_by_id(invoice_id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(invoice_id))?;

        let items = invoice_items::Entity::find()
            .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(invoice_items::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(InvoiceWithItems { invoice, items })
    }

    /// Lists invoices, newest document date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        filter: InvoiceFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<invoices::Model>, InvoiceError> {
        let mut query = invoices::Entity::find();

        if let Some(status) = filter.status {
            query =
                query.filter(invoices::Column::Status.eq(db_enums::InvoiceStatus::from(status)));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(invoices::Column::IssuedOn.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(invoices::Column::IssuedOn.lte(date_to));
        }

        let paginator = query
            .order_by_desc(invoices::Column::IssuedOn)
            .order_by_desc(invoices::Column::CreatedAt)
            .paginate(&self.db, page.limit());

        let total = paginator.num_items().await?;
        let rows = paginator
            .fetch_page(u64::from(page.page.saturating_sub(1)))
            .await?;

        Ok(PageResponse::new(rows, page, total))
    }

    /// Runs the availability check when the plan will deduct.
    ///
    /// A shortfall aborts the save unless the caller allowed the override,
    /// in which case it is logged and stock may go negative.
    async fn guard_stock(
        txn: &DatabaseTransaction,
        plan: &TransitionPlan,
        document: &DocumentRef,
        items: &[LineItem],
        allow_shortfall: bool,
    ) -> Result<(), InvoiceError> {
        if !plan.contains(StockAction::Deduct) {
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
                "shortfall override: saving invoice despite insufficient stock"
            );
            return Ok(());
        }
        Err(InvoiceError::InsufficientStock(report))
    }

    /// Inserts the invoice header.
    async fn insert_header(
        txn: &DatabaseTransaction,
        invoice_id: Uuid,
        input: &InvoiceInput,
    ) -> Result<invoices::Model, InvoiceError> {
        let now = Utc::now().into();
        let invoice = invoices::ActiveModel {
            id: Set(invoice_id),
            number: Set(input.number.clone()),
            customer_name: Set(input.customer_name.clone()),
            status: Set(db_enums::InvoiceStatus::from(input.status)),
            issued_on: Set(input.issued_on),
            notes: Set(input.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(invoice.insert(txn).await?)
    }

    /// Overwrites the invoice header from the submitted state.
    async fn update_header(
        txn: &DatabaseTransaction,
        invoice: invoices::Model,
        input: &InvoiceInput,
    ) -> Result<invoices::Model, InvoiceError> {
        let mut active: invoices::ActiveModel = invoice.into();
        active.number = Set(input.number.clone());
        active.customer_name = Set(input.customer_name.clone());
        active.status = Set(db_enums::InvoiceStatus::from(input.status));
        active.issued_on = Set(input.issued_on);
        active.notes = Set(input.notes.clone());
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(txn).await?)
    }

    /// Inserts one detail row per input line, names resolved server-side.
    async fn insert_items(
        txn: &DatabaseTransaction,
        invoice_id: Uuid,
        inputs: &[DocumentItemInput],
        items: &[LineItem],
    ) -> Result<Vec<invoice_items::Model>, InvoiceError> {
        let now = Utc::now().into();
        let mut rows = Vec::with_capacity(inputs.len());
        for (input, item) in inputs.iter().zip(items) {
            let row = invoice_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                invoice_id: Set(invoice_id),
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
