//! Product repository for catalog and stock display queries.
//!
//! Products carry the two persisted stock counters. They are written here
//! only at creation time (opening stock); afterwards every quantity change
//! goes through the stock ledger.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use lagera_shared::types::{PageRequest, PageResponse};

use crate::entities::sea_orm_active_enums::{MovementDirection, MovementReason};
use crate::entities::{products, stock_movements};

/// Error types for product operations.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    /// Product not found.
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    /// SKU already in use.
    #[error("SKU already exists: {0}")]
    DuplicateSku(String),

    /// Opening stock must not be negative.
    #[error("Opening stock must not be negative, got {0}")]
    NegativeOpeningStock(i64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Stock keeping unit; unique.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub unit_price: Decimal,
    /// Opening physical stock. Logged as an INVENTORY movement when
    /// non-zero.
    pub initial_quantity: i64,
}

/// Product repository for catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
}

impl ProductRepository {
    /// Creates a new product repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a product with its opening stock.
    ///
    /// A non-zero opening quantity is recorded as an INWARD movement with
    /// reason INVENTORY, so the movement log accounts for every unit from
    /// day one.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The SKU is already in use
    /// - The opening quantity is negative
    /// - Database operation fails
    pub async fn create(&self, input: CreateProductInput) -> Result<products::Model, ProductError> {
        if input.initial_quantity < 0 {
            return Err(ProductError::NegativeOpeningStock(input.initial_quantity));
        }

        let existing = products::Entity::find()
            .filter(products::Column::Sku.eq(input.sku.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(ProductError::DuplicateSku(input.sku));
        }

        let txn = self.db.begin().await?;

        let now = Utc::now();
        let product = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(input.sku),
            name: Set(input.name),
            unit_price: Set(input.unit_price),
            physical_quantity: Set(input.initial_quantity),
            reserved_quantity: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        if input.initial_quantity != 0 {
            stock_movements::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(product.id),
                moved_on: Set(now.date_naive()),
                direction: Set(MovementDirection::Inward),
                quantity: Set(input.initial_quantity),
                reason: Set(MovementReason::Inventory),
                document_type: Set(None),
                document_number: Set(None),
                notes: Set(Some("Opening stock".to_string())),
                created_at: Set(now.into()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(product)
    }

    /// Gets a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the query fails.
    pub async fn get(&self, product_id: Uuid) -> Result<products::Model, ProductError> {
        products::Entity::find_by_id(product_id)
            .one(&self.db)
            .await?
            .ok_or(ProductError::NotFound(product_id))
    }

    /// Lists products ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        page: &PageRequest,
    ) -> Result<PageResponse<products::Model>, ProductError> {
        let paginator = products::Entity::find()
            .order_by_asc(products::Column::Name)
            .paginate(&self.db, page.limit());

        let total = paginator.num_items().await?;
        let rows = paginator
            .fetch_page(u64::from(page.page.saturating_sub(1)))
            .await?;

        Ok(PageResponse::new(rows, page, total))
    }

    /// Lists a product's movement log, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the query fails.
    pub async fn list_movements(
        &self,
        product_id: Uuid,
        page: &PageRequest,
    ) -> Result<PageResponse<stock_movements::Model>, ProductError> {
        // Unknown ids are NotFound, not an empty page.
        self.get(product_id).await?;

        let paginator = stock_movements::Entity::find()
            .filter(stock_movements::Column::ProductId.eq(product_id))
            .order_by_desc(stock_movements::Column::CreatedAt)
            .paginate(&self.db, page.limit());

        let total = paginator.num_items().await?;
        let rows = paginator
            .fetch_page(u64::from(page.page.saturating_sub(1)))
            .await?;

        Ok(PageResponse::new(rows, page, total))
    }
}
