//! Initial database migration.
//!
//! Creates the enums and tables for the product catalog, the three document
//! kinds with their line items, and the stock ledger (reservations and
//! movements). No triggers, functions or views: the repositories maintain
//! every ledger aggregate explicitly inside transactions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: PRODUCT CATALOG
        // ============================================================
        db.execute_unprepared(PRODUCTS_SQL).await?;

        // ============================================================
        // PART 3: DOCUMENTS
        // ============================================================
        db.execute_unprepared(ORDERS_SQL).await?;
        db.execute_unprepared(ORDER_ITEMS_SQL).await?;
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_ITEMS_SQL).await?;
        db.execute_unprepared(SUPPLIER_ORDERS_SQL).await?;
        db.execute_unprepared(SUPPLIER_ORDER_ITEMS_SQL).await?;

        // ============================================================
        // PART 4: STOCK LEDGER
        // ============================================================
        db.execute_unprepared(STOCK_RESERVATIONS_SQL).await?;
        db.execute_unprepared(STOCK_MOVEMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Documents that drive stock effects
CREATE TYPE document_type AS ENUM (
    'order',
    'invoice',
    'supplier_order'
);

-- Reservation lifecycle
CREATE TYPE reservation_status AS ENUM (
    'active',
    'cancelled',
    'completed'
);

-- Movement direction
CREATE TYPE movement_direction AS ENUM ('inward', 'outward');

-- Movement reason
CREATE TYPE movement_reason AS ENUM (
    'purchase',
    'sale',
    'return',
    'inventory',
    'correction'
);

-- Order status
CREATE TYPE order_status AS ENUM (
    'new',
    'in_progress',
    'completed',
    'cancelled'
);

-- Invoice status
CREATE TYPE invoice_status AS ENUM (
    'draft',
    'issued',
    'paid',
    'canceled'
);

-- Supplier order status
CREATE TYPE supplier_order_status AS ENUM (
    'draft',
    'confirmed',
    'in_transit',
    'completed',
    'cancelled'
);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    sku VARCHAR(64) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL DEFAULT 0,
    -- physical_quantity may go negative after an explicit shortfall override
    physical_quantity BIGINT NOT NULL DEFAULT 0,
    reserved_quantity BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_reserved_not_negative CHECK (reserved_quantity >= 0)
);

CREATE INDEX idx_products_name ON products(name);
";

const ORDERS_SQL: &str = r"
CREATE TABLE orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    number VARCHAR(100) NOT NULL UNIQUE,
    customer_name VARCHAR(255) NOT NULL,
    status order_status NOT NULL DEFAULT 'new',
    issued_on DATE NOT NULL,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_orders_status ON orders(status);
CREATE INDEX idx_orders_issued_on ON orders(issued_on);
";

const ORDER_ITEMS_SQL: &str = r"
CREATE TABLE order_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    product_id UUID NOT NULL REFERENCES products(id),
    product_name VARCHAR(255) NOT NULL,
    quantity BIGINT NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_order_item_quantity CHECK (quantity > 0)
);

CREATE INDEX idx_order_items_order ON order_items(order_id);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    number VARCHAR(100) NOT NULL UNIQUE,
    customer_name VARCHAR(255) NOT NULL,
    status invoice_status NOT NULL DEFAULT 'draft',
    issued_on DATE NOT NULL,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_invoices_status ON invoices(status);
CREATE INDEX idx_invoices_issued_on ON invoices(issued_on);
";

const INVOICE_ITEMS_SQL: &str = r"
CREATE TABLE invoice_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    product_id UUID NOT NULL REFERENCES products(id),
    product_name VARCHAR(255) NOT NULL,
    quantity BIGINT NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_invoice_item_quantity CHECK (quantity > 0)
);

CREATE INDEX idx_invoice_items_invoice ON invoice_items(invoice_id);
";

const SUPPLIER_ORDERS_SQL: &str = r"
CREATE TABLE supplier_orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    number VARCHAR(100) NOT NULL UNIQUE,
    supplier_name VARCHAR(255) NOT NULL,
    status supplier_order_status NOT NULL DEFAULT 'draft',
    issued_on DATE NOT NULL,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_supplier_orders_status ON supplier_orders(status);
CREATE INDEX idx_supplier_orders_issued_on ON supplier_orders(issued_on);
";

const SUPPLIER_ORDER_ITEMS_SQL: &str = r"
CREATE TABLE supplier_order_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    supplier_order_id UUID NOT NULL REFERENCES supplier_orders(id) ON DELETE CASCADE,
    product_id UUID NOT NULL REFERENCES products(id),
    product_name VARCHAR(255) NOT NULL,
    quantity BIGINT NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_supplier_order_item_quantity CHECK (quantity > 0)
);

CREATE INDEX idx_supplier_order_items_order ON supplier_order_items(supplier_order_id);
";

const STOCK_RESERVATIONS_SQL: &str = r"
CREATE TABLE stock_reservations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    product_id UUID NOT NULL REFERENCES products(id),
    document_type document_type NOT NULL,
    document_id UUID NOT NULL,
    reserved_quantity BIGINT NOT NULL,
    status reservation_status NOT NULL DEFAULT 'active',
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_reservation_quantity CHECK (reserved_quantity > 0),
    UNIQUE (product_id, document_type, document_id)
);

CREATE INDEX idx_stock_reservations_document ON stock_reservations(document_type, document_id);
CREATE INDEX idx_stock_reservations_active ON stock_reservations(product_id) WHERE status = 'active';
";

const STOCK_MOVEMENTS_SQL: &str = r"
CREATE TABLE stock_movements (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    product_id UUID NOT NULL REFERENCES products(id),
    moved_on DATE NOT NULL,
    direction movement_direction NOT NULL,
    quantity BIGINT NOT NULL,
    reason movement_reason NOT NULL,
    document_type document_type,
    document_number VARCHAR(100),
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_movement_quantity CHECK (quantity > 0)
);

CREATE INDEX idx_stock_movements_product ON stock_movements(product_id, created_at);
CREATE INDEX idx_stock_movements_document ON stock_movements(document_type, document_number)
    WHERE document_number IS NOT NULL;
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS stock_movements CASCADE;
DROP TABLE IF EXISTS stock_reservations CASCADE;
DROP TABLE IF EXISTS supplier_order_items CASCADE;
DROP TABLE IF EXISTS supplier_orders CASCADE;
DROP TABLE IF EXISTS invoice_items CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS order_items CASCADE;
DROP TABLE IF EXISTS orders CASCADE;
DROP TABLE IF EXISTS products CASCADE;

-- Drop enums
DROP TYPE IF EXISTS supplier_order_status;
DROP TYPE IF EXISTS invoice_status;
DROP TYPE IF EXISTS order_status;
DROP TYPE IF EXISTS movement_reason;
DROP TYPE IF EXISTS movement_direction;
DROP TYPE IF EXISTS reservation_status;
DROP TYPE IF EXISTS document_type;
";
