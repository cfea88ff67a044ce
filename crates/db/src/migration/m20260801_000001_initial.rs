//! Initial database migration.
//!
//! Creates the customer, ledger, derived-record, and pricing tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: CUSTOMERS
        // ============================================================
        db.execute_unprepared(CUSTOMERS_SQL).await?;

        // ============================================================
        // PART 2: SALES LEDGER
        // ============================================================
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        // ============================================================
        // PART 3: DERIVED RECORDS
        // ============================================================
        db.execute_unprepared(PRODUCTION_ENTRIES_SQL).await?;
        db.execute_unprepared(TRANSPORT_ENTRIES_SQL).await?;

        // ============================================================
        // PART 4: PRICING
        // ============================================================
        db.execute_unprepared(PRICING_QUOTES_SQL).await?;

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

const CUSTOMERS_SQL: &str = r"
CREATE TABLE customers (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    branch VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const LEDGER_ENTRIES_SQL: &str = r"
-- seq is both the primary key and the monotonic tie-break for entries
-- sharing a transaction_date; id is the opaque public identifier.
-- transaction_date is nullable: legacy imports without a usable date stay
-- out of the running balance but must remain storable.
CREATE TABLE ledger_entries (
    seq BIGSERIAL PRIMARY KEY,
    id UUID NOT NULL UNIQUE,
    customer_id UUID NOT NULL REFERENCES customers(id),
    kind VARCHAR(16) NOT NULL CHECK (kind IN ('sale', 'payment')),
    transaction_date DATE,
    amount NUMERIC(14, 2) NOT NULL CHECK (amount >= 0),
    quantity INTEGER,
    sku VARCHAR(64),
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_ledger_entries_customer
    ON ledger_entries (customer_id, transaction_date, created_at);
";

const PRODUCTION_ENTRIES_SQL: &str = r"
-- source_sale_id links back to ledger_entries.id with no referential
-- constraint: sibling sync is application-owned and drift (a sale whose
-- sibling write failed) must remain representable.
CREATE TABLE production_entries (
    id UUID PRIMARY KEY,
    source_sale_id UUID NOT NULL,
    customer_id UUID NOT NULL,
    sku VARCHAR(64) NOT NULL,
    quantity INTEGER NOT NULL,
    transaction_date DATE NOT NULL,
    amount NUMERIC(14, 2) NOT NULL CHECK (amount >= 0),
    description VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_production_entries_source ON production_entries (source_sale_id);
";

const TRANSPORT_ENTRIES_SQL: &str = r"
CREATE TABLE transport_entries (
    id UUID PRIMARY KEY,
    source_sale_id UUID NOT NULL,
    client_id UUID NOT NULL,
    expense_group VARCHAR(64) NOT NULL,
    expense_date DATE NOT NULL,
    amount NUMERIC(14, 2) NOT NULL CHECK (amount >= 0),
    description VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_transport_entries_source ON transport_entries (source_sale_id);
";

const PRICING_QUOTES_SQL: &str = r"
CREATE TABLE pricing_quotes (
    id UUID PRIMARY KEY,
    sku VARCHAR(64) NOT NULL,
    cost_per_case NUMERIC(14, 4) NOT NULL,
    quoted_on DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_pricing_quotes_sku_date ON pricing_quotes (sku, quoted_on DESC);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS pricing_quotes CASCADE;
DROP TABLE IF EXISTS transport_entries CASCADE;
DROP TABLE IF EXISTS production_entries CASCADE;
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS customers CASCADE;
";
