//! Store ports consumed by the sales ledger.
//!
//! The remote store offers single-record atomicity only; nothing here may
//! assume a cross-call transaction. The db crate provides the production
//! implementation; tests exercise the service against mocks and an
//! in-memory store.

use async_trait::async_trait;
use solera_shared::types::{CustomerId, EntryId};
use thiserror::Error;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::pricing::PricingQuote;
use super::types::{
    CustomerRef, LedgerEntry, NewLedgerEntry, ProductionEntry, TransportEntry, UpdateSaleInput,
};

/// A failed store call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store rejected the write (constraint violation, schema mismatch).
    #[error("store rejected the write: {0}")]
    Rejected(String),

    /// The store could not be reached or failed mid-call.
    #[error("store request failed: {0}")]
    Backend(String),
}

/// Partial update for a production record. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductionPatch {
    /// New product code.
    pub sku: Option<String>,
    /// New case count.
    pub quantity: Option<i32>,
    /// New business date.
    pub entry_date: Option<NaiveDate>,
    /// Re-derived production amount.
    pub amount: Option<Decimal>,
}

/// Partial update for a transport record. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportPatch {
    /// New expense date.
    pub expense_date: Option<NaiveDate>,
    /// New description.
    pub description: Option<String>,
}

/// Port to the ledger record store.
///
/// Sibling mutations return the number of rows affected so the caller can
/// distinguish a missing sibling (0) from a corrupt duplicate (>1).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Inserts a ledger entry; the store assigns id, seq, and created_at.
    async fn insert_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, StoreError>;

    /// Applies a patch to a ledger entry.
    async fn update_entry(&self, id: EntryId, patch: UpdateSaleInput) -> Result<(), StoreError>;

    /// Physically deletes a ledger entry.
    async fn delete_entry(&self, id: EntryId) -> Result<(), StoreError>;

    /// Fetches one ledger entry by id.
    async fn entry(&self, id: EntryId) -> Result<Option<LedgerEntry>, StoreError>;

    /// Fetches ledger entries, optionally restricted to one customer.
    async fn entries(&self, customer: Option<CustomerId>) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Resolves one customer.
    async fn customer(&self, id: CustomerId) -> Result<Option<CustomerRef>, StoreError>;

    /// Resolves a batch of customers; unknown ids are simply absent.
    async fn customers(&self, ids: &[CustomerId]) -> Result<Vec<CustomerRef>, StoreError>;

    /// Inserts a derived production record.
    async fn insert_production(&self, entry: ProductionEntry) -> Result<(), StoreError>;

    /// Patches the production record(s) attached to a sale.
    async fn update_production(
        &self,
        sale_id: EntryId,
        patch: ProductionPatch,
    ) -> Result<u64, StoreError>;

    /// Deletes the production record(s) attached to a sale.
    async fn delete_production(&self, sale_id: EntryId) -> Result<u64, StoreError>;

    /// Inserts a derived transport record.
    async fn insert_transport(&self, entry: TransportEntry) -> Result<(), StoreError>;

    /// Patches the transport record(s) attached to a sale.
    async fn update_transport(
        &self,
        sale_id: EntryId,
        patch: TransportPatch,
    ) -> Result<u64, StoreError>;

    /// Deletes the transport record(s) attached to a sale.
    async fn delete_transport(&self, sale_id: EntryId) -> Result<u64, StoreError>;
}

/// Port to the pricing table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PricingStore: Send + Sync {
    /// Returns the most recently dated quote for a SKU, if any.
    ///
    /// Recency is by quote date at query time; the sale's own date is not
    /// consulted.
    async fn latest_quote(&self, sku: &str) -> Result<Option<PricingQuote>, StoreError>;
}
