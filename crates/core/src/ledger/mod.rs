//! Sales ledger logic.
//!
//! This module implements the core ledger functionality:
//! - Ledger entries (sales and payments) and their derived sibling records
//! - Pricing resolution for production cost
//! - Sale resolution and validation
//! - The sales-ledger service keeping derived records in sync
//! - Running balance calculations
//! - The filter/sort/paginate pipeline for annotated rows
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod pipeline;
pub mod pricing;
pub mod resolve;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod balance_props;

pub use balance::{AnnotatedEntry, annotate, outstanding_as_of};
pub use error::LedgerError;
pub use pipeline::{ColumnFilters, ColumnSort, LedgerQuery, LedgerRow, SortColumn, SortDirection};
pub use pricing::PricingQuote;
pub use resolve::{ResolvedSale, resolve_sale};
pub use service::SalesLedger;
pub use store::{LedgerStore, PricingStore, ProductionPatch, StoreError, TransportPatch};
pub use types::{
    CreateSaleInput, CustomerRef, EntryKind, LedgerEntry, NewLedgerEntry, ProductionEntry,
    SiblingKey, SiblingKind, SyncResult, SyncWarning, TRANSPORT_EXPENSE_GROUP, TransportEntry,
    UpdateSaleInput,
};
