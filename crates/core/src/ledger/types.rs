//! Ledger domain types for sales, payments, and derived records.
//!
//! A ledger entry is a sale or payment against a customer. Every sale owns
//! two derived sibling records: a production-cost entry and a transport
//! expense entry, both keyed back to the sale by `source_sale_id`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solera_shared::types::{CustomerId, EntryId};

/// The expense group tag carried by every derived transport record.
pub const TRANSPORT_EXPENSE_GROUP: &str = "Client Sale Transport";

/// Ledger entry kind: either a sale billed to a customer or a payment
/// received from one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A sale billed to the customer.
    Sale,
    /// A payment received from the customer.
    Payment,
}

impl EntryKind {
    /// Returns the wire/display label for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Payment => "payment",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted ledger entry.
///
/// `seq` and `created_at` are store-assigned; `seq` is monotonic across the
/// whole table and breaks ties between entries sharing a `transaction_date`
/// and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Opaque stable identifier, store-assigned.
    pub id: EntryId,
    /// Monotonic insertion sequence, store-assigned.
    pub seq: i64,
    /// The customer this entry belongs to.
    pub customer_id: CustomerId,
    /// Sale or payment.
    pub kind: EntryKind,
    /// Business date. Legacy imports may lack one; such entries are
    /// excluded from running balances.
    pub entry_date: Option<NaiveDate>,
    /// Amount billed (sale) or received (payment).
    pub amount: Decimal,
    /// Cases sold (sale only).
    pub quantity: Option<i32>,
    /// Product code (sale only).
    pub sku: Option<String>,
    /// Optional free text.
    pub description: Option<String>,
    /// Server-assigned insertion timestamp.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// The legacy natural composite key for this entry's derived siblings.
    ///
    /// No longer used for matching (siblings carry `source_sale_id`); kept
    /// as diagnostic context on warnings and log lines.
    #[must_use]
    pub fn sibling_key(&self) -> SiblingKey {
        SiblingKey {
            customer_id: self.customer_id,
            entry_date: self.entry_date,
            sku: self.sku.clone(),
        }
    }
}

/// A ledger entry about to be persisted; the store assigns `id`, `seq`, and
/// `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLedgerEntry {
    /// The customer this entry belongs to.
    pub customer_id: CustomerId,
    /// Sale or payment.
    pub kind: EntryKind,
    /// Business date.
    pub entry_date: Option<NaiveDate>,
    /// Amount billed or received.
    pub amount: Decimal,
    /// Cases sold (sale only).
    pub quantity: Option<i32>,
    /// Product code (sale only).
    pub sku: Option<String>,
    /// Optional free text.
    pub description: Option<String>,
}

/// Customer display data resolved from the customer table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    /// The customer ID.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Branch label.
    pub branch: String,
}

/// Input for creating a new sale.
///
/// `entry_date` is optional at the type level because form input arrives
/// loose; a missing date is a validation error, never a silent default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSaleInput {
    /// The customer being billed.
    pub customer_id: CustomerId,
    /// Product code.
    pub sku: String,
    /// Cases sold.
    pub quantity: i32,
    /// Amount billed.
    pub amount: Decimal,
    /// Business date of the sale.
    pub entry_date: Option<NaiveDate>,
    /// Optional free text.
    pub description: Option<String>,
}

/// Partial update for an existing sale. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSaleInput {
    /// New billed amount.
    pub amount: Option<Decimal>,
    /// New case count.
    pub quantity: Option<i32>,
    /// New product code.
    pub sku: Option<String>,
    /// New business date.
    pub entry_date: Option<NaiveDate>,
    /// New description.
    pub description: Option<String>,
}

impl UpdateSaleInput {
    /// True when the patch changes a field the production sibling derives
    /// from (sku, quantity, amount, or date).
    #[must_use]
    pub const fn touches_production(&self) -> bool {
        self.sku.is_some()
            || self.quantity.is_some()
            || self.amount.is_some()
            || self.entry_date.is_some()
    }

    /// Returns a copy of `entry` with this patch applied.
    #[must_use]
    pub fn applied_to(&self, entry: &LedgerEntry) -> LedgerEntry {
        LedgerEntry {
            amount: self.amount.unwrap_or(entry.amount),
            quantity: self.quantity.or(entry.quantity),
            sku: self.sku.clone().or_else(|| entry.sku.clone()),
            entry_date: self.entry_date.or(entry.entry_date),
            description: self.description.clone().or_else(|| entry.description.clone()),
            ..entry.clone()
        }
    }
}

/// Derived production-cost record for a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionEntry {
    /// The sale this record was derived from.
    pub source_sale_id: EntryId,
    /// Copied from the sale.
    pub customer_id: CustomerId,
    /// Copied from the sale.
    pub sku: String,
    /// Copied from the sale.
    pub quantity: i32,
    /// Copied from the sale.
    pub entry_date: NaiveDate,
    /// quantity x resolved unit production cost, clamped at zero.
    pub amount: Decimal,
    /// Customer display name. Debugging aid, not a key.
    pub description: String,
}

/// Derived transport expense record for a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportEntry {
    /// The sale this record was derived from.
    pub source_sale_id: EntryId,
    /// Copied from the sale's customer.
    pub client_id: CustomerId,
    /// Always [`TRANSPORT_EXPENSE_GROUP`].
    pub expense_group: String,
    /// Copied from the sale's date.
    pub expense_date: NaiveDate,
    /// Fixed at zero; logistics cost is not yet priced in this flow.
    pub amount: Decimal,
    /// `"<customer>-<branch> Transport"`.
    pub description: String,
}

/// The legacy natural composite key `(customer, date, sku)` once used to
/// locate a sale's derived siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiblingKey {
    /// Customer the sale belongs to.
    pub customer_id: CustomerId,
    /// Business date of the sale.
    pub entry_date: Option<NaiveDate>,
    /// Product code of the sale.
    pub sku: Option<String>,
}

impl std::fmt::Display for SiblingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "customer={} date={} sku={}",
            self.customer_id,
            self.entry_date
                .map_or_else(|| "-".to_string(), |d| d.to_string()),
            self.sku.as_deref().unwrap_or("-"),
        )
    }
}

/// Which derived sibling a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingKind {
    /// The production-cost record.
    Production,
    /// The transport expense record.
    Transport,
}

impl std::fmt::Display for SiblingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Production => "production",
            Self::Transport => "transport",
        })
    }
}

/// A sibling-sync anomaly on an otherwise-successful ledger mutation.
///
/// Warnings are logged and returned to the caller; they are never raised as
/// errors on the update/delete paths.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncWarning {
    /// The store call for a sibling record failed.
    #[error("{kind} record write failed: {detail}")]
    SiblingWriteFailed {
        /// Which sibling.
        kind: SiblingKind,
        /// Store failure detail.
        detail: String,
    },

    /// No sibling record was attached to the sale.
    #[error("no {kind} record found for sale {sale_id}")]
    SiblingMissing {
        /// Which sibling.
        kind: SiblingKind,
        /// The sale whose sibling is missing.
        sale_id: EntryId,
    },

    /// More than one sibling row carried the sale's id; all were affected.
    #[error("{affected} {kind} records matched one sale")]
    SiblingAmbiguous {
        /// Which sibling.
        kind: SiblingKind,
        /// Number of rows affected.
        affected: u64,
    },

    /// The production amount could not be re-derived, so the production
    /// record was left untouched.
    #[error("production record not repriced: {reason}")]
    ProductionSkipped {
        /// Why repricing failed.
        reason: String,
    },
}

/// Outcome of a ledger mutation: the primary entry plus any sibling-sync
/// warnings that were swallowed along the way.
#[derive(Debug, Clone)]
pub struct SyncResult {
    /// The entry that was created, updated, or deleted.
    pub entry: LedgerEntry,
    /// Sibling anomalies, empty on full success.
    pub warnings: Vec<SyncWarning>,
}

impl SyncResult {
    /// True when every derived record was kept in sync.
    #[must_use]
    pub fn fully_synced(&self) -> bool {
        self.warnings.is_empty()
    }
}
