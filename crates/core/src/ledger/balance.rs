//! Running balance calculations.
//!
//! A customer's outstanding balance is never stored; it is reconstructed
//! from the full transaction history on every read. Sales add to the
//! balance, payments subtract, walked in chronological order
//! `(transaction_date, created_at, seq)`.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use solera_shared::types::{CustomerId, EntryId};
use tracing::warn;

use super::types::{EntryKind, LedgerEntry};

/// A ledger entry annotated with the customer's outstanding balance as of
/// (and including) that entry.
///
/// `outstanding` is `None` for entries without a usable transaction date;
/// they are excluded from the running sum rather than aborting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedEntry {
    /// The underlying ledger entry.
    pub entry: LedgerEntry,
    /// Cumulative sales minus payments up to and including this entry.
    pub outstanding: Option<Decimal>,
}

/// Annotates a possibly-unsorted, possibly multi-customer collection with
/// running outstanding balances.
///
/// Each customer's history is computed exactly once per call, however many
/// of that customer's rows are present; the visible window may span
/// thousands of rows, so per-row recomputation is not acceptable. Output
/// preserves input order.
#[must_use]
pub fn annotate(entries: &[LedgerEntry]) -> Vec<AnnotatedEntry> {
    let mut by_customer: HashMap<CustomerId, Vec<&LedgerEntry>> = HashMap::new();
    for entry in entries {
        by_customer.entry(entry.customer_id).or_default().push(entry);
    }

    let mut outstanding: HashMap<EntryId, Decimal> = HashMap::with_capacity(entries.len());
    for history in by_customer.into_values() {
        let mut dated: Vec<&LedgerEntry> = Vec::with_capacity(history.len());
        for entry in history {
            if entry.entry_date.is_some() {
                dated.push(entry);
            } else {
                warn!(
                    entry_id = %entry.id,
                    "ledger entry has no transaction date; excluded from running balance"
                );
            }
        }
        dated.sort_by_key(|e| chronological_key(e));

        let mut running = Decimal::ZERO;
        for entry in dated {
            // Round at every step, not just at the end: display and export
            // show each intermediate balance, so drift has to be pinned
            // per row.
            running = (running + signed_amount(entry))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            outstanding.insert(entry.id, running);
        }
    }

    entries
        .iter()
        .map(|entry| AnnotatedEntry {
            entry: entry.clone(),
            outstanding: outstanding.get(&entry.id).copied(),
        })
        .collect()
}

/// Answers "what is the outstanding as of entry `id`" against a snapshot.
///
/// Recomputing from the same snapshot always yields the same value.
#[must_use]
pub fn outstanding_as_of(entries: &[LedgerEntry], id: EntryId) -> Option<Decimal> {
    annotate(entries)
        .into_iter()
        .find(|a| a.entry.id == id)
        .and_then(|a| a.outstanding)
}

/// Canonical chronological sort key for a dated entry.
///
/// `seq` is the store's monotonic insertion sequence; it replaces any
/// comparison of opaque ids for same-instant ordering.
fn chronological_key(entry: &LedgerEntry) -> (NaiveDate, DateTime<Utc>, i64) {
    (
        entry.entry_date.unwrap_or(NaiveDate::MIN),
        entry.created_at,
        entry.seq,
    )
}

fn signed_amount(entry: &LedgerEntry) -> Decimal {
    match entry.kind {
        EntryKind::Sale => entry.amount,
        EntryKind::Payment => -entry.amount,
    }
}
