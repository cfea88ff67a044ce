//! Sales ledger service.
//!
//! Keeps the derived production and transport records consistent with their
//! originating sale across create, update, and delete, and serves the
//! balance-annotated listing the console screens read.
//!
//! The store offers no cross-record transaction, so creation runs as a saga:
//! each record is written serially and a failure triggers compensating
//! deletes of whatever was already written. Update and delete keep the
//! legacy asymmetry instead: the primary ledger mutation decides the call's
//! outcome, while sibling failures are logged and returned as warnings.

use std::collections::HashMap;

use solera_shared::types::{CustomerId, EntryId};
use tracing::{error, warn};

use solera_shared::types::pagination::PageResponse;

use super::balance;
use super::error::LedgerError;
use super::pipeline::{self, LedgerQuery, LedgerRow};
use super::pricing;
use super::resolve::{resolve_sale, validate_patch};
use super::store::{LedgerStore, PricingStore, ProductionPatch, StoreError, TransportPatch};
use super::types::{
    CreateSaleInput, EntryKind, LedgerEntry, SiblingKind, SyncResult, SyncWarning, UpdateSaleInput,
};

/// The sales-ledger service.
///
/// Generic over its store ports so the db crate can plug in the Postgres
/// implementation and tests can plug in mocks.
pub struct SalesLedger<S, P> {
    store: S,
    pricing: P,
}

impl<S: LedgerStore, P: PricingStore> SalesLedger<S, P> {
    /// Creates a new service over the given store ports.
    pub const fn new(store: S, pricing: P) -> Self {
        Self { store, pricing }
    }

    /// Creates a sale together with its production and transport records.
    ///
    /// All validation (date, SKU, amounts, pricing fallback) happens before
    /// the first write. A sibling insert failure rolls the earlier writes
    /// back with compensating deletes and surfaces the original store
    /// error. A timed-out call has unknown outcome; the caller owns retry
    /// policy.
    ///
    /// # Errors
    ///
    /// Validation errors before any write; [`LedgerError::Store`] when a
    /// store call fails.
    pub async fn create_sale(&self, input: CreateSaleInput) -> Result<SyncResult, LedgerError> {
        let customer = self
            .store
            .customer(input.customer_id)
            .await?
            .ok_or(LedgerError::CustomerNotFound(input.customer_id))?;
        let quote = self.pricing.latest_quote(&input.sku).await?;
        let resolved = resolve_sale(&input, quote)?;

        let entry = self.store.insert_entry(resolved.entry.clone()).await?;

        if let Err(err) = self
            .store
            .insert_production(resolved.production_entry(entry.id, &customer))
            .await
        {
            self.compensate_entry(entry.id).await;
            return Err(err.into());
        }

        if let Err(err) = self
            .store
            .insert_transport(resolved.transport_entry(entry.id, &customer))
            .await
        {
            self.compensate_production(entry.id).await;
            self.compensate_entry(entry.id).await;
            return Err(err.into());
        }

        Ok(SyncResult {
            entry,
            warnings: Vec::new(),
        })
    }

    /// Updates a sale and, best-effort, its derived records.
    ///
    /// The ledger update decides the outcome. Sibling failures degrade to
    /// [`SyncWarning`]s: they are logged, returned, and never fail the call.
    ///
    /// # Errors
    ///
    /// [`LedgerError::EntryNotFound`] / [`LedgerError::NotASale`] for a bad
    /// target, validation errors for out-of-range patch values, and
    /// [`LedgerError::Store`] only when the primary update fails.
    pub async fn update_sale(
        &self,
        id: EntryId,
        patch: UpdateSaleInput,
    ) -> Result<SyncResult, LedgerError> {
        let before = self
            .store
            .entry(id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;
        if before.kind != EntryKind::Sale {
            return Err(LedgerError::NotASale(id));
        }
        validate_patch(&patch)?;

        self.store.update_entry(id, patch.clone()).await?;
        let after = patch.applied_to(&before);

        let mut warnings = Vec::new();

        if patch.touches_production() {
            match self.reprice(&after).await {
                Ok(amount) => {
                    let sibling = ProductionPatch {
                        sku: patch.sku.clone(),
                        quantity: patch.quantity,
                        entry_date: patch.entry_date,
                        amount: Some(amount),
                    };
                    record_sibling_outcome(
                        SiblingKind::Production,
                        id,
                        self.store.update_production(id, sibling).await,
                        &mut warnings,
                    );
                }
                Err(err) => warnings.push(SyncWarning::ProductionSkipped {
                    reason: err.to_string(),
                }),
            }
        }

        if patch.entry_date.is_some() {
            let sibling = TransportPatch {
                expense_date: patch.entry_date,
                description: None,
            };
            record_sibling_outcome(
                SiblingKind::Transport,
                id,
                self.store.update_transport(id, sibling).await,
                &mut warnings,
            );
        }

        for warning in &warnings {
            warn!(
                sale_id = %id,
                key = %after.sibling_key(),
                %warning,
                "derived ledger record out of sync after update"
            );
        }

        Ok(SyncResult {
            entry: after,
            warnings,
        })
    }

    /// Deletes a ledger entry and, for sales, its derived records.
    ///
    /// Sibling deletes are best-effort and reported as warnings; only the
    /// final delete of the entry itself can fail the call.
    ///
    /// # Errors
    ///
    /// [`LedgerError::EntryNotFound`] for an unknown id;
    /// [`LedgerError::Store`] when the entry delete fails.
    pub async fn delete_transaction(&self, id: EntryId) -> Result<SyncResult, LedgerError> {
        let entry = self
            .store
            .entry(id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;

        let mut warnings = Vec::new();
        if entry.kind == EntryKind::Sale {
            record_sibling_outcome(
                SiblingKind::Production,
                id,
                self.store.delete_production(id).await,
                &mut warnings,
            );
            record_sibling_outcome(
                SiblingKind::Transport,
                id,
                self.store.delete_transport(id).await,
                &mut warnings,
            );
        }

        self.store.delete_entry(id).await?;

        for warning in &warnings {
            warn!(
                sale_id = %id,
                key = %entry.sibling_key(),
                %warning,
                "derived ledger record left behind by delete"
            );
        }

        Ok(SyncResult { entry, warnings })
    }

    /// Lists ledger entries annotated with each customer's running
    /// outstanding balance, joined with customer display data.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] when a store query fails.
    pub async fn list_with_balances(
        &self,
        customer: Option<CustomerId>,
    ) -> Result<Vec<LedgerRow>, LedgerError> {
        let entries = self.store.entries(customer).await?;
        let annotated = balance::annotate(&entries);

        let mut ids: Vec<CustomerId> = annotated.iter().map(|a| a.entry.customer_id).collect();
        ids.sort_unstable_by_key(|id| id.into_inner());
        ids.dedup();
        let customers: HashMap<CustomerId, _> = self
            .store
            .customers(&ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(annotated
            .into_iter()
            .map(|a| {
                let customer = customers.get(&a.entry.customer_id);
                LedgerRow::from_annotated(a, customer)
            })
            .collect())
    }

    /// Applies the current filter/sort/page state to the annotated listing
    /// and returns one page plus totals.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] when a store query fails.
    pub async fn page(&self, query: &LedgerQuery) -> Result<PageResponse<LedgerRow>, LedgerError> {
        let rows = self.list_with_balances(None).await?;
        Ok(pipeline::apply(rows, query))
    }

    /// Re-derives the production amount for a sale's current field values.
    async fn reprice(&self, sale: &LedgerEntry) -> Result<rust_decimal::Decimal, LedgerError> {
        let sku = sale.sku.as_deref().ok_or(LedgerError::MissingSku)?;
        let quote = self.pricing.latest_quote(sku).await?;
        let unit_cost = pricing::resolve_unit_cost(quote, sale.amount, sale.quantity)?;
        pricing::production_amount(sale.quantity.unwrap_or(0), unit_cost)
    }

    async fn compensate_entry(&self, id: EntryId) {
        if let Err(err) = self.store.delete_entry(id).await {
            error!(sale_id = %id, %err, "compensating delete failed; sale left without siblings");
        }
    }

    async fn compensate_production(&self, id: EntryId) {
        if let Err(err) = self.store.delete_production(id).await {
            error!(sale_id = %id, %err, "compensating production delete failed");
        }
    }
}

/// Folds a sibling mutation outcome into the warning list.
///
/// One affected row is the healthy case. Zero rows means the sibling went
/// missing; more than one means duplicate rows carried the same sale id and
/// all of them were touched.
fn record_sibling_outcome(
    kind: SiblingKind,
    sale_id: EntryId,
    outcome: Result<u64, StoreError>,
    warnings: &mut Vec<SyncWarning>,
) {
    match outcome {
        Ok(1) => {}
        Ok(0) => warnings.push(SyncWarning::SiblingMissing { kind, sale_id }),
        Ok(affected) => warnings.push(SyncWarning::SiblingAmbiguous { kind, affected }),
        Err(err) => warnings.push(SyncWarning::SiblingWriteFailed {
            kind,
            detail: err.to_string(),
        }),
    }
}
