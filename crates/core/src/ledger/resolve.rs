//! Sale resolution: validate create input and derive sibling records.
//!
//! All validation happens here, before anything is written; a sale that
//! fails resolution leaves the store untouched.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use solera_shared::types::EntryId;

use super::error::LedgerError;
use super::pricing::{self, PricingQuote};
use super::types::{
    CreateSaleInput, CustomerRef, EntryKind, NewLedgerEntry, ProductionEntry,
    TRANSPORT_EXPENSE_GROUP, TransportEntry,
};

/// A fully validated sale, ready to persist together with its derived
/// records.
#[derive(Debug, Clone)]
pub struct ResolvedSale {
    /// The ledger entry to insert.
    pub entry: NewLedgerEntry,
    /// Validated business date.
    pub entry_date: NaiveDate,
    /// Validated product code.
    pub sku: String,
    /// Validated case count.
    pub quantity: i32,
    /// Resolved unit production cost.
    pub unit_cost: Decimal,
    /// Derived production amount.
    pub production_amount: Decimal,
}

impl ResolvedSale {
    /// Builds the production-cost record once the sale has its store id.
    #[must_use]
    pub fn production_entry(&self, sale_id: EntryId, customer: &CustomerRef) -> ProductionEntry {
        ProductionEntry {
            source_sale_id: sale_id,
            customer_id: customer.id,
            sku: self.sku.clone(),
            quantity: self.quantity,
            entry_date: self.entry_date,
            amount: self.production_amount,
            description: customer.name.clone(),
        }
    }

    /// Builds the transport expense record once the sale has its store id.
    #[must_use]
    pub fn transport_entry(&self, sale_id: EntryId, customer: &CustomerRef) -> TransportEntry {
        TransportEntry {
            source_sale_id: sale_id,
            client_id: customer.id,
            expense_group: TRANSPORT_EXPENSE_GROUP.to_string(),
            expense_date: self.entry_date,
            amount: Decimal::ZERO,
            description: format!("{}-{} Transport", customer.name, customer.branch),
        }
    }
}

/// Validates a create-sale input and resolves its production cost.
///
/// # Errors
///
/// Returns a validation [`LedgerError`] when the date or SKU is missing, an
/// amount or quantity is negative, or the pricing fallback cannot be
/// computed. Nothing has been written when this fails.
pub fn resolve_sale(
    input: &CreateSaleInput,
    latest_quote: Option<PricingQuote>,
) -> Result<ResolvedSale, LedgerError> {
    let entry_date = input.entry_date.ok_or(LedgerError::MissingTransactionDate)?;
    let sku = input.sku.trim();
    if sku.is_empty() {
        return Err(LedgerError::MissingSku);
    }
    if input.amount < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount);
    }
    if input.quantity < 0 {
        return Err(LedgerError::NegativeQuantity);
    }

    let unit_cost = pricing::resolve_unit_cost(latest_quote, input.amount, Some(input.quantity))?;
    let production_amount = pricing::production_amount(input.quantity, unit_cost)?;

    Ok(ResolvedSale {
        entry: NewLedgerEntry {
            customer_id: input.customer_id,
            kind: EntryKind::Sale,
            entry_date: Some(entry_date),
            amount: input.amount,
            quantity: Some(input.quantity),
            sku: Some(sku.to_string()),
            description: input.description.clone(),
        },
        entry_date,
        sku: sku.to_string(),
        quantity: input.quantity,
        unit_cost,
        production_amount,
    })
}

/// Validates an update patch before it reaches the store.
///
/// # Errors
///
/// Returns [`LedgerError::NegativeAmount`] or
/// [`LedgerError::NegativeQuantity`] for out-of-range values.
pub fn validate_patch(patch: &super::types::UpdateSaleInput) -> Result<(), LedgerError> {
    if patch.amount.is_some_and(|a| a < Decimal::ZERO) {
        return Err(LedgerError::NegativeAmount);
    }
    if patch.quantity.is_some_and(|q| q < 0) {
        return Err(LedgerError::NegativeQuantity);
    }
    Ok(())
}
