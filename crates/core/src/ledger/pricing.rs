//! Production cost resolution.
//!
//! The unit production cost for a sale comes from the most recently dated
//! pricing quote for its SKU. Recency is by quote date alone; a quote dated
//! after the sale still wins. Without any quote, the legacy heuristic prices
//! production at half the billed unit price. Both rules are load-bearing
//! legacy behavior and must not be changed without a product decision.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// A unit-cost quote for a SKU at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingQuote {
    /// Product code the quote applies to.
    pub sku: String,
    /// Production cost per case.
    pub cost_per_case: Decimal,
    /// Date the quote was recorded.
    pub quoted_on: NaiveDate,
}

/// Resolves the unit production cost for a sale.
///
/// `latest_quote` is the newest quote for the sale's SKU, if any. Without
/// one the cost falls back to `(sale_amount / quantity) / 2`.
///
/// # Errors
///
/// - [`LedgerError::QuantityRequiredForFallback`] when no quote exists and
///   `quantity` is zero or absent (the fallback would divide by zero).
/// - [`LedgerError::AmountOutOfRange`] when the fallback division overflows.
pub fn resolve_unit_cost(
    latest_quote: Option<PricingQuote>,
    sale_amount: Decimal,
    quantity: Option<i32>,
) -> Result<Decimal, LedgerError> {
    if let Some(quote) = latest_quote {
        return Ok(quote.cost_per_case);
    }

    let quantity = quantity.filter(|q| *q != 0).ok_or(LedgerError::QuantityRequiredForFallback)?;
    let unit_price = sale_amount
        .checked_div(Decimal::from(quantity))
        .ok_or(LedgerError::AmountOutOfRange)?;
    unit_price
        .checked_div(Decimal::TWO)
        .ok_or(LedgerError::AmountOutOfRange)
}

/// Computes the production amount for a sale: `quantity * unit_cost`,
/// clamped at zero and rounded half-up to 2 decimal places.
///
/// # Errors
///
/// Returns [`LedgerError::AmountOutOfRange`] when the product overflows.
pub fn production_amount(quantity: i32, unit_cost: Decimal) -> Result<Decimal, LedgerError> {
    let raw = Decimal::from(quantity)
        .checked_mul(unit_cost)
        .ok_or(LedgerError::AmountOutOfRange)?;
    Ok(raw
        .max(Decimal::ZERO)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}
