//! Ledger error types for validation, lookup, and persistence failures.

use solera_shared::types::{CustomerId, EntryId};
use thiserror::Error;

use super::store::StoreError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    // Raised before any write; nothing has been mutated.
    /// A sale needs a business date for its derived records.
    #[error("Transaction date is required")]
    MissingTransactionDate,

    /// A sale needs a product code.
    #[error("SKU is required for a sale")]
    MissingSku,

    /// The fallback cost heuristic divides the billed amount by quantity.
    #[error("quantity required for cost fallback")]
    QuantityRequiredForFallback,

    /// Amounts are never negative in valid data.
    #[error("Amount cannot be negative")]
    NegativeAmount,

    /// Case counts are never negative in valid data.
    #[error("Quantity cannot be negative")]
    NegativeQuantity,

    /// A derived amount overflowed decimal range.
    #[error("Computed amount is out of range")]
    AmountOutOfRange,

    // ========== Lookup Errors ==========
    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Ledger entry not found.
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(EntryId),

    /// The targeted entry is a payment, not a sale.
    #[error("Ledger entry {0} is not a sale")]
    NotASale(EntryId),

    // ========== Persistence Errors ==========
    /// A store call failed; zero or partial writes may have occurred.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingTransactionDate => "MISSING_TRANSACTION_DATE",
            Self::MissingSku => "MISSING_SKU",
            Self::QuantityRequiredForFallback => "QUANTITY_REQUIRED_FOR_FALLBACK",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::NegativeQuantity => "NEGATIVE_QUANTITY",
            Self::AmountOutOfRange => "AMOUNT_OUT_OF_RANGE",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::NotASale(_) => "NOT_A_SALE",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// True for errors raised before any write.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingTransactionDate
                | Self::MissingSku
                | Self::QuantityRequiredForFallback
                | Self::NegativeAmount
                | Self::NegativeQuantity
                | Self::AmountOutOfRange
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::MissingTransactionDate.error_code(),
            "MISSING_TRANSACTION_DATE"
        );
        assert_eq!(
            LedgerError::QuantityRequiredForFallback.error_code(),
            "QUANTITY_REQUIRED_FOR_FALLBACK"
        );
        assert_eq!(
            LedgerError::Store(StoreError::Backend("down".into())).error_code(),
            "STORE_ERROR"
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(LedgerError::MissingTransactionDate.is_validation());
        assert!(LedgerError::QuantityRequiredForFallback.is_validation());
        assert!(LedgerError::NegativeAmount.is_validation());
        assert!(!LedgerError::EntryNotFound(EntryId::new()).is_validation());
        assert!(!LedgerError::Store(StoreError::Backend(String::new())).is_validation());
    }

    #[test]
    fn test_fallback_message_is_stable() {
        // Callers and operators grep for this exact phrase.
        assert_eq!(
            LedgerError::QuantityRequiredForFallback.to_string(),
            "quantity required for cost fallback"
        );
    }

    #[test]
    fn test_store_error_display_carries_detail() {
        let err = LedgerError::Store(StoreError::Rejected("duplicate key".into()));
        assert_eq!(err.to_string(), "Store error: store rejected the write: duplicate key");
    }
}
