//! Property-based tests for the running balance engine.

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use solera_shared::types::{CustomerId, EntryId};

use super::balance::{annotate, outstanding_as_of};
use super::types::{EntryKind, LedgerEntry};

/// Amounts with at most 2 decimal places; per-step rounding is a no-op for
/// these, so the incremental walk must agree with the plain sum.
fn cent_amount_strategy() -> impl Strategy<Value = Decimal> + Clone {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Amounts with up to 4 decimal places, to exercise per-step rounding.
fn fine_amount_strategy() -> impl Strategy<Value = Decimal> + Clone {
    (0i64..10_000_000i64, 0u32..=4u32).prop_map(|(n, scale)| Decimal::new(n, scale))
}

fn kind_strategy() -> impl Strategy<Value = EntryKind> {
    prop_oneof![Just(EntryKind::Sale), Just(EntryKind::Payment)]
}

fn history_strategy(
    amounts: impl Strategy<Value = Decimal> + Clone,
    max_len: usize,
) -> impl Strategy<Value = Vec<(EntryKind, Decimal, u16)>> {
    prop::collection::vec((kind_strategy(), amounts, 0u16..365u16), 1..=max_len)
}

fn build_history(customer: CustomerId, rows: &[(EntryKind, Decimal, u16)]) -> Vec<LedgerEntry> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let base_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    rows.iter()
        .enumerate()
        .map(|(idx, (kind, amount, day))| LedgerEntry {
            id: EntryId::new(),
            seq: idx as i64,
            customer_id: customer,
            kind: *kind,
            entry_date: Some(base_date + chrono::Duration::days(i64::from(*day))),
            amount: *amount,
            quantity: None,
            sku: None,
            description: None,
            created_at: base_time + chrono::Duration::seconds(idx as i64),
        })
        .collect()
}

fn chronological_key(entry: &LedgerEntry) -> (NaiveDate, chrono::DateTime<Utc>, i64) {
    (
        entry.entry_date.unwrap_or(NaiveDate::MIN),
        entry.created_at,
        entry.seq,
    )
}

fn signed(entry: &LedgerEntry) -> Decimal {
    match entry.kind {
        EntryKind::Sale => entry.amount,
        EntryKind::Payment => -entry.amount,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The balance after the last chronological entry equals total sales
    /// minus total payments, even though it is computed incrementally.
    #[test]
    fn prop_final_balance_equals_sales_minus_payments(
        rows in history_strategy(cent_amount_strategy(), 30),
    ) {
        let customer = CustomerId::new();
        let entries = build_history(customer, &rows);

        let expected: Decimal = entries.iter().map(signed).sum();
        let last = entries
            .iter()
            .max_by_key(|e| chronological_key(e))
            .map(|e| e.id)
            .unwrap();

        prop_assert_eq!(outstanding_as_of(&entries, last), Some(expected));
    }

    /// Every dated entry's balance equals the plain sum of entries at or
    /// before it in chronological order.
    #[test]
    fn prop_each_balance_is_prefix_sum(
        rows in history_strategy(cent_amount_strategy(), 20),
    ) {
        let customer = CustomerId::new();
        let entries = build_history(customer, &rows);
        let annotated = annotate(&entries);

        for target in &annotated {
            let key = chronological_key(&target.entry);
            let prefix: Decimal = entries
                .iter()
                .filter(|e| chronological_key(e) <= key)
                .map(signed)
                .sum();
            prop_assert_eq!(target.outstanding, Some(prefix));
        }
    }

    /// Recomputation from the same snapshot yields the same values.
    #[test]
    fn prop_annotation_is_idempotent(
        rows in history_strategy(fine_amount_strategy(), 20),
    ) {
        let customer = CustomerId::new();
        let entries = build_history(customer, &rows);

        prop_assert_eq!(annotate(&entries), annotate(&entries));
    }

    /// Every recorded balance is already rounded to 2 decimal places.
    #[test]
    fn prop_balances_carry_at_most_two_decimals(
        rows in history_strategy(fine_amount_strategy(), 20),
    ) {
        let customer = CustomerId::new();
        let entries = build_history(customer, &rows);

        for annotated in annotate(&entries) {
            if let Some(outstanding) = annotated.outstanding {
                prop_assert_eq!(outstanding, outstanding.round_dp(2));
            }
        }
    }

    /// Shuffling the input never changes any entry's balance.
    #[test]
    fn prop_input_order_is_irrelevant(
        rows in history_strategy(cent_amount_strategy(), 15),
    ) {
        let customer = CustomerId::new();
        let entries = build_history(customer, &rows);
        let mut reversed = entries.clone();
        reversed.reverse();

        let forward: std::collections::HashMap<_, _> = annotate(&entries)
            .into_iter()
            .map(|a| (a.entry.id, a.outstanding))
            .collect();
        for annotated in annotate(&reversed) {
            prop_assert_eq!(forward[&annotated.entry.id], annotated.outstanding);
        }
    }
}
