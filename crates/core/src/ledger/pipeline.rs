//! Filter, sort, and paginate the balance-annotated listing.
//!
//! This stage is pure: given the same rows and query it always returns the
//! same page. Search and filters run first, then at most one column sort
//! (date descending when none is active), then the page slice.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solera_shared::types::pagination::{PageRequest, PageResponse};
use solera_shared::types::{CustomerId, EntryId};

use super::balance::AnnotatedEntry;
use super::types::{CustomerRef, EntryKind};

/// One display row of the sales ledger: entry fields joined with customer
/// display data and the running outstanding balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Entry id.
    pub id: EntryId,
    /// Customer id.
    pub customer_id: CustomerId,
    /// Customer display name; empty when the customer row is gone.
    pub customer: String,
    /// Customer branch label.
    pub branch: String,
    /// Sale or payment.
    pub kind: EntryKind,
    /// Business date.
    pub entry_date: Option<NaiveDate>,
    /// Amount billed or received.
    pub amount: Decimal,
    /// Cases sold.
    pub quantity: Option<i32>,
    /// Product code.
    pub sku: Option<String>,
    /// Free text.
    pub description: Option<String>,
    /// Running outstanding balance as of this entry.
    pub outstanding: Option<Decimal>,
    /// Insertion timestamp; tie-break for the default sort.
    pub created_at: DateTime<Utc>,
    /// Insertion sequence; final tie-break.
    pub seq: i64,
}

impl LedgerRow {
    /// Joins an annotated entry with its customer display data.
    #[must_use]
    pub fn from_annotated(annotated: AnnotatedEntry, customer: Option<&CustomerRef>) -> Self {
        let entry = annotated.entry;
        Self {
            id: entry.id,
            customer_id: entry.customer_id,
            customer: customer.map(|c| c.name.clone()).unwrap_or_default(),
            branch: customer.map(|c| c.branch.clone()).unwrap_or_default(),
            kind: entry.kind,
            entry_date: entry.entry_date,
            amount: entry.amount,
            quantity: entry.quantity,
            sku: entry.sku,
            description: entry.description,
            outstanding: annotated.outstanding,
            created_at: entry.created_at,
            seq: entry.seq,
        }
    }
}

/// Sortable columns of the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    /// Customer display name.
    Customer,
    /// Branch label.
    Branch,
    /// Product code.
    Sku,
    /// Sale/payment.
    Kind,
    /// Business date.
    Date,
    /// Amount.
    Amount,
    /// Case count.
    Quantity,
    /// Running balance.
    Outstanding,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// An active column sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSort {
    /// Column to sort by.
    pub column: SortColumn,
    /// Direction.
    pub direction: SortDirection,
}

/// Per-column filters. Empty vectors and `None` values match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnFilters {
    /// Exact business date.
    pub date: Option<NaiveDate>,
    /// Exact amount.
    pub amount: Option<Decimal>,
    /// Set-membership on customer.
    pub customers: Vec<CustomerId>,
    /// Set-membership on branch.
    pub branches: Vec<String>,
    /// Set-membership on SKU.
    pub skus: Vec<String>,
    /// Set-membership on entry kind.
    pub kinds: Vec<EntryKind>,
}

/// Filter/sort/page state for the listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerQuery {
    /// Case-insensitive free-text search across all visible columns.
    pub search: Option<String>,
    /// Per-column filters.
    pub filters: ColumnFilters,
    /// At most one active column sort.
    pub sort: Option<ColumnSort>,
    /// Page selection.
    pub page: PageRequest,
}

impl LedgerQuery {
    /// Activates a column sort, replacing any previous one; only one column
    /// sort can be active at a time.
    pub const fn sort_by(&mut self, column: SortColumn, direction: SortDirection) {
        self.sort = Some(ColumnSort { column, direction });
    }

    /// Clears the active sort, falling back to the default date ordering.
    pub const fn clear_sort(&mut self) {
        self.sort = None;
    }
}

/// Applies search, filters, sort, and pagination, returning one page plus
/// the filtered total.
#[must_use]
pub fn apply(rows: Vec<LedgerRow>, query: &LedgerQuery) -> PageResponse<LedgerRow> {
    let mut rows: Vec<LedgerRow> = rows
        .into_iter()
        .filter(|row| matches_filters(row, &query.filters) && matches_search(row, query.search.as_deref()))
        .collect();

    sort_rows(&mut rows, query.sort.as_ref());

    let total = rows.len() as u64;
    let start = usize::try_from(query.page.offset()).unwrap_or(usize::MAX).min(rows.len());
    let data: Vec<LedgerRow> = rows
        .into_iter()
        .skip(start)
        .take(usize::try_from(query.page.limit()).unwrap_or(usize::MAX))
        .collect();

    PageResponse::new(data, query.page.page, query.page.per_page, total)
}

fn matches_search(row: &LedgerRow, search: Option<&str>) -> bool {
    let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    let needle = needle.to_lowercase();

    let mut haystacks: Vec<String> = vec![
        row.customer.clone(),
        row.branch.clone(),
        row.amount.to_string(),
        row.kind.as_str().to_string(),
    ];
    if let Some(sku) = &row.sku {
        haystacks.push(sku.clone());
    }
    if let Some(description) = &row.description {
        haystacks.push(description.clone());
    }
    if let Some(date) = row.entry_date {
        haystacks.push(date.format("%Y-%m-%d").to_string());
    }
    if let Some(outstanding) = row.outstanding {
        haystacks.push(outstanding.to_string());
    }

    haystacks.iter().any(|h| h.to_lowercase().contains(&needle))
}

fn matches_filters(row: &LedgerRow, filters: &ColumnFilters) -> bool {
    if let Some(date) = filters.date {
        if row.entry_date != Some(date) {
            return false;
        }
    }
    if let Some(amount) = filters.amount {
        if row.amount != amount {
            return false;
        }
    }
    if !filters.customers.is_empty() && !filters.customers.contains(&row.customer_id) {
        return false;
    }
    if !filters.branches.is_empty() && !filters.branches.contains(&row.branch) {
        return false;
    }
    if !filters.kinds.is_empty() && !filters.kinds.contains(&row.kind) {
        return false;
    }
    if !filters.skus.is_empty() {
        let Some(sku) = &row.sku else { return false };
        if !filters.skus.contains(sku) {
            return false;
        }
    }
    true
}

fn sort_rows(rows: &mut [LedgerRow], sort: Option<&ColumnSort>) {
    match sort {
        None => rows.sort_by(default_order),
        Some(sort) => {
            let column = sort.column;
            let direction = sort.direction;
            rows.sort_by(move |a, b| {
                let ordering = compare_column(a, b, column);
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }
    }
}

/// Default ordering: newest business date first, undated rows last,
/// insertion order descending as tie-break.
fn default_order(a: &LedgerRow, b: &LedgerRow) -> Ordering {
    b.entry_date
        .cmp(&a.entry_date)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.seq.cmp(&a.seq))
}

fn compare_column(a: &LedgerRow, b: &LedgerRow, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Customer => a.customer.to_lowercase().cmp(&b.customer.to_lowercase()),
        SortColumn::Branch => a.branch.to_lowercase().cmp(&b.branch.to_lowercase()),
        SortColumn::Sku => a.sku.cmp(&b.sku),
        SortColumn::Kind => a.kind.as_str().cmp(b.kind.as_str()),
        SortColumn::Date => a.entry_date.cmp(&b.entry_date),
        SortColumn::Amount => a.amount.cmp(&b.amount),
        SortColumn::Quantity => a.quantity.cmp(&b.quantity),
        SortColumn::Outstanding => a.outstanding.cmp(&b.outstanding),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn row(customer: &str, date: Option<NaiveDate>, amount: Decimal, seq: i64) -> LedgerRow {
        LedgerRow {
            id: EntryId::new(),
            customer_id: CustomerId::new(),
            customer: customer.to_string(),
            branch: "North".to_string(),
            kind: EntryKind::Sale,
            entry_date: date,
            amount,
            quantity: Some(10),
            sku: Some("COLA-330".to_string()),
            description: None,
            outstanding: Some(amount),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + chrono::Duration::seconds(seq),
            seq,
        }
    }

    fn date(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 1, d)
    }

    #[test]
    fn test_default_sort_is_date_descending_undated_last() {
        let rows = vec![
            row("a", date(5), dec!(1), 1),
            row("b", None, dec!(2), 2),
            row("c", date(20), dec!(3), 3),
        ];
        let page = apply(rows, &LedgerQuery::default());

        let customers: Vec<_> = page.data.iter().map(|r| r.customer.as_str()).collect();
        assert_eq!(customers, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_sort_by_replaces_previous_sort() {
        let mut query = LedgerQuery::default();
        query.sort_by(SortColumn::Amount, SortDirection::Ascending);
        query.sort_by(SortColumn::Customer, SortDirection::Descending);

        // Only the last selection is active.
        assert_eq!(
            query.sort,
            Some(ColumnSort {
                column: SortColumn::Customer,
                direction: SortDirection::Descending
            })
        );
    }

    #[test]
    fn test_column_sort_ascending_amount() {
        let rows = vec![
            row("a", date(1), dec!(30), 1),
            row("b", date(2), dec!(10), 2),
            row("c", date(3), dec!(20), 3),
        ];
        let mut query = LedgerQuery::default();
        query.sort_by(SortColumn::Amount, SortDirection::Ascending);

        let page = apply(rows, &query);
        let amounts: Vec<_> = page.data.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![dec!(10), dec!(20), dec!(30)]);
    }

    #[rstest]
    #[case("riverside", 1)] // customer name
    #[case("north", 3)] // branch matches every row
    #[case("cola", 3)] // sku matches every row
    #[case("2024-01-05", 1)] // formatted date
    #[case("600", 1)] // amount as text
    #[case("zzz", 0)]
    fn test_search_is_case_insensitive_substring(#[case] needle: &str, #[case] expected: usize) {
        let mut rows = vec![
            row("Riverside Beverages", date(5), dec!(600), 1),
            row("Hilltop Trading", date(6), dec!(75), 2),
            row("Bayside Kiosk", date(7), dec!(80), 3),
        ];
        rows[1].description = Some("restock".to_string());

        let query = LedgerQuery {
            search: Some(needle.to_string()),
            ..LedgerQuery::default()
        };
        assert_eq!(apply(rows, &query).data.len(), expected);
    }

    #[test]
    fn test_blank_search_matches_everything() {
        let rows = vec![row("a", date(1), dec!(1), 1), row("b", date(2), dec!(2), 2)];
        let query = LedgerQuery {
            search: Some("   ".to_string()),
            ..LedgerQuery::default()
        };
        assert_eq!(apply(rows, &query).meta.total, 2);
    }

    #[test]
    fn test_search_covers_outstanding() {
        let mut rows = vec![row("a", date(1), dec!(1), 1)];
        rows[0].outstanding = Some(dec!(432.10));
        let query = LedgerQuery {
            search: Some("432.1".to_string()),
            ..LedgerQuery::default()
        };
        assert_eq!(apply(rows, &query).data.len(), 1);
    }

    #[test]
    fn test_single_value_filters() {
        let rows = vec![
            row("a", date(5), dec!(100), 1),
            row("b", date(5), dec!(200), 2),
            row("c", date(6), dec!(100), 3),
        ];
        let query = LedgerQuery {
            filters: ColumnFilters {
                date: date(5),
                amount: Some(dec!(100)),
                ..ColumnFilters::default()
            },
            ..LedgerQuery::default()
        };

        let page = apply(rows, &query);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].customer, "a");
    }

    #[test]
    fn test_set_membership_filters() {
        let mut rows = vec![
            row("a", date(1), dec!(1), 1),
            row("b", date(2), dec!(2), 2),
            row("c", date(3), dec!(3), 3),
        ];
        rows[1].kind = EntryKind::Payment;
        rows[2].sku = Some("LIME-500".to_string());
        let wanted = vec![rows[0].customer_id, rows[2].customer_id];

        let query = LedgerQuery {
            filters: ColumnFilters {
                customers: wanted,
                kinds: vec![EntryKind::Sale],
                skus: vec!["COLA-330".to_string()],
                ..ColumnFilters::default()
            },
            ..LedgerQuery::default()
        };

        let page = apply(rows, &query);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].customer, "a");
    }

    #[test]
    fn test_rows_without_sku_fail_sku_filter() {
        let mut rows = vec![row("a", date(1), dec!(1), 1)];
        rows[0].sku = None;
        let query = LedgerQuery {
            filters: ColumnFilters {
                skus: vec!["COLA-330".to_string()],
                ..ColumnFilters::default()
            },
            ..LedgerQuery::default()
        };
        assert_eq!(apply(rows, &query).meta.total, 0);
    }

    #[test]
    fn test_pagination_slices_after_filter_and_sort() {
        let rows: Vec<LedgerRow> = (1u32..=25)
            .map(|i| row("a", date((i % 27) + 1), Decimal::from(i), i64::from(i)))
            .collect();
        let query = LedgerQuery {
            page: PageRequest {
                page: 2,
                per_page: 10,
            },
            ..LedgerQuery::default()
        };

        let page = apply(rows, &query);
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.meta.total, 25);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.meta.page, 2);
    }

    #[test]
    fn test_page_past_the_end_is_empty_with_totals() {
        let rows = vec![row("a", date(1), dec!(1), 1)];
        let query = LedgerQuery {
            page: PageRequest {
                page: 9,
                per_page: 10,
            },
            ..LedgerQuery::default()
        };

        let page = apply(rows, &query);
        assert!(page.data.is_empty());
        assert_eq!(page.meta.total, 1);
    }
}
