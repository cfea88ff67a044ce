//! Ledger repository: the Postgres implementation of the core store ports.
//!
//! Every method is one store call; there is no cross-call transaction here.
//! The core's sales-ledger service owns the write ordering and its
//! compensation policy.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::debug;
use uuid::Uuid;

use solera_core::ledger::pricing::PricingQuote;
use solera_core::ledger::store::{
    LedgerStore, PricingStore, ProductionPatch, StoreError, TransportPatch,
};
use solera_core::ledger::types::{
    CustomerRef, EntryKind, LedgerEntry, NewLedgerEntry, ProductionEntry, TransportEntry,
    UpdateSaleInput,
};
use solera_shared::types::{CustomerId, EntryId};

use crate::entities::sea_orm_active_enums::EntryKind as DbEntryKind;
use crate::entities::{
    customers, ledger_entries, pricing_quotes, production_entries, transport_entries,
};

/// Postgres-backed implementation of [`LedgerStore`] and [`PricingStore`].
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ============================================================================
// Mapping helpers
// ============================================================================

fn store_err(err: DbErr) -> StoreError {
    match err {
        DbErr::Query(_) | DbErr::Exec(_) | DbErr::RecordNotInserted | DbErr::RecordNotUpdated => {
            StoreError::Rejected(err.to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

const fn kind_to_db(kind: EntryKind) -> DbEntryKind {
    match kind {
        EntryKind::Sale => DbEntryKind::Sale,
        EntryKind::Payment => DbEntryKind::Payment,
    }
}

const fn kind_from_db(kind: &DbEntryKind) -> EntryKind {
    match kind {
        DbEntryKind::Sale => EntryKind::Sale,
        DbEntryKind::Payment => EntryKind::Payment,
    }
}

fn entry_from_model(model: ledger_entries::Model) -> LedgerEntry {
    LedgerEntry {
        id: EntryId::from_uuid(model.id),
        seq: model.seq,
        customer_id: CustomerId::from_uuid(model.customer_id),
        kind: kind_from_db(&model.kind),
        entry_date: model.transaction_date,
        amount: model.amount,
        quantity: model.quantity,
        sku: model.sku,
        description: model.description,
        created_at: model.created_at.to_utc(),
    }
}

fn customer_from_model(model: customers::Model) -> CustomerRef {
    CustomerRef {
        id: CustomerId::from_uuid(model.id),
        name: model.name,
        branch: model.branch,
    }
}

fn quote_from_model(model: pricing_quotes::Model) -> PricingQuote {
    PricingQuote {
        sku: model.sku,
        cost_per_case: model.cost_per_case,
        quoted_on: model.quoted_on,
    }
}

/// Builds an ActiveModel carrying only the patched columns.
fn entry_patch_model(patch: UpdateSaleInput) -> ledger_entries::ActiveModel {
    let mut active = <ledger_entries::ActiveModel as sea_orm::ActiveModelTrait>::default();
    if let Some(amount) = patch.amount {
        active.amount = Set(amount);
    }
    if let Some(quantity) = patch.quantity {
        active.quantity = Set(Some(quantity));
    }
    if let Some(sku) = patch.sku {
        active.sku = Set(Some(sku));
    }
    if let Some(date) = patch.entry_date {
        active.transaction_date = Set(Some(date));
    }
    if let Some(description) = patch.description {
        active.description = Set(Some(description));
    }
    active
}

fn production_patch_model(patch: ProductionPatch) -> production_entries::ActiveModel {
    let mut active = <production_entries::ActiveModel as sea_orm::ActiveModelTrait>::default();
    if let Some(sku) = patch.sku {
        active.sku = Set(sku);
    }
    if let Some(quantity) = patch.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(date) = patch.entry_date {
        active.transaction_date = Set(date);
    }
    if let Some(amount) = patch.amount {
        active.amount = Set(amount);
    }
    active
}

fn transport_patch_model(patch: TransportPatch) -> transport_entries::ActiveModel {
    let mut active = <transport_entries::ActiveModel as sea_orm::ActiveModelTrait>::default();
    if let Some(date) = patch.expense_date {
        active.expense_date = Set(date);
    }
    if let Some(description) = patch.description {
        active.description = Set(description);
    }
    active
}

// ============================================================================
// Store port implementations
// ============================================================================

#[async_trait]
impl LedgerStore for LedgerRepository {
    async fn insert_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, StoreError> {
        let active = ledger_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(entry.customer_id.into_inner()),
            kind: Set(kind_to_db(entry.kind)),
            transaction_date: Set(entry.entry_date),
            amount: Set(entry.amount),
            quantity: Set(entry.quantity),
            sku: Set(entry.sku),
            description: Set(entry.description),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let model = active.insert(&self.db).await.map_err(store_err)?;
        debug!(entry_id = %model.id, seq = model.seq, "inserted ledger entry");
        Ok(entry_from_model(model))
    }

    async fn update_entry(&self, id: EntryId, patch: UpdateSaleInput) -> Result<(), StoreError> {
        ledger_entries::Entity::update_many()
            .set(entry_patch_model(patch))
            .filter(ledger_entries::Column::Id.eq(id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn delete_entry(&self, id: EntryId) -> Result<(), StoreError> {
        let result = ledger_entries::Entity::delete_many()
            .filter(ledger_entries::Column::Id.eq(id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        debug!(entry_id = %id, rows = result.rows_affected, "deleted ledger entry");
        Ok(())
    }

    async fn entry(&self, id: EntryId) -> Result<Option<LedgerEntry>, StoreError> {
        let model = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::Id.eq(id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(model.map(entry_from_model))
    }

    async fn entries(&self, customer: Option<CustomerId>) -> Result<Vec<LedgerEntry>, StoreError> {
        let mut query = ledger_entries::Entity::find();
        if let Some(customer) = customer {
            query = query.filter(ledger_entries::Column::CustomerId.eq(customer.into_inner()));
        }

        let models = query
            .order_by_asc(ledger_entries::Column::Seq)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(models.into_iter().map(entry_from_model).collect())
    }

    async fn customer(&self, id: CustomerId) -> Result<Option<CustomerRef>, StoreError> {
        let model = customers::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(model.map(customer_from_model))
    }

    async fn customers(&self, ids: &[CustomerId]) -> Result<Vec<CustomerRef>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = customers::Entity::find()
            .filter(
                customers::Column::Id.is_in(ids.iter().map(|id| id.into_inner())),
            )
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(models.into_iter().map(customer_from_model).collect())
    }

    async fn insert_production(&self, entry: ProductionEntry) -> Result<(), StoreError> {
        let active = production_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            source_sale_id: Set(entry.source_sale_id.into_inner()),
            customer_id: Set(entry.customer_id.into_inner()),
            sku: Set(entry.sku),
            quantity: Set(entry.quantity),
            transaction_date: Set(entry.entry_date),
            amount: Set(entry.amount),
            description: Set(entry.description),
            created_at: Set(Utc::now().into()),
        };
        active.insert(&self.db).await.map_err(store_err)?;
        Ok(())
    }

    async fn update_production(
        &self,
        sale_id: EntryId,
        patch: ProductionPatch,
    ) -> Result<u64, StoreError> {
        let result = production_entries::Entity::update_many()
            .set(production_patch_model(patch))
            .filter(production_entries::Column::SourceSaleId.eq(sale_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected)
    }

    async fn delete_production(&self, sale_id: EntryId) -> Result<u64, StoreError> {
        let result = production_entries::Entity::delete_many()
            .filter(production_entries::Column::SourceSaleId.eq(sale_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected)
    }

    async fn insert_transport(&self, entry: TransportEntry) -> Result<(), StoreError> {
        let active = transport_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            source_sale_id: Set(entry.source_sale_id.into_inner()),
            client_id: Set(entry.client_id.into_inner()),
            expense_group: Set(entry.expense_group),
            expense_date: Set(entry.expense_date),
            amount: Set(entry.amount),
            description: Set(entry.description),
            created_at: Set(Utc::now().into()),
        };
        active.insert(&self.db).await.map_err(store_err)?;
        Ok(())
    }

    async fn update_transport(
        &self,
        sale_id: EntryId,
        patch: TransportPatch,
    ) -> Result<u64, StoreError> {
        let result = transport_entries::Entity::update_many()
            .set(transport_patch_model(patch))
            .filter(transport_entries::Column::SourceSaleId.eq(sale_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected)
    }

    async fn delete_transport(&self, sale_id: EntryId) -> Result<u64, StoreError> {
        let result = transport_entries::Entity::delete_many()
            .filter(transport_entries::Column::SourceSaleId.eq(sale_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected)
    }
}

#[async_trait]
impl PricingStore for LedgerRepository {
    async fn latest_quote(&self, sku: &str) -> Result<Option<PricingQuote>, StoreError> {
        let model = pricing_quotes::Entity::find()
            .filter(pricing_quotes::Column::Sku.eq(sku))
            .order_by_desc(pricing_quotes::Column::QuotedOn)
            .limit(1)
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(model.map(quote_from_model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use sea_orm::{ActiveValue, RuntimeErr};

    fn model() -> ledger_entries::Model {
        ledger_entries::Model {
            seq: 42,
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            kind: DbEntryKind::Sale,
            transaction_date: NaiveDate::from_ymd_opt(2024, 5, 2),
            amount: dec!(150.00),
            quantity: Some(6),
            sku: Some("LIME-500".to_string()),
            description: Some("weekly restock".to_string()),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_store_err_classification() {
        let rejected = store_err(DbErr::Query(RuntimeErr::Internal(
            "violates check constraint".to_string(),
        )));
        assert!(matches!(rejected, StoreError::Rejected(_)));

        let backend = store_err(DbErr::Conn(RuntimeErr::Internal(
            "connection refused".to_string(),
        )));
        assert!(matches!(backend, StoreError::Backend(_)));
    }

    #[test]
    fn test_kind_mapping_round_trips() {
        for kind in [EntryKind::Sale, EntryKind::Payment] {
            assert_eq!(kind_from_db(&kind_to_db(kind)), kind);
        }
    }

    #[test]
    fn test_entry_from_model_maps_all_fields() {
        let model = model();
        let id = model.id;
        let entry = entry_from_model(model);

        assert_eq!(entry.id.into_inner(), id);
        assert_eq!(entry.seq, 42);
        assert_eq!(entry.kind, EntryKind::Sale);
        assert_eq!(entry.entry_date, NaiveDate::from_ymd_opt(2024, 5, 2));
        assert_eq!(entry.amount, dec!(150.00));
        assert_eq!(entry.quantity, Some(6));
        assert_eq!(entry.sku.as_deref(), Some("LIME-500"));
        assert_eq!(entry.description.as_deref(), Some("weekly restock"));
    }

    #[test]
    fn test_entry_patch_sets_only_present_columns() {
        let active = entry_patch_model(UpdateSaleInput {
            amount: Some(dec!(75)),
            sku: Some("LIME-500".to_string()),
            ..UpdateSaleInput::default()
        });

        assert!(matches!(active.amount, ActiveValue::Set(a) if a == dec!(75)));
        assert!(matches!(active.sku, ActiveValue::Set(Some(_))));
        assert!(matches!(active.quantity, ActiveValue::NotSet));
        assert!(matches!(active.transaction_date, ActiveValue::NotSet));
        assert!(matches!(active.description, ActiveValue::NotSet));
        // Identity columns are never patched.
        assert!(matches!(active.id, ActiveValue::NotSet));
        assert!(matches!(active.seq, ActiveValue::NotSet));
    }

    #[test]
    fn test_production_patch_sets_only_present_columns() {
        let active = production_patch_model(ProductionPatch {
            quantity: Some(4),
            amount: Some(dec!(48)),
            ..ProductionPatch::default()
        });

        assert!(matches!(active.quantity, ActiveValue::Set(4)));
        assert!(matches!(active.amount, ActiveValue::Set(a) if a == dec!(48)));
        assert!(matches!(active.sku, ActiveValue::NotSet));
        assert!(matches!(active.transaction_date, ActiveValue::NotSet));
        assert!(matches!(active.source_sale_id, ActiveValue::NotSet));
    }

    #[test]
    fn test_transport_patch_sets_only_present_columns() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let active = transport_patch_model(TransportPatch {
            expense_date: Some(date),
            description: None,
        });

        assert!(matches!(active.expense_date, ActiveValue::Set(d) if d == date));
        assert!(matches!(active.description, ActiveValue::NotSet));
        assert!(matches!(active.expense_group, ActiveValue::NotSet));
    }

    #[test]
    fn test_quote_from_model() {
        let quote = quote_from_model(pricing_quotes::Model {
            id: Uuid::new_v4(),
            sku: "COLA-330".to_string(),
            cost_per_case: dec!(12.5000),
            quoted_on: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            created_at: Utc::now().into(),
        });

        assert_eq!(quote.sku, "COLA-330");
        assert_eq!(quote.cost_per_case, dec!(12.5000));
    }
}
