//! `SeaORM` Entity for the production_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Derived production-cost row, one per sale.
///
/// `source_sale_id` carries the application-level link to the originating
/// sale. There is deliberately no database constraint: sync is owned by the
/// application and drift must remain representable.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "production_entries")]
pub struct Model {
    /// Row id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Public id of the originating sale.
    pub source_sale_id: Uuid,
    /// Copied from the sale.
    pub customer_id: Uuid,
    /// Copied from the sale.
    pub sku: String,
    /// Copied from the sale.
    pub quantity: i32,
    /// Copied from the sale.
    pub transaction_date: Date,
    /// quantity x resolved unit production cost.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    /// Customer display name at derivation time.
    pub description: String,
    /// Insertion timestamp.
    pub created_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Originating sale.
    #[sea_orm(
        belongs_to = "super::ledger_entries::Entity",
        from = "Column::SourceSaleId",
        to = "super::ledger_entries::Column::Id"
    )]
    LedgerEntries,
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
