//! `SeaORM` Entity for the transport_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Derived transport expense row, one per sale.
///
/// Amount is fixed at zero until logistics pricing lands in this flow; the
/// row exists so the logistics screens see every client sale.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transport_entries")]
pub struct Model {
    /// Row id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Public id of the originating sale.
    pub source_sale_id: Uuid,
    /// Copied from the sale's customer.
    pub client_id: Uuid,
    /// Always "Client Sale Transport".
    pub expense_group: String,
    /// Copied from the sale's date.
    pub expense_date: Date,
    /// Placeholder, fixed at zero.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    /// "<customer>-<branch> Transport".
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
