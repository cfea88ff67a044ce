//! `SeaORM` Entity for the ledger_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::EntryKind;

/// One sale or payment row.
///
/// `seq` is the BIGSERIAL primary key and doubles as the monotonic
/// insertion sequence used for same-date ordering; `id` is the opaque
/// public identifier.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    /// Monotonic insertion sequence.
    #[sea_orm(primary_key)]
    pub seq: i64,
    /// Opaque public identifier.
    #[sea_orm(unique)]
    pub id: Uuid,
    /// Customer the entry belongs to.
    pub customer_id: Uuid,
    /// Sale or payment.
    pub kind: EntryKind,
    /// Business date; nullable for legacy imports without a usable date.
    pub transaction_date: Option<Date>,
    /// Amount billed or received.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    /// Cases sold (sale only).
    pub quantity: Option<i32>,
    /// Product code (sale only).
    pub sku: Option<String>,
    /// Free text.
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Insertion timestamp.
    pub created_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Owning customer.
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
