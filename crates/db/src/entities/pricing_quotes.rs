//! `SeaORM` Entity for the pricing_quotes table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A production unit-cost quote for a SKU. Multiple quotes may exist per
/// SKU over time; resolution takes the newest by `quoted_on`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pricing_quotes")]
pub struct Model {
    /// Row id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Product code.
    pub sku: String,
    /// Production cost per case.
    #[sea_orm(column_type = "Decimal(Some((14, 4)))")]
    pub cost_per_case: Decimal,
    /// Date the quote was recorded.
    pub quoted_on: Date,
    /// Insertion timestamp.
    pub created_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
