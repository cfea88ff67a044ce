//! Database enums mapped to Rust types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger entry kind stored as a short string.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A sale billed to a customer.
    #[sea_orm(string_value = "sale")]
    Sale,
    /// A payment received from a customer.
    #[sea_orm(string_value = "payment")]
    Payment,
}
