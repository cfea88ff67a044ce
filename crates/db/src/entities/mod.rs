//! `SeaORM` entity definitions.

pub mod customers;
pub mod ledger_entries;
pub mod pricing_quotes;
pub mod production_entries;
pub mod sea_orm_active_enums;
pub mod transport_entries;
