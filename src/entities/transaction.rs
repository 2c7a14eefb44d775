use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only financial ledger entry against a booking's PNR.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub pnr: String,
    pub amount: Decimal,
    pub date_created: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
