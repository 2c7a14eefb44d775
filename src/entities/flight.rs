use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "flight")]
pub struct Model {
    /// Flight numbers are the natural key; schedules reference them per date.
    #[sea_orm(primary_key, auto_increment = false)]
    pub flight_number: String,
    pub flight_from: String,
    pub flight_to: String,
    /// Scheduled time of departure, "HHMM".
    pub flight_std: String,
    /// Scheduled time of arrival, "HHMM".
    pub flight_sta: String,
    pub outbound: bool,
    pub capacity: i16,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::schedule::Entity")]
    Schedules,
}

impl Related<super::schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
