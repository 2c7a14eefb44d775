use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub pnr: String,
    pub flight_from: String,
    pub flight_to: String,
    pub return_flight: bool,
    pub outbound_date: Date,
    pub outbound_flightno: String,
    /// Unset when `return_flight` is false.
    pub inbound_date: Option<Date>,
    pub inbound_flightno: String,
    pub fare_quote: Decimal,
    pub ticket_class: String,
    pub cabin_class: String,
    pub number_of_adults: i16,
    pub number_of_children: i16,
    pub number_of_infants: i16,
    pub number_of_bags: i16,
    pub departure_time: String,
    pub arrival_time: String,
    pub remarks: String,
    pub created_at: DateTimeWithTimeZone,
    pub amended_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::passenger::Entity")]
    Passengers,
}

impl Related<super::passenger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Passengers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
