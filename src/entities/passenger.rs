use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "pax_type")]
#[serde(rename_all = "lowercase")]
pub enum PaxType {
    #[sea_orm(string_value = "adult")]
    Adult,
    #[sea_orm(string_value = "child")]
    Child,
    #[sea_orm(string_value = "infant")]
    Infant,
}

impl PaxType {
    /// Single-character marker written into the seat map.
    pub fn seat_marker(self) -> u8 {
        match self {
            PaxType::Adult => b'A',
            PaxType::Child => b'C',
            PaxType::Infant => b'I',
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "passenger")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub booking_id: i32,
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub pax_type: PaxType,
    /// 1-based sequence within the booking, across all categories.
    /// Sequence 1 is always an adult (the principal passenger).
    pub pax_number: i16,
    pub date_of_birth: Option<Date>,
    pub contact_number: String,
    pub contact_email: String,
    pub seat_number: i16,
    pub status: String,
    pub wheelchair_ssr: String,
    pub wheelchair_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id"
    )]
    Booking,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
