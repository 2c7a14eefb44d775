use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20231123_000002_create_bookings::Booking;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create passenger category enum
        manager
            .create_type(
                Type::create()
                    .as_enum(PaxType::Enum)
                    .values([PaxType::Adult, PaxType::Child, PaxType::Infant])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Passenger::Table)
                    .if_not_exists()
                    .col(pk_auto(Passenger::Id))
                    .col(integer(Passenger::BookingId).not_null())
                    .col(string_len(Passenger::Title, 4).not_null())
                    .col(string_len(Passenger::FirstName, 40).not_null())
                    .col(string_len(Passenger::LastName, 40).not_null())
                    .col(
                        ColumnDef::new(Passenger::PaxType)
                            .custom(PaxType::Enum)
                            .not_null(),
                    )
                    .col(small_integer(Passenger::PaxNumber).not_null().default(1))
                    .col(date_null(Passenger::DateOfBirth))
                    .col(string_len(Passenger::ContactNumber, 40).not_null().default(""))
                    .col(string_len(Passenger::ContactEmail, 40).not_null().default(""))
                    .col(small_integer(Passenger::SeatNumber).not_null().default(0))
                    .col(string_len(Passenger::Status, 4).not_null())
                    .col(string_len(Passenger::WheelchairSsr, 1).not_null().default(""))
                    .col(string_len(Passenger::WheelchairType, 1).not_null().default(""))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_passenger_booking")
                            .from(Passenger::Table, Passenger::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Passenger::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(PaxType::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Passenger {
    Table,
    Id,
    BookingId,
    Title,
    FirstName,
    LastName,
    PaxType,
    PaxNumber,
    DateOfBirth,
    ContactNumber,
    ContactEmail,
    SeatNumber,
    Status,
    WheelchairSsr,
    WheelchairType,
}

#[derive(DeriveIden)]
pub enum PaxType {
    #[sea_orm(iden = "pax_type")]
    Enum,
    #[sea_orm(iden = "adult")]
    Adult,
    #[sea_orm(iden = "child")]
    Child,
    #[sea_orm(iden = "infant")]
    Infant,
}
