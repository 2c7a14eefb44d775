use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(pk_auto(Booking::Id))
                    .col(string_len(Booking::Pnr, 6).not_null().unique_key())
                    .col(string_len(Booking::FlightFrom, 3).not_null())
                    .col(string_len(Booking::FlightTo, 3).not_null())
                    .col(boolean(Booking::ReturnFlight).not_null().default(true))
                    .col(date(Booking::OutboundDate).not_null())
                    .col(string_len(Booking::OutboundFlightno, 6).not_null())
                    .col(date_null(Booking::InboundDate))
                    .col(string_len(Booking::InboundFlightno, 6).not_null().default(""))
                    .col(decimal_len(Booking::FareQuote, 6, 2).not_null().default(0))
                    .col(string_len(Booking::TicketClass, 1).not_null().default("Y"))
                    .col(string_len(Booking::CabinClass, 1).not_null().default("Y"))
                    .col(small_integer(Booking::NumberOfAdults).not_null().default(0))
                    .col(small_integer(Booking::NumberOfChildren).not_null().default(0))
                    .col(small_integer(Booking::NumberOfInfants).not_null().default(0))
                    .col(small_integer(Booking::NumberOfBags).not_null().default(0))
                    .col(string_len(Booking::DepartureTime, 4).not_null())
                    .col(string_len(Booking::ArrivalTime, 4).not_null())
                    .col(text(Booking::Remarks).not_null().default(""))
                    .col(
                        timestamp_with_time_zone(Booking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Booking::AmendedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    Table,
    Id,
    Pnr,
    FlightFrom,
    FlightTo,
    ReturnFlight,
    OutboundDate,
    OutboundFlightno,
    InboundDate,
    InboundFlightno,
    FareQuote,
    TicketClass,
    CabinClass,
    NumberOfAdults,
    NumberOfChildren,
    NumberOfInfants,
    NumberOfBags,
    DepartureTime,
    ArrivalTime,
    Remarks,
    CreatedAt,
    AmendedAt,
}
