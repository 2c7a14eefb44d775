use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Schedule::Table)
                    .if_not_exists()
                    .col(pk_auto(Schedule::Id))
                    .col(string_len(Schedule::FlightNumber, 6).not_null())
                    .col(date(Schedule::FlightDate).not_null())
                    .col(small_integer(Schedule::TotalBooked).not_null().default(0))
                    .col(string_len(Schedule::Seatmap, 255).not_null())
                    .to_owned(),
            )
            .await?;

        // Seat allocation does a compare-and-swap per (flight_number, flight_date);
        // the unique index is what makes the lazy row creation race-safe.
        manager
            .create_index(
                Index::create()
                    .name("idx_schedule_flight_date")
                    .table(Schedule::Table)
                    .col(Schedule::FlightNumber)
                    .col(Schedule::FlightDate)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Schedule::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Schedule {
    Table,
    Id,
    FlightNumber,
    FlightDate,
    TotalBooked,
    Seatmap,
}
