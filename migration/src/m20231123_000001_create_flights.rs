use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Flight::Table)
                    .if_not_exists()
                    .col(string_len(Flight::FlightNumber, 6).primary_key())
                    .col(string_len(Flight::FlightFrom, 3).not_null())
                    .col(string_len(Flight::FlightTo, 3).not_null())
                    .col(string_len(Flight::FlightStd, 4).not_null())
                    .col(string_len(Flight::FlightSta, 4).not_null())
                    .col(boolean(Flight::Outbound).not_null().default(true))
                    .col(small_integer(Flight::Capacity).not_null())
                    .to_owned(),
            )
            .await?;

        // Seed the scheduled routes
        let insert = Query::insert()
            .into_table(Flight::Table)
            .columns([
                Flight::FlightNumber,
                Flight::FlightFrom,
                Flight::FlightTo,
                Flight::FlightStd,
                Flight::FlightSta,
                Flight::Outbound,
                Flight::Capacity,
            ])
            .values_panic(["FB101".into(), "LGW".into(), "JER".into(), "0900".into(), "1000".into(), true.into(), 12.into()])
            .values_panic(["FB102".into(), "JER".into(), "LGW".into(), "1130".into(), "1230".into(), false.into(), 12.into()])
            .values_panic(["FB201".into(), "LGW".into(), "JER".into(), "1500".into(), "1600".into(), true.into(), 12.into()])
            .values_panic(["FB202".into(), "JER".into(), "LGW".into(), "1730".into(), "1830".into(), false.into(), 12.into()])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Flight::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Flight {
    Table,
    FlightNumber,
    FlightFrom,
    FlightTo,
    FlightStd,
    FlightSta,
    Outbound,
    Capacity,
}
