pub use sea_orm_migration::prelude::*;

mod m20231123_000001_create_flights;
mod m20231123_000002_create_bookings;
mod m20231123_000003_create_passengers;
mod m20231123_000004_create_schedules;
mod m20231123_000005_create_transactions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20231123_000001_create_flights::Migration),
            Box::new(m20231123_000002_create_bookings::Migration),
            Box::new(m20231123_000003_create_passengers::Migration),
            Box::new(m20231123_000004_create_schedules::Migration),
            Box::new(m20231123_000005_create_transactions::Migration),
        ]
    }
}
