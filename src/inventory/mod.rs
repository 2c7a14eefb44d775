//! Seat inventory ledger: availability, allocation and release against the
//! per-(flight, date) schedule rows.
//!
//! Concurrent allocators for the same flight/date serialize through an
//! optimistic compare-and-swap on the stored seat map; the unique index on
//! (flight_number, flight_date) makes the lazy row creation race-safe.

pub mod seatmap;

use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};

use crate::entities::{flight, schedule};
use crate::error::{AppError, AppResult};
use seatmap::SeatMap;

const CAS_ATTEMPTS: usize = 5;

/// Whether `requested` seats are currently free on the given date. A
/// missing schedule row means nothing is booked yet.
pub async fn check_availability<C: ConnectionTrait>(
    db: &C,
    flight: &flight::Model,
    date: NaiveDate,
    requested: usize,
) -> AppResult<bool> {
    let free = match find_schedule(db, &flight.flight_number, date).await? {
        Some(row) => SeatMap::from_wire(&row.seatmap, flight.capacity as usize).free_count(),
        None => flight.capacity as usize,
    };
    Ok(requested <= free)
}

/// Claim one seat per marker byte, first-fit from seat 1, and return the
/// assigned seat numbers. Fails with `InsufficientCapacity` leaving the
/// ledger unchanged when fewer seats are free than requested.
pub async fn allocate<C: ConnectionTrait>(
    db: &C,
    flight: &flight::Model,
    date: NaiveDate,
    markers: &[u8],
) -> AppResult<Vec<u32>> {
    for _ in 0..CAS_ATTEMPTS {
        let row = match find_schedule(db, &flight.flight_number, date).await? {
            Some(row) => row,
            None => {
                create_schedule_row(db, flight, date).await?;
                continue;
            }
        };

        let mut map = SeatMap::from_wire(&row.seatmap, flight.capacity as usize);
        let seats = map.allocate(markers).map_err(|free| {
            AppError::InsufficientCapacity(format!(
                "Only {} of {} requested seats available on {} {}",
                free,
                markers.len(),
                flight.flight_number,
                date
            ))
        })?;

        if swap_seatmap(db, row.id, &row.seatmap, &map).await? {
            return Ok(seats);
        }
        // Another allocation landed first; reload and retry.
    }

    Err(AppError::Conflict(format!(
        "Seat map for {} {} is under heavy contention, please retry",
        flight.flight_number, date
    )))
}

/// Free the given seat numbers. Tolerates seats that are already free and
/// dates that were never scheduled.
pub async fn release<C: ConnectionTrait>(
    db: &C,
    flight: &flight::Model,
    date: NaiveDate,
    seats: &[u32],
) -> AppResult<()> {
    for _ in 0..CAS_ATTEMPTS {
        let row = match find_schedule(db, &flight.flight_number, date).await? {
            Some(row) => row,
            None => return Ok(()),
        };

        let mut map = SeatMap::from_wire(&row.seatmap, flight.capacity as usize);
        for &seat in seats {
            map.release(seat);
        }
        if map.to_wire() == row.seatmap {
            return Ok(());
        }
        if swap_seatmap(db, row.id, &row.seatmap, &map).await? {
            return Ok(());
        }
    }

    Err(AppError::Conflict(format!(
        "Seat map for {} {} is under heavy contention, please retry",
        flight.flight_number, date
    )))
}

async fn find_schedule<C: ConnectionTrait>(
    db: &C,
    flight_number: &str,
    date: NaiveDate,
) -> AppResult<Option<schedule::Model>> {
    Ok(schedule::Entity::find()
        .filter(schedule::Column::FlightNumber.eq(flight_number))
        .filter(schedule::Column::FlightDate.eq(date))
        .one(db)
        .await?)
}

/// Lazily create the schedule row for a date's first allocation. A
/// concurrent creator winning the race is fine; the caller reloads.
async fn create_schedule_row<C: ConnectionTrait>(
    db: &C,
    flight: &flight::Model,
    date: NaiveDate,
) -> AppResult<()> {
    let blank = schedule::ActiveModel {
        flight_number: Set(flight.flight_number.clone()),
        flight_date: Set(date),
        total_booked: Set(0),
        seatmap: Set(SeatMap::empty(flight.capacity as usize).to_wire()),
        ..Default::default()
    };

    let insert = schedule::Entity::insert(blank).on_conflict(
        OnConflict::columns([schedule::Column::FlightNumber, schedule::Column::FlightDate])
            .do_nothing()
            .to_owned(),
    );

    match insert.exec(db).await {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Compare-and-swap the stored seat map. Returns false when another writer
/// changed the row since it was read.
async fn swap_seatmap<C: ConnectionTrait>(
    db: &C,
    schedule_id: i32,
    expected: &str,
    map: &SeatMap,
) -> AppResult<bool> {
    let result = schedule::Entity::update_many()
        .col_expr(schedule::Column::Seatmap, Expr::value(map.to_wire()))
        .col_expr(
            schedule::Column::TotalBooked,
            Expr::value(map.occupied_count() as i16),
        )
        .filter(schedule::Column::Id.eq(schedule_id))
        .filter(schedule::Column::Seatmap.eq(expected))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}
