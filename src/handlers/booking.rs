use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::entities::{booking, flight, passenger, transaction};
use crate::error::{AppError, AppResult};
use crate::inventory;
use crate::pricing;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct BookingListResponse {
    pub bookings: Vec<booking::Model>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

/// Search bookings by PNR or route code, case-insensitive substring,
/// ordered by PNR and paginated.
pub async fn search_bookings(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<BookingListResponse>> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(20).clamp(1, 100);

    let mut find = booking::Entity::find();
    if let Some(query) = params.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{}%", query);
        find = find.filter(
            Condition::any()
                .add(Expr::col((booking::Entity, booking::Column::Pnr)).ilike(pattern.clone()))
                .add(
                    Expr::col((booking::Entity, booking::Column::FlightFrom))
                        .ilike(pattern.clone()),
                )
                .add(Expr::col((booking::Entity, booking::Column::FlightTo)).ilike(pattern)),
        );
    }

    let paginator = find
        .order_by_asc(booking::Column::Pnr)
        .paginate(&state.db, per_page);
    let total = paginator.num_items().await?;
    let bookings = paginator.fetch_page(page - 1).await?;

    Ok(Json(BookingListResponse {
        bookings,
        page,
        per_page,
        total,
    }))
}

#[derive(Debug, Serialize)]
pub struct BookingDetailResponse {
    pub booking: booking::Model,
    pub passengers: Vec<passenger::Model>,
    pub transactions: Vec<transaction::Model>,
}

/// Fetch one booking with its passengers and transaction history.
pub async fn view_booking(
    State(state): State<AppState>,
    Path(pnr): Path<String>,
) -> AppResult<Json<BookingDetailResponse>> {
    let booking = find_by_pnr(&state, &pnr).await?;

    let passengers = booking
        .find_related(passenger::Entity)
        .order_by_asc(passenger::Column::PaxNumber)
        .all(&state.db)
        .await?;
    let transactions = transaction::Entity::find()
        .filter(transaction::Column::Pnr.eq(&booking.pnr))
        .order_by_asc(transaction::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(BookingDetailResponse {
        booking,
        passengers,
        transactions,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    pub remarks: Option<String>,
    pub number_of_bags: Option<u16>,
}

/// Amend a booking. A bag-count change re-quotes the fare and appends a
/// delta transaction so the ledger stays append-only.
pub async fn edit_booking(
    State(state): State<AppState>,
    Path(pnr): Path<String>,
    Json(payload): Json<UpdateBookingRequest>,
) -> AppResult<Json<booking::Model>> {
    let booking = find_by_pnr(&state, &pnr).await?;
    let pnr_code = booking.pnr.clone();
    let old_total = booking.fare_quote;

    let txn = state.db.begin().await?;
    let mut active: booking::ActiveModel = booking.clone().into();

    if let Some(remarks) = payload.remarks {
        active.remarks = Set(remarks.trim().to_string());
    }
    if let Some(bags) = payload.number_of_bags {
        let new_quote = pricing::quote(
            booking.number_of_adults as u32,
            booking.number_of_children as u32,
            booking.number_of_infants as u32,
            bags as u32,
        );
        active.number_of_bags = Set(bags as i16);
        active.fare_quote = Set(new_quote.total);

        let delta = new_quote.total - old_total;
        if !delta.is_zero() {
            transaction::ActiveModel {
                pnr: Set(pnr_code.clone()),
                amount: Set(delta),
                date_created: Set(Utc::now().date_naive()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    active.amended_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(pnr = %pnr_code, "Booking amended");
    Ok(Json(updated))
}

/// Cancel a booking: release its seats, append a refund transaction and
/// delete the record (passengers cascade).
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(pnr): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let booking = find_by_pnr(&state, &pnr).await?;
    let passengers = booking
        .find_related(passenger::Entity)
        .all(&state.db)
        .await?;
    let seats: Vec<u32> = passengers
        .iter()
        .filter(|p| p.seat_number > 0)
        .map(|p| p.seat_number as u32)
        .collect();

    let txn = state.db.begin().await?;

    if let Some(outbound) = flight::Entity::find_by_id(booking.outbound_flightno.clone())
        .one(&txn)
        .await?
    {
        inventory::release(&txn, &outbound, booking.outbound_date, &seats).await?;
    }

    if !booking.fare_quote.is_zero() {
        transaction::ActiveModel {
            pnr: Set(booking.pnr.clone()),
            amount: Set(-booking.fare_quote),
            date_created: Set(Utc::now().date_naive()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    let pnr_code = booking.pnr.clone();
    booking::Entity::delete_by_id(booking.id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(pnr = %pnr_code, "Booking cancelled");
    Ok(Json(serde_json::json!({ "message": "Booking cancelled" })))
}

async fn find_by_pnr(state: &AppState, pnr: &str) -> AppResult<booking::Model> {
    let pnr = pnr.trim().to_uppercase();
    booking::Entity::find()
        .filter(booking::Column::Pnr.eq(&pnr))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", pnr)))
}
