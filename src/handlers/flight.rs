use axum::{
    extract::{Path, State},
    Json,
};
use sea_orm::{EntityTrait, QueryOrder};

use crate::entities::flight;
use crate::error::{AppError, AppResult};
use crate::AppState;

/// List the scheduled route templates.
pub async fn list_flights(State(state): State<AppState>) -> AppResult<Json<Vec<flight::Model>>> {
    let flights = flight::Entity::find()
        .order_by_asc(flight::Column::FlightNumber)
        .all(&state.db)
        .await?;
    Ok(Json(flights))
}

pub async fn get_flight(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> AppResult<Json<flight::Model>> {
    let number = number.trim().to_uppercase();
    flight::Entity::find_by_id(number.clone())
        .one(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Flight {} not found", number)))
}
