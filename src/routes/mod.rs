use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{booking, flight, workflow};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Reference data
    let flight_routes = Router::new()
        .route("/", get(flight::list_flights))
        .route("/{number}", get(flight::get_flight));

    // Multi-step booking workflow; state lives in the server-side session
    let workflow_routes = Router::new()
        .route("/trip-selection", post(workflow::trip_selection))
        .route("/session/{id}", get(workflow::session_overview))
        .route("/session/{id}", delete(workflow::cancel))
        .route(
            "/session/{id}/passenger-details",
            get(workflow::passenger_details_form),
        )
        .route(
            "/session/{id}/passenger-details",
            post(workflow::submit_passenger_details),
        )
        .route("/session/{id}/confirmation", get(workflow::confirmation))
        .route("/session/{id}/confirm", post(workflow::confirm));

    // Committed bookings
    let booking_routes = Router::new()
        .route("/", get(booking::search_bookings))
        .route("/{pnr}", get(booking::view_booking))
        .route("/{pnr}", put(booking::edit_booking))
        .route("/{pnr}", delete(booking::delete_booking));

    Router::new()
        .nest("/api/flights", flight_routes)
        .nest("/api/booking", workflow_routes)
        .nest("/api/bookings", booking_routes)
        .with_state(state)
}
