use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::passenger::PaxType;
use crate::entities::{booking, flight, passenger, transaction};
use crate::error::{AppError, AppResult, FieldError};
use crate::inventory;
use crate::pricing::{self, FareQuote};
use crate::session::{BookingSession, Message, SessionStep, Severity, TripData};
use crate::utils::{pnr, times};
use crate::validation::{self, PassengerForm, TripContext};
use crate::AppState;

// ============ Trip Selection ============

#[derive(Debug, Deserialize)]
pub struct TripSelectionRequest {
    pub flight_from: String,
    pub flight_to: String,
    #[serde(default)]
    pub return_flight: bool,
    pub outbound_date: NaiveDate,
    pub outbound_flightno: String,
    #[serde(default)]
    pub inbound_date: Option<NaiveDate>,
    #[serde(default)]
    pub inbound_flightno: Option<String>,
    #[serde(default = "default_cabin_class")]
    pub cabin_class: String,
    pub number_of_adults: u16,
    #[serde(default)]
    pub number_of_children: u16,
    #[serde(default)]
    pub number_of_infants: u16,
    #[serde(default)]
    pub number_of_bags: u16,
}

fn default_cabin_class() -> String {
    "Y".to_string()
}

/// Formset shape for the passenger details step, derived from the counts
/// fixed at trip selection.
#[derive(Debug, Serialize)]
pub struct FormsetShape {
    pub adults: u16,
    pub children: u16,
    pub infants: u16,
}

impl FormsetShape {
    fn of(trip: &TripData) -> Self {
        Self {
            adults: trip.adults,
            children: trip.children,
            infants: trip.infants,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionStepResponse {
    pub session_id: Uuid,
    pub step: SessionStep,
    pub formset: FormsetShape,
    pub messages: Vec<Message>,
}

/// Start the booking workflow: validate the trip and check availability
/// on every leg, then open a session at the passenger details step.
pub async fn trip_selection(
    State(state): State<AppState>,
    Json(payload): Json<TripSelectionRequest>,
) -> AppResult<Json<SessionStepResponse>> {
    let today = Utc::now().date_naive();
    let flight_from = payload.flight_from.trim().to_uppercase();
    let flight_to = payload.flight_to.trim().to_uppercase();
    let outbound_no = payload.outbound_flightno.trim().to_uppercase();
    let inbound_no = payload
        .inbound_flightno
        .as_deref()
        .map(|n| n.trim().to_uppercase())
        .filter(|n| !n.is_empty());

    let mut errors = Vec::new();

    if !valid_airport_code(&flight_from) {
        errors.push(FieldError::new("flight_from", "Airport code must be three letters"));
    }
    if !valid_airport_code(&flight_to) {
        errors.push(FieldError::new("flight_to", "Airport code must be three letters"));
    } else if flight_from == flight_to {
        errors.push(FieldError::new(
            "flight_to",
            "Origin and destination must be different",
        ));
    }
    if payload.number_of_adults == 0 {
        errors.push(FieldError::new(
            "number_of_adults",
            "At least one adult is required",
        ));
    }
    if payload.outbound_date < today {
        errors.push(FieldError::new(
            "outbound_date",
            "Departure date cannot be in the past",
        ));
    }
    if outbound_no.is_empty() {
        errors.push(FieldError::new("outbound_flightno", "Flight number is required"));
    }
    if payload.return_flight {
        match payload.inbound_date {
            None => errors.push(FieldError::new(
                "inbound_date",
                "Return date is required for a round trip",
            )),
            Some(inbound) if inbound < payload.outbound_date => {
                errors.push(FieldError::new(
                    "inbound_date",
                    "Return date cannot be before the departure date",
                ));
            }
            Some(_) => {}
        }
        if inbound_no.is_none() {
            errors.push(FieldError::new(
                "inbound_flightno",
                "Return flight number is required for a round trip",
            ));
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // Resolve each leg against the flight schedule.
    let outbound = match resolve_leg(&state, &outbound_no, &flight_from, &flight_to, true).await? {
        Ok(f) => Some(f),
        Err(e) => {
            errors.push(e);
            None
        }
    };
    let mut inbound = None;
    if payload.return_flight {
        if let Some(no) = &inbound_no {
            match resolve_leg(&state, no, &flight_to, &flight_from, false).await? {
                Ok(f) => inbound = Some(f),
                Err(e) => errors.push(e),
            }
        }
    }

    // Same-day round trips need a workable connection on the ground.
    if let (Some(ob), Some(ib)) = (&outbound, &inbound) {
        if payload.inbound_date == Some(payload.outbound_date) {
            let gap = times::parse_hhmm(&ob.flight_sta)
                .zip(times::parse_hhmm(&ib.flight_std))
                .map(|(arr, dep)| times::connection_gap_minutes(arr, dep));
            match gap {
                Some(gap) if gap < times::MIN_CONNECTION_MINUTES => {
                    errors.push(FieldError::new(
                        "inbound_flightno",
                        format!(
                            "A same-day return needs at least {} minutes between arrival and departure",
                            times::MIN_CONNECTION_MINUTES
                        ),
                    ));
                }
                Some(_) => {}
                None => {
                    return Err(AppError::Internal(format!(
                        "Unparsable scheduled times on {} or {}",
                        ob.flight_number, ib.flight_number
                    )));
                }
            }
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    let Some(outbound) = outbound else {
        return Err(AppError::Internal("Outbound leg unresolved".to_string()));
    };

    // Availability on every leg; seats are only reserved at final commit.
    let seats = payload.number_of_adults as usize
        + payload.number_of_children as usize
        + payload.number_of_infants as usize;
    if !inventory::check_availability(&state.db, &outbound, payload.outbound_date, seats).await? {
        return Err(AppError::InsufficientCapacity(format!(
            "Not enough seats on {} {}",
            outbound.flight_number, payload.outbound_date
        )));
    }
    if let (Some(ib), Some(date)) = (&inbound, payload.inbound_date) {
        if !inventory::check_availability(&state.db, ib, date, seats).await? {
            return Err(AppError::InsufficientCapacity(format!(
                "Not enough seats on {} {}",
                ib.flight_number, date
            )));
        }
    }

    let trip = TripData {
        flight_from,
        flight_to,
        return_flight: payload.return_flight,
        outbound_date: payload.outbound_date,
        outbound_flightno: outbound.flight_number.clone(),
        inbound_date: if payload.return_flight {
            payload.inbound_date
        } else {
            None
        },
        inbound_flightno: if payload.return_flight { inbound_no } else { None },
        cabin_class: payload.cabin_class.trim().to_uppercase(),
        adults: payload.number_of_adults,
        children: payload.number_of_children,
        infants: payload.number_of_infants,
        bags: payload.number_of_bags,
    };

    state.sessions.purge_expired(state.config.session_ttl_minutes);
    let mut session = BookingSession::new(trip);
    tracing::info!(session_id = %session.id, "Booking session opened");

    let response = SessionStepResponse {
        session_id: session.id,
        step: session.step,
        formset: FormsetShape::of(&session.trip),
        messages: session.take_messages(),
    };
    state.sessions.insert(session);
    Ok(Json(response))
}

fn valid_airport_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// Look a leg's flight number up and check it fits the requested route and
/// direction. A mismatch is a field error on the flight-number input.
async fn resolve_leg(
    state: &AppState,
    flightno: &str,
    from: &str,
    to: &str,
    outbound: bool,
) -> AppResult<Result<flight::Model, FieldError>> {
    let field = if outbound {
        "outbound_flightno"
    } else {
        "inbound_flightno"
    };
    let Some(found) = flight::Entity::find_by_id(flightno.to_owned())
        .one(&state.db)
        .await?
    else {
        return Ok(Err(FieldError::new(field, format!("Unknown flight {}", flightno))));
    };
    if found.outbound != outbound {
        return Ok(Err(FieldError::new(
            field,
            format!("Flight {} operates in the other direction", flightno),
        )));
    }
    if found.flight_from != from || found.flight_to != to {
        return Ok(Err(FieldError::new(
            field,
            format!("Flight {} does not serve {}-{}", flightno, from, to),
        )));
    }
    Ok(Ok(found))
}

// ============ Session steps ============

#[derive(Debug, Serialize)]
pub struct SessionOverviewResponse {
    pub session_id: Uuid,
    pub step: SessionStep,
    pub trip: TripData,
    pub formset: FormsetShape,
    pub pnr: Option<String>,
    pub fees: Option<FareQuote>,
    pub messages: Vec<Message>,
}

pub async fn session_overview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionOverviewResponse>> {
    let mut session = load_session(&state, id)?;
    let response = SessionOverviewResponse {
        session_id: session.id,
        step: session.step,
        trip: session.trip.clone(),
        formset: FormsetShape::of(&session.trip),
        pnr: session.pnr.clone(),
        fees: session.fees.clone(),
        messages: session.take_messages(),
    };
    state.sessions.insert(session);
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub struct PassengerDetailsFormResponse {
    pub session_id: Uuid,
    pub formset: FormsetShape,
    pub adults: Vec<PassengerForm>,
    pub children: Vec<PassengerForm>,
    pub infants: Vec<PassengerForm>,
    pub remarks: String,
    pub messages: Vec<Message>,
}

/// Re-render the passenger formsets. Safe to hit again after navigating
/// back from confirmation; the structure always comes from the counts
/// fixed at trip selection.
pub async fn passenger_details_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PassengerDetailsFormResponse>> {
    let mut session = load_session(&state, id)?;
    session.expect_one_of(&[SessionStep::PassengerDetails, SessionStep::Confirmation])?;

    let pad = |forms: &[PassengerForm], count: u16| -> Vec<PassengerForm> {
        let mut forms = forms.to_vec();
        forms.resize_with(count as usize, PassengerForm::default);
        forms
    };

    let response = PassengerDetailsFormResponse {
        session_id: session.id,
        formset: FormsetShape::of(&session.trip),
        adults: pad(&session.adults, session.trip.adults),
        children: pad(&session.children, session.trip.children),
        infants: pad(&session.infants, session.trip.infants),
        remarks: session.remarks.clone(),
        messages: session.take_messages(),
    };
    state.sessions.insert(session);
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct PassengerDetailsRequest {
    #[serde(default)]
    pub adults: Vec<PassengerForm>,
    #[serde(default)]
    pub children: Vec<PassengerForm>,
    #[serde(default)]
    pub infants: Vec<PassengerForm>,
    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Serialize)]
pub struct ConfirmationResponse {
    pub session_id: Uuid,
    pub step: SessionStep,
    pub trip: TripData,
    pub adults: Vec<PassengerForm>,
    pub children: Vec<PassengerForm>,
    pub infants: Vec<PassengerForm>,
    pub remarks: String,
    pub pnr: String,
    pub fees: FareQuote,
    pub messages: Vec<Message>,
}

/// Validate all three passenger groups; on success price the booking,
/// mint a reference and advance to confirmation.
pub async fn submit_passenger_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PassengerDetailsRequest>,
) -> AppResult<Json<ConfirmationResponse>> {
    let mut session = load_session(&state, id)?;
    // Resubmission after navigating back from confirmation is allowed.
    session.expect_one_of(&[SessionStep::PassengerDetails, SessionStep::Confirmation])?;

    let trip = &session.trip;
    for (submitted, expected, group) in [
        (payload.adults.len(), trip.adults as usize, "adults"),
        (payload.children.len(), trip.children as usize, "children"),
        (payload.infants.len(), trip.infants as usize, "infants"),
    ] {
        if submitted != expected {
            return Err(AppError::SessionState(format!(
                "Expected {} {} forms, got {}",
                expected, group, submitted
            )));
        }
    }

    let ctx = TripContext {
        today: Utc::now().date_naive(),
        departure: trip.outbound_date,
        return_date: if trip.return_flight {
            trip.inbound_date
        } else {
            None
        },
    };

    let adult_count = trip.adults;
    let mut errors = validation::validate_formset(&payload.adults, PaxType::Adult, 1, &ctx);
    errors.extend(validation::validate_formset(
        &payload.children,
        PaxType::Child,
        adult_count + 1,
        &ctx,
    ));
    errors.extend(validation::validate_formset(
        &payload.infants,
        PaxType::Infant,
        adult_count + trip.children + 1,
        &ctx,
    ));
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let fees = pricing::quote(
        trip.adults as u32,
        trip.children as u32,
        trip.infants as u32,
        trip.bags as u32,
    );
    let reference = match session.pnr.clone() {
        Some(existing) => existing,
        None => pnr::generate(&state.db).await?,
    };

    session.adults = payload.adults;
    session.children = payload.children;
    session.infants = payload.infants;
    session.remarks = payload.remarks.trim().to_string();
    session.fees = Some(fees.clone());
    session.pnr = Some(reference.clone());
    session.step = SessionStep::Confirmation;

    let response = ConfirmationResponse {
        session_id: session.id,
        step: session.step,
        trip: session.trip.clone(),
        adults: session.adults.clone(),
        children: session.children.clone(),
        infants: session.infants.clone(),
        remarks: session.remarks.clone(),
        pnr: reference,
        fees,
        messages: session.take_messages(),
    };
    state.sessions.insert(session);
    Ok(Json(response))
}

pub async fn confirmation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ConfirmationResponse>> {
    let mut session = load_session(&state, id)?;
    session.expect_step(SessionStep::Confirmation)?;

    let (pnr_code, fees) = session_quote(&session)?;
    let response = ConfirmationResponse {
        session_id: session.id,
        step: session.step,
        trip: session.trip.clone(),
        adults: session.adults.clone(),
        children: session.children.clone(),
        infants: session.infants.clone(),
        remarks: session.remarks.clone(),
        pnr: pnr_code,
        fees,
        messages: session.take_messages(),
    };
    state.sessions.insert(session);
    Ok(Json(response))
}

// ============ Commit ============

#[derive(Debug, Serialize)]
pub struct CommittedResponse {
    pub session_id: Uuid,
    pub step: SessionStep,
    pub booking_id: i32,
    pub pnr: String,
    pub total: rust_decimal::Decimal,
}

/// Finalize the booking: one booking row, one passenger row per traveler,
/// one transaction row and the seat allocation, all in a single database
/// transaction. A late capacity failure rolls everything back and returns
/// the session to passenger details.
pub async fn confirm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CommittedResponse>> {
    let mut session = load_session(&state, id)?;
    session.expect_step(SessionStep::Confirmation)?;
    let (pnr_code, fees) = session_quote(&session)?;

    let trip = session.trip.clone();
    let outbound = flight::Entity::find_by_id(trip.outbound_flightno.clone())
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Flight {} not found", trip.outbound_flightno))
        })?;
    let inbound = match (&trip.inbound_flightno, trip.return_flight) {
        (Some(no), true) => Some(
            flight::Entity::find_by_id(no.clone())
                .one(&state.db)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Flight {} not found", no)))?,
        ),
        _ => None,
    };

    let mut markers = Vec::with_capacity(trip.seats_requested());
    markers.extend(std::iter::repeat(PaxType::Adult.seat_marker()).take(trip.adults as usize));
    markers.extend(std::iter::repeat(PaxType::Child.seat_marker()).take(trip.children as usize));
    markers.extend(std::iter::repeat(PaxType::Infant.seat_marker()).take(trip.infants as usize));

    let txn = state.db.begin().await?;

    // Inventory may have moved since the availability check at trip
    // selection; a failure here sends the user back one step.
    let seats = match inventory::allocate(&txn, &outbound, trip.outbound_date, &markers).await {
        Ok(seats) => seats,
        Err(err @ AppError::InsufficientCapacity(_)) => {
            txn.rollback().await?;
            return Err(back_to_details(&state, session, err));
        }
        Err(err) => {
            txn.rollback().await?;
            return Err(err);
        }
    };
    if let (Some(ib), Some(date)) = (&inbound, trip.inbound_date) {
        if !inventory::check_availability(&txn, ib, date, markers.len()).await? {
            txn.rollback().await?;
            let err = AppError::InsufficientCapacity(format!(
                "Not enough seats on {} {}",
                ib.flight_number, date
            ));
            return Err(back_to_details(&state, session, err));
        }
    }

    let now = Utc::now();
    let booking_row = booking::ActiveModel {
        pnr: Set(pnr_code.clone()),
        flight_from: Set(trip.flight_from.clone()),
        flight_to: Set(trip.flight_to.clone()),
        return_flight: Set(trip.return_flight),
        outbound_date: Set(trip.outbound_date),
        outbound_flightno: Set(trip.outbound_flightno.clone()),
        inbound_date: Set(trip.inbound_date),
        inbound_flightno: Set(trip.inbound_flightno.clone().unwrap_or_default()),
        fare_quote: Set(fees.total),
        ticket_class: Set(trip.cabin_class.clone()),
        cabin_class: Set(trip.cabin_class.clone()),
        number_of_adults: Set(trip.adults as i16),
        number_of_children: Set(trip.children as i16),
        number_of_infants: Set(trip.infants as i16),
        number_of_bags: Set(trip.bags as i16),
        departure_time: Set(outbound.flight_std.clone()),
        arrival_time: Set(outbound.flight_sta.clone()),
        remarks: Set(session.remarks.clone()),
        created_at: Set(now.into()),
        amended_at: Set(now.into()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let groups = [
        (&session.adults, PaxType::Adult),
        (&session.children, PaxType::Child),
        (&session.infants, PaxType::Infant),
    ];
    let mut sequence: i16 = 0;
    let mut seat_numbers = seats.iter();
    for (forms, pax_type) in groups {
        for form in forms.iter() {
            sequence += 1;
            let seat = seat_numbers
                .next()
                .copied()
                .ok_or_else(|| AppError::Internal("Seat assignment ran short".to_string()))?;
            passenger::ActiveModel {
                booking_id: Set(booking_row.id),
                title: Set(form.title.trim().to_string()),
                first_name: Set(form.first_name.trim().to_string()),
                last_name: Set(form.last_name.trim().to_string()),
                pax_type: Set(pax_type),
                pax_number: Set(sequence),
                date_of_birth: Set(form.parsed_date_of_birth()),
                contact_number: Set(form.contact_number.trim().to_string()),
                contact_email: Set(form.contact_email.trim().to_string()),
                seat_number: Set(seat as i16),
                status: Set("HK".to_string()),
                wheelchair_ssr: Set(form.wheelchair_ssr.trim().to_string()),
                wheelchair_type: Set(form.wheelchair_type.trim().to_string()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    transaction::ActiveModel {
        pnr: Set(pnr_code.clone()),
        amount: Set(fees.total),
        date_created: Set(now.date_naive()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    tracing::info!(pnr = %pnr_code, booking_id = booking_row.id, "Booking committed");

    session.step = SessionStep::Committed;
    let response = CommittedResponse {
        session_id: session.id,
        step: session.step,
        booking_id: booking_row.id,
        pnr: pnr_code,
        total: fees.total,
    };
    state.sessions.insert(session);
    Ok(Json(response))
}

/// Discard an in-progress session with no persistence side effects.
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let session = load_session(&state, id)?;
    if !session.step.can_cancel() {
        return Err(AppError::SessionState(format!(
            "A {} session cannot be cancelled",
            session.step
        )));
    }
    state.sessions.remove(id);
    tracing::info!(session_id = %id, "Booking session cancelled");
    Ok(Json(serde_json::json!({ "message": "Booking session cancelled" })))
}

fn load_session(state: &AppState, id: Uuid) -> AppResult<BookingSession> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| AppError::NotFound("Booking session not found or expired".to_string()))
}

/// The confirmation step always carries a quote and a reference; their
/// absence means the session was corrupted.
fn session_quote(session: &BookingSession) -> AppResult<(String, FareQuote)> {
    let pnr_code = session
        .pnr
        .clone()
        .ok_or_else(|| AppError::SessionState("Session has no booking reference".to_string()))?;
    let fees = session
        .fees
        .clone()
        .ok_or_else(|| AppError::SessionState("Session has no fare quote".to_string()))?;
    Ok((pnr_code, fees))
}

fn back_to_details(state: &AppState, mut session: BookingSession, err: AppError) -> AppError {
    session.step = SessionStep::PassengerDetails;
    session.push_message(
        Severity::Warning,
        "Seat availability changed while confirming; please review and resubmit",
    );
    state.sessions.insert(session);
    err
}
