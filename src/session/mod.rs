//! Server-held booking workflow state, keyed by session id. Every step of
//! the multi-page flow is reconstructable from the session value alone.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::pricing::FareQuote;
use crate::validation::PassengerForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStep {
    TripSelection,
    PassengerDetails,
    Confirmation,
    Committed,
    Cancelled,
}

impl SessionStep {
    /// Cancellation is only meaningful while the booking is in progress.
    pub fn can_cancel(self) -> bool {
        matches!(self, SessionStep::PassengerDetails | SessionStep::Confirmation)
    }
}

impl std::fmt::Display for SessionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionStep::TripSelection => "trip selection",
            SessionStep::PassengerDetails => "passenger details",
            SessionStep::Confirmation => "confirmation",
            SessionStep::Committed => "committed",
            SessionStep::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// End-user-facing notice queued on the session and delivered with the
/// next rendered step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub severity: Severity,
    pub text: String,
}

/// The trip as fixed at the first workflow step. The traveler counts here
/// size the passenger formsets for the rest of the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripData {
    pub flight_from: String,
    pub flight_to: String,
    pub return_flight: bool,
    pub outbound_date: NaiveDate,
    pub outbound_flightno: String,
    pub inbound_date: Option<NaiveDate>,
    pub inbound_flightno: Option<String>,
    pub cabin_class: String,
    pub adults: u16,
    pub children: u16,
    pub infants: u16,
    pub bags: u16,
}

impl TripData {
    pub fn seats_requested(&self) -> usize {
        self.adults as usize + self.children as usize + self.infants as usize
    }
}

#[derive(Debug, Clone)]
pub struct BookingSession {
    pub id: Uuid,
    pub step: SessionStep,
    pub trip: TripData,
    pub adults: Vec<PassengerForm>,
    pub children: Vec<PassengerForm>,
    pub infants: Vec<PassengerForm>,
    pub remarks: String,
    pub fees: Option<FareQuote>,
    pub pnr: Option<String>,
    messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl BookingSession {
    /// A session is created once trip selection has passed, so it starts
    /// at the passenger details step.
    pub fn new(trip: TripData) -> Self {
        Self {
            id: Uuid::new_v4(),
            step: SessionStep::PassengerDetails,
            trip,
            adults: Vec::new(),
            children: Vec::new(),
            infants: Vec::new(),
            remarks: String::new(),
            fees: None,
            pnr: None,
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn expect_step(&self, expected: SessionStep) -> AppResult<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(AppError::SessionState(format!(
                "Booking session is at the {} step, not {}",
                self.step, expected
            )))
        }
    }

    pub fn expect_one_of(&self, expected: &[SessionStep]) -> AppResult<()> {
        if expected.contains(&self.step) {
            Ok(())
        } else {
            Err(AppError::SessionState(format!(
                "Booking session is at the {} step",
                self.step
            )))
        }
    }

    pub fn push_message(&mut self, severity: Severity, text: impl Into<String>) {
        self.messages.push(Message {
            severity,
            text: text.into(),
        });
    }

    /// Drain queued notices for delivery with the current response.
    pub fn take_messages(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    fn expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.created_at > ttl
    }
}

/// In-memory session store shared across requests via `AppState`.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, BookingSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: BookingSession) {
        self.inner
            .write()
            .expect("session store lock poisoned")
            .insert(session.id, session);
    }

    pub fn get(&self, id: Uuid) -> Option<BookingSession> {
        self.inner
            .read()
            .expect("session store lock poisoned")
            .get(&id)
            .cloned()
    }

    pub fn remove(&self, id: Uuid) -> Option<BookingSession> {
        self.inner
            .write()
            .expect("session store lock poisoned")
            .remove(&id)
    }

    /// Drop sessions older than the configured TTL. Abandoned sessions
    /// hold no inventory, so expiry is purely a memory concern.
    pub fn purge_expired(&self, ttl_minutes: i64) {
        let ttl = Duration::minutes(ttl_minutes);
        let now = Utc::now();
        self.inner
            .write()
            .expect("session store lock poisoned")
            .retain(|_, s| !s.expired(ttl, now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip() -> TripData {
        TripData {
            flight_from: "LGW".to_string(),
            flight_to: "JER".to_string(),
            return_flight: false,
            outbound_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            outbound_flightno: "FB101".to_string(),
            inbound_date: None,
            inbound_flightno: None,
            cabin_class: "Y".to_string(),
            adults: 2,
            children: 1,
            infants: 0,
            bags: 2,
        }
    }

    #[test]
    fn test_new_session_starts_at_passenger_details() {
        let session = BookingSession::new(trip());
        assert_eq!(session.step, SessionStep::PassengerDetails);
        assert!(session.expect_step(SessionStep::PassengerDetails).is_ok());
        assert!(session.expect_step(SessionStep::Confirmation).is_err());
    }

    #[test]
    fn test_cancellable_steps() {
        assert!(SessionStep::PassengerDetails.can_cancel());
        assert!(SessionStep::Confirmation.can_cancel());
        assert!(!SessionStep::Committed.can_cancel());
        assert!(!SessionStep::Cancelled.can_cancel());
    }

    #[test]
    fn test_messages_are_drained_once() {
        let mut session = BookingSession::new(trip());
        session.push_message(Severity::Warning, "Seat availability changed");
        assert_eq!(session.take_messages().len(), 1);
        assert!(session.take_messages().is_empty());
    }

    #[test]
    fn test_store_round_trip_and_remove() {
        let store = SessionStore::new();
        let session = BookingSession::new(trip());
        let id = session.id;
        store.insert(session);

        assert_eq!(store.get(id).map(|s| s.trip.adults), Some(2));
        assert!(store.remove(id).is_some());
        assert!(store.get(id).is_none());
    }

    #[test]
    fn test_purge_expired_keeps_fresh_sessions() {
        let store = SessionStore::new();
        let mut old = BookingSession::new(trip());
        old.created_at = Utc::now() - Duration::minutes(90);
        let old_id = old.id;
        let fresh = BookingSession::new(trip());
        let fresh_id = fresh.id;
        store.insert(old);
        store.insert(fresh);

        store.purge_expired(30);
        assert!(store.get(old_id).is_none());
        assert!(store.get(fresh_id).is_some());
    }
}
