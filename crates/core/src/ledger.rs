//! Appointment ledger state.
//!
//! A [`Ledger`] belongs to one doctor and holds two ordered sequences:
//!
//! - `requests`: pending [`Request`]s in arrival order
//! - `confirms`: [`Confirmation`]s in the order they were confirmed
//!
//! The methods here are pure transitions over an in-memory ledger. They never touch a store;
//! [`AppointmentService`](crate::repositories::appointments::AppointmentService) runs them
//! inside a store's atomic update so the check and the write are one unit.
//!
//! ## Invariants
//!
//! Across `requests ∪ confirms`:
//! - no two entries share a slot `(date, time)`
//! - no two entries share `(date, user_id)`
//! - request ids are unique; a confirmation reuses the id of the request it was promoted from
//!
//! Dates and times are opaque tokens. They are compared for equality only, with no calendar
//! arithmetic, overlap detection or timezone handling.

use clinic_types::{NonEmptyText, RequestId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A pending appointment request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub request_id: RequestId,
    pub date: NonEmptyText,
    pub time: NonEmptyText,
    pub user_id: NonEmptyText,
}

/// A confirmed appointment, promoted from a [`Request`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub confirmation_id: RequestId,
    pub date: NonEmptyText,
    pub time: NonEmptyText,
    pub user_id: NonEmptyText,
}

impl From<Request> for Confirmation {
    fn from(request: Request) -> Self {
        Self {
            confirmation_id: request.request_id,
            date: request.date,
            time: request.time,
            user_id: request.user_id,
        }
    }
}

/// Why a ledger refused a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conflict {
    /// The `(date, time)` slot is already requested or confirmed.
    SlotTaken,
    /// The user already holds a request or confirmation on that date.
    DuplicateUserDate,
    /// A freshly generated request id matched an existing entry.
    RequestIdInUse,
    /// No pending request carries the given id.
    UnknownRequest,
}

impl Conflict {
    /// The caller-facing rejection this conflict stands for, if any.
    pub fn rejection(self) -> Option<RejectionReason> {
        match self {
            Conflict::SlotTaken => Some(RejectionReason::SlotTaken),
            Conflict::DuplicateUserDate => Some(RejectionReason::DuplicateUserDate),
            Conflict::RequestIdInUse | Conflict::UnknownRequest => None,
        }
    }
}

/// Business reasons for refusing a new request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionReason {
    SlotTaken,
    DuplicateUserDate,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::SlotTaken => "SlotTaken",
            RejectionReason::DuplicateUserDate => "DuplicateUserDate",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(id, date, time, user_id)` view over a request or confirmation.
type Entry<'a> = (
    &'a RequestId,
    &'a NonEmptyText,
    &'a NonEmptyText,
    &'a NonEmptyText,
);

/// Per-doctor appointment ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    doctor_id: NonEmptyText,
    #[serde(default)]
    requests: Vec<Request>,
    #[serde(default)]
    confirms: Vec<Confirmation>,
}

impl Ledger {
    /// A ledger with no requests or confirmations.
    pub fn empty(doctor_id: NonEmptyText) -> Self {
        Self {
            doctor_id,
            requests: Vec::new(),
            confirms: Vec::new(),
        }
    }

    pub fn doctor_id(&self) -> &NonEmptyText {
        &self.doctor_id
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn confirms(&self) -> &[Confirmation] {
        &self.confirms
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.confirms.is_empty()
    }

    /// `(id, date, time, user_id)` of every request and confirmation.
    fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        let requests = self
            .requests
            .iter()
            .map(|r| (&r.request_id, &r.date, &r.time, &r.user_id));
        let confirms = self
            .confirms
            .iter()
            .map(|c| (&c.confirmation_id, &c.date, &c.time, &c.user_id));
        requests.chain(confirms)
    }

    /// Checks whether `request` may be appended.
    ///
    /// A taken slot is reported ahead of a same-day booking by the same user, so a user
    /// re-requesting their own slot sees `SlotTaken`.
    pub fn admit(&self, request: &Request) -> Result<(), Conflict> {
        if self
            .entries()
            .any(|(_, date, time, _)| *date == request.date && *time == request.time)
        {
            return Err(Conflict::SlotTaken);
        }
        if self
            .entries()
            .any(|(_, date, _, user)| *date == request.date && *user == request.user_id)
        {
            return Err(Conflict::DuplicateUserDate);
        }
        if self.entries().any(|(id, ..)| *id == request.request_id) {
            return Err(Conflict::RequestIdInUse);
        }
        Ok(())
    }

    /// Appends a request without checking it; callers run [`Ledger::admit`] first.
    pub fn push_request(&mut self, request: Request) {
        self.requests.push(request);
    }

    pub fn find_request(&self, request_id: &str) -> Option<&Request> {
        self.requests
            .iter()
            .find(|r| r.request_id.as_str() == request_id)
    }

    /// Fails with [`Conflict::UnknownRequest`] unless a pending request has this id.
    pub fn require_request(&self, request_id: &str) -> Result<(), Conflict> {
        self.find_request(request_id)
            .map(|_| ())
            .ok_or(Conflict::UnknownRequest)
    }

    /// Moves a pending request to the end of `confirms`.
    ///
    /// Returns `None` and leaves the ledger untouched if no request has this id.
    pub fn promote(&mut self, request_id: &str) -> Option<Confirmation> {
        let request = self.withdraw(request_id)?;
        let confirmation = Confirmation::from(request);
        self.confirms.push(confirmation.clone());
        Some(confirmation)
    }

    /// Removes a pending request, preserving the order of the rest.
    pub fn withdraw(&mut self, request_id: &str) -> Option<Request> {
        let index = self
            .requests
            .iter()
            .position(|r| r.request_id.as_str() == request_id)?;
        Some(self.requests.remove(index))
    }
}
