//! Stored record types.
//!
//! Users, doctors and clinics are plain documents: one JSON object per record, keyed by a
//! canonical [`RecordId`]. Field names are the document's wire format and must stay stable.

use chrono::{DateTime, Utc};
use clinic_types::{NonEmptyText, RecordId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub name: NonEmptyText,
    pub login: NonEmptyText,
    pub birth: NonEmptyText,
    /// Doctors this user is registered with, in the order they were linked.
    #[serde(default)]
    pub doctor_ids: Vec<RecordId>,
    pub created_at: DateTime<Utc>,
}

/// Partial update of a [`User`]. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub login: Option<String>,
    pub birth: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.login.is_none() && self.birth.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: RecordId,
    pub name: NonEmptyText,
    pub speciality: NonEmptyText,
    #[serde(default)]
    pub clinic_id: Option<RecordId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clinic {
    pub id: RecordId,
    pub name: NonEmptyText,
    pub address: NonEmptyText,
    pub created_at: DateTime<Utc>,
}
