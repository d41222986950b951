//! Wire types for the clinic APIs.
//!
//! Requests carry raw strings; validation happens in `clinic-core` so every surface reports
//! the same input errors. Responses are built from core types through the `From` impls below.

use clinic_core::{Clinic, Confirmation, Doctor, Ledger, Request, User};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Error body returned with every non-2xx status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    /// Machine-readable code, e.g. `SlotTaken`, `NotFound`, `InvalidInput`.
    pub code: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateUserReq {
    pub name: String,
    pub login: String,
    pub birth: String,
}

/// Partial update; omitted fields are left unchanged.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserReq {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub birth: Option<String>,
}

impl From<UpdateUserReq> for clinic_core::UserUpdate {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            name: req.name,
            login: req.login,
            birth: req.birth,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LinkDoctorReq {
    pub doctor_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserRes {
    pub id: String,
    pub name: String,
    pub login: String,
    pub birth: String,
    pub doctor_ids: Vec<String>,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

impl From<User> for UserRes {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.into_string(),
            login: user.login.into_string(),
            birth: user.birth.into_string(),
            doctor_ids: user.doctor_ids.iter().map(|id| id.to_string()).collect(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListUsersRes {
    pub users: Vec<UserRes>,
}

// ---------------------------------------------------------------------------
// Doctors and clinics
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateDoctorReq {
    pub name: String,
    pub speciality: String,
    #[serde(default)]
    pub clinic_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DoctorRes {
    pub id: String,
    pub name: String,
    pub speciality: String,
    pub clinic_id: Option<String>,
    pub created_at: String,
}

impl From<Doctor> for DoctorRes {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id.to_string(),
            name: doctor.name.into_string(),
            speciality: doctor.speciality.into_string(),
            clinic_id: doctor.clinic_id.map(|id| id.to_string()),
            created_at: doctor.created_at.to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateClinicReq {
    pub name: String,
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClinicRes {
    pub id: String,
    pub name: String,
    pub address: String,
    pub created_at: String,
}

impl From<Clinic> for ClinicRes {
    fn from(clinic: Clinic) -> Self {
        Self {
            id: clinic.id.to_string(),
            name: clinic.name.into_string(),
            address: clinic.address.into_string(),
            created_at: clinic.created_at.to_rfc3339(),
        }
    }
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitRequestReq {
    pub date: String,
    pub time: String,
    pub user_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmitRequestRes {
    pub request_id: String,
}

/// One request or confirmation. For confirmations `id` is the originating request id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppointmentEntry {
    pub id: String,
    pub date: String,
    pub time: String,
    pub user_id: String,
}

impl From<Request> for AppointmentEntry {
    fn from(request: Request) -> Self {
        Self {
            id: request.request_id.to_string(),
            date: request.date.into_string(),
            time: request.time.into_string(),
            user_id: request.user_id.into_string(),
        }
    }
}

impl From<Confirmation> for AppointmentEntry {
    fn from(confirmation: Confirmation) -> Self {
        Self {
            id: confirmation.confirmation_id.to_string(),
            date: confirmation.date.into_string(),
            time: confirmation.time.into_string(),
            user_id: confirmation.user_id.into_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LedgerRes {
    pub doctor_id: String,
    /// Pending requests in arrival order.
    pub requests: Vec<AppointmentEntry>,
    /// Confirmed appointments in confirmation order.
    pub confirms: Vec<AppointmentEntry>,
}

impl From<Ledger> for LedgerRes {
    fn from(ledger: Ledger) -> Self {
        Self {
            doctor_id: ledger.doctor_id().to_string(),
            requests: ledger.requests().iter().cloned().map(Into::into).collect(),
            confirms: ledger.confirms().iter().cloned().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConfirmRes {
    pub confirmation: AppointmentEntry,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RejectRes {
    pub request: AppointmentEntry,
}
