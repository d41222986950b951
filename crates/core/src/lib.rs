//! # Clinic Core
//!
//! Core business logic for the clinic scheduling system.
//!
//! This crate contains pure data operations:
//! - The per-doctor appointment ledger and its request / confirm / reject workflow
//! - User, doctor and clinic records
//! - The [`DocumentStore`](store::DocumentStore) abstraction with in-memory and file-backed
//!   implementations
//!
//! **No API concerns**: HTTP servers, DTOs and command-line handling belong in
//! `clinic-api-rest`, `clinic-api-shared` and `clinic-cli`.
//!
//! ## Usage
//!
//! Resolve a [`CoreConfig`] at startup, open the store once, and hand the shared handle to
//! each service:
//!
//! ```no_run
//! use clinic_core::{open_store, AppointmentService, CoreConfig, StoreKind};
//!
//! let cfg = CoreConfig::new("clinic_data".into(), StoreKind::File)?;
//! let store = open_store(&cfg)?;
//! let appointments = AppointmentService::new(store);
//! let outcome = appointments.submit_request("doctor-1", "2024-06-01", "10:00", "user-1")?;
//! # Ok::<(), clinic_core::ClinicError>(())
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod records;
pub mod repositories;
pub mod store;

pub use clinic_types::{IdError, NonEmptyText, RecordId, RequestId, TextError};
pub use config::{CoreConfig, StoreKind};
pub use constants::DEFAULT_DATA_DIR;
pub use error::{ClinicError, ClinicResult, StoreError, StoreResult};
pub use ledger::{Confirmation, Ledger, RejectionReason, Request};
pub use records::{Clinic, Doctor, User, UserUpdate};
pub use repositories::appointments::{
    AppointmentService, ConfirmOutcome, RejectOutcome, RequestOutcome,
};
pub use repositories::clinics::ClinicService;
pub use repositories::doctors::DoctorService;
pub use repositories::users::UserService;
pub use store::{open_store, DocumentStore};
