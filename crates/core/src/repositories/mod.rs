//! Repository services.
//!
//! Each service wraps the shared [`DocumentStore`](crate::store::DocumentStore) handle and
//! owns one kind of document: appointment ledgers, users, doctors or clinics.

pub mod appointments;
pub mod clinics;
pub mod doctors;
pub mod users;

pub(crate) mod shared;
