//! # Clinic Types
//!
//! Validated value types shared by the clinic crates.
//!
//! Contains:
//! - [`NonEmptyText`] for free-text fields that must carry content (names, dates, times)
//! - [`RecordId`] for user, doctor and clinic documents
//! - [`RequestId`] for appointment requests and the confirmations promoted from them
//!
//! Constructors validate once; holders of these types can rely on the invariant afterwards.

mod ids;
mod text;

pub use ids::{IdError, RecordId, RequestId, REQUEST_ID_LEN};
pub use text::{NonEmptyText, TextError};
