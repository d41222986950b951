//! Constants used throughout the clinic core crate.
//!
//! Path and filename constants for the on-disk store live here so the layout is defined
//! in one place.

/// Default directory for the file store when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "clinic_data";

/// Directory holding one JSON document per doctor ledger.
pub const APPOINTMENTS_DIR_NAME: &str = "appointments";

/// Directory holding user records.
pub const USERS_DIR_NAME: &str = "users";

/// Directory holding doctor records.
pub const DOCTORS_DIR_NAME: &str = "doctors";

/// Directory holding clinic records.
pub const CLINICS_DIR_NAME: &str = "clinics";

/// Extension of every stored document.
pub const DOCUMENT_EXTENSION: &str = "json";

/// Suffix of the scratch file a document is written to before being renamed into place.
pub const TEMP_SUFFIX: &str = ".tmp";

/// How many fresh request ids are drawn before giving up on an id collision.
pub const MAX_REQUEST_ID_ATTEMPTS: usize = 3;
