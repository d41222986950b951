use clinic_types::{IdError, TextError};

/// Failures raised by a [`DocumentStore`](crate::store::DocumentStore) implementation.
///
/// Every variant means the store could not complete the call. None of them describes a
/// business outcome; those travel as typed results instead.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create store directory: {0}")]
    DirCreation(std::io::Error),
    #[error("failed to read document: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write document: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialise document: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialise document {}: {source}", .path.display())]
    Deserialization {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("store lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("document store unavailable: {0}")]
    StoreUnavailable(StoreError),
    /// The store holds a document it cannot decode, or its state can no longer be trusted.
    /// Retrying hits the same document again.
    #[error("document store corrupt: {0}")]
    StoreCorrupt(StoreError),
    #[error("failed to encode record: {0}")]
    RecordEncode(serde_json::Error),
    #[error("failed to decode record: {0}")]
    RecordDecode(serde_json::Error),
    #[error("could not allocate an unused request id after {0} attempts")]
    RequestIdAllocation(usize),
}

impl ClinicError {
    /// Whether the whole operation may be retried by the caller.
    ///
    /// Only I/O failures are treated as transient; a corrupt document or a poisoned lock is not. Ledger operations re-check
    /// their preconditions inside the atomic update, so a retry after an unobserved success
    /// comes back as a rejection or `NotFound` rather than a duplicate write.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClinicError::StoreUnavailable(_))
    }
}

impl From<StoreError> for ClinicError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DirCreation(_) | StoreError::FileRead(_) | StoreError::FileWrite(_) => {
                ClinicError::StoreUnavailable(err)
            }
            StoreError::Serialization(_)
            | StoreError::Deserialization { .. }
            | StoreError::LockPoisoned => ClinicError::StoreCorrupt(err),
        }
    }
}

impl From<TextError> for ClinicError {
    fn from(err: TextError) -> Self {
        ClinicError::InvalidInput(err.to_string())
    }
}

impl From<IdError> for ClinicError {
    fn from(err: IdError) -> Self {
        ClinicError::InvalidInput(err.to_string())
    }
}

pub type ClinicResult<T> = std::result::Result<T, ClinicError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
