//! Identifier types.
//!
//! Two kinds of identifier exist:
//!
//! - [`RecordId`]: a UUIDv4 in canonical form (32 lowercase hex characters, no hyphens), used
//!   as the key of user, doctor and clinic documents.
//! - [`RequestId`]: a 24-character token drawn from `[A-Za-z0-9]` using the operating system's
//!   CSPRNG. Request ids are handed to patients and doctors, so they must not be guessable.
//!   A confirmation keeps the id of the request it was promoted from.

use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Length of every generated [`RequestId`].
pub const REQUEST_ID_LEN: usize = 24;

/// Error type for identifier parsing.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("record id must be 32 lowercase hex characters without hyphens, got: '{0}'")]
    NonCanonicalRecordId(String),
    #[error("request id must be 24 ASCII alphanumeric characters, got: '{0}'")]
    MalformedRequestId(String),
}

/// Canonical UUID key for stored records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generates a fresh random record id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an externally supplied id.
    ///
    /// Only the canonical form is accepted; hyphenated or uppercase UUIDs are rejected rather
    /// than normalised, so one record can never be reachable under two spellings.
    pub fn parse(input: &str) -> Result<Self, IdError> {
        if !Self::is_canonical(input) {
            return Err(IdError::NonCanonicalRecordId(input.to_owned()));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|_| IdError::NonCanonicalRecordId(input.to_owned()))
    }

    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordId::parse(s)
    }
}

impl serde::Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Opaque identifier of an appointment request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Draws a new id from the OS random source.
    pub fn generate() -> Self {
        let token: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(REQUEST_ID_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    /// Validates a stored or supplied id.
    pub fn parse(input: &str) -> Result<Self, IdError> {
        if input.len() == REQUEST_ID_LEN && input.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Ok(Self(input.to_owned()))
        } else {
            Err(IdError::MalformedRequestId(input.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RequestId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestId::parse(s)
    }
}

impl serde::Serialize for RequestId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for RequestId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RequestId::parse(&s).map_err(serde::de::Error::custom)
    }
}
