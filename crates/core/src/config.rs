//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Nothing below the binaries reads environment variables during request handling.

use crate::constants::{
    APPOINTMENTS_DIR_NAME, CLINICS_DIR_NAME, DEFAULT_DATA_DIR, DOCTORS_DIR_NAME, USERS_DIR_NAME,
};
use crate::{ClinicError, ClinicResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which [`DocumentStore`](crate::store::DocumentStore) implementation to open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    /// JSON documents under the data directory.
    File,
    /// Process-local maps; contents are lost on exit.
    Memory,
}

impl FromStr for StoreKind {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StoreKind::File),
            "memory" => Ok(StoreKind::Memory),
            other => Err(ClinicError::InvalidInput(format!(
                "unknown store kind '{other}' (expected 'file' or 'memory')"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    store_kind: StoreKind,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The data directory is only required to be non-empty here; the file store creates it
    /// on open.
    pub fn new(data_dir: PathBuf, store_kind: StoreKind) -> ClinicResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(ClinicError::InvalidInput(
                "data directory cannot be empty".into(),
            ));
        }

        Ok(Self {
            data_dir,
            store_kind,
        })
    }

    /// Build a config from raw (typically environment) values.
    ///
    /// Missing or blank values fall back to [`DEFAULT_DATA_DIR`] and [`StoreKind::File`].
    pub fn from_env_values(
        data_dir: Option<String>,
        store_kind: Option<String>,
    ) -> ClinicResult<Self> {
        let data_dir = data_dir
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.into());
        let store_kind = store_kind
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.parse::<StoreKind>())
            .transpose()?
            .unwrap_or(StoreKind::File);

        Self::new(PathBuf::from(data_dir), store_kind)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn store_kind(&self) -> StoreKind {
        self.store_kind
    }

    pub fn appointments_dir(&self) -> PathBuf {
        self.data_dir.join(APPOINTMENTS_DIR_NAME)
    }

    pub fn users_dir(&self) -> PathBuf {
        self.data_dir.join(USERS_DIR_NAME)
    }

    pub fn doctors_dir(&self) -> PathBuf {
        self.data_dir.join(DOCTORS_DIR_NAME)
    }

    pub fn clinics_dir(&self) -> PathBuf {
        self.data_dir.join(CLINICS_DIR_NAME)
    }
}
