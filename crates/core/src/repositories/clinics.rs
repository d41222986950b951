//! Clinic records.

use crate::error::ClinicResult;
use crate::records::Clinic;
use crate::repositories::shared::{self, record_id, required};
use crate::store::{Collection, DocumentStore};
use chrono::Utc;
use clinic_types::RecordId;
use std::sync::Arc;

#[derive(Clone)]
pub struct ClinicService {
    store: Arc<dyn DocumentStore>,
}

impl ClinicService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn add_clinic(&self, name: &str, address: &str) -> ClinicResult<Clinic> {
        let clinic = Clinic {
            id: RecordId::new(),
            name: required("name", name)?,
            address: required("address", address)?,
            created_at: Utc::now(),
        };

        shared::insert(self.store.as_ref(), Collection::Clinics, clinic.id, &clinic)?;
        tracing::info!("created clinic {}", clinic.id);
        Ok(clinic)
    }

    pub fn get_clinic(&self, id: &str) -> ClinicResult<Option<Clinic>> {
        let id = record_id(id)?;
        shared::find(self.store.as_ref(), Collection::Clinics, id)
    }

    pub fn list_clinics(&self) -> ClinicResult<Vec<Clinic>> {
        shared::list(self.store.as_ref(), Collection::Clinics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CoreConfig, StoreKind};
    use crate::store::FileStore;
    use crate::ClinicError;
    use tempfile::TempDir;

    #[test]
    fn test_add_clinic_persists_to_file_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = CoreConfig::new(temp_dir.path().to_path_buf(), StoreKind::File).unwrap();
        let service = ClinicService::new(Arc::new(FileStore::open(&cfg).unwrap()));

        let clinic = service.add_clinic("North", "1 High St").unwrap();

        let reopened = ClinicService::new(Arc::new(FileStore::open(&cfg).unwrap()));
        assert_eq!(
            reopened.get_clinic(&clinic.id.to_string()).unwrap(),
            Some(clinic.clone())
        );
        assert_eq!(reopened.list_clinics().unwrap(), vec![clinic]);
    }

    #[test]
    fn test_add_clinic_rejects_blank_address() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = CoreConfig::new(temp_dir.path().to_path_buf(), StoreKind::File).unwrap();
        let service = ClinicService::new(Arc::new(FileStore::open(&cfg).unwrap()));

        let err = service.add_clinic("North", " ").unwrap_err();
        assert!(matches!(err, ClinicError::InvalidInput(_)));
    }
}
