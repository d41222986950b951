//! Doctor records.
//!
//! Creating a doctor also writes the doctor's empty appointment ledger, so a freshly
//! registered doctor shows an empty schedule rather than no schedule at all.

use crate::error::{ClinicError, ClinicResult};
use crate::ledger::Ledger;
use crate::records::Doctor;
use crate::repositories::shared::{self, record_id, required};
use crate::store::{Collection, DocumentStore, UpdateOutcome};
use chrono::Utc;
use clinic_types::{NonEmptyText, RecordId};
use std::sync::Arc;

#[derive(Clone)]
pub struct DoctorService {
    store: Arc<dyn DocumentStore>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Registers a doctor and initialises an empty ledger keyed by the new id.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::InvalidInput`] if a field is blank, `clinic_id` is malformed,
    /// or `clinic_id` names a clinic that does not exist.
    pub fn add_doctor(
        &self,
        name: &str,
        speciality: &str,
        clinic_id: Option<&str>,
    ) -> ClinicResult<Doctor> {
        let name = required("name", name)?;
        let speciality = required("speciality", speciality)?;
        let clinic_id = clinic_id.map(record_id).transpose()?;

        if let Some(clinic_id) = clinic_id {
            if self
                .store
                .find_record(Collection::Clinics, clinic_id)?
                .is_none()
            {
                return Err(ClinicError::InvalidInput(format!(
                    "unknown clinic: {clinic_id}"
                )));
            }
        }

        let doctor = Doctor {
            id: RecordId::new(),
            name,
            speciality,
            clinic_id,
            created_at: Utc::now(),
        };
        shared::insert(self.store.as_ref(), Collection::Doctors, doctor.id, &doctor)?;

        let ledger_key = NonEmptyText::new(doctor.id.to_string())?;
        let outcome = self
            .store
            .atomic_update(&ledger_key, &|_: &Ledger| Ok(()), &mut |_: &mut Ledger| {})?;
        debug_assert_eq!(outcome, UpdateOutcome::Applied);

        tracing::info!("created doctor {} with empty ledger", doctor.id);
        Ok(doctor)
    }

    pub fn get_doctor(&self, id: &str) -> ClinicResult<Option<Doctor>> {
        let id = record_id(id)?;
        shared::find(self.store.as_ref(), Collection::Doctors, id)
    }

    /// All doctors, ordered by id.
    pub fn list_doctors(&self) -> ClinicResult<Vec<Doctor>> {
        shared::list(self.store.as_ref(), Collection::Doctors)
    }
}
