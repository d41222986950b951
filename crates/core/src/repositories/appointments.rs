//! Appointment request workflow.
//!
//! Patients submit requests for a `(date, time)` slot with a doctor; the doctor then confirms
//! or rejects each one. All three operations are a single conditional update of the doctor's
//! ledger document:
//!
//! ```text
//! submit_request ──► requests ──confirm──► confirms
//!                        │
//!                        └──reject──► (removed)
//! ```
//!
//! Expected business outcomes (`SlotTaken`, `DuplicateUserDate`, `NotFound`) come back as
//! typed results. Only malformed input and store failures are errors. Every operation is safe
//! to retry after a store failure: the guard re-checks state, so a request that did land is
//! refused on retry and an already-handled confirm or reject reports `NotFound`.

use crate::constants::MAX_REQUEST_ID_ATTEMPTS;
use crate::error::{ClinicError, ClinicResult};
use crate::ledger::{Confirmation, Ledger, RejectionReason, Request};
use crate::repositories::shared::required;
use crate::store::{DocumentStore, UpdateOutcome};
use clinic_types::RequestId;
use std::sync::Arc;

/// Result of [`AppointmentService::submit_request`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    Accepted(RequestId),
    Rejected(RejectionReason),
}

/// Result of [`AppointmentService::confirm`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed(Confirmation),
    NotFound,
}

/// Result of [`AppointmentService::reject`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectOutcome {
    Rejected(Request),
    NotFound,
}

#[derive(Clone)]
pub struct AppointmentService {
    store: Arc<dyn DocumentStore>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Requests the slot `(date, time)` with `doctor_id` on behalf of `user_id`.
    ///
    /// The request is appended to the end of the doctor's pending requests. A doctor with no
    /// ledger yet is treated as having an empty one.
    ///
    /// # Returns
    ///
    /// - `Accepted(id)` with the freshly generated request id
    /// - `Rejected(SlotTaken)` if the slot is already requested or confirmed
    /// - `Rejected(DuplicateUserDate)` if the user already holds a slot on that date
    ///
    /// # Errors
    ///
    /// - [`ClinicError::InvalidInput`] if any argument is blank (the store is not touched)
    /// - [`ClinicError::StoreUnavailable`] if the store cannot be reached (retryable)
    /// - [`ClinicError::StoreCorrupt`] if the stored ledger cannot be decoded
    /// - [`ClinicError::RequestIdAllocation`] if every generated id collided
    pub fn submit_request(
        &self,
        doctor_id: &str,
        date: &str,
        time: &str,
        user_id: &str,
    ) -> ClinicResult<RequestOutcome> {
        let doctor_id = required("doctor_id", doctor_id)?;
        let date = required("date", date)?;
        let time = required("time", time)?;
        let user_id = required("user_id", user_id)?;

        for _ in 0..MAX_REQUEST_ID_ATTEMPTS {
            let request = Request {
                request_id: RequestId::generate(),
                date: date.clone(),
                time: time.clone(),
                user_id: user_id.clone(),
            };

            let outcome = self.store.atomic_update(
                &doctor_id,
                &|ledger: &Ledger| ledger.admit(&request),
                &mut |ledger: &mut Ledger| ledger.push_request(request.clone()),
            )?;

            match outcome {
                UpdateOutcome::Applied => {
                    tracing::info!(
                        "accepted request {} for doctor {} at {} {}",
                        request.request_id,
                        doctor_id,
                        date,
                        time
                    );
                    return Ok(RequestOutcome::Accepted(request.request_id));
                }
                UpdateOutcome::Refused(conflict) => match conflict.rejection() {
                    Some(reason) => {
                        tracing::debug!(
                            "rejected request for doctor {} at {} {}: {}",
                            doctor_id,
                            date,
                            time,
                            reason
                        );
                        return Ok(RequestOutcome::Rejected(reason));
                    }
                    None => {
                        tracing::warn!(
                            "request id collision in ledger of doctor {}, retrying",
                            doctor_id
                        );
                    }
                },
            }
        }

        Err(ClinicError::RequestIdAllocation(MAX_REQUEST_ID_ATTEMPTS))
    }

    /// Promotes a pending request to a confirmed appointment.
    ///
    /// The request leaves `requests` and its confirmation joins the end of `confirms` in one
    /// update. An id that is unknown, or was already confirmed or rejected, yields `NotFound`
    /// and changes nothing.
    pub fn confirm(&self, doctor_id: &str, request_id: &str) -> ClinicResult<ConfirmOutcome> {
        let doctor_id = required("doctor_id", doctor_id)?;
        let request_id = required("request_id", request_id)?;
        let request_id = request_id.as_str();

        let mut confirmed = None;
        let outcome = self.store.atomic_update(
            &doctor_id,
            &|ledger: &Ledger| ledger.require_request(request_id),
            &mut |ledger: &mut Ledger| confirmed = ledger.promote(request_id),
        )?;

        match (outcome, confirmed) {
            (UpdateOutcome::Applied, Some(confirmation)) => {
                tracing::info!(
                    "confirmed request {} for doctor {}",
                    request_id,
                    doctor_id
                );
                Ok(ConfirmOutcome::Confirmed(confirmation))
            }
            _ => {
                tracing::debug!(
                    "confirm: no pending request {} for doctor {}",
                    request_id,
                    doctor_id
                );
                Ok(ConfirmOutcome::NotFound)
            }
        }
    }

    /// Removes a pending request without confirming it.
    ///
    /// Returns the removed request, or `NotFound` if no pending request has this id.
    pub fn reject(&self, doctor_id: &str, request_id: &str) -> ClinicResult<RejectOutcome> {
        let doctor_id = required("doctor_id", doctor_id)?;
        let request_id = required("request_id", request_id)?;
        let request_id = request_id.as_str();

        let mut rejected = None;
        let outcome = self.store.atomic_update(
            &doctor_id,
            &|ledger: &Ledger| ledger.require_request(request_id),
            &mut |ledger: &mut Ledger| rejected = ledger.withdraw(request_id),
        )?;

        match (outcome, rejected) {
            (UpdateOutcome::Applied, Some(request)) => {
                tracing::info!("rejected request {} for doctor {}", request_id, doctor_id);
                Ok(RejectOutcome::Rejected(request))
            }
            _ => {
                tracing::debug!(
                    "reject: no pending request {} for doctor {}",
                    request_id,
                    doctor_id
                );
                Ok(RejectOutcome::NotFound)
            }
        }
    }

    /// The doctor's current ledger, or an empty one if none is stored.
    pub fn ledger(&self, doctor_id: &str) -> ClinicResult<Ledger> {
        let doctor_id = required("doctor_id", doctor_id)?;
        Ok(self
            .store
            .find_ledger(&doctor_id)?
            .unwrap_or_else(|| Ledger::empty(doctor_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CoreConfig, StoreKind};
    use crate::error::{StoreError, StoreResult};
    use crate::store::{Collection, FileStore, Guard, MemoryStore, Mutation};
    use clinic_types::{NonEmptyText, RecordId};
    use serde_json::Value;
    use sha2::{Digest, Sha256};
    use std::thread;
    use tempfile::TempDir;

    const DATE: &str = "2024-06-01";

    fn memory_service() -> AppointmentService {
        AppointmentService::new(Arc::new(MemoryStore::new()))
    }

    fn file_service(dir: &TempDir) -> AppointmentService {
        let cfg = CoreConfig::new(dir.path().to_path_buf(), StoreKind::File)
            .expect("CoreConfig::new should succeed");
        AppointmentService::new(Arc::new(
            FileStore::open(&cfg).expect("FileStore::open should succeed"),
        ))
    }

    fn accepted(outcome: RequestOutcome) -> RequestId {
        match outcome {
            RequestOutcome::Accepted(id) => id,
            other => panic!("expected Accepted, got {other:?}"),
        }
    }

    /// The walkthrough: request, clash on slot, clash on user-date, confirm, stale reject.
    fn run_booking_scenario(service: &AppointmentService) {
        let k1 = accepted(service.submit_request("D", DATE, "10:00", "U1").unwrap());

        assert_eq!(
            service.submit_request("D", DATE, "10:00", "U2").unwrap(),
            RequestOutcome::Rejected(RejectionReason::SlotTaken)
        );
        assert_eq!(
            service.submit_request("D", DATE, "11:00", "U1").unwrap(),
            RequestOutcome::Rejected(RejectionReason::DuplicateUserDate)
        );

        let confirmation = match service.confirm("D", k1.as_str()).unwrap() {
            ConfirmOutcome::Confirmed(c) => c,
            ConfirmOutcome::NotFound => panic!("K1 should be pending"),
        };
        assert_eq!(confirmation.confirmation_id, k1);

        let ledger = service.ledger("D").unwrap();
        assert!(ledger.requests().is_empty());
        assert_eq!(ledger.confirms().len(), 1);
        assert_eq!(ledger.confirms()[0].user_id.as_str(), "U1");
        assert_eq!(ledger.confirms()[0].time.as_str(), "10:00");

        assert_eq!(
            service.reject("D", k1.as_str()).unwrap(),
            RejectOutcome::NotFound
        );
    }

    #[test]
    fn test_booking_scenario_memory_store() {
        run_booking_scenario(&memory_service());
    }

    #[test]
    fn test_booking_scenario_file_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        run_booking_scenario(&file_service(&temp_dir));
    }

    #[test]
    fn test_distinct_requests_all_succeed_in_arrival_order() {
        let service = memory_service();
        let slots = [
            ("2024-06-01", "09:00", "U1"),
            ("2024-06-01", "10:00", "U2"),
            ("2024-06-02", "09:00", "U1"),
            ("2024-06-02", "10:00", "U3"),
        ];

        let ids: Vec<RequestId> = slots
            .iter()
            .map(|(date, time, user)| accepted(service.submit_request("D", date, time, user).unwrap()))
            .collect();

        let ledger = service.ledger("D").unwrap();
        assert_eq!(ledger.requests().len(), slots.len());
        let stored: Vec<&RequestId> = ledger.requests().iter().map(|r| &r.request_id).collect();
        assert_eq!(stored, ids.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_slot_taken_leaves_ledger_unchanged() {
        let service = memory_service();
        let pending = accepted(service.submit_request("D", DATE, "09:00", "U1").unwrap());
        accepted(service.submit_request("D", DATE, "10:00", "U2").unwrap());
        service.confirm("D", pending.as_str()).unwrap();
        let before = service.ledger("D").unwrap();

        for time in ["09:00", "10:00"] {
            assert_eq!(
                service.submit_request("D", DATE, time, "U9").unwrap(),
                RequestOutcome::Rejected(RejectionReason::SlotTaken),
                "slot {time} is held by a request or a confirmation"
            );
        }
        assert_eq!(service.ledger("D").unwrap(), before);
    }

    #[test]
    fn test_duplicate_user_date_against_confirmation() {
        let service = memory_service();
        let id = accepted(service.submit_request("D", DATE, "09:00", "U1").unwrap());
        service.confirm("D", id.as_str()).unwrap();

        assert_eq!(
            service.submit_request("D", DATE, "15:00", "U1").unwrap(),
            RequestOutcome::Rejected(RejectionReason::DuplicateUserDate)
        );
    }

    #[test]
    fn test_ledgers_are_independent_per_doctor() {
        let service = memory_service();
        accepted(service.submit_request("D1", DATE, "10:00", "U1").unwrap());
        accepted(service.submit_request("D2", DATE, "10:00", "U1").unwrap());

        assert_eq!(service.ledger("D1").unwrap().requests().len(), 1);
        assert_eq!(service.ledger("D2").unwrap().requests().len(), 1);
    }

    #[test]
    fn test_confirm_twice_returns_not_found() {
        let service = memory_service();
        let id = accepted(service.submit_request("D", DATE, "10:00", "U1").unwrap());

        let first = service.confirm("D", id.as_str()).unwrap();
        let ConfirmOutcome::Confirmed(confirmation) = first else {
            panic!("first confirm should succeed");
        };
        assert_eq!(confirmation.date.as_str(), DATE);
        assert_eq!(confirmation.time.as_str(), "10:00");
        assert_eq!(confirmation.user_id.as_str(), "U1");

        assert_eq!(
            service.confirm("D", id.as_str()).unwrap(),
            ConfirmOutcome::NotFound
        );
        assert_eq!(service.ledger("D").unwrap().confirms().len(), 1);
    }

    #[test]
    fn test_reject_removes_without_confirming() {
        let service = memory_service();
        let id = accepted(service.submit_request("D", DATE, "10:00", "U1").unwrap());

        let RejectOutcome::Rejected(request) = service.reject("D", id.as_str()).unwrap() else {
            panic!("reject should succeed");
        };
        assert_eq!(request.request_id, id);

        let ledger = service.ledger("D").unwrap();
        assert!(ledger.requests().is_empty());
        assert!(ledger.confirms().is_empty());
        assert_eq!(
            service.reject("D", id.as_str()).unwrap(),
            RejectOutcome::NotFound
        );
        assert_eq!(
            service.confirm("D", id.as_str()).unwrap(),
            ConfirmOutcome::NotFound
        );
    }

    #[test]
    fn test_rejected_slot_can_be_requested_again() {
        let service = memory_service();
        let id = accepted(service.submit_request("D", DATE, "10:00", "U1").unwrap());
        service.reject("D", id.as_str()).unwrap();

        accepted(service.submit_request("D", DATE, "10:00", "U2").unwrap());
    }

    #[test]
    fn test_unknown_ids_return_not_found_without_changes() {
        let service = memory_service();
        accepted(service.submit_request("D", DATE, "10:00", "U1").unwrap());
        let before = service.ledger("D").unwrap();
        let never_issued = RequestId::generate();

        assert_eq!(
            service.confirm("D", never_issued.as_str()).unwrap(),
            ConfirmOutcome::NotFound
        );
        assert_eq!(
            service.reject("D", never_issued.as_str()).unwrap(),
            RejectOutcome::NotFound
        );
        assert_eq!(
            service.confirm("D", "not-even-an-id").unwrap(),
            ConfirmOutcome::NotFound
        );
        assert_eq!(service.ledger("D").unwrap(), before);
    }

    #[test]
    fn test_confirm_on_missing_ledger_does_not_create_one() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = file_service(&temp_dir);

        assert_eq!(
            service.confirm("nobody", "abc").unwrap(),
            ConfirmOutcome::NotFound
        );
        assert!(service.ledger("nobody").unwrap().is_empty());
        assert!(
            std::fs::read_dir(temp_dir.path().join("appointments"))
                .unwrap()
                .next()
                .is_none(),
            "no ledger document should be written"
        );
    }

    #[test]
    fn test_blank_inputs_are_rejected_before_the_store() {
        let service = AppointmentService::new(Arc::new(FailingStore));

        for (doctor, date, time, user) in [
            ("", DATE, "10:00", "U1"),
            ("D", " ", "10:00", "U1"),
            ("D", DATE, "", "U1"),
            ("D", DATE, "10:00", "\t"),
        ] {
            let err = service.submit_request(doctor, date, time, user).unwrap_err();
            assert!(
                matches!(err, ClinicError::InvalidInput(_)),
                "blank input should be an input error, got {err:?}"
            );
        }
        assert!(matches!(
            service.confirm("D", " ").unwrap_err(),
            ClinicError::InvalidInput(_)
        ));
        assert!(matches!(
            service.reject("", "abc").unwrap_err(),
            ClinicError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_store_failure_is_retryable() {
        let service = AppointmentService::new(Arc::new(FailingStore));

        let err = service.submit_request("D", DATE, "10:00", "U1").unwrap_err();
        assert!(matches!(err, ClinicError::StoreUnavailable(_)));
        assert!(err.is_retryable());

        let err = service.confirm("D", "abc").unwrap_err();
        assert!(err.is_retryable());
        assert!(!ClinicError::InvalidInput("x".into()).is_retryable());
    }

    #[test]
    fn test_corrupt_ledger_is_not_retryable() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = file_service(&temp_dir);
        accepted(service.submit_request("D", DATE, "10:00", "U1").unwrap());

        let cfg = CoreConfig::new(temp_dir.path().to_path_buf(), StoreKind::File).unwrap();
        let stem = hex::encode(Sha256::digest(b"D"));
        let path = cfg
            .appointments_dir()
            .join(&stem[0..2])
            .join(&stem[2..4])
            .join(format!("{stem}.json"));
        assert!(path.exists(), "ledger file should exist at {}", path.display());
        std::fs::write(&path, "{ corrupt").unwrap();

        for _ in 0..3 {
            let err = service.submit_request("D", DATE, "11:00", "U2").unwrap_err();
            assert!(matches!(err, ClinicError::StoreCorrupt(_)), "got {err:?}");
            assert!(!err.is_retryable());
        }
        let err = service.confirm("D", "abc").unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retry_after_success_is_rejected() {
        let service = memory_service();
        accepted(service.submit_request("D", DATE, "10:00", "U1").unwrap());

        assert_eq!(
            service.submit_request("D", DATE, "10:00", "U1").unwrap(),
            RequestOutcome::Rejected(RejectionReason::SlotTaken)
        );
        assert_eq!(service.ledger("D").unwrap().requests().len(), 1);
    }

    #[test]
    fn test_concurrent_confirm_and_reject_resolve_once() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = file_service(&temp_dir);
        let id = accepted(service.submit_request("D", DATE, "10:00", "U1").unwrap());

        let confirmer = {
            let service = service.clone();
            let id = id.clone();
            thread::spawn(move || service.confirm("D", id.as_str()).unwrap())
        };
        let rejecter = {
            let service = service.clone();
            let id = id.clone();
            thread::spawn(move || service.reject("D", id.as_str()).unwrap())
        };
        let confirmed = confirmer.join().unwrap() != ConfirmOutcome::NotFound;
        let rejected = rejecter.join().unwrap() != RejectOutcome::NotFound;

        assert!(confirmed ^ rejected, "exactly one of confirm/reject wins");
        let ledger = service.ledger("D").unwrap();
        assert!(ledger.requests().is_empty());
        assert_eq!(ledger.confirms().len(), usize::from(confirmed));
    }

    #[test]
    fn test_concurrent_requests_for_same_slot() {
        let service = memory_service();

        let handles: Vec<_> = (0..12)
            .map(|i| {
                let service = service.clone();
                thread::spawn(move || {
                    service
                        .submit_request("D", DATE, "10:00", &format!("U{i}"))
                        .unwrap()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|o| matches!(o, RequestOutcome::Accepted(_)))
            .count();

        assert_eq!(winners, 1);
        assert_eq!(service.ledger("D").unwrap().requests().len(), 1);
    }

    /// A store whose every call fails, for exercising the error paths.
    struct FailingStore;

    fn unavailable<T>() -> StoreResult<T> {
        Err(StoreError::FileRead(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "store timed out",
        )))
    }

    impl DocumentStore for FailingStore {
        fn find_ledger(&self, _: &NonEmptyText) -> StoreResult<Option<Ledger>> {
            unavailable()
        }

        fn atomic_update(
            &self,
            _: &NonEmptyText,
            _: Guard<'_>,
            _: Mutation<'_>,
        ) -> StoreResult<UpdateOutcome> {
            unavailable()
        }

        fn insert_record(&self, _: Collection, _: RecordId, _: Value) -> StoreResult<()> {
            unavailable()
        }

        fn find_record(&self, _: Collection, _: RecordId) -> StoreResult<Option<Value>> {
            unavailable()
        }

        fn list_records(&self, _: Collection) -> StoreResult<Vec<Value>> {
            unavailable()
        }

        fn update_record(
            &self,
            _: Collection,
            _: RecordId,
            _: &mut dyn FnMut(&mut Value),
        ) -> StoreResult<bool> {
            unavailable()
        }

        fn delete_record(&self, _: Collection, _: RecordId) -> StoreResult<bool> {
            unavailable()
        }
    }
}
