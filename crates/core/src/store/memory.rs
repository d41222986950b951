use super::{Collection, DocumentStore, Guard, Mutation, UpdateOutcome};
use crate::error::{StoreError, StoreResult};
use crate::ledger::Ledger;
use clinic_types::{NonEmptyText, RecordId};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Process-local document store.
///
/// Each map sits behind its own mutex, which is what makes `atomic_update` and
/// `update_record` atomic. Used for tests and for `CLINIC_STORE=memory`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledgers: Mutex<HashMap<NonEmptyText, Ledger>>,
    records: Mutex<HashMap<Collection, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn find_ledger(&self, doctor_id: &NonEmptyText) -> StoreResult<Option<Ledger>> {
        let ledgers = self.ledgers.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(ledgers.get(doctor_id).cloned())
    }

    fn atomic_update(
        &self,
        doctor_id: &NonEmptyText,
        guard: Guard<'_>,
        mutation: Mutation<'_>,
    ) -> StoreResult<UpdateOutcome> {
        let mut ledgers = self.ledgers.lock().map_err(|_| StoreError::LockPoisoned)?;

        let mut next = ledgers
            .get(doctor_id)
            .cloned()
            .unwrap_or_else(|| Ledger::empty(doctor_id.clone()));

        if let Err(conflict) = guard(&next) {
            return Ok(UpdateOutcome::Refused(conflict));
        }

        // Mutate a copy so a panicking mutation leaves the stored ledger as it was.
        mutation(&mut next);
        ledgers.insert(doctor_id.clone(), next);

        Ok(UpdateOutcome::Applied)
    }

    fn insert_record(
        &self,
        collection: Collection,
        id: RecordId,
        document: Value,
    ) -> StoreResult<()> {
        let mut records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        records
            .entry(collection)
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    fn find_record(&self, collection: Collection, id: RecordId) -> StoreResult<Option<Value>> {
        let records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records
            .get(&collection)
            .and_then(|docs| docs.get(&id.to_string()))
            .cloned())
    }

    fn list_records(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        let records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records
            .get(&collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    fn update_record(
        &self,
        collection: Collection,
        id: RecordId,
        mutation: &mut dyn FnMut(&mut Value),
    ) -> StoreResult<bool> {
        let mut records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        let Some(document) = records
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(&id.to_string()))
        else {
            return Ok(false);
        };

        let mut next = document.clone();
        mutation(&mut next);
        *document = next;
        Ok(true)
    }

    fn delete_record(&self, collection: Collection, id: RecordId) -> StoreResult<bool> {
        let mut records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records
            .get_mut(&collection)
            .and_then(|docs| docs.remove(&id.to_string()))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Conflict, Request};
    use clinic_types::RequestId;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    fn doctor() -> NonEmptyText {
        NonEmptyText::new("doctor-1").unwrap()
    }

    #[test]
    fn test_refused_update_does_not_create_ledger() {
        let store = MemoryStore::new();

        let outcome = store
            .atomic_update(&doctor(), &|_| Err(Conflict::UnknownRequest), &mut |_| {})
            .expect("update should not fail");

        assert_eq!(outcome, UpdateOutcome::Refused(Conflict::UnknownRequest));
        assert!(store.find_ledger(&doctor()).unwrap().is_none());
    }

    #[test]
    fn test_applied_update_persists_mutation() {
        let store = MemoryStore::new();
        let request = Request {
            request_id: RequestId::generate(),
            date: NonEmptyText::new("2024-06-01").unwrap(),
            time: NonEmptyText::new("10:00").unwrap(),
            user_id: NonEmptyText::new("U1").unwrap(),
        };

        let outcome = store
            .atomic_update(&doctor(), &|l| l.admit(&request), &mut |l| {
                l.push_request(request.clone())
            })
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Applied);
        let ledger = store.find_ledger(&doctor()).unwrap().expect("ledger stored");
        assert_eq!(ledger.requests(), &[request]);
    }

    #[test]
    fn test_concurrent_requests_for_one_slot_admit_exactly_one() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let request = Request {
                        request_id: RequestId::generate(),
                        date: NonEmptyText::new("2024-06-01").unwrap(),
                        time: NonEmptyText::new("10:00").unwrap(),
                        user_id: NonEmptyText::new(format!("U{i}")).unwrap(),
                    };
                    store
                        .atomic_update(&doctor(), &|l| l.admit(&request), &mut |l| {
                            l.push_request(request.clone())
                        })
                        .unwrap()
                })
            })
            .collect();

        let applied = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|o| *o == UpdateOutcome::Applied)
            .count();

        assert_eq!(applied, 1, "only one caller may win the slot");
        let ledger = store.find_ledger(&doctor()).unwrap().unwrap();
        assert_eq!(ledger.requests().len(), 1);
    }

    #[test]
    fn test_record_lifecycle() {
        let store = MemoryStore::new();
        let id = RecordId::new();

        assert!(store.find_record(Collection::Users, id).unwrap().is_none());
        store
            .insert_record(Collection::Users, id, json!({"name": "Ann"}))
            .unwrap();

        let updated = store
            .update_record(Collection::Users, id, &mut |doc| doc["name"] = json!("Anna"))
            .unwrap();
        assert!(updated);
        assert_eq!(
            store.find_record(Collection::Users, id).unwrap().unwrap()["name"],
            "Anna"
        );

        assert!(store.find_record(Collection::Clinics, id).unwrap().is_none());
        assert!(store.delete_record(Collection::Users, id).unwrap());
        assert!(!store.delete_record(Collection::Users, id).unwrap());
        assert!(store.list_records(Collection::Users).unwrap().is_empty());
    }

    #[test]
    fn test_update_missing_record_skips_mutation() {
        let store = MemoryStore::new();
        let mut called = false;

        let updated = store
            .update_record(Collection::Doctors, RecordId::new(), &mut |_| called = true)
            .unwrap();

        assert!(!updated);
        assert!(!called);
    }
}
