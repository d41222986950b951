//! JSON-file document store.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//!   appointments/<s1>/<s2>/<sha256(doctor_id)>.json
//!   users/<s1>/<s2>/<record_id>.json
//!   doctors/<s1>/<s2>/<record_id>.json
//!   clinics/<s1>/<s2>/<record_id>.json
//! ```
//!
//! `s1` and `s2` are the first four hex characters of the file stem. Doctor ids are opaque
//! strings, so ledger files are named by the SHA-256 of the id rather than the id itself.
//!
//! ## Atomicity
//!
//! Writers hold a single store-wide mutex across read, check and write. Each write goes to a
//! scratch file that is then renamed over the target, so a concurrent reader sees either the
//! previous document or the new one. The mutex only covers one process; running two
//! processes against the same directory is unsupported.

use super::{Collection, DocumentStore, Guard, Mutation, UpdateOutcome};
use crate::config::CoreConfig;
use crate::constants::{DOCUMENT_EXTENSION, TEMP_SUFFIX};
use crate::error::{StoreError, StoreResult};
use crate::ledger::Ledger;
use clinic_types::{NonEmptyText, RecordId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
pub struct FileStore {
    appointments_dir: PathBuf,
    users_dir: PathBuf,
    doctors_dir: PathBuf,
    clinics_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens the store rooted at `cfg.data_dir()`, creating the collection directories.
    pub fn open(cfg: &CoreConfig) -> StoreResult<Self> {
        let store = Self {
            appointments_dir: cfg.appointments_dir(),
            users_dir: cfg.users_dir(),
            doctors_dir: cfg.doctors_dir(),
            clinics_dir: cfg.clinics_dir(),
            write_lock: Mutex::new(()),
        };

        for dir in [
            &store.appointments_dir,
            &store.users_dir,
            &store.doctors_dir,
            &store.clinics_dir,
        ] {
            fs::create_dir_all(dir).map_err(StoreError::DirCreation)?;
        }

        Ok(store)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn collection_dir(&self, collection: Collection) -> &Path {
        match collection {
            Collection::Users => &self.users_dir,
            Collection::Doctors => &self.doctors_dir,
            Collection::Clinics => &self.clinics_dir,
        }
    }

    fn ledger_path(&self, doctor_id: &NonEmptyText) -> PathBuf {
        let digest = hex::encode(Sha256::digest(doctor_id.as_str().as_bytes()));
        sharded_file(&self.appointments_dir, &digest)
    }

    fn record_path(&self, collection: Collection, id: RecordId) -> PathBuf {
        sharded_file(self.collection_dir(collection), &id.to_string())
    }
}

/// `parent/<stem[0..2]>/<stem[2..4]>/<stem>.json`; `stem` is always at least 32 hex chars.
fn sharded_file(parent: &Path, stem: &str) -> PathBuf {
    parent
        .join(&stem[0..2])
        .join(&stem[2..4])
        .join(format!("{stem}.{DOCUMENT_EXTENSION}"))
}

fn read_document<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::FileRead(e)),
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| StoreError::Deserialization {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes `document` to a scratch file and renames it over `path`.
fn write_document<T: Serialize>(path: &Path, document: &T) -> StoreResult<()> {
    let raw = serde_json::to_string_pretty(document).map_err(StoreError::Serialization)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(StoreError::DirCreation)?;
    }

    let mut scratch = path.as_os_str().to_owned();
    scratch.push(TEMP_SUFFIX);
    let scratch = PathBuf::from(scratch);

    fs::write(&scratch, raw).map_err(StoreError::FileWrite)?;
    fs::rename(&scratch, path).map_err(StoreError::FileWrite)
}

/// Every `*.json` file two shard levels below `dir`, sorted by file name.
fn sharded_documents(dir: &Path) -> StoreResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    let s1_iter = match fs::read_dir(dir) {
        Ok(it) => it,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(files),
        Err(e) => return Err(StoreError::FileRead(e)),
    };
    for s1 in s1_iter.flatten() {
        let s1_path = s1.path();
        if !s1_path.is_dir() {
            continue;
        }

        let Ok(s2_iter) = fs::read_dir(&s1_path) else {
            continue;
        };
        for s2 in s2_iter.flatten() {
            let s2_path = s2.path();
            if !s2_path.is_dir() {
                continue;
            }

            let Ok(doc_iter) = fs::read_dir(&s2_path) else {
                continue;
            };
            for doc in doc_iter.flatten() {
                let path = doc.path();
                if path.is_file()
                    && path.extension().and_then(|e| e.to_str()) == Some(DOCUMENT_EXTENSION)
                {
                    files.push(path);
                }
            }
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

impl DocumentStore for FileStore {
    fn find_ledger(&self, doctor_id: &NonEmptyText) -> StoreResult<Option<Ledger>> {
        read_document(&self.ledger_path(doctor_id))
    }

    fn atomic_update(
        &self,
        doctor_id: &NonEmptyText,
        guard: Guard<'_>,
        mutation: Mutation<'_>,
    ) -> StoreResult<UpdateOutcome> {
        let _lock = self.lock()?;
        let path = self.ledger_path(doctor_id);

        let mut ledger = read_document::<Ledger>(&path)?
            .unwrap_or_else(|| Ledger::empty(doctor_id.clone()));

        if let Err(conflict) = guard(&ledger) {
            return Ok(UpdateOutcome::Refused(conflict));
        }

        mutation(&mut ledger);
        write_document(&path, &ledger)?;

        Ok(UpdateOutcome::Applied)
    }

    fn insert_record(
        &self,
        collection: Collection,
        id: RecordId,
        document: Value,
    ) -> StoreResult<()> {
        let _lock = self.lock()?;
        write_document(&self.record_path(collection, id), &document)
    }

    fn find_record(&self, collection: Collection, id: RecordId) -> StoreResult<Option<Value>> {
        read_document(&self.record_path(collection, id))
    }

    fn list_records(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        let mut documents = Vec::new();
        for path in sharded_documents(self.collection_dir(collection))? {
            match read_document::<Value>(&path) {
                Ok(Some(document)) => documents.push(document),
                // Deleted between listing and reading.
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("skipping unreadable {} record: {}", collection.name(), e);
                }
            }
        }
        Ok(documents)
    }

    fn update_record(
        &self,
        collection: Collection,
        id: RecordId,
        mutation: &mut dyn FnMut(&mut Value),
    ) -> StoreResult<bool> {
        let _lock = self.lock()?;
        let path = self.record_path(collection, id);

        let Some(mut document) = read_document::<Value>(&path)? else {
            return Ok(false);
        };
        mutation(&mut document);
        write_document(&path, &document)?;

        Ok(true)
    }

    fn delete_record(&self, collection: Collection, id: RecordId) -> StoreResult<bool> {
        let _lock = self.lock()?;
        match fs::remove_file(self.record_path(collection, id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::FileWrite(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreKind;
    use crate::ledger::{Conflict, Request};
    use clinic_types::RequestId;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_store(dir: &Path) -> FileStore {
        let cfg = CoreConfig::new(dir.to_path_buf(), StoreKind::File)
            .expect("CoreConfig::new should succeed");
        FileStore::open(&cfg).expect("FileStore::open should succeed")
    }

    fn doctor() -> NonEmptyText {
        NonEmptyText::new("doctor/with odd:chars").unwrap()
    }

    fn push(store: &FileStore, date: &str, time: &str, user: &str) -> UpdateOutcome {
        let request = Request {
            request_id: RequestId::generate(),
            date: NonEmptyText::new(date).unwrap(),
            time: NonEmptyText::new(time).unwrap(),
            user_id: NonEmptyText::new(user).unwrap(),
        };
        store
            .atomic_update(&doctor(), &|l| l.admit(&request), &mut |l| {
                l.push_request(request.clone())
            })
            .expect("atomic_update should not fail")
    }

    #[test]
    fn test_open_creates_collection_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let _store = test_store(temp_dir.path());

        for name in ["appointments", "users", "doctors", "clinics"] {
            assert!(
                temp_dir.path().join(name).is_dir(),
                "{name} directory should exist"
            );
        }
    }

    #[test]
    fn test_ledger_file_is_sharded_by_hash() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        assert_eq!(push(&store, "2024-06-01", "10:00", "U1"), UpdateOutcome::Applied);

        let path = store.ledger_path(&doctor());
        assert!(path.is_file(), "ledger document should be written");
        assert!(path.starts_with(temp_dir.path().join("appointments")));
        let stem = path.file_stem().unwrap().to_str().unwrap();
        assert_eq!(stem.len(), 64);
        assert!(
            !path.with_extension("json.tmp").exists(),
            "scratch file should be renamed away"
        );
    }

    #[test]
    fn test_ledger_survives_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        {
            let store = test_store(temp_dir.path());
            push(&store, "2024-06-01", "10:00", "U1");
        }

        let store = test_store(temp_dir.path());
        let ledger = store.find_ledger(&doctor()).unwrap().expect("ledger persisted");
        assert_eq!(ledger.requests().len(), 1);
        assert_eq!(ledger.doctor_id(), &doctor());
        assert_eq!(
            push(&store, "2024-06-01", "10:00", "U2"),
            UpdateOutcome::Refused(Conflict::SlotTaken)
        );
    }

    #[test]
    fn test_refused_update_writes_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        let outcome = store
            .atomic_update(&doctor(), &|l| l.require_request("missing"), &mut |_| {})
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Refused(Conflict::UnknownRequest));
        assert!(!store.ledger_path(&doctor()).exists());
    }

    #[test]
    fn test_corrupt_ledger_surfaces_as_store_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        let path = store.ledger_path(&doctor());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let err = store.find_ledger(&doctor()).expect_err("corrupt ledger should fail");
        assert!(matches!(err, StoreError::Deserialization { .. }));
    }

    #[test]
    fn test_records_are_listed_in_id_order_and_skip_invalid_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        let mut ids: Vec<RecordId> = (0..3).map(|_| RecordId::new()).collect();
        for (i, id) in ids.iter().enumerate() {
            store
                .insert_record(Collection::Clinics, *id, json!({"id": id.to_string(), "n": i}))
                .unwrap();
        }

        let broken = store.record_path(Collection::Clinics, RecordId::new());
        fs::create_dir_all(broken.parent().unwrap()).unwrap();
        fs::write(&broken, "invalid: [[[").unwrap();

        ids.sort_by_key(|id| id.to_string());
        let listed: Vec<String> = store
            .list_records(Collection::Clinics)
            .unwrap()
            .into_iter()
            .map(|doc| doc["id"].as_str().unwrap().to_string())
            .collect();
        let expected: Vec<String> = ids.iter().map(|id| id.to_string()).collect();

        assert_eq!(listed, expected, "invalid file should be skipped");
    }

    #[test]
    fn test_update_and_delete_record() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        let id = RecordId::new();

        assert!(!store
            .update_record(Collection::Users, id, &mut |_| {})
            .unwrap());

        store
            .insert_record(Collection::Users, id, json!({"doctor_ids": []}))
            .unwrap();
        assert!(store
            .update_record(Collection::Users, id, &mut |doc| {
                doc["doctor_ids"] = json!(["d1"]);
            })
            .unwrap());
        assert_eq!(
            store.find_record(Collection::Users, id).unwrap().unwrap()["doctor_ids"][0],
            "d1"
        );

        assert!(store.delete_record(Collection::Users, id).unwrap());
        assert!(!store.delete_record(Collection::Users, id).unwrap());
        assert!(store.find_record(Collection::Users, id).unwrap().is_none());
    }
}
