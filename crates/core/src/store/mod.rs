//! Document store abstraction.
//!
//! The core never talks to storage directly. Everything goes through [`DocumentStore`], which
//! offers two families of operations:
//!
//! - **Ledgers**, keyed by doctor id: [`DocumentStore::find_ledger`] and
//!   [`DocumentStore::atomic_update`]. The latter is a compare-and-swap on the whole ledger
//!   document: the guard and the mutation observe the same state, and no other update to that
//!   ledger can interleave between them.
//! - **Records** (users, doctors, clinics), keyed by [`RecordId`] and held as JSON values.
//!
//! Two implementations ship with the crate: [`MemoryStore`] and [`FileStore`]. Pick one at
//! startup with [`open_store`] and share it as `Arc<dyn DocumentStore>`.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::config::{CoreConfig, StoreKind};
use crate::error::StoreResult;
use crate::ledger::{Conflict, Ledger};
use crate::ClinicResult;
use clinic_types::{NonEmptyText, RecordId};
use serde_json::Value;
use std::sync::Arc;

/// Precondition checked against the current ledger (an empty one if none is stored).
pub type Guard<'a> = &'a dyn Fn(&Ledger) -> Result<(), Conflict>;

/// Change applied to the ledger once its guard has passed.
pub type Mutation<'a> = &'a mut dyn FnMut(&mut Ledger);

/// Result of [`DocumentStore::atomic_update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The guard passed and the mutated ledger is now stored.
    Applied,
    /// The guard failed; nothing was written.
    Refused(Conflict),
}

/// Record collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Doctors,
    Clinics,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Doctors => "doctors",
            Collection::Clinics => "clinics",
        }
    }
}

pub trait DocumentStore: Send + Sync {
    /// The stored ledger for `doctor_id`, or `None` if none has been written yet.
    fn find_ledger(&self, doctor_id: &NonEmptyText) -> StoreResult<Option<Ledger>>;

    /// Runs `guard` and then `mutation` against the current ledger as a single unit.
    ///
    /// A missing ledger is presented to both closures as [`Ledger::empty`]; it is only
    /// persisted if the guard passes.
    fn atomic_update(
        &self,
        doctor_id: &NonEmptyText,
        guard: Guard<'_>,
        mutation: Mutation<'_>,
    ) -> StoreResult<UpdateOutcome>;

    /// Stores a new record. An existing record with the same id is replaced.
    fn insert_record(&self, collection: Collection, id: RecordId, document: Value)
        -> StoreResult<()>;

    fn find_record(&self, collection: Collection, id: RecordId) -> StoreResult<Option<Value>>;

    /// All records of a collection, ordered by id.
    fn list_records(&self, collection: Collection) -> StoreResult<Vec<Value>>;

    /// Read-modify-write of one record as a single unit.
    ///
    /// Returns `false` without calling `mutation` if the record does not exist.
    fn update_record(
        &self,
        collection: Collection,
        id: RecordId,
        mutation: &mut dyn FnMut(&mut Value),
    ) -> StoreResult<bool>;

    /// Returns `false` if the record did not exist.
    fn delete_record(&self, collection: Collection, id: RecordId) -> StoreResult<bool>;
}

/// Opens the store selected by `cfg`.
///
/// Called once at startup; the returned handle is the process-wide store client.
pub fn open_store(cfg: &CoreConfig) -> ClinicResult<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match cfg.store_kind() {
        StoreKind::File => Arc::new(FileStore::open(cfg)?),
        StoreKind::Memory => Arc::new(MemoryStore::new()),
    };
    tracing::info!(
        "opened {:?} document store at {}",
        cfg.store_kind(),
        cfg.data_dir().display()
    );
    Ok(store)
}
