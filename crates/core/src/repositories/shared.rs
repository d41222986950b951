//! Shared repository utilities.
//!
//! Typed access to record collections on top of the JSON-valued [`DocumentStore`] API.
//! Records are encoded with `serde_json` on the way in and decoded on the way out.

use crate::error::{ClinicError, ClinicResult};
use crate::store::{Collection, DocumentStore};
use clinic_types::{NonEmptyText, RecordId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Validates a required text input, naming the field on failure.
pub(crate) fn required(field: &'static str, value: &str) -> ClinicResult<NonEmptyText> {
    Ok(NonEmptyText::for_field(field, value)?)
}

/// Parses a record id supplied by a caller.
pub(crate) fn record_id(value: &str) -> ClinicResult<RecordId> {
    Ok(RecordId::parse(value.trim())?)
}

pub(crate) fn insert<T: Serialize>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: RecordId,
    record: &T,
) -> ClinicResult<()> {
    let document = serde_json::to_value(record).map_err(ClinicError::RecordEncode)?;
    store.insert_record(collection, id, document)?;
    Ok(())
}

pub(crate) fn find<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: RecordId,
) -> ClinicResult<Option<T>> {
    store
        .find_record(collection, id)?
        .map(|document| serde_json::from_value(document).map_err(ClinicError::RecordDecode))
        .transpose()
}

/// Lists a collection, skipping documents that no longer decode as `T`.
pub(crate) fn list<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
) -> ClinicResult<Vec<T>> {
    let mut records = Vec::new();
    for document in store.list_records(collection)? {
        match serde_json::from_value(document) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("failed to decode {} record: {}", collection.name(), e);
            }
        }
    }
    Ok(records)
}

/// Atomically decodes a record, applies `change`, and writes it back.
///
/// Returns the updated record, or `None` if it does not exist. If the stored document does
/// not decode, or `change` fails, the document is left as it was and the error is returned.
pub(crate) fn update<T, F>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: RecordId,
    change: F,
) -> ClinicResult<Option<T>>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&mut T) -> ClinicResult<()>,
{
    let mut change = Some(change);
    let mut result: Option<ClinicResult<T>> = None;

    let found = store.update_record(collection, id, &mut |document: &mut Value| {
        let Some(change) = change.take() else {
            return;
        };
        let outcome = apply(document, change);
        if let Ok((_, encoded)) = &outcome {
            *document = encoded.clone();
        }
        result = Some(outcome.map(|(record, _)| record));
    })?;

    if !found {
        return Ok(None);
    }
    match result {
        Some(outcome) => outcome.map(Some),
        None => Ok(None),
    }
}

fn apply<T, F>(document: &Value, change: F) -> ClinicResult<(T, Value)>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&mut T) -> ClinicResult<()>,
{
    let mut record: T =
        serde_json::from_value(document.clone()).map_err(ClinicError::RecordDecode)?;
    change(&mut record)?;
    let encoded = serde_json::to_value(&record).map_err(ClinicError::RecordEncode)?;
    Ok((record, encoded))
}
