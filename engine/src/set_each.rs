//! Bulk inserts: primitive-array union and keyed record inserts.

use crate::value::Draft;
use crate::{Array, Definition, Index, Key, Patch, Record, Value};
use std::collections::BTreeMap;
use tracing::trace;

/// Add every value not already in `target`.
///
/// New elements are appended in payload order.
pub fn set_each_in_array(target: &Array, values: &[Value]) -> Array {
    union(target, values)
}

/// Insert or replace records, each filed under its own key.
///
/// Entries that fail sanitization or have no key are skipped.
pub fn set_each_from_list(target: &Index, payload: &[Patch], definition: &Definition) -> Index {
    let entries = payload.iter().filter_map(|raw| {
        let record = definition.get_payload(raw)?;
        let key = definition.get_key(&record)?;
        Some((key, record))
    });
    replace_entries(target, entries)
}

/// Insert or replace records filed under the given keys.
///
/// A record whose own key differs from the key it is filed under is skipped.
pub fn set_each_from_map(
    target: &Index,
    payload: &BTreeMap<Key, Patch>,
    definition: &Definition,
) -> Index {
    let entries = payload.iter().filter_map(|(key, raw)| {
        let record = definition.get_payload(raw)?;
        if definition.get_key(&record).as_deref() != Some(key.as_str()) {
            trace!(key = %key, "record filed under a foreign key skipped");
            return None;
        }
        Some((key.clone(), record))
    });
    replace_entries(target, entries)
}

pub(crate) fn union<'a>(target: &Array, values: impl IntoIterator<Item = &'a Value>) -> Array {
    let mut added: Vec<Value> = Vec::new();
    for value in values {
        if !target.contains(value) && !added.contains(value) {
            added.push(value.clone());
        }
    }

    if added.is_empty() {
        return target.clone();
    }
    target.iter().cloned().chain(added).collect()
}

/// Store each record under its key, skipping records equal to what is there.
pub(crate) fn replace_entries(
    target: &Index,
    entries: impl IntoIterator<Item = (Key, Record)>,
) -> Index {
    let mut draft = Draft::new(target.as_record());

    for (key, record) in entries {
        if draft.get_record(&key) == Some(&record) {
            continue;
        }
        draft.insert(&key, Value::Object(record));
    }

    Index::from_record(draft.finish())
}
