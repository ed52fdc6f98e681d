//! Single-item inserts: array elements, record fields, collection entries.

use crate::patch::patch;
use crate::set_each::{replace_entries, union};
use crate::{Array, Definition, Index, Patch, PatchValue, Record, Value};
use std::iter;
use tracing::trace;

/// Add `value` to a primitive array unless it is already there.
pub fn set_in_array(target: &Array, value: Value) -> Array {
    union(target, iter::once(&value))
}

/// Set one field of a record.
///
/// Goes through [`patch`], so readonly fields, unknown fields and
/// non-array values for array fields are all no-ops.
pub fn set_field(
    target: &Record,
    field: &str,
    value: impl Into<PatchValue>,
    definition: &Definition,
) -> Record {
    let mut payload = Patch::new();
    payload.insert(field, value);
    patch(target, &payload, definition)
}

/// Insert or replace the record `payload` describes, filed under its key.
pub fn set_in_index(target: &Index, payload: &Patch, definition: &Definition) -> Index {
    let Some(record) = definition.get_payload(payload) else {
        trace!("set rejected: invalid payload");
        return target.clone();
    };
    let Some(key) = definition.get_key(&record) else {
        trace!("set rejected: record has no key");
        return target.clone();
    };
    replace_entries(target, iter::once((key, record)))
}
