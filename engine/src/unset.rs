//! Single-item removals.

use crate::patch::patch;
use crate::unset_each::{difference, unset_each_in_index};
use crate::{Array, Definition, Index, Patch, Record, Value};
use std::slice;

/// Remove every occurrence of `value` from a primitive array.
pub fn unset_in_array(target: &Array, value: &Value) -> Array {
    difference(target, slice::from_ref(value))
}

/// Remove one field of a record.
///
/// Same as patching with a deletion: required and readonly fields stay.
pub fn unset_field(target: &Record, field: &str, definition: &Definition) -> Record {
    patch(target, &Patch::new().delete(field), definition)
}

/// Remove the entry filed under `key`.
pub fn unset_in_index(target: &Index, key: &str) -> Index {
    unset_each_in_index(target, &[key])
}
