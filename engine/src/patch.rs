//! Applying patches to single records.
//!
//! # Algorithm
//!
//! 1. Sanitize the payload with the definition; nothing left means no-op
//! 2. For each surviving field, skip values identical to the current one
//! 3. Dispatch on the field's [`Shape`]: recurse into nested records and
//!    collections, union primitive arrays, replace scalars
//! 4. Clone the record only if some field actually changed
//!
//! Unchanged records come back as the same allocation, so `ptr_eq` against
//! the input tells the caller whether anything happened.

use crate::patch_each::merge_entries;
use crate::patch_value::Raw;
use crate::set_each::union;
use crate::value::Draft;
use crate::{ArrayPatch, Definition, Index, Options, Patch, PatchValue, Record, Shape, Value};
use tracing::trace;

/// Apply `payload` to a single record.
///
/// Returns `target` itself (same allocation) when nothing changed.
pub fn patch(target: &Record, payload: &Patch, definition: &Definition) -> Record {
    patch_record(target, Raw::Patch(payload), definition)
}

/// Apply `payload` to the record stored under `key`.
///
/// Missing keys and no-op patches return `target` itself.
pub fn patch_in_index(
    target: &Index,
    key: &str,
    payload: &Patch,
    definition: &Definition,
) -> Index {
    let Some(existing) = target.get(key) else {
        trace!(key, "patch target missing from collection");
        return target.clone();
    };

    let next = patch(existing, payload, definition);
    if next.ptr_eq(existing) {
        return target.clone();
    }

    let mut draft = Draft::new(target.as_record());
    draft.insert(key, Value::Object(next));
    Index::from_record(draft.finish())
}

pub(crate) fn patch_record(target: &Record, raw: Raw<'_>, definition: &Definition) -> Record {
    let Some(clean) = definition.sanitize_patch(raw) else {
        return target.clone();
    };

    let mut draft = Draft::new(target);

    for (field, change) in clean.iter() {
        if let PatchValue::Delete = change {
            draft.remove(field);
            continue;
        }

        let Some(shape) = definition.get_definitions(field) else {
            continue;
        };

        if let Some(value) = apply_field(target.get(field), change, shape, definition.options()) {
            draft.insert(field, value);
        }
    }

    let next = draft.finish();
    if next.ptr_eq(target) {
        trace!("patch resolved to a no-op");
    }
    next
}

/// New value for one field, or `None` when the field is unchanged.
fn apply_field(
    current: Option<&Value>,
    change: &PatchValue,
    shape: &Shape,
    options: &Options,
) -> Option<Value> {
    if let (Some(current), PatchValue::Set(value)) = (current, change) {
        if current.same(value) {
            return None;
        }
    }

    match shape {
        Shape::Index(child) => {
            let existing = current.and_then(Index::from_value).unwrap_or_default();
            let merged = merge_entries(&existing, Raw::of(change).entries(), child);
            (!merged.ptr_eq(&existing)).then(|| merged.into())
        }
        Shape::Object(child) => match current.and_then(Value::as_record) {
            Some(existing) => {
                let next = patch_record(existing, Raw::of(change), child);
                (!next.ptr_eq(existing)).then_some(Value::Object(next))
            }
            None => child.sanitize_payload(Raw::of(change)).map(Value::Object),
        },
        Shape::Array => {
            let PatchValue::Set(Value::Array(incoming)) = change else {
                return None;
            };
            let Some(existing) = current.and_then(Value::as_array) else {
                return Some(Value::Array(incoming.clone()));
            };
            let merged = match options.array_patch {
                ArrayPatch::Union => union(existing, incoming),
                ArrayPatch::Replace if existing == incoming => existing.clone(),
                ArrayPatch::Replace => incoming.clone(),
            };
            (!merged.ptr_eq(existing)).then_some(Value::Array(merged))
        }
        Shape::Scalar => {
            let value = change.to_value();
            (current != Some(&value)).then_some(value)
        }
    }
}
