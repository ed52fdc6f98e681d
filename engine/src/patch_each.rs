//! Bulk patches over a keyed collection.

use crate::patch::{patch, patch_record};
use crate::patch_value::Raw;
use crate::value::Draft;
use crate::{Definition, Index, Key, Patch, Value};
use std::collections::BTreeMap;
use tracing::trace;

/// Patch existing records; each patch names its record through the key field.
///
/// Patches without a key, or whose key has no record, are skipped: this
/// form never creates records. Returns `target` itself when nothing changed.
pub fn patch_each_from_list(target: &Index, payload: &[Patch], definition: &Definition) -> Index {
    let mut draft = Draft::new(target.as_record());

    for item in payload {
        let Some(key) = definition.key_of(item) else {
            trace!("patch without key skipped");
            continue;
        };
        let Some(existing) = draft.get_record(&key) else {
            continue;
        };

        let next = patch(existing, item, definition);
        if !next.ptr_eq(existing) {
            draft.insert(&key, Value::Object(next));
        }
    }

    Index::from_record(draft.finish())
}

/// Patch or create records by key.
///
/// Existing records are patched; missing keys are treated as create
/// requests and inserted when the payload sanitizes.
pub fn patch_each_from_map(
    target: &Index,
    payload: &BTreeMap<Key, Patch>,
    definition: &Definition,
) -> Index {
    merge_entries(
        target,
        payload
            .iter()
            .map(|(key, item)| (key.as_str(), Raw::Patch(item))),
        definition,
    )
}

pub(crate) fn merge_entries<'a>(
    target: &Index,
    entries: impl Iterator<Item = (&'a str, Raw<'a>)>,
    definition: &Definition,
) -> Index {
    let mut draft = Draft::new(target.as_record());

    for (key, raw) in entries {
        let next = match draft.get_record(key) {
            Some(existing) => {
                let next = patch_record(existing, raw, definition);
                if next.ptr_eq(existing) {
                    continue;
                }
                next
            }
            None => match definition.sanitize_payload(raw) {
                Some(record) => record,
                None => {
                    trace!(key, "collection entry dropped");
                    continue;
                }
            },
        };
        draft.insert(key, Value::Object(next));
    }

    Index::from_record(draft.finish())
}
