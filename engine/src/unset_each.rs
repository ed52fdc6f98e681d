//! Bulk removals.

use crate::value::Draft;
use crate::{Array, Index, Value};

/// Remove every element of `values` from a primitive array.
pub fn unset_each_in_array(target: &Array, values: &[Value]) -> Array {
    difference(target, values)
}

/// Remove the entries filed under `keys`. Unknown keys are ignored.
pub fn unset_each_in_index<K: AsRef<str>>(target: &Index, keys: &[K]) -> Index {
    let mut draft = Draft::new(target.as_record());
    for key in keys {
        let key = key.as_ref();
        if draft.get_record(key).is_some() {
            draft.remove(key);
        }
    }
    Index::from_record(draft.finish())
}

pub(crate) fn difference(target: &Array, values: &[Value]) -> Array {
    if !target.iter().any(|value| values.contains(value)) {
        return target.clone();
    }
    target
        .iter()
        .filter(|value| !values.contains(value))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn array(value: serde_json::Value) -> Array {
        match Value::from(value) {
            Value::Array(array) => array,
            _ => Array::new(),
        }
    }

    #[test]
    fn array_removes_present_values() {
        let target = array(json!([1, "two", 3, true]));
        let result = unset_each_in_array(&target, array(json!([3, true, 9])).as_slice());
        assert_eq!(result, array(json!([1, "two"])));
    }

    #[test]
    fn array_removes_numbers_in_any_form() {
        let target = array(json!([1, 2.0, 3]));
        let result = unset_each_in_array(&target, array(json!([1.0, 2])).as_slice());
        assert_eq!(result, array(json!([3])));
    }

    #[test]
    fn array_noop_when_nothing_removed() {
        let target = array(json!([1, 2]));
        assert!(unset_each_in_array(&target, array(json!([3])).as_slice()).ptr_eq(&target));
        assert!(unset_each_in_array(&target, &[]).ptr_eq(&target));
    }

    #[test]
    fn index_removes_listed_keys() {
        let target = Index::try_from(json!({
            "a": {"id": "a"},
            "b": {"id": "b"},
            "c": {"id": "c"}
        }))
        .unwrap();

        let result = unset_each_in_index(&target, &["a", "c", "zzz"]);
        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["b"]);
        assert!(result.get("b").unwrap().ptr_eq(target.get("b").unwrap()));
    }

    #[test]
    fn index_noop_when_no_key_present() {
        let target = Index::try_from(json!({"a": {"id": "a"}})).unwrap();
        let keys: Vec<String> = vec!["b".into(), "c".into()];
        assert!(unset_each_in_index(&target, &keys).ptr_eq(&target));
        assert!(unset_each_in_index::<&str>(&target, &[]).ptr_eq(&target));
    }

    #[test]
    fn index_noop_for_non_record_entries() {
        let target = Index::try_from(json!({"a": {"id": "a"}, "stray": 3})).unwrap();
        assert!(!target.contains_key("stray"));
        assert!(unset_each_in_index(&target, &["stray"]).ptr_eq(&target));
    }
}
