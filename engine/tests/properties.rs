//! Property-based tests for patchwork-engine

use patchwork_engine::{
    array, define, index_of, key, object_of, optional, patch, required, Array, Definition,
    Patch, PatchValue, Record, Value,
};
use proptest::prelude::*;

fn child_definition() -> Definition {
    define([("id", key()), ("name", required())]).unwrap()
}

fn definition() -> Definition {
    define([
        ("id", key()),
        ("name", required()),
        ("value", optional()),
        ("tags", array()),
        ("child", object_of(&child_definition())),
        ("children", index_of(&child_definition())),
    ])
    .unwrap()
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-3i64..3).prop_map(Value::from),
        "[a-c]{0,2}".prop_map(Value::from),
    ]
}

fn arb_text() -> impl Strategy<Value = Value> {
    "[a-c]{1,2}".prop_map(Value::from)
}

fn arb_array() -> impl Strategy<Value = Value> {
    prop::collection::vec(arb_scalar(), 0..4).prop_map(|items| Value::Array(Array::from(items)))
}

fn arb_child() -> impl Strategy<Value = Value> {
    (arb_scalar(), arb_scalar()).prop_map(|(id, name)| {
        Value::Object(Record::from_iter([
            ("id".to_string(), id),
            ("name".to_string(), name),
        ]))
    })
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => arb_scalar(),
        1 => arb_array(),
        1 => arb_child(),
    ]
}

fn arb_leaf_change() -> impl Strategy<Value = PatchValue> {
    prop_oneof![
        4 => arb_value().prop_map(PatchValue::Set),
        1 => Just(PatchValue::Delete),
    ]
}

/// Nested patch over the fields of a child record.
fn arb_child_patch() -> impl Strategy<Value = Patch> {
    prop::collection::btree_map(
        prop_oneof![Just("id"), Just("name"), Just("extra")].prop_map(String::from),
        arb_leaf_change(),
        0..3,
    )
    .prop_map(|changes| changes.into_iter().collect::<Patch>())
}

/// Nested patch over child fields, or over collection entries `a` and `b`.
fn arb_merge() -> impl Strategy<Value = Patch> {
    let entry = prop_oneof![
        2 => arb_child_patch().prop_map(PatchValue::Merge),
        2 => arb_leaf_change(),
    ];

    prop_oneof![
        arb_child_patch(),
        prop::collection::btree_map(
            prop_oneof![Just("a"), Just("b"), Just("name")].prop_map(String::from),
            entry,
            0..3,
        )
        .prop_map(|changes| changes.into_iter().collect::<Patch>()),
    ]
}

fn arb_change() -> impl Strategy<Value = PatchValue> {
    prop_oneof![
        4 => arb_leaf_change(),
        2 => arb_merge().prop_map(PatchValue::Merge),
    ]
}

fn arb_field() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("id"),
        Just("name"),
        Just("value"),
        Just("tags"),
        Just("child"),
        Just("children"),
        Just("extra"),
    ]
    .prop_map(String::from)
}

fn arb_patch() -> impl Strategy<Value = Patch> {
    prop::collection::btree_map(arb_field(), arb_change(), 0..6)
        .prop_map(|changes| changes.into_iter().collect())
}

/// Records that already satisfy `definition()`.
fn arb_record() -> impl Strategy<Value = Record> {
    (
        arb_text(),
        arb_text(),
        proptest::option::of(arb_scalar()),
        proptest::option::of(arb_array()),
        proptest::option::of((arb_text(), arb_text())),
        prop::collection::btree_map(
            prop_oneof![Just("a"), Just("b")].prop_map(String::from),
            arb_text(),
            0..3,
        ),
    )
        .prop_map(|(id, name, value, tags, child, children)| {
            let mut raw = Patch::new().set("id", id).set("name", name);
            if let Some(value) = value {
                raw = raw.set("value", value);
            }
            if let Some(tags) = tags {
                raw = raw.set("tags", tags);
            }
            if let Some((id, name)) = child {
                raw = raw.merge("child", Patch::new().set("id", id).set("name", name));
            }
            if !children.is_empty() {
                let entries = children
                    .into_iter()
                    .map(|(key, name)| {
                        let entry = Patch::new().set("id", key.as_str()).set("name", name);
                        (key, PatchValue::Merge(entry))
                    })
                    .collect();
                raw = raw.merge("children", entries);
            }
            definition().get_payload(&raw).unwrap()
        })
}

proptest! {
    #[test]
    fn prop_patch_is_idempotent(target in arb_record(), payload in arb_patch()) {
        let definition = definition();
        let once = patch(&target, &payload, &definition);
        let twice = patch(&once, &payload, &definition);
        prop_assert!(twice.ptr_eq(&once));
    }

    #[test]
    fn prop_unchanged_means_identical(target in arb_record(), payload in arb_patch()) {
        let result = patch(&target, &payload, &definition());
        if result == target {
            prop_assert!(result.ptr_eq(&target));
        }
    }

    #[test]
    fn prop_payload_strips_unknown_fields(raw in arb_patch(), extra in arb_value()) {
        let mut raw = raw;
        raw.insert("extra", extra);
        if let Some(record) = definition().get_payload(&raw) {
            prop_assert!(!record.contains("extra"));
        }
    }

    #[test]
    fn prop_key_never_changes(target in arb_record(), id in arb_value()) {
        let payload = Patch::new().set("id", id).set("name", "renamed");
        let result = patch(&target, &payload, &definition());
        prop_assert_eq!(result.get("id"), target.get("id"));
    }

    #[test]
    fn prop_required_fields_stay(target in arb_record()) {
        let definition = definition();
        for field in ["id", "name"] {
            let result = patch(&target, &Patch::new().delete(field), &definition);
            prop_assert!(result.ptr_eq(&target));
        }
    }

    #[test]
    fn prop_payload_key_roundtrip(id in "[a-z]{1,8}", name in arb_text()) {
        let definition = definition();
        let raw = Patch::new().set("id", id.as_str()).set("name", name);
        let record = definition.get_payload(&raw).unwrap();
        prop_assert_eq!(definition.get_key(&record), Some(id));
    }
}
