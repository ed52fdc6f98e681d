//! Patch payloads.
//!
//! A [`Patch`] describes requested field changes. Removal is an explicit
//! [`PatchValue::Delete`] case rather than a marker value, and nested patches
//! ([`PatchValue::Merge`]) may carry their own deletions.

use crate::{Array, FieldName, Index, Record, Value};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// A single requested change.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    /// Set (or merge, for nested shapes) the given value.
    Set(Value),
    /// Merge a nested patch into an object or collection field.
    Merge(Patch),
    /// Remove the field.
    Delete,
}

impl PatchValue {
    /// Storable form of this change. Deletions inside nested patches are dropped.
    pub fn to_value(&self) -> Value {
        match self {
            PatchValue::Set(value) => value.clone(),
            PatchValue::Merge(patch) => Value::Object(patch.to_record()),
            PatchValue::Delete => Value::Null,
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for PatchValue {
                fn from(value: $ty) -> Self {
                    PatchValue::Set(value.into())
                }
            }
        )*
    };
}

impl_from_value!(Value, &str, String, bool, i32, i64, u64, f64, Array, Record, Index);

impl From<serde_json::Value> for PatchValue {
    fn from(value: serde_json::Value) -> Self {
        PatchValue::Set(value.into())
    }
}

impl From<Patch> for PatchValue {
    fn from(patch: Patch) -> Self {
        PatchValue::Merge(patch)
    }
}

/// A partial record: field name to requested change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch(BTreeMap<FieldName, PatchValue>);

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style method to set a field.
    pub fn set(mut self, field: impl Into<FieldName>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), PatchValue::Set(value.into()));
        self
    }

    /// Builder-style method to merge a nested patch into a field.
    pub fn merge(mut self, field: impl Into<FieldName>, patch: Patch) -> Self {
        self.0.insert(field.into(), PatchValue::Merge(patch));
        self
    }

    /// Builder-style method to request removal of a field.
    pub fn delete(mut self, field: impl Into<FieldName>) -> Self {
        self.0.insert(field.into(), PatchValue::Delete);
        self
    }

    pub fn insert(
        &mut self,
        field: impl Into<FieldName>,
        value: impl Into<PatchValue>,
    ) -> Option<PatchValue> {
        self.0.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&PatchValue> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PatchValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Storable form of this patch, with deletions dropped.
    pub fn to_record(&self) -> Record {
        self.0
            .iter()
            .filter(|(_, value)| !matches!(value, PatchValue::Delete))
            .map(|(name, value)| (name.clone(), value.to_value()))
            .collect()
    }
}

impl From<&Record> for Patch {
    fn from(record: &Record) -> Self {
        Self(
            record
                .iter()
                .map(|(name, value)| (name.to_string(), PatchValue::Set(value.clone())))
                .collect(),
        )
    }
}

impl From<Record> for Patch {
    fn from(record: Record) -> Self {
        Patch::from(&record)
    }
}

impl From<serde_json::Value> for Patch {
    /// JSON objects become `Set` entries; anything else has no fields.
    fn from(value: serde_json::Value) -> Self {
        match Value::from(value) {
            Value::Object(record) => Patch::from(&record),
            _ => Patch::new(),
        }
    }
}

impl FromIterator<(FieldName, PatchValue)> for Patch {
    fn from_iter<I: IntoIterator<Item = (FieldName, PatchValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for Patch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Record::deserialize(deserializer).map(Patch::from)
    }
}

/// Borrowed view over raw input that may or may not carry fields.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Raw<'a> {
    Patch(&'a Patch),
    Record(&'a Record),
    /// Scalars, arrays and deletions have no fields.
    Scalar,
}

/// A present field within raw input. `null` counts as absent.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Slot<'a> {
    Value(&'a Value),
    Merge(&'a Patch),
    Delete,
}

impl<'a> Raw<'a> {
    pub(crate) fn of(value: &'a PatchValue) -> Self {
        match value {
            PatchValue::Merge(patch) => Raw::Patch(patch),
            PatchValue::Set(Value::Object(record)) => Raw::Record(record),
            _ => Raw::Scalar,
        }
    }

    pub(crate) fn get(self, field: &str) -> Option<Slot<'a>> {
        match self {
            Raw::Patch(patch) => patch.get(field).and_then(Slot::of),
            Raw::Record(record) => record.get(field).and_then(Slot::of_value),
            Raw::Scalar => None,
        }
    }

    /// Every field in the input, with `None` for `null` values.
    pub(crate) fn fields(self) -> Box<dyn Iterator<Item = (&'a str, Option<Slot<'a>>)> + 'a> {
        match self {
            Raw::Patch(patch) => {
                Box::new(patch.iter().map(|(name, value)| (name, Slot::of(value))))
            }
            Raw::Record(record) => {
                Box::new(record.iter().map(|(name, value)| (name, Slot::of_value(value))))
            }
            Raw::Scalar => Box::new(std::iter::empty()),
        }
    }

    /// Fields viewed as raw collection entries.
    pub(crate) fn entries(self) -> impl Iterator<Item = (&'a str, Raw<'a>)> + 'a {
        self.fields()
            .map(|(key, slot)| (key, slot.map_or(Raw::Scalar, Slot::as_raw)))
    }
}

impl<'a> Slot<'a> {
    fn of(value: &'a PatchValue) -> Option<Self> {
        match value {
            PatchValue::Set(value) => Slot::of_value(value),
            PatchValue::Merge(patch) => Some(Slot::Merge(patch)),
            PatchValue::Delete => Some(Slot::Delete),
        }
    }

    fn of_value(value: &'a Value) -> Option<Self> {
        (!value.is_null()).then_some(Slot::Value(value))
    }

    pub(crate) fn as_raw(self) -> Raw<'a> {
        match self {
            Slot::Value(Value::Object(record)) => Raw::Record(record),
            Slot::Merge(patch) => Raw::Patch(patch),
            _ => Raw::Scalar,
        }
    }

    pub(crate) fn is_array(self) -> bool {
        matches!(self, Slot::Value(Value::Array(_)))
    }

    pub(crate) fn to_value(self) -> Value {
        match self {
            Slot::Value(value) => value.clone(),
            Slot::Merge(patch) => Value::Object(patch.to_record()),
            Slot::Delete => Value::Null,
        }
    }

    pub(crate) fn to_patch_value(self) -> PatchValue {
        match self {
            Slot::Value(value) => PatchValue::Set(value.clone()),
            Slot::Merge(patch) => PatchValue::Merge(patch.clone()),
            Slot::Delete => PatchValue::Delete,
        }
    }
}
