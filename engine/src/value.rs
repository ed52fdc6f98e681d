//! Value tree for sanitized records.
//!
//! Containers are reference counted, so cloning a [`Record`], [`Array`] or
//! [`Index`] is shallow and untouched branches are shared between the input
//! and the output of every operation. Identity (`ptr_eq`) is how callers
//! detect that an operation changed nothing.

use crate::{Error, Key};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Field storage backing a [`Record`].
pub type Map = BTreeMap<String, Value>;

/// A stored value.
///
/// There is no deletion marker here: removal requests only exist in
/// [`Patch`](crate::Patch) trees, so a sanitized record can never hold one.
///
/// Equality treats numbers by magnitude, so `2` and `2.0` are equal.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Primitive array
    Array(Array),
    /// Nested record, or a keyed collection of records
    Object(Record),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Object(record) => Some(record),
            _ => None,
        }
    }

    /// Strict equality: scalars compare by value, containers by identity.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (a, b) => a == b,
        }
    }

    /// Text form used when a value serves as a collection key.
    ///
    /// Missing keys, `null`, `false`, empty strings and zero are not keys.
    pub(crate) fn to_key(&self) -> Option<Key> {
        match self {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(number_key(n)),
            Value::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => number_eq(a, b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

/// Largest magnitude below which every integral `f64` is exact.
const MAX_SAFE_FLOAT: f64 = 9_007_199_254_740_992.0;

fn number_eq(a: &Number, b: &Number) -> bool {
    if a.is_f64() || b.is_f64() {
        a.as_f64() == b.as_f64()
    } else {
        a == b
    }
}

/// Integral floats print without a fraction, so `7.0` keys as `"7"`.
fn number_key(n: &Number) -> Key {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_SAFE_FLOAT => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "Null",
        serde_json::Value::Bool(_) => "Bool",
        serde_json::Value::Number(_) => "Number",
        serde_json::Value::String(_) => "String",
        serde_json::Value::Array(_) => "Array",
        serde_json::Value::Object(_) => "Object",
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(array) => array.iter().map(serde_json::Value::from).collect(),
            Value::Object(record) => serde_json::Value::from(record),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        serde_json::Value::from(&value)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON form and become `Null`.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record)
    }
}

impl From<Index> for Value {
    fn from(index: Index) -> Self {
        Value::Object(index.0)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_json::Value::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

/// A shared primitive array (strings, numbers, booleans).
#[derive(Debug, Clone, Default)]
pub struct Array(Arc<Vec<Value>>);

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.0.contains(value)
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// True when both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Array) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl From<Vec<Value>> for Array {
    fn from(items: Vec<Value>) -> Self {
        Self(Arc::new(items))
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for Array {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Array {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Value>::deserialize(deserializer).map(Array::from)
    }
}

/// A shared record: field name to value.
#[derive(Debug, Clone, Default)]
pub struct Record(Arc<Map>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map) -> Self {
        Self(Arc::new(map))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Shallow copy of the fields; nested containers stay shared.
    pub fn to_map(&self) -> Map {
        (*self.0).clone()
    }

    /// True when both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Record) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}

impl TryFrom<serde_json::Value> for Record {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match Value::from(value) {
            Value::Object(record) => Ok(record),
            other => Err(Error::NotAnObject(json_type_name(&other.into()))),
        }
    }
}

impl From<&Record> for serde_json::Value {
    fn from(record: &Record) -> Self {
        serde_json::Value::Object(
            record
                .iter()
                .map(|(name, value)| (name.to_string(), serde_json::Value::from(value)))
                .collect(),
        )
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Record::from_map)
    }
}

/// A keyed collection of records.
///
/// Stored as a [`Record`] whose entries are nested records, so a collection
/// held in a parent field converts to and from an `Index` without copying.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Index(Record);

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_record(record: Record) -> Self {
        Self(record)
    }

    /// View an object value as a collection.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_record().cloned().map(Self)
    }

    /// Record stored under `key`; non-record entries are ignored.
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.0.get(key).and_then(Value::as_record)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.0
            .iter()
            .filter_map(|(key, value)| value.as_record().map(|record| (key, record)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_record(&self) -> &Record {
        &self.0
    }

    /// True when both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Index) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl FromIterator<(Key, Record)> for Index {
    fn from_iter<I: IntoIterator<Item = (Key, Record)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, record)| (key, Value::Object(record)))
                .collect(),
        )
    }
}

impl TryFrom<serde_json::Value> for Index {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        Record::try_from(value).map(Self)
    }
}

impl Serialize for Index {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Index {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Record::deserialize(deserializer).map(Self)
    }
}

/// Copy-on-write builder over a record.
///
/// The field map is only cloned on the first write; `finish` hands back the
/// original handle when nothing was written.
pub(crate) struct Draft<'a> {
    base: &'a Record,
    next: Option<Map>,
}

impl<'a> Draft<'a> {
    pub(crate) fn new(base: &'a Record) -> Self {
        Self { base, next: None }
    }

    pub(crate) fn get(&self, field: &str) -> Option<&Value> {
        match &self.next {
            Some(map) => map.get(field),
            None => self.base.get(field),
        }
    }

    pub(crate) fn get_record(&self, key: &str) -> Option<&Record> {
        self.get(key).and_then(Value::as_record)
    }

    pub(crate) fn insert(&mut self, field: &str, value: Value) {
        let base = self.base;
        self.next
            .get_or_insert_with(|| base.to_map())
            .insert(field.to_string(), value);
    }

    pub(crate) fn remove(&mut self, field: &str) {
        if self.get(field).is_none() {
            return;
        }
        let base = self.base;
        self.next.get_or_insert_with(|| base.to_map()).remove(field);
    }

    pub(crate) fn finish(self) -> Record {
        match self.next {
            Some(map) => Record::from_map(map),
            None => self.base.clone(),
        }
    }
}
