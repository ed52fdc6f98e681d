//! Definitions: compiled rule sets for one record type.
//!
//! A [`Definition`] is built once and shared (it is a cheap `Arc` handle).
//! It sanitizes raw input for creation ([`Definition::get_payload`]) and for
//! update ([`Definition::get_patch`]), extracts collection keys, and reports
//! the [`Shape`] of each field so the patch engine can recurse.

use crate::patch_value::{Raw, Slot};
use crate::value::Map;
use crate::{
    error::Result, Error, FieldName, Index, Key, Options, Patch, PatchValue, Record, Rule, Shape,
    Value,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

static SCALAR: Shape = Shape::Scalar;

#[derive(Debug)]
struct Field {
    name: FieldName,
    rule: Rule,
}

#[derive(Debug)]
struct Inner {
    /// Declared fields, in declaration order
    fields: Vec<Field>,
    positions: HashMap<FieldName, usize>,
    key: Option<FieldName>,
    options: Options,
    /// Pass-through definition with no declared fields
    dynamic: bool,
}

/// Compiled rule set for one record type.
#[derive(Debug, Clone)]
pub struct Definition(Arc<Inner>);

/// Build a definition from `(field, rule)` pairs with default [`Options`].
///
/// Fields are processed in the order given.
pub fn define<I, N>(rules: I) -> Result<Definition>
where
    I: IntoIterator<Item = (N, Rule)>,
    N: Into<FieldName>,
{
    define_with(rules, Options::default())
}

/// Build a definition with explicit [`Options`].
///
/// Rejects duplicate fields, a second key field, and a key made optional.
pub fn define_with<I, N>(rules: I, options: Options) -> Result<Definition>
where
    I: IntoIterator<Item = (N, Rule)>,
    N: Into<FieldName>,
{
    let mut fields: Vec<Field> = Vec::new();
    let mut positions: HashMap<FieldName, usize> = HashMap::new();
    let mut key: Option<FieldName> = None;

    for (name, rule) in rules {
        let name = name.into();

        if positions.contains_key(&name) {
            return reject(Error::DuplicateField(name));
        }

        if rule.is_key {
            if !rule.is_required {
                return reject(Error::OptionalKey(name));
            }
            if let Some(first) = &key {
                return reject(Error::MultipleKeys {
                    first: first.clone(),
                    second: name,
                });
            }
            key = Some(name.clone());
        }

        positions.insert(name.clone(), fields.len());
        fields.push(Field { name, rule });
    }

    debug!(fields = fields.len(), key = ?key, "definition built");

    Ok(Definition(Arc::new(Inner {
        fields,
        positions,
        key,
        options,
        dynamic: false,
    })))
}

fn reject(err: Error) -> Result<Definition> {
    debug!(%err, "definition rejected");
    Err(err)
}

impl Definition {
    /// A pass-through definition.
    ///
    /// Every field is kept as a scalar; only deletions inside a create
    /// payload are refused. `key_field`, when given, names the collection key.
    pub fn dynamic(key_field: Option<&str>) -> Self {
        Definition(Arc::new(Inner {
            fields: Vec::new(),
            positions: HashMap::new(),
            key: key_field.map(str::to_string),
            options: Options::default(),
            dynamic: true,
        }))
    }

    pub fn is_dynamic(&self) -> bool {
        self.0.dynamic
    }

    /// Name of the key field, if any.
    pub fn key_field(&self) -> Option<&str> {
        self.0.key.as_deref()
    }

    pub fn options(&self) -> &Options {
        &self.0.options
    }

    pub fn rule(&self, field: &str) -> Option<&Rule> {
        self.0
            .positions
            .get(field)
            .map(|&position| &self.0.fields[position].rule)
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.0
            .fields
            .iter()
            .map(|field| (field.name.as_str(), &field.rule))
    }

    /// True when both handles share the same compiled rules.
    pub fn ptr_eq(&self, other: &Definition) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Sanitize raw input into a new record.
    ///
    /// Returns `None` when the input cannot produce a valid record: a
    /// deletion anywhere at this level, a missing required scalar or object,
    /// or an invalid required object.
    pub fn get_payload(&self, raw: &Patch) -> Option<Record> {
        self.sanitize_payload(Raw::Patch(raw))
    }

    /// Sanitize raw input into a patch of mutable, declared fields.
    ///
    /// Returns `None` when no field survives.
    pub fn get_patch(&self, raw: &Patch) -> Option<Patch> {
        self.sanitize_patch(Raw::Patch(raw))
    }

    /// Collection key of a record.
    pub fn get_key(&self, record: &Record) -> Option<Key> {
        let key = self.key_field()?;
        record.get(key).and_then(Value::to_key)
    }

    /// Collection key of raw input.
    pub fn key_of(&self, raw: &Patch) -> Option<Key> {
        self.raw_key(Raw::Patch(raw))
    }

    /// Shape of a field, or `None` for undeclared fields.
    pub fn get_definitions(&self, field: &str) -> Option<&Shape> {
        if self.0.dynamic {
            return Some(&SCALAR);
        }
        self.rule(field).map(Rule::shape)
    }

    pub(crate) fn raw_key(&self, raw: Raw<'_>) -> Option<Key> {
        match raw.get(self.key_field()?)? {
            Slot::Value(value) => value.to_key(),
            _ => None,
        }
    }

    pub(crate) fn sanitize_payload(&self, raw: Raw<'_>) -> Option<Record> {
        if self.0.dynamic {
            return dynamic_payload(raw);
        }

        let mut out = Map::new();
        let mut any_required = false;

        for Field { name, rule } in &self.0.fields {
            any_required |= rule.is_required;

            match raw.get(name) {
                Some(Slot::Delete) => {
                    trace!(field = %name, "payload rejected: deletion in create payload");
                    return None;
                }
                None if !rule.is_required => {}
                None => match &rule.shape {
                    Shape::Array => {
                        out.insert(name.clone(), Value::Array(Default::default()));
                    }
                    Shape::Index(_) => {
                        out.insert(name.clone(), Index::new().into());
                    }
                    Shape::Scalar | Shape::Object(_) => {
                        trace!(field = %name, "payload rejected: missing required field");
                        return None;
                    }
                },
                Some(slot) => match &rule.shape {
                    Shape::Object(child) => match child.sanitize_payload(slot.as_raw()) {
                        Some(record) => {
                            out.insert(name.clone(), Value::Object(record));
                        }
                        None if rule.is_required => {
                            trace!(field = %name, "payload rejected: invalid required object");
                            return None;
                        }
                        None => trace!(field = %name, "invalid optional object dropped"),
                    },
                    Shape::Index(child) => {
                        out.insert(name.clone(), child.sanitize_entries(slot.as_raw()).into());
                    }
                    Shape::Scalar | Shape::Array => {
                        out.insert(name.clone(), slot.to_value());
                    }
                },
            }
        }

        if out.is_empty() && any_required {
            trace!("payload rejected: no fields produced");
            return None;
        }
        Some(Record::from_map(out))
    }

    /// Sanitize every entry of a raw collection; invalid entries are dropped.
    pub(crate) fn sanitize_entries(&self, raw: Raw<'_>) -> Index {
        raw.entries()
            .filter_map(|(key, entry)| match self.sanitize_payload(entry) {
                Some(record) => Some((key.to_string(), record)),
                None => {
                    trace!(key = %key, "collection entry dropped");
                    None
                }
            })
            .collect()
    }

    pub(crate) fn sanitize_patch(&self, raw: Raw<'_>) -> Option<Patch> {
        if self.0.dynamic {
            return dynamic_patch(raw);
        }

        let mut patch = Patch::new();

        for Field { name, rule } in &self.0.fields {
            match raw.get(name) {
                Some(Slot::Delete) => {
                    if !rule.is_readonly && !rule.is_required {
                        patch.insert(name.clone(), PatchValue::Delete);
                    }
                }
                Some(slot) if !rule.is_readonly && (!rule.is_array() || slot.is_array()) => {
                    patch.insert(name.clone(), slot.to_patch_value());
                }
                _ => {}
            }
        }

        (!patch.is_empty()).then_some(patch)
    }
}

fn dynamic_payload(raw: Raw<'_>) -> Option<Record> {
    let mut out = Map::new();
    for (name, slot) in raw.fields() {
        match slot {
            Some(Slot::Delete) => return None,
            Some(slot) => {
                out.insert(name.to_string(), slot.to_value());
            }
            None => {}
        }
    }
    Some(Record::from_map(out))
}

fn dynamic_patch(raw: Raw<'_>) -> Option<Patch> {
    let patch: Patch = raw
        .fields()
        .filter_map(|(name, slot)| slot.map(|slot| (name.to_string(), slot.to_patch_value())))
        .collect();
    (!patch.is_empty()).then_some(patch)
}
