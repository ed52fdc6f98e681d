//! Field rules and their combinators.
//!
//! A [`Rule`] has exactly one [`Shape`] plus three orthogonal flags. Shape
//! constructors (`array`, `object_of`, `index_of`) start optional and
//! mutable; the flag methods wrap a rule without touching its shape:
//!
//! ```rust
//! use patchwork_engine::{define, immutable, key, object_of, required};
//!
//! let child = define([("id", key()), ("name", required())]).unwrap();
//! let rule = object_of(&child).required().immutable();
//! assert!(rule.is_required() && rule.is_readonly());
//!
//! // Optional, but unchangeable once set.
//! let once = immutable().optional();
//! assert!(!once.is_required() && once.is_readonly());
//! ```

use crate::Definition;

/// Shape of the value a field holds.
#[derive(Debug, Clone, Default)]
pub enum Shape {
    /// Any single value, replaced wholesale
    #[default]
    Scalar,
    /// Primitive array with set semantics
    Array,
    /// Single nested record
    Object(Definition),
    /// Keyed collection of nested records
    Index(Definition),
}

impl Shape {
    pub fn is_array(&self) -> bool {
        matches!(self, Shape::Array)
    }

    pub fn object(&self) -> Option<&Definition> {
        match self {
            Shape::Object(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn index(&self) -> Option<&Definition> {
        match self {
            Shape::Index(definition) => Some(definition),
            _ => None,
        }
    }
}

/// Policy for one field of a record type.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    pub(crate) is_key: bool,
    pub(crate) is_required: bool,
    pub(crate) is_readonly: bool,
    pub(crate) shape: Shape,
}

impl Rule {
    /// Make the field required. Required fields cannot be removed by a patch.
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Make the field optional.
    pub fn optional(mut self) -> Self {
        self.is_required = false;
        self
    }

    /// Make the field readonly. Required-ness is left as it was.
    ///
    /// Patches skip readonly fields entirely; a readonly nested record or
    /// collection is frozen after creation, its inner fields included.
    pub fn immutable(mut self) -> Self {
        self.is_readonly = true;
        self
    }

    pub fn is_key(&self) -> bool {
        self.is_key
    }

    pub fn is_required(&self) -> bool {
        self.is_required
    }

    pub fn is_readonly(&self) -> bool {
        self.is_readonly
    }

    pub fn is_array(&self) -> bool {
        self.shape.is_array()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

/// The collection key. Implies required and readonly.
pub fn key() -> Rule {
    Rule {
        is_key: true,
        is_required: true,
        is_readonly: true,
        shape: Shape::Scalar,
    }
}

/// A required scalar field.
pub fn required() -> Rule {
    Rule::default().required()
}

/// An optional scalar field.
pub fn optional() -> Rule {
    Rule::default()
}

/// A required field that can be set on creation but never changed.
pub fn immutable() -> Rule {
    Rule::default().required().immutable()
}

/// An optional primitive array.
pub fn array() -> Rule {
    Rule {
        shape: Shape::Array,
        ..Rule::default()
    }
}

/// An optional nested record governed by `definition`.
pub fn object_of(definition: &Definition) -> Rule {
    Rule {
        shape: Shape::Object(definition.clone()),
        ..Rule::default()
    }
}

/// An optional keyed collection governed by `definition`.
pub fn index_of(definition: &Definition) -> Rule {
    Rule {
        shape: Shape::Index(definition.clone()),
        ..Rule::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define;

    #[test]
    fn key_is_required_and_readonly() {
        let rule = key();
        assert!(rule.is_key());
        assert!(rule.is_required());
        assert!(rule.is_readonly());
        assert!(matches!(rule.shape(), Shape::Scalar));
    }

    #[test]
    fn immutable_defaults_to_required() {
        let rule = immutable();
        assert!(rule.is_readonly());
        assert!(rule.is_required());

        let rule = immutable().optional();
        assert!(rule.is_readonly());
        assert!(!rule.is_required());
    }

    #[test]
    fn flags_keep_shape() {
        let child = define([("id", key())]).unwrap();

        let rule = object_of(&child).required();
        assert!(rule.is_required());
        assert!(rule.shape().object().is_some());

        let rule = index_of(&child).immutable();
        assert!(rule.is_readonly());
        assert!(!rule.is_required());
        assert!(rule.shape().index().is_some());

        let rule = array().required();
        assert!(rule.is_array());
        assert!(!rule.is_key());
    }

    #[test]
    fn shapes_start_optional_and_mutable() {
        let rule = array();
        assert!(!rule.is_required());
        assert!(!rule.is_readonly());
        assert!(!optional().is_required());
        assert!(required().is_required());
    }
}
