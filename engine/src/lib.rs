//! # Patchwork Engine
//!
//! Schema-driven immutable updates for tree-shaped record data.
//!
//! A [`Definition`] describes one record type field by field. Raw input is
//! sanitized against it, and patches are applied to existing records while
//! field policies (key, required, readonly, nested shape) are enforced.
//!
//! ## Design Principles
//!
//! - **No mutation**: every operation returns either its input or a new value
//! - **Identity means unchanged**: a no-op hands back the same allocation, so
//!   `ptr_eq` is a complete change check
//! - **Structural sharing**: only the branches on the path of a change are
//!   reallocated
//! - **Lenient data, strict definitions**: bad payloads are dropped silently,
//!   bad definitions are rejected with an [`Error`]
//!
//! ## Core Concepts
//!
//! ### Rules and Definitions
//!
//! A [`Rule`] pairs a [`Shape`] (scalar, primitive array, nested record,
//! keyed collection) with key/required/readonly flags. [`define`] compiles a
//! set of rules into a shareable [`Definition`].
//!
//! ### Values
//!
//! [`Value`] is a JSON-like tree whose containers ([`Array`], [`Record`],
//! [`Index`]) are reference counted. Cloning is cheap and never deep.
//!
//! ### Patches
//!
//! A [`Patch`] maps field names to a [`PatchValue`]: set a value, merge a
//! nested patch, or delete the field.
//!
//! ## Quick Start
//!
//! ```rust
//! use patchwork_engine::{
//!     array, define, index_of, key, patch, patch_each_from_list, required,
//!     Index, Patch, Record,
//! };
//! use serde_json::json;
//!
//! // 1. Define record types
//! let task = define([("id", key()), ("title", required())]).unwrap();
//! let board = define([
//!     ("id", key()),
//!     ("name", required()),
//!     ("tags", array()),
//!     ("tasks", index_of(&task)),
//! ])
//! .unwrap();
//!
//! // 2. Sanitize raw input into a record
//! let raw = Patch::from(json!({"id": "b1", "name": "Sprint", "owner": "ignored"}));
//! let record: Record = board.get_payload(&raw).unwrap();
//! assert_eq!(record.len(), 2); // "owner" is not declared
//!
//! // 3. Apply a patch
//! let next = patch(&record, &Patch::from(json!({"tags": ["urgent"]})), &board);
//! assert!(!next.ptr_eq(&record));
//!
//! // 4. Re-applying the same patch changes nothing
//! let again = patch(&next, &Patch::from(json!({"tags": ["urgent"]})), &board);
//! assert!(again.ptr_eq(&next));
//!
//! // 5. Bulk patches over a collection
//! let tasks = Index::try_from(json!({"t1": {"id": "t1", "title": "Write"}})).unwrap();
//! let updated = patch_each_from_list(
//!     &tasks,
//!     &[Patch::from(json!({"id": "t1", "title": "Review"}))],
//!     &task,
//! );
//! assert_eq!(updated.get("t1").unwrap().get("title").unwrap().as_str(), Some("Review"));
//! ```
//!
//! ## Logging
//!
//! Definition construction logs at `debug`, dropped input at `trace`, through
//! [`tracing`]. The crate never installs a subscriber.

pub mod definition;
pub mod error;
pub mod helpers;
pub mod options;
pub mod patch;
pub mod patch_each;
pub mod patch_value;
pub mod rules;
pub mod set;
pub mod set_each;
pub mod unset;
pub mod unset_each;
pub mod value;

// Re-export main types at crate root
pub use definition::{define, define_with, Definition};
pub use error::{Error, Result};
pub use helpers::{deindex, index};
pub use options::{ArrayPatch, Options};
pub use patch::{patch, patch_in_index};
pub use patch_each::{patch_each_from_list, patch_each_from_map};
pub use patch_value::{Patch, PatchValue};
pub use rules::{array, immutable, index_of, key, object_of, optional, required, Rule, Shape};
pub use set::{set_field, set_in_array, set_in_index};
pub use set_each::{set_each_from_list, set_each_from_map, set_each_in_array};
pub use unset::{unset_field, unset_in_array, unset_in_index};
pub use unset_each::{unset_each_in_array, unset_each_in_index};
pub use value::{Array, Index, Map, Record, Value};

/// Type aliases for clarity
pub type FieldName = String;
pub type Key = String;
