//! # Structshare Value
//!
//! The value model shared by the reconciler: atoms, ordered sequences and
//! string-keyed mappings, plus opaque host values.
//!
//! Composite nodes are atomically reference counted. Cloning a [`Value`]
//! shares the node instead of copying it, and [`Value::ptr_eq`] observes
//! that sharing. Nodes are immutable once sealed; cyclic graphs are built
//! with the `deferred` constructors. Values are `Send + Sync`, so a graph
//! can be built on one thread and reconciled on another.
//!
//! ```
//! use structshare_value::Value;
//!
//! let inner = Value::sequence([Value::from("a"), Value::from(1)]);
//! let outer = Value::mapping([("items", inner.clone())]);
//!
//! assert!(Value::ptr_eq(outer.get("items").unwrap(), &inner));
//! ```

pub mod error;
mod fmt;
#[cfg(feature = "json")]
pub mod json;
pub mod mapping;
pub mod opaque;
pub mod sequence;
pub mod value;

pub use error::{ValueError, ValueResult};
pub use mapping::{Entries, Mapping};
pub use opaque::Opaque;
pub use sequence::Sequence;
pub use value::{numbers_equal, Kind, Value};
