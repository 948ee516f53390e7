use std::fmt;
use std::sync::Arc;

use crate::{Mapping, Opaque, Sequence};

/// A node in a value graph
///
/// Atoms are compared by value, composites by structure. Cloning a value
/// never copies a composite: the clone refers to the same node, which is
/// what lets reconciliation hand back parts of an older graph.
#[derive(Clone, Default)]
pub enum Value {
    /// Absence marker, distinct from a missing key
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Arc<str>),
    Sequence(Sequence),
    Mapping(Mapping),
    Opaque(Opaque),
}

/// Structural kind of a [`Value`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Sequence,
    Mapping,
    Opaque,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Undefined => "undefined",
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Sequence => "sequence",
            Kind::Mapping => "mapping",
            Kind::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

/// Numeric equality used throughout the model: `NaN` equals `NaN`.
pub fn numbers_equal(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Arc::from(s.as_ref()))
    }

    pub fn number(n: impl Into<f64>) -> Self {
        Value::Number(n.into())
    }

    pub fn opaque<T: std::any::Any + Send + Sync>(value: T) -> Self {
        Value::Opaque(Opaque::new(value))
    }

    pub fn sequence(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Sequence(items.into_iter().collect())
    }

    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Mapping(Mapping::new(entries))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Undefined => Kind::Undefined,
            Value::Null => Kind::Null,
            Value::Boolean(_) => Kind::Boolean,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Sequence(_) => Kind::Sequence,
            Value::Mapping(_) => Kind::Mapping,
            Value::Opaque(_) => Kind::Opaque,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Sequence(_) | Value::Mapping(_))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&Opaque> {
        match self {
            Value::Opaque(handle) => Some(handle),
            _ => None,
        }
    }

    /// Mapping field lookup; `None` for missing keys and non-mappings
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping()?.get(key)
    }

    /// Sequence element lookup; `None` when out of range or not a sequence
    pub fn index(&self, index: usize) -> Option<&Value> {
        self.as_sequence()?.get(index)
    }

    /// Number of elements or entries; zero for atoms
    pub fn len(&self) -> usize {
        match self {
            Value::Sequence(seq) => seq.len(),
            Value::Mapping(map) => map.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reference identity.
    ///
    /// Strings, composites and opaque values are identical only when they
    /// share an allocation. Payload-free atoms have no allocation to share,
    /// so for them identity is value equality.
    pub fn ptr_eq(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(x), Value::Boolean(y)) => x == y,
            (Value::Number(x), Value::Number(y)) => numbers_equal(*x, *y),
            (Value::String(x), Value::String(y)) => Arc::ptr_eq(x, y),
            (Value::Sequence(x), Value::Sequence(y)) => Sequence::ptr_eq(x, y),
            (Value::Mapping(x), Value::Mapping(y)) => Mapping::ptr_eq(x, y),
            (Value::Opaque(x), Value::Opaque(y)) => Opaque::ptr_eq(x, y),
            _ => false,
        }
    }

    /// Node address for composites, used to key recursion guards
    pub fn node_ptr(&self) -> Option<*const ()> {
        match self {
            Value::Sequence(seq) => Some(seq.as_ptr()),
            Value::Mapping(map) => Some(map.as_ptr()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Sequence> for Value {
    fn from(seq: Sequence) -> Self {
        Value::Sequence(seq)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(map)
    }
}

impl From<Opaque> for Value {
    fn from(handle: Opaque) -> Self {
        Value::Opaque(handle)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
