use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crate::error::{ValueError, ValueResult};
use crate::{Kind, Value};

pub type Entries = BTreeMap<String, Value>;

pub type Iter<'a> = std::iter::Flatten<std::option::IntoIter<&'a Entries>>;

/// Shared handle to a string-keyed map of values.
///
/// Entries are kept sorted by key, so iteration order is deterministic.
/// Equality and reconciliation never depend on that order.
#[derive(Clone)]
pub struct Mapping(Arc<OnceLock<Entries>>);

impl Mapping {
    pub fn new<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::from_entries(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    pub fn from_entries(entries: Entries) -> Self {
        Self(Arc::new(OnceLock::from(entries)))
    }

    pub fn empty() -> Self {
        Self::from_entries(Entries::new())
    }

    /// Create an unsealed node that can be referenced from its own entries.
    ///
    /// The node reads as empty until [`Mapping::seal`] is called. A node
    /// that ends up containing itself keeps itself alive for the rest of
    /// the process.
    ///
    /// ```
    /// use structshare_value::{Mapping, Value};
    ///
    /// let node = Mapping::deferred();
    /// node.seal_with([
    ///     ("test", Value::from("foo")),
    ///     ("self", Value::Mapping(node.clone())),
    /// ])
    /// .unwrap();
    /// assert_eq!(node.len(), 2);
    /// ```
    pub fn deferred() -> Self {
        Self(Arc::new(OnceLock::new()))
    }

    /// Fill a deferred node. Fails if the node already has contents.
    pub fn seal(&self, entries: Entries) -> ValueResult<()> {
        self.0.set(entries).map_err(|_| ValueError::AlreadySealed {
            kind: Kind::Mapping,
        })
    }

    pub fn seal_with<K, I>(&self, entries: I) -> ValueResult<()>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        self.seal(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    pub fn is_sealed(&self) -> bool {
        self.0.get().is_some()
    }

    /// Entries of a sealed node; `None` while a deferred node is unsealed.
    pub fn entries(&self) -> Option<&Entries> {
        self.0.get()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries()?.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries().is_some_and(|entries| entries.contains_key(key))
    }

    pub fn len(&self) -> usize {
        self.entries().map_or(0, Entries::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> Iter<'_> {
        self.entries().into_iter().flatten()
    }

    pub fn ptr_eq(a: &Mapping, b: &Mapping) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Address of the shared node, stable for as long as any handle lives.
    pub fn as_ptr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast()
    }
}

impl Default for Mapping {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
