use std::sync::{Arc, OnceLock};

use crate::error::{ValueError, ValueResult};
use crate::{Kind, Value};

/// Shared handle to an ordered list of values.
///
/// Cloning the handle shares the underlying node, so two clones are
/// identical in the sense of [`Sequence::ptr_eq`].
#[derive(Clone)]
pub struct Sequence(Arc<OnceLock<Vec<Value>>>);

impl Sequence {
    pub fn new(items: Vec<Value>) -> Self {
        Self(Arc::new(OnceLock::from(items)))
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Create an unsealed node that can be referenced from its own items.
    ///
    /// The node reads as empty until [`Sequence::seal`] is called. A node
    /// that ends up containing itself keeps itself alive for the rest of
    /// the process.
    ///
    /// ```
    /// use structshare_value::{Sequence, Value};
    ///
    /// let looped = Sequence::deferred();
    /// looped
    ///     .seal(vec![Value::from("head"), Value::Sequence(looped.clone())])
    ///     .unwrap();
    /// assert_eq!(looped.len(), 2);
    /// ```
    pub fn deferred() -> Self {
        Self(Arc::new(OnceLock::new()))
    }

    /// Fill a deferred node. Fails if the node already has contents.
    pub fn seal(&self, items: Vec<Value>) -> ValueResult<()> {
        self.0.set(items).map_err(|_| ValueError::AlreadySealed {
            kind: Kind::Sequence,
        })
    }

    pub fn is_sealed(&self) -> bool {
        self.0.get().is_some()
    }

    pub fn items(&self) -> &[Value] {
        self.0.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items().get(index)
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items().iter()
    }

    pub fn ptr_eq(a: &Sequence, b: &Sequence) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Address of the shared node, stable for as long as any handle lives.
    pub fn as_ptr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast()
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<Value> for Sequence {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
