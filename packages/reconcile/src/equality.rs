//! Cycle-safe structural equality

use std::collections::HashMap;

use structshare_value::{Mapping, Sequence, Value};

use crate::guard::{Pair, PairGuard};

/// Structural equality of two value graphs.
///
/// Identical nodes short-circuit. Sequences compare index by index,
/// mappings key by key regardless of order. Opaque values are equal only
/// to themselves. Revisiting a pair of nodes that is already being
/// compared counts as equal, so cyclic graphs terminate. Each pair of
/// nodes is compared at most once, so shared subgraphs cost nothing extra.
pub fn is_deep_equal(a: &Value, b: &Value) -> bool {
    DeepEqual::default().eq(a, b)
}

/// Answer for one pair of values.
#[derive(Debug, Clone, Copy)]
struct Verdict {
    equal: bool,
    /// Shallowest in-flight pair this answer assumed equal.
    leans_on: Option<usize>,
}

impl Verdict {
    fn settled(equal: bool) -> Self {
        Self {
            equal,
            leans_on: None,
        }
    }
}

/// Comparison state for one top-level call.
///
/// `settled` holds finished pairs by identity. Entries are only valid
/// while the compared graphs are alive, so callers that keep an instance
/// across calls must [`clear`](DeepEqual::clear) it in between.
#[derive(Debug, Default)]
pub(crate) struct DeepEqual {
    guard: PairGuard,
    settled: HashMap<Pair, bool>,
}

impl DeepEqual {
    pub(crate) fn eq(&mut self, a: &Value, b: &Value) -> bool {
        self.compare(a, b).equal
    }

    pub(crate) fn clear(&mut self) {
        self.settled.clear();
    }

    fn compare(&mut self, a: &Value, b: &Value) -> Verdict {
        if Value::ptr_eq(a, b) {
            return Verdict::settled(true);
        }

        match (a, b) {
            (Value::String(x), Value::String(y)) => Verdict::settled(x == y),
            (Value::Sequence(x), Value::Sequence(y)) => self.sequences(x, y),
            (Value::Mapping(x), Value::Mapping(y)) => self.mappings(x, y),
            // Payload-free atoms were settled by ptr_eq; opaque values
            // and mismatched kinds are never equal.
            _ => Verdict::settled(false),
        }
    }

    fn sequences(&mut self, x: &Sequence, y: &Sequence) -> Verdict {
        if x.len() != y.len() {
            return Verdict::settled(false);
        }
        self.node((x.as_ptr(), y.as_ptr()), |this| {
            this.children(x.iter().zip(y.iter()).map(|(l, r)| (l, Some(r))))
        })
    }

    fn mappings(&mut self, x: &Mapping, y: &Mapping) -> Verdict {
        if x.len() != y.len() {
            return Verdict::settled(false);
        }
        self.node((x.as_ptr(), y.as_ptr()), |this| {
            this.children(x.iter().map(|(key, l)| (l, y.get(key))))
        })
    }

    fn node(&mut self, pair: Pair, children: impl FnOnce(&mut Self) -> Verdict) -> Verdict {
        if let Some(&equal) = self.settled.get(&pair) {
            return Verdict::settled(equal);
        }
        if let Some(depth) = self.guard.depth_of(pair) {
            return Verdict {
                equal: true,
                leans_on: Some(depth),
            };
        }

        let depth = self.guard.depth();
        self.guard.enter(pair);
        let verdict = children(self);
        self.guard.leave(pair);

        // Equal only under an assumption about an enclosing pair: that
        // pair may still turn out unequal, so nothing is recorded.
        match verdict.leans_on {
            Some(outer) if outer < depth => verdict,
            _ => {
                self.settled.insert(pair, verdict.equal);
                Verdict::settled(verdict.equal)
            }
        }
    }

    fn children<'v>(
        &mut self,
        pairs: impl Iterator<Item = (&'v Value, Option<&'v Value>)>,
    ) -> Verdict {
        let mut leans_on: Option<usize> = None;
        for (left, right) in pairs {
            let Some(right) = right else {
                return Verdict::settled(false);
            };
            let verdict = self.compare(left, right);
            if !verdict.equal {
                return verdict;
            }
            leans_on = match (leans_on, verdict.leans_on) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
        }
        Verdict {
            equal: true,
            leans_on,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        self.guard.is_empty()
    }
}
