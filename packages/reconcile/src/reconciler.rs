//! Identity-preserving reconciliation of value graphs
//!
//! The result always has the shape of `next`. `prev` only donates nodes:
//! wherever a part of `prev` is structurally equal to the matching part of
//! `next`, that part of `prev` is handed back instead.
//!
//! ## Rules
//!
//! - identical or deep-equal inputs return `prev`
//! - different kinds return `next`
//! - sequences merge index by index when the lengths match, otherwise
//!   `next` is returned whole
//! - mappings merge key by key over `next`'s keys; a change in key count
//!   only rules out returning `prev` itself
//! - a node whose merged children all came from `next` is `next`'s own
//!   node; one whose children all came from `prev` (same shape) is
//!   `prev`'s node; anything mixed is freshly allocated
//!
//! ## Cycles
//!
//! Re-entering a pair of nodes that is already being merged returns
//! `next`'s node for that position. Cyclic subgraphs that are deep-equal
//! are reused from `prev` as a whole.
//!
//! ## Sharing
//!
//! Each `(prev, next)` pair of composite nodes is merged once per call.
//! Meeting the pair again, through another path of a graph with shared
//! nodes, hands back the first result.

use std::collections::HashMap;

use structshare_value::{Entries, Mapping, Sequence, Value};
use tracing::{debug, instrument, trace};

use crate::equality::DeepEqual;
use crate::guard::{Pair, PairGuard};

/// Counters collected over one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Positions answered with a node from `prev`
    pub reused: usize,
    /// Composite nodes freshly allocated
    pub rebuilt: usize,
    /// Positions answered with `next`'s own node
    pub replaced: usize,
    /// Times a cycle was cut by the recursion guard
    pub cycles_cut: usize,
}

/// Reconcile `next` against `prev`, sharing every part of `prev` that is
/// structurally equal to the corresponding part of `next`.
///
/// ```
/// use structshare_reconcile::reconcile;
/// use structshare_value::Value;
///
/// let prev = Value::mapping([("keep", Value::sequence([Value::from(1)]))]);
/// let next = Value::mapping([
///     ("keep", Value::sequence([Value::from(1)])),
///     ("added", Value::from(true)),
/// ]);
///
/// let result = reconcile(&prev, &next);
/// assert!(Value::ptr_eq(result.get("keep").unwrap(), prev.get("keep").unwrap()));
/// ```
pub fn reconcile(prev: &Value, next: &Value) -> Value {
    reconcile_with_stats(prev, next).0
}

/// Same as [`reconcile`], also returning what the call did.
#[instrument(level = "trace", skip_all, fields(prev = %prev.kind(), next = %next.kind()))]
pub fn reconcile_with_stats(prev: &Value, next: &Value) -> (Value, ReconcileStats) {
    let mut reconciler = Reconciler::new();
    let result = reconciler.reconcile(prev, next);
    let stats = reconciler.stats();
    debug!(
        reused = stats.reused,
        rebuilt = stats.rebuilt,
        replaced = stats.replaced,
        cycles_cut = stats.cycles_cut,
        "Reconciliation complete"
    );
    (result, stats)
}

/// State for one reconciliation: recursion guards, finished pairs and
/// counters.
///
/// The free functions build a fresh one per call. Reusing an instance is
/// allowed; guards and finished pairs are dropped when a call returns and
/// only the counters accumulate.
#[derive(Debug, Default)]
pub struct Reconciler {
    equality: DeepEqual,
    guard: PairGuard,
    merged: HashMap<Pair, Value>,
    stats: ReconcileStats,
}

/// Where the merged children of a composite came from.
struct Provenance {
    all_prev: bool,
    all_next: bool,
}

impl Provenance {
    fn new(same_shape: bool) -> Self {
        Self {
            all_prev: same_shape,
            all_next: true,
        }
    }

    fn record(&mut self, merged: &Value, prev: Option<&Value>, next: &Value) {
        self.all_prev &= prev.is_some_and(|p| Value::ptr_eq(merged, p));
        self.all_next &= Value::ptr_eq(merged, next);
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }

    pub fn reconcile(&mut self, prev: &Value, next: &Value) -> Value {
        let result = self.merge(prev, next);
        self.equality.clear();
        self.merged.clear();
        result
    }

    fn merge(&mut self, prev: &Value, next: &Value) -> Value {
        if Value::ptr_eq(prev, next) || self.equality.eq(prev, next) {
            self.stats.reused += 1;
            return prev.clone();
        }

        match (prev, next) {
            (Value::Sequence(p), Value::Sequence(n)) if p.len() == n.len() => {
                self.composite((p.as_ptr(), n.as_ptr()), prev, next, |this| this.sequence(p, n))
            }
            (Value::Mapping(p), Value::Mapping(n)) => {
                self.composite((p.as_ptr(), n.as_ptr()), prev, next, |this| this.mapping(p, n))
            }
            _ => self.take_next(next),
        }
    }

    fn composite(
        &mut self,
        pair: Pair,
        prev: &Value,
        next: &Value,
        build: impl FnOnce(&mut Self) -> Value,
    ) -> Value {
        if let Some(done) = self.merged.get(&pair).cloned() {
            if Value::ptr_eq(&done, prev) {
                self.stats.reused += 1;
            } else if Value::ptr_eq(&done, next) {
                self.stats.replaced += 1;
            }
            return done;
        }
        if !self.guard.enter(pair) {
            return self.cut_cycle(next.clone());
        }

        let result = build(self);

        self.guard.leave(pair);
        self.merged.insert(pair, result.clone());
        result
    }

    fn take_next(&mut self, next: &Value) -> Value {
        self.stats.replaced += 1;
        next.clone()
    }

    fn sequence(&mut self, prev: &Sequence, next: &Sequence) -> Value {
        let mut provenance = Provenance::new(true);
        let items: Vec<Value> = prev
            .iter()
            .zip(next.iter())
            .map(|(p, n)| {
                let merged = self.merge(p, n);
                provenance.record(&merged, Some(p), n);
                merged
            })
            .collect();

        if provenance.all_prev {
            self.stats.reused += 1;
            Value::Sequence(prev.clone())
        } else if provenance.all_next {
            self.take_next(&Value::Sequence(next.clone()))
        } else {
            self.stats.rebuilt += 1;
            Value::Sequence(Sequence::new(items))
        }
    }

    fn mapping(&mut self, prev: &Mapping, next: &Mapping) -> Value {
        let mut provenance = Provenance::new(prev.len() == next.len());
        let entries: Entries = next
            .iter()
            .map(|(key, n)| {
                let p = prev.get(key);
                let merged = self.merge(p.unwrap_or(&Value::Undefined), n);
                provenance.record(&merged, p, n);
                (key.clone(), merged)
            })
            .collect();

        if provenance.all_prev {
            self.stats.reused += 1;
            Value::Mapping(prev.clone())
        } else if provenance.all_next {
            self.take_next(&Value::Mapping(next.clone()))
        } else {
            self.stats.rebuilt += 1;
            Value::Mapping(Mapping::from_entries(entries))
        }
    }

    fn cut_cycle(&mut self, next: Value) -> Value {
        self.stats.cycles_cut += 1;
        trace!(kind = %next.kind(), "Cycle re-entered, keeping next");
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    fn same(a: Option<&Value>, b: Option<&Value>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => Value::ptr_eq(a, b),
            _ => false,
        }
    }

    #[test]
    fn test_identity_fast_path() {
        let value = v(json!({"a": [1, 2, {"b": null}]}));
        let (result, stats) = reconcile_with_stats(&value, &value);
        assert!(Value::ptr_eq(&result, &value));
        assert_eq!(
            stats,
            ReconcileStats {
                reused: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_deep_equal_returns_prev() {
        let prev = v(json!({"arr": [{"foo": "bar"}]}));
        let next = v(json!({"arr": [{"foo": "bar"}]}));
        let result = reconcile(&prev, &next);
        assert!(Value::ptr_eq(&result, &prev));
    }

    #[test]
    fn test_kind_mismatch_returns_next() {
        let prev = v(json!({"a": 1}));
        let next = v(json!([1]));
        let (result, stats) = reconcile_with_stats(&prev, &next);
        assert!(Value::ptr_eq(&result, &next));
        assert_eq!(stats.replaced, 1);
    }

    #[test]
    fn test_undefined_prev_returns_next() {
        let next = v(json!({"a": 1}));
        assert!(Value::ptr_eq(&reconcile(&Value::Undefined, &next), &next));
        assert!(matches!(reconcile(&next, &Value::Undefined), Value::Undefined));
    }

    #[test]
    fn test_sequence_length_change_returns_next() {
        let prev = v(json!([{"a": 1}, {"b": 2}]));
        let next = v(json!([{"a": 1}]));
        let result = reconcile(&prev, &next);
        assert!(Value::ptr_eq(&result, &next));
    }

    #[test]
    fn test_sequence_rebuilt_with_shared_elements() {
        let prev = v(json!(["foo", {"greet": "hello"}, {"other": []}]));
        let next = v(json!(["bar", {"greet": "hello"}, {"other": []}]));
        let (result, stats) = reconcile_with_stats(&prev, &next);

        assert!(!Value::ptr_eq(&result, &prev));
        assert!(!Value::ptr_eq(&result, &next));
        assert!(same(result.index(0), next.index(0)));
        assert!(same(result.index(1), prev.index(1)));
        assert!(same(result.index(2), prev.index(2)));
        assert_eq!(stats.rebuilt, 1);
    }

    #[test]
    fn test_nothing_shared_returns_next() {
        let prev = v(json!({"a": {"x": 1}, "b": [1]}));
        let next = v(json!({"a": {"x": 2}, "b": [2]}));
        let (result, stats) = reconcile_with_stats(&prev, &next);
        assert!(Value::ptr_eq(&result, &next));
        assert_eq!(stats.rebuilt, 0);
    }

    #[test]
    fn test_missing_key_takes_next_field() {
        let prev = v(json!({"keep": {"k": true}}));
        let next = v(json!({"keep": {"k": true}, "new": ["foo", "bar"]}));
        let result = reconcile(&prev, &next);

        assert!(!Value::ptr_eq(&result, &prev));
        assert!(!Value::ptr_eq(&result, &next));
        assert!(same(result.get("keep"), prev.get("keep")));
        assert!(same(result.get("new"), next.get("new")));
    }

    #[test]
    fn test_nan_fields_are_reused() {
        let prev = Value::mapping([("n", Value::Number(f64::NAN)), ("s", v(json!([1])))]);
        let next = Value::mapping([("n", Value::Number(f64::NAN)), ("s", v(json!([1])))]);
        assert!(Value::ptr_eq(&reconcile(&prev, &next), &prev));
    }

    #[test]
    fn test_reconciler_guards_released() {
        let mut reconciler = Reconciler::new();
        let prev = v(json!({"a": [1, {"b": 2}], "c": 3}));
        let next = v(json!({"a": [1, {"b": 3}], "c": 3}));
        reconciler.reconcile(&prev, &next);
        assert!(reconciler.guard.is_empty());
        assert!(reconciler.equality.is_idle());
        assert!(reconciler.merged.is_empty());
    }

    #[test]
    fn test_reused_reconciler_starts_clean() {
        let mut reconciler = Reconciler::new();
        let first = reconciler.reconcile(&v(json!({"a": [1]})), &v(json!({"a": [2]})));
        assert_eq!(first.to_json().unwrap(), json!({"a": [2]}));

        let prev = v(json!({"a": [2], "b": {"c": true}}));
        let next = v(json!({"a": [3], "b": {"c": true}}));
        let second = reconciler.reconcile(&prev, &next);
        assert!(same(second.get("b"), prev.get("b")));
        assert!(same(second.get("a"), next.get("a")));
    }

    #[test]
    fn test_shared_pair_merged_once() {
        let shared_prev = v(json!({"x": 1}));
        let shared_next = v(json!({"x": 2}));
        let prev = Value::sequence([shared_prev.clone(), shared_prev, Value::from("keep")]);
        let next = Value::sequence([shared_next.clone(), shared_next.clone(), Value::from("keep")]);

        let (result, stats) = reconcile_with_stats(&prev, &next);
        assert!(same(result.index(0), Some(&shared_next)));
        assert!(same(result.index(1), Some(&shared_next)));
        assert!(same(result.index(2), prev.index(2)));
        // the second visit of the shared pair is answered from the first
        assert_eq!(stats.replaced, 3);
        assert_eq!(stats.rebuilt, 1);
    }
}
