//! # Structshare Reconcile
//!
//! Structural sharing between successive snapshots of derived state.
//!
//! Given the value produced last time (`prev`) and the one just computed
//! (`next`), [`reconcile`] returns a value equal to `next` that reuses, by
//! reference, every part of `prev` that did not change. Callers compare
//! the result with [`Value::ptr_eq`] to decide whether downstream work
//! (re-render, re-validate, re-index) has to run again.
//!
//! ```text
//! prev ──┐
//!        ├─ reconcile ─→ result == next, sharing nodes with prev
//! next ──┘
//! ```
//!
//! ## Guarantees
//!
//! - `prev` and `next` are never modified
//! - `reconcile(a, a)` returns `a`
//! - deep-equal inputs return `prev`
//! - cyclic graphs terminate (see [`reconciler`] for the cycle policy)
//! - no state survives a call; [`Tracked`] is the caller-owned memo layer

pub mod equality;
mod guard;
pub mod reconciler;
pub mod tracked;

pub use equality::is_deep_equal;
pub use reconciler::{reconcile, reconcile_with_stats, ReconcileStats, Reconciler};
pub use structshare_value::Value;
pub use tracked::{Change, Tracked};
