//! Partial assignments and semantic literal evaluation.

use crate::ast::{TermId, TermKind, TermManager};
use crate::error::Result;
use crate::value::Value;
use rustc_hash::FxHashMap;

/// A partial map from terms to values.
///
/// Coherence invariant: whenever a boolean term `t` is bound to `Bool(b)`,
/// `not(t)` is bound to `Bool(!b)` as well. [`Assignment::insert`] maintains
/// this; nothing else writes to the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    map: FxHashMap<TermId, Value>,
}

impl Assignment {
    /// An empty assignment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The value bound to `t`, if any.
    #[must_use]
    pub fn value(&self, t: TermId) -> Option<Value> {
        self.map.get(&t).copied()
    }

    /// Whether `t` is bound.
    #[must_use]
    pub fn contains(&self, t: TermId) -> bool {
        self.map.contains_key(&t)
    }

    /// Number of bindings (coherence pairs count twice).
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the assignment is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over all bindings.
    pub fn iter(&self) -> impl Iterator<Item = (TermId, Value)> + '_ {
        self.map.iter().map(|(&t, &v)| (t, v))
    }

    /// Bind `t` to `v`, recording the coherent binding for `not(t)` when `v`
    /// is boolean.
    pub fn insert(&mut self, tm: &mut TermManager, t: TermId, v: Value) -> Result<()> {
        self.map.insert(t, v);
        if let Value::Bool(b) = v {
            if tm.is_bool_term(t) {
                let nt = tm.mk_not(t)?;
                self.map.insert(nt, Value::Bool(!b));
            }
        }
        Ok(())
    }

    /// Semantic evaluation of a boolean term.
    ///
    /// An explicit binding wins; otherwise constants evaluate to themselves,
    /// a negation evaluates through its body, and an equality evaluates by
    /// comparing the values of its sides when both are bound. Anything else
    /// is undetermined.
    #[must_use]
    pub fn eval(&self, tm: &TermManager, t: TermId) -> Option<bool> {
        if let Some(Value::Bool(b)) = self.value(t) {
            return Some(b);
        }
        match *tm.kind(t) {
            TermKind::Bool(b) => Some(b),
            TermKind::Not(u) => self.eval(tm, u).map(|b| !b),
            TermKind::Eq(a, b) => match (self.value(a), self.value(b)) {
                (Some(va), Some(vb)) => Some(va == vb),
                _ => None,
            },
            _ => None,
        }
    }
}
