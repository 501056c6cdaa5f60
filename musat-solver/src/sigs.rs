//! UF signature table.
//!
//! Maps `(function, argument values)` to `(assigned value, witness term)`
//! for every trail entry that assigns a full application whose arguments
//! are all bound. When two applications of the same symbol agree on their
//! argument values, congruence demands they agree on their result; the
//! detection rule checks each such entry against this table. On a key
//! collision one witness is kept; which one does not matter, since the
//! check revisits every application entry.

use crate::trail::Trail;
use lasso::Spur;
use musat_core::{Assignment, TermId, TermKind, TermManager, Value};
use rustc_hash::FxHashMap;

/// Value signature of a full application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SigKey {
    /// The applied function symbol.
    pub func: Spur,
    /// The values of the arguments, in order.
    pub args: Vec<Value>,
}

/// The signature of an application under the given assignment, if every
/// argument is bound.
pub fn signature_of(tm: &TermManager, assignment: &Assignment, term: TermId) -> Option<SigKey> {
    let TermKind::App { func, args } = tm.kind(term) else {
        return None;
    };
    let mut vals = Vec::with_capacity(args.len());
    for &arg in args {
        vals.push(assignment.value(arg)?);
    }
    Some(SigKey {
        func: *func,
        args: vals,
    })
}

/// Derive the signature table from the trail's application entries.
pub fn compute_uf_sigs(tm: &TermManager, trail: &Trail) -> FxHashMap<SigKey, (Value, TermId)> {
    let assignment = trail.assignment();
    let mut table = FxHashMap::default();
    for entry in trail.entries() {
        let Some(key) = signature_of(tm, assignment, entry.lit) else {
            continue;
        };
        table.entry(key).or_insert((entry.value, entry.lit));
    }
    table
}
