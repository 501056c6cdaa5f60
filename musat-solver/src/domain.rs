//! UF domain table.
//!
//! Derived from the trail: every assigned equality literal with exactly one
//! side bound constrains the unbound side. A true equality forces the bound
//! value; a false one forbids it. Observations fold into per-term entries,
//! and contradictory observations upgrade the entry to an absorbing
//! conflict record that the detection rule turns into a theory conflict.

use crate::trail::Trail;
use musat_core::{TermId, TermKind, TermManager, Value};
use rustc_hash::FxHashMap;

/// Constraint on one unassigned term, with equality-literal witnesses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEntry {
    /// Some equality forces this term to a value.
    Forced {
        /// The forced value.
        value: Value,
        /// The forcing equality literal.
        witness: TermId,
    },
    /// Disequalities rule out these values.
    Forbidden {
        /// Each forbidden value with its forbidding equality literal.
        values: Vec<(Value, TermId)>,
    },
    /// Two equalities force different values.
    ConflictForced2 {
        /// First forced value.
        v1: Value,
        /// Witness forcing `v1`.
        w1: TermId,
        /// Second, different forced value.
        v2: Value,
        /// Witness forcing `v2`.
        w2: TermId,
    },
    /// A forced value is also forbidden.
    ConflictForbid {
        /// The value both forced and forbidden.
        value: Value,
        /// The forcing equality literal.
        force: TermId,
        /// The forbidding equality literal.
        forbid: TermId,
    },
}

impl DomainEntry {
    /// Whether this entry is one of the conflict shapes.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DomainEntry::ConflictForced2 { .. } | DomainEntry::ConflictForbid { .. }
        )
    }
}

/// Fold one observation into the table. Conflict entries absorb everything.
fn observe(
    table: &mut FxHashMap<TermId, DomainEntry>,
    term: TermId,
    value: Value,
    forces: bool,
    witness: TermId,
) {
    let entry = table.entry(term).or_insert_with(|| {
        if forces {
            DomainEntry::Forced { value, witness }
        } else {
            DomainEntry::Forbidden {
                values: Vec::new(),
            }
        }
    });
    match entry {
        DomainEntry::Forced {
            value: v0,
            witness: w0,
        } => {
            if forces {
                if *v0 != value {
                    *entry = DomainEntry::ConflictForced2 {
                        v1: *v0,
                        w1: *w0,
                        v2: value,
                        w2: witness,
                    };
                }
            } else if *v0 == value {
                *entry = DomainEntry::ConflictForbid {
                    value,
                    force: *w0,
                    forbid: witness,
                };
            }
        }
        DomainEntry::Forbidden { values } => {
            if forces {
                if let Some(&(_, forbid)) = values.iter().find(|&&(v, _)| v == value) {
                    *entry = DomainEntry::ConflictForbid {
                        value,
                        force: witness,
                        forbid,
                    };
                } else {
                    *entry = DomainEntry::Forced { value, witness };
                }
            } else {
                values.push((value, witness));
            }
        }
        DomainEntry::ConflictForced2 { .. } | DomainEntry::ConflictForbid { .. } => {}
    }
}

/// Derive the domain table from the trail's equality entries.
pub fn compute_uf_domain(tm: &TermManager, trail: &Trail) -> FxHashMap<TermId, DomainEntry> {
    let assignment = trail.assignment();
    let mut table = FxHashMap::default();
    for entry in trail.entries() {
        let TermKind::Eq(a, b) = *tm.kind(entry.lit) else {
            continue;
        };
        let Value::Bool(polarity) = entry.value else {
            continue;
        };
        match (assignment.value(a), assignment.value(b)) {
            (Some(va), None) => observe(&mut table, b, va, polarity, entry.lit),
            (None, Some(vb)) => observe(&mut table, a, vb, polarity, entry.lit),
            _ => {}
        }
    }
    table
}
