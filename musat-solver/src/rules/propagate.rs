//! Propagation.
//!
//! Boolean constraint propagation pushes the surviving literal of a clause
//! whose other literals all evaluate to false; the theory evaluation rule
//! pushes the truth value of an equality whose two sides already carry
//! values. Both only fire on literals not yet in the assignment.

use crate::error::Result;
use crate::rules::Step;
use crate::state::{State, Status};
use crate::trail::EntryKind;
use musat_core::{TermKind, TermManager, Value};

/// Boolean constraint propagation: the first clause whose false-filtered
/// residue is a single unassigned literal forces that literal true.
pub fn propagate(tm: &mut TermManager, state: &State) -> Result<Option<Step>> {
    if state.status != Status::Searching {
        return Ok(None);
    }
    for clause in state.clauses.iter() {
        let residue = clause.filter_false(tm, state.trail.assignment());
        let Some(lit) = residue.as_unit() else {
            continue;
        };
        if state.trail.assignment().value(lit).is_some() {
            continue;
        }
        let explanation = format!(
            "{} propagates {}",
            clause.display(tm),
            tm.display_term(lit)
        );
        let trail = state
            .trail
            .cons(tm, EntryKind::Bcp(clause.clone()), lit, Value::TRUE)?;
        return Ok(Some(Step::One(
            state.with_trail(trail, Status::Searching),
            explanation,
        )));
    }
    Ok(None)
}

/// Theory evaluation: an unassigned equality whose sides both carry values
/// is pushed with its semantic truth value.
pub fn propagate_uf_eq(tm: &mut TermManager, state: &State) -> Result<Option<Step>> {
    if state.status != Status::Searching {
        return Ok(None);
    }
    let assignment = state.trail.assignment();
    for term in state.all_vars(tm) {
        let TermKind::Eq(a, b) = *tm.kind(term) else {
            continue;
        };
        if assignment.value(term).is_some() {
            continue;
        }
        let (Some(va), Some(vb)) = (assignment.value(a), assignment.value(b)) else {
            continue;
        };
        let value = Value::Bool(va == vb);
        let explanation = format!(
            "evaluate {} to {} from its sides",
            tm.display_term(term),
            va == vb
        );
        let trail = state.trail.cons(tm, EntryKind::Eval, term, value)?;
        return Ok(Some(Step::One(
            state.with_trail(trail, Status::Searching),
            explanation,
        )));
    }
    Ok(None)
}
