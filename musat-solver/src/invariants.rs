//! Runtime invariant checks for the transition system.
//!
//! Ensures the engine's structural invariants after every rule
//! application. Debug builds run these from the solve loop; tests call
//! them directly.

use crate::state::{State, Status};
use crate::trail::EntryKind;
use musat_core::{TermManager, Value};
use rustc_hash::FxHashSet;

/// Every boolean binding must be mirrored on its negation.
pub fn check_trail_coherence(tm: &mut TermManager, state: &State) -> Result<(), String> {
    let bindings: Vec<_> = state.trail.assignment().iter().collect();
    for (term, value) in bindings {
        let Value::Bool(b) = value else {
            continue;
        };
        if !tm.is_bool_term(term) {
            return Err(format!(
                "non-boolean term {} carries a boolean value",
                tm.display_term(term)
            ));
        }
        let negated = tm
            .mk_not(term)
            .map_err(|e| format!("negation of assigned term failed: {e}"))?;
        let mirrored = state.trail.assignment().value(negated);
        if mirrored != Some(Value::Bool(!b)) {
            return Err(format!(
                "coherence broken: {} is {b} but its negation is {mirrored:?}",
                tm.display_term(term)
            ));
        }
    }
    Ok(())
}

/// Levels must count the decisions below each entry, so they are
/// non-increasing scanning from the top of the trail downward.
pub fn check_levels(state: &State) -> Result<(), String> {
    let mut entries: Vec<_> = state
        .trail
        .entries()
        .map(|e| (e.kind.clone(), e.level))
        .collect();
    entries.reverse();
    let mut expected = 0u32;
    for (kind, level) in entries {
        if kind == EntryKind::Decision {
            expected += 1;
        }
        if level != expected {
            return Err(format!(
                "trail level {level} recorded where {expected} decisions lie below"
            ));
        }
    }
    Ok(())
}

/// Every trail entry's literal must be bound to its value in the cached
/// assignment (youngest entry wins per literal).
pub fn check_assignment_matches_trail(state: &State) -> Result<(), String> {
    let assignment = state.trail.assignment();
    let mut seen = FxHashSet::default();
    for entry in state.trail.entries() {
        if !seen.insert(entry.lit) {
            continue;
        }
        if assignment.value(entry.lit) != Some(entry.value) {
            return Err(format!(
                "trail entry and assignment disagree on literal id {:?}",
                entry.lit
            ));
        }
    }
    Ok(())
}

/// A satisfiable verdict must leave no original clause falsified, and
/// every original clause must in fact be satisfied by the trail.
pub fn check_sat_soundness(tm: &TermManager, state: &State) -> Result<(), String> {
    if state.status != Status::Sat {
        return Ok(());
    }
    let assignment = state.trail.assignment();
    for clause in state.clauses.original() {
        if !clause.eval_to_true(tm, assignment) {
            return Err(format!(
                "satisfiable verdict but clause {} is not satisfied",
                clause.display(tm)
            ));
        }
    }
    Ok(())
}

/// Run every check.
pub fn check_state(tm: &mut TermManager, state: &State) -> Result<(), String> {
    check_trail_coherence(tm, state)?;
    check_levels(state)?;
    check_assignment_matches_trail(state)?;
    check_sat_soundness(tm, state)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trail::Trail;
    use musat_core::sexp::parse_script;

    #[test]
    fn test_clean_state_passes() {
        let mut tm = TermManager::new();
        let clauses = parse_script("(fun p bool) (assert p)", &mut tm).unwrap();
        let state = State::new(&mut tm, clauses).unwrap();
        check_state(&mut tm, &state).unwrap();
    }

    #[test]
    fn test_checks_follow_pushes() {
        let mut tm = TermManager::new();
        let clauses = parse_script(
            "(ty U) (fun a U) (fun b U) (fun p bool) (assert (or p (= a b)))",
            &mut tm,
        )
        .unwrap();
        let state = State::new(&mut tm, clauses).unwrap();
        let p = tm.mk_const("p").unwrap();
        let a = tm.mk_const("a").unwrap();
        let u = tm.sort_of(a);

        let trail = Trail::root(&mut tm).unwrap();
        let trail = trail
            .cons(&mut tm, EntryKind::Decision, p, Value::FALSE)
            .unwrap();
        let trail = trail
            .cons(&mut tm, EntryKind::Decision, a, Value::unin(u, 0))
            .unwrap();
        let state = state.with_trail(trail, Status::Searching);
        check_state(&mut tm, &state).unwrap();
    }
}
