//! Conflict detection.
//!
//! These rules fire only while the state is `Searching`. They inspect the
//! clause set and the theory tables and, on finding an inconsistency, move
//! the state into the matching conflict status; the resolution rules take
//! over from there.

use crate::domain::DomainEntry;
use crate::rules::Step;
use crate::sigs::signature_of;
use crate::state::{State, Status, UfConflict};
use musat_core::TermManager;

/// A clause every literal of which evaluates to false is a boolean
/// conflict.
pub fn find_false_clause(tm: &TermManager, state: &State) -> Option<Step> {
    if state.status != Status::Searching {
        return None;
    }
    let assignment = state.trail.assignment();
    for clause in state.clauses.iter() {
        if clause.eval_to_false(tm, assignment) {
            let explanation = format!("clause {} is false under the trail", clause.display(tm));
            return Some(Step::One(
                state.with_status(Status::ConflictBool(clause.clone())),
                explanation,
            ));
        }
    }
    None
}

/// A conflicting entry in the UF domain table is a theory conflict. With
/// several conflicting terms the choice between them is exposed.
pub fn find_uf_domain_conflict(tm: &TermManager, state: &State) -> Option<Step> {
    if state.status != Status::Searching {
        return None;
    }
    let mut conflicts: Vec<(State, String)> = Vec::new();
    let mut table: Vec<_> = state.uf_domain(tm).into_iter().collect();
    table.sort_by_key(|&(term, _)| term);

    for (term, entry) in table {
        let uf = match entry {
            DomainEntry::ConflictForced2 { v1, w1, v2, w2 } => UfConflict::Forced2 {
                term,
                v1,
                w1,
                v2,
                w2,
            },
            DomainEntry::ConflictForbid {
                value,
                force,
                forbid,
            } => UfConflict::Forbid {
                term,
                value,
                force,
                forbid,
            },
            DomainEntry::Forced { .. } | DomainEntry::Forbidden { .. } => continue,
        };
        let explanation = format!(
            "the domain of {} is over-constrained",
            tm.display_term(term)
        );
        conflicts.push((state.with_status(Status::ConflictUf(uf)), explanation));
    }

    match conflicts.len() {
        0 => None,
        1 => {
            let (next, explanation) = conflicts.pop().expect("one conflict");
            Some(Step::One(next, explanation))
        }
        _ => Some(Step::Choice(conflicts)),
    }
}

/// Two assigned applications with the same argument values but different
/// result values violate congruence.
pub fn find_congruence_conflict(tm: &TermManager, state: &State) -> Option<Step> {
    if state.status != Status::Searching {
        return None;
    }
    let assignment = state.trail.assignment();
    let table = state.uf_sigs(tm);
    for entry in state.trail.entries() {
        let Some(key) = signature_of(tm, assignment, entry.lit) else {
            continue;
        };
        let func = key.func;
        let Some(&(stored_value, witness)) = table.get(&key) else {
            continue;
        };
        if witness != entry.lit && stored_value != entry.value {
            let explanation = format!(
                "congruence violated between {} and {}",
                tm.display_term(entry.lit),
                tm.display_term(witness)
            );
            return Some(Step::One(
                state.with_status(Status::ConflictUf(UfConflict::Congruence {
                    func,
                    current: entry.lit,
                    witness,
                })),
                explanation,
            ));
        }
    }
    None
}
