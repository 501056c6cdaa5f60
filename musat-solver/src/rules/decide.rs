//! The decision rule.
//!
//! With nothing left to decide the trail is a model. Otherwise every
//! undecided term contributes successors: boolean terms one per truth
//! value, uninterpreted terms one with a value that respects the UF domain
//! table: the forced value if there is one, otherwise the lowest-indexed
//! anonymous value not forbidden.

use crate::domain::DomainEntry;
use crate::error::{Result, SolverError};
use crate::rules::Step;
use crate::state::{State, Status};
use crate::trail::EntryKind;
use musat_core::{TermManager, Value};

/// Decide a value for some undecided term, or conclude satisfiability.
pub fn decide(tm: &mut TermManager, state: &State) -> Result<Step> {
    if state.status != Status::Searching {
        return Err(SolverError::invariant("decision attempted outside search"));
    }
    let candidates = state.to_decide(tm);
    if candidates.is_empty() {
        return Ok(Step::One(
            state.with_status(Status::Sat),
            "every variable is assigned; the trail is a model".to_string(),
        ));
    }

    let domain = state.uf_domain(tm);
    let mut alternatives = Vec::new();
    for term in candidates {
        if tm.is_bool_term(term) {
            for truth in [true, false] {
                let trail = state
                    .trail
                    .cons(tm, EntryKind::Decision, term, Value::Bool(truth))?;
                let explanation =
                    format!("decide {} := {}", tm.display_term(term), truth);
                alternatives.push((state.with_trail(trail, Status::Searching), explanation));
            }
        } else {
            let sort = tm.sort_of(term);
            let value = match domain.get(&term) {
                None => Value::unin(sort, 0),
                Some(DomainEntry::Forced { value, .. }) => *value,
                Some(DomainEntry::Forbidden { values }) => {
                    let mut index = 0;
                    loop {
                        let candidate = Value::unin(sort, index);
                        if !values.iter().any(|&(v, _)| v == candidate) {
                            break candidate;
                        }
                        index += 1;
                    }
                }
                Some(entry) => {
                    return Err(SolverError::invariant(format!(
                        "deciding {} whose domain is conflicting: {entry:?}",
                        tm.display_term(term)
                    )));
                }
            };
            let explanation = format!(
                "decide {} := {}",
                tm.display_term(term),
                tm.display_value(value)
            );
            let trail = state.trail.cons(tm, EntryKind::Decision, term, value)?;
            alternatives.push((state.with_trail(trail, Status::Searching), explanation));
        }
    }

    if alternatives.len() == 1 {
        let (next, explanation) = alternatives.pop().expect("one alternative");
        Ok(Step::One(next, explanation))
    } else {
        Ok(Step::Choice(alternatives))
    }
}
