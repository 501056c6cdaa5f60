//! If-lifting.
//!
//! Conditional terms are not handled by the search rules; this rule
//! eliminates them up front. Each `ite` occurrence is replaced by a fresh
//! constant of the same sort throughout the clause set and the trail, and
//! two definitional clauses tie the constant to the branches. The
//! replacement is recorded in the state's substitution for explanations.

use crate::error::Result;
use crate::rules::Step;
use crate::state::{ClauseDb, State, Status};
use crate::trail::{EntryKind, Trail};
use musat_core::{Clause, TermId, TermKind, TermManager};
use std::rc::Rc;

fn rewrite_clause(
    tm: &mut TermManager,
    clause: &Clause,
    from: TermId,
    to: TermId,
) -> Result<Clause> {
    let mut lits = Vec::with_capacity(clause.len());
    for &lit in clause.literals() {
        lits.push(tm.replace(lit, from, to)?);
    }
    Ok(Clause::new(lits))
}

/// Replace one `ite` term by a fresh constant and its defining clauses.
pub fn remove_ifs(tm: &mut TermManager, state: &State) -> Result<Option<Step>> {
    if state.status != Status::Searching {
        return Ok(None);
    }
    let Some(target) = state
        .all_vars(tm)
        .into_iter()
        .find(|&t| matches!(tm.kind(t), TermKind::Ite(..)))
    else {
        return Ok(None);
    };
    let TermKind::Ite(cond, then, els) = *tm.kind(target) else {
        return Ok(None);
    };

    let sort = tm.sort_of(target);
    let fresh = tm.fresh_const("ite", sort)?;

    let mut db = ClauseDb::new(Vec::new());
    for clause in state.clauses.original() {
        db.add_original(rewrite_clause(tm, clause, target, fresh)?);
    }
    for clause in state.clauses.learned() {
        db.learn(rewrite_clause(tm, clause, target, fresh)?);
    }
    let neg_cond = tm.mk_not(cond)?;
    let eq_then = tm.mk_eq(fresh, then)?;
    let eq_els = tm.mk_eq(fresh, els)?;
    db.add_original(Clause::new(vec![neg_cond, eq_then]));
    db.add_original(Clause::new(vec![cond, eq_els]));

    // Rebuild the trail bottom-up with the same kinds and values.
    let mut entries: Vec<(EntryKind, TermId, musat_core::Value)> = state
        .trail
        .entries()
        .map(|e| (e.kind.clone(), e.lit, e.value))
        .collect();
    entries.reverse();
    let mut trail = Trail::root(tm)?;
    for (kind, lit, value) in entries {
        let kind = match kind {
            EntryKind::Bcp(reason) => {
                EntryKind::Bcp(rewrite_clause(tm, &reason, target, fresh)?)
            }
            other => other,
        };
        let lit = tm.replace(lit, target, fresh)?;
        trail = trail.cons(tm, kind, lit, value)?;
    }

    let mut subst = state.subst.clone();
    subst.insert(target, fresh);

    let explanation = format!(
        "lift {} to the fresh constant {}",
        tm.display_term(target),
        tm.display_term(fresh)
    );
    Ok(Some(Step::One(
        State {
            clauses: Rc::new(db),
            trail,
            subst,
            status: Status::Searching,
        },
        explanation,
    )))
}
