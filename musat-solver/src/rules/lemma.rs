//! Lemma synthesis.
//!
//! Turns an EUF conflict into a learned propositional clause that is false
//! under the current trail, handing the conflict over to boolean
//! resolution. The forbid and double-forcing shapes yield transitivity
//! lemmas; the congruence shape yields the congruence axiom instance for
//! the two clashing applications. A lemma that is not false under the
//! trail is a programmer error.

use crate::error::{Result, SolverError};
use crate::state::{State, UfConflict};
use musat_core::{Clause, TermId, TermKind, TermManager};

/// The side of an equality literal other than `t`.
fn other_side(tm: &TermManager, eq: TermId, t: TermId) -> Result<TermId> {
    match *tm.kind(eq) {
        TermKind::Eq(a, b) if a == t => Ok(b),
        TermKind::Eq(a, b) if b == t => Ok(a),
        _ => Err(SolverError::invariant(format!(
            "witness {} does not mention the constrained term {}",
            tm.display_term(eq),
            tm.display_term(t)
        ))),
    }
}

/// Build the learned clause for a theory conflict.
pub fn mk_uf_lemma(tm: &mut TermManager, state: &State, conflict: &UfConflict) -> Result<Clause> {
    let mut lits: Vec<TermId> = Vec::new();
    match conflict {
        // force: eq(t2,t) ↦ true, forbid: eq(t1,t) ↦ false, and t1, t2 share
        // a value. Transitivity: t1 = t2 ∧ t2 = t ⇒ t1 = t.
        UfConflict::Forbid {
            term,
            force,
            forbid,
            ..
        } => {
            let t1 = other_side(tm, *forbid, *term)?;
            let t2 = other_side(tm, *force, *term)?;
            lits.push(tm.mk_eq(t1, *term)?);
            lits.push(tm.mk_neq(t2, *term)?);
            lits.push(tm.mk_neq(t1, t2)?);
        }
        // Both equalities true with differently-valued far sides.
        // Transitivity: t1 = t ∧ t2 = t ⇒ t1 = t2.
        UfConflict::Forced2 { term, w1, w2, .. } => {
            let t1 = other_side(tm, *w1, *term)?;
            let t2 = other_side(tm, *w2, *term)?;
            lits.push(tm.mk_neq(t1, *term)?);
            lits.push(tm.mk_neq(t2, *term)?);
            lits.push(tm.mk_eq(t1, t2)?);
        }
        // Argument-wise equal applications must agree on their result.
        UfConflict::Congruence {
            current, witness, ..
        } => {
            let (args1, args2) = match (tm.kind(*current), tm.kind(*witness)) {
                (
                    TermKind::App { args: a1, .. },
                    TermKind::App { args: a2, .. },
                ) if a1.len() == a2.len() => (a1.clone(), a2.clone()),
                _ => {
                    return Err(SolverError::invariant(
                        "congruence conflict between non-applications",
                    ));
                }
            };
            for (&x, &y) in args1.iter().zip(args2.iter()) {
                lits.push(tm.mk_neq(x, y)?);
            }
            if tm.is_bool_term(*current) {
                // One application evaluates true and the other false; the
                // conclusion flips the true side.
                let assignment = state.trail.assignment();
                match (
                    assignment.eval(tm, *current),
                    assignment.eval(tm, *witness),
                ) {
                    (Some(true), Some(false)) => {
                        lits.push(tm.mk_not(*current)?);
                        lits.push(*witness);
                    }
                    (Some(false), Some(true)) => {
                        lits.push(tm.mk_not(*witness)?);
                        lits.push(*current);
                    }
                    (e1, e2) => {
                        return Err(SolverError::invariant(format!(
                            "boolean congruence conflict without opposite evaluations ({e1:?} vs {e2:?})"
                        )));
                    }
                }
            } else {
                lits.push(tm.mk_eq(*current, *witness)?);
            }
        }
    }

    let lemma = Clause::new(lits);
    if !lemma.eval_to_false(tm, state.trail.assignment()) {
        return Err(SolverError::invariant(format!(
            "synthesized lemma {} is not false under the trail",
            lemma.display(tm)
        )));
    }
    Ok(lemma)
}
