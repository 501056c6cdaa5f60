//! Conflict resolution.
//!
//! Two rules fire while a conflict status is set. A theory conflict is
//! first turned into a learned lemma, switching to a boolean conflict;
//! boolean conflicts are then resolved one small step at a time against
//! the top of the trail: resolution at propagation frames, consumption of
//! irrelevant frames, and at decision frames either backjumping or a
//! semantic case split, depending on how much of the conflict clause
//! remains undetermined below the decision.

use crate::error::{Result, SolverError};
use crate::rules::lemma::mk_uf_lemma;
use crate::rules::Step;
use crate::state::{State, Status};
use crate::trail::EntryKind;
use musat_core::{TermManager, Value};

/// Lift a theory conflict into a boolean one by learning its lemma.
pub fn resolve_uf_conflict(tm: &mut TermManager, state: &State) -> Result<Option<Step>> {
    let Status::ConflictUf(conflict) = &state.status else {
        return Ok(None);
    };
    let lemma = mk_uf_lemma(tm, state, conflict)?;
    let explanation = format!("learn theory lemma {}", lemma.display(tm));
    let next = state
        .learn(lemma.clone())
        .with_status(Status::ConflictBool(lemma));
    Ok(Some(Step::One(next, explanation)))
}

/// One step of boolean conflict analysis.
pub fn resolve_bool_conflict(tm: &mut TermManager, state: &State) -> Result<Option<Step>> {
    let Status::ConflictBool(conflict) = &state.status else {
        return Ok(None);
    };

    if conflict.is_empty() {
        return Ok(Some(Step::One(
            state.with_status(Status::Unsat),
            "conflict clause is empty; no model exists".to_string(),
        )));
    }

    let false_term = tm.mk_false();
    if conflict.contains(false_term) {
        return Ok(Some(Step::One(
            state.with_status(Status::ConflictBool(conflict.remove(false_term))),
            "drop the constant false literal".to_string(),
        )));
    }

    let Some(top) = state.trail.top() else {
        return Ok(Some(Step::One(
            state.with_status(Status::Unsat),
            "conflict persists at the bottom of the trail".to_string(),
        )));
    };
    let below = state
        .trail
        .below()
        .expect("non-root trail has a tail")
        .clone();

    match top.kind {
        EntryKind::Bcp(reason) => {
            let neg_lit = tm.mk_not(top.lit)?;
            if top.value == Value::FALSE && conflict.contains(top.lit) && reason.contains(neg_lit)
            {
                // The entry was pushed as ¬lit; resolve the two clauses on it.
                let resolvent = reason.remove(neg_lit).union(&conflict.remove(top.lit));
                let explanation = format!(
                    "resolve on {} against its propagating clause",
                    tm.display_term(top.lit)
                );
                return Ok(Some(Step::One(
                    state.with_trail(below, Status::ConflictBool(resolvent)),
                    explanation,
                )));
            }
            if top.value == Value::TRUE && conflict.contains(neg_lit) && reason.contains(top.lit) {
                let resolvent = reason.remove(top.lit).union(&conflict.remove(neg_lit));
                let explanation = format!(
                    "resolve on {} against its propagating clause",
                    tm.display_term(top.lit)
                );
                return Ok(Some(Step::One(
                    state.with_trail(below, Status::ConflictBool(resolvent)),
                    explanation,
                )));
            }
            let explanation = format!(
                "pop propagated {}; not part of the conflict",
                tm.display_term(top.lit)
            );
            Ok(Some(Step::One(
                state.with_trail(below, state.status.clone()),
                explanation,
            )))
        }
        EntryKind::Eval => Ok(Some(Step::One(
            state.with_trail(below, state.status.clone()),
            format!(
                "pop theory evaluation of {}",
                tm.display_term(top.lit)
            ),
        ))),
        EntryKind::Decision => {
            let residue = conflict.filter_false(tm, below.assignment());
            match residue.len() {
                0 => {
                    // The conflict does not depend on this decision alone;
                    // undo it and keep analyzing.
                    let explanation = format!(
                        "undo decision on {}; conflict persists below",
                        tm.display_term(top.lit)
                    );
                    Ok(Some(Step::One(
                        state.with_trail(below, state.status.clone()),
                        explanation,
                    )))
                }
                1 => {
                    let learned = state.learn(conflict.clone());
                    let explanation = format!(
                        "backjump: learn {} and resume search below the decision",
                        conflict.display(tm)
                    );
                    Ok(Some(Step::One(
                        learned.with_trail(below, Status::Searching),
                        explanation,
                    )))
                }
                2 => {
                    if tm.is_bool_term(top.lit) {
                        return Err(SolverError::invariant(format!(
                            "two undetermined literals below a boolean decision on {}",
                            tm.display_term(top.lit)
                        )));
                    }
                    let learned = state.learn(conflict.clone());
                    let mut alternatives = Vec::with_capacity(2);
                    for &lit in residue.literals() {
                        let trail = below.cons(tm, EntryKind::Decision, lit, Value::TRUE)?;
                        let explanation = format!(
                            "semantic split: learn {} and decide {}",
                            conflict.display(tm),
                            tm.display_term(lit)
                        );
                        alternatives
                            .push((learned.with_trail(trail, Status::Searching), explanation));
                    }
                    Ok(Some(Step::Choice(alternatives)))
                }
                n => Err(SolverError::invariant(format!(
                    "{n} undetermined conflict literals below a decision"
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use musat_core::sexp::parse_script;
    use musat_core::Clause;

    fn state_of(input: &str) -> (TermManager, State) {
        let mut tm = TermManager::new();
        let clauses = parse_script(input, &mut tm).unwrap();
        let state = State::new(&mut tm, clauses).unwrap();
        (tm, state)
    }

    #[test]
    fn test_empty_conflict_is_unsat() {
        let (mut tm, state) = state_of("(fun p bool) (assert p)");
        let state = state.with_status(Status::ConflictBool(Clause::empty()));
        let step = resolve_bool_conflict(&mut tm, &state).unwrap().unwrap();
        let Step::One(next, _) = step else {
            panic!("expected One");
        };
        assert_eq!(next.status, Status::Unsat);
    }

    #[test]
    fn test_false_literal_dropped() {
        let (mut tm, state) = state_of("(fun p bool) (assert p)");
        let p = tm.mk_const("p").unwrap();
        let f = tm.mk_false();
        let state = state.with_status(Status::ConflictBool(Clause::new(vec![p, f])));
        let step = resolve_bool_conflict(&mut tm, &state).unwrap().unwrap();
        let Step::One(next, _) = step else {
            panic!("expected One");
        };
        assert_eq!(next.status, Status::ConflictBool(Clause::unit(p)));
    }

    #[test]
    fn test_root_conflict_is_unsat() {
        let (mut tm, state) = state_of("(fun p bool) (assert p)");
        let p = tm.mk_const("p").unwrap();
        let state = state.with_status(Status::ConflictBool(Clause::unit(p)));
        let step = resolve_bool_conflict(&mut tm, &state).unwrap().unwrap();
        let Step::One(next, _) = step else {
            panic!("expected One");
        };
        assert_eq!(next.status, Status::Unsat);
    }

    #[test]
    fn test_resolution_against_reason() {
        // p propagated true by {p, q}; conflict {¬p, r} resolves to {q, r}.
        let (mut tm, state) = state_of(
            "(fun p bool) (fun q bool) (fun r bool) (assert (or p q))",
        );
        let p = tm.mk_const("p").unwrap();
        let q = tm.mk_const("q").unwrap();
        let r = tm.mk_const("r").unwrap();
        let np = tm.mk_not(p).unwrap();
        let reason = Clause::new(vec![p, q]);

        let trail = state
            .trail
            .cons(&mut tm, EntryKind::Bcp(reason), p, Value::TRUE)
            .unwrap();
        let conflict = Clause::new(vec![np, r]);
        let state = state.with_trail(trail, Status::ConflictBool(conflict));

        let step = resolve_bool_conflict(&mut tm, &state).unwrap().unwrap();
        let Step::One(next, _) = step else {
            panic!("expected One");
        };
        assert_eq!(next.status, Status::ConflictBool(Clause::new(vec![q, r])));
        assert!(next.trail.is_root());
    }

    #[test]
    fn test_resolution_negative_entry() {
        // ¬q propagated by {¬q}; stored as (q ↦ false). Conflict {q}
        // resolves to the empty clause.
        let (mut tm, state) = state_of("(fun q bool) (assert (not q))");
        let q = tm.mk_const("q").unwrap();
        let nq = tm.mk_not(q).unwrap();
        let reason = Clause::unit(nq);

        let trail = state
            .trail
            .cons(&mut tm, EntryKind::Bcp(reason), nq, Value::TRUE)
            .unwrap();
        let state = state.with_trail(trail, Status::ConflictBool(Clause::unit(q)));

        let step = resolve_bool_conflict(&mut tm, &state).unwrap().unwrap();
        let Step::One(next, _) = step else {
            panic!("expected One");
        };
        assert_eq!(next.status, Status::ConflictBool(Clause::empty()));
    }

    #[test]
    fn test_unrelated_bcp_consumed() {
        let (mut tm, state) = state_of(
            "(fun p bool) (fun q bool) (fun r bool) (assert (or p q)) (assert r)",
        );
        let p = tm.mk_const("p").unwrap();
        let q = tm.mk_const("q").unwrap();
        let r = tm.mk_const("r").unwrap();
        let nq = tm.mk_not(q).unwrap();

        let trail = state
            .trail
            .cons(&mut tm, EntryKind::Bcp(Clause::unit(r)), r, Value::TRUE)
            .unwrap();
        let conflict = Clause::new(vec![p, nq]);
        let state = state.with_trail(trail, Status::ConflictBool(conflict.clone()));

        let step = resolve_bool_conflict(&mut tm, &state).unwrap().unwrap();
        let Step::One(next, _) = step else {
            panic!("expected One");
        };
        assert_eq!(next.status, Status::ConflictBool(conflict));
        assert!(next.trail.is_root());
    }

    #[test]
    fn test_decision_consumed_when_residue_empty() {
        let (mut tm, state) = state_of(
            "(ty U) (fun a U) (fun b U) (assert (not (= a b)))",
        );
        let a = tm.mk_const("a").unwrap();
        let b = tm.mk_const("b").unwrap();
        let eq = tm.mk_eq(a, b).unwrap();
        let neq = tm.mk_not(eq).unwrap();
        let v0 = Value::unin(tm.sort_of(a), 0);

        let trail = state.trail.clone();
        let trail = trail
            .cons(&mut tm, EntryKind::Eval, neq, Value::TRUE)
            .unwrap();
        let trail = trail.cons(&mut tm, EntryKind::Decision, a, v0).unwrap();

        // eq is assigned false below the decision too, so the residue is
        // empty and the decision is simply undone.
        let conflict = Clause::unit(eq);
        let state = state.with_trail(trail, Status::ConflictBool(conflict.clone()));

        let step = resolve_bool_conflict(&mut tm, &state).unwrap().unwrap();
        let Step::One(next, _) = step else {
            panic!("expected One");
        };
        assert_eq!(next.status, Status::ConflictBool(conflict));
        assert_eq!(next.trail.len(), 1);
    }

    #[test]
    fn test_backjump_learns_and_resumes() {
        // Exactly one conflict literal is undetermined below the decision:
        // learn the conflict and resume search below it.
        let (mut tm, state) = state_of(
            "(ty U) (fun a U) (fun b U) (assert (= a b))",
        );
        let a = tm.mk_const("a").unwrap();
        let b = tm.mk_const("b").unwrap();
        let eq = tm.mk_eq(a, b).unwrap();
        let u = tm.sort_of(a);

        let trail = state.trail.clone();
        let trail = trail
            .cons(&mut tm, EntryKind::Decision, b, Value::unin(u, 1))
            .unwrap();
        let trail = trail
            .cons(&mut tm, EntryKind::Decision, a, Value::unin(u, 0))
            .unwrap();

        let conflict = Clause::unit(eq);
        let state = state.with_trail(trail, Status::ConflictBool(conflict.clone()));

        let step = resolve_bool_conflict(&mut tm, &state).unwrap().unwrap();
        let Step::One(next, _) = step else {
            panic!("expected One");
        };
        assert_eq!(next.status, Status::Searching);
        assert_eq!(next.trail.len(), 1);
        assert_eq!(next.clauses.learned(), &[conflict]);
    }

    #[test]
    fn test_semantic_split_on_non_boolean_decision() {
        let (mut tm, state) = state_of(
            "(ty U) (fun a U) (fun b U) (fun c U) \
             (assert (or (= a b) (= a c)))",
        );
        let a = tm.mk_const("a").unwrap();
        let b = tm.mk_const("b").unwrap();
        let c = tm.mk_const("c").unwrap();
        let eq_ab = tm.mk_eq(a, b).unwrap();
        let eq_ac = tm.mk_eq(a, c).unwrap();
        let u = tm.sort_of(a);

        // b and c carry values; deciding a value for a falsifies both
        // equalities semantically.
        let trail = state.trail.clone();
        let trail = trail
            .cons(&mut tm, EntryKind::Decision, b, Value::unin(u, 1))
            .unwrap();
        let trail = trail
            .cons(&mut tm, EntryKind::Decision, c, Value::unin(u, 2))
            .unwrap();
        let trail = trail
            .cons(&mut tm, EntryKind::Decision, a, Value::unin(u, 0))
            .unwrap();

        let conflict = Clause::new(vec![eq_ab, eq_ac]);
        let state = state.with_trail(trail, Status::ConflictBool(conflict.clone()));

        let step = resolve_bool_conflict(&mut tm, &state).unwrap().unwrap();
        let Step::Choice(alternatives) = step else {
            panic!("expected Choice");
        };
        assert_eq!(alternatives.len(), 2);
        for (next, _) in &alternatives {
            assert_eq!(next.status, Status::Searching);
            assert_eq!(next.clauses.learned(), &[conflict.clone()]);
            let top = next.trail.top().unwrap();
            assert_eq!(*top.kind, EntryKind::Decision);
            assert!(top.lit == eq_ab || top.lit == eq_ac);
            assert_eq!(top.value, Value::TRUE);
        }
    }

    #[test]
    fn test_too_many_residue_literals_is_error() {
        let (mut tm, state) = state_of(
            "(ty U) (fun a U) (fun b U) (fun c U) (fun d U) \
             (assert (or (= a b) (= a c) (= a d)))",
        );
        let a = tm.mk_const("a").unwrap();
        let b = tm.mk_const("b").unwrap();
        let c = tm.mk_const("c").unwrap();
        let d = tm.mk_const("d").unwrap();
        let eq_ab = tm.mk_eq(a, b).unwrap();
        let eq_ac = tm.mk_eq(a, c).unwrap();
        let eq_ad = tm.mk_eq(a, d).unwrap();
        let u = tm.sort_of(a);

        let trail = state.trail.clone();
        let trail = trail
            .cons(&mut tm, EntryKind::Decision, b, Value::unin(u, 1))
            .unwrap();
        let trail = trail
            .cons(&mut tm, EntryKind::Decision, c, Value::unin(u, 2))
            .unwrap();
        let trail = trail
            .cons(&mut tm, EntryKind::Decision, d, Value::unin(u, 3))
            .unwrap();
        let trail = trail
            .cons(&mut tm, EntryKind::Decision, a, Value::unin(u, 0))
            .unwrap();

        let conflict = Clause::new(vec![eq_ab, eq_ac, eq_ad]);
        let state = state.with_trail(trail, Status::ConflictBool(conflict));

        assert!(matches!(
            resolve_bool_conflict(&mut tm, &state),
            Err(SolverError::Invariant(_))
        ));
    }
}
