//! Solver state.
//!
//! A state bundles the clause database (original plus learned), the trail,
//! the if-lifting substitution, and the search status. States are immutable
//! by contract: every rule application yields a new state whose trail tail
//! and clause database are shared with its predecessor. The derived views
//! (`all_vars`, `to_decide`, `uf_domain`, `uf_sigs`) are functions of the
//! clauses and the trail, recomputed on demand; callers get deterministic
//! orderings where the choice of candidate matters.

use crate::domain::{compute_uf_domain, DomainEntry};
use crate::error::Result;
use crate::sigs::{compute_uf_sigs, SigKey};
use crate::trail::Trail;
use lasso::Spur;
use musat_core::{Clause, TermId, TermKind, TermManager, Value};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::rc::Rc;

/// The clause database: the original problem plus learned lemmas.
#[derive(Debug, Clone)]
pub struct ClauseDb {
    clauses: Vec<Clause>,
    num_original: usize,
}

impl ClauseDb {
    /// A database holding the original problem clauses.
    #[must_use]
    pub fn new(original: Vec<Clause>) -> Self {
        let num_original = original.len();
        Self {
            clauses: original,
            num_original,
        }
    }

    /// All clauses, original first.
    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// The original problem clauses.
    #[must_use]
    pub fn original(&self) -> &[Clause] {
        &self.clauses[..self.num_original]
    }

    /// The learned-clause log, oldest first.
    #[must_use]
    pub fn learned(&self) -> &[Clause] {
        &self.clauses[self.num_original..]
    }

    /// Record a learned clause.
    pub fn learn(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    /// Add a definitional clause to the original region (if-lifting).
    pub fn add_original(&mut self, clause: Clause) {
        self.clauses.insert(self.num_original, clause);
        self.num_original += 1;
    }

    /// Total clause count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether the database is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// An EUF conflict discovered by the detection rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UfConflict {
    /// A term's forced value is also forbidden.
    Forbid {
        /// The over-constrained term.
        term: TermId,
        /// The value both forced and forbidden.
        value: Value,
        /// Equality literal forcing the value.
        force: TermId,
        /// Equality literal forbidding the value.
        forbid: TermId,
    },
    /// A term is forced to two different values.
    Forced2 {
        /// The over-constrained term.
        term: TermId,
        /// First forced value.
        v1: Value,
        /// Equality literal forcing `v1`.
        w1: TermId,
        /// Second forced value.
        v2: Value,
        /// Equality literal forcing `v2`.
        w2: TermId,
    },
    /// Two applications agree on argument values but not on their result.
    Congruence {
        /// The applied function symbol.
        func: Spur,
        /// The application found on the trail.
        current: TermId,
        /// The application recorded in the signature table.
        witness: TermId,
    },
}

/// Where the search stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Exploring; propagation, detection, and decision rules apply.
    Searching,
    /// A satisfying assignment is on the trail.
    Sat,
    /// The clause set has no model.
    Unsat,
    /// A clause evaluates to false; boolean resolution applies.
    ConflictBool(Clause),
    /// A theory conflict awaits lemma synthesis.
    ConflictUf(UfConflict),
}

/// One state of the transition system.
#[derive(Debug, Clone)]
pub struct State {
    /// Original and learned clauses.
    pub clauses: Rc<ClauseDb>,
    /// The assignment log.
    pub trail: Trail,
    /// If-lifting replacements, for explanations.
    pub subst: FxHashMap<TermId, TermId>,
    /// Search status.
    pub status: Status,
}

impl State {
    /// The initial state for a clause set: empty trail, searching.
    pub fn new(tm: &mut TermManager, clauses: Vec<Clause>) -> Result<Self> {
        Ok(Self {
            clauses: Rc::new(ClauseDb::new(clauses)),
            trail: Trail::root(tm)?,
            subst: FxHashMap::default(),
            status: Status::Searching,
        })
    }

    /// Same state with a different status.
    #[must_use]
    pub fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Same state with a different trail and status.
    #[must_use]
    pub fn with_trail(&self, trail: Trail, status: Status) -> Self {
        Self {
            trail,
            status,
            ..self.clone()
        }
    }

    /// Same state with one more learned clause.
    #[must_use]
    pub fn learn(&self, clause: Clause) -> Self {
        let mut db = (*self.clauses).clone();
        db.learn(clause);
        Self {
            clauses: Rc::new(db),
            ..self.clone()
        }
    }

    /// Every decidable term: the `abs` of every subterm of every clause
    /// literal. Boolean constants are excluded (the root axiom already
    /// binds them) and rat-sorted terms are excluded (no rule drives
    /// them). Sorted by term id.
    #[must_use]
    pub fn all_vars(&self, tm: &TermManager) -> Vec<TermId> {
        let mut vars = BTreeSet::new();
        for clause in self.clauses.iter() {
            for &lit in clause.literals() {
                for sub in tm.subterms(lit) {
                    let var = tm.abs(sub);
                    if matches!(tm.kind(var), TermKind::Bool(_)) {
                        continue;
                    }
                    if tm.sort_of(var) == tm.sorts.rat_sort {
                        continue;
                    }
                    vars.insert(var);
                }
            }
        }
        vars.into_iter().collect()
    }

    /// `all_vars` minus everything mentioned on the trail. Sorted by id.
    #[must_use]
    pub fn to_decide(&self, tm: &TermManager) -> Vec<TermId> {
        let mentioned: FxHashSet<TermId> =
            self.trail.entries().map(|e| tm.abs(e.lit)).collect();
        self.all_vars(tm)
            .into_iter()
            .filter(|v| !mentioned.contains(v))
            .collect()
    }

    /// The UF domain table for the current trail.
    #[must_use]
    pub fn uf_domain(&self, tm: &TermManager) -> FxHashMap<TermId, DomainEntry> {
        compute_uf_domain(tm, &self.trail)
    }

    /// The UF signature table for the current trail.
    #[must_use]
    pub fn uf_sigs(&self, tm: &TermManager) -> FxHashMap<SigKey, (Value, TermId)> {
        compute_uf_sigs(tm, &self.trail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use musat_core::sexp::parse_script;

    fn state_of(input: &str) -> (TermManager, State) {
        let mut tm = TermManager::new();
        let clauses = parse_script(input, &mut tm).unwrap();
        let state = State::new(&mut tm, clauses).unwrap();
        (tm, state)
    }

    #[test]
    fn test_all_vars_collects_subterms() {
        let (tm, state) = state_of(
            "(ty U) (fun f (-> U U)) (fun a U) (fun b U) \
             (assert (not (= (f a) b)))",
        );
        let vars = state.all_vars(&tm);
        let mut tm = tm;
        let a = tm.mk_const("a").unwrap();
        let b = tm.mk_const("b").unwrap();
        let fa = tm.mk_app("f", &[a]).unwrap();
        let eq = tm.mk_eq(fa, b).unwrap();
        for t in [a, b, fa, eq] {
            assert!(vars.contains(&t), "missing {}", tm.display_term(t));
        }
        assert_eq!(vars.len(), 4);
    }

    #[test]
    fn test_bool_constants_excluded() {
        let (tm, state) = state_of("(fun p bool) (assert (or p false))");
        let vars = state.all_vars(&tm);
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_rat_terms_excluded() {
        let (tm, state) = state_of("(fun x rat) (fun y rat) (assert (= x y))");
        let vars = state.all_vars(&tm);
        // Only the equality itself is decidable.
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_to_decide_shrinks_with_trail() {
        let (mut tm, state) = state_of("(fun p bool) (fun q bool) (assert (or p q))");
        assert_eq!(state.to_decide(&tm).len(), 2);

        let p = tm.mk_const("p").unwrap();
        let trail = state
            .trail
            .cons(&mut tm, crate::trail::EntryKind::Decision, p, Value::TRUE)
            .unwrap();
        let state = state.with_trail(trail, Status::Searching);
        assert_eq!(state.to_decide(&tm).len(), 1);
    }

    #[test]
    fn test_learn_appends_to_log() {
        let (mut tm, state) = state_of("(fun p bool) (assert p)");
        let np = {
            let p = tm.mk_const("p").unwrap();
            tm.mk_not(p).unwrap()
        };
        let learned = state.learn(Clause::unit(np));
        assert_eq!(learned.clauses.learned().len(), 1);
        assert_eq!(learned.clauses.original().len(), 1);
        // The predecessor is untouched.
        assert_eq!(state.clauses.learned().len(), 0);
    }
}
