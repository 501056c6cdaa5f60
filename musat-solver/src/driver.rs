//! The rule driver.
//!
//! [`step`] applies the first applicable rule under the fixed priority
//! order: terminal check, conflict resolution, if-lifting, conflict
//! detection, propagation, decision. Conflict-resolution rules only fire
//! on conflict statuses and detection only while searching, so exploration
//! and conflict analysis never interleave.
//!
//! [`Solver`] wraps the loop: it resolves every choice by taking the first
//! alternative, logs each explanation, gathers statistics, and in debug
//! builds checks the runtime invariants after every applied rule.

use crate::error::{Result, SolverError};
use crate::rules::{
    decide, find_congruence_conflict, find_false_clause, find_uf_domain_conflict, propagate,
    propagate_uf_eq, remove_ifs, resolve_bool_conflict, resolve_uf_conflict, Step,
};
use crate::state::{State, Status};
use crate::trail::EntryKind;
use musat_core::{Assignment, Clause, TermManager};
use tracing::debug;

/// Terminal outcome of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The trail is a satisfying assignment.
    Sat,
    /// The clause set has no model.
    Unsat,
}

/// Counters accumulated by the solve loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    /// Applied rule count.
    pub steps: u64,
    /// Decisions pushed.
    pub decisions: u64,
    /// Boolean propagations pushed.
    pub propagations: u64,
    /// Theory evaluations pushed.
    pub theory_evals: u64,
    /// Transitions from search into a conflict status.
    pub conflicts: u64,
    /// Lemmas in the learned-clause log.
    pub lemmas: u64,
}

/// Apply the first applicable rule to `state`.
pub fn step(tm: &mut TermManager, state: &State) -> Result<Step> {
    match &state.status {
        Status::Sat => Ok(Step::Done(
            state.clone(),
            "satisfiable: the trail is a model".to_string(),
        )),
        Status::Unsat => Ok(Step::Done(
            state.clone(),
            "unsatisfiable: the learned clauses witness the refutation".to_string(),
        )),
        Status::ConflictBool(_) => resolve_bool_conflict(tm, state)?.ok_or_else(|| {
            SolverError::invariant("boolean conflict resolution did not apply")
        }),
        Status::ConflictUf(_) => resolve_uf_conflict(tm, state)?.ok_or_else(|| {
            SolverError::invariant("theory conflict resolution did not apply")
        }),
        Status::Searching => {
            if let Some(applied) = remove_ifs(tm, state)? {
                return Ok(applied);
            }
            if let Some(applied) = find_false_clause(tm, state) {
                return Ok(applied);
            }
            if let Some(applied) = find_uf_domain_conflict(tm, state) {
                return Ok(applied);
            }
            if let Some(applied) = find_congruence_conflict(tm, state) {
                return Ok(applied);
            }
            if let Some(applied) = propagate(tm, state)? {
                return Ok(applied);
            }
            if let Some(applied) = propagate_uf_eq(tm, state)? {
                return Ok(applied);
            }
            decide(tm, state)
        }
    }
}

/// A problem instance together with its search loop.
#[derive(Debug)]
pub struct Solver {
    tm: TermManager,
    state: State,
    stats: SolverStats,
}

impl Solver {
    /// Build a solver over an existing environment and clause set.
    pub fn new(mut tm: TermManager, clauses: Vec<Clause>) -> Result<Self> {
        let state = State::new(&mut tm, clauses)?;
        Ok(Self {
            tm,
            state,
            stats: SolverStats::default(),
        })
    }

    /// Parse a problem script and build a solver for it.
    pub fn from_script(input: &str) -> Result<Self> {
        let mut tm = TermManager::new();
        let clauses = musat_core::sexp::parse_script(input, &mut tm)?;
        Self::new(tm, clauses)
    }

    /// The term environment.
    #[must_use]
    pub fn tm(&self) -> &TermManager {
        &self.tm
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Counters gathered so far.
    #[must_use]
    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// The current total assignment.
    #[must_use]
    pub fn assignment(&self) -> &Assignment {
        self.state.trail.assignment()
    }

    /// Apply one rule, taking the first alternative of any choice.
    /// Returns the verdict once a terminal state is reached.
    pub fn advance(&mut self) -> Result<Option<Verdict>> {
        let applied = step(&mut self.tm, &self.state)?;
        let (next, explanation, done) = match applied {
            Step::Done(next, explanation) => (next, explanation, true),
            Step::One(next, explanation) => (next, explanation, false),
            Step::Choice(mut alternatives) => {
                if alternatives.is_empty() {
                    return Err(SolverError::invariant("empty choice of successors"));
                }
                let (next, explanation) = alternatives.swap_remove(0);
                (next, explanation, false)
            }
        };
        debug!(step = self.stats.steps, "{explanation}");
        self.record(&next);
        #[cfg(debug_assertions)]
        crate::invariants::check_state(&mut self.tm, &next).map_err(SolverError::Invariant)?;
        self.state = next;
        if done {
            return match &self.state.status {
                Status::Sat => Ok(Some(Verdict::Sat)),
                Status::Unsat => Ok(Some(Verdict::Unsat)),
                other => Err(SolverError::invariant(format!(
                    "terminal step in non-terminal status {other:?}"
                ))),
            };
        }
        Ok(None)
    }

    /// Run to completion.
    pub fn solve(&mut self) -> Result<Verdict> {
        loop {
            if let Some(verdict) = self.advance()? {
                return Ok(verdict);
            }
        }
    }

    fn record(&mut self, next: &State) {
        self.stats.steps += 1;
        if next.trail.len() == self.state.trail.len() + 1 {
            match next.trail.top().map(|e| e.kind) {
                Some(EntryKind::Decision) => self.stats.decisions += 1,
                Some(EntryKind::Bcp(_)) => self.stats.propagations += 1,
                Some(EntryKind::Eval) => self.stats.theory_evals += 1,
                None => {}
            }
        }
        if matches!(self.state.status, Status::Searching)
            && matches!(
                next.status,
                Status::ConflictBool(_) | Status::ConflictUf(_)
            )
        {
            self.stats.conflicts += 1;
        }
        self.stats.lemmas = next.clauses.learned().len() as u64;
    }
}
