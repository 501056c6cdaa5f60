//! Clauses.
//!
//! A clause is a duplicate-free set of boolean literals, interpreted as
//! their disjunction. Literals are kept sorted by term id, so clause
//! equality is structural and membership is a binary search.

use crate::ast::{TermId, TermManager};
use crate::model::Assignment;

/// A disjunction of literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    lits: Vec<TermId>,
}

impl Clause {
    /// Build a clause from literals, deduplicating.
    #[must_use]
    pub fn new(mut lits: Vec<TermId>) -> Self {
        lits.sort_unstable();
        lits.dedup();
        Self { lits }
    }

    /// The empty clause `⊥`.
    #[must_use]
    pub fn empty() -> Self {
        Self { lits: Vec::new() }
    }

    /// A unit clause.
    #[must_use]
    pub fn unit(lit: TermId) -> Self {
        Self { lits: vec![lit] }
    }

    /// The literals, sorted by id.
    #[must_use]
    pub fn literals(&self) -> &[TermId] {
        &self.lits
    }

    /// Number of literals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    /// Whether this is `⊥`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    /// Set membership.
    #[must_use]
    pub fn contains(&self, lit: TermId) -> bool {
        self.lits.binary_search(&lit).is_ok()
    }

    /// The clause minus one literal.
    #[must_use]
    pub fn remove(&self, lit: TermId) -> Clause {
        Clause {
            lits: self.lits.iter().copied().filter(|&l| l != lit).collect(),
        }
    }

    /// Set union with another clause.
    #[must_use]
    pub fn union(&self, other: &Clause) -> Clause {
        let mut lits = self.lits.clone();
        lits.extend_from_slice(&other.lits);
        Clause::new(lits)
    }

    /// The unique literal of a unit clause.
    #[must_use]
    pub fn as_unit(&self) -> Option<TermId> {
        match self.lits.as_slice() {
            [l] => Some(*l),
            _ => None,
        }
    }

    /// Drop every literal that evaluates to false under `a`.
    #[must_use]
    pub fn filter_false(&self, tm: &TermManager, a: &Assignment) -> Clause {
        Clause {
            lits: self
                .lits
                .iter()
                .copied()
                .filter(|&l| a.eval(tm, l) != Some(false))
                .collect(),
        }
    }

    /// Whether every literal evaluates to false under `a`.
    #[must_use]
    pub fn eval_to_false(&self, tm: &TermManager, a: &Assignment) -> bool {
        self.lits.iter().all(|&l| a.eval(tm, l) == Some(false))
    }

    /// Whether some literal evaluates to true under `a`.
    #[must_use]
    pub fn eval_to_true(&self, tm: &TermManager, a: &Assignment) -> bool {
        self.lits.iter().any(|&l| a.eval(tm, l) == Some(true))
    }

    /// Render the clause: `⊥` when empty, the bare literal when singleton,
    /// an `(or …)` form otherwise.
    #[must_use]
    pub fn display(&self, tm: &TermManager) -> String {
        match self.lits.as_slice() {
            [] => "⊥".to_string(),
            [l] => tm.display_term(*l),
            lits => {
                let mut out = String::from("(or");
                for &l in lits {
                    out.push(' ');
                    out.push_str(&tm.display_term(l));
                }
                out.push(')');
                out
            }
        }
    }
}
