//! Transition rules.
//!
//! Each rule inspects a state and either does not apply, yields one
//! successor with an explanation, yields a nondeterministic choice of
//! successors, or reports a terminal verdict. The driver owns the priority
//! order between the rule groups; within a group every alternative of a
//! `Choice` is functionally equivalent, and the caller picks.

pub mod conflict;
pub mod decide;
pub mod if_lift;
pub mod lemma;
pub mod propagate;
pub mod resolve;

use crate::state::State;

/// Outcome of one rule application.
#[derive(Debug, Clone)]
pub enum Step {
    /// A single successor state.
    One(State, String),
    /// A nondeterministic choice among successor states.
    Choice(Vec<(State, String)>),
    /// A terminal state (`Sat` or `Unsat`).
    Done(State, String),
}

pub use conflict::{find_congruence_conflict, find_false_clause, find_uf_domain_conflict};
pub use decide::decide;
pub use if_lift::remove_ifs;
pub use lemma::mk_uf_lemma;
pub use propagate::{propagate, propagate_uf_eq};
pub use resolve::{resolve_bool_conflict, resolve_uf_conflict};
