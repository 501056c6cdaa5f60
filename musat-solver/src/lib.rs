//! MuSat Solver - An MCSat-style Engine for Propositional Logic + EUF
//!
//! This crate implements the transition-system engine: the trail, the UF
//! domain and signature tables, the solver state, the transition rules
//! (propagation, conflict detection, conflict resolution, decision,
//! if-lifting), and the driver that applies them in priority order.
//!
//! Propositional and theory reasoning share one trail: boolean literals
//! are decided or propagated alongside first-order terms that receive
//! concrete values from an infinite per-sort supply. Theory conflicts are
//! lifted into learned clauses, so boolean resolution drives all
//! backtracking.
//!
//! # Examples
//!
//! ```
//! use musat_solver::{Solver, Verdict};
//!
//! let mut solver = Solver::from_script(
//!     "(ty U) (fun f (-> U U)) (fun a U) (fun b U) \
//!      (assert (= a b)) (assert (not (= (f a) (f b))))",
//! )
//! .unwrap();
//! assert_eq!(solver.solve().unwrap(), Verdict::Unsat);
//! ```
//!
//! The step-by-step interface exposes every rule application and choice
//! point; [`driver::step`] maps a state to its successors without picking
//! between alternatives.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod domain;
pub mod driver;
pub mod error;
pub mod invariants;
pub mod rules;
pub mod sigs;
pub mod state;
pub mod trail;

pub use domain::DomainEntry;
pub use driver::{step, Solver, SolverStats, Verdict};
pub use error::{Result, SolverError};
pub use rules::Step;
pub use sigs::SigKey;
pub use state::{ClauseDb, State, Status, UfConflict};
pub use trail::{Entry, EntryKind, Trail};
