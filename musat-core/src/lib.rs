//! MuSat Core - Sorts, Terms, Values, Clauses, and the S-expression Front-end
//!
//! This crate provides the data model for the MuSat MCSat solver:
//! - Hash-consed sorts and terms with efficient [`TermId`] references
//! - Boolean and anonymous uninterpreted domain values
//! - Partial assignments with semantic literal evaluation
//! - Set-of-literals clauses
//! - The `(ty …)/(fun …)/(assert …)` S-expression parser and printer
//!
//! # Examples
//!
//! ## Creating terms
//!
//! ```
//! use musat_core::TermManager;
//!
//! let mut tm = TermManager::new();
//! let u = tm.declare_sort("U").unwrap();
//! tm.declare_fun("a", u).unwrap();
//! tm.declare_fun("b", u).unwrap();
//!
//! let a = tm.mk_const("a").unwrap();
//! let b = tm.mk_const("b").unwrap();
//!
//! // Equalities are canonical in their operand order.
//! let e1 = tm.mk_eq(a, b).unwrap();
//! let e2 = tm.mk_eq(b, a).unwrap();
//! assert_eq!(e1, e2);
//! ```
//!
//! ## Parsing a problem
//!
//! ```
//! use musat_core::{sexp::parse_script, TermManager};
//!
//! let mut tm = TermManager::new();
//! let clauses = parse_script(
//!     "(ty U) (fun a U) (fun b U) (assert (= a b))",
//!     &mut tm,
//! )
//! .unwrap();
//! assert_eq!(clauses.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
pub mod clause;
pub mod error;
pub mod model;
pub mod sexp;
pub mod sort;
pub mod value;

pub use ast::{Term, TermId, TermKind, TermManager};
pub use clause::Clause;
pub use error::{CoreError, Result};
pub use model::Assignment;
pub use sort::{SortId, SortKind, SortManager};
pub use value::{UninValue, Value};
