//! Print/parse round-trip tests for the S-expression front-end.

use musat_core::sexp::{parse_clause_str, parse_script, parse_term_str};
use musat_core::{Clause, TermId, TermManager};
use proptest::prelude::*;

const ENV: &str = "(ty U) (fun a U) (fun b U) (fun c U) \
                   (fun f (-> U U)) (fun g (-> U U U)) \
                   (fun p bool) (fun q bool) (fun r (-> U bool))";

fn env() -> TermManager {
    let mut tm = TermManager::new();
    parse_script(ENV, &mut tm).unwrap();
    tm
}

#[test]
fn printed_clauses_reparse_equal() {
    let mut tm = TermManager::new();
    let clauses = parse_script(
        &format!(
            "{ENV} \
             (assert (or p (not q))) \
             (assert (= a b)) \
             (assert (or (= (f a) (f b)) (not (= a c)) (r b))) \
             (assert (or (r (g a b)) q))"
        ),
        &mut tm,
    )
    .unwrap();

    for clause in clauses {
        let printed = clause.display(&tm);
        let reparsed = parse_clause_str(&printed, &mut tm).unwrap();
        assert_eq!(reparsed, clause, "round-trip failed for {printed}");
    }
}

#[test]
fn singleton_prints_as_bare_literal() {
    let mut tm = env();
    let p = tm.mk_const("p").unwrap();
    assert_eq!(Clause::unit(p).display(&tm), "p");
    assert_eq!(Clause::empty().display(&tm), "⊥");
}

/// Build one of a handful of boolean term shapes over the fixed environment.
fn build_term(tm: &mut TermManager, shape: u8, i: usize, j: usize, neg: bool) -> TermId {
    let consts = ["a", "b", "c"];
    let x = tm.mk_const(consts[i]).unwrap();
    let y = tm.mk_const(consts[j]).unwrap();
    let base = match shape {
        0 => tm.mk_const("p").unwrap(),
        1 => tm.mk_eq(x, y).unwrap(),
        2 => {
            let fx = tm.mk_app("f", &[x]).unwrap();
            tm.mk_eq(fx, y).unwrap()
        }
        3 => tm.mk_app("r", &[y]).unwrap(),
        4 => {
            let gxy = tm.mk_app("g", &[x, y]).unwrap();
            tm.mk_app("r", &[gxy]).unwrap()
        }
        _ => {
            let q = tm.mk_const("q").unwrap();
            tm.mk_not(q).unwrap()
        }
    };
    if neg {
        tm.mk_not(base).unwrap()
    } else {
        base
    }
}

proptest! {
    #[test]
    fn random_terms_roundtrip(shape in 0u8..6, i in 0usize..3, j in 0usize..3, neg: bool) {
        let mut tm = env();
        let t = build_term(&mut tm, shape, i, j, neg);
        let printed = tm.display_term(t);
        let reparsed = parse_term_str(&printed, &mut tm).unwrap();
        prop_assert_eq!(reparsed, t);
    }
}
