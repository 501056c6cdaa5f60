//! Hash-consed typed terms.
//!
//! [`TermManager`] owns the string interner, the sort table, the term table,
//! and the declaration environment. The `mk_*` smart constructors are the
//! only construction surface: they sort-check their arguments, canonicalize
//! equalities (smaller id first, so `eq(a,b)` and `eq(b,a)` are the same
//! term), and fold negations (`not(not t) = t`, `not(true) = false`).
//! Hash-consing makes id equality coincide with structural equality.
//!
//! Tables are per-manager, so independent solver instances are isolated.

use crate::error::{CoreError, Result};
use crate::sort::{SortId, SortManager};
use crate::value::Value;
use lasso::{Rodeo, Spur};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Identifier of a hash-consed term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(u32);

impl TermId {
    /// Index into the term table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Structure of a term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// A boolean constant.
    Bool(bool),
    /// Negation of a boolean term.
    Not(TermId),
    /// Equality between two terms of the same sort, operands ordered by id.
    Eq(TermId, TermId),
    /// Full application of a declared function symbol.
    App {
        /// The applied symbol.
        func: Spur,
        /// Arguments, one per opened parameter sort.
        args: SmallVec<[TermId; 4]>,
    },
    /// `if cond then t else e`; eliminated by the if-lifting rule before
    /// search proper.
    Ite(TermId, TermId, TermId),
}

/// A term together with its sort.
#[derive(Debug, Clone)]
pub struct Term {
    /// Structure.
    pub kind: TermKind,
    /// Sort of the whole term.
    pub sort: SortId,
}

/// What a declared name stands for.
#[derive(Debug, Clone, Copy)]
enum Decl {
    Sort(SortId),
    Fun(SortId),
}

/// Term, sort, and declaration tables for one problem instance.
#[derive(Debug)]
pub struct TermManager {
    /// The sort table.
    pub sorts: SortManager,
    rodeo: Rodeo,
    terms: Vec<Term>,
    dedup: FxHashMap<TermKind, TermId>,
    decls: FxHashMap<Spur, Decl>,
    fresh_counter: u32,
    true_term: TermId,
    false_term: TermId,
}

impl TermManager {
    /// Create an empty manager with the boolean constants interned.
    #[must_use]
    pub fn new() -> Self {
        let mut tm = Self {
            sorts: SortManager::new(),
            rodeo: Rodeo::default(),
            terms: Vec::new(),
            dedup: FxHashMap::default(),
            decls: FxHashMap::default(),
            fresh_counter: 0,
            true_term: TermId(0),
            false_term: TermId(0),
        };
        let bool_sort = tm.sorts.bool_sort;
        tm.true_term = tm.intern(TermKind::Bool(true), bool_sort);
        tm.false_term = tm.intern(TermKind::Bool(false), bool_sort);
        tm
    }

    fn intern(&mut self, kind: TermKind, sort: SortId) -> TermId {
        if let Some(&id) = self.dedup.get(&kind) {
            return id;
        }
        let id = TermId(self.terms.len() as u32);
        self.terms.push(Term {
            kind: kind.clone(),
            sort,
        });
        self.dedup.insert(kind, id);
        id
    }

    /// Look up a term.
    #[must_use]
    pub fn term(&self, t: TermId) -> &Term {
        &self.terms[t.index()]
    }

    /// Structure of a term.
    #[must_use]
    pub fn kind(&self, t: TermId) -> &TermKind {
        &self.terms[t.index()].kind
    }

    /// Sort of a term.
    #[must_use]
    pub fn sort_of(&self, t: TermId) -> SortId {
        self.terms[t.index()].sort
    }

    /// Whether a term has the boolean sort.
    #[must_use]
    pub fn is_bool_term(&self, t: TermId) -> bool {
        self.sorts.is_bool(self.sort_of(t))
    }

    /// Resolve an interned name.
    #[must_use]
    pub fn resolve(&self, name: Spur) -> &str {
        self.rodeo.resolve(&name)
    }

    /// The interner, for sort display.
    #[must_use]
    pub fn rodeo(&self) -> &Rodeo {
        &self.rodeo
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// Declare an uninterpreted sort. Names share one scope with function
    /// symbols; re-declaration is an error.
    pub fn declare_sort(&mut self, name: &str) -> Result<SortId> {
        let key = self.rodeo.get_or_intern(name);
        if self.decls.contains_key(&key) {
            return Err(CoreError::DuplicateSymbol(name.to_string()));
        }
        let sort = self.sorts.mk_uninterpreted(key);
        self.decls.insert(key, Decl::Sort(sort));
        Ok(sort)
    }

    /// Declare a function symbol at the given (possibly arrow) sort.
    pub fn declare_fun(&mut self, name: &str, sort: SortId) -> Result<Spur> {
        let key = self.rodeo.get_or_intern(name);
        if self.decls.contains_key(&key) {
            return Err(CoreError::DuplicateSymbol(name.to_string()));
        }
        self.decls.insert(key, Decl::Fun(sort));
        Ok(key)
    }

    /// The sort a declared name was given as a sort declaration, if any.
    #[must_use]
    pub fn sort_named(&self, name: &str) -> Option<SortId> {
        match self.rodeo.get(name).and_then(|k| self.decls.get(&k)) {
            Some(Decl::Sort(s)) => Some(*s),
            _ => None,
        }
    }

    /// The declared sort of a function symbol, if any.
    #[must_use]
    pub fn fun_sort(&self, func: Spur) -> Option<SortId> {
        match self.decls.get(&func) {
            Some(Decl::Fun(s)) => Some(*s),
            _ => None,
        }
    }

    /// Mint and declare a constant `prefix!N` that shadows nothing.
    pub fn fresh_const(&mut self, prefix: &str, sort: SortId) -> Result<TermId> {
        loop {
            let name = format!("{}!{}", prefix, self.fresh_counter);
            self.fresh_counter += 1;
            if self.rodeo.get(&name).map_or(true, |k| !self.decls.contains_key(&k)) {
                self.declare_fun(&name, sort)?;
                return self.mk_const(&name);
            }
        }
    }

    // ------------------------------------------------------------------
    // Smart constructors
    // ------------------------------------------------------------------

    /// A boolean constant term.
    #[must_use]
    pub fn mk_bool(&self, b: bool) -> TermId {
        if b {
            self.true_term
        } else {
            self.false_term
        }
    }

    /// The term `true`.
    #[must_use]
    pub fn mk_true(&self) -> TermId {
        self.true_term
    }

    /// The term `false`.
    #[must_use]
    pub fn mk_false(&self) -> TermId {
        self.false_term
    }

    /// Negation with constant folding and double-negation elimination.
    ///
    /// These folds are the definition of literal negation everywhere in the
    /// engine; trail coherence depends on them.
    pub fn mk_not(&mut self, t: TermId) -> Result<TermId> {
        if !self.is_bool_term(t) {
            return Err(self.sort_error(self.sorts.bool_sort, self.sort_of(t)));
        }
        match *self.kind(t) {
            TermKind::Bool(b) => Ok(self.mk_bool(!b)),
            TermKind::Not(u) => Ok(u),
            _ => {
                let bool_sort = self.sorts.bool_sort;
                Ok(self.intern(TermKind::Not(t), bool_sort))
            }
        }
    }

    /// Equality, canonicalized so the operand order does not matter.
    /// Equality of a term with itself folds to `true`.
    pub fn mk_eq(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        let (sa, sb) = (self.sort_of(a), self.sort_of(b));
        if sa != sb {
            return Err(self.sort_error(sa, sb));
        }
        if a == b {
            return Ok(self.true_term);
        }
        let (x, y) = if a < b { (a, b) } else { (b, a) };
        let bool_sort = self.sorts.bool_sort;
        Ok(self.intern(TermKind::Eq(x, y), bool_sort))
    }

    /// Negated equality.
    pub fn mk_neq(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        let eq = self.mk_eq(a, b)?;
        self.mk_not(eq)
    }

    /// Full application of a declared symbol, with arity and sort checks.
    pub fn mk_app(&mut self, name: &str, args: &[TermId]) -> Result<TermId> {
        let func = self
            .rodeo
            .get(name)
            .filter(|k| matches!(self.decls.get(k), Some(Decl::Fun(_))))
            .ok_or_else(|| CoreError::UndefinedSymbol(name.to_string()))?;
        self.mk_app_interned(func, args)
    }

    /// Application by interned symbol; used when rebuilding terms.
    pub fn mk_app_interned(&mut self, func: Spur, args: &[TermId]) -> Result<TermId> {
        let sort = self
            .fun_sort(func)
            .ok_or_else(|| CoreError::UndefinedSymbol(self.resolve(func).to_string()))?;
        let (params, ret) = self.sorts.open(sort);
        if params.len() != args.len() {
            return Err(CoreError::ArityMismatch {
                symbol: self.resolve(func).to_string(),
                expected: params.len(),
                actual: args.len(),
            });
        }
        for (&param, &arg) in params.iter().zip(args) {
            let actual = self.sort_of(arg);
            if param != actual {
                return Err(self.sort_error(param, actual));
            }
        }
        Ok(self.intern(
            TermKind::App {
                func,
                args: SmallVec::from_slice(args),
            },
            ret,
        ))
    }

    /// A declared nullary constant.
    pub fn mk_const(&mut self, name: &str) -> Result<TermId> {
        self.mk_app(name, &[])
    }

    /// `if cond then t else e`; branches must agree on sort.
    pub fn mk_ite(&mut self, cond: TermId, then: TermId, els: TermId) -> Result<TermId> {
        if !self.is_bool_term(cond) {
            return Err(self.sort_error(self.sorts.bool_sort, self.sort_of(cond)));
        }
        let (st, se) = (self.sort_of(then), self.sort_of(els));
        if st != se {
            return Err(self.sort_error(st, se));
        }
        Ok(self.intern(TermKind::Ite(cond, then, els), st))
    }

    fn sort_error(&self, expected: SortId, actual: SortId) -> CoreError {
        CoreError::SortMismatch {
            expected: self.sorts.display(&self.rodeo, expected),
            actual: self.sorts.display(&self.rodeo, actual),
        }
    }

    // ------------------------------------------------------------------
    // Structural helpers
    // ------------------------------------------------------------------

    /// Strip one leading negation.
    #[must_use]
    pub fn abs(&self, t: TermId) -> TermId {
        match *self.kind(t) {
            TermKind::Not(u) => u,
            _ => t,
        }
    }

    /// `false` iff the top constructor is a negation or the constant `false`.
    #[must_use]
    pub fn sign(&self, t: TermId) -> bool {
        !matches!(*self.kind(t), TermKind::Not(_) | TermKind::Bool(false))
    }

    /// All subterms of `t`, including `t` itself, each reported once.
    #[must_use]
    pub fn subterms(&self, t: TermId) -> Vec<TermId> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        let mut stack = vec![t];
        while let Some(cur) = stack.pop() {
            if !seen.insert(cur) {
                continue;
            }
            out.push(cur);
            match self.kind(cur) {
                TermKind::Bool(_) => {}
                TermKind::Not(u) => stack.push(*u),
                TermKind::Eq(a, b) => {
                    stack.push(*a);
                    stack.push(*b);
                }
                TermKind::App { args, .. } => stack.extend(args.iter().copied()),
                TermKind::Ite(c, a, b) => {
                    stack.push(*c);
                    stack.push(*a);
                    stack.push(*b);
                }
            }
        }
        out
    }

    /// Rebuild `t` with every occurrence of `from` replaced by `to`.
    ///
    /// Goes through the smart constructors, so folds and canonicalization
    /// reapply to the rebuilt nodes.
    pub fn replace(&mut self, t: TermId, from: TermId, to: TermId) -> Result<TermId> {
        let mut memo = FxHashMap::default();
        self.replace_rec(t, from, to, &mut memo)
    }

    fn replace_rec(
        &mut self,
        t: TermId,
        from: TermId,
        to: TermId,
        memo: &mut FxHashMap<TermId, TermId>,
    ) -> Result<TermId> {
        if t == from {
            return Ok(to);
        }
        if let Some(&r) = memo.get(&t) {
            return Ok(r);
        }
        let kind = self.kind(t).clone();
        let rebuilt = match kind {
            TermKind::Bool(_) => t,
            TermKind::Not(u) => {
                let u2 = self.replace_rec(u, from, to, memo)?;
                if u2 == u {
                    t
                } else {
                    self.mk_not(u2)?
                }
            }
            TermKind::Eq(a, b) => {
                let a2 = self.replace_rec(a, from, to, memo)?;
                let b2 = self.replace_rec(b, from, to, memo)?;
                if a2 == a && b2 == b {
                    t
                } else {
                    self.mk_eq(a2, b2)?
                }
            }
            TermKind::App { func, args } => {
                let mut changed = false;
                let mut new_args = SmallVec::<[TermId; 4]>::new();
                for &a in &args {
                    let a2 = self.replace_rec(a, from, to, memo)?;
                    changed |= a2 != a;
                    new_args.push(a2);
                }
                if changed {
                    self.mk_app_interned(func, &new_args)?
                } else {
                    t
                }
            }
            TermKind::Ite(c, a, b) => {
                let c2 = self.replace_rec(c, from, to, memo)?;
                let a2 = self.replace_rec(a, from, to, memo)?;
                let b2 = self.replace_rec(b, from, to, memo)?;
                if c2 == c && a2 == a && b2 == b {
                    t
                } else {
                    self.mk_ite(c2, a2, b2)?
                }
            }
        };
        memo.insert(t, rebuilt);
        Ok(rebuilt)
    }

    // ------------------------------------------------------------------
    // Display
    // ------------------------------------------------------------------

    /// Render a term in the input syntax.
    #[must_use]
    pub fn display_term(&self, t: TermId) -> String {
        match self.kind(t) {
            TermKind::Bool(b) => b.to_string(),
            TermKind::Not(u) => format!("(not {})", self.display_term(*u)),
            TermKind::Eq(a, b) => {
                format!("(= {} {})", self.display_term(*a), self.display_term(*b))
            }
            TermKind::App { func, args } => {
                if args.is_empty() {
                    self.resolve(*func).to_string()
                } else {
                    let mut out = format!("({}", self.resolve(*func));
                    for &a in args {
                        out.push(' ');
                        out.push_str(&self.display_term(a));
                    }
                    out.push(')');
                    out
                }
            }
            TermKind::Ite(c, a, b) => format!(
                "(ite {} {} {})",
                self.display_term(*c),
                self.display_term(*a),
                self.display_term(*b)
            ),
        }
    }

    /// Render a sort in the input syntax.
    #[must_use]
    pub fn display_sort(&self, sort: SortId) -> String {
        self.sorts.display(&self.rodeo, sort)
    }

    /// Render a value, Z3-style for anonymous elements.
    #[must_use]
    pub fn display_value(&self, v: Value) -> String {
        match v {
            Value::Bool(b) => b.to_string(),
            Value::Unin(u) => format!("{}!val!{}", self.display_sort(u.sort), u.index),
        }
    }
}

impl Default for TermManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TermManager, TermId, TermId) {
        let mut tm = TermManager::new();
        let u = tm.declare_sort("U").unwrap();
        tm.declare_fun("a", u).unwrap();
        tm.declare_fun("b", u).unwrap();
        let a = tm.mk_const("a").unwrap();
        let b = tm.mk_const("b").unwrap();
        (tm, a, b)
    }

    #[test]
    fn test_eq_canonical() {
        let (mut tm, a, b) = setup();
        let e1 = tm.mk_eq(a, b).unwrap();
        let e2 = tm.mk_eq(b, a).unwrap();
        assert_eq!(e1, e2);
    }

    #[test]
    fn test_reflexive_eq_folds_to_true() {
        let (mut tm, a, _) = setup();
        let e = tm.mk_eq(a, a).unwrap();
        assert_eq!(e, tm.mk_true());
        let ne = tm.mk_neq(a, a).unwrap();
        assert_eq!(ne, tm.mk_false());
    }

    #[test]
    fn test_not_folds() {
        let (mut tm, a, b) = setup();
        let e = tm.mk_eq(a, b).unwrap();
        let ne = tm.mk_not(e).unwrap();
        let nne = tm.mk_not(ne).unwrap();
        assert_eq!(nne, e);

        let t = tm.mk_true();
        assert_eq!(tm.mk_not(t).unwrap(), tm.mk_false());
    }

    #[test]
    fn test_not_requires_bool() {
        let (mut tm, a, _) = setup();
        assert!(matches!(tm.mk_not(a), Err(CoreError::SortMismatch { .. })));
    }

    #[test]
    fn test_hash_consing_identity() {
        let (mut tm, a, b) = setup();
        let e1 = tm.mk_eq(a, b).unwrap();
        let e2 = tm.mk_eq(a, b).unwrap();
        assert_eq!(e1, e2);
        let n1 = tm.mk_not(e1).unwrap();
        let n2 = tm.mk_not(e2).unwrap();
        assert_eq!(n1, n2);
    }

    #[test]
    fn test_app_checks() {
        let (mut tm, a, _) = setup();
        let u = tm.sort_named("U").unwrap();
        let bool_sort = tm.sorts.bool_sort;
        let fs = tm.sorts.mk_arrow(u, u);
        tm.declare_fun("f", fs).unwrap();
        tm.declare_fun("p", bool_sort).unwrap();

        assert!(tm.mk_app("f", &[a]).is_ok());
        assert!(matches!(
            tm.mk_app("f", &[]),
            Err(CoreError::ArityMismatch { .. })
        ));
        let p = tm.mk_const("p").unwrap();
        assert!(matches!(
            tm.mk_app("f", &[p]),
            Err(CoreError::SortMismatch { .. })
        ));
        assert!(matches!(
            tm.mk_app("g", &[a]),
            Err(CoreError::UndefinedSymbol(_))
        ));
    }

    #[test]
    fn test_shadowing_rejected() {
        let (mut tm, _, _) = setup();
        assert!(matches!(
            tm.declare_sort("a"),
            Err(CoreError::DuplicateSymbol(_))
        ));
        let u = tm.sort_named("U").unwrap();
        assert!(matches!(
            tm.declare_fun("U", u),
            Err(CoreError::DuplicateSymbol(_))
        ));
    }

    #[test]
    fn test_abs_sign() {
        let (mut tm, a, b) = setup();
        let e = tm.mk_eq(a, b).unwrap();
        let ne = tm.mk_not(e).unwrap();
        assert_eq!(tm.abs(ne), e);
        assert_eq!(tm.abs(e), e);
        assert!(tm.sign(e));
        assert!(!tm.sign(ne));
        assert!(!tm.sign(tm.mk_false()));
        assert!(tm.sign(tm.mk_true()));
    }

    #[test]
    fn test_subterms() {
        let (mut tm, a, b) = setup();
        let e = tm.mk_eq(a, b).unwrap();
        let ne = tm.mk_not(e).unwrap();
        let subs = tm.subterms(ne);
        for t in [ne, e, a, b] {
            assert!(subs.contains(&t));
        }
        assert_eq!(subs.len(), 4);
    }

    #[test]
    fn test_replace() {
        let (mut tm, a, b) = setup();
        let u = tm.sort_named("U").unwrap();
        let fs = tm.sorts.mk_arrow(u, u);
        tm.declare_fun("f", fs).unwrap();
        let fa = tm.mk_app("f", &[a]).unwrap();
        let e = tm.mk_eq(fa, b).unwrap();

        let c = tm.fresh_const("k", u).unwrap();
        let e2 = tm.replace(e, a, c).unwrap();
        let fc = tm.mk_app("f", &[c]).unwrap();
        let expected = tm.mk_eq(fc, b).unwrap();
        assert_eq!(e2, expected);
    }

    #[test]
    fn test_fresh_const_avoids_shadowing() {
        let (mut tm, _, _) = setup();
        let u = tm.sort_named("U").unwrap();
        let k0 = tm.fresh_const("k", u).unwrap();
        let k1 = tm.fresh_const("k", u).unwrap();
        assert_ne!(k0, k1);
    }

    #[test]
    fn test_display_term() {
        let (mut tm, a, b) = setup();
        let e = tm.mk_eq(a, b).unwrap();
        let ne = tm.mk_not(e).unwrap();
        assert_eq!(tm.display_term(ne), "(not (= a b))");
    }
}
