//! Sort system.
//!
//! Sorts are hash-consed: structurally equal sorts share a [`SortId`], so
//! sort equality is a single integer comparison. The table pre-creates the
//! two built-in sorts; uninterpreted sorts and arrow sorts are interned on
//! demand. Arrow sorts are right-associated, so a function sort is a chain
//! `A -> (B -> R)` that [`SortManager::open`] flattens back into an argument
//! list and a return sort.

use lasso::{Rodeo, Spur};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Identifier of a hash-consed sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortId(u32);

impl SortId {
    /// Index into the sort table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Structure of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKind {
    /// The boolean sort.
    Bool,
    /// The rational sort. Reserved by the input grammar; no solver rule is
    /// driven by rat-sorted terms.
    Rat,
    /// A declared uninterpreted sort, identified by its interned name.
    Uninterpreted(Spur),
    /// A function sort `domain -> codomain`, right-associated.
    Arrow(SortId, SortId),
}

/// Hash-consing table for sorts.
#[derive(Debug)]
pub struct SortManager {
    sorts: Vec<SortKind>,
    dedup: FxHashMap<SortKind, SortId>,
    /// The interned boolean sort.
    pub bool_sort: SortId,
    /// The interned rational sort.
    pub rat_sort: SortId,
}

impl SortManager {
    /// Create a table with the built-in sorts interned.
    #[must_use]
    pub fn new() -> Self {
        let mut mgr = Self {
            sorts: Vec::new(),
            dedup: FxHashMap::default(),
            bool_sort: SortId(0),
            rat_sort: SortId(0),
        };
        mgr.bool_sort = mgr.intern(SortKind::Bool);
        mgr.rat_sort = mgr.intern(SortKind::Rat);
        mgr
    }

    fn intern(&mut self, kind: SortKind) -> SortId {
        if let Some(&id) = self.dedup.get(&kind) {
            return id;
        }
        let id = SortId(self.sorts.len() as u32);
        self.sorts.push(kind);
        self.dedup.insert(kind, id);
        id
    }

    /// Look up the structure of a sort.
    #[must_use]
    pub fn kind(&self, sort: SortId) -> SortKind {
        self.sorts[sort.index()]
    }

    /// Intern an uninterpreted sort under an interned name.
    pub fn mk_uninterpreted(&mut self, name: Spur) -> SortId {
        self.intern(SortKind::Uninterpreted(name))
    }

    /// Intern a single arrow `domain -> codomain`.
    pub fn mk_arrow(&mut self, domain: SortId, codomain: SortId) -> SortId {
        self.intern(SortKind::Arrow(domain, codomain))
    }

    /// Intern the right-associated chain `args[0] -> … -> args[n-1] -> ret`.
    pub fn mk_arrow_chain(&mut self, args: &[SortId], ret: SortId) -> SortId {
        let mut sort = ret;
        for &arg in args.iter().rev() {
            sort = self.mk_arrow(arg, sort);
        }
        sort
    }

    /// Destructure a right-associated arrow chain into `(arguments, return)`.
    ///
    /// A non-arrow sort opens into `([], itself)`.
    #[must_use]
    pub fn open(&self, sort: SortId) -> (SmallVec<[SortId; 4]>, SortId) {
        let mut args = SmallVec::new();
        let mut cur = sort;
        while let SortKind::Arrow(dom, cod) = self.kind(cur) {
            args.push(dom);
            cur = cod;
        }
        (args, cur)
    }

    /// Whether `sort` is the boolean sort.
    #[must_use]
    pub fn is_bool(&self, sort: SortId) -> bool {
        sort == self.bool_sort
    }

    /// Render a sort in the input syntax.
    #[must_use]
    pub fn display(&self, rodeo: &Rodeo, sort: SortId) -> String {
        match self.kind(sort) {
            SortKind::Bool => "bool".to_string(),
            SortKind::Rat => "rat".to_string(),
            SortKind::Uninterpreted(name) => rodeo.resolve(&name).to_string(),
            SortKind::Arrow(..) => {
                let (args, ret) = self.open(sort);
                let mut out = String::from("(->");
                for a in &args {
                    out.push(' ');
                    out.push_str(&self.display(rodeo, *a));
                }
                out.push(' ');
                out.push_str(&self.display(rodeo, ret));
                out.push(')');
                out
            }
        }
    }
}

impl Default for SortManager {
    fn default() -> Self {
        Self::new()
    }
}
