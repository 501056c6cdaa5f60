//! The trail: a persistent, chronological log of assignments.
//!
//! Each entry records what was assigned, to which value, at which decision
//! level, and why (a decision, a propagating clause, or a theory
//! evaluation). Nodes are reference-counted and never mutated: popping is
//! taking the tail, and every successor state shares the prefix below it,
//! which makes "the trail at level k" a free operation.
//!
//! Stored literals are always in positive form. Pushing a negated literal
//! normalizes it to `(not(lit), negated value)` first; the cached total
//! assignment additionally records the coherent binding of the literal's
//! negation. The bottom of every trail is the axiomatic entry
//! `true ↦ true` at level 0, which iteration skips.

use crate::error::{Result, SolverError};
use musat_core::{Assignment, Clause, TermId, TermManager, Value};
use std::rc::Rc;

/// Why an entry was pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A guess made by the decision rule.
    Decision,
    /// Forced by boolean constraint propagation from the stored clause.
    Bcp(Clause),
    /// A theory evaluation of an equality whose sides were both assigned.
    Eval,
}

#[derive(Debug)]
struct TrailNode {
    kind: EntryKind,
    lit: TermId,
    value: Value,
    level: u32,
    assignment: Assignment,
    below: Option<Trail>,
}

/// A persistent stack of assignment entries.
#[derive(Debug, Clone)]
pub struct Trail {
    node: Rc<TrailNode>,
}

/// A borrowed view of one trail entry.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    /// Why the entry exists.
    pub kind: &'a EntryKind,
    /// The assigned literal, in positive form.
    pub lit: TermId,
    /// The assigned value.
    pub value: Value,
    /// Decision level of the entry.
    pub level: u32,
}

impl Trail {
    /// The empty trail: just the axiomatic entry `true ↦ true` at level 0.
    pub fn root(tm: &mut TermManager) -> Result<Self> {
        let lit = tm.mk_true();
        let mut assignment = Assignment::new();
        assignment.insert(tm, lit, Value::TRUE)?;
        Ok(Self {
            node: Rc::new(TrailNode {
                kind: EntryKind::Eval,
                lit,
                value: Value::TRUE,
                level: 0,
                assignment,
                below: None,
            }),
        })
    }

    /// Push an entry, normalizing a negative literal to its positive form.
    pub fn cons(
        &self,
        tm: &mut TermManager,
        kind: EntryKind,
        mut lit: TermId,
        mut value: Value,
    ) -> Result<Self> {
        if !tm.sign(lit) {
            lit = tm.mk_not(lit)?;
            value = value.negate().ok_or_else(|| {
                SolverError::invariant("negated literal pushed with a non-boolean value")
            })?;
        }
        let level = self.level() + u32::from(kind == EntryKind::Decision);
        let mut assignment = self.node.assignment.clone();
        assignment.insert(tm, lit, value)?;
        Ok(Self {
            node: Rc::new(TrailNode {
                kind,
                lit,
                value,
                level,
                assignment,
                below: Some(self.clone()),
            }),
        })
    }

    /// Whether only the axiomatic entry remains.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.node.below.is_none()
    }

    /// Decision level of the newest entry.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.node.level
    }

    /// The accumulated total assignment.
    #[must_use]
    pub fn assignment(&self) -> &Assignment {
        &self.node.assignment
    }

    /// The newest entry, unless only the axiom remains.
    #[must_use]
    pub fn top(&self) -> Option<Entry<'_>> {
        if self.is_root() {
            return None;
        }
        Some(Entry {
            kind: &self.node.kind,
            lit: self.node.lit,
            value: self.node.value,
            level: self.node.level,
        })
    }

    /// The trail without its newest entry; `None` at the root.
    #[must_use]
    pub fn below(&self) -> Option<&Trail> {
        self.node.below.as_ref()
    }

    /// Entries youngest-first, excluding the axiomatic root.
    pub fn entries(&self) -> Entries<'_> {
        Entries { cur: Some(self) }
    }

    /// Number of entries above the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().count()
    }

    /// Whether any entry sits above the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// Pop entries until the most recent decision has been consumed,
    /// returning the trail below it. Without a decision this is the root.
    #[must_use]
    pub fn unwind_till_next_decision(&self) -> Trail {
        let mut cur = self;
        loop {
            match cur.below() {
                None => return cur.clone(),
                Some(below) => {
                    if cur.node.kind == EntryKind::Decision {
                        return below.clone();
                    }
                    cur = below;
                }
            }
        }
    }
}

/// Iterator over trail entries, youngest-first, excluding the root.
pub struct Entries<'a> {
    cur: Option<&'a Trail>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let trail = self.cur?;
        let entry = trail.top()?;
        self.cur = trail.below();
        Some(entry)
    }
}
