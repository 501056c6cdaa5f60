//! Domain values.
//!
//! A value is either a boolean or an anonymous element of an uninterpreted
//! sort. Each uninterpreted sort has a countably infinite supply of distinct
//! elements, indexed from zero; two requests for the same `(sort, index)`
//! pair denote the same element, which plain data equality captures.

use crate::sort::SortId;

/// An anonymous element of an uninterpreted sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UninValue {
    /// The sort this element inhabits.
    pub sort: SortId,
    /// Position in the sort's value supply.
    pub index: u32,
}

/// A value a term can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    /// A boolean value.
    Bool(bool),
    /// An anonymous uninterpreted element.
    Unin(UninValue),
}

impl Value {
    /// The boolean truth value.
    pub const TRUE: Value = Value::Bool(true);
    /// The boolean falsity value.
    pub const FALSE: Value = Value::Bool(false);

    /// The `index`-th anonymous element of an uninterpreted sort.
    #[must_use]
    pub const fn unin(sort: SortId, index: u32) -> Self {
        Value::Unin(UninValue { sort, index })
    }

    /// Boolean negation. Defined only for boolean values.
    #[must_use]
    pub fn negate(self) -> Option<Value> {
        match self {
            Value::Bool(b) => Some(Value::Bool(!b)),
            Value::Unin(_) => None,
        }
    }

    /// The boolean payload, if any.
    #[must_use]
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(b),
            Value::Unin(_) => None,
        }
    }

    /// Whether this is `Bool(true)`.
    #[must_use]
    pub fn is_true(self) -> bool {
        self == Value::TRUE
    }

    /// Whether this is `Bool(false)`.
    #[must_use]
    pub fn is_false(self) -> bool {
        self == Value::FALSE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortManager;
    use lasso::Rodeo;

    #[test]
    fn test_negate_bool() {
        assert_eq!(Value::TRUE.negate(), Some(Value::FALSE));
        assert_eq!(Value::FALSE.negate(), Some(Value::TRUE));
    }

    #[test]
    fn test_negate_unin_undefined() {
        let mut rodeo = Rodeo::default();
        let mut sorts = SortManager::new();
        let u = sorts.mk_uninterpreted(rodeo.get_or_intern("U"));
        assert_eq!(Value::unin(u, 0).negate(), None);
    }

    #[test]
    fn test_unin_identity() {
        let mut rodeo = Rodeo::default();
        let mut sorts = SortManager::new();
        let u = sorts.mk_uninterpreted(rodeo.get_or_intern("U"));
        let v = sorts.mk_uninterpreted(rodeo.get_or_intern("V"));

        assert_eq!(Value::unin(u, 3), Value::unin(u, 3));
        assert_ne!(Value::unin(u, 3), Value::unin(u, 4));
        assert_ne!(Value::unin(u, 3), Value::unin(v, 3));
    }
}
