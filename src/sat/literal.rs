#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Literals: a variable index paired with the polarity it appears with.
//!
//! A literal does not store whether it is currently true. That is derived on
//! demand from the owning [`VariableSet`](crate::sat::variable::VariableSet),
//! so every clause observes the same, current setting.

use crate::sat::variable::VariableSet;
use core::ops::{Neg, Not};
use std::collections::BTreeSet;

/// Stable index of a variable inside its clause set's arena.
pub type VarId = u32;

/// A set of literals, ordered by variable index.
pub type LiteralSet = BTreeSet<Literal>;

/// A variable index together with a polarity.
///
/// `polarity == true` is the positive literal `x`, `false` is `!x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Literal {
    var: VarId,
    polarity: bool,
}

impl Literal {
    /// The literal of `var` with `polarity`.
    #[must_use]
    pub const fn new(var: VarId, polarity: bool) -> Self {
        Self { var, polarity }
    }

    /// The variable of the literal.
    #[must_use]
    pub const fn variable(self) -> VarId {
        self.var
    }

    /// `true` for `x`, `false` for `!x`.
    #[must_use]
    pub const fn polarity(self) -> bool {
        self.polarity
    }

    /// The literal of opposite polarity.
    #[must_use]
    pub const fn negated(self) -> Self {
        Self {
            var: self.var,
            polarity: !self.polarity,
        }
    }

    /// The variable as an index into per-variable tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self.var as usize
    }

    /// The literal's truth value under the current settings, `None` when unset.
    #[must_use]
    pub fn value(self, vars: &VariableSet) -> Option<bool> {
        vars.value(self.var).map(|b| b == self.polarity)
    }

    /// Whether the literal is currently true.
    #[must_use]
    pub fn becomes_true(self, vars: &VariableSet) -> bool {
        self.value(vars) == Some(true)
    }

    /// Whether the literal is currently false.
    #[must_use]
    pub fn becomes_false(self, vars: &VariableSet) -> bool {
        self.value(vars) == Some(false)
    }

    /// Whether the literal's variable is unset.
    #[must_use]
    pub fn is_unset(self, vars: &VariableSet) -> bool {
        vars.value(self.var).is_none()
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for &Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_neg() {
        assert_eq!(Literal::new(1, false).negated(), Literal::new(1, true));
        assert_eq!(!Literal::new(1, true), Literal::new(1, false));
        assert_eq!(-Literal::new(3, true), Literal::new(3, false));
    }

    #[test]
    fn test_literal_value_follows_variable() {
        let mut vars = VariableSet::default();
        let a = vars.store_or_get("a");
        let pos = Literal::new(a, true);
        let neg = !pos;

        assert!(pos.is_unset(&vars));
        assert!(neg.is_unset(&vars));

        vars.set(a, true);
        assert!(pos.becomes_true(&vars));
        assert!(neg.becomes_false(&vars));

        vars.set(a, false);
        assert!(pos.becomes_false(&vars));
        assert!(neg.becomes_true(&vars));
    }

    #[test]
    fn test_literal_ordering_groups_by_variable() {
        let set: LiteralSet = [
            Literal::new(2, true),
            Literal::new(0, false),
            Literal::new(1, true),
        ]
        .into_iter()
        .collect();
        let vars: Vec<VarId> = set.iter().map(|l| l.variable()).collect();
        assert_eq!(vars, vec![0, 1, 2]);
    }
}
