#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Clauses and the interface a clause set needs from them.
//!
//! Two clause kinds exist. [`Clause`] derives its state by scanning every
//! literal. [`WatchedClause`](crate::sat::watch::WatchedClause) caches two
//! watch positions so that state queries are O(1). Both implement
//! [`ClauseKind`], which is what [`ClauseSet`](crate::sat::clause_set::ClauseSet)
//! is generic over.

use crate::sat::literal::{Literal, VarId};
use crate::sat::variable::VariableSet;
use crate::sat::watch::WatchPolicy;
use core::ops::Index;
use smallvec::SmallVec;
use std::fmt::Debug;

/// Inline storage for the literals of one clause.
pub type Literals = SmallVec<[Literal; 8]>;

/// Satisfaction state of a clause under the current settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseState {
    /// At least one literal is true.
    Satisfied,
    /// Every literal is false.
    Empty,
    /// Exactly one literal is unset and all others are false.
    Unit(Literal),
    /// Two or more literals are unset and none is true.
    Unresolved,
}

/// Behaviour shared by the plain and the watched-literal clause.
pub trait ClauseKind: Clone + Debug {
    /// Wraps already normalised literals, see [`normalise`].
    fn from_literals(literals: Literals) -> Self;

    /// The literals, in a fixed order.
    fn literals(&self) -> &[Literal];

    /// State as seen by the solver. May read cached watch positions.
    fn state(&self, vars: &VariableSet) -> ClauseState;

    /// Called after `var`, which occurs in this clause, was assigned.
    fn on_assign(&mut self, _var: VarId, _vars: &VariableSet, _policy: WatchPolicy) {}

    /// Called after `var`, which occurs in this clause, was unassigned.
    fn on_unassign(&mut self, _var: VarId, _vars: &VariableSet, _policy: WatchPolicy) {}

    /// Re-derives any cached state from the current settings.
    fn reset(&mut self, _vars: &VariableSet, _policy: WatchPolicy) {}

    /// Number of literals.
    fn len(&self) -> usize {
        self.literals().len()
    }

    /// Whether some literal is true.
    fn is_satisfied(&self, vars: &VariableSet) -> bool {
        self.state(vars) == ClauseState::Satisfied
    }

    /// Whether every literal is false.
    fn is_empty(&self, vars: &VariableSet) -> bool {
        self.state(vars) == ClauseState::Empty
    }

    /// Whether exactly one literal is unset and the rest are false.
    fn is_unit(&self, vars: &VariableSet) -> bool {
        matches!(self.state(vars), ClauseState::Unit(_))
    }

    /// The one unset literal of a unit clause.
    fn unit_literal(&self, vars: &VariableSet) -> Option<Literal> {
        match self.state(vars) {
            ClauseState::Unit(lit) => Some(lit),
            _ => None,
        }
    }

    /// State computed from scratch by scanning every literal.
    fn evaluate(&self, vars: &VariableSet) -> ClauseState {
        scan_state(self.literals(), vars)
    }

    /// Whether `var` occurs in the clause.
    fn contains(&self, var: VarId) -> bool {
        self.literals().iter().any(|l| l.variable() == var)
    }
}

/// Scans `literals` and classifies the clause.
#[must_use]
pub fn scan_state(literals: &[Literal], vars: &VariableSet) -> ClauseState {
    let mut unset = None;
    let mut unset_count = 0usize;

    for &lit in literals {
        match lit.value(vars) {
            Some(true) => return ClauseState::Satisfied,
            Some(false) => {}
            None => {
                unset_count += 1;
                unset = Some(lit);
            }
        }
    }

    match (unset_count, unset) {
        (0, _) => ClauseState::Empty,
        (1, Some(lit)) => ClauseState::Unit(lit),
        _ => ClauseState::Unresolved,
    }
}

/// Sorts literals by variable identifier and merges duplicates.
///
/// Returns `None` for a tautology (`x | !x | ...`), which is always satisfied
/// and therefore never stored.
pub fn normalise<I>(literals: I, vars: &VariableSet) -> Option<Literals>
where
    I: IntoIterator<Item = Literal>,
{
    let mut lits: Literals = literals.into_iter().collect();
    lits.sort_by(|a, b| {
        vars.name(a.variable())
            .cmp(vars.name(b.variable()))
            .then(a.polarity().cmp(&b.polarity()))
    });
    lits.dedup();

    if lits.windows(2).any(|w| w[0].variable() == w[1].variable()) {
        return None;
    }
    Some(lits)
}

/// A clause whose state is always recomputed by a full scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Clause {
    literals: Literals,
}

impl Clause {
    /// Iterates the literals.
    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }
}

impl ClauseKind for Clause {
    fn from_literals(literals: Literals) -> Self {
        Self { literals }
    }

    fn literals(&self) -> &[Literal] {
        &self.literals
    }

    fn state(&self, vars: &VariableSet) -> ClauseState {
        scan_state(&self.literals, vars)
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}
