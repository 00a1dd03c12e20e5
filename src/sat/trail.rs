#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The trail: every assignment made during a CDCL run, in order.

use crate::sat::literal::{Literal, LiteralSet, VarId};
use std::ops::Index;

/// Why a variable holds its value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Copy, Hash, PartialOrd, Ord)]
pub enum Reason {
    /// Picked by the decision heuristic or the candidate order.
    #[default]
    Decision,
    /// Was the only unassigned literal of the clause at this index.
    InUnitClause(usize),
}

/// One assignment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    /// Decision level the record belongs to.
    pub level: usize,
    /// The assigned variable.
    pub var: VarId,
    /// The value it was given.
    pub value: bool,
    /// Why it was given that value.
    pub reason: Reason,
}

impl Step {
    /// The record as a literal.
    #[must_use]
    pub const fn literal(&self) -> Literal {
        Literal::new(self.var, self.value)
    }

    /// Whether the record is a decision.
    #[must_use]
    pub const fn is_decision(&self) -> bool {
        matches!(self.reason, Reason::Decision)
    }
}

/// Assignment records ordered by time, with levels non-decreasing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trail {
    steps: Vec<Step>,
    positions: Vec<Option<usize>>,
}

impl Index<usize> for Trail {
    type Output = Step;

    fn index(&self, index: usize) -> &Self::Output {
        &self.steps[index]
    }
}

impl Trail {
    /// An empty trail for `num_vars` variables.
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            steps: Vec::with_capacity(num_vars),
            positions: vec![None; num_vars],
        }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the trail is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Records oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Step> {
        self.steps.iter()
    }

    /// Level of the most recent record, 0 for an empty trail.
    #[must_use]
    pub fn level(&self) -> usize {
        self.steps.last().map_or(0, |s| s.level)
    }

    /// Appends a record.
    ///
    /// # Panics
    ///
    /// If `var` is already on the trail or `level` is below the current level.
    pub fn push(&mut self, level: usize, var: VarId, value: bool, reason: Reason) {
        let idx = var as usize;
        if idx >= self.positions.len() {
            self.positions.resize(idx + 1, None);
        }
        assert!(
            self.positions[idx].is_none(),
            "variable {var} assigned twice on the trail"
        );
        assert!(level >= self.level(), "trail levels must not decrease");

        self.positions[idx] = Some(self.steps.len());
        self.steps.push(Step {
            level,
            var,
            value,
            reason,
        });
    }

    /// The record of `var`, if it is set.
    #[must_use]
    pub fn step(&self, var: VarId) -> Option<&Step> {
        self.positions
            .get(var as usize)
            .copied()
            .flatten()
            .map(|p| &self.steps[p])
    }

    /// Position of `var` in the trail.
    #[must_use]
    pub fn position(&self, var: VarId) -> Option<usize> {
        self.positions.get(var as usize).copied().flatten()
    }

    /// Why `var` is set.
    #[must_use]
    pub fn reason(&self, var: VarId) -> Option<Reason> {
        self.step(var).map(|s| s.reason)
    }

    /// Removes every record above `level` and returns the affected variables,
    /// most recent first.
    pub fn backtrack_to(&mut self, level: usize) -> Vec<VarId> {
        let keep = self.steps.partition_point(|s| s.level <= level);
        let removed: Vec<VarId> = self.steps.drain(keep..).rev().map(|s| s.var).collect();
        for &var in &removed {
            self.positions[var as usize] = None;
        }
        removed
    }

    /// Records fixed at level 0. These hold in every model.
    pub fn axiomatic(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().take_while(|s| s.level == 0)
    }

    /// Decision records, oldest first.
    pub fn decisions(&self) -> impl DoubleEndedIterator<Item = &Step> {
        self.steps.iter().filter(|s| s.is_decision())
    }

    /// Every record as a literal.
    #[must_use]
    pub fn literals(&self) -> LiteralSet {
        self.steps.iter().map(Step::literal).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtrack_removes_higher_levels() {
        let mut trail = Trail::new(5);
        trail.push(0, 0, true, Reason::InUnitClause(0));
        trail.push(1, 1, false, Reason::Decision);
        trail.push(1, 2, true, Reason::InUnitClause(3));
        trail.push(2, 3, true, Reason::Decision);
        assert_eq!(trail.level(), 2);

        let removed = trail.backtrack_to(0);
        assert_eq!(removed, vec![3, 2, 1]);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.level(), 0);
        assert_eq!(trail.position(2), None);
        assert_eq!(trail.reason(0), Some(Reason::InUnitClause(0)));
    }

    #[test]
    fn test_axiomatic_and_decisions() {
        let mut trail = Trail::new(4);
        trail.push(0, 0, true, Reason::InUnitClause(0));
        trail.push(0, 1, false, Reason::InUnitClause(1));
        trail.push(1, 2, true, Reason::Decision);
        trail.push(1, 3, false, Reason::InUnitClause(2));

        let axioms: Vec<Literal> = trail.axiomatic().map(Step::literal).collect();
        assert_eq!(axioms, vec![Literal::new(0, true), Literal::new(1, false)]);

        let decisions: Vec<VarId> = trail.decisions().map(|s| s.var).collect();
        assert_eq!(decisions, vec![2]);
        assert_eq!(trail.step(3).map(|s| s.level), Some(1));
    }

    #[test]
    #[should_panic(expected = "assigned twice")]
    fn test_double_assignment_panics() {
        let mut trail = Trail::new(2);
        trail.push(0, 1, true, Reason::Decision);
        trail.push(0, 1, false, Reason::Decision);
    }
}
