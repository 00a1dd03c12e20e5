#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Unit propagation over the occurrence index.

use crate::sat::clause::{ClauseKind, ClauseState};
use crate::sat::clause_set::ClauseSet;
use crate::sat::literal::{Literal, VarId};
use std::collections::VecDeque;

/// Result of one propagation run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Propagation {
    /// Implied literals in the order they were set, each with the index of
    /// the clause that forced it.
    pub units: Vec<(Literal, usize)>,
    /// Index of a clause found with every literal false. Propagation stops
    /// at the first one.
    pub conflict: Option<usize>,
}

impl Propagation {
    /// Whether propagation stopped at an empty clause.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        self.conflict.is_some()
    }
}

impl<C: ClauseKind> ClauseSet<C> {
    /// Assigns every literal implied by unit clauses, repeating until nothing
    /// new is implied or some clause becomes empty.
    ///
    /// With `most_recent == None` every clause is examined. Otherwise only the
    /// clauses of `most_recent`, and transitively of each newly implied
    /// variable, are examined.
    pub fn propagate_units(&mut self, most_recent: Option<VarId>) -> Propagation {
        let mut result = Propagation::default();
        let mut queue = VecDeque::new();

        match most_recent {
            Some(var) => queue.push_back(var),
            None => {
                for idx in 0..self.len() {
                    if self.examine(idx, &mut result, &mut queue) {
                        return result;
                    }
                }
            }
        }

        self.drain_queue(queue, result)
    }

    fn drain_queue(&mut self, mut queue: VecDeque<VarId>, mut result: Propagation) -> Propagation {
        while let Some(var) = queue.pop_front() {
            let mut i = 0;
            while i < self.occurrences(var).len() {
                let idx = self.occurrences(var)[i];
                if self.examine(idx, &mut result, &mut queue) {
                    return result;
                }
                i += 1;
            }
        }
        result
    }

    /// Acts on clause `idx`: records a conflict and returns `true` if it is
    /// empty, assigns its literal if it is unit.
    fn examine(&mut self, idx: usize, result: &mut Propagation, queue: &mut VecDeque<VarId>) -> bool {
        match self.clause(idx).state(self.variables()) {
            ClauseState::Empty => {
                result.conflict = Some(idx);
                true
            }
            ClauseState::Unit(lit) => {
                self.assign(lit.variable(), lit.polarity());
                self.stats.propagations += 1;
                result.units.push((lit, idx));
                queue.push_back(lit.variable());
                false
            }
            ClauseState::Satisfied | ClauseState::Unresolved => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::sat::clause::Clause;
    use crate::sat::clause_set::{ClauseSet, WatchedClauseSet};
    use crate::sat::literal::Literal;

    #[test]
    fn test_full_scan_chains_implications() {
        let mut cs: WatchedClauseSet = "a & !a|b & !b|c|d & !b|!c".parse().unwrap();
        let lit = |n: &str, p| cs.literal(n, p).unwrap();
        let (a, b, not_c, d) = (
            lit("a", true),
            lit("b", true),
            lit("c", false),
            lit("d", true),
        );

        let result = cs.propagate_units(None);
        assert!(!result.is_conflict());
        let implied: Vec<Literal> = result.units.iter().map(|&(l, _)| l).collect();
        assert_eq!(implied, vec![a, b, not_c, d]);
        assert_eq!(result.units[0].1, 0);
        assert_eq!(result.units[3].1, 2);
    }

    #[test]
    fn test_seeded_propagation_only_follows_occurrences() {
        let mut cs: ClauseSet<Clause> = "!x|y & !y|z & w".parse().unwrap();
        let x = cs.find_variable("x").unwrap();
        let w = cs.find_variable("w").unwrap();
        cs.assign(x, true);

        let result = cs.propagate_units(Some(x));
        assert_eq!(result.units.len(), 2);
        assert_eq!(cs.value(w), None, "unrelated unit clause is not visited");
    }

    #[test]
    fn test_conflict_reports_empty_clause() {
        let mut cs: WatchedClauseSet = "a & !a|b & !b|!a".parse().unwrap();
        let result = cs.propagate_units(None);
        assert_eq!(result.conflict, Some(2));
        assert_eq!(result.units.len(), 2);
    }
}
