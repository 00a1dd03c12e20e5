//! A plain recursive DPLL (Davis-Putnam-Logemann-Loveland) solver.
//!
//! This module provides the `Dpll` struct, a deliberately naive complete
//! solver used as a correctness oracle for the CDCL engine. It learns
//! nothing, keeps no trail and backtracks by cloning the whole clause set.
//!
//! The core logic involves:
//! 1.  **Unit Propagation:** every unit clause forces its literal, which may
//!     in turn create new unit clauses. This reuses
//!     [`ClauseSet::propagate_units`].
//! 2.  **Decision:** if propagation neither satisfies nor falsifies the
//!     formula, the first unassigned variable of some open clause is chosen,
//!     and the algorithm recursively tries `true` and then `false`.
//! 3.  **Backtracking:** implicit in the recursion. Each branch works on its
//!     own clone, so a failed branch is simply dropped.

use crate::sat::clause::{ClauseKind, ClauseState};
use crate::sat::clause_set::ClauseSet;
use crate::sat::literal::VarId;
use crate::sat::solver::{SolutionStats, Solutions, Solver};

/// Represents a DPLL SAT solver.
///
/// Generic over the clause kind so the oracle can run on plain clauses,
/// keeping it independent of the watched-literal machinery under test.
#[derive(Debug, Clone)]
pub struct Dpll<C: ClauseKind> {
    /// The formula being solved. After a successful [`Solver::solve`] its
    /// variables hold the model.
    pub clauses: ClauseSet<C>,
    /// Number of branching points visited, across all branches.
    pub decisions: usize,
    /// Number of literals forced by unit propagation, across all branches.
    pub propagations: usize,
}

impl<C: ClauseKind> Solver<C> for Dpll<C> {
    fn new(clauses: ClauseSet<C>) -> Self {
        Self {
            clauses,
            decisions: 0,
            propagations: 0,
        }
    }

    /// Attempts to solve the formula.
    ///
    /// 1.  Propagates units over the whole clause set.
    /// 2.  Returns `None` on a conflict.
    /// 3.  Returns the current assignment if every clause is satisfied.
    /// 4.  Otherwise branches on an unassigned variable, trying `true` on one
    ///     clone and `false` on another.
    ///
    /// # Returns
    ///
    /// * `Some(Solutions)`: the formula is satisfiable; the model is also
    ///   written back into `self.clauses`.
    /// * `None`: the formula is unsatisfiable from the current state.
    fn solve(&mut self) -> Option<Solutions> {
        let propagation = self.clauses.propagate_units(None);
        self.propagations += propagation.units.len();
        if propagation.is_conflict() {
            return None;
        }

        if self.clauses.is_satisfied_by_settings() {
            return Some(self.solutions());
        }

        let var = self.branch_variable()?;
        self.decisions += 1;

        for value in [true, false] {
            let mut branch = self.clone();
            branch.clauses.assign(var, value);
            let found = branch.solve();
            self.decisions = branch.decisions;
            self.propagations = branch.propagations;
            if found.is_some() {
                self.clauses = branch.clauses;
                return found;
            }
        }
        None
    }

    /// Returns the current assignment. Variables left unset are "don't care".
    fn solutions(&self) -> Solutions {
        self.clauses.model()
    }

    /// Returns statistics about the solving process.
    ///
    /// DPLL neither learns nor analyses conflicts, so only `decisions` and
    /// `propagations` are populated.
    fn stats(&self) -> SolutionStats {
        SolutionStats {
            conflicts: 0,
            decisions: self.decisions,
            propagations: self.propagations,
            learnt_clauses: 0,
        }
    }

    fn clause_set(&self) -> &ClauseSet<C> {
        &self.clauses
    }
}

impl<C: ClauseKind> Dpll<C> {
    /// First unassigned variable of the first clause that is not yet
    /// satisfied.
    fn branch_variable(&self) -> Option<VarId> {
        let vars = self.clauses.variables();
        self.clauses
            .clauses()
            .filter(|c| c.evaluate(vars) == ClauseState::Unresolved)
            .flat_map(|c| c.literals().iter())
            .find(|l| l.is_unset(vars))
            .map(|l| l.variable())
    }
}
