#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The interface shared by the CDCL and DPLL solvers, and their counters.
use crate::sat::clause::ClauseKind;
use crate::sat::clause_set::ClauseSet;
use crate::sat::literal::LiteralSet;

/// A satisfying assignment: one literal per assigned variable.
pub type Solutions = LiteralSet;

/// Counters collected while solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SolutionStats {
    /// Conflicts met, level 0 included.
    pub conflicts: usize,
    /// Decisions taken.
    pub decisions: usize,
    /// Literals implied by unit propagation.
    pub propagations: usize,
    /// Clauses added by conflict analysis.
    pub learnt_clauses: usize,
}

/// Common interface of the complete solvers.
pub trait Solver<C: ClauseKind> {
    /// Wraps a clause set.
    fn new(clauses: ClauseSet<C>) -> Self;

    /// `Some(model)` if satisfiable, `None` otherwise.
    fn solve(&mut self) -> Option<Solutions>;

    /// The assignment left by the last [`Solver::solve`] call.
    fn solutions(&self) -> Solutions;

    /// Counters of the last run.
    fn stats(&self) -> SolutionStats;

    /// The clause set with its current settings.
    fn clause_set(&self) -> &ClauseSet<C>;
}
