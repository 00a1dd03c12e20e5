#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The conflict-driven clause learning loop.
//!
//! ```text
//! Propagating -> Conflict -> Unsat | Learn + backjump -> Propagating
//! Propagating -> Satisfied
//! Propagating -> Deciding -> Propagating
//! ```
//!
//! After a conflict the level drops by exactly one. Right after the backjump
//! the learned clause is either unit or already empty, and earlier learned
//! clauses may have turned unit as well, so propagation re-scans every clause
//! before the next decision.

use crate::sat::clause::ClauseKind;
use crate::sat::clause_set::ClauseSet;
use crate::sat::conflict_analysis::{Conflict, analyse_conflict};
use crate::sat::literal::{Literal, VarId};
use crate::sat::phase_saving::Phase;
use crate::sat::propagation::Propagation;
use crate::sat::solver::{SolutionStats, Solutions, Solver};
use crate::sat::trail::{Reason, Trail};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Preferred decisions, consulted in order before the VSIDS heap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateOrder {
    order: Vec<Literal>,
    lookup: FxHashMap<VarId, bool>,
}

impl CandidateOrder {
    /// An empty order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `lit` unless its variable is already a candidate.
    pub fn push(&mut self, lit: Literal) -> bool {
        if self.lookup.contains_key(&lit.variable()) {
            return false;
        }
        self.lookup.insert(lit.variable(), lit.polarity());
        self.order.push(lit);
        true
    }

    /// The preferred value for `var`.
    #[must_use]
    pub fn get(&self, var: VarId) -> Option<bool> {
        self.lookup.get(&var).copied()
    }

    /// Whether `var` has a preferred value.
    #[must_use]
    pub fn contains(&self, var: VarId) -> bool {
        self.lookup.contains_key(&var)
    }

    /// Drops `var` from the order and returns its preferred value.
    pub fn remove(&mut self, var: VarId) -> Option<bool> {
        let value = self.lookup.remove(&var)?;
        self.order.retain(|l| l.variable() != var);
        Some(value)
    }

    /// Keeps only the candidates `keep` accepts, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(Literal) -> bool) {
        let lookup = &mut self.lookup;
        self.order.retain(|&lit| {
            let kept = keep(lit);
            if !kept {
                lookup.remove(&lit.variable());
            }
            kept
        });
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether there are no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Candidates front to back.
    pub fn iter(&self) -> impl Iterator<Item = Literal> + '_ {
        self.order.iter().copied()
    }
}

impl FromIterator<Literal> for CandidateOrder {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        let mut order = Self::new();
        for lit in iter {
            order.push(lit);
        }
        order
    }
}

/// Knobs for a single CDCL run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions<'a> {
    /// Decisions taken from here first, front to back, skipping variables
    /// that are already set. The cursor never moves back, even on backjumps.
    pub candidates: Option<&'a CandidateOrder>,
    /// Polarity of heap decisions.
    pub phase: Phase,
}

impl<'a> SearchOptions<'a> {
    /// No candidates, heap decisions with `phase`.
    #[must_use]
    pub const fn with_phase(phase: Phase) -> Self {
        Self {
            candidates: None,
            phase,
        }
    }

    /// Decide `candidates` first, then fall back to saved phases.
    #[must_use]
    pub const fn with_candidates(candidates: &'a CandidateOrder) -> Self {
        Self {
            candidates: Some(candidates),
            phase: Phase::Saved,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Every clause is satisfied.
    Satisfied,
    /// The clauses have no model.
    Unsat,
}

/// Terminal state of a run. For [`Status::Satisfied`] the trail is the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solved {
    /// How the run ended.
    pub status: Status,
    /// The trail at the end of the run.
    pub trail: Trail,
}

impl Solved {
    /// Whether a model was found.
    #[must_use]
    pub fn is_sat(&self) -> bool {
        self.status == Status::Satisfied
    }
}

/// Decides satisfiability. On success the variables of `cs` hold a model.
pub fn solve<C: ClauseKind>(cs: &mut ClauseSet<C>) -> bool {
    solve_with(cs, &SearchOptions::default()).is_sat()
}

/// Runs CDCL from a clean assignment. Learned clauses of earlier runs on
/// `cs` are kept and take part in propagation.
///
/// # Panics
///
/// If the clause set claims to be unsatisfied while every variable is set,
/// which means the watch caches went stale.
pub fn solve_with<C: ClauseKind>(cs: &mut ClauseSet<C>, options: &SearchOptions<'_>) -> Solved {
    cs.reset_all();
    let mut trail = Trail::new(cs.num_vars());
    let mut level = 0;
    let mut cursor = 0;
    let mut propagation = cs.propagate_units(None);

    loop {
        record(&mut trail, level, &propagation);

        if let Some(conflict) = propagation.conflict {
            cs.record_conflict();
            trace!(level, conflict, "conflict");

            if level == 0 {
                debug!(learnt = cs.learnt_len(), "unsatisfiable at level 0");
                return unsat(trail);
            }

            let Conflict::Learned(learned) = analyse_conflict(cs, &trail, conflict) else {
                debug!("conflict implicates no decision");
                return unsat(trail);
            };

            for lit in &learned {
                cs.bump_activity(lit.variable());
            }
            level -= 1;
            cs.reset_vars(trail.backtrack_to(level));

            debug!(size = learned.len(), level, "learned clause");
            let added = cs.add_resolvent(learned);
            debug_assert!(added.is_some(), "learned clauses never repeat a variable");
            propagation = cs.propagate_units(None);
            continue;
        }

        if cs.is_fulfilled() {
            debug!(
                trail = trail.len(),
                learnt = cs.learnt_len(),
                "satisfied"
            );
            return Solved {
                status: Status::Satisfied,
                trail,
            };
        }

        debug_assert_eq!(
            cs.pending_clause(),
            None,
            "deciding while a clause is unit or empty"
        );
        let decision = next_candidate(cs, options.candidates, &mut cursor)
            .or_else(|| cs.make_vsids_assignment(options.phase));
        let Some(decision) = decision else {
            panic!("no unassigned variable left although some clause is unsatisfied");
        };

        level += 1;
        cs.stats.decisions += 1;
        trace!(level, var = decision.variable(), value = decision.polarity(), "decide");
        trail.push(level, decision.variable(), decision.polarity(), Reason::Decision);
        propagation = cs.propagate_units(Some(decision.variable()));
    }
}

fn record(trail: &mut Trail, level: usize, propagation: &Propagation) {
    for &(lit, idx) in &propagation.units {
        trail.push(level, lit.variable(), lit.polarity(), Reason::InUnitClause(idx));
    }
}

const fn unsat(trail: Trail) -> Solved {
    Solved {
        status: Status::Unsat,
        trail,
    }
}

fn next_candidate<C: ClauseKind>(
    cs: &mut ClauseSet<C>,
    candidates: Option<&CandidateOrder>,
    cursor: &mut usize,
) -> Option<Literal> {
    let order = candidates?;
    while let Some(lit) = order.order.get(*cursor).copied() {
        *cursor += 1;
        if cs.value(lit.variable()).is_none() {
            cs.assign(lit.variable(), lit.polarity());
            return Some(lit);
        }
    }
    None
}

/// CDCL behind the [`Solver`] interface.
#[derive(Debug, Clone)]
pub struct Cdcl<C: ClauseKind> {
    clauses: ClauseSet<C>,
    trail: Trail,
    phase: Phase,
}

impl<C: ClauseKind> Cdcl<C> {
    /// A solver deciding heap variables with `phase`.
    #[must_use]
    pub fn with_phase(clauses: ClauseSet<C>, phase: Phase) -> Self {
        Self {
            trail: Trail::new(clauses.num_vars()),
            clauses,
            phase,
        }
    }

    /// Trail of the last run.
    #[must_use]
    pub const fn trail(&self) -> &Trail {
        &self.trail
    }

    /// Gives back the clause set, learned clauses and settings included.
    pub fn into_inner(self) -> ClauseSet<C> {
        self.clauses
    }
}

impl<C: ClauseKind> Solver<C> for Cdcl<C> {
    fn new(clauses: ClauseSet<C>) -> Self {
        Self::with_phase(clauses, Phase::default())
    }

    fn solve(&mut self) -> Option<Solutions> {
        let solved = solve_with(&mut self.clauses, &SearchOptions::with_phase(self.phase));
        self.trail = solved.trail;
        match solved.status {
            Status::Satisfied => Some(self.solutions()),
            Status::Unsat => None,
        }
    }

    fn solutions(&self) -> Solutions {
        self.clauses.model()
    }

    fn stats(&self) -> SolutionStats {
        *self.clauses.stats()
    }

    fn clause_set(&self) -> &ClauseSet<C> {
        &self.clauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::clause::Clause;
    use crate::sat::clause_set::{PlainClauseSet, WatchedClauseSet};
    use crate::sat::generator::random_k_sat;
    use crate::sat::watch::WatchScheme;

    const UNSAT: &str = "C|B & !A & !C & C|!A|!B & C|!B";

    #[test]
    fn test_unit_formula_is_solved_by_propagation() {
        let mut cs: WatchedClauseSet = "a & !b & c".parse().unwrap();
        let solved = solve_with(&mut cs, &SearchOptions::default());
        assert!(solved.is_sat());
        assert_eq!(solved.trail.len(), 3);
        assert!(solved.trail.iter().all(|s| s.level == 0));
        assert!(cs.is_satisfied_by_settings());
    }

    #[test]
    fn test_unsat_example() {
        let mut watched: WatchedClauseSet = UNSAT.parse().unwrap();
        assert!(!solve(&mut watched));

        let mut plain: PlainClauseSet = UNSAT.parse().unwrap();
        assert!(!solve(&mut plain));
    }

    #[test]
    fn test_contradiction_needing_decisions() {
        let mut cs: WatchedClauseSet = "a|b & a|!b & !a|b & !a|!b".parse().unwrap();
        assert!(!solve(&mut cs));
        assert!(cs.stats().conflicts > 0);
    }

    #[test]
    fn test_model_satisfies_original_clauses() {
        let text = "a|b|c & !a|!b & !b|!c & !a|!c & b|d & !d|!c|a & e|!a";
        let mut cs: WatchedClauseSet = text.parse().unwrap();
        assert!(solve(&mut cs));
        assert!(cs.is_satisfied_by_settings());

        let mut plain: ClauseSet<Clause> = text.parse().unwrap();
        assert!(solve(&mut plain));
        assert!(plain.is_satisfied_by_settings());
    }

    #[test]
    fn test_pigeonhole_three_into_two_is_unsat() {
        // p{i}{h}: pigeon i sits in hole h
        let text = "p11|p12 & p21|p22 & p31|p32 \
                    & !p11|!p21 & !p11|!p31 & !p21|!p31 \
                    & !p12|!p22 & !p12|!p32 & !p22|!p32";
        let mut cs: WatchedClauseSet = text.parse().unwrap();
        assert!(!solve(&mut cs));
        assert!(cs.learnt_len() > 0);
    }

    #[test]
    fn test_backjump_propagates_to_fixpoint_before_deciding() {
        // solve_with asserts that no clause is unit or empty before each
        // decision, so multi-level conflicts on these formulas exercise it
        let mut conflicts = 0;
        for seed in 0..200 {
            let raw = random_k_sat(&mut fastrand::Rng::with_seed(seed), 30, 128, 3);
            for scheme in [WatchScheme::ToMiddle, WatchScheme::SideBySide] {
                let mut cs: WatchedClauseSet = ClauseSet::with_scheme(raw.clone(), scheme).unwrap();
                let solved = solve_with(&mut cs, &SearchOptions::default());
                conflicts += cs.stats().conflicts;
                if solved.is_sat() {
                    assert!(cs.is_satisfied_by_settings(), "seed {seed}");
                    assert_eq!(cs.pending_clause(), None, "seed {seed}");
                }
            }
        }
        assert!(conflicts > 0);
    }

    #[test]
    fn test_resolving_keeps_learned_clauses_consistent() {
        let raw = random_k_sat(&mut fastrand::Rng::with_seed(7), 30, 128, 3);
        let mut cs: PlainClauseSet = ClauseSet::from_clauses(raw).unwrap();
        let first = solve(&mut cs);
        let learnt = cs.learnt_len();
        assert_eq!(solve(&mut cs), first);
        assert!(cs.learnt_len() >= learnt);
    }

    #[test]
    fn test_fixed_phase_steers_free_variables() {
        let mut cs: WatchedClauseSet = "a|b & c|d".parse().unwrap();
        let solved = solve_with(&mut cs, &SearchOptions::with_phase(Phase::Negative));
        assert!(solved.is_sat());
        let decided: Vec<bool> = solved.trail.decisions().map(|s| s.value).collect();
        assert!(decided.iter().all(|&v| !v));
    }

    #[test]
    fn test_candidates_are_tried_first() {
        let mut cs: WatchedClauseSet = "a|b & b|c".parse().unwrap();
        let b = cs.find_variable("b").unwrap();
        let c = cs.find_variable("c").unwrap();
        let order: CandidateOrder = [Literal::new(c, false), Literal::new(b, false)]
            .into_iter()
            .collect();

        let solved = solve_with(&mut cs, &SearchOptions::with_candidates(&order));
        assert!(solved.is_sat());
        assert_eq!(solved.trail[0].literal(), Literal::new(c, false));
        assert!(solved.trail[0].is_decision());
        assert_eq!(cs.value(b), Some(true));
    }

    #[test]
    fn test_candidate_order_bookkeeping() {
        let mut order = CandidateOrder::new();
        assert!(order.push(Literal::new(3, true)));
        assert!(order.push(Literal::new(1, false)));
        assert!(!order.push(Literal::new(3, false)));
        assert_eq!(order.get(3), Some(true));

        order.retain(|l| l.variable() != 3);
        assert_eq!(order.len(), 1);
        assert!(!order.contains(3));
        assert_eq!(order.remove(1), Some(false));
        assert!(order.is_empty());
    }

    #[test]
    fn test_solver_trait_reports_model() {
        let cs: WatchedClauseSet = "x|y & !x".parse().unwrap();
        let mut solver = Cdcl::new(cs);
        let model = solver.solve().unwrap();
        let x = solver.clause_set().find_variable("x").unwrap();
        let y = solver.clause_set().find_variable("y").unwrap();
        assert!(model.contains(&Literal::new(x, false)));
        assert!(model.contains(&Literal::new(y, true)));
        assert_eq!(solver.stats().decisions, 0);
    }
}
