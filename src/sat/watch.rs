#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Watched-literal clauses.
//!
//! A [`WatchedClause`] keeps two indices, `head` and `tail`, into its literal
//! array. In [`WatchMode::Unit`] they rest on literals that are not false, so
//! the clause's state can be read from those two positions alone:
//!
//! * either watched literal true: satisfied
//! * `head == tail` on an unset literal: unit
//! * `head == tail` on a false literal: empty
//!
//! In [`WatchMode::Prime`] the watches instead converge on *true* literals, and
//! `head == tail` means the clause has exactly one true literal. The prime
//! implicant extraction uses this to decide which decisions are required.
//!
//! The positions are only a cache. The owning clause set must call
//! [`ClauseKind::on_assign`] / [`ClauseKind::on_unassign`] for every change of
//! a contained variable, otherwise the cache goes stale.

use crate::sat::clause::{ClauseKind, ClauseState, Literals};
use crate::sat::literal::{Literal, VarId};
use crate::sat::variable::VariableSet;

/// How the two watches travel over the literal array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum WatchScheme {
    /// Watches start at both ends and march towards each other.
    #[default]
    ToMiddle,
    /// Watches start next to each other and both move forward, wrapping around.
    SideBySide,
}

/// What the watches track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WatchMode {
    /// Watches rest on non-false literals; used while solving.
    #[default]
    Unit,
    /// Watches rest on true literals; used for prime implicant extraction.
    /// Prime mode always marches to the middle, whatever the scheme.
    Prime,
}

/// Watch configuration of a clause set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WatchPolicy {
    /// What the watches look for.
    pub mode: WatchMode,
    /// How the watches move.
    pub scheme: WatchScheme,
}

impl WatchPolicy {
    /// Unit-propagation watches under `scheme`.
    #[must_use]
    pub const fn new(scheme: WatchScheme) -> Self {
        Self {
            mode: WatchMode::Unit,
            scheme,
        }
    }

    /// The same scheme with watches of `mode`.
    #[must_use]
    pub const fn with_mode(self, mode: WatchMode) -> Self {
        Self {
            mode,
            scheme: self.scheme,
        }
    }
}

/// A clause with two watched positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct WatchedClause {
    literals: Literals,
    head: usize,
    tail: usize,
}

impl WatchedClause {
    /// Position of the first watch.
    #[must_use]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Position of the second watch.
    #[must_use]
    pub const fn tail(&self) -> usize {
        self.tail
    }

    /// Both watched literals; the second is `None` once the watches met.
    #[must_use]
    pub fn watched_literals(&self) -> (Literal, Option<Literal>) {
        let second = (self.head != self.tail).then(|| self.literals[self.tail]);
        (self.literals[self.head], second)
    }

    /// In prime mode, the only literal satisfying this clause, if there is
    /// exactly one.
    #[must_use]
    pub fn prime_literal(&self) -> Option<Literal> {
        (self.head == self.tail).then(|| self.literals[self.head])
    }

    fn initial_positions(&self, policy: WatchPolicy) -> (usize, usize) {
        let last = self.literals.len() - 1;
        match (policy.mode, policy.scheme) {
            (WatchMode::Prime, _) | (WatchMode::Unit, WatchScheme::ToMiddle) => (0, last),
            (WatchMode::Unit, WatchScheme::SideBySide) => (0, last.min(1)),
        }
    }

    fn watched_state(&self, vars: &VariableSet) -> ClauseState {
        let head = self.literals[self.head];
        let tail = self.literals[self.tail];

        if head.becomes_true(vars) || tail.becomes_true(vars) {
            ClauseState::Satisfied
        } else if self.head != self.tail {
            ClauseState::Unresolved
        } else if head.becomes_false(vars) {
            ClauseState::Empty
        } else {
            ClauseState::Unit(head)
        }
    }

    /// Which watch sits on `var`: `Some(true)` for head, `Some(false)` for
    /// tail, `None` if neither.
    fn watch_of(&self, var: VarId) -> Option<bool> {
        if self.literals[self.head].variable() == var {
            Some(true)
        } else if self.literals[self.tail].variable() == var {
            Some(false)
        } else {
            None
        }
    }

    fn update_unit(&mut self, var: VarId, vars: &VariableSet, scheme: WatchScheme) {
        if self.watched_state(vars) != ClauseState::Unresolved {
            return;
        }
        if !vars.is_assigned(var) {
            return;
        }
        let Some(moving_head) = self.watch_of(var) else {
            return;
        };

        match scheme {
            WatchScheme::ToMiddle => {
                self.march_to_middle(moving_head, |lit| !lit.becomes_false(vars));
            }
            WatchScheme::SideBySide => self.march_side_by_side(moving_head, vars),
        }
    }

    fn update_prime(&mut self, var: VarId, vars: &VariableSet) {
        let Some(moving_head) = self.watch_of(var) else {
            return;
        };
        let pos = if moving_head { self.head } else { self.tail };
        if self.literals[pos].becomes_true(vars) {
            return;
        }
        self.march_to_middle(moving_head, |lit| lit.becomes_true(vars));
    }

    /// Moves one watch towards the other until `stop` accepts a literal or the
    /// watches meet.
    fn march_to_middle(&mut self, moving_head: bool, stop: impl Fn(Literal) -> bool) {
        while self.head != self.tail {
            let pos = if moving_head {
                self.head += 1;
                self.head
            } else {
                self.tail -= 1;
                self.tail
            };
            if stop(self.literals[pos]) {
                break;
            }
        }
        debug_assert!(self.head <= self.tail);
    }

    /// Moves one watch forward, wrapping, skipping the other watch. A full
    /// round without a non-false literal collapses it onto the other watch.
    fn march_side_by_side(&mut self, moving_head: bool, vars: &VariableSet) {
        let n = self.literals.len();
        let (start, other) = if moving_head {
            (self.head, self.tail)
        } else {
            (self.tail, self.head)
        };

        let mut pos = start;
        let found = loop {
            pos = (pos + 1) % n;
            if pos == start {
                break other;
            }
            if pos != other && !self.literals[pos].becomes_false(vars) {
                break pos;
            }
        };

        if moving_head {
            self.head = found;
        } else {
            self.tail = found;
        }
    }
}

impl ClauseKind for WatchedClause {
    fn from_literals(literals: Literals) -> Self {
        assert!(!literals.is_empty(), "watched clause needs at least one literal");
        let tail = literals.len() - 1;
        Self {
            literals,
            head: 0,
            tail,
        }
    }

    fn literals(&self) -> &[Literal] {
        &self.literals
    }

    fn state(&self, vars: &VariableSet) -> ClauseState {
        self.watched_state(vars)
    }

    fn on_assign(&mut self, var: VarId, vars: &VariableSet, policy: WatchPolicy) {
        match policy.mode {
            WatchMode::Unit => self.update_unit(var, vars, policy.scheme),
            WatchMode::Prime => self.reset(vars, policy),
        }
    }

    fn on_unassign(&mut self, var: VarId, vars: &VariableSet, policy: WatchPolicy) {
        match policy.mode {
            WatchMode::Unit => self.reset(vars, policy),
            WatchMode::Prime => self.update_prime(var, vars),
        }
    }

    fn reset(&mut self, vars: &VariableSet, policy: WatchPolicy) {
        (self.head, self.tail) = self.initial_positions(policy);
        let head_var = self.literals[self.head].variable();
        let tail_var = self.literals[self.tail].variable();

        match policy.mode {
            WatchMode::Unit => {
                self.update_unit(head_var, vars, policy.scheme);
                self.update_unit(tail_var, vars, policy.scheme);
            }
            WatchMode::Prime => {
                self.update_prime(head_var, vars);
                self.update_prime(tail_var, vars);
            }
        }

        if policy.mode == WatchMode::Prime || policy.scheme == WatchScheme::ToMiddle {
            assert!(
                self.head <= self.tail,
                "watch head {} passed tail {}",
                self.head,
                self.tail
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::clause::normalise;

    fn setup(names: &[(&str, bool)]) -> (VariableSet, WatchedClause) {
        let mut vars = VariableSet::default();
        let lits: Vec<Literal> = names
            .iter()
            .map(|&(n, p)| Literal::new(vars.store_or_get(n), p))
            .collect();
        let clause = WatchedClause::from_literals(normalise(lits, &vars).unwrap());
        (vars, clause)
    }

    fn assign(
        clause: &mut WatchedClause,
        vars: &mut VariableSet,
        name: &str,
        value: bool,
        policy: WatchPolicy,
    ) {
        let v = vars.find(name).unwrap();
        vars.set(v, value);
        clause.on_assign(v, vars, policy);
    }

    #[test]
    fn test_to_middle_detects_unit_and_empty() {
        let policy = WatchPolicy::new(WatchScheme::ToMiddle);
        let (mut vars, mut clause) = setup(&[("a", true), ("b", true), ("c", true)]);
        clause.reset(&vars, policy);
        assert_eq!(clause.state(&vars), ClauseState::Unresolved);

        assign(&mut clause, &mut vars, "a", false, policy);
        assert_eq!(clause.state(&vars), ClauseState::Unresolved);

        assign(&mut clause, &mut vars, "c", false, policy);
        let b = vars.find("b").unwrap();
        assert_eq!(clause.state(&vars), ClauseState::Unit(Literal::new(b, true)));
        assert_eq!(clause.head(), clause.tail());

        assign(&mut clause, &mut vars, "b", false, policy);
        assert_eq!(clause.state(&vars), ClauseState::Empty);
    }

    #[test]
    fn test_to_middle_stops_on_true_literal() {
        let policy = WatchPolicy::new(WatchScheme::ToMiddle);
        let (mut vars, mut clause) = setup(&[("a", true), ("b", true), ("c", true)]);
        clause.reset(&vars, policy);

        let b = vars.find("b").unwrap();
        vars.set(b, true);
        clause.on_assign(b, &vars, policy);
        assign(&mut clause, &mut vars, "a", false, policy);
        assert_eq!(clause.state(&vars), ClauseState::Satisfied);
    }

    #[test]
    fn test_reset_after_unassign_restores_unresolved() {
        let policy = WatchPolicy::new(WatchScheme::ToMiddle);
        let (mut vars, mut clause) = setup(&[("a", true), ("b", false)]);
        clause.reset(&vars, policy);

        assign(&mut clause, &mut vars, "a", false, policy);
        assert!(clause.is_unit(&vars));

        let a = vars.find("a").unwrap();
        vars.clear(a);
        clause.on_unassign(a, &vars, policy);
        assert_eq!(clause.state(&vars), ClauseState::Unresolved);
        assert_eq!((clause.head(), clause.tail()), (0, 1));
    }

    #[test]
    fn test_side_by_side_wraps_to_unit() {
        let policy = WatchPolicy::new(WatchScheme::SideBySide);
        let (mut vars, mut clause) =
            setup(&[("a", true), ("b", true), ("c", true), ("d", true)]);
        clause.reset(&vars, policy);
        assert_eq!((clause.head(), clause.tail()), (0, 1));

        assign(&mut clause, &mut vars, "a", false, policy);
        assert_eq!(clause.state(&vars), ClauseState::Unresolved);
        assign(&mut clause, &mut vars, "b", false, policy);
        assert_eq!(clause.state(&vars), ClauseState::Unresolved);
        assign(&mut clause, &mut vars, "d", false, policy);

        let c = vars.find("c").unwrap();
        assert_eq!(clause.state(&vars), ClauseState::Unit(Literal::new(c, true)));
    }

    #[test]
    fn test_side_by_side_reset_skips_false_prefix() {
        let policy = WatchPolicy::new(WatchScheme::SideBySide);
        let (mut vars, mut clause) = setup(&[("a", true), ("b", true), ("c", true)]);
        let a = vars.find("a").unwrap();
        let b = vars.find("b").unwrap();
        vars.set(a, false);
        vars.set(b, false);
        clause.reset(&vars, policy);

        let c = vars.find("c").unwrap();
        assert_eq!(clause.state(&vars), ClauseState::Unit(Literal::new(c, true)));
    }

    #[test]
    fn test_prime_mode_finds_unique_true_literal() {
        let policy = WatchPolicy::new(WatchScheme::ToMiddle).with_mode(WatchMode::Prime);
        let (mut vars, mut clause) = setup(&[("a", true), ("b", true), ("c", false)]);
        let a = vars.find("a").unwrap();
        let b = vars.find("b").unwrap();
        let c = vars.find("c").unwrap();
        vars.set(a, true);
        vars.set(b, true);
        vars.set(c, true);

        clause.reset(&vars, policy);
        assert_eq!(clause.prime_literal(), None);

        vars.clear(a);
        clause.on_unassign(a, &vars, policy);
        assert_eq!(clause.prime_literal(), Some(Literal::new(b, true)));
    }
}
