#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Prime implicants: inclusion-minimal partial assignments that satisfy the
//! formula whatever the remaining variables are set to.
//!
//! Two extractions exist. [`prime_implicant`] drops assigned variables one at
//! a time and re-checks by exhaustive case split; it is exponential and only
//! meant as a reference. [`prime_implicant_watched`] reuses the CDCL trail:
//! propagated literals are always needed, and a decision is needed exactly
//! when some clause has it as its only true literal, which prime watch mode
//! answers in O(1) per clause.
//!
//! Prime implicants are not unique, so the two may disagree while both being
//! minimal.

use crate::sat::cdcl;
use crate::sat::clause::{ClauseKind, ClauseState};
use crate::sat::clause_set::{ClauseSet, WatchedClauseSet};
use crate::sat::literal::{Literal, LiteralSet, VarId};
use crate::sat::trail::Trail;
use crate::sat::watch::WatchMode;

type Snapshot = Vec<(VarId, Option<bool>)>;

fn snapshot<C: ClauseKind>(cs: &ClauseSet<C>) -> Snapshot {
    cs.present_variables().map(|v| (v, cs.value(v))).collect()
}

fn restore<C: ClauseKind>(cs: &mut ClauseSet<C>, snapshot: &Snapshot) {
    for &(var, value) in snapshot {
        cs.restore_raw(var, value);
    }
    cs.reset_watches();
}

/// Runs `f` with exactly `literals` set and every other variable unset, then
/// puts the previous settings back.
fn with_only<C: ClauseKind, T>(
    cs: &mut ClauseSet<C>,
    literals: &LiteralSet,
    f: impl FnOnce(&mut ClauseSet<C>) -> T,
) -> T {
    let saved = snapshot(cs);
    for var in cs.present_variables() {
        cs.restore_raw(var, None);
    }
    for lit in literals {
        cs.restore_raw(lit.variable(), Some(lit.polarity()));
    }
    let result = f(cs);
    restore(cs, &saved);
    result
}

/// Whether every completion of the current settings satisfies all clauses.
///
/// Splits on a free variable of some clause without a true literal, trying
/// the value that falsifies its literal first so that counterexamples surface
/// early. Only raw settings are touched; watches are stale afterwards.
fn all_completions_satisfy<C: ClauseKind>(cs: &mut ClauseSet<C>) -> bool {
    let mut open = None;
    for clause in cs.clauses() {
        match clause.evaluate(cs.variables()) {
            ClauseState::Satisfied => {}
            ClauseState::Empty => return false,
            ClauseState::Unit(lit) => {
                open = Some(lit);
                break;
            }
            ClauseState::Unresolved => {
                open = clause
                    .literals()
                    .iter()
                    .copied()
                    .find(|l| l.is_unset(cs.variables()));
                break;
            }
        }
    }
    let Some(lit) = open else {
        return true;
    };

    let var = lit.variable();
    let holds = [!lit.polarity(), lit.polarity()].into_iter().all(|value| {
        cs.restore_raw(var, Some(value));
        all_completions_satisfy(cs)
    });
    cs.restore_raw(var, None);
    holds
}

/// Whether setting only `literals` satisfies the formula for every
/// completion. Current settings are left untouched.
pub fn is_implicant<C: ClauseKind>(cs: &mut ClauseSet<C>, literals: &LiteralSet) -> bool {
    with_only(cs, literals, all_completions_satisfy)
}

/// Whether `literals` is an implicant none of whose literals can be dropped.
pub fn is_prime_implicant<C: ClauseKind>(cs: &mut ClauseSet<C>, literals: &LiteralSet) -> bool {
    if !is_implicant(cs, literals) {
        return false;
    }
    literals.iter().all(|lit| {
        let mut smaller = literals.clone();
        smaller.remove(lit);
        !is_implicant(cs, &smaller)
    })
}

/// Reference extraction. Solves first unless the current settings already
/// satisfy every clause; `None` if the formula is unsatisfiable.
///
/// Dropping a variable can only add completions, so a literal that was
/// needed once stays needed and a single pass suffices. The settings found on
/// entry (or by the solve) are restored before returning.
pub fn prime_implicant<C: ClauseKind>(cs: &mut ClauseSet<C>) -> Option<LiteralSet> {
    if !cs.is_satisfied_by_settings() && !cdcl::solve(cs) {
        return None;
    }

    let saved = snapshot(cs);
    for (var, value) in &saved {
        if value.is_none() {
            continue;
        }
        cs.restore_raw(*var, None);
        if !all_completions_satisfy(cs) {
            cs.restore_raw(*var, *value);
        }
    }
    let implicant = cs.model();
    restore(cs, &saved);
    Some(implicant)
}

/// Extraction from the trail of a satisfying CDCL run on `cs`, whose
/// variables must still hold that run's model.
///
/// # Panics
///
/// If some clause is not satisfied by the current settings.
pub fn prime_implicant_watched(cs: &mut WatchedClauseSet, trail: &Trail) -> LiteralSet {
    assert!(
        cs.is_satisfied_by_settings(),
        "prime implicant requested for a non-model"
    );
    let saved = snapshot(cs);
    cs.set_watch_mode(WatchMode::Prime);

    let mut implicant: LiteralSet = trail
        .iter()
        .filter(|s| !s.is_decision())
        .map(|s| s.literal())
        .collect();

    for step in trail.decisions().rev() {
        let lit = step.literal();
        if is_sole_support(cs, lit) {
            implicant.insert(lit);
        } else {
            cs.unassign(lit.variable());
        }
    }

    restore(cs, &saved);
    cs.set_watch_mode(WatchMode::Unit);
    implicant
}

/// Whether some clause containing `lit` has it as its only true literal.
fn is_sole_support(cs: &WatchedClauseSet, lit: Literal) -> bool {
    cs.occurrences(lit.variable())
        .iter()
        .any(|&idx| cs.clause(idx).prime_literal() == Some(lit))
}

/// Solves `cs` and extracts a prime implicant from the run.
pub fn find_prime_implicant(cs: &mut WatchedClauseSet) -> Option<LiteralSet> {
    let solved = cdcl::solve_with(cs, &cdcl::SearchOptions::default());
    solved
        .is_sat()
        .then(|| prime_implicant_watched(cs, &solved.trail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::clause_set::PlainClauseSet;

    fn literals(cs: &WatchedClauseSet, lits: &[(&str, bool)]) -> LiteralSet {
        lits.iter()
            .map(|&(n, p)| cs.literal(n, p).unwrap())
            .collect()
    }

    #[test]
    fn test_implicant_checks() {
        let mut cs: WatchedClauseSet = "a & b|c".parse().unwrap();
        let a = literals(&cs, &[("a", true)]);
        let ab = literals(&cs, &[("a", true), ("b", true)]);
        let abc = literals(&cs, &[("a", true), ("b", true), ("c", true)]);

        assert!(!is_implicant(&mut cs, &a));
        assert!(is_implicant(&mut cs, &ab));
        assert!(is_prime_implicant(&mut cs, &ab));
        assert!(is_implicant(&mut cs, &abc));
        assert!(!is_prime_implicant(&mut cs, &abc));
    }

    #[test]
    fn test_implicant_check_leaves_settings_alone() {
        let mut cs: WatchedClauseSet = "a|b & !a|c".parse().unwrap();
        assert!(cdcl::solve(&mut cs));
        let before = cs.model();
        let partial = literals(&cs, &[("b", true)]);
        assert!(!is_implicant(&mut cs, &partial));
        assert_eq!(cs.model(), before);
        assert!(cs.is_fulfilled());
    }

    #[test]
    fn test_implicant_search_keeps_saved_phases() {
        let mut cs: WatchedClauseSet = "a|b|c & !a|b & c|d & !d|e".parse().unwrap();
        assert!(cdcl::solve(&mut cs));
        let saved = |cs: &WatchedClauseSet| -> Vec<bool> {
            cs.variables().iter().map(|(_, v)| v.previous_setting).collect()
        };
        let before = saved(&cs);

        let implicant = prime_implicant(&mut cs).unwrap();
        assert!(is_prime_implicant(&mut cs, &implicant));
        let everything = cs.model();
        assert!(is_implicant(&mut cs, &everything));
        assert_eq!(saved(&cs), before);
    }

    #[test]
    fn test_reference_extraction_is_prime() {
        let mut cs: PlainClauseSet = "a|b|c & !a|b & c|d".parse().unwrap();
        let implicant = prime_implicant(&mut cs).unwrap();
        assert!(is_prime_implicant(&mut cs, &implicant));
    }

    #[test]
    fn test_watched_extraction_drops_needless_decisions() {
        let mut cs: WatchedClauseSet = "a|b & a|c & d|e".parse().unwrap();
        let implicant = find_prime_implicant(&mut cs).unwrap();
        assert!(is_prime_implicant(&mut cs, &implicant));
        assert!(implicant.len() <= cs.num_vars());
        assert!(cs.is_fulfilled(), "model and unit watches are restored");
    }

    #[test]
    fn test_unsat_has_no_implicant() {
        let mut cs: WatchedClauseSet = "a & !a|b & !b".parse().unwrap();
        assert_eq!(find_prime_implicant(&mut cs), None);
        assert_eq!(prime_implicant(&mut cs), None);
    }
}
