#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Backbones: the literals true in every model of a formula.
//!
//! Both algorithms here are built on repeated CDCL runs.
//!
//! * [`kaiser_kuechlin`] tests each literal of a base model by forcing its
//!   negation in a forked clause set.
//! * [`intersection`] keeps re-solving the same clause set, learned clauses
//!   included, while steering decisions towards flipping the remaining
//!   candidates.
//!
//! An unsatisfiable formula has an empty backbone.

use crate::sat::cdcl::{self, CandidateOrder, SearchOptions, Solved};
use crate::sat::clause_set::WatchedClauseSet;
use crate::sat::implicant::prime_implicant_watched;
use crate::sat::literal::{Literal, LiteralSet, VarId};
use crate::sat::phase_saving::Phase;
use clap::ValueEnum;
use rustc_hash::FxHashSet;
use tracing::{debug, info};

/// Backbone literals with the number of CDCL runs spent finding them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Backbone {
    /// Literals true in every model.
    pub literals: LiteralSet,
    /// Calls to the CDCL engine, the first satisfiability check included.
    pub cdcl_runs: usize,
}

/// Backbone algorithm selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Algorithm {
    /// Forces the negation of each candidate in turn.
    #[default]
    KaiserKuechlin,
    /// Intersects the trails of successive models.
    Intersection,
}

/// Runs the chosen algorithm. `use_optimisations` only affects
/// [`Algorithm::KaiserKuechlin`].
pub fn compute(cs: &mut WatchedClauseSet, algorithm: Algorithm, use_optimisations: bool) -> Backbone {
    match algorithm {
        Algorithm::KaiserKuechlin => kaiser_kuechlin(cs, use_optimisations),
        Algorithm::Intersection => intersection(cs),
    }
}

fn axiomatic(solved: &Solved) -> impl Iterator<Item = Literal> + '_ {
    solved.trail.axiomatic().map(|s| s.literal())
}

/// One forced-negation test per literal of a base model.
///
/// The base run decides every variable `false`. Its level-0 literals are
/// backbone outright. Every other literal `l` is checked by forking the
/// clause set, adding the unit clause `!l`, and solving: unsatisfiable means
/// `l` is backbone. A satisfying fork also rules out every variable whose
/// value differs from the base model.
///
/// With `use_optimisations`, level-0 literals are not re-tested, free variables
/// of the base model are skipped, and a second run deciding `true` rules out
/// every variable on which the two runs disagree.
pub fn kaiser_kuechlin(cs: &mut WatchedClauseSet, use_optimisations: bool) -> Backbone {
    let base = cdcl::solve_with(cs, &SearchOptions::with_phase(Phase::Negative));
    let mut report = Backbone {
        cdcl_runs: 1,
        ..Backbone::default()
    };
    if !base.is_sat() {
        info!(runs = report.cdcl_runs, "formula is unsatisfiable, backbone is empty");
        return report;
    }

    let base_model = cs.model();
    let mut skipped: FxHashSet<VarId> = FxHashSet::default();

    if use_optimisations {
        report.literals.extend(axiomatic(&base));
        skipped.extend(cs.present_variables().filter(|&v| cs.value(v).is_none()));

        let flipped = cdcl::solve_with(cs, &SearchOptions::with_phase(Phase::Positive));
        report.cdcl_runs += 1;
        debug_assert!(flipped.is_sat());
        skipped.extend(
            cs.present_variables()
                .filter(|&v| cs.value(v).is_some_and(|b| !base_model.contains(&Literal::new(v, b)))),
        );
    }

    let to_check: Vec<Literal> = base
        .trail
        .iter()
        .filter(|s| !use_optimisations || s.level > 0)
        .map(|s| s.literal())
        .collect();

    for lit in to_check {
        if skipped.contains(&lit.variable()) {
            continue;
        }

        let mut forced = cs.fork();
        forced.add_clause([!lit]);
        report.cdcl_runs += 1;

        if cdcl::solve(&mut forced) {
            skipped.extend(forced.present_variables().filter(|&v| {
                forced
                    .value(v)
                    .is_none_or(|b| !base_model.contains(&Literal::new(v, b)))
            }));
        } else {
            debug!(var = lit.variable(), "forced negation is unsatisfiable");
            report.literals.insert(lit);
        }
    }

    info!(
        runs = report.cdcl_runs,
        size = report.literals.len(),
        "kaiser-kuechlin backbone"
    );
    report
}

/// Repeated solving of one clause set with decisions biased towards the
/// negation of every remaining candidate.
///
/// The candidates start as the non-level-0 literals of a prime implicant of
/// the first model. After each run a candidate is dropped if its variable was
/// left free, took the flipped value (so it is not backbone), or landed on
/// level 0 (so it is). The backbone is the union of all level-0 literals seen.
pub fn intersection(cs: &mut WatchedClauseSet) -> Backbone {
    let first = cdcl::solve_with(cs, &SearchOptions::default());
    let mut report = Backbone {
        cdcl_runs: 1,
        ..Backbone::default()
    };
    if !first.is_sat() {
        info!(runs = report.cdcl_runs, "formula is unsatisfiable, backbone is empty");
        return report;
    }

    report.literals.extend(axiomatic(&first));
    let implicant = prime_implicant_watched(cs, &first.trail);
    let mut candidates: CandidateOrder = first
        .trail
        .iter()
        .filter(|s| s.level > 0 && implicant.contains(&s.literal()))
        .map(|s| !s.literal())
        .collect();

    while !candidates.is_empty() {
        cs.reset_all();
        let run = cdcl::solve_with(cs, &SearchOptions::with_candidates(&candidates));
        report.cdcl_runs += 1;
        assert!(run.is_sat(), "a satisfiable formula became unsatisfiable");

        report.literals.extend(axiomatic(&run));
        let before = candidates.len();
        candidates.retain(|flip| match run.trail.step(flip.variable()) {
            None => false,
            Some(step) => step.level > 0 && step.value != flip.polarity(),
        });
        debug!(
            dropped = before - candidates.len(),
            left = candidates.len(),
            "intersection round"
        );
    }

    info!(
        runs = report.cdcl_runs,
        size = report.literals.len(),
        "intersection backbone"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(cs: &WatchedClauseSet, lits: &[(&str, bool)]) -> LiteralSet {
        lits.iter()
            .map(|&(n, p)| cs.literal(n, p).unwrap())
            .collect()
    }

    fn all_variants(text: &str) -> Vec<Backbone> {
        let mut results = Vec::new();
        for optimise in [true, false] {
            let mut cs: WatchedClauseSet = text.parse().unwrap();
            results.push(kaiser_kuechlin(&mut cs, optimise));
        }
        let mut cs: WatchedClauseSet = text.parse().unwrap();
        results.push(intersection(&mut cs));
        results
    }

    #[test]
    fn test_single_forced_literal() {
        let text = "a & a|b|c";
        let cs: WatchedClauseSet = text.parse().unwrap();
        let expected = named(&cs, &[("a", true)]);
        for backbone in all_variants(text) {
            assert_eq!(backbone.literals, expected);
        }
    }

    #[test]
    fn test_propagated_backbone() {
        let text = "!a & a|b";
        let cs: WatchedClauseSet = text.parse().unwrap();
        let expected = named(&cs, &[("a", false), ("b", true)]);
        for backbone in all_variants(text) {
            assert_eq!(backbone.literals, expected);
        }
    }

    #[test]
    fn test_backbone_needs_search() {
        let text = "D|!G|!J & D|!I|J & F|!J|!K & F|I & !F|!J & B|!F|!I & F|!J \
                    & D|!G & !F|G & !F|!G & !F|!J & !D|!F|!G|!K & !F|!G|K & M|N";
        let cs: WatchedClauseSet = text.parse().unwrap();
        let expected = named(&cs, &[("D", true), ("F", false), ("I", true), ("J", false)]);
        for backbone in all_variants(text) {
            assert_eq!(backbone.literals, expected);
            assert!(backbone.cdcl_runs >= 1);
        }
    }

    #[test]
    fn test_unsat_backbone_is_empty() {
        for backbone in all_variants("C|B & !A & !C & C|!A|!B & C|!B") {
            assert!(backbone.literals.is_empty());
            assert_eq!(backbone.cdcl_runs, 1);
        }
    }

    #[test]
    fn test_free_formula_has_no_backbone() {
        for backbone in all_variants("a|b & c|d") {
            assert!(backbone.literals.is_empty());
        }
    }
}
