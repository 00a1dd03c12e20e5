#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Learning a clause from a conflict by resolution over trail reasons.

use crate::sat::clause::ClauseKind;
use crate::sat::clause_set::ClauseSet;
use crate::sat::literal::{Literal, VarId};
use crate::sat::trail::{Reason, Trail};
use rustc_hash::FxHashMap;

/// Outcome of analysing one conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// No decision is implicated: the formula is contradictory on its own.
    Ground,
    /// The negation of the implicated decisions.
    Learned(Vec<Literal>),
}

/// Resolves the falsified clause `conflict` back to the decisions it depends
/// on.
///
/// Starting from the clause's literals, every entry whose variable was decided
/// moves to the decided set. The propagated entry assigned latest is replaced
/// by the other literals of its reason clause. This repeats until only decided
/// entries were left. Level-0 facts resolve away entirely.
///
/// # Panics
///
/// If a literal of the resolvent is not on the trail, which means `conflict`
/// was not falsified by the trail's assignments.
#[must_use]
pub fn analyse_conflict<C: ClauseKind>(cs: &ClauseSet<C>, trail: &Trail, conflict: usize) -> Conflict {
    let mut resolvent: FxHashMap<VarId, bool> = cs
        .clause(conflict)
        .literals()
        .iter()
        .map(|l| (l.variable(), l.polarity()))
        .collect();
    let mut decided: FxHashMap<VarId, bool> = FxHashMap::default();

    loop {
        resolvent.retain(|&var, &mut polarity| match trail.reason(var) {
            Some(Reason::Decision) => {
                decided.insert(var, polarity);
                false
            }
            Some(Reason::InUnitClause(_)) => true,
            None => panic!("variable {var} in a conflict has no recorded reason"),
        });

        let Some(latest) = resolvent.keys().copied().max_by_key(|&v| trail.position(v)) else {
            break;
        };
        let Some(Reason::InUnitClause(reason)) = trail.reason(latest) else {
            unreachable!("decisions were moved out of the resolvent");
        };

        resolvent.remove(&latest);
        for lit in cs.clause(reason).literals() {
            if lit.variable() != latest {
                resolvent.insert(lit.variable(), lit.polarity());
            }
        }
    }

    if decided.is_empty() {
        return Conflict::Ground;
    }
    let mut learned: Vec<Literal> = decided
        .into_iter()
        .map(|(var, polarity)| Literal::new(var, polarity))
        .collect();
    learned.sort_unstable();
    Conflict::Learned(learned)
}
