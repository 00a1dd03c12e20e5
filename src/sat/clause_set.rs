#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A formula in conjunctive normal form together with its solving state.
//!
//! A [`ClauseSet`] owns:
//!
//! * the clauses, original ones first and learned resolvents after them,
//! * the [`VariableSet`] arena with every variable's setting and activity,
//! * an occurrence index from each variable to the clauses containing it,
//! * the VSIDS decision heap.
//!
//! Every change of a variable's setting goes through [`ClauseSet::assign`] or
//! [`ClauseSet::unassign`], which notify each clause in the variable's
//! occurrence list. This keeps watched-literal caches consistent.

use crate::sat::clause::{ClauseKind, ClauseState, Literals, normalise};
use crate::sat::error::{Error, Result};
use crate::sat::heap::VsidsHeap;
use crate::sat::literal::{Literal, LiteralSet, VarId};
use crate::sat::phase_saving::Phase;
use crate::sat::solver::SolutionStats;
use crate::sat::variable::VariableSet;
use crate::sat::watch::{WatchMode, WatchPolicy, WatchScheme, WatchedClause};
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt::{Display, Formatter};

/// Clause indices containing one variable.
pub type Occurrences = SmallVec<[usize; 6]>;

/// Conflicts between two halvings of all activities.
pub const DECAY_INTERVAL: usize = 256;
/// Conflicts between two heap reorders.
pub const REORDER_INTERVAL: usize = 17;

/// A conjunction of clauses over one variable arena.
#[derive(Debug, Clone)]
pub struct ClauseSet<C: ClauseKind = WatchedClause> {
    clauses: Vec<C>,
    original: usize,
    occurrences: Vec<Occurrences>,
    vars: VariableSet,
    heap: VsidsHeap,
    policy: WatchPolicy,
    conflict_counter: usize,
    pub(crate) stats: SolutionStats,
}

/// Clause set with O(1) watched-literal state queries.
pub type WatchedClauseSet = ClauseSet<WatchedClause>;
/// Clause set whose clauses are rescanned on every query.
pub type PlainClauseSet = ClauseSet<crate::sat::clause::Clause>;

impl<C: ClauseKind> ClauseSet<C> {
    /// Builds a clause set from `(identifier, polarity)` pairs.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyClause`] for a clause without literals,
    /// [`Error::BlankIdentifier`] for an empty or whitespace-only identifier.
    pub fn from_clauses<I, J, S>(clauses: I) -> Result<Self>
    where
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = (S, bool)>,
        S: AsRef<str>,
    {
        Self::with_scheme(clauses, WatchScheme::default())
    }

    /// Like [`ClauseSet::from_clauses`], with an explicit watch scheme.
    ///
    /// # Errors
    ///
    /// See [`ClauseSet::from_clauses`].
    pub fn with_scheme<I, J, S>(clauses: I, scheme: WatchScheme) -> Result<Self>
    where
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = (S, bool)>,
        S: AsRef<str>,
    {
        let mut vars = VariableSet::default();
        let mut raw: Vec<Vec<Literal>> = Vec::new();

        for (idx, clause) in clauses.into_iter().enumerate() {
            let mut lits = Vec::new();
            for (name, polarity) in clause {
                let name = name.as_ref();
                if name.trim().is_empty() {
                    return Err(Error::BlankIdentifier { clause: idx });
                }
                lits.push(Literal::new(vars.store_or_get(name), polarity));
            }
            if lits.is_empty() {
                return Err(Error::EmptyClause { clause: idx });
            }
            raw.push(lits);
        }

        Ok(Self::from_parts(vars, raw, scheme))
    }

    fn from_parts(vars: VariableSet, raw: Vec<Vec<Literal>>, scheme: WatchScheme) -> Self {
        let clauses: Vec<C> = raw
            .into_iter()
            .filter_map(|lits| normalise(lits, &vars))
            .map(C::from_literals)
            .collect();

        let mut set = Self {
            original: clauses.len(),
            occurrences: vec![Occurrences::new(); vars.len()],
            heap: VsidsHeap::new(vars.len()),
            policy: WatchPolicy::new(scheme),
            conflict_counter: 0,
            stats: SolutionStats::default(),
            clauses,
            vars,
        };

        for idx in 0..set.clauses.len() {
            set.register(idx);
        }
        for var in set.vars.ids() {
            #[allow(clippy::cast_precision_loss)]
            let count = set.occurrences[var as usize].len() as f64;
            set.vars[var].activity = count;
        }
        set.reset_all();
        set
    }

    fn register(&mut self, idx: usize) {
        for lit in self.clauses[idx].literals() {
            self.occurrences[lit.index()].push(idx);
        }
    }

    /// A copy with the same clauses and activities but every variable unset.
    #[must_use]
    pub fn fork(&self) -> Self {
        let mut forked = self.clone();
        forked.stats = SolutionStats::default();
        forked.conflict_counter = 0;
        forked.reset_all();
        forked
    }

    /// Number of clauses, learned ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether there are no clauses at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Number of clauses given at construction (tautologies excluded).
    #[must_use]
    pub const fn original_len(&self) -> usize {
        self.original
    }

    /// Number of learned clauses.
    #[must_use]
    pub fn learnt_len(&self) -> usize {
        self.clauses.len() - self.original
    }

    /// Every clause, original ones first.
    pub fn clauses(&self) -> impl Iterator<Item = &C> {
        self.clauses.iter()
    }

    /// The clauses given at construction.
    pub fn original_clauses(&self) -> impl Iterator<Item = &C> {
        self.clauses[..self.original].iter()
    }

    /// Clause `idx`.
    #[must_use]
    pub fn clause(&self, idx: usize) -> &C {
        &self.clauses[idx]
    }

    /// The variable arena.
    #[must_use]
    pub const fn variables(&self) -> &VariableSet {
        &self.vars
    }

    /// Number of variables.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Every variable of the formula, including ones only seen in dropped
    /// tautologies.
    pub fn present_variables(&self) -> impl Iterator<Item = VarId> + use<C> {
        self.vars.ids()
    }

    /// Looks up a variable by identifier.
    #[must_use]
    pub fn find_variable(&self, name: &str) -> Option<VarId> {
        self.vars.find(name)
    }

    /// The literal `name` with the given polarity, if `name` is known.
    #[must_use]
    pub fn literal(&self, name: &str, polarity: bool) -> Option<Literal> {
        self.find_variable(name).map(|v| Literal::new(v, polarity))
    }

    /// Indices of the clauses containing `var`.
    #[must_use]
    pub fn occurrences(&self, var: VarId) -> &[usize] {
        &self.occurrences[var as usize]
    }

    /// Current setting of `var`.
    #[must_use]
    pub fn value(&self, var: VarId) -> Option<bool> {
        self.vars.value(var)
    }

    /// Watch configuration shared by all clauses.
    #[must_use]
    pub const fn policy(&self) -> WatchPolicy {
        self.policy
    }

    /// Counters of the runs on this set.
    #[must_use]
    pub const fn stats(&self) -> &SolutionStats {
        &self.stats
    }

    /// Current assignment as a set of literals; unset variables are absent.
    #[must_use]
    pub fn model(&self) -> LiteralSet {
        self.vars
            .iter()
            .filter_map(|(id, v)| v.state.value().map(|b| Literal::new(id, b)))
            .collect()
    }

    /// Sets `var` and notifies every clause that contains it.
    pub fn assign(&mut self, var: VarId, value: bool) {
        self.vars.set(var, value);
        for &idx in &self.occurrences[var as usize] {
            self.clauses[idx].on_assign(var, &self.vars, self.policy);
        }
    }

    /// Clears `var`, notifies every clause that contains it and returns it to
    /// the decision heap.
    pub fn unassign(&mut self, var: VarId) {
        self.vars.clear(var);
        for &idx in &self.occurrences[var as usize] {
            self.clauses[idx].on_unassign(var, &self.vars, self.policy);
        }
        self.heap.push(var, &self.vars);
    }

    /// Unassigns each of `vars`, see [`ClauseSet::unassign`].
    pub fn reset_vars<I: IntoIterator<Item = VarId>>(&mut self, vars: I) {
        for var in vars {
            self.unassign(var);
        }
    }

    /// Unsets every variable and re-derives all watches.
    pub fn reset_all(&mut self) {
        for var in self.vars.ids() {
            self.vars.clear(var);
            self.heap.push(var, &self.vars);
        }
        self.heap.reorder(&self.vars);
        self.reset_watches();
    }

    /// Re-derives every clause's watches from the current settings.
    pub fn reset_watches(&mut self) {
        for clause in &mut self.clauses {
            clause.reset(&self.vars, self.policy);
        }
    }

    /// Switches what the watches track and re-derives them.
    pub fn set_watch_mode(&mut self, mode: WatchMode) {
        self.policy = self.policy.with_mode(mode);
        self.reset_watches();
    }

    /// Restores settings captured earlier without notifying clauses or
    /// touching saved phases. Callers must follow up with
    /// [`ClauseSet::reset_watches`].
    pub(crate) fn restore_raw(&mut self, var: VarId, value: Option<bool>) {
        self.vars.restore(var, value);
    }

    /// Appends a learned clause, indexes it and initialises its watches.
    ///
    /// Returns the clause index, or `None` for a tautology, which is dropped.
    pub fn add_resolvent<I: IntoIterator<Item = Literal>>(&mut self, literals: I) -> Option<usize> {
        let lits = normalise(literals, &self.vars)?;
        let idx = self.push_clause(lits);
        self.stats.learnt_clauses += 1;
        Some(idx)
    }

    /// Appends an extra clause over known variables, e.g. a forced unit.
    pub fn add_clause<I: IntoIterator<Item = Literal>>(&mut self, literals: I) -> Option<usize> {
        let lits = normalise(literals, &self.vars)?;
        Some(self.push_clause(lits))
    }

    fn push_clause(&mut self, lits: Literals) -> usize {
        assert!(!lits.is_empty(), "cannot add an empty clause");
        let idx = self.clauses.len();
        self.clauses.push(C::from_literals(lits));
        self.register(idx);
        self.clauses[idx].reset(&self.vars, self.policy);
        idx
    }

    /// Whether every clause reports itself satisfied (watched view).
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        self.clauses.iter().all(|c| c.is_satisfied(&self.vars))
    }

    /// Whether the current settings satisfy every clause, checked by a full
    /// scan that ignores watch caches.
    #[must_use]
    pub fn is_satisfied_by_settings(&self) -> bool {
        self.clauses
            .iter()
            .all(|c| c.evaluate(&self.vars) == ClauseState::Satisfied)
    }

    /// Index of some clause with every literal false.
    #[must_use]
    pub fn empty_clause(&self) -> Option<usize> {
        self.clauses.iter().position(|c| c.is_empty(&self.vars))
    }

    /// Index of some clause that a full scan finds unit or empty, ignoring
    /// watch caches. `None` means propagation has reached a fixpoint.
    #[must_use]
    pub fn pending_clause(&self) -> Option<usize> {
        self.clauses.iter().position(|c| {
            matches!(
                c.evaluate(&self.vars),
                ClauseState::Unit(_) | ClauseState::Empty
            )
        })
    }

    /// Pops the heap until an unassigned variable surfaces and assigns it
    /// according to `phase`. Returns `None` once every variable is set.
    pub fn make_vsids_assignment(&mut self, phase: Phase) -> Option<Literal> {
        while let Some(var) = self.heap.pop(&self.vars) {
            if self.vars.is_assigned(var) {
                continue;
            }
            let value = phase.decide(self.vars[var].previous_setting);
            self.assign(var, value);
            return Some(Literal::new(var, value));
        }
        None
    }

    /// Raises the activity of `var` by one.
    pub fn bump_activity(&mut self, var: VarId) {
        self.vars[var].activity += 1.0;
    }

    /// Counts a conflict. Halves every activity each [`DECAY_INTERVAL`]
    /// conflicts and reorders the heap each [`REORDER_INTERVAL`].
    pub fn record_conflict(&mut self) {
        self.stats.conflicts += 1;
        self.conflict_counter = (self.conflict_counter + 1) % (DECAY_INTERVAL * REORDER_INTERVAL);

        if self.conflict_counter % DECAY_INTERVAL == 0 {
            for var in self.vars.ids() {
                self.vars[var].activity /= 2.0;
            }
        }
        if self.conflict_counter % REORDER_INTERVAL == 0 {
            self.heap.reorder(&self.vars);
        }
    }

    /// Renders literals by name, space separated, in variable order.
    #[must_use]
    pub fn display_literals(&self, literals: &LiteralSet) -> String {
        literals.iter().map(|&l| self.vars.display(l)).join(" ")
    }
}

impl<C: ClauseKind> Display for ClauseSet<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = self
            .clauses
            .iter()
            .map(|c| c.literals().iter().map(|&l| self.vars.display(l)).join("|"))
            .join(" & ");
        write!(f, "{text}")
    }
}
