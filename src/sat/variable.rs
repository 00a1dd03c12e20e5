#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Variable records and the registry that owns them.
//!
//! Every formula owns exactly one [`VariableSet`]. It maps textual identifiers
//! to stable [`VarId`]s and stores the mutable per-variable state: current
//! setting, VSIDS activity and the saved phase. Clauses only ever hold indices
//! into this arena.

use crate::sat::literal::{Literal, VarId};
use core::ops::{Index, IndexMut};
use rustc_hash::FxHashMap;

/// Ternary setting of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    /// Not set by propagation or decision.
    #[default]
    Unassigned,
    /// Set to the given value.
    Assigned(bool),
}

impl VarState {
    /// Whether a value is set.
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    /// Whether no value is set.
    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        !self.is_assigned()
    }

    /// The value, `None` when unassigned.
    #[must_use]
    pub const fn value(self) -> Option<bool> {
        match self {
            Self::Assigned(b) => Some(b),
            Self::Unassigned => None,
        }
    }
}

/// A single propositional variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Identifier as given in the input formula.
    pub name: String,
    /// Current setting.
    pub state: VarState,
    /// Conflict-involvement score used by the decision heap.
    pub activity: f64,
    /// Last concrete value this variable held; decisions pick its negation.
    pub previous_setting: bool,
}

impl Variable {
    fn new(name: String) -> Self {
        Self {
            name,
            state: VarState::Unassigned,
            activity: 0.0,
            previous_setting: false,
        }
    }
}

/// Registry and arena of the variables of one formula.
///
/// Looking up an identifier twice yields the same [`VarId`], so every clause
/// mentioning `x` refers to the same record.
#[derive(Debug, Clone, Default)]
pub struct VariableSet {
    vars: Vec<Variable>,
    by_name: FxHashMap<String, VarId>,
}

impl VariableSet {
    /// Returns the index for `name`, registering a fresh unassigned variable
    /// the first time it is seen.
    ///
    /// # Panics
    ///
    /// If more than `u32::MAX` variables are registered.
    pub fn store_or_get(&mut self, name: &str) -> VarId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = VarId::try_from(self.vars.len()).expect("variable arena overflowed u32");
        self.vars.push(Variable::new(name.to_owned()));
        self.by_name.insert(name.to_owned(), id);
        id
    }

    /// The variable named `name`, if registered.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<VarId> {
        self.by_name.get(name).copied()
    }

    /// Number of registered variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variable is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// All variable indices, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = VarId> + use<> {
        #[allow(clippy::cast_possible_truncation)]
        let n = self.vars.len() as VarId;
        0..n
    }

    /// Every variable with its index.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.ids().zip(self.vars.iter())
    }

    /// The identifier `var` was registered under.
    #[must_use]
    pub fn name(&self, var: VarId) -> &str {
        &self[var].name
    }

    /// Current setting of `var`.
    #[must_use]
    pub fn value(&self, var: VarId) -> Option<bool> {
        self[var].state.value()
    }

    /// Whether `var` has a value.
    #[must_use]
    pub fn is_assigned(&self, var: VarId) -> bool {
        self[var].state.is_assigned()
    }

    /// Sets a value without touching any clause watches.
    ///
    /// Only [`ClauseSet`](crate::sat::clause_set::ClauseSet) should call this
    /// on a live formula, since it is responsible for notifying the clauses.
    pub fn set(&mut self, var: VarId, value: bool) {
        let v = &mut self[var];
        v.state = VarState::Assigned(value);
        v.previous_setting = value;
    }

    /// Unsets `var`. Its saved phase stays.
    pub fn clear(&mut self, var: VarId) {
        self[var].state = VarState::Unassigned;
    }

    /// Puts back a setting captured earlier. Unlike [`VariableSet::set`] this
    /// leaves the saved phase alone.
    pub fn restore(&mut self, var: VarId, value: Option<bool>) {
        self[var].state = value.map_or(VarState::Unassigned, VarState::Assigned);
    }

    /// Renders a literal with its identifier, `!x` for negative polarity.
    #[must_use]
    pub fn display(&self, lit: Literal) -> String {
        if lit.polarity() {
            self.name(lit.variable()).to_owned()
        } else {
            format!("!{}", self.name(lit.variable()))
        }
    }
}

impl Index<VarId> for VariableSet {
    type Output = Variable;

    fn index(&self, index: VarId) -> &Self::Output {
        &self.vars[index as usize]
    }
}

impl IndexMut<VarId> for VariableSet {
    fn index_mut(&mut self, index: VarId) -> &mut Self::Output {
        &mut self.vars[index as usize]
    }
}
