#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The VSIDS decision heap.
//!
//! A binary max-heap of variable indices kept as a leftmost-filling array.
//! Priority is read live from the [`VariableSet`]: unassigned variables rank
//! before assigned ones, then higher activity ranks first. Since priorities
//! change under the heap's feet (assignments, activity bumps), the order is
//! only approximately maintained; [`VsidsHeap::reorder`] repairs it
//! periodically and callers skip assigned variables on [`VsidsHeap::pop`].

use crate::sat::literal::VarId;
use crate::sat::variable::VariableSet;
use bit_vec::BitVec;
use ordered_float::OrderedFloat;

/// Max-heap of variables for VSIDS decisions. Unassigned variables come
/// before assigned ones, then higher activity first.
#[derive(Debug, Clone, Default)]
pub struct VsidsHeap {
    heap: Vec<VarId>,
    in_heap: BitVec,
}

impl VsidsHeap {
    /// An empty heap with room for `num_vars` variables.
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            heap: Vec::with_capacity(num_vars),
            in_heap: BitVec::from_elem(num_vars, false),
        }
    }

    /// Number of variables in the heap.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the heap is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Whether `var` is in the heap.
    #[must_use]
    pub fn contains(&self, var: VarId) -> bool {
        self.in_heap.get(var as usize).unwrap_or(false)
    }

    /// `true` if `a` belongs closer to the root than `b`.
    fn precedes(a: VarId, b: VarId, vars: &VariableSet) -> bool {
        let (a_set, b_set) = (vars.is_assigned(a), vars.is_assigned(b));
        if a_set != b_set {
            return !a_set;
        }
        OrderedFloat(vars[a].activity) > OrderedFloat(vars[b].activity)
    }

    /// Inserts `var` at the next free leaf and sifts it up. Variables already
    /// in the heap are left where they are.
    pub fn push(&mut self, var: VarId, vars: &VariableSet) {
        let idx = var as usize;
        if idx >= self.in_heap.len() {
            self.in_heap.grow(idx + 1 - self.in_heap.len(), false);
        }
        if self.in_heap[idx] {
            return;
        }
        self.in_heap.set(idx, true);
        self.heap.push(var);
        self.sift_up(self.heap.len() - 1, vars);
    }

    /// Removes the root, moves the deepest element into its place and sifts
    /// it down.
    pub fn pop(&mut self, vars: &VariableSet) -> Option<VarId> {
        if self.heap.is_empty() {
            return None;
        }
        let top = self.heap.swap_remove(0);
        self.in_heap.set(top as usize, false);
        if !self.heap.is_empty() {
            self.sift_down(0, vars);
        }
        Some(top)
    }

    /// The root, without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<VarId> {
        self.heap.first().copied()
    }

    /// Sifts every leaf upward. Cheaper than a rebuild and good enough after a
    /// uniform activity decay or a batch of bumps.
    pub fn reorder(&mut self, vars: &VariableSet) {
        let n = self.heap.len();
        for leaf in n / 2..n {
            self.sift_up(leaf, vars);
        }
    }

    fn sift_up(&mut self, mut idx: usize, vars: &VariableSet) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if !Self::precedes(self.heap[idx], self.heap[parent], vars) {
                break;
            }
            self.heap.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize, vars: &VariableSet) {
        let n = self.heap.len();
        loop {
            let left = 2 * idx + 1;
            let right = left + 1;
            let mut best = idx;

            if left < n && Self::precedes(self.heap[left], self.heap[best], vars) {
                best = left;
            }
            if right < n && Self::precedes(self.heap[right], self.heap[best], vars) {
                best = right;
            }
            if best == idx {
                break;
            }
            self.heap.swap(idx, best);
            idx = best;
        }
    }
}
