//! Per-batch coloring of the product.

use serde::{Deserialize, Serialize};

use grn_core::{Paramset, StateId};

/// Holds, for every product state, the parametrizations known to reach it
/// within the running batch, plus the per-bit cost and the acceptable mask
/// filled in when a check concludes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorStorage {
    colors: Vec<Paramset>,
    cost: Vec<Option<usize>>,
    acceptable: Paramset,
}

impl ColorStorage {
    /// Allocates storage for a product of `state_count` states.
    pub fn new(state_count: usize) -> Self {
        Self {
            colors: vec![Paramset::EMPTY; state_count],
            cost: vec![None; Paramset::WIDTH],
            acceptable: Paramset::EMPTY,
        }
    }

    /// Clears all colors and results; the allocation is kept.
    pub fn reset(&mut self) {
        self.colors.fill(Paramset::EMPTY);
        self.cost.fill(None);
        self.acceptable = Paramset::EMPTY;
    }

    /// Adds parametrizations to a state; true when something was new.
    pub fn update(&mut self, id: StateId, params: Paramset) -> bool {
        let merged = self.colors[id] | params;
        let changed = merged != self.colors[id];
        self.colors[id] = merged;
        changed
    }

    /// Removes parametrizations from a state.
    pub fn remove(&mut self, id: StateId, params: Paramset) {
        self.colors[id] = self.colors[id].minus(params);
    }

    /// Coloring of one state.
    pub fn color(&self, id: StateId) -> Paramset {
        self.colors[id]
    }

    /// Colorings of all states.
    pub fn colors(&self) -> &[Paramset] {
        &self.colors
    }

    /// Overwrites all colorings from a same-sized snapshot.
    pub fn set_colors(&mut self, colors: &[Paramset]) {
        self.colors.copy_from_slice(colors);
    }

    /// Merges another storage of the same shape, state-wise union.
    pub fn add_from(&mut self, other: &ColorStorage) {
        for (mine, theirs) in self.colors.iter_mut().zip(&other.colors) {
            *mine |= *theirs;
        }
    }

    /// Stores the conclusion of a check.
    pub fn set_results(&mut self, cost: Vec<Option<usize>>, acceptable: Paramset) {
        self.cost = cost;
        self.acceptable = acceptable;
    }

    /// Cost of one batch-local parametrization, `None` when it never
    /// reached a final state.
    pub fn cost_of(&self, bit: usize) -> Option<usize> {
        self.cost[bit]
    }

    /// Costs of all batch-local parametrizations.
    pub fn costs(&self) -> &[Option<usize>] {
        &self.cost
    }

    /// Mask of the parametrizations accepted by the last check.
    pub fn acceptable(&self) -> Paramset {
        self.acceptable
    }

    /// Largest finite cost of the last check, 0 when none is finite.
    pub fn max_depth(&self) -> usize {
        self.cost.iter().flatten().copied().max().unwrap_or(0)
    }
}
