//! Conclusion of one model-checking pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use grn_core::{Paramset, StateId};

/// What a single pass of the checker established.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisResults {
    /// Parametrizations that reached a final state within the bound.
    pub accepted: Paramset,
    /// Per-bit cost: the BFS depth of the first acceptance.
    pub cost: Vec<Option<usize>>,
    /// The depth at which each final state first received a new
    /// parametrization.
    pub found_depth: BTreeMap<StateId, usize>,
    /// Smallest finite cost of the pass.
    pub lower_bound: Option<usize>,
}

impl SynthesisResults {
    /// True when at least one parametrization was accepted.
    pub fn is_accepting(&self) -> bool {
        self.accepted.any()
    }

    /// Derives the lower bound from the per-bit costs.
    pub fn derive(&mut self) {
        self.lower_bound = self.cost.iter().flatten().copied().min();
    }
}
