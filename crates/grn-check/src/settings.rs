//! Per-check configuration.

use grn_core::{ParamNo, Paramset, StateId};
use grn_graph::Product;

/// Setup of one model-checking pass over the product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerSettings {
    /// Initial states; empty means the product's own initial set.
    pub initial_states: Vec<StateId>,
    /// Final states; empty means the product's own final set.
    pub final_states: Vec<StateId>,
    /// Stop as soon as every pursued parametrization is accepted. Without
    /// it the pass runs to the reachability fixpoint.
    pub minimal: bool,
    /// Spread the starting mask out of the initial states without colouring
    /// them; acceptance then needs at least one transition.
    pub seed_only: bool,
    /// Accept parametrizations at cost 0 in states that are both initial
    /// and final.
    pub mark_initials: bool,
    /// The single parametrization this pass serves, used by the witness
    /// searcher and the robustness computation.
    pub param_no: ParamNo,
    /// Bound on the path length; costs above it are not explored.
    pub bfs_bound: Option<usize>,
    /// Parametrizations the pass starts with.
    pub starting: Paramset,
    /// Half-open range of parametrization numbers backing the batch.
    pub range: (ParamNo, ParamNo),
}

impl Default for CheckerSettings {
    fn default() -> Self {
        Self {
            initial_states: Vec::new(),
            final_states: Vec::new(),
            minimal: false,
            seed_only: false,
            mark_initials: false,
            param_no: 0,
            bfs_bound: None,
            starting: Paramset::EMPTY,
            range: (0, 0),
        }
    }
}

impl CheckerSettings {
    /// Initial states of the pass.
    pub fn initials<'a>(&'a self, product: &'a Product) -> &'a [StateId] {
        if self.initial_states.is_empty() {
            product.initial_states()
        } else {
            &self.initial_states
        }
    }

    /// Final states of the pass.
    pub fn finals<'a>(&'a self, product: &'a Product) -> &'a [StateId] {
        if self.final_states.is_empty() {
            product.final_states()
        } else {
            &self.final_states
        }
    }

    /// True when the state is initial for this pass.
    pub fn is_initial(&self, id: StateId, product: &Product) -> bool {
        if self.initial_states.is_empty() {
            product.is_initial(id)
        } else {
            self.initial_states.contains(&id)
        }
    }

    /// True when the state is final for this pass.
    pub fn is_final(&self, id: StateId, product: &Product) -> bool {
        if self.final_states.is_empty() {
            product.is_final(id)
        } else {
            self.final_states.contains(&id)
        }
    }
}
