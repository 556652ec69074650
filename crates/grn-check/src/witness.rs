//! Reconstruction of minimal-cost witness paths for one parametrization.
//!
//! A depth-bounded DFS from the initial states walks only the transitions
//! open for the parametrization, stores every edge that lies on a path of
//! minimal cost into a final state, and prunes subtrees known to be barren
//! or already recorded.

use grn_core::StateId;
use grn_graph::Product;

use crate::coloring;
use crate::results::SynthesisResults;
use crate::settings::CheckerSettings;
use crate::storage::ColorStorage;

/// A witness edge, `(source, target)` product state ids.
pub type StateTransition = (StateId, StateId);

#[derive(Clone, Copy)]
struct Marking {
    /// Smallest depth from which the state is known not to reach a final
    /// state within the remaining depth.
    busted: Option<usize>,
    /// Smallest depth at which the state was recorded on a witness path.
    succeeded: Option<usize>,
}

/// Searches witness transitions over a finished check.
pub struct WitnessSearcher<'a> {
    product: &'a Product,
}

struct Search<'a> {
    product: &'a Product,
    settings: &'a CheckerSettings,
    max_depth: usize,
    path: Vec<StateId>,
    markings: Vec<Marking>,
    transitions: Vec<StateTransition>,
}

impl Search<'_> {
    /// Records the path edges from the last stored branch down to `depth`.
    fn store_transitions(&mut self, depth: usize) {
        for step in 0..depth {
            let edge = (self.path[step], self.path[step + 1]);
            if !self.transitions.contains(&edge) {
                self.transitions.push(edge);
            }
            let marking = &mut self.markings[self.path[step]];
            marking.succeeded = Some(marking.succeeded.map_or(step, |s| s.min(step)));
        }
        let last = &mut self.markings[self.path[depth]];
        last.succeeded = Some(last.succeeded.map_or(depth, |s| s.min(depth)));
    }

    fn dfs(&mut self, id: StateId, depth: usize) {
        if self.markings[id].busted.is_some_and(|b| b <= depth) {
            return;
        }
        self.path[depth] = id;

        let accepts = self.settings.is_final(id, self.product)
            && (depth >= 1 || self.settings.mark_initials);
        if accepts {
            self.store_transitions(depth);
            return;
        }
        if self.markings[id].succeeded.is_some_and(|s| s > depth) {
            // joins a recorded witness closer to the start
            self.store_transitions(depth);
            return;
        }
        if depth < self.max_depth {
            for successor in coloring::successors(self.product, id, self.settings.param_no) {
                self.dfs(successor, depth + 1);
            }
        }
        if self.markings[id].succeeded.is_none() {
            let marking = &mut self.markings[id];
            marking.busted = Some(marking.busted.map_or(depth, |b| b.min(depth)));
        }
    }
}

impl<'a> WitnessSearcher<'a> {
    /// Creates a searcher over the product.
    pub fn new(product: &'a Product) -> Self {
        Self { product }
    }

    /// Finds the transitions of all minimal-cost witnesses for the
    /// parametrization the settings were built for.
    pub fn find_witnesses(
        &self,
        results: &SynthesisResults,
        settings: &CheckerSettings,
        storage: &ColorStorage,
    ) -> Vec<StateTransition> {
        let Some(max_depth) = results.lower_bound else {
            return Vec::new();
        };
        let mut search = Search {
            product: self.product,
            settings,
            max_depth,
            path: vec![0; max_depth + 1],
            markings: vec![
                Marking {
                    busted: None,
                    succeeded: None,
                };
                self.product.state_count()
            ],
            transitions: Vec::new(),
        };
        for &init in settings.initials(self.product) {
            if settings.seed_only || storage.color(init).any() {
                search.dfs(init, 0);
            }
        }
        search.transitions
    }

    /// Renders witness transitions as `{a>b,c>d}`, either as state ids or,
    /// with `long`, as level tuples.
    pub fn render(&self, transitions: &[StateTransition], long: bool) -> String {
        if transitions.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = transitions
            .iter()
            .map(|(source, target)| {
                if long {
                    format!(
                        "{}>{}",
                        self.product.state_string(*source),
                        self.product.state_string(*target)
                    )
                } else {
                    format!("{source}>{target}")
                }
            })
            .collect();
        format!("{{{}}}", parts.join(","))
    }
}
