//! Robustness of an accepted parametrization: the probability of reaching
//! a final state along the witnessed paths under uniform branching.

use grn_core::StateId;
use grn_graph::Product;

use crate::coloring;
use crate::results::SynthesisResults;
use crate::settings::CheckerSettings;
use crate::witness::StateTransition;

/// Computes reaching probabilities over the witness transition set.
pub struct RobustnessCompute<'a> {
    product: &'a Product,
}

impl<'a> RobustnessCompute<'a> {
    /// Creates a computer over the product.
    pub fn new(product: &'a Product) -> Self {
        Self { product }
    }

    /// Probability that a run of the parametrization follows some witness
    /// path into a final state, with branching uniform over the open exits
    /// of every visited state.
    pub fn compute(
        &self,
        results: &SynthesisResults,
        transitions: &[StateTransition],
        settings: &CheckerSettings,
    ) -> f64 {
        let prob = self.propagate(results, transitions, settings);
        settings
            .finals(self.product)
            .iter()
            .map(|&id| prob[id])
            .sum()
    }

    /// Reaching probability of each final state, in final-set order.
    pub fn final_markings(
        &self,
        results: &SynthesisResults,
        transitions: &[StateTransition],
        settings: &CheckerSettings,
    ) -> Vec<(StateId, f64)> {
        let prob = self.propagate(results, transitions, settings);
        settings
            .finals(self.product)
            .iter()
            .map(|&id| (id, prob[id]))
            .collect()
    }

    /// Runs `lower_bound` propagation rounds of the probability vector over
    /// the witness transitions.
    fn propagate(
        &self,
        results: &SynthesisResults,
        transitions: &[StateTransition],
        settings: &CheckerSettings,
    ) -> Vec<f64> {
        let state_count = self.product.state_count();

        // terminal states count as a single exit so mass is not lost on them
        let mut exits = vec![0usize; state_count];
        for &(source, _) in transitions {
            if exits[source] == 0 {
                exits[source] =
                    coloring::open_exits(self.product, source, settings.param_no).max(1);
            }
        }

        let initials = settings.initials(self.product);
        let mut prob = vec![0.0f64; state_count];
        for &init in initials {
            prob[init] = 1.0 / initials.len() as f64;
        }

        for _ in 0..results.lower_bound.unwrap_or(0) {
            let mut next = vec![0.0f64; state_count];
            for &(source, target) in transitions {
                next[target] += prob[source] / exits[source] as f64;
            }
            prob = next;
        }
        prob
    }
}
