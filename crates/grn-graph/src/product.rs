//! Synchronous product of the unparametrised structure with the property
//! automaton.
//!
//! States are indexed as `uts_id * |automaton| + aut_id`. Moving product
//! transitions pair one network step with one automaton edge whose guard
//! holds at the source levels; stationary successors record the automaton
//! edges a parametrization may take while the network loops.

use log::info;
use serde::{Deserialize, Serialize};

use grn_core::{ErrorInfo, Levels, StateId, SynthError};
use grn_model::{Property, PropertyKind};

use crate::uts::{TransConst, Uts};

/// Moving transition of the product; the openness metadata lives in the
/// underlying network transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProdTransition {
    /// Target product state.
    pub target: StateId,
    /// Index of the acting transition within the source network state.
    pub uts_trans: usize,
}

/// One state of the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProdState {
    /// Network half of the state.
    pub uts_id: StateId,
    /// Automaton half of the state.
    pub aut_id: StateId,
    /// True when the state belongs to the initial set.
    pub initial: bool,
    /// True when runs accept in this state.
    pub is_final: bool,
    /// Moving transitions.
    pub transitions: Vec<ProdTransition>,
    /// Stationary successors, reachable while the network loops.
    pub stationary: Vec<StateId>,
}

/// The product structure; owns both its factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    uts: Uts,
    property: Property,
    states: Vec<ProdState>,
    initial_states: Vec<StateId>,
    final_states: Vec<StateId>,
}

impl Product {
    /// Builds the product of `uts` and `property`.
    pub fn build(uts: Uts, property: Property) -> Result<Self, SynthError> {
        let aut_count = property.state_count();
        let state_count = uts
            .state_count()
            .checked_mul(aut_count)
            .filter(|&count| count < usize::MAX / 2)
            .ok_or_else(|| {
                SynthError::StateExplosion(
                    ErrorInfo::new("product-overflow", "product exceeds the addressable range")
                        .with_context("uts_states", uts.state_count().to_string())
                        .with_context("automaton_states", aut_count.to_string()),
                )
            })?;

        let mut states = Vec::with_capacity(state_count);
        let mut initial_states = Vec::new();
        let mut final_states = Vec::new();
        let mut transition_count = 0usize;
        for uts_id in 0..uts.state_count() {
            let levels = uts.levels(uts_id);
            for aut_id in 0..aut_count {
                let id = uts_id * aut_count + aut_id;
                let mut transitions = Vec::new();
                let mut stationary = Vec::new();
                for edge in property.edges(aut_id) {
                    if !edge.guard.eval(levels) {
                        continue;
                    }
                    // A stable edge cannot ride a moving step and a
                    // transient edge cannot ride the implicit loop.
                    if !edge.stable {
                        for (uts_trans, transition) in
                            uts.transitions(uts_id).iter().enumerate()
                        {
                            transitions.push(ProdTransition {
                                target: transition.target * aut_count + edge.target,
                                uts_trans,
                            });
                        }
                    }
                    if !edge.transient {
                        stationary.push(uts_id * aut_count + edge.target);
                    }
                }
                transition_count += transitions.len();
                let initial = aut_id == 0 && uts.is_allowed(uts_id);
                let is_final = property.is_final(aut_id);
                if initial {
                    initial_states.push(id);
                }
                if is_final {
                    final_states.push(id);
                }
                states.push(ProdState {
                    uts_id,
                    aut_id,
                    initial,
                    is_final,
                    transitions,
                    stationary,
                });
            }
        }

        info!(
            "product has {} states with {} moving transitions",
            states.len(),
            transition_count
        );
        Ok(Self {
            uts,
            property,
            states,
            initial_states,
            final_states,
        })
    }

    /// The underlying unparametrised structure.
    pub fn uts(&self) -> &Uts {
        &self.uts
    }

    /// The property automaton.
    pub fn property(&self) -> &Property {
        &self.property
    }

    /// Flavour of the property the product was built for.
    pub fn kind(&self) -> PropertyKind {
        self.property.kind()
    }

    /// Number of product states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// One product state.
    pub fn state(&self, id: StateId) -> &ProdState {
        &self.states[id]
    }

    /// Id of the product state made of a network and an automaton state.
    pub fn product_id(&self, uts_id: StateId, aut_id: StateId) -> StateId {
        uts_id * self.property.state_count() + aut_id
    }

    /// Network half of a product state.
    pub fn uts_id(&self, id: StateId) -> StateId {
        self.states[id].uts_id
    }

    /// Automaton half of a product state.
    pub fn aut_id(&self, id: StateId) -> StateId {
        self.states[id].aut_id
    }

    /// Levels of the network half of a product state.
    pub fn levels(&self, id: StateId) -> &Levels {
        self.uts.levels(self.states[id].uts_id)
    }

    /// Moving transitions of a product state.
    pub fn transitions(&self, id: StateId) -> &[ProdTransition] {
        &self.states[id].transitions
    }

    /// Stationary successors of a product state.
    pub fn stationary(&self, id: StateId) -> &[StateId] {
        &self.states[id].stationary
    }

    /// Openness metadata of one moving transition.
    pub fn trans_const(&self, id: StateId, transition: &ProdTransition) -> &TransConst {
        let state = &self.states[id];
        &self.uts.transitions(state.uts_id)[transition.uts_trans].cons
    }

    /// True when the state accepts.
    pub fn is_final(&self, id: StateId) -> bool {
        self.states[id].is_final
    }

    /// True when the state belongs to the initial set.
    pub fn is_initial(&self, id: StateId) -> bool {
        self.states[id].initial
    }

    /// The initial set, ascending.
    pub fn initial_states(&self) -> &[StateId] {
        &self.initial_states
    }

    /// The final set, ascending.
    pub fn final_states(&self) -> &[StateId] {
        &self.final_states
    }

    /// Renders a state as `"(l1,l2,…;aut)"`.
    pub fn state_string(&self, id: StateId) -> String {
        let levels = self
            .levels(id)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!("({levels};{})", self.states[id].aut_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grn_model::{Formula, Kinetics, Network, Property, RegLabel};

    fn single_specie_product() -> Product {
        let mut network = Network::new();
        let a = network.add_specie("cA", 1, None).unwrap();
        network.add_regulation(a, a, 1, RegLabel::Free).unwrap();
        let kinetics = Kinetics::build(&network, &[Vec::new()]).unwrap();
        let uts = Uts::build(&network, &kinetics, None).unwrap();
        let guard = Formula::parse("cA=1", &network).unwrap();
        let property = Property::time_series(vec![guard], 0, None, None).unwrap();
        Product::build(uts, property).unwrap()
    }

    #[test]
    fn product_indexing_interleaves_automaton_states() {
        let product = single_specie_product();
        assert_eq!(product.state_count(), 4);
        assert_eq!(product.product_id(1, 0), 2);
        assert_eq!(product.uts_id(3), 1);
        assert_eq!(product.aut_id(3), 1);
        assert_eq!(product.state_string(3), "(1;1)");
    }

    #[test]
    fn initials_pair_every_network_state_with_state_zero() {
        let product = single_specie_product();
        assert_eq!(product.initial_states(), &[0, 2]);
        assert_eq!(product.final_states(), &[1, 3]);
    }

    #[test]
    fn guards_filter_product_transitions() {
        let product = single_specie_product();
        // at level 0 only the negated self-loop guard holds
        let state = product.state(0);
        assert!(state
            .transitions
            .iter()
            .all(|t| product.aut_id(t.target) == 0));
        // at level 1 the step guard holds, the self-loop one does not
        let state = product.state(2);
        assert!(state
            .transitions
            .iter()
            .all(|t| product.aut_id(t.target) == 1));
        assert_eq!(state.stationary, vec![3]);
    }
}
