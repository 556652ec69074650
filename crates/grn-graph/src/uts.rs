//! Unparametrised transition system over the cartesian space of specie
//! levels.
//!
//! Every state may step one level up or down in a single specie; the
//! transition keeps just enough of the acting kinetic parameter to decide,
//! for any parametrization number, whether it is open. Self-loops are not
//! materialised: a parametrization loops in a state when none of its
//! outgoing transitions is open.

use log::info;
use serde::{Deserialize, Serialize};

use grn_core::{ActLevel, ErrorInfo, Levels, ParamNo, SpecieId, StateId, SynthError};
use grn_model::{Formula, Kinetics, Network};

/// Constant data deciding openness of a transition per parametrization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransConst {
    /// Stride of target-level changes along consecutive parametrizations.
    pub step_size: ParamNo,
    /// True when the step raises the level, false when it lowers it.
    pub req_dir: bool,
    /// Level of the changing specie in the source state.
    pub comp_value: ActLevel,
    /// Target-level list of the acting parameter entry.
    pub targets: Levels,
}

/// One transition of the unparametrised structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtsTransition {
    /// Target state.
    pub target: StateId,
    /// Openness metadata.
    pub cons: TransConst,
}

/// One state of the unparametrised structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtsState {
    /// Activation levels of the species.
    pub levels: Levels,
    /// Outgoing transitions, downward neighbour before upward per specie.
    pub transitions: Vec<UtsTransition>,
}

/// The complete unparametrised transition system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uts {
    states: Vec<UtsState>,
    maxes: Levels,
    index_jumps: Vec<usize>,
    allowed: Vec<bool>,
}

impl Uts {
    /// Builds the structure from the network and its parameter space.
    ///
    /// The optional `experiment` predicate marks the allowed states; without
    /// it the whole space is allowed.
    pub fn build(
        network: &Network,
        kinetics: &Kinetics,
        experiment: Option<&Formula>,
    ) -> Result<Self, SynthError> {
        let maxes = network.maxes();
        let mut state_count: usize = 1;
        let mut index_jumps = Vec::with_capacity(maxes.len());
        for &max in &maxes {
            index_jumps.push(state_count);
            state_count = state_count.checked_mul(max as usize + 1).ok_or_else(|| {
                SynthError::StateExplosion(ErrorInfo::new(
                    "state-space-overflow",
                    "level space exceeds the addressable range",
                ))
            })?;
        }

        let mut states = Vec::with_capacity(state_count);
        let mut allowed = Vec::with_capacity(state_count);
        let mut levels: Levels = vec![0; maxes.len()];
        loop {
            let id = states.len();
            let mut transitions = Vec::new();
            for specie in 0..maxes.len() {
                let entry = acting_entry(network, kinetics, specie, &levels)?;
                let cons_of = |req_dir: bool| TransConst {
                    step_size: entry.step_size,
                    req_dir,
                    comp_value: levels[specie],
                    targets: entry.targets.clone(),
                };
                if levels[specie] > 0 {
                    let cons = cons_of(false);
                    if is_feasible(&cons) {
                        transitions.push(UtsTransition {
                            target: id - index_jumps[specie],
                            cons,
                        });
                    }
                }
                if levels[specie] < maxes[specie] {
                    let cons = cons_of(true);
                    if is_feasible(&cons) {
                        transitions.push(UtsTransition {
                            target: id + index_jumps[specie],
                            cons,
                        });
                    }
                }
            }
            allowed.push(experiment.map_or(true, |formula| formula.eval(&levels)));
            states.push(UtsState {
                levels: levels.clone(),
                transitions,
            });
            if !iterate(&maxes, &mut levels) {
                break;
            }
        }

        info!(
            "unparametrised structure has {} states over {} species",
            states.len(),
            maxes.len()
        );
        Ok(Self {
            states,
            maxes,
            index_jumps,
            allowed,
        })
    }

    /// Number of states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// One state.
    pub fn state(&self, id: StateId) -> &UtsState {
        &self.states[id]
    }

    /// Levels of a state.
    pub fn levels(&self, id: StateId) -> &Levels {
        &self.states[id].levels
    }

    /// Outgoing transitions of a state.
    pub fn transitions(&self, id: StateId) -> &[UtsTransition] {
        &self.states[id].transitions
    }

    /// True when the state passes the experiment predicate.
    pub fn is_allowed(&self, id: StateId) -> bool {
        self.allowed[id]
    }

    /// Maximal levels per specie.
    pub fn maxes(&self) -> &Levels {
        &self.maxes
    }

    /// Mixed-radix id of a level vector.
    pub fn state_id(&self, levels: &[ActLevel]) -> StateId {
        levels
            .iter()
            .zip(&self.index_jumps)
            .map(|(&level, &jump)| level as usize * jump)
            .sum()
    }
}

/// True if some target level can satisfy the direction test; transitions
/// failing this can never fire and are dropped at construction.
fn is_feasible(cons: &TransConst) -> bool {
    cons.targets.iter().any(|&target| {
        if cons.req_dir {
            target > cons.comp_value
        } else {
            target < cons.comp_value
        }
    })
}

fn acting_entry<'a>(
    network: &Network,
    kinetics: &'a Kinetics,
    specie: SpecieId,
    levels: &[ActLevel],
) -> Result<&'a grn_model::ParamEntry, SynthError> {
    kinetics
        .specie(specie)
        .entries
        .iter()
        .find(|entry| {
            entry
                .requirements
                .iter()
                .all(|(source, interval)| interval.contains(&levels[*source]))
        })
        .ok_or_else(|| {
            SynthError::NoContextMatch(
                ErrorInfo::new("acting-context", "no regulatory context matches the state")
                    .with_context("specie", network.name(specie))
                    .with_context("levels", format!("{levels:?}")),
            )
        })
}

/// Advances a level vector one step in mixed-radix order, first specie
/// fastest; false once the vector wrapped around.
fn iterate(maxes: &[ActLevel], levels: &mut Levels) -> bool {
    for (level, &max) in levels.iter_mut().zip(maxes) {
        if *level < max {
            *level += 1;
            return true;
        }
        *level = 0;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use grn_model::RegLabel;

    fn self_activation() -> (Network, Kinetics) {
        let mut network = Network::new();
        let a = network.add_specie("cA", 3, None).unwrap();
        network.add_regulation(a, a, 1, RegLabel::Activating).unwrap();
        network.add_regulation(a, a, 2, RegLabel::Activating).unwrap();
        network.add_regulation(a, a, 3, RegLabel::Activating).unwrap();
        let kinetics = Kinetics::build(&network, &[Vec::new()]).unwrap();
        (network, kinetics)
    }

    #[test]
    fn state_ids_follow_mixed_radix_order() {
        let mut network = Network::new();
        network.add_specie("cA", 1, None).unwrap();
        network.add_specie("cB", 2, None).unwrap();
        let kinetics = Kinetics::build(&network, &[Vec::new(), Vec::new()]).unwrap();
        let uts = Uts::build(&network, &kinetics, None).unwrap();
        assert_eq!(uts.state_count(), 6);
        assert_eq!(uts.levels(0), &vec![0, 0]);
        assert_eq!(uts.levels(1), &vec![1, 0]);
        assert_eq!(uts.levels(2), &vec![0, 1]);
        assert_eq!(uts.state_id(&[1, 2]), 5);
    }

    #[test]
    fn acting_context_tracks_the_current_level() {
        let (network, kinetics) = self_activation();
        let uts = Uts::build(&network, &kinetics, None).unwrap();
        for id in 0..uts.state_count() {
            for transition in uts.transitions(id) {
                assert_eq!(transition.cons.comp_value, uts.levels(id)[0]);
            }
        }
        // state 1 acts under context cA:1, the second of four entries
        let up = uts
            .transitions(1)
            .iter()
            .find(|t| t.cons.req_dir)
            .unwrap();
        assert_eq!(up.cons.step_size, kinetics.specie(0).entries[1].step_size);
    }

    #[test]
    fn infeasible_transitions_are_dropped() {
        let mut network = Network::new();
        network.add_specie("cA", 1, Some(vec![1])).unwrap();
        let kinetics = Kinetics::build(&network, &[Vec::new()]).unwrap();
        let uts = Uts::build(&network, &kinetics, None).unwrap();
        // the only target is 1, so no state can ever step down
        assert_eq!(uts.transitions(0).len(), 1);
        assert!(uts.transitions(1).is_empty());
    }

    #[test]
    fn experiment_predicate_restricts_allowed_states() {
        let (network, kinetics) = self_activation();
        let formula = grn_model::Formula::parse("cA<2", &network).unwrap();
        let uts = Uts::build(&network, &kinetics, Some(&formula)).unwrap();
        let allowed: Vec<bool> = (0..uts.state_count()).map(|id| uts.is_allowed(id)).collect();
        assert_eq!(allowed, vec![true, true, false, false]);
    }
}
