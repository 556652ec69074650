//! Explicit kinetic-parameter space of the network.
//!
//! For every target specie the cartesian product of admissible target
//! levels over its regulatory contexts is enumerated; a global
//! parametrization number (`ParamNo`) walks this product lexicographically,
//! species in model order, first context varying fastest. Each entry keeps
//! its `step_size`, the number of consecutive `ParamNo`s sharing this
//! entry's selected target, so decoding is a division and a modulo.

use std::ops::Range;

use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};

use grn_core::{ActLevel, ErrorInfo, Levels, ParamNo, SpecieId, SynthError};

use crate::context::ContextSpace;
use crate::network::Network;

/// User-supplied restriction of one parameter entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Context the restriction applies to, in human or canonical form.
    pub context: String,
    /// Requested target levels.
    pub value: ParamValue,
}

/// Value part of a parameter specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamValue {
    /// `?`: keep the basal target list.
    Basal,
    /// Explicit list of admissible target levels.
    Levels(Levels),
}

/// One kinetic parameter: the admissible targets of a specie in a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamEntry {
    /// Canonical context string.
    pub context: String,
    /// Activity interval each regulator must occupy for this entry to act.
    pub requirements: Vec<(SpecieId, Range<ActLevel>)>,
    /// Admissible target levels, sorted and unique.
    pub targets: Levels,
    /// Number of consecutive `ParamNo`s sharing this entry's selection.
    pub step_size: ParamNo,
}

/// All parameter entries of one specie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecieKinetics {
    /// Entries in context-enumeration order.
    pub entries: Vec<ParamEntry>,
    /// Number of parametrizations of this specie alone.
    pub count: ParamNo,
}

/// The expanded parameter space of the whole network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kinetics {
    species: Vec<SpecieKinetics>,
    param_count: ParamNo,
}

impl Kinetics {
    /// Expands the parameter space of `network`, restricted by the per-specie
    /// specifications in `specs` (indexed like the species).
    pub fn build(network: &Network, specs: &[Vec<ParamSpec>]) -> Result<Self, SynthError> {
        let mut species = Vec::with_capacity(network.specie_count());
        for target in 0..network.specie_count() {
            let space = ContextSpace::of(network, target);
            let mut entries: Vec<ParamEntry> = space
                .enumerate_brackets()
                .iter()
                .map(|brackets| ParamEntry {
                    context: space.canonical_of_brackets(network, brackets),
                    requirements: space.requirements_of_brackets(network, brackets),
                    targets: network.basal_targets(target).clone(),
                    step_size: 0,
                })
                .collect();

            for spec in specs.get(target).map(Vec::as_slice).unwrap_or_default() {
                let canonical = space.canonicalise(network, &spec.context)?;
                let entry = entries
                    .iter_mut()
                    .find(|entry| entry.context == canonical)
                    .ok_or_else(|| {
                        SynthError::UnknownContext(
                            ErrorInfo::new("context-unmatched", "context matches no entry")
                                .with_context("specie", network.name(target))
                                .with_context("context", spec.context.clone()),
                        )
                    })?;
                entry.targets = resolve_targets(network, target, spec)?;
            }

            info!(
                "specie {} has {} regulators with {} regulatory contexts",
                network.name(target),
                space.regulators().len(),
                entries.len()
            );
            species.push(SpecieKinetics {
                entries,
                count: 0,
            });
        }

        let mut step: ParamNo = 1;
        for kinetics in &mut species {
            let mut count: ParamNo = 1;
            for entry in &mut kinetics.entries {
                entry.step_size = step;
                let targets = entry.targets.len() as ParamNo;
                step = checked_mul(step, targets)?;
                count = checked_mul(count, targets)?;
            }
            kinetics.count = count;
        }

        Ok(Self {
            species,
            param_count: step,
        })
    }

    /// Size of the whole parametrization space.
    pub fn param_count(&self) -> ParamNo {
        self.param_count
    }

    /// Kinetics of one specie.
    pub fn specie(&self, id: SpecieId) -> &SpecieKinetics {
        &self.species[id]
    }

    /// Number of species covered.
    pub fn specie_count(&self) -> usize {
        self.species.len()
    }

    /// Target level the parametrization `param_no` selects for an entry.
    pub fn target_of(&self, specie: SpecieId, entry: usize, param_no: ParamNo) -> ActLevel {
        let entry = &self.species[specie].entries[entry];
        let index = (param_no / entry.step_size) % entry.targets.len() as ParamNo;
        entry.targets[index as usize]
    }

    /// Explicit human-readable form of a parametrization, `"(v,v,…)"`,
    /// species in model order, entries in context-enumeration order.
    pub fn color_string(&self, param_no: ParamNo) -> String {
        let values = self
            .species
            .iter()
            .enumerate()
            .flat_map(|(specie, kinetics)| {
                (0..kinetics.entries.len()).map(move |entry| (specie, entry))
            })
            .map(|(specie, entry)| self.target_of(specie, entry, param_no))
            .join(",");
        format!("({values})")
    }
}

fn resolve_targets(
    network: &Network,
    target: SpecieId,
    spec: &ParamSpec,
) -> Result<Levels, SynthError> {
    match &spec.value {
        ParamValue::Basal => Ok(network.basal_targets(target).clone()),
        ParamValue::Levels(levels) => {
            let mut levels = levels.clone();
            levels.sort_unstable();
            levels.dedup();
            if levels.is_empty() {
                return Err(SynthError::OutOfRange(
                    ErrorInfo::new("targets-empty", "a parameter needs at least one target level")
                        .with_context("specie", network.name(target))
                        .with_context("context", spec.context.clone()),
                ));
            }
            if let Some(&level) = levels.iter().find(|&&l| l > network.max_level(target)) {
                return Err(SynthError::OutOfRange(
                    ErrorInfo::new("target-range", "target level above the specie's maximum")
                        .with_context("specie", network.name(target))
                        .with_context("context", spec.context.clone())
                        .with_context("level", level.to_string()),
                ));
            }
            Ok(levels)
        }
    }
}

fn checked_mul(lhs: ParamNo, rhs: ParamNo) -> Result<ParamNo, SynthError> {
    lhs.checked_mul(rhs).ok_or_else(|| {
        SynthError::StateExplosion(ErrorInfo::new(
            "param-space-overflow",
            "parametrization space exceeds the addressable range",
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::RegLabel;

    fn mutual_circuit() -> (Network, Kinetics) {
        let mut network = Network::new();
        let a = network.add_specie("cA", 1, None).unwrap();
        let b = network.add_specie("cB", 1, None).unwrap();
        network.add_regulation(a, b, 1, RegLabel::Activating).unwrap();
        network.add_regulation(b, a, 1, RegLabel::Activating).unwrap();
        let kinetics = Kinetics::build(&network, &[Vec::new(), Vec::new()]).unwrap();
        (network, kinetics)
    }

    #[test]
    fn unregulated_species_have_a_single_context() {
        let mut network = Network::new();
        network.add_specie("cA", 1, None).unwrap();
        network.add_specie("cB", 2, None).unwrap();
        let kinetics = Kinetics::build(&network, &[Vec::new(), Vec::new()]).unwrap();
        assert_eq!(kinetics.specie(0).entries.len(), 1);
        assert_eq!(kinetics.specie(1).entries.len(), 1);
        assert_eq!(kinetics.param_count(), 2 * 3);
    }

    #[test]
    fn step_sizes_grow_across_entries_and_species(){
        let (_, kinetics) = mutual_circuit();
        let steps: Vec<ParamNo> = (0..2)
            .flat_map(|s| kinetics.specie(s).entries.iter().map(|e| e.step_size))
            .collect();
        assert_eq!(steps, vec![1, 2, 4, 8]);
        assert_eq!(kinetics.param_count(), 16);
        assert_eq!(kinetics.specie(0).count, 4);
    }

    #[test]
    fn decoding_walks_the_first_entry_fastest() {
        let (_, kinetics) = mutual_circuit();
        assert_eq!(kinetics.target_of(0, 0, 0), 0);
        assert_eq!(kinetics.target_of(0, 0, 1), 1);
        assert_eq!(kinetics.target_of(0, 1, 0), 0);
        assert_eq!(kinetics.target_of(0, 1, 2), 1);
        assert_eq!(kinetics.color_string(0), "(0,0,0,0)");
        assert_eq!(kinetics.color_string(15), "(1,1,1,1)");
        assert_eq!(kinetics.color_string(5), "(1,0,1,0)");
    }

    #[test]
    fn user_specification_restricts_an_entry() {
        let mut network = Network::new();
        let a = network.add_specie("cA", 1, None).unwrap();
        network.add_regulation(a, a, 1, RegLabel::Free).unwrap();
        let specs = vec![vec![ParamSpec {
            context: "cA:1".into(),
            value: ParamValue::Levels(vec![1]),
        }]];
        let kinetics = Kinetics::build(&network, &specs).unwrap();
        assert_eq!(kinetics.param_count(), 2);
        assert_eq!(kinetics.specie(0).entries[1].targets, vec![1]);
    }

    #[test]
    fn out_of_range_target_is_rejected() {
        let mut network = Network::new();
        let a = network.add_specie("cA", 1, None).unwrap();
        network.add_regulation(a, a, 1, RegLabel::Free).unwrap();
        let specs = vec![vec![ParamSpec {
            context: "cA:1".into(),
            value: ParamValue::Levels(vec![2]),
        }]];
        assert!(matches!(
            Kinetics::build(&network, &specs),
            Err(SynthError::OutOfRange(_))
        ));
    }
}
