//! Regulatory contexts of a target specie and their canonical string form.
//!
//! A context picks one activity interval (the half-open range between two
//! consecutive thresholds) for every regulator. The canonical form lists
//! every regulator with an explicit threshold, `"r1:t1,r2:t2"`, regulators
//! in model order; threshold `0` stands for "below the first threshold".

use std::ops::Range;

use grn_core::{ActLevel, ErrorInfo, SpecieId, SynthError};

use crate::network::Network;

/// Regulator structure of one target specie, the frame contexts live in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSpace {
    target: SpecieId,
    regulators: Vec<SpecieId>,
    thresholds: Vec<Vec<ActLevel>>,
}

impl ContextSpace {
    /// Derives the context space of `target` from the network.
    pub fn of(network: &Network, target: SpecieId) -> Self {
        let thresholds_map = network.thresholds(target);
        let regulators: Vec<SpecieId> = thresholds_map.keys().copied().collect();
        let thresholds = regulators
            .iter()
            .map(|source| thresholds_map[source].clone())
            .collect();
        Self {
            target,
            regulators,
            thresholds,
        }
    }

    /// Regulators of the target, in model order.
    pub fn regulators(&self) -> &[SpecieId] {
        &self.regulators
    }

    /// Number of contexts, the product of `thresholds + 1` per regulator.
    pub fn context_count(&self) -> usize {
        self.thresholds
            .iter()
            .map(|thresholds| thresholds.len() + 1)
            .product()
    }

    /// Enumerates all bracket combinations in context-enumeration order,
    /// first regulator varying fastest.
    pub fn enumerate_brackets(&self) -> Vec<Vec<usize>> {
        let mut combos = vec![Vec::new()];
        for thresholds in &self.thresholds {
            let mut extended = Vec::with_capacity(combos.len() * (thresholds.len() + 1));
            for bracket in 0..=thresholds.len() {
                for combo in &combos {
                    let mut next = combo.clone();
                    next.push(bracket);
                    extended.push(next);
                }
            }
            combos = extended;
        }
        combos
    }

    /// Canonical string of a bracket combination.
    pub fn canonical_of_brackets(&self, network: &Network, brackets: &[usize]) -> String {
        let parts: Vec<String> = self
            .regulators
            .iter()
            .zip(&self.thresholds)
            .zip(brackets)
            .map(|((&source, thresholds), &bracket)| {
                let threshold = if bracket == 0 {
                    0
                } else {
                    thresholds[bracket - 1]
                };
                format!("{}:{}", network.name(source), threshold)
            })
            .collect();
        parts.join(",")
    }

    /// Activity interval of each regulator in a bracket combination.
    pub fn requirements_of_brackets(
        &self,
        network: &Network,
        brackets: &[usize],
    ) -> Vec<(SpecieId, Range<ActLevel>)> {
        self.regulators
            .iter()
            .zip(&self.thresholds)
            .zip(brackets)
            .map(|((&source, thresholds), &bracket)| {
                let begin = if bracket == 0 {
                    0
                } else {
                    thresholds[bracket - 1]
                };
                let end = if bracket == thresholds.len() {
                    network.max_level(source) + 1
                } else {
                    thresholds[bracket]
                };
                (source, begin..end)
            })
            .collect()
    }

    /// Canonicalises a human-form context string.
    ///
    /// The human form may omit the `:t` part for a regulator with a single
    /// threshold and may omit regulators altogether, which puts them below
    /// their first threshold. Canonicalising a canonical string is a fixed
    /// point.
    pub fn canonicalise(&self, network: &Network, context: &str) -> Result<String, SynthError> {
        let mut chosen: Vec<Option<ActLevel>> = vec![None; self.regulators.len()];
        for token in context.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (name, threshold) = match token.split_once(':') {
                Some((name, value)) => {
                    let threshold = value.trim().parse::<ActLevel>().map_err(|_| {
                        SynthError::UnknownContext(
                            ErrorInfo::new("context-threshold", "threshold is not a number")
                                .with_context("context", context)
                                .with_context("token", token),
                        )
                    })?;
                    (name.trim(), Some(threshold))
                }
                None => (token, None),
            };
            let source = network.find_specie(name).ok_or_else(|| {
                SynthError::UnknownContext(
                    ErrorInfo::new("context-regulator", "regulator is not a specie")
                        .with_context("context", context)
                        .with_context("regulator", name),
                )
            })?;
            let position = self
                .regulators
                .iter()
                .position(|&r| r == source)
                .ok_or_else(|| {
                    SynthError::UnknownContext(
                        ErrorInfo::new("context-regulator", "specie does not regulate the target")
                            .with_context("context", context)
                            .with_context("regulator", name)
                            .with_context("target", network.name(self.target)),
                    )
                })?;
            let thresholds = &self.thresholds[position];
            let threshold = match threshold {
                Some(threshold) => {
                    if threshold != 0 && !thresholds.contains(&threshold) {
                        return Err(SynthError::UnknownContext(
                            ErrorInfo::new("context-threshold", "no regulation at this threshold")
                                .with_context("context", context)
                                .with_context("regulator", name)
                                .with_context("threshold", threshold.to_string()),
                        ));
                    }
                    threshold
                }
                None if thresholds.len() == 1 => thresholds[0],
                None => {
                    return Err(SynthError::UnknownContext(
                        ErrorInfo::new("context-ambiguous", "regulator has several thresholds")
                            .with_context("context", context)
                            .with_context("regulator", name)
                            .with_hint("write the threshold explicitly as regulator:threshold"),
                    ));
                }
            };
            if chosen[position].is_some() {
                return Err(SynthError::UnknownContext(
                    ErrorInfo::new("context-duplicate", "regulator listed twice in one context")
                        .with_context("context", context)
                        .with_context("regulator", name),
                ));
            }
            chosen[position] = Some(threshold);
        }
        let parts: Vec<String> = self
            .regulators
            .iter()
            .zip(&chosen)
            .map(|(&source, threshold)| {
                format!("{}:{}", network.name(source), threshold.unwrap_or(0))
            })
            .collect();
        Ok(parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::RegLabel;

    fn two_regulator_network() -> (Network, SpecieId) {
        let mut network = Network::new();
        let a = network.add_specie("cA", 3, None).unwrap();
        let b = network.add_specie("cB", 1, None).unwrap();
        network.add_regulation(a, b, 1, RegLabel::Free).unwrap();
        network.add_regulation(a, b, 3, RegLabel::Free).unwrap();
        network.add_regulation(b, b, 1, RegLabel::Free).unwrap();
        (network, b)
    }

    #[test]
    fn context_count_multiplies_brackets() {
        let (network, b) = two_regulator_network();
        let space = ContextSpace::of(&network, b);
        assert_eq!(space.context_count(), 6);
        assert_eq!(space.enumerate_brackets().len(), 6);
    }

    #[test]
    fn canonicalisation_is_idempotent() {
        let (network, b) = two_regulator_network();
        let space = ContextSpace::of(&network, b);
        let canonical = space.canonicalise(&network, "cB,cA:3").unwrap();
        assert_eq!(canonical, "cA:3,cB:1");
        assert_eq!(space.canonicalise(&network, &canonical).unwrap(), canonical);
    }

    #[test]
    fn omitted_regulators_default_to_zero() {
        let (network, b) = two_regulator_network();
        let space = ContextSpace::of(&network, b);
        assert_eq!(space.canonicalise(&network, "").unwrap(), "cA:0,cB:0");
    }

    #[test]
    fn ambiguous_shorthand_is_rejected() {
        let (network, b) = two_regulator_network();
        let space = ContextSpace::of(&network, b);
        let err = space.canonicalise(&network, "cA").unwrap_err();
        assert!(matches!(err, SynthError::UnknownContext(_)));
    }
}
