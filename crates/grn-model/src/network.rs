//! The raw regulatory network: species, their value ranges and the
//! threshold-labelled regulations between them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use grn_core::{ActLevel, ErrorInfo, Levels, SpecieId, SynthError};

/// Sign and observability tag of a regulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegLabel {
    /// The regulation is required to activate its target.
    Activating,
    /// The regulation is required to inhibit its target.
    Inhibiting,
    /// The regulation must be observable but may act in either direction.
    Observable,
    /// No requirement on the regulation.
    Free,
}

impl RegLabel {
    /// Parses the model-file form of the label.
    pub fn parse(text: &str) -> Result<Self, SynthError> {
        match text {
            "+" => Ok(RegLabel::Activating),
            "-" => Ok(RegLabel::Inhibiting),
            "+-" | "-+" => Ok(RegLabel::Observable),
            "?" | "" => Ok(RegLabel::Free),
            other => Err(SynthError::Parse(
                ErrorInfo::new("regulation-label", "unknown regulation label")
                    .with_context("label", other)
                    .with_hint("expected one of +, -, +-, ?"),
            )),
        }
    }
}

/// Directed regulation of one specie by another at a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regulation {
    /// Regulator specie.
    pub source: SpecieId,
    /// Level of the regulator from which the regulation is active.
    pub threshold: ActLevel,
    /// Sign and observability tag.
    pub label: RegLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Specie {
    name: String,
    max_level: ActLevel,
    basal_targets: Levels,
    regulations: Vec<Regulation>,
}

/// Immutable network model, filled once by the front-end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    species: Vec<Specie>,
}

/// Checks a specie or automaton state name against the naming rules:
/// `[A-Za-z_][A-Za-z0-9_]*` with length at least two.
pub fn validate_name(name: &str) -> Result<(), SynthError> {
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let tail_ok = chars.clone().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if name.len() < 2 || !head_ok || !tail_ok {
        return Err(SynthError::InvalidName(
            ErrorInfo::new("name-rules", "name violates the naming rules")
                .with_context("name", name)
                .with_hint("names match [A-Za-z_][A-Za-z0-9_]* and have at least 2 symbols"),
        ));
    }
    Ok(())
}

impl Network {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a specie; `basal_targets` defaults to the full `0..=max_level`
    /// range when absent.
    pub fn add_specie(
        &mut self,
        name: &str,
        max_level: ActLevel,
        basal_targets: Option<Levels>,
    ) -> Result<SpecieId, SynthError> {
        validate_name(name)?;
        if self.find_specie(name).is_some() {
            return Err(SynthError::InvalidName(
                ErrorInfo::new("specie-duplicate", "specie name already in use")
                    .with_context("name", name),
            ));
        }
        if max_level == 0 {
            return Err(SynthError::OutOfRange(
                ErrorInfo::new("max-level", "maximal level of a specie must be at least 1")
                    .with_context("specie", name),
            ));
        }
        let basal_targets = match basal_targets {
            None => (0..=max_level).collect(),
            Some(mut targets) => {
                targets.sort_unstable();
                targets.dedup();
                if targets.is_empty() {
                    return Err(SynthError::OutOfRange(
                        ErrorInfo::new("basal-empty", "basal target list must not be empty")
                            .with_context("specie", name),
                    ));
                }
                if let Some(&level) = targets.iter().find(|&&level| level > max_level) {
                    return Err(SynthError::OutOfRange(
                        ErrorInfo::new("basal-range", "basal target above the maximal level")
                            .with_context("specie", name)
                            .with_context("level", level.to_string())
                            .with_context("max", max_level.to_string()),
                    ));
                }
                targets
            }
        };
        self.species.push(Specie {
            name: name.to_owned(),
            max_level,
            basal_targets,
            regulations: Vec::new(),
        });
        Ok(self.species.len() - 1)
    }

    /// Adds a regulation of `target` by `source` at `threshold`.
    pub fn add_regulation(
        &mut self,
        source: SpecieId,
        target: SpecieId,
        threshold: ActLevel,
        label: RegLabel,
    ) -> Result<(), SynthError> {
        if threshold == 0 || threshold > self.max_level(source) {
            return Err(SynthError::OutOfRange(
                ErrorInfo::new("threshold-range", "threshold outside the regulator's range")
                    .with_context("source", self.name(source))
                    .with_context("target", self.name(target))
                    .with_context("threshold", threshold.to_string()),
            ));
        }
        let duplicate = self.species[target]
            .regulations
            .iter()
            .any(|regul| regul.source == source && regul.threshold == threshold);
        if duplicate {
            return Err(SynthError::DuplicateRegulation(
                ErrorInfo::new("regulation-duplicate", "regulation defined twice")
                    .with_context("source", self.name(source))
                    .with_context("target", self.name(target))
                    .with_context("threshold", threshold.to_string()),
            ));
        }
        self.species[target].regulations.push(Regulation {
            source,
            threshold,
            label,
        });
        Ok(())
    }

    /// Number of species in the network.
    pub fn specie_count(&self) -> usize {
        self.species.len()
    }

    /// Name of a specie.
    pub fn name(&self, id: SpecieId) -> &str {
        &self.species[id].name
    }

    /// Maximal activation level of a specie.
    pub fn max_level(&self, id: SpecieId) -> ActLevel {
        self.species[id].max_level
    }

    /// Target levels a specie may take in an unconstrained context.
    pub fn basal_targets(&self, id: SpecieId) -> &Levels {
        &self.species[id].basal_targets
    }

    /// Regulations incoming to a specie, in model order.
    pub fn regulations(&self, target: SpecieId) -> &[Regulation] {
        &self.species[target].regulations
    }

    /// Resolves a specie reference given by name or by decimal index.
    pub fn find_specie(&self, key: &str) -> Option<SpecieId> {
        if let Ok(index) = key.parse::<usize>() {
            return (index < self.species.len()).then_some(index);
        }
        self.species.iter().position(|specie| specie.name == key)
    }

    /// Distinct regulators of a specie, in model order of the sources.
    pub fn regulators(&self, target: SpecieId) -> Vec<SpecieId> {
        let mut sources: Vec<SpecieId> = self.species[target]
            .regulations
            .iter()
            .map(|regul| regul.source)
            .collect();
        sources.sort_unstable();
        sources.dedup();
        sources
    }

    /// Sorted unique thresholds of each regulator of a specie.
    pub fn thresholds(&self, target: SpecieId) -> BTreeMap<SpecieId, Vec<ActLevel>> {
        let mut map: BTreeMap<SpecieId, Vec<ActLevel>> = BTreeMap::new();
        for regul in &self.species[target].regulations {
            map.entry(regul.source).or_default().push(regul.threshold);
        }
        for thresholds in map.values_mut() {
            thresholds.sort_unstable();
            thresholds.dedup();
        }
        map
    }

    /// Maximal levels of all species, in model order.
    pub fn maxes(&self) -> Levels {
        self.species.iter().map(|specie| specie.max_level).collect()
    }
}
