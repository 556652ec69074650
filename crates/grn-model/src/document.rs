//! Serde front-end for the model document.
//!
//! The document carries the same data as the XML surface of the external
//! tooling: the regulatory network (species with regulations and
//! per-context parameter specifications) and exactly one property, either
//! an explicit automaton or a time series. JSON and YAML encodings are
//! accepted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use grn_core::{ActLevel, ErrorInfo, Levels, SynthError};

use crate::formula::Formula;
use crate::kinetics::{Kinetics, ParamSpec, ParamValue};
use crate::network::{validate_name, Network, RegLabel};
use crate::property::{Property, PropertyEdge, PropertyState};

/// Root of the model document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDoc {
    /// The regulatory network.
    pub network: NetworkDoc,
    /// The property to synthesise against.
    pub property: PropertyDoc,
}

/// Network part of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkDoc {
    /// Species in model order.
    pub species: Vec<SpecieDoc>,
}

/// One specie of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecieDoc {
    /// Specie name.
    pub name: String,
    /// Maximal activation level, defaults to 1.
    #[serde(default = "default_max")]
    pub max: ActLevel,
    /// Basal target levels; a single level or a list. Defaults to the full
    /// range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basal: Option<BasalDoc>,
    /// Incoming regulations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regulations: Vec<RegulDoc>,
    /// Per-context parameter specifications.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParamDoc>,
}

/// Basal targets: one level or a list of levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BasalDoc {
    /// A single basal target.
    One(ActLevel),
    /// An explicit list of basal targets.
    Many(Levels),
}

/// One regulation of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegulDoc {
    /// Regulator, by name or decimal index.
    pub source: String,
    /// Threshold, defaults to 1.
    #[serde(default = "default_threshold")]
    pub threshold: ActLevel,
    /// Sign and observability label: `+`, `-`, `+-` or `?`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One parameter specification of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamDoc {
    /// Context in human or canonical form.
    pub context: String,
    /// Requested target values: `"?"`, a comma-separated list, or a list of
    /// numbers.
    pub value: ValueDoc,
}

/// Value of a parameter specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueDoc {
    /// List of levels as numbers.
    Levels(Levels),
    /// `"?"` or a comma-separated list of levels.
    Text(String),
}

/// Property part of the document; exactly one flavour must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDoc {
    /// Explicit automaton property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automaton: Option<AutomatonDoc>,
    /// Time-series property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<SeriesDoc>,
    /// Optional predicate restricting the allowed network states.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment: Option<String>,
}

/// Explicit automaton description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutomatonDoc {
    /// Automaton states; state 0 is initial.
    pub states: Vec<AutStateDoc>,
    /// Accept on reaching a final state instead of demanding a cycle
    /// through one.
    #[serde(default)]
    pub finite: bool,
}

/// One automaton state of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutStateDoc {
    /// State name.
    pub name: String,
    /// True if the state accepts.
    #[serde(rename = "final", default)]
    pub is_final: bool,
    /// Outgoing edges.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<EdgeDoc>,
}

/// One automaton edge of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeDoc {
    /// Target state, by name or decimal index.
    pub target: String,
    /// Guard over specie levels.
    pub values: String,
    /// The source network state must be transient.
    #[serde(default)]
    pub transient: bool,
    /// The source network state must be stable.
    #[serde(default)]
    pub stable: bool,
    /// Also give the source state a self-loop guarded by the negated
    /// values.
    #[serde(default)]
    pub self_loop: bool,
}

/// Time-series description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesDoc {
    /// Minimal accepted path length.
    #[serde(default)]
    pub min_acc: usize,
    /// Maximal accepted path length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_acc: Option<usize>,
    /// Ordered measurement guards.
    pub measurements: Vec<String>,
}

fn default_max() -> ActLevel {
    1
}

fn default_threshold() -> ActLevel {
    1
}

/// Fully expanded model: the network, its parameter space, the property and
/// a digest of the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledModel {
    /// The regulatory network.
    pub network: Network,
    /// The expanded kinetic-parameter space.
    pub kinetics: Kinetics,
    /// The resolved property.
    pub property: Property,
    /// Hex digest of the canonical document serialisation.
    pub digest: String,
}

impl ModelDoc {
    /// Parses a JSON document.
    pub fn from_json(text: &str) -> Result<Self, SynthError> {
        serde_json::from_str(text).map_err(|err| {
            SynthError::Parse(
                ErrorInfo::new("document-json", err.to_string())
                    .with_hint("the document needs a network and exactly one property"),
            )
        })
    }

    /// Parses a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, SynthError> {
        serde_yaml::from_str(text).map_err(|err| {
            SynthError::Parse(
                ErrorInfo::new("document-yaml", err.to_string())
                    .with_hint("the document needs a network and exactly one property"),
            )
        })
    }

    /// Reads a document from disk, picking the format by extension.
    pub fn load(path: &Path) -> Result<Self, SynthError> {
        let text = fs::read_to_string(path)
            .map_err(|err| SynthError::io(path.display().to_string(), &err))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            _ => Self::from_json(&text),
        }
    }

    /// Hex digest over the canonical JSON serialisation of the document.
    pub fn digest(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        hex::encode(Sha256::digest(canonical.as_bytes()))
    }

    /// Expands the document into the network, the parameter space and the
    /// resolved property, running all static validation.
    pub fn compile(&self) -> Result<CompiledModel, SynthError> {
        let mut network = Network::new();
        for specie in &self.network.species {
            let basal = match &specie.basal {
                None => None,
                Some(BasalDoc::One(level)) => Some(vec![*level]),
                Some(BasalDoc::Many(levels)) => Some(levels.clone()),
            };
            network.add_specie(&specie.name, specie.max, basal)?;
        }
        for (target, specie) in self.network.species.iter().enumerate() {
            for regul in &specie.regulations {
                let source = network.find_specie(&regul.source).ok_or_else(|| {
                    SynthError::Parse(
                        ErrorInfo::new("regulation-source", "regulation from an unknown specie")
                            .with_context("target", specie.name.clone())
                            .with_context("source", regul.source.clone()),
                    )
                })?;
                let label = RegLabel::parse(regul.label.as_deref().unwrap_or("?"))?;
                network.add_regulation(source, target, regul.threshold, label)?;
            }
        }

        let specs: Vec<Vec<ParamSpec>> = self
            .network
            .species
            .iter()
            .map(|specie| {
                specie
                    .parameters
                    .iter()
                    .map(|param| {
                        Ok(ParamSpec {
                            context: param.context.clone(),
                            value: resolve_value(&param.value)?,
                        })
                    })
                    .collect::<Result<Vec<_>, SynthError>>()
            })
            .collect::<Result<Vec<_>, SynthError>>()?;
        let kinetics = Kinetics::build(&network, &specs)?;

        let experiment = self
            .property
            .experiment
            .as_deref()
            .map(|text| Formula::parse(text, &network))
            .transpose()?;
        let property = match (&self.property.automaton, &self.property.series) {
            (Some(automaton), None) => compile_automaton(automaton, &network, experiment)?,
            (None, Some(series)) => compile_series(series, &network, experiment)?,
            _ => {
                return Err(SynthError::Parse(ErrorInfo::new(
                    "property-flavour",
                    "exactly one of automaton and series must be present",
                )))
            }
        };

        Ok(CompiledModel {
            network,
            kinetics,
            property,
            digest: self.digest(),
        })
    }
}

fn resolve_value(value: &ValueDoc) -> Result<ParamValue, SynthError> {
    match value {
        ValueDoc::Levels(levels) => Ok(ParamValue::Levels(levels.clone())),
        ValueDoc::Text(text) if text.trim() == "?" => Ok(ParamValue::Basal),
        ValueDoc::Text(text) => {
            let levels = text
                .split(',')
                .map(|part| {
                    part.trim().parse::<ActLevel>().map_err(|_| {
                        SynthError::Parse(
                            ErrorInfo::new("param-value", "target value is not a number")
                                .with_context("value", text.clone()),
                        )
                    })
                })
                .collect::<Result<Levels, SynthError>>()?;
            Ok(ParamValue::Levels(levels))
        }
    }
}

fn compile_automaton(
    automaton: &AutomatonDoc,
    network: &Network,
    experiment: Option<Formula>,
) -> Result<Property, SynthError> {
    let names: Vec<&str> = automaton
        .states
        .iter()
        .map(|state| state.name.as_str())
        .collect();
    for (index, name) in names.iter().enumerate() {
        validate_name(name)?;
        if names[..index].contains(name) {
            return Err(SynthError::InvalidName(
                ErrorInfo::new("state-duplicate", "automaton state name already in use")
                    .with_context("name", *name),
            ));
        }
    }
    let resolve = |key: &str| -> Option<usize> {
        if let Ok(index) = key.parse::<usize>() {
            return (index < names.len()).then_some(index);
        }
        names.iter().position(|name| *name == key)
    };
    let states = automaton
        .states
        .iter()
        .enumerate()
        .map(|(source, state)| {
            let mut edges = Vec::with_capacity(state.edges.len());
            for edge in &state.edges {
                let target = resolve(&edge.target).ok_or_else(|| {
                    SynthError::Parse(
                        ErrorInfo::new("edge-target", "edge leads to an unknown state")
                            .with_context("state", state.name.clone())
                            .with_context("target", edge.target.clone()),
                    )
                })?;
                let guard = Formula::parse(&edge.values, network)?;
                if edge.self_loop {
                    edges.push(PropertyEdge {
                        target: source,
                        guard: guard.clone().negated(),
                        transient: false,
                        stable: false,
                    });
                }
                edges.push(PropertyEdge {
                    target,
                    guard,
                    transient: edge.transient,
                    stable: edge.stable,
                });
            }
            Ok(PropertyState {
                name: state.name.clone(),
                is_final: state.is_final,
                edges,
            })
        })
        .collect::<Result<Vec<_>, SynthError>>()?;
    Property::automaton(states, automaton.finite, experiment)
}

fn compile_series(
    series: &SeriesDoc,
    network: &Network,
    experiment: Option<Formula>,
) -> Result<Property, SynthError> {
    let measurements = series
        .measurements
        .iter()
        .map(|text| Formula::parse(text, network))
        .collect::<Result<Vec<_>, SynthError>>()?;
    Property::time_series(measurements, series.min_acc, series.max_acc, experiment)
}
