//! Temporal property: a Büchi-like automaton over specie levels, either
//! given explicitly or unrolled from an ordered time series of
//! measurements.

use serde::{Deserialize, Serialize};

use grn_core::{ErrorInfo, StateId, SynthError};

use crate::formula::Formula;
use crate::network::{validate_name, Network};

/// Flavour of the property, decides the checking procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    /// General ω-regular property; acceptance needs a reachable cycle
    /// through a final state.
    Automaton,
    /// Automaton with finite acceptance; reaching a final state suffices.
    Reachability,
    /// Time series; acceptance is a finite path through the measurements.
    TimeSeries,
}

/// One labelled edge of the property automaton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyEdge {
    /// Target state of the edge.
    pub target: StateId,
    /// Guard over specie levels.
    pub guard: Formula,
    /// The source network state must have an open outgoing transition.
    pub transient: bool,
    /// The source network state must have no open outgoing transition.
    pub stable: bool,
}

/// One state of the property automaton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyState {
    /// Name of the state.
    pub name: String,
    /// True if runs accept here.
    pub is_final: bool,
    /// Outgoing edges.
    pub edges: Vec<PropertyEdge>,
}

/// The resolved property automaton. State 0 is initial by convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    kind: PropertyKind,
    states: Vec<PropertyState>,
    min_acc: usize,
    max_acc: Option<usize>,
    experiment: Option<Formula>,
}

impl Property {
    /// Builds an explicit automaton property from named states.
    ///
    /// With `finite` acceptance a run accepts as soon as it reaches a final
    /// state; otherwise acceptance needs a cycle through a final state.
    /// Fails when a state name breaks the naming rules, when no state is
    /// final, or when an edge requires both `transient` and `stable`.
    pub fn automaton(
        states: Vec<PropertyState>,
        finite: bool,
        experiment: Option<Formula>,
    ) -> Result<Self, SynthError> {
        if states.is_empty() {
            return Err(SynthError::Parse(ErrorInfo::new(
                "automaton-empty",
                "the property automaton needs at least one state",
            )));
        }
        for state in &states {
            validate_name(&state.name)?;
            for edge in &state.edges {
                if edge.transient && edge.stable {
                    return Err(SynthError::Parse(
                        ErrorInfo::new(
                            "edge-flags",
                            "an edge cannot require both transient and stable",
                        )
                        .with_context("state", state.name.clone()),
                    ));
                }
                if edge.target >= states.len() {
                    return Err(SynthError::Parse(
                        ErrorInfo::new("edge-target", "edge leads to a state that does not exist")
                            .with_context("state", state.name.clone())
                            .with_context("target", edge.target.to_string()),
                    ));
                }
            }
        }
        if !states.iter().any(|state| state.is_final) {
            return Err(SynthError::Parse(ErrorInfo::new(
                "automaton-no-final",
                "the property automaton has no final state",
            )));
        }
        Ok(Self {
            kind: if finite {
                PropertyKind::Reachability
            } else {
                PropertyKind::Automaton
            },
            states,
            min_acc: 0,
            max_acc: None,
            experiment,
        })
    }

    /// Unrolls an ordered time series of measurement guards into the
    /// implicit automaton: state `k` loops on `!φ_k` and steps on `φ_k`,
    /// the state behind the last measurement is final and has no edges.
    pub fn time_series(
        measurements: Vec<Formula>,
        min_acc: usize,
        max_acc: Option<usize>,
        experiment: Option<Formula>,
    ) -> Result<Self, SynthError> {
        if measurements.is_empty() {
            return Err(SynthError::Parse(ErrorInfo::new(
                "series-empty",
                "a time series needs at least one measurement",
            )));
        }
        if let Some(max_acc) = max_acc {
            if min_acc > max_acc {
                return Err(SynthError::Parse(
                    ErrorInfo::new("series-bounds", "min_acc exceeds max_acc")
                        .with_context("min_acc", min_acc.to_string())
                        .with_context("max_acc", max_acc.to_string()),
                ));
            }
        }
        let count = measurements.len();
        let mut states: Vec<PropertyState> = measurements
            .into_iter()
            .enumerate()
            .map(|(index, guard)| PropertyState {
                name: format!("mes_{index}"),
                is_final: false,
                edges: vec![
                    PropertyEdge {
                        target: index + 1,
                        guard: guard.clone(),
                        transient: false,
                        stable: false,
                    },
                    PropertyEdge {
                        target: index,
                        guard: guard.negated(),
                        transient: false,
                        stable: false,
                    },
                ],
            })
            .collect();
        states.push(PropertyState {
            name: format!("mes_{count}"),
            is_final: true,
            edges: Vec::new(),
        });
        Ok(Self {
            kind: PropertyKind::TimeSeries,
            states,
            min_acc,
            max_acc,
            experiment,
        })
    }

    /// Flavour of the property.
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// Number of automaton states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// One automaton state.
    pub fn state(&self, id: StateId) -> &PropertyState {
        &self.states[id]
    }

    /// True if the state accepts.
    pub fn is_final(&self, id: StateId) -> bool {
        self.states[id].is_final
    }

    /// Outgoing edges of a state.
    pub fn edges(&self, id: StateId) -> &[PropertyEdge] {
        &self.states[id].edges
    }

    /// Minimal accepted path length (time-series mode).
    pub fn min_acc(&self) -> usize {
        self.min_acc
    }

    /// Maximal accepted path length (time-series mode).
    pub fn max_acc(&self) -> Option<usize> {
        self.max_acc
    }

    /// Predicate restricting the allowed network states, if any.
    pub fn experiment(&self) -> Option<&Formula> {
        self.experiment.as_ref()
    }

    /// Resolves a state reference given by name or by decimal index.
    pub fn find_state(&self, key: &str) -> Option<StateId> {
        if let Ok(index) = key.parse::<usize>() {
            return (index < self.states.len()).then_some(index);
        }
        self.states.iter().position(|state| state.name == key)
    }
}
