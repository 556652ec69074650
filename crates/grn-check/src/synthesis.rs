//! Per-batch synthesis driver: runs the checking procedure matching the
//! property flavour and analyses single accepted parametrizations.

use log::debug;
use serde::{Deserialize, Serialize};

use grn_core::{ParamNo, Paramset, StateId};
use grn_graph::Product;
use grn_model::PropertyKind;

use crate::checker::ModelChecker;
use crate::results::SynthesisResults;
use crate::robustness::RobustnessCompute;
use crate::settings::CheckerSettings;
use crate::storage::ColorStorage;
use crate::witness::{StateTransition, WitnessSearcher};

/// Outcome of checking one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Parametrizations of the batch satisfying the property.
    pub accepted: Paramset,
    /// Per-bit cost of the (first) reachability pass.
    pub cost: Vec<Option<usize>>,
    /// Accepted mask per final state, ascending by state id.
    pub finals: Vec<(StateId, Paramset)>,
}

/// Detail computed for a single accepted parametrization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamAnalysis {
    /// Length of a minimal witnessing path (reach plus cycle for the
    /// ω-regular mode).
    pub cost: usize,
    /// Witness transitions, reach phase before cycle phase.
    pub transitions: Vec<StateTransition>,
    /// Robustness of the acceptance.
    pub robustness: f64,
    /// Reaching probability per final state of the (last) analysis pass.
    pub final_markings: Vec<(StateId, f64)>,
}

/// Drives the checker, the witness searcher and the robustness computation
/// over one worker's batches.
pub struct SynthesisManager<'a> {
    product: &'a Product,
    storage: ColorStorage,
}

impl<'a> SynthesisManager<'a> {
    /// Creates a manager with storage sized for the product.
    pub fn new(product: &'a Product) -> Self {
        Self {
            product,
            storage: ColorStorage::new(product.state_count()),
        }
    }

    /// Checks one batch and reports the accepted parametrizations.
    pub fn check_batch(
        &mut self,
        starting: Paramset,
        range: (ParamNo, ParamNo),
        bound: Option<usize>,
    ) -> BatchReport {
        if starting.none() {
            return BatchReport::default();
        }
        match self.product.kind() {
            PropertyKind::TimeSeries | PropertyKind::Reachability => {
                self.check_single_pass(starting, range, bound)
            }
            PropertyKind::Automaton => self.check_with_cycles(starting, range, bound),
        }
    }

    /// Single forward pass; covers the time-series and the finite
    /// acceptance modes.
    fn check_single_pass(
        &mut self,
        starting: Paramset,
        range: (ParamNo, ParamNo),
        bound: Option<usize>,
    ) -> BatchReport {
        let checker = ModelChecker::new(self.product);
        let settings = CheckerSettings {
            minimal: true,
            mark_initials: true,
            starting,
            range,
            bfs_bound: merge_bounds(bound, self.product.property().max_acc()),
            ..CheckerSettings::default()
        };
        self.storage.reset();
        let results = checker.conduct_check(&settings, &mut self.storage);

        let mut accepted = results.accepted;
        let min_acc = self.product.property().min_acc();
        if min_acc > 0 {
            for (bit, cost) in results.cost.iter().enumerate() {
                if matches!(cost, Some(cost) if *cost < min_acc) {
                    accepted = accepted.minus(Paramset::single(bit));
                }
            }
        }

        let finals = self
            .product
            .final_states()
            .iter()
            .map(|&f| (f, self.storage.color(f) & accepted))
            .filter(|(_, mask)| mask.any())
            .collect();
        BatchReport {
            accepted,
            cost: results.cost,
            finals,
        }
    }

    /// Two-phase ω-regular check: forward coloring to the fixpoint, then a
    /// cycle detection from every coloured final state.
    fn check_with_cycles(
        &mut self,
        starting: Paramset,
        range: (ParamNo, ParamNo),
        bound: Option<usize>,
    ) -> BatchReport {
        let checker = ModelChecker::new(self.product);
        let forward = CheckerSettings {
            minimal: false,
            starting,
            range,
            bfs_bound: bound,
            ..CheckerSettings::default()
        };
        self.storage.reset();
        let results = checker.conduct_check(&forward, &mut self.storage);

        let reached: Vec<(StateId, Paramset)> = self
            .product
            .final_states()
            .iter()
            .map(|&f| (f, self.storage.color(f) & starting))
            .filter(|(_, mask)| mask.any())
            .collect();

        let mut accepted = Paramset::EMPTY;
        let mut finals = Vec::new();
        for (f, colored) in reached {
            let cycle = CheckerSettings {
                initial_states: vec![f],
                final_states: vec![f],
                minimal: true,
                seed_only: true,
                starting: colored,
                range,
                bfs_bound: bound,
                ..CheckerSettings::default()
            };
            self.storage.reset();
            let cycled = checker.conduct_check(&cycle, &mut self.storage);
            if cycled.accepted.any() {
                accepted |= cycled.accepted;
                finals.push((f, cycled.accepted));
            }
        }
        debug!(
            "cycle detection accepted {} of {} forward-reaching bits",
            accepted.count(),
            results.accepted.count()
        );
        BatchReport {
            accepted,
            cost: results.cost,
            finals,
        }
    }

    /// Recovers witness transitions and robustness for one accepted bit of
    /// the batch. `final_hint` picks the accepting final state in the
    /// ω-regular mode.
    pub fn analyse(
        &mut self,
        range: (ParamNo, ParamNo),
        bit: usize,
        final_hint: Option<StateId>,
        bound: Option<usize>,
    ) -> Option<ParamAnalysis> {
        let mask = Paramset::single(bit);
        let param_no = range.0 + bit as ParamNo;
        match self.product.kind() {
            PropertyKind::TimeSeries | PropertyKind::Reachability => {
                let settings = CheckerSettings {
                    minimal: true,
                    mark_initials: true,
                    param_no,
                    starting: mask,
                    range,
                    bfs_bound: merge_bounds(bound, self.product.property().max_acc()),
                    ..CheckerSettings::default()
                };
                let (results, transitions, robustness, final_markings) =
                    self.run_analysis(&settings)?;
                Some(ParamAnalysis {
                    cost: results.lower_bound.unwrap_or(0),
                    transitions,
                    robustness,
                    final_markings,
                })
            }
            PropertyKind::Automaton => {
                let f = final_hint?;
                let reach = CheckerSettings {
                    final_states: vec![f],
                    minimal: true,
                    mark_initials: true,
                    param_no,
                    starting: mask,
                    range,
                    bfs_bound: bound,
                    ..CheckerSettings::default()
                };
                let (reach_results, mut transitions, reach_robustness, _) =
                    self.run_analysis(&reach)?;
                let cycle = CheckerSettings {
                    initial_states: vec![f],
                    final_states: vec![f],
                    minimal: true,
                    seed_only: true,
                    param_no,
                    starting: mask,
                    range,
                    bfs_bound: bound,
                    ..CheckerSettings::default()
                };
                let (cycle_results, cycle_transitions, cycle_robustness, final_markings) =
                    self.run_analysis(&cycle)?;
                for edge in cycle_transitions {
                    if !transitions.contains(&edge) {
                        transitions.push(edge);
                    }
                }
                Some(ParamAnalysis {
                    cost: reach_results.lower_bound.unwrap_or(0)
                        + cycle_results.lower_bound.unwrap_or(0),
                    transitions,
                    robustness: reach_robustness * cycle_robustness,
                    final_markings,
                })
            }
        }
    }

    /// Renders witness transitions for the output stream.
    pub fn render_witness(&self, transitions: &[StateTransition], long: bool) -> String {
        WitnessSearcher::new(self.product).render(transitions, long)
    }

    fn run_analysis(
        &mut self,
        settings: &CheckerSettings,
    ) -> Option<(
        SynthesisResults,
        Vec<StateTransition>,
        f64,
        Vec<(StateId, f64)>,
    )> {
        let checker = ModelChecker::new(self.product);
        self.storage.reset();
        let results = checker.conduct_check(settings, &mut self.storage);
        if !results.is_accepting() {
            return None;
        }
        let transitions =
            WitnessSearcher::new(self.product).find_witnesses(&results, settings, &self.storage);
        let robustness = RobustnessCompute::new(self.product);
        let total = robustness.compute(&results, &transitions, settings);
        let final_markings = robustness.final_markings(&results, &transitions, settings);
        Some((results, transitions, total, final_markings))
    }
}

fn merge_bounds(bound: Option<usize>, max_acc: Option<usize>) -> Option<usize> {
    match (bound, max_acc) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
