//! Summaries of a parsed model, its constructed state space and a
//! finished run.

use std::time::Duration;

use serde_json::{json, Value};

use grn_graph::Product;
use grn_model::CompiledModel;

use crate::orchestrator::{SynthOptions, SynthSummary};

/// Builds the JSON summary the `stats` subcommand prints.
pub fn stats_json(model: &CompiledModel, product: &Product) -> Value {
    let species: Vec<Value> = (0..model.network.specie_count())
        .map(|id| {
            let kinetics = model.kinetics.specie(id);
            json!({
                "name": model.network.name(id),
                "max": model.network.max_level(id),
                "regulators": model.network.regulators(id).len(),
                "contexts": kinetics.entries.len(),
                "parametrizations": kinetics.count,
            })
        })
        .collect();
    let transition_count: usize = (0..product.state_count())
        .map(|id| product.transitions(id).len())
        .sum();
    json!({
        "digest": model.digest,
        "species": species,
        "parametrization_space": model.kinetics.param_count(),
        "property": format!("{:?}", model.property.kind()),
        "automaton_states": model.property.state_count(),
        "uts_states": product.uts().state_count(),
        "product_states": product.state_count(),
        "product_transitions": transition_count,
        "initial_states": product.initial_states().len(),
        "final_states": product.final_states().len(),
    })
}

/// Builds the JSON report a `synth` run can write next to its result
/// stream.
pub fn run_json(
    model: &CompiledModel,
    options: &SynthOptions,
    summary: &SynthSummary,
    elapsed: Duration,
) -> Value {
    json!({
        "digest": model.digest,
        "parametrization_space": model.kinetics.param_count(),
        "worker": options.worker,
        "processes": options.processes,
        "batches": summary.batches,
        "examined": summary.examined,
        "accepted": summary.accepted,
        "elapsed_ms": elapsed.as_millis() as u64,
    })
}
