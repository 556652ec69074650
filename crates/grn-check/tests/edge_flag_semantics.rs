use grn_core::Paramset;
use grn_graph::{Product, Uts};
use grn_model::ModelDoc;

use grn_check::SynthesisManager;

fn build(doc: &str) -> Product {
    let model = ModelDoc::from_json(doc).unwrap().compile().unwrap();
    let uts = Uts::build(&model.network, &model.kinetics, model.property.experiment()).unwrap();
    Product::build(uts, model.property).unwrap()
}

// one specie over {0,1} with full basal targets: parametrization 0 pins
// the level to 0, parametrization 1 drives it to 1

#[test]
fn stable_edges_accept_exactly_the_resting_parametrizations() {
    let product = build(
        r#"{
          "network": { "species": [{ "name": "cA", "max": 1 }] },
          "property": {
            "automaton": {
              "finite": true,
              "states": [
                { "name": "st_wait",
                  "edges": [{ "target": "st_done", "values": "cA=0", "stable": true }] },
                { "name": "st_done", "final": true }
              ]
            }
          }
        }"#,
    );
    let mut manager = SynthesisManager::new(&product);
    let report = manager.check_batch(Paramset::left_ones(2), (0, 2), None);
    // only the parametrization targeting 0 rests in the guard region
    assert_eq!(report.accepted, Paramset::single(0));
}

#[test]
fn transient_edges_accept_exactly_the_moving_parametrizations() {
    let product = build(
        r#"{
          "network": { "species": [{ "name": "cA", "max": 1 }] },
          "property": {
            "automaton": {
              "finite": true,
              "states": [
                { "name": "st_wait",
                  "edges": [{ "target": "st_done", "values": "cA=0", "transient": true }] },
                { "name": "st_done", "final": true }
              ]
            }
          }
        }"#,
    );
    let mut manager = SynthesisManager::new(&product);
    let report = manager.check_batch(Paramset::left_ones(2), (0, 2), None);
    // only the parametrization targeting 1 can leave the guard region
    assert_eq!(report.accepted, Paramset::single(1));
}

#[test]
fn unflagged_edges_take_both_kinds_of_steps() {
    let product = build(
        r#"{
          "network": { "species": [{ "name": "cA", "max": 1 }] },
          "property": {
            "automaton": {
              "finite": true,
              "states": [
                { "name": "st_wait",
                  "edges": [{ "target": "st_done", "values": "cA=0" }] },
                { "name": "st_done", "final": true }
              ]
            }
          }
        }"#,
    );
    let mut manager = SynthesisManager::new(&product);
    let report = manager.check_batch(Paramset::left_ones(2), (0, 2), None);
    assert_eq!(report.accepted, Paramset::left_ones(2));
}
