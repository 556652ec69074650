//! Cross-checks the word-level BFS against a scalar reference that walks
//! the product one parametrization at a time.

use std::collections::BTreeSet;

use grn_core::{ParamNo, Paramset};
use grn_graph::{Product, Uts};
use grn_model::ModelDoc;

use grn_check::{coloring, SynthesisManager};

fn build(doc: &str) -> Product {
    let model = ModelDoc::from_json(doc).unwrap().compile().unwrap();
    let uts = Uts::build(&model.network, &model.kinetics, model.property.experiment()).unwrap();
    Product::build(uts, model.property).unwrap()
}

/// Scalar reachability: can `param_no` walk from an initial to a final
/// product state, counting an initial∩final state as depth 0?
fn reaches_final(product: &Product, param_no: ParamNo) -> bool {
    let mut seen = BTreeSet::new();
    let mut frontier: Vec<usize> = product.initial_states().to_vec();
    if frontier.iter().any(|&id| product.is_final(id)) {
        return true;
    }
    seen.extend(frontier.iter().copied());
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for &id in &frontier {
            for succ in coloring::successors(product, id, param_no) {
                if seen.insert(succ) {
                    if product.is_final(succ) {
                        return true;
                    }
                    next.push(succ);
                }
            }
        }
        frontier = next;
    }
    false
}

/// Scalar cycle acceptance: forward reachability, then a return walk from
/// every reachable final state to itself through at least one step.
fn cycles_through_final(product: &Product, param_no: ParamNo) -> bool {
    let mut reachable = BTreeSet::new();
    let mut frontier: Vec<usize> = product.initial_states().to_vec();
    reachable.extend(frontier.iter().copied());
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for &id in &frontier {
            for succ in coloring::successors(product, id, param_no) {
                if reachable.insert(succ) {
                    next.push(succ);
                }
            }
        }
        frontier = next;
    }
    for &f in product.final_states() {
        if !reachable.contains(&f) {
            continue;
        }
        let mut seen = BTreeSet::new();
        let mut frontier = coloring::successors(product, f, param_no);
        if frontier.contains(&f) {
            return true;
        }
        seen.extend(frontier.iter().copied());
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for &id in &frontier {
                for succ in coloring::successors(product, id, param_no) {
                    if succ == f {
                        return true;
                    }
                    if seen.insert(succ) {
                        next.push(succ);
                    }
                }
            }
            frontier = next;
        }
    }
    false
}

const CIRCUIT_SERIES: &str = r#"{
  "network": {
    "species": [
      {
        "name": "cA",
        "max": 1,
        "regulations": [{ "source": "cB", "threshold": 1, "label": "+" }]
      },
      {
        "name": "cB",
        "max": 1,
        "regulations": [{ "source": "cA", "threshold": 1, "label": "+" }]
      }
    ]
  },
  "property": {
    "series": { "measurements": ["cA=0 & cB=0", "cA=1 & cB=1"] }
  }
}"#;

const NEGATIVE_CIRCUIT_BUCHI: &str = include_str!("../../../models/negative_circuit.json");

const THREE_LEVEL_REACH: &str = r#"{
  "network": {
    "species": [
      {
        "name": "cA",
        "max": 2,
        "regulations": [
          { "source": "cA", "threshold": 1, "label": "+" },
          { "source": "cB", "threshold": 1 }
        ]
      },
      {
        "name": "cB",
        "max": 1,
        "regulations": [{ "source": "cA", "threshold": 2, "label": "+" }]
      }
    ]
  },
  "property": {
    "automaton": {
      "finite": true,
      "states": [
        { "name": "st_seek",
          "edges": [
            { "target": "st_seek", "values": "!(cA>1 & cB>0)" },
            { "target": "st_goal", "values": "cA>1 & cB>0" }
          ] },
        { "name": "st_goal", "final": true }
      ]
    }
  }
}"#;

#[test]
fn word_level_and_scalar_reachability_agree() {
    for doc in [CIRCUIT_SERIES, THREE_LEVEL_REACH] {
        let product = build(doc);
        let mut manager = SynthesisManager::new(&product);
        let count = {
            let model = ModelDoc::from_json(doc).unwrap().compile().unwrap();
            model.kinetics.param_count()
        };
        let splitter = grn_core::BatchSplitter::new(count, 1, 1).unwrap();
        for batch in splitter.batches() {
            let report =
                manager.check_batch(batch.starting_mask(), (batch.first, batch.last), None);
            for bit in 0..batch.width() {
                let p = batch.param_of_bit(bit);
                assert_eq!(
                    report.accepted.contains(Paramset::single(bit)),
                    reaches_final(&product, p),
                    "parametrization {p}"
                );
            }
        }
    }
}

#[test]
fn word_level_and_scalar_cycle_detection_agree() {
    let product = build(NEGATIVE_CIRCUIT_BUCHI);
    let mut manager = SynthesisManager::new(&product);
    let report = manager.check_batch(Paramset::left_ones(16), (0, 16), None);
    for p in 0..16u64 {
        assert_eq!(
            report.accepted.contains(Paramset::single(p as usize)),
            cycles_through_final(&product, p),
            "parametrization {p}"
        );
    }
}

#[test]
fn narrowing_the_starting_mask_narrows_nothing_else() {
    let product = build(CIRCUIT_SERIES);
    let mut manager = SynthesisManager::new(&product);
    let full = manager.check_batch(Paramset::left_ones(16), (0, 16), None);
    let sub_mask = Paramset::single(1) | Paramset::single(6) | Paramset::single(9);
    let sub = manager.check_batch(sub_mask, (0, 16), None);
    assert_eq!(sub.accepted, full.accepted & sub_mask);
}
