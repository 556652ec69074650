use grn_core::ParamNo;
use grn_model::{Kinetics, ModelDoc, Network, RegLabel};

fn layered_network() -> Network {
    let mut network = Network::new();
    let a = network.add_specie("cA", 2, None).unwrap();
    let b = network.add_specie("cB", 1, None).unwrap();
    let c = network.add_specie("cC", 1, Some(vec![0, 1])).unwrap();
    network.add_regulation(a, b, 1, RegLabel::Activating).unwrap();
    network.add_regulation(a, b, 2, RegLabel::Activating).unwrap();
    network.add_regulation(b, c, 1, RegLabel::Inhibiting).unwrap();
    network.add_regulation(c, a, 1, RegLabel::Free).unwrap();
    network
}

#[test]
fn enumeration_is_stable_across_builds() {
    let network = layered_network();
    let specs = vec![Vec::new(), Vec::new(), Vec::new()];
    let first = Kinetics::build(&network, &specs).unwrap();
    let second = Kinetics::build(&network, &specs).unwrap();
    assert_eq!(first, second);
    for p in 0..first.param_count() {
        assert_eq!(first.color_string(p), second.color_string(p));
    }
}

#[test]
fn decoding_matches_the_mixed_radix_reference() {
    let network = layered_network();
    let kinetics = Kinetics::build(&network, &[Vec::new(), Vec::new(), Vec::new()]).unwrap();

    // reproduce the decomposition by hand: species in model order, entries
    // in context order, first entry varying fastest
    let mut radices = Vec::new();
    for specie in 0..network.specie_count() {
        for entry in &kinetics.specie(specie).entries {
            radices.push((specie, entry.targets.clone()));
        }
    }
    for p in 0..kinetics.param_count() {
        let mut rest: ParamNo = p;
        let mut entry_index = vec![0usize; network.specie_count()];
        for (specie, targets) in &radices {
            let pick = (rest % targets.len() as ParamNo) as usize;
            rest /= targets.len() as ParamNo;
            let entry = entry_index[*specie];
            assert_eq!(
                kinetics.target_of(*specie, entry, p),
                targets[pick],
                "parametrization {p}, specie {specie}, entry {entry}"
            );
            entry_index[*specie] += 1;
        }
    }
}

#[test]
fn specie_counts_multiply_to_the_space_size() {
    let network = layered_network();
    let kinetics = Kinetics::build(&network, &[Vec::new(), Vec::new(), Vec::new()]).unwrap();
    let product: ParamNo = (0..network.specie_count())
        .map(|specie| kinetics.specie(specie).count)
        .product();
    assert_eq!(product, kinetics.param_count());
    // cA: 2 contexts of 3 targets; cB: 3 contexts of 2; cC: 2 contexts of 2
    assert_eq!(kinetics.specie(0).count, 9);
    assert_eq!(kinetics.specie(1).count, 8);
    assert_eq!(kinetics.specie(2).count, 4);
}

#[test]
fn document_and_api_builds_agree() {
    let doc = ModelDoc::from_json(
        r#"{
          "network": {
            "species": [
              { "name": "cA", "max": 2 },
              {
                "name": "cB",
                "max": 1,
                "regulations": [
                  { "source": "cA", "threshold": 1, "label": "+" },
                  { "source": "cA", "threshold": 2, "label": "+" }
                ]
              },
              {
                "name": "cC",
                "max": 1,
                "basal": [0, 1],
                "regulations": [{ "source": "cB", "threshold": 1, "label": "-" }]
              }
            ]
          },
          "property": { "series": { "measurements": ["cB=1"] } }
        }"#,
    )
    .unwrap();
    let model = doc.compile().unwrap();
    assert_eq!(model.kinetics.specie(1).entries.len(), 3);
    assert_eq!(
        model.kinetics.specie(1).entries[2].context,
        "cA:2"
    );
    assert_eq!(model.kinetics.specie(2).entries[1].context, "cB:1");
}
