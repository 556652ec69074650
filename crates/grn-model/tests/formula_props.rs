use grn_model::{Cmp, Formula, Network};
use proptest::prelude::*;

fn network() -> Network {
    let mut network = Network::new();
    network.add_specie("sp_a", 3, None).unwrap();
    network.add_specie("sp_b", 3, None).unwrap();
    network.add_specie("sp_c", 3, None).unwrap();
    network
}

fn atom_strategy() -> impl Strategy<Value = Formula> {
    (0usize..3, 0u16..=3, 0u8..3).prop_map(|(specie, value, op)| Formula::Atom {
        specie,
        cmp: match op {
            0 => Cmp::Lt,
            1 => Cmp::Eq,
            _ => Cmp::Gt,
        },
        value,
    })
}

fn formula_strategy() -> impl Strategy<Value = Formula> {
    let leaf = prop_oneof![
        Just(Formula::True),
        Just(Formula::False),
        atom_strategy(),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(Formula::negated),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Formula::And(Box::new(l), Box::new(r))),
            (inner.clone(), inner)
                .prop_map(|(l, r)| Formula::Or(Box::new(l), Box::new(r))),
        ]
    })
}

proptest! {
    #[test]
    fn rendering_and_parsing_are_inverse(formula in formula_strategy()) {
        let net = network();
        let rendered = formula.to_string();
        let parsed = Formula::parse(&rendered, &net).unwrap();
        prop_assert_eq!(parsed, formula);
    }

    #[test]
    fn parsed_guards_evaluate_like_their_source(
        formula in formula_strategy(),
        levels in proptest::collection::vec(0u16..=3, 3),
    ) {
        let net = network();
        let parsed = Formula::parse(&formula.to_string(), &net).unwrap();
        prop_assert_eq!(parsed.eval(&levels), formula.eval(&levels));
    }
}

#[test]
fn operator_precedence_binds_and_tighter() {
    let net = network();
    let formula = Formula::parse("sp_a=1 | sp_b=1 & sp_c=1", &net).unwrap();
    assert!(formula.eval(&[1, 0, 0]));
    assert!(!formula.eval(&[0, 1, 0]));
    assert!(formula.eval(&[0, 1, 1]));
}
