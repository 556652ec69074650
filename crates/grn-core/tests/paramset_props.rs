use grn_core::paramset::{self, Paramset};
use proptest::prelude::*;

#[test]
fn boot_self_test_passes() {
    paramset::self_test().unwrap();
}

#[test]
fn single_masks_enumerate_left_to_right() {
    let set = Paramset::single(0) | Paramset::single(3) | Paramset::single(63);
    let masks = set.single_masks();
    assert_eq!(masks.len(), 3);
    assert_eq!(masks[0].bit_pos(), Some(0));
    assert_eq!(masks[1].bit_pos(), Some(3));
    assert_eq!(masks[2].bit_pos(), Some(63));
}

#[test]
fn bit_pos_rejects_non_singletons() {
    assert_eq!(Paramset::EMPTY.bit_pos(), None);
    assert_eq!((Paramset::single(1) | Paramset::single(2)).bit_pos(), None);
}

proptest! {
    #[test]
    fn swap_is_an_involution(raw in any::<u64>()) {
        let set = Paramset::from_raw(raw);
        prop_assert_eq!(set.swap().swap(), set);
    }

    #[test]
    fn swap_within_is_an_involution_on_active_bits(raw in any::<u64>(), width in 0usize..=64) {
        let set = Paramset::from_raw(raw) & Paramset::left_ones(width);
        prop_assert_eq!(set.swap_within(width).swap_within(width), set);
    }

    #[test]
    fn shifts_move_population_or_drop_it(raw in any::<u64>(), shift in 0usize..=64) {
        let set = Paramset::from_raw(raw);
        prop_assert!((set << shift).count() <= set.count());
        prop_assert!((set >> shift).count() <= set.count());
        prop_assert_eq!((set << 0), set);
        prop_assert_eq!((set >> 64), Paramset::EMPTY);
    }

    #[test]
    fn swap_preserves_population(raw in any::<u64>()) {
        let set = Paramset::from_raw(raw);
        prop_assert_eq!(set.swap().count(), set.count());
    }

    #[test]
    fn left_ones_population_matches_width(width in 0usize..=64) {
        prop_assert_eq!(Paramset::left_ones(width).count(), width);
    }

    #[test]
    fn set_algebra_is_consistent(a in any::<u64>(), b in any::<u64>()) {
        let (a, b) = (Paramset::from_raw(a), Paramset::from_raw(b));
        prop_assert!((a | b).contains(a));
        prop_assert!((a | b).contains(b));
        prop_assert!(a.contains(a & b));
        prop_assert!((a.minus(b) & b).none());
        prop_assert_eq!(a.minus(b) | (a & b), a);
    }
}
