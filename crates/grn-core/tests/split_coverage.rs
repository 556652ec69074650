use grn_core::{BatchSplitter, ParamNo, Paramset};
use proptest::prelude::*;

proptest! {
    #[test]
    fn workers_cover_the_space_exactly_once(
        param_count in 0u64..5_000,
        processes in 1u64..6,
    ) {
        let mut covered: Vec<bool> = vec![false; param_count as usize];
        for worker in 1..=processes {
            let splitter = BatchSplitter::new(param_count, processes, worker).unwrap();
            for batch in splitter.batches() {
                prop_assert!(batch.width() >= 1);
                prop_assert!(batch.width() <= Paramset::WIDTH);
                prop_assert_eq!(batch.starting_mask().count(), batch.width());
                for bit in 0..batch.width() {
                    let param: ParamNo = batch.param_of_bit(bit);
                    prop_assert!(!covered[param as usize], "parametrization covered twice");
                    covered[param as usize] = true;
                }
            }
        }
        prop_assert!(covered.into_iter().all(|seen| seen));
    }
}

#[test]
fn rejects_worker_outside_process_range() {
    assert!(BatchSplitter::new(10, 2, 0).is_err());
    assert!(BatchSplitter::new(10, 2, 3).is_err());
    assert!(BatchSplitter::new(10, 0, 1).is_err());
}

#[test]
fn empty_space_yields_no_batches() {
    let splitter = BatchSplitter::new(0, 1, 1).unwrap();
    assert_eq!(splitter.total_batches(), 0);
    assert_eq!(splitter.batches().count(), 0);
}
