//! Word-level openness tests for transitions.
//!
//! A transition is open for a parametrization when the target level its
//! acting entry selects passes the strict comparison against the source
//! level. The batch-wise mask is assembled from runs of consecutive
//! parametrizations that share the selected target, so no per-bit loop is
//! needed.

use grn_core::{ParamNo, Paramset, StateId};
use grn_graph::{Product, TransConst, Uts};

/// True if the transition is open for the given parametrization.
pub fn is_open(param_no: ParamNo, cons: &TransConst) -> bool {
    let index = (param_no / cons.step_size) % cons.targets.len() as ParamNo;
    open_value(cons, cons.targets[index as usize])
}

fn open_value(cons: &TransConst, target: grn_core::ActLevel) -> bool {
    if cons.req_dir {
        target > cons.comp_value
    } else {
        target < cons.comp_value
    }
}

/// Mask of the parametrizations in `[first, last)` for which the transition
/// is open, batch-aligned MSB first.
pub fn open_mask(first: ParamNo, last: ParamNo, cons: &TransConst) -> Paramset {
    debug_assert!(last > first);
    debug_assert!((last - first) as usize <= Paramset::WIDTH);
    let len = cons.targets.len() as ParamNo;
    let mut mask: u64 = 0;
    let mut param = first;
    while param < last {
        let value_index = ((param / cons.step_size) % len) as usize;
        let left_in_value = cons.step_size - param % cons.step_size;
        let chunk = left_in_value.min(last - param) as usize;
        mask = if chunk == Paramset::WIDTH {
            0
        } else {
            mask << chunk
        };
        if open_value(cons, cons.targets[value_index]) {
            mask |= u64::MAX >> (Paramset::WIDTH - chunk);
        }
        param += chunk as ParamNo;
    }
    let width = (last - first) as usize;
    if width < Paramset::WIDTH {
        mask <<= Paramset::WIDTH - width;
    }
    Paramset::from_raw(mask)
}

/// Mask of the parametrizations in `[first, last)` that loop in the given
/// network state, i.e. have no open outgoing transition there.
pub fn loop_mask(uts: &Uts, uts_id: StateId, first: ParamNo, last: ParamNo) -> Paramset {
    let mut open = Paramset::EMPTY;
    for transition in uts.transitions(uts_id) {
        open |= open_mask(first, last, &transition.cons);
    }
    Paramset::left_ones((last - first) as usize).minus(open)
}

/// Successor product states a single parametrization can step to: the open
/// moving transitions, or the stationary successors when the
/// parametrization loops in the network state.
pub fn successors(product: &Product, id: StateId, param_no: ParamNo) -> Vec<StateId> {
    let uts_id = product.uts_id(id);
    let loops = product
        .uts()
        .transitions(uts_id)
        .iter()
        .all(|transition| !is_open(param_no, &transition.cons));
    if loops {
        return product.stationary(id).to_vec();
    }
    product
        .transitions(id)
        .iter()
        .filter(|transition| is_open(param_no, product.trans_const(id, transition)))
        .map(|transition| transition.target)
        .collect()
}

/// Number of network transitions open for the parametrization in the
/// network state underlying a product state.
pub fn open_exits(product: &Product, id: StateId, param_no: ParamNo) -> usize {
    product
        .uts()
        .transitions(product.uts_id(id))
        .iter()
        .filter(|transition| is_open(param_no, &transition.cons))
        .count()
}
