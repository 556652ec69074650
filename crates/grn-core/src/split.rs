//! Division of the parametrization space into word-sized batches.
//!
//! The space of `N` parametrizations is cut into `ceil(N / WIDTH)` batches
//! of consecutive ordinal numbers. For a distributed run the batches are
//! interleaved over the workers so that worker `k` of `P` processes exactly
//! the batches whose index is congruent to `k - 1` modulo `P`.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, SynthError};
use crate::paramset::Paramset;
use crate::types::ParamNo;

/// One batch of consecutive parametrizations, `last` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Global index of the batch, shared by all workers.
    pub index: u64,
    /// First parametrization of the batch.
    pub first: ParamNo,
    /// One past the last parametrization of the batch.
    pub last: ParamNo,
}

impl Batch {
    /// Number of parametrizations in the batch, at most [`Paramset::WIDTH`].
    pub fn width(&self) -> usize {
        (self.last - self.first) as usize
    }

    /// Full starting mask of the batch; for a truncated final batch the
    /// padding bits stay low.
    pub fn starting_mask(&self) -> Paramset {
        Paramset::left_ones(self.width())
    }

    /// Decodes a batch-local bit index back to its parametrization number.
    pub fn param_of_bit(&self, bit: usize) -> ParamNo {
        debug_assert!(bit < self.width());
        self.first + bit as ParamNo
    }

    /// Truncates a mask read from an external source to the batch width.
    pub fn clamp(&self, mask: Paramset) -> Paramset {
        mask & self.starting_mask()
    }
}

/// Assigns the batches of a parametrization space to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSplitter {
    param_count: ParamNo,
    processes: u64,
    worker: u64,
}

impl BatchSplitter {
    /// Creates a splitter for `param_count` parametrizations shared by
    /// `processes` workers, of which this is the 1-based `worker`-th.
    pub fn new(param_count: ParamNo, processes: u64, worker: u64) -> Result<Self, SynthError> {
        if processes == 0 || worker == 0 || worker > processes {
            return Err(SynthError::Parse(
                ErrorInfo::new("worker-range", "worker index must lie in 1..=processes")
                    .with_context("processes", processes.to_string())
                    .with_context("worker", worker.to_string()),
            ));
        }
        Ok(Self {
            param_count,
            processes,
            worker,
        })
    }

    /// Total number of parametrizations over all workers.
    pub fn param_count(&self) -> ParamNo {
        self.param_count
    }

    /// Total number of batches over all workers.
    pub fn total_batches(&self) -> u64 {
        self.param_count.div_ceil(Paramset::WIDTH as u64)
    }

    /// Batches assigned to this worker, in ascending order.
    pub fn batches(&self) -> impl Iterator<Item = Batch> + '_ {
        let width = Paramset::WIDTH as u64;
        let count = self.param_count;
        ((self.worker - 1)..self.total_batches())
            .step_by(self.processes as usize)
            .map(move |index| {
                let first = index * width;
                Batch {
                    index,
                    first,
                    last: (first + width).min(count),
                }
            })
    }
}
