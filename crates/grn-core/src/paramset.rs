//! Word-sized bitmask over a batch of consecutive parametrizations.
//!
//! Within a batch the parametrizations are ordered from the left: the k-th
//! parametrization of the batch occupies bit `WIDTH - 1 - k`. A batch
//! narrower than the word keeps its padding bits forced low.

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not, Shl, Shr};

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, SynthError};

/// Bitmask over one batch of parametrizations.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Paramset(u64);

impl Paramset {
    /// Number of parametrizations a single batch can hold.
    pub const WIDTH: usize = u64::BITS as usize;

    /// The empty set.
    pub const EMPTY: Self = Paramset(0);

    /// The set holding every parametrization of a full-width batch.
    pub const FULL: Self = Paramset(u64::MAX);

    /// Creates a set from its raw word representation.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw word representation of the set.
    pub fn as_raw(self) -> u64 {
        self.0
    }

    /// Mask with only the `index`-th parametrization of the batch set.
    ///
    /// # Panics
    /// Panics if `index >= WIDTH`; batch-local indices are bounded by
    /// construction.
    pub fn single(index: usize) -> Self {
        assert!(index < Self::WIDTH, "batch-local index out of range");
        Self(1u64 << (Self::WIDTH - 1 - index))
    }

    /// Mask with the `count` leftmost parametrizations set.
    pub fn left_ones(count: usize) -> Self {
        assert!(count <= Self::WIDTH, "mask width out of range");
        if count == 0 {
            Self::EMPTY
        } else {
            Self(u64::MAX << (Self::WIDTH - count))
        }
    }

    /// Number of parametrizations in the set.
    pub fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    /// True if the set holds no parametrization.
    pub fn none(self) -> bool {
        self.0 == 0
    }

    /// True if the set holds at least one parametrization.
    pub fn any(self) -> bool {
        self.0 != 0
    }

    /// True if `other` is a subset of `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 | other.0 == self.0
    }

    /// Set difference.
    pub fn minus(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Reverses the order of the parametrizations, last becomes first.
    pub fn swap(self) -> Self {
        Self(self.0.reverse_bits())
    }

    /// Reverses the order within the `width` leftmost bits only; padding
    /// bits stay low.
    pub fn swap_within(self, width: usize) -> Self {
        assert!(width <= Self::WIDTH, "mask width out of range");
        if width == 0 {
            return Self::EMPTY;
        }
        Self(self.0.reverse_bits() << (Self::WIDTH - width))
    }

    /// Batch-local index of the single parametrization in the set, or `None`
    /// when the set does not hold exactly one.
    pub fn bit_pos(self) -> Option<usize> {
        if self.count() == 1 {
            Some(self.0.leading_zeros() as usize)
        } else {
            None
        }
    }

    /// Iterates over the batch-local indices of the set, ascending.
    pub fn iter_ones(self) -> impl Iterator<Item = usize> {
        let raw = self.0;
        (0..Self::WIDTH).filter(move |k| raw & (1u64 << (Self::WIDTH - 1 - k)) != 0)
    }

    /// Splits the set into single-parametrization masks, ascending.
    pub fn single_masks(self) -> Vec<Paramset> {
        self.iter_ones().map(Paramset::single).collect()
    }
}

impl BitOr for Paramset {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Paramset {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Paramset {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Paramset {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for Paramset {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl Shl<usize> for Paramset {
    type Output = Self;
    fn shl(self, shift: usize) -> Self {
        debug_assert!(shift <= Self::WIDTH);
        if shift == Self::WIDTH {
            Self::EMPTY
        } else {
            Self(self.0 << shift)
        }
    }
}

impl Shr<usize> for Paramset {
    type Output = Self;
    fn shr(self, shift: usize) -> Self {
        debug_assert!(shift <= Self::WIDTH);
        if shift == Self::WIDTH {
            Self::EMPTY
        } else {
            Self(self.0 >> shift)
        }
    }
}

/// One-off boot-time check that the platform realises the word operations
/// the checker relies on.
pub fn self_test() -> Result<(), SynthError> {
    let checks = [
        (Paramset::single(0).as_raw(), 1u64 << (Paramset::WIDTH - 1)),
        (Paramset::single(Paramset::WIDTH - 1).as_raw(), 1u64),
        (Paramset::left_ones(3).count() as u64, 3),
        (Paramset::left_ones(Paramset::WIDTH).as_raw(), u64::MAX),
        (Paramset::from_raw(0b1010).swap().swap().as_raw(), 0b1010),
        (
            Paramset::single(5).swap().as_raw(),
            Paramset::single(Paramset::WIDTH - 6).as_raw(),
        ),
    ];
    for (index, (got, want)) in checks.iter().enumerate() {
        if got != want {
            return Err(SynthError::MalformedBits(
                ErrorInfo::new("paramset-self-test", "platform bitmask operations are unsound")
                    .with_context("check", index.to_string())
                    .with_context("got", format!("{got:#x}"))
                    .with_context("want", format!("{want:#x}")),
            ));
        }
    }
    Ok(())
}
