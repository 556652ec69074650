#![deny(missing_docs)]

//! Shared foundation of the GRN parameter-synthesis workspace: the error
//! surface, id aliases, the word-sized parametrization bitmask and the
//! division of the parametrization space into word-sized batches.

pub mod errors;
pub mod paramset;
pub mod split;
mod types;

pub use errors::{ErrorInfo, SynthError};
pub use paramset::Paramset;
pub use split::{Batch, BatchSplitter};
pub use types::{ActLevel, Levels, ParamNo, SpecieId, StateId};
