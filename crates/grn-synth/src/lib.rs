#![deny(missing_docs)]

//! Orchestration of a synthesis run: batches, starting-mask filters, the
//! result stream and the run summary.

pub mod filter;
pub mod orchestrator;
pub mod report;

pub use filter::{load_masks, MaskWriter};
pub use orchestrator::{synthesise, SynthOptions, SynthSummary};
