#![deny(missing_docs)]

//! Symbolic parameter synthesis over the product structure: the
//! batch-parallel BFS model checker, the witness searcher and the
//! robustness computation, glued together by the per-batch synthesis
//! manager.

pub mod checker;
pub mod coloring;
pub mod results;
pub mod robustness;
pub mod settings;
pub mod storage;
pub mod synthesis;
pub mod witness;

pub use checker::ModelChecker;
pub use results::SynthesisResults;
pub use robustness::RobustnessCompute;
pub use settings::CheckerSettings;
pub use storage::ColorStorage;
pub use synthesis::{BatchReport, ParamAnalysis, SynthesisManager};
pub use witness::{StateTransition, WitnessSearcher};
