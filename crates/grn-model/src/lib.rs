#![deny(missing_docs)]

//! Declarative model of a multi-valued Thomas network together with the
//! machinery that expands it: canonical regulatory contexts, the explicit
//! kinetic-parameter space with its stable lexicographic numbering, the
//! temporal property description and the serde document front-end.

pub mod context;
pub mod document;
pub mod formula;
pub mod kinetics;
pub mod network;
pub mod property;

pub use context::ContextSpace;
pub use document::{CompiledModel, ModelDoc};
pub use formula::{Cmp, Formula};
pub use kinetics::{Kinetics, ParamEntry, ParamSpec, ParamValue, SpecieKinetics};
pub use network::{validate_name, Network, RegLabel, Regulation};
pub use property::{Property, PropertyEdge, PropertyKind, PropertyState};
