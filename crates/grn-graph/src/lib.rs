#![deny(missing_docs)]

//! State-space construction: the unparametrised transition system over
//! specie levels and its synchronous product with the property automaton.

pub mod product;
pub mod uts;

pub use product::{ProdState, ProdTransition, Product};
pub use uts::{TransConst, Uts, UtsState, UtsTransition};
