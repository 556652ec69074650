/// Index of a specie within the network, in model order.
pub type SpecieId = usize;

/// Index of a state of a transition system, an automaton or their product.
pub type StateId = usize;

/// Ordinal number of a parametrization within the whole parametrization space.
pub type ParamNo = u64;

/// Activation level of a single specie.
pub type ActLevel = u16;

/// Activation levels of all species, one entry per specie in model order.
pub type Levels = Vec<ActLevel>;
