#[macro_use]
pub mod pgm;

pub use pgm::{BayesianNetwork, Distribution, NetworkDefinition, NetworkError, Reference};
