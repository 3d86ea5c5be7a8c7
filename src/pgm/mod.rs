pub mod common;
pub mod inference;
pub mod model;
pub mod scenarios;

// Re-export color printing macros
pub use crate::print_heading;
pub use crate::print_result;
pub use crate::print_warning;

/// Exports the main types for easy access
pub use common::error::{NetworkError, Result};
pub use inference::BayesianNetwork;
pub use model::{ConditioningKey, Distribution, Key, NetworkDefinition, Reference};
