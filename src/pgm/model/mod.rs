pub mod definition;
pub mod distribution;
pub mod reference;

pub use definition::NetworkDefinition;
pub use distribution::{ConditioningKey, Distribution, Key};
pub use reference::{Reference, TableId};
