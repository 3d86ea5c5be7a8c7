pub mod error;
pub mod interface;
#[macro_use]
pub mod logging;
pub mod setup;

// Re-export key types
pub use error::{ConstructionError, LookupError, NetworkError, Result};
pub use interface::ScenarioMaker;
pub use setup::EnumerationMode;
