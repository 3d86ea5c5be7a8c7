pub mod factory;
pub mod sprinkler;
pub mod student;

pub use factory::ScenarioMakerFactory;
