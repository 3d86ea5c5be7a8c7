use crate::pgm::common::error::Result;
use crate::pgm::inference::BayesianNetwork;

/// A named, fixed network that can be rebuilt on demand.
pub trait ScenarioMaker {
    fn name(&self) -> &'static str;

    fn build_network(&self) -> Result<BayesianNetwork>;
}
