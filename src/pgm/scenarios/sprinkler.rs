use crate::pgm::common::error::Result;
use crate::pgm::common::interface::ScenarioMaker;
use crate::pgm::inference::BayesianNetwork;
use crate::pgm::model::Distribution;

/// Rain makes the sprinkler less likely to run; either one wets the grass.
pub fn build_network() -> Result<BayesianNetwork> {
    let rain = Distribution::independent([("no", 0.8), ("yes", 0.2)])?;
    let r = |label: &str| rain.reference(label);

    let sprinkler = Distribution::dependent(
        &["off", "on"],
        [(r("no")?, [0.6, 0.4]), (r("yes")?, [0.99, 0.01])],
    )?;
    let s = |label: &str| sprinkler.reference(label);

    let grass = Distribution::dependent(
        &["dry", "wet"],
        [
            ([s("off")?, r("no")?], [1.0, 0.0]),
            ([s("off")?, r("yes")?], [0.2, 0.8]),
            ([s("on")?, r("no")?], [0.1, 0.9]),
            ([s("on")?, r("yes")?], [0.01, 0.99]),
        ],
    )?;

    BayesianNetwork::new([("rain", rain), ("sprinkler", sprinkler), ("grass", grass)])
}

pub struct Sprinkler {}

impl ScenarioMaker for Sprinkler {
    fn name(&self) -> &'static str {
        "sprinkler"
    }

    fn build_network(&self) -> Result<BayesianNetwork> {
        build_network()
    }
}
