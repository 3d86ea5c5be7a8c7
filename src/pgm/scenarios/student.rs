use crate::pgm::common::error::Result;
use crate::pgm::common::interface::ScenarioMaker;
use crate::pgm::inference::BayesianNetwork;
use crate::pgm::model::Distribution;

/// The student network: a student's intelligence and the course difficulty
/// drive the grade, intelligence drives the SAT score, and the grade drives the
/// quality of the recommendation letter.
pub fn build_network() -> Result<BayesianNetwork> {
    let difficulty = Distribution::independent([("easy", 0.6), ("hard", 0.4)])?;
    let intelligence = Distribution::independent([("low", 0.7), ("high", 0.3)])?;

    let d = |label: &str| difficulty.reference(label);
    let i = |label: &str| intelligence.reference(label);

    let sat = Distribution::dependent(
        &["bad", "good"],
        [
            (i("low")?, [0.95, 0.05]),
            (i("high")?, [0.2, 0.8]),
        ],
    )?;

    let grade = Distribution::dependent(
        &["good", "ok", "bad"],
        [
            ([i("low")?, d("easy")?], [0.3, 0.4, 0.3]),
            ([i("low")?, d("hard")?], [0.05, 0.25, 0.7]),
            ([i("high")?, d("easy")?], [0.9, 0.08, 0.02]),
            ([i("high")?, d("hard")?], [0.5, 0.3, 0.2]),
        ],
    )?;

    let g = |label: &str| grade.reference(label);
    let letter = Distribution::dependent(
        &["bad", "glowing"],
        [
            (g("good")?, [0.1, 0.9]),
            (g("ok")?, [0.4, 0.6]),
            (g("bad")?, [0.99, 0.01]),
        ],
    )?;

    BayesianNetwork::new([
        ("difficulty", difficulty),
        ("intelligence", intelligence),
        ("sat", sat),
        ("grade", grade),
        ("letter", letter),
    ])
}

pub struct Student {}

impl ScenarioMaker for Student {
    fn name(&self) -> &'static str {
        "student"
    }

    fn build_network(&self) -> Result<BayesianNetwork> {
        build_network()
    }
}
