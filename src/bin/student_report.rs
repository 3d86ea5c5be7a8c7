use anyhow::Result;
use bayestable::pgm::common::logging::init_logging;
use bayestable::pgm::model::reference::format_references;
use bayestable::pgm::scenarios::student::build_network;
use bayestable::pgm::{print_heading, print_result, print_warning};

fn report(label: &str, value: f64, expected: f64, tolerance: f64) {
    if (value - expected).abs() < tolerance {
        print_result!("{} = {:.6} (expected: {})", label, value, expected);
    } else {
        print_warning!("{} = {:.6} (expected: {})", label, value, expected);
    }
}

fn main() -> Result<()> {
    init_logging("warn");
    let network = build_network()?;

    print_heading!("Student network");
    for table in network.distributions() {
        println!("{}", table);
    }

    print_heading!("Lookups");
    let high = network.reference("intelligence.high")?;
    let easy = network.reference("difficulty.easy")?;
    let good = network.reference("grade.good")?;
    let ok = network.reference("grade.ok")?;
    report("intelligence[high]", network.distribution("intelligence")?.get([&high])?, 0.3, 1e-12);
    report("difficulty[easy]", network.distribution("difficulty")?.get([&easy])?, 0.6, 1e-12);
    report("grade[ok, high, easy]", network.distribution("grade")?.get([&ok, &high, &easy])?, 0.08, 1e-12);

    print_heading!("Queries");
    let event = network.references(&[
        "intelligence.high",
        "difficulty.easy",
        "grade.ok",
        "letter.bad",
        "sat.good",
    ])?;
    report(
        &format!("P{}", format_references(&event)),
        network.probability_of_event(&event)?,
        0.004608,
        1e-6,
    );

    let glowing = network.reference("letter.glowing")?;
    let low = network.reference("intelligence.low")?;
    report("P(letter.glowing)", network.joint_probability(&[glowing.clone()])?, 0.502, 1e-3);
    report(
        "P(letter.glowing | intelligence.low)",
        network.conditional_probability(&[glowing], &[low])?,
        0.38,
        1e-2,
    );
    report(
        "P(intelligence.high | grade.good, difficulty.easy)",
        network.conditional_probability(&[high], &[good, easy])?,
        0.5625,
        1e-4,
    );

    Ok(())
}
