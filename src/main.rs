use anyhow::{bail, Context, Result};
use bayestable::pgm::common::interface::ScenarioMaker;
use bayestable::pgm::common::setup::{parse_configuration_options, CommandLineOptions};
use bayestable::pgm::model::reference::format_references;
use bayestable::pgm::scenarios::ScenarioMakerFactory;
use bayestable::pgm::{print_heading, print_result, print_warning};
use bayestable::{BayesianNetwork, NetworkDefinition};
use log::info;

fn load_network(config: &CommandLineOptions) -> Result<BayesianNetwork> {
    let network = match (&config.network_file, &config.scenario_name) {
        (Some(path), _) => NetworkDefinition::from_file(path)?
            .build()
            .with_context(|| format!("Failed to build network from {}", path))?,
        (None, Some(name)) => ScenarioMakerFactory::new_shared(name)?
            .build_network()
            .with_context(|| format!("Failed to build scenario {}", name))?,
        (None, None) => bail!(
            "Either --network_file or --scenario_name is required (scenarios: {})",
            ScenarioMakerFactory::names().join(", ")
        ),
    };
    Ok(network.with_enumeration(config.enumeration))
}

fn main() -> Result<()> {
    let config = parse_configuration_options();
    info!("Options: {:?}", config);

    let network = load_network(&config)?;

    if config.print_tables {
        print_heading!("Tables");
        for table in network.distributions() {
            println!("{}", table);
        }
    }

    if config.dump_definition {
        println!("{}", network.to_definition()?.to_json()?);
    }

    if config.query.is_empty() {
        if !config.print_tables && !config.dump_definition {
            print_warning!("Nothing to evaluate: pass --query TABLE.LABEL");
        }
        return Ok(());
    }

    let query = network.references(&config.query)?;
    let given = network.references(&config.given)?;

    if config.event {
        let p = network.probability_of_event(&query)?;
        print_result!("P{} = {}", format_references(&query), p);
    } else if given.is_empty() {
        let p = network.joint_probability(&query)?;
        print_result!("P{} = {}", format_references(&query), p);
    } else {
        let p = network.conditional_probability(&query, &given)?;
        print_result!(
            "P{} | {} = {}",
            format_references(&query),
            format_references(&given),
            p
        );
    }

    Ok(())
}
