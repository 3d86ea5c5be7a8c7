use clap::{builder::EnumValueParser, Arg, ArgAction, Command, ValueEnum};
use serde::Deserialize;

use super::logging::init_logging;

/// How joint probabilities enumerate the cross product of free values.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, ValueEnum)]
pub enum EnumerationMode {
    /// One combination after the other on the calling thread.
    #[default]
    #[serde(rename = "sequential")]
    Sequential,

    /// Combinations are evaluated on the rayon thread pool and summed.
    #[serde(rename = "parallel")]
    Parallel,
}

/// What the user asked for on the command line.
/// Only plain data, so it can be cloned and passed around freely.
#[derive(Deserialize, Clone, Debug)]
pub struct CommandLineOptions {
    pub scenario_name: Option<String>,
    pub network_file: Option<String>,
    pub query: Vec<String>,
    pub given: Vec<String>,
    pub event: bool,
    pub print_tables: bool,
    pub dump_definition: bool,
    pub enumeration: EnumerationMode,
}

fn command() -> Command {
    Command::new("BAYESTABLE")
        .version("0.1")
        .about("Evaluates joint and conditional probabilities over discrete Bayesian networks.")
        .arg(
            Arg::new("scenario_name")
                .long("scenario_name")
                .value_name("STRING")
                .help("Built-in network to load: 'student' or 'sprinkler'")
                .conflicts_with("network_file"),
        )
        .arg(
            Arg::new("network_file")
                .long("network_file")
                .value_name("FILE")
                .help("JSON network definition to load"),
        )
        .arg(
            Arg::new("query")
                .long("query")
                .value_name("TABLE.LABEL")
                .help("Value whose probability is asked for (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("given")
                .long("given")
                .value_name("TABLE.LABEL")
                .help("Observed evidence for a conditional query (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("event")
                .long("event")
                .help("Treats the query as an atomic event naming every distribution")
                .action(ArgAction::SetTrue)
                .conflicts_with("given"),
        )
        .arg(
            Arg::new("print_tables")
                .long("print_tables")
                .help("Prints every probability table of the network")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dump_definition")
                .long("dump_definition")
                .help("Prints the network as a JSON definition")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("enumeration")
                .long("enumeration")
                .value_parser(EnumValueParser::<EnumerationMode>::new())
                .help("How to enumerate combinations: 'sequential' or 'parallel'")
                .default_value("sequential"),
        )
}

fn collect_values(matches: &clap::ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Parses options from `args`; the first item is the program name.
pub fn parse_options_from<I, T>(args: I) -> Result<CommandLineOptions, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;

    let enumeration = matches
        .get_one::<EnumerationMode>("enumeration")
        .copied()
        .unwrap_or_default();

    Ok(CommandLineOptions {
        scenario_name: matches.get_one::<String>("scenario_name").cloned(),
        network_file: matches.get_one::<String>("network_file").cloned(),
        query: collect_values(&matches, "query"),
        given: collect_values(&matches, "given"),
        event: matches.get_flag("event"),
        print_tables: matches.get_flag("print_tables"),
        dump_definition: matches.get_flag("dump_definition"),
        enumeration,
    })
}

/// Initializes logging and parses the process arguments, exiting on bad usage.
pub fn parse_configuration_options() -> CommandLineOptions {
    init_logging("info");
    parse_options_from(std::env::args_os()).unwrap_or_else(|error| error.exit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeatable_query_and_given() {
        let options = parse_options_from([
            "bayestable",
            "--scenario_name",
            "student",
            "--query",
            "letter.glowing",
            "--given",
            "intelligence.low",
            "--given",
            "difficulty.easy",
        ])
        .unwrap();

        assert_eq!(options.scenario_name.as_deref(), Some("student"));
        assert_eq!(options.query, vec!["letter.glowing"]);
        assert_eq!(options.given, vec!["intelligence.low", "difficulty.easy"]);
        assert_eq!(options.enumeration, EnumerationMode::Sequential);
        assert!(!options.event);
    }

    #[test]
    fn test_enumeration_mode_is_parsed() {
        let options =
            parse_options_from(["bayestable", "--enumeration", "parallel"]).unwrap();
        assert_eq!(options.enumeration, EnumerationMode::Parallel);
        assert!(parse_options_from(["bayestable", "--enumeration", "threads"]).is_err());
    }

    #[test]
    fn test_event_conflicts_with_given() {
        let result = parse_options_from([
            "bayestable",
            "--event",
            "--query",
            "sat.good",
            "--given",
            "intelligence.low",
        ]);
        assert!(result.is_err());
    }
}
