//! Error types for probability tables and networks.
//!
//! Every failure is a precondition violation detected eagerly, either while a
//! table or network is being built or while a query is evaluated.

use thiserror::Error;

/// Top-level error type for bayestable.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Distribution {table} has no label named '{label}'")]
    NameResolution { table: String, label: String },

    #[error("Conditional probability is undefined: evidence {evidence} has probability zero")]
    DivisionByZero { evidence: String },

    #[error("Enumeration over {tables} tables overflows the number of combinations")]
    EnumerationTooLarge { tables: usize },

    #[error("Unknown scenario '{0}'")]
    UnknownScenario(String),

    #[error("Invalid network definition: {0}")]
    Definition(String),

    #[error("Failed to read network definition {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed network definition JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Violations found while building a distribution or a network.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("Label '{0}' is declared more than once")]
    DuplicateLabel(String),

    #[error("A dependent table needs at least one row")]
    EmptyRows,

    #[error("Need one label for each probability: labels {labels:?}, probabilities {probabilities:?}")]
    LabelCountMismatch {
        labels: Vec<String>,
        probabilities: Vec<f64>,
    },

    #[error("Need the same number of probabilities for each row, found lengths {lengths:?}")]
    RaggedRows { lengths: Vec<usize> },

    #[error("Needs consistent numbers of references to other tables: mixed single and tuple keys")]
    MixedKeyShapes,

    #[error("All references for a row need to point to different tables: {row}")]
    RepeatedDependency { row: String },

    #[error("Missing keys of table {table}, only have {found}, expecting {expected}")]
    IncompleteDependency {
        table: String,
        found: String,
        expected: String,
    },

    #[error("Probability tables need to sum to (almost) 1: {context} sums to {sum}")]
    NotNormalized { context: String, sum: f64 },

    #[error("References to other tables need to be a full product of their labels: missing {missing}, unexpected {unexpected}")]
    IncompleteCrossProduct { missing: String, unexpected: String },

    #[error("Combination {0} has more than one row")]
    DuplicateCombination(String),

    #[error("Need all probabilities to be finite numbers in [0, 1], got {value} for {context}")]
    InvalidProbability { context: String, value: f64 },

    #[error("Invalid distribution name '{0}': names must be non-empty and must not contain '.'")]
    InvalidName(String),

    #[error("Distribution name '{0}' is used more than once")]
    DuplicateName(String),

    #[error("Distribution '{name}' is already attached to a network as '{existing}'")]
    AlreadyAttached { name: String, existing: String },

    #[error("Distribution '{table}' depends on a table that is not a member of the network: {dependency}")]
    UnknownDependency { table: String, dependency: String },

    #[error("Dependencies form a cycle through {0:?}")]
    Cycle(Vec<String>),
}

/// Violations found while looking a probability up.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Need the full set of keys to get a probability: expected {expected}, got {found} ({keys})")]
    IncompleteKeys {
        expected: usize,
        found: usize,
        keys: String,
    },

    #[error("Does not contain exactly one key to self ({table}): {keys}")]
    MissingSelfKey { table: String, keys: String },

    #[error("No probability stored for {0}")]
    UnknownCombination(String),

    #[error("Reference {0} does not belong to a distribution of this network")]
    ForeignReference(String),

    #[error("Unknown distribution '{0}'")]
    UnknownDistribution(String),

    #[error("Malformed reference path '{0}', expected 'table.label'")]
    MalformedPath(String),
}

pub type Result<T> = std::result::Result<T, NetworkError>;
