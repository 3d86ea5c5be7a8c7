use std::collections::{HashMap, HashSet};

use log::{debug, info};

use crate::pgm::common::error::{ConstructionError, LookupError, NetworkError, Result};
use crate::pgm::common::setup::EnumerationMode;
use crate::pgm::model::distribution::Distribution;
use crate::pgm::model::reference::{format_references, Reference, TableId};

/// BayesianNetwork owns a fixed set of named distributions whose dependencies
/// form a directed acyclic graph.
///
/// Members are stored in topological order; among members that are ready at the
/// same time, declaration order wins. No distribution can be added afterwards.
pub struct BayesianNetwork {
    tables: Vec<Distribution>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<TableId, usize>,
    pub(crate) enumeration: EnumerationMode,
}

impl BayesianNetwork {
    /// Assembles a network from `(name, distribution)` members and names each one.
    pub fn new<N, I>(members: I) -> Result<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Distribution)>,
    {
        let members: Vec<(String, Distribution)> = members
            .into_iter()
            .map(|(name, table)| (name.into(), table))
            .collect();

        let mut names = HashSet::new();
        for (name, _) in &members {
            if name.is_empty() || name.contains('.') {
                return Err(ConstructionError::InvalidName(name.clone()).into());
            }
            if !names.insert(name.as_str()) {
                return Err(ConstructionError::DuplicateName(name.clone()).into());
            }
        }

        for (name, table) in &members {
            table.core().attach(name).map_err(|existing| {
                ConstructionError::AlreadyAttached {
                    name: name.clone(),
                    existing,
                }
            })?;
        }

        let declared: HashSet<TableId> = members.iter().map(|(_, table)| table.id()).collect();
        for (name, table) in &members {
            if let Some(missing) = table
                .dependencies()
                .iter()
                .find(|dependency| !declared.contains(&dependency.id))
            {
                return Err(ConstructionError::UnknownDependency {
                    table: name.clone(),
                    dependency: missing.display_name(),
                }
                .into());
            }
        }

        let tables = Self::topological_order(members)?;
        let by_name = tables
            .iter()
            .enumerate()
            .filter_map(|(position, table)| table.name().map(|name| (name.to_string(), position)))
            .collect();
        let by_id = tables
            .iter()
            .enumerate()
            .map(|(position, table)| (table.id(), position))
            .collect();

        let network = BayesianNetwork {
            tables,
            by_name,
            by_id,
            enumeration: EnumerationMode::Sequential,
        };
        info!(
            "Assembled network with {} distributions: {}",
            network.len(),
            network.names().join(", ")
        );
        Ok(network)
    }

    /// Repeatedly takes the first member whose dependencies are all placed.
    fn topological_order(members: Vec<(String, Distribution)>) -> Result<Vec<Distribution>> {
        let mut pending: Vec<Option<Distribution>> =
            members.into_iter().map(|(_, table)| Some(table)).collect();
        let mut placed: HashSet<TableId> = HashSet::new();
        let mut ordered = Vec::with_capacity(pending.len());

        while ordered.len() < pending.len() {
            let ready = pending.iter().position(|slot| {
                slot.as_ref().is_some_and(|table| {
                    table.dependency_ids().all(|dependency| placed.contains(&dependency))
                })
            });
            let Some(position) = ready else {
                let stuck = pending
                    .iter()
                    .flatten()
                    .map(|table| table.name().unwrap_or_default().to_string())
                    .collect();
                return Err(ConstructionError::Cycle(stuck).into());
            };
            if let Some(table) = pending[position].take() {
                placed.insert(table.id());
                ordered.push(table);
            }
        }
        Ok(ordered)
    }

    /// Selects how `joint_probability` enumerates combinations.
    pub fn with_enumeration(mut self, mode: EnumerationMode) -> Self {
        self.enumeration = mode;
        self
    }

    pub fn enumeration(&self) -> EnumerationMode {
        self.enumeration
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Member names in evaluation order.
    pub fn names(&self) -> Vec<&str> {
        self.tables.iter().filter_map(Distribution::name).collect()
    }

    /// Members in evaluation order: every distribution follows its dependencies.
    pub fn distributions(&self) -> impl Iterator<Item = &Distribution> {
        self.tables.iter()
    }

    pub fn distribution(&self, name: &str) -> Result<&Distribution> {
        self.by_name
            .get(name)
            .map(|position| &self.tables[*position])
            .ok_or_else(|| LookupError::UnknownDistribution(name.to_string()).into())
    }

    pub(crate) fn distribution_of(&self, reference: &Reference) -> Result<&Distribution> {
        self.by_id
            .get(&reference.table_id())
            .map(|position| &self.tables[*position])
            .ok_or_else(|| LookupError::ForeignReference(reference.to_string()).into())
    }

    /// Resolves a `table.label` path such as `grade.good`.
    pub fn reference(&self, path: &str) -> Result<Reference> {
        let (table, label) = path
            .split_once('.')
            .ok_or_else(|| NetworkError::from(LookupError::MalformedPath(path.to_string())))?;
        self.distribution(table)?.reference(label)
    }

    pub fn references<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<Reference>> {
        paths.iter().map(|path| self.reference(path.as_ref())).collect()
    }

    /// Fails on the first reference whose table is not a member.
    pub(crate) fn check_membership(&self, references: &[Reference]) -> Result<()> {
        for reference in references {
            self.distribution_of(reference)?;
        }
        Ok(())
    }

    /// Probability of an atomic event: the product of every member's table
    /// evaluated at the event's values.
    ///
    /// The event must name a value for every member distribution.
    pub fn probability_of_event(&self, event: &[Reference]) -> Result<f64> {
        self.check_membership(event)?;
        let result = self.event_product(event)?;
        debug!("P{} = {}", format_references(event), result);
        Ok(result)
    }

    pub(crate) fn event_product(&self, event: &[Reference]) -> Result<f64> {
        let mut result = 1.0;
        for table in &self.tables {
            let keys = table.suitable_subset(event);
            let factor = table.get(keys.iter().copied())?;
            debug!(
                "{} {} {}",
                table.name().unwrap_or_default(),
                format_references(keys.iter().copied()),
                factor
            );
            result *= factor;
        }
        Ok(result)
    }
}

impl std::fmt::Display for BayesianNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for table in &self.tables {
            writeln!(f, "{}", table)?;
        }
        Ok(())
    }
}
