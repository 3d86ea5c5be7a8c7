use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use rayon::prelude::*;

use super::bayesian_network::BayesianNetwork;
use crate::pgm::common::error::{NetworkError, Result};
use crate::pgm::common::setup::EnumerationMode;
use crate::pgm::model::reference::{format_references, Reference, TableId};

/// The values each member may take during a marginalization, in evaluation order.
struct ChoiceSets {
    choices: Vec<Vec<Reference>>,
    combinations: usize,
}

impl ChoiceSets {
    /// Decodes combination `index` as a mixed-radix number, one digit per table.
    fn combination(&self, mut index: usize) -> Vec<Reference> {
        let mut event = Vec::with_capacity(self.choices.len());
        for choice in self.choices.iter().rev() {
            event.push(choice[index % choice.len()].clone());
            index /= choice.len();
        }
        event
    }
}

fn group_by_table(references: &[Reference]) -> BTreeMap<TableId, BTreeSet<Reference>> {
    let mut grouped: BTreeMap<TableId, BTreeSet<Reference>> = BTreeMap::new();
    for reference in references {
        grouped
            .entry(reference.table_id())
            .or_default()
            .insert(reference.clone());
    }
    grouped
}

/// Combines two events member by member. `None` when they cannot both hold.
fn intersect_events(query: &[Reference], given: &[Reference]) -> Option<Vec<Reference>> {
    let mut combined = group_by_table(given);
    for (table, values) in group_by_table(query) {
        match combined.entry(table) {
            Entry::Occupied(mut entry) => {
                let shared: BTreeSet<Reference> =
                    entry.get().intersection(&values).cloned().collect();
                if shared.is_empty() {
                    return None;
                }
                entry.insert(shared);
            }
            Entry::Vacant(entry) => {
                entry.insert(values);
            }
        }
    }
    Some(combined.into_values().flatten().collect())
}

impl BayesianNetwork {
    fn choice_sets(&self, evidence: &[Reference]) -> Result<ChoiceSets> {
        self.check_membership(evidence)?;

        let mut fixed = group_by_table(evidence);

        let choices: Vec<Vec<Reference>> = self
            .distributions()
            .map(|table| match fixed.remove(&table.id()) {
                Some(values) => values.into_iter().collect(),
                None => table.labels().to_vec(),
            })
            .collect();

        let combinations = choices
            .iter()
            .try_fold(1usize, |total, choice| total.checked_mul(choice.len()))
            .ok_or(NetworkError::EnumerationTooLarge {
                tables: choices.len(),
            })?;

        Ok(ChoiceSets {
            choices,
            combinations,
        })
    }

    /// Probability of the evidence with every unconstrained member marginalized out.
    ///
    /// Several values for the same member are treated as alternatives. Without
    /// evidence the result is 1.
    pub fn joint_probability(&self, evidence: &[Reference]) -> Result<f64> {
        let sets = self.choice_sets(evidence)?;
        let result = match self.enumeration {
            EnumerationMode::Sequential => (0..sets.combinations)
                .map(|index| self.event_product(&sets.combination(index)))
                .sum::<Result<f64>>()?,
            EnumerationMode::Parallel => (0..sets.combinations)
                .into_par_iter()
                .map(|index| self.event_product(&sets.combination(index)))
                .try_reduce(|| 0.0, |a, b| Ok(a + b))?,
        };
        debug!(
            "P{} = {} over {} combinations",
            format_references(evidence),
            result,
            sets.combinations
        );
        Ok(result)
    }

    /// `P(query | given) = P(query, given) / P(given)`.
    ///
    /// A member constrained by both sides keeps only the values they share.
    /// Fails with [`NetworkError::DivisionByZero`] when the evidence has
    /// probability zero.
    pub fn conditional_probability(&self, query: &[Reference], given: &[Reference]) -> Result<f64> {
        self.check_membership(query)?;
        let denominator = self.joint_probability(given)?;
        if denominator == 0.0 {
            return Err(NetworkError::DivisionByZero {
                evidence: format_references(given),
            });
        }
        let numerator = match intersect_events(query, given) {
            Some(both) => self.joint_probability(&both)?,
            None => 0.0,
        };
        let result = numerator / denominator;
        debug!(
            "P{} | {} = {}",
            format_references(query),
            format_references(given),
            result
        );
        Ok(result)
    }
}
