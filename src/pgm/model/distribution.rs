use super::reference::{format_references, Reference, TableCore, TableId};
use crate::pgm::common::error::{ConstructionError, LookupError, NetworkError, Result};
use log::trace;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Tolerance for a probability row to count as normalized.
pub const EPSILON: f64 = 1e-8;

type Checked<T> = std::result::Result<T, ConstructionError>;

fn check_sums_to_one(probabilities: &[f64], context: impl FnOnce() -> String) -> Checked<()> {
    let sum: f64 = probabilities.iter().sum();
    if (1.0 - sum).abs() < EPSILON {
        Ok(())
    } else {
        Err(ConstructionError::NotNormalized {
            context: context(),
            sum,
        })
    }
}

fn check_probability(value: f64, context: impl FnOnce() -> String) -> Checked<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConstructionError::InvalidProbability {
            context: context(),
            value,
        })
    }
}

fn declare_labels<I>(labels: I) -> Checked<Vec<Arc<str>>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut declared = Vec::new();
    for label in labels {
        let label = label.as_ref();
        if !seen.insert(label.to_string()) {
            return Err(ConstructionError::DuplicateLabel(label.to_string()));
        }
        declared.push(Arc::from(label));
    }
    Ok(declared)
}

/// Every combination of one label per table, tables taken in the given order.
pub(crate) fn cross_product(tables: &[Arc<TableCore>]) -> Vec<Vec<Reference>> {
    let mut combinations = vec![Vec::new()];
    for table in tables {
        let mut extended = Vec::with_capacity(combinations.len() * table.labels.len());
        for prefix in &combinations {
            for label in &table.labels {
                let mut combination = prefix.clone();
                combination.push(Reference::new(table, label));
                extended.push(combination);
            }
        }
        combinations = extended;
    }
    combinations
}

/// The conditioning part of one row of a dependent table.
#[derive(Clone, Debug)]
pub enum ConditioningKey {
    /// A row of a table with exactly one dependency.
    Single(Reference),
    /// A row of a table with any number of dependencies.
    Tuple(Vec<Reference>),
}

impl ConditioningKey {
    fn is_single(&self) -> bool {
        matches!(self, ConditioningKey::Single(_))
    }

    fn into_references(self) -> Vec<Reference> {
        match self {
            ConditioningKey::Single(reference) => vec![reference],
            ConditioningKey::Tuple(references) => references,
        }
    }
}

impl From<Reference> for ConditioningKey {
    fn from(reference: Reference) -> Self {
        ConditioningKey::Single(reference)
    }
}

impl From<&Reference> for ConditioningKey {
    fn from(reference: &Reference) -> Self {
        ConditioningKey::Single(reference.clone())
    }
}

impl From<Vec<Reference>> for ConditioningKey {
    fn from(references: Vec<Reference>) -> Self {
        ConditioningKey::Tuple(references)
    }
}

impl<const N: usize> From<[Reference; N]> for ConditioningKey {
    fn from(references: [Reference; N]) -> Self {
        ConditioningKey::Tuple(references.into())
    }
}

/// A key accepted by [`Distribution::get`]: a reference, or one of the
/// distribution's own label names.
#[derive(Clone, Copy, Debug)]
pub enum Key<'a> {
    Reference(&'a Reference),
    Label(&'a str),
}

impl<'a> From<&'a Reference> for Key<'a> {
    fn from(reference: &'a Reference) -> Self {
        Key::Reference(reference)
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(label: &'a str) -> Self {
        Key::Label(label)
    }
}

impl<'a> From<&'a String> for Key<'a> {
    fn from(label: &'a String) -> Self {
        Key::Label(label)
    }
}

/// A discrete random variable with a (conditional) probability table.
///
/// Each stored probability is keyed by one reference per dependency plus exactly
/// one reference to an own label. Distributions are not `Clone`: a network takes
/// ownership of its members.
pub struct Distribution {
    core: Arc<TableCore>,
    labels: Vec<Reference>,
    by_name: HashMap<Arc<str>, Reference>,
    dependencies: Vec<Arc<TableCore>>,
    values: HashMap<BTreeSet<Reference>, f64>,
}

impl Distribution {
    /// Creates a distribution without dependencies from `(label, probability)` pairs.
    pub fn independent<L, I>(probabilities: I) -> Result<Self>
    where
        I: IntoIterator<Item = (L, f64)>,
        L: AsRef<str>,
    {
        let (labels, probabilities): (Vec<L>, Vec<f64>) = probabilities.into_iter().unzip();
        let labels = declare_labels(&labels)?;

        check_sums_to_one(&probabilities, || format!("{:?}", labels))?;
        for (label, value) in labels.iter().zip(&probabilities) {
            check_probability(*value, || label.to_string())?;
        }

        let core = TableCore::new(labels);
        let values = core
            .labels
            .iter()
            .zip(probabilities)
            .map(|(label, value)| (BTreeSet::from([Reference::new(&core, label)]), value))
            .collect();
        Ok(Self::assemble(core, Vec::new(), values))
    }

    /// Creates a distribution conditioned on the tables referenced by `rows`.
    ///
    /// Each row maps a conditioning key to one probability per entry of `labels`,
    /// in the same order. The rows must cover every combination of the
    /// dependencies' labels exactly once.
    pub fn dependent<L, K, P, I>(labels: &[L], rows: I) -> Result<Self>
    where
        L: AsRef<str>,
        K: Into<ConditioningKey>,
        P: Into<Vec<f64>>,
        I: IntoIterator<Item = (K, P)>,
    {
        let labels = declare_labels(labels)?;
        let (keys, rows): (Vec<ConditioningKey>, Vec<Vec<f64>>) = rows
            .into_iter()
            .map(|(key, probabilities)| (key.into(), probabilities.into()))
            .unzip();

        let first = rows.first().ok_or(ConstructionError::EmptyRows)?;
        if first.len() != labels.len() {
            return Err(ConstructionError::LabelCountMismatch {
                labels: labels.iter().map(|l| l.to_string()).collect(),
                probabilities: first.clone(),
            }
            .into());
        }

        let lengths: Vec<usize> = rows.iter().map(Vec::len).collect();
        if lengths.iter().collect::<HashSet<_>>().len() != 1 {
            return Err(ConstructionError::RaggedRows { lengths }.into());
        }

        let single = keys[0].is_single();
        if keys.iter().any(|key| key.is_single() != single) {
            return Err(ConstructionError::MixedKeyShapes.into());
        }
        let keys: Vec<Vec<Reference>> = keys
            .into_iter()
            .map(ConditioningKey::into_references)
            .collect();

        for key in &keys {
            let tables: HashSet<TableId> = key.iter().map(Reference::table_id).collect();
            if tables.len() != key.len() {
                return Err(ConstructionError::RepeatedDependency {
                    row: format_references(key),
                }
                .into());
            }
        }

        let dependencies = Self::derive_dependencies(&keys)?;

        for (key, row) in keys.iter().zip(&rows) {
            check_sums_to_one(row, || format!("row {}", format_references(key)))?;
        }

        Self::check_cross_product(&dependencies, &keys)?;

        for (key, row) in keys.iter().zip(&rows) {
            for (label, value) in labels.iter().zip(row) {
                check_probability(*value, || {
                    format!("{} given {}", label, format_references(key))
                })?;
            }
        }

        let core = TableCore::new(labels);
        let mut values = HashMap::new();
        for (key, row) in keys.iter().zip(rows) {
            for (label, value) in core.labels.iter().zip(row) {
                let mut combination: BTreeSet<Reference> = key.iter().cloned().collect();
                combination.insert(Reference::new(&core, label));
                values.insert(combination, value);
            }
        }
        Ok(Self::assemble(core, dependencies, values))
    }

    /// Groups the row references by table; each table must be fully covered.
    fn derive_dependencies(keys: &[Vec<Reference>]) -> Checked<Vec<Arc<TableCore>>> {
        let mut by_table: BTreeMap<TableId, (Arc<TableCore>, BTreeSet<Reference>)> =
            BTreeMap::new();
        for reference in keys.iter().flatten() {
            by_table
                .entry(reference.table_id())
                .or_insert_with(|| (Arc::clone(reference.table()), BTreeSet::new()))
                .1
                .insert(reference.clone());
        }

        let mut dependencies = Vec::with_capacity(by_table.len());
        for (table, found) in by_table.into_values() {
            let expected: BTreeSet<Reference> = table
                .labels
                .iter()
                .map(|label| Reference::new(&table, label))
                .collect();
            if found != expected {
                return Err(ConstructionError::IncompleteDependency {
                    table: table.display_name(),
                    found: format_references(&found),
                    expected: format_references(&expected),
                });
            }
            dependencies.push(table);
        }
        Ok(dependencies)
    }

    fn check_cross_product(
        dependencies: &[Arc<TableCore>],
        keys: &[Vec<Reference>],
    ) -> Checked<()> {
        let expected: BTreeSet<BTreeSet<Reference>> = cross_product(dependencies)
            .into_iter()
            .map(|combination| combination.into_iter().collect())
            .collect();

        let mut found = BTreeSet::new();
        let mut duplicate = None;
        for key in keys {
            let combination: BTreeSet<Reference> = key.iter().cloned().collect();
            if found.contains(&combination) {
                duplicate.get_or_insert(combination);
            } else {
                found.insert(combination);
            }
        }

        if found != expected {
            let describe = |sets: Vec<&BTreeSet<Reference>>| {
                let parts: Vec<String> = sets.into_iter().map(|s| format_references(s)).collect();
                format!("[{}]", parts.join(", "))
            };
            return Err(ConstructionError::IncompleteCrossProduct {
                missing: describe(expected.difference(&found).collect()),
                unexpected: describe(found.difference(&expected).collect()),
            });
        }
        if let Some(combination) = duplicate {
            return Err(ConstructionError::DuplicateCombination(format_references(
                &combination,
            )));
        }
        Ok(())
    }

    fn assemble(
        core: Arc<TableCore>,
        dependencies: Vec<Arc<TableCore>>,
        values: HashMap<BTreeSet<Reference>, f64>,
    ) -> Self {
        let labels: Vec<Reference> = core
            .labels
            .iter()
            .map(|label| Reference::new(&core, label))
            .collect();
        let by_name = core
            .labels
            .iter()
            .cloned()
            .zip(labels.iter().cloned())
            .collect();
        Distribution {
            core,
            labels,
            by_name,
            dependencies,
            values,
        }
    }

    /// Returns the stored probability for one full key combination.
    ///
    /// Keys may be references or label names of this distribution; duplicates
    /// collapse and order is irrelevant.
    pub fn get<'k, I, K>(&self, keys: I) -> Result<f64>
    where
        I: IntoIterator<Item = K>,
        K: Into<Key<'k>>,
    {
        let keys = self.normalize_keys(keys)?;
        self.check_keys_are_sufficient(&keys)?;
        self.values
            .get(&keys)
            .copied()
            .ok_or_else(|| LookupError::UnknownCombination(format_references(&keys)).into())
    }

    fn normalize_keys<'k, I, K>(&self, keys: I) -> Result<BTreeSet<Reference>>
    where
        I: IntoIterator<Item = K>,
        K: Into<Key<'k>>,
    {
        let mut normalized = BTreeSet::new();
        for key in keys {
            let key: Key<'k> = key.into();
            let reference = match key {
                Key::Reference(reference) => reference.clone(),
                Key::Label(label) => self.reference(label)?,
            };
            normalized.insert(reference);
        }
        trace!("{} keys normalized to {}", self.core.display_name(), format_references(&normalized));
        Ok(normalized)
    }

    fn check_keys_are_sufficient(&self, keys: &BTreeSet<Reference>) -> Result<()> {
        if keys.len() != self.arity() {
            return Err(LookupError::IncompleteKeys {
                expected: self.arity(),
                found: keys.len(),
                keys: format_references(keys),
            }
            .into());
        }
        let own = keys.iter().filter(|key| key.table_id() == self.id()).count();
        if own != 1 {
            return Err(LookupError::MissingSelfKey {
                table: self.core.display_name(),
                keys: format_references(keys),
            }
            .into());
        }
        Ok(())
    }

    /// Resolves one of this distribution's label names.
    pub fn reference(&self, label: &str) -> Result<Reference> {
        self.by_name
            .get(label)
            .cloned()
            .ok_or_else(|| NetworkError::NameResolution {
                table: self.core.display_name(),
                label: label.to_string(),
            })
    }

    /// The references among `keys` this table is evaluated on.
    pub fn suitable_subset<'a>(&self, keys: &'a [Reference]) -> Vec<&'a Reference> {
        keys.iter()
            .filter(|key| key.table_id() == self.id() || self.depends_on(key.table_id()))
            .collect()
    }

    /// Own labels in declaration order.
    pub fn labels(&self) -> &[Reference] {
        &self.labels
    }

    pub fn id(&self) -> TableId {
        self.core.id
    }

    /// The name assigned by the owning network, if attached.
    pub fn name(&self) -> Option<&str> {
        self.core.name()
    }

    /// Number of keys of a full lookup: one per dependency plus one own label.
    pub fn arity(&self) -> usize {
        self.dependencies.len() + 1
    }

    pub fn is_root(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn depends_on(&self, table: TableId) -> bool {
        self.dependencies.iter().any(|dependency| dependency.id == table)
    }

    pub fn dependency_ids(&self) -> impl Iterator<Item = TableId> + '_ {
        self.dependencies.iter().map(|dependency| dependency.id)
    }

    pub(crate) fn dependencies(&self) -> &[Arc<TableCore>] {
        &self.dependencies
    }

    pub(crate) fn core(&self) -> &Arc<TableCore> {
        &self.core
    }

    /// One entry per combination of dependency values: the conditioning
    /// references and the own-label probabilities in label order.
    pub fn rows(&self) -> Result<Vec<(Vec<Reference>, Vec<f64>)>> {
        cross_product(&self.dependencies)
            .into_iter()
            .map(|condition| {
                let probabilities = self
                    .labels
                    .iter()
                    .map(|label| self.get(condition.iter().chain(std::iter::once(label))))
                    .collect::<Result<Vec<f64>>>()?;
                Ok((condition, probabilities))
            })
            .collect()
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<(&BTreeSet<Reference>, &f64)> = self.values.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let entries: Vec<String> = entries
            .into_iter()
            .map(|(keys, value)| format!("{}: {}", format_references(keys), value))
            .collect();
        let name = self.name().unwrap_or("Distribution");
        write!(f, "{}({})", name, entries.join(", "))
    }
}

impl fmt::Debug for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather() -> Distribution {
        Distribution::independent([("sunny", 0.7), ("rainy", 0.3)]).unwrap()
    }

    #[test]
    fn test_lookup_by_label_name_and_reference() {
        let weather = weather();
        let rainy = weather.reference("rainy").unwrap();

        assert_eq!(weather.get(["rainy"]).unwrap(), 0.3);
        assert_eq!(weather.get([&rainy]).unwrap(), 0.3);
        assert_eq!(weather.get([&rainy, &rainy]).unwrap(), 0.3);
    }

    #[test]
    fn test_lookup_ignores_key_order() {
        let weather = weather();
        let umbrella = Distribution::dependent(
            &["left", "taken"],
            [
                (weather.reference("sunny").unwrap(), [0.9, 0.1]),
                (weather.reference("rainy").unwrap(), [0.2, 0.8]),
            ],
        )
        .unwrap();
        let rainy = weather.reference("rainy").unwrap();
        let taken = umbrella.reference("taken").unwrap();

        assert_eq!(umbrella.arity(), 2);
        assert_eq!(umbrella.get([&rainy, &taken]).unwrap(), 0.8);
        assert_eq!(umbrella.get([&taken, &rainy]).unwrap(), 0.8);
        assert_eq!(umbrella.get([Key::from(&rainy), Key::from("taken")]).unwrap(), 0.8);
    }

    #[test]
    fn test_unknown_label_fails_name_resolution() {
        let weather = weather();
        assert!(matches!(
            weather.get(["foggy"]),
            Err(NetworkError::NameResolution { .. })
        ));
    }

    #[test]
    fn test_lookup_requires_key_to_self() {
        let weather = weather();
        let umbrella = Distribution::dependent(
            &["left", "taken"],
            [
                (weather.reference("sunny").unwrap(), [0.9, 0.1]),
                (weather.reference("rainy").unwrap(), [0.2, 0.8]),
            ],
        )
        .unwrap();
        let sunny = weather.reference("sunny").unwrap();
        let rainy = weather.reference("rainy").unwrap();

        assert!(matches!(
            umbrella.get([&sunny, &rainy]),
            Err(NetworkError::Lookup(LookupError::MissingSelfKey { .. }))
        ));
        assert!(matches!(
            umbrella.get(["taken"]),
            Err(NetworkError::Lookup(LookupError::IncompleteKeys { expected: 2, found: 1, .. }))
        ));
    }

    #[test]
    fn test_rows_follow_label_order() {
        let weather = weather();
        let rows = weather.rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].0.is_empty());
        assert_eq!(rows[0].1, vec![0.7, 0.3]);
    }

    #[test]
    fn test_display_lists_table() {
        let weather = weather();
        let rendered = weather.to_string();
        assert!(rendered.starts_with("Distribution("));
        assert!(rendered.contains("{sunny}: 0.7"));
    }
}
