use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, OnceLock};

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identifier of a probability table, assigned once at construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableId(u64);

impl TableId {
    fn next() -> Self {
        TableId(NEXT_TABLE_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The identity a table shares with every reference to one of its labels.
#[derive(Debug)]
pub(crate) struct TableCore {
    pub(crate) id: TableId,
    pub(crate) labels: Vec<Arc<str>>,
    name: OnceLock<String>,
}

impl TableCore {
    pub(crate) fn new(labels: Vec<Arc<str>>) -> Arc<Self> {
        Arc::new(TableCore {
            id: TableId::next(),
            labels,
            name: OnceLock::new(),
        })
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    /// Names the table. Fails with the existing name if it was named before.
    pub(crate) fn attach(&self, name: &str) -> Result<(), String> {
        self.name.set(name.to_string()).map_err(|_| {
            self.name().unwrap_or_default().to_string()
        })
    }

    pub(crate) fn display_name(&self) -> String {
        match self.name() {
            Some(name) => name.to_string(),
            None => format!("Distribution{}", self.id),
        }
    }
}

/// One value of one distribution, e.g. `grade.good`.
///
/// Two references are equal when they name the same label of the same table.
#[derive(Clone)]
pub struct Reference {
    table: Arc<TableCore>,
    name: Arc<str>,
}

impl Reference {
    pub(crate) fn new(table: &Arc<TableCore>, name: &Arc<str>) -> Self {
        Reference {
            table: Arc::clone(table),
            name: Arc::clone(name),
        }
    }

    /// The label this reference stands for.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_id(&self) -> TableId {
        self.table.id
    }

    /// Name of the owning table, once a network has named it.
    pub fn table_name(&self) -> Option<&str> {
        self.table.name()
    }

    pub(crate) fn table(&self) -> &Arc<TableCore> {
        &self.table
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.table.id == other.table.id && self.name == other.name
    }
}

impl Eq for Reference {}

impl Hash for Reference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.table.id.hash(state);
        self.name.hash(state);
    }
}

impl PartialOrd for Reference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Reference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.table
            .id
            .cmp(&other.table.id)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table.name() {
            Some(table) => write!(f, "{}.{}", table, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Renders references as `{a.x, b.y}` for messages.
pub fn format_references<'a, I>(references: I) -> String
where
    I: IntoIterator<Item = &'a Reference>,
{
    let parts: Vec<String> = references.into_iter().map(|r| r.to_string()).collect();
    format!("{{{}}}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn core(labels: &[&str]) -> Arc<TableCore> {
        TableCore::new(labels.iter().map(|l| Arc::from(*l)).collect())
    }

    #[test]
    fn test_equality_is_by_table_and_label() {
        let coin = core(&["heads", "tails"]);
        let other = core(&["heads", "tails"]);

        let a = Reference::new(&coin, &coin.labels[0]);
        let b = Reference::new(&coin, &Arc::from("heads"));
        let c = Reference::new(&other, &other.labels[0]);

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Reference> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display_follows_table_name() {
        let coin = core(&["heads", "tails"]);
        let heads = Reference::new(&coin, &coin.labels[0]);
        assert_eq!(heads.to_string(), "heads");

        coin.attach("coin").unwrap();
        assert_eq!(heads.to_string(), "coin.heads");
        assert_eq!(coin.attach("again"), Err("coin".to_string()));
    }

    #[test]
    fn test_table_ids_are_unique() {
        let a = core(&["x"]);
        let b = core(&["x"]);
        assert_ne!(a.id, b.id);
    }
}
