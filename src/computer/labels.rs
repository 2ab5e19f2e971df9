use std::fmt;

use ahash::AHashMap;

/// Label definitions in the order they appear in the program.
///
/// A name may be defined more than once; lookups resolve to the earliest
/// definition.
#[derive(Clone, Debug, Default)]
pub struct Labels {
    definitions: Vec<(String, usize)>,
    first: AHashMap<String, usize>,
}

impl Labels {
    pub fn new() -> Labels {
        Labels::default()
    }

    pub fn add(&mut self, label: impl Into<String>, index: usize) {
        let label = label.into();

        self.first.entry(label.clone()).or_insert(index);
        self.definitions.push((label, index));
    }

    pub fn lookup(&self, label: &str) -> Option<usize> {
        self.first.get(label).copied()
    }

    pub fn reset(&mut self) {
        self.definitions.clear();
        self.first.clear();
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.definitions
            .iter()
            .map(|(label, index)| (label.as_str(), *index))
    }

    /// Definitions shadowed by an earlier one with the same name.
    pub fn duplicates(&self) -> impl Iterator<Item = (&str, usize)> {
        self.iter()
            .filter(|(label, index)| self.first.get(*label) != Some(index))
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;

        for (i, (label, _)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(label)?;
        }

        f.write_str(")")
    }
}
