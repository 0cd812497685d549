use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::models::{DependencyRecord, Ecosystem};

/// Package name → every file it was seen in, for one ecosystem.
///
/// Origins are appended in observation order and never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyMap {
    entries: BTreeMap<String, Vec<PathBuf>>,
}

impl DependencyMap {
    pub fn record(&mut self, name: impl Into<String>, origin: &Path) {
        self.entries
            .entry(name.into())
            .or_default()
            .push(origin.to_path_buf());
    }

    /// Concatenate `other`'s origins onto ours, name by name.
    pub fn merge(&mut self, other: DependencyMap) {
        for (name, origins) in other.entries {
            self.entries.entry(name).or_default().extend(origins);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn origins(&self, name: &str) -> Option<&[PathBuf]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn into_records(self, ecosystem: Ecosystem) -> impl Iterator<Item = DependencyRecord> {
        self.entries
            .into_iter()
            .map(move |(name, origins)| DependencyRecord {
                name,
                ecosystem,
                origins,
            })
    }
}

/// Dependencies of a whole project, one map per ecosystem.
#[derive(Debug, Default)]
pub struct ScanResult {
    maps: BTreeMap<Ecosystem, DependencyMap>,
}

impl ScanResult {
    pub fn add(&mut self, ecosystem: Ecosystem, deps: DependencyMap) {
        if deps.is_empty() {
            return;
        }
        self.maps.entry(ecosystem).or_default().merge(deps);
    }

    pub fn get(&self, ecosystem: Ecosystem) -> Option<&DependencyMap> {
        self.maps.get(&ecosystem)
    }

    /// Number of unique (ecosystem, name) pairs.
    pub fn total(&self) -> usize {
        self.maps.values().map(DependencyMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Flatten into records, ordered by ecosystem then name.
    pub fn into_records(self) -> Vec<DependencyRecord> {
        self.maps
            .into_iter()
            .flat_map(|(ecosystem, deps)| deps.into_records(ecosystem))
            .collect()
    }
}
