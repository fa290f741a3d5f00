use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The commit marker for one preprocessed file (`<root>/<file>/metadata.json`).
/// Its presence is the sole signal that a pyramid is query-visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub start: i64,
    pub end: i64,
    pub raw_number: u64,
    pub raw_file: String,
    pub levels: LevelsDoc,
}

/// `{"names": ["level0", "level1", ...], "level0": {...}, "level1": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelsDoc {
    pub names: Vec<String>,
    #[serde(flatten)]
    pub entries: BTreeMap<String, LevelEntry>,
}

impl LevelsDoc {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            entries: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, entry: LevelEntry) {
        let name = name.into();
        self.names.push(name.clone());
        self.entries.insert(name, entry);
    }

    pub fn get(&self, name: &str) -> Option<&LevelEntry> {
        self.entries.get(name)
    }

    /// Frequencies in level order (non-increasing), for level selection.
    pub fn frequencies(&self) -> Vec<f64> {
        self.names
            .iter()
            .filter_map(|n| self.entries.get(n))
            .map(|e| e.frequency)
            .collect()
    }
}

impl Default for LevelsDoc {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelEntry {
    pub names: Vec<String>,
    pub frequency: f64,
    pub number: u64,
}

/// `<root>/<file>/<strategy>/level<k>/metadata.json` (and level0's variant):
/// slice name to its first timestamp, in on-disk slice order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelMetadataDoc(pub BTreeMap<String, i64>);

impl LevelMetadataDoc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slice_name: impl Into<String>, start: i64) {
        self.0.insert(slice_name.into(), start);
    }

    /// Slice names ordered by the numeric suffix of their trailing `sN.csv`
    /// segment (e.g. `level0/s0.csv`, `max/level1/s2.csv`), the on-disk
    /// slice order.
    pub fn ordered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.keys().cloned().collect();
        names.sort_by_key(|n| slice_index(n));
        names
    }

    /// Start timestamps parallel to `ordered_names`, ascending, for the
    /// slice-selection binary search.
    pub fn ordered_starts(&self) -> Vec<i64> {
        self.ordered_names()
            .iter()
            .map(|n| self.0[n])
            .collect()
    }
}

fn slice_index(name: &str) -> u64 {
    let leaf = name.rsplit('/').next().unwrap_or(name);
    leaf.trim_start_matches('s').trim_end_matches(".csv").parse().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_doc_round_trips_through_json() {
        let mut doc = LevelsDoc::new();
        doc.push(
            "level0",
            LevelEntry {
                names: vec!["level0/s0.csv".into()],
                frequency: 100.0,
                number: 7200,
            },
        );
        let json = serde_json::to_string(&doc).unwrap();
        let back: LevelsDoc = serde_json::from_str(&json).unwrap();
        assert_eq!(back.names, vec!["level0"]);
        assert_eq!(back.get("level0").unwrap().number, 7200);
    }

    #[test]
    fn level_metadata_orders_by_slice_index() {
        let mut doc = LevelMetadataDoc::new();
        doc.insert("level0/s10.csv", 100);
        doc.insert("level0/s2.csv", 20);
        doc.insert("level0/s0.csv", 0);
        assert_eq!(
            doc.ordered_names(),
            vec!["level0/s0.csv", "level0/s2.csv", "level0/s10.csv"]
        );
        assert_eq!(doc.ordered_starts(), vec![0, 20, 100]);
    }

    #[test]
    fn level_metadata_orders_strategy_slice_names() {
        let mut doc = LevelMetadataDoc::new();
        doc.insert("max/level1/s3.csv", 300);
        doc.insert("max/level1/s1.csv", 100);
        assert_eq!(doc.ordered_names(), vec!["max/level1/s1.csv", "max/level1/s3.csv"]);
    }
}
