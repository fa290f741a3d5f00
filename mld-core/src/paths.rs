use crate::downsample::Strategy;

const DEFAULT_ROOT: &str = "mld-preprocess";

/// Strips a raw object key down to its base name: trimmed, `.csv` suffix
/// removed.
pub fn file_base_name(raw_key: &str) -> String {
    let trimmed = raw_key.trim();
    trimmed.strip_suffix(".csv").unwrap_or(trimmed).to_string()
}

/// Key-naming conventions for one file's pyramid tree, rooted under a
/// configurable prefix.
#[derive(Debug, Clone)]
pub struct PyramidPaths {
    root: String,
}

impl Default for PyramidPaths {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl PyramidPaths {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn file_metadata_path(&self, file_base: &str) -> String {
        format!("{}/{}/metadata.json", self.root, file_base)
    }

    pub fn level0_metadata_path(&self, file_base: &str) -> String {
        format!("{}/{}/level0/metadata.json", self.root, file_base)
    }

    pub fn level0_slice_path(&self, file_base: &str, i: usize) -> String {
        self.resolve(file_base, &Self::level0_slice_name(i))
    }

    pub fn level_metadata_path(&self, file_base: &str, strategy: Strategy, k: usize) -> String {
        debug_assert!(k >= 1, "level metadata above level 0 requires a strategy");
        format!("{}/{}/{}/level{}/metadata.json", self.root, file_base, strategy.name(), k)
    }

    pub fn level_slice_path(&self, file_base: &str, strategy: Strategy, k: usize, i: usize) -> String {
        debug_assert!(k >= 1, "level slices above level 0 require a strategy");
        self.resolve(file_base, &Self::level_slice_name(strategy, k, i))
    }

    /// Joins a slice name (as stored in a level metadata document, e.g.
    /// `level0/s3.csv` or `max/level1/s3.csv`) back into a full object key
    /// under this file's tree.
    pub fn resolve(&self, file_base: &str, slice_name: &str) -> String {
        format!("{}/{}/{}", self.root, file_base, slice_name)
    }

    /// The slice-name form persisted in metadata documents for a level-0
    /// slice, per the file/level metadata JSON schema.
    pub fn level0_slice_name(i: usize) -> String {
        format!("level0/s{}.csv", i)
    }

    /// The slice-name form persisted in metadata documents for a level
    /// above 0, per the file/level metadata JSON schema.
    pub fn level_slice_name(strategy: Strategy, k: usize, i: usize) -> String {
        format!("{}/level{}/s{}.csv", strategy.name(), k, i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_csv_suffix_and_whitespace() {
        assert_eq!(file_base_name("  trace.csv  "), "trace");
        assert_eq!(file_base_name("trace"), "trace");
    }

    #[test]
    fn builds_expected_paths() {
        let paths = PyramidPaths::new("root");
        assert_eq!(paths.file_metadata_path("trace"), "root/trace/metadata.json");
        assert_eq!(paths.level0_slice_path("trace", 2), "root/trace/level0/s2.csv");
        assert_eq!(
            paths.level_slice_path("trace", Strategy::Max, 1, 0),
            "root/trace/max/level1/s0.csv"
        );
        assert_eq!(
            paths.level_metadata_path("trace", Strategy::Avg, 3),
            "root/trace/avg/level3/metadata.json"
        );
    }

    #[test]
    fn slice_names_resolve_back_to_the_same_path() {
        let paths = PyramidPaths::new("root");
        let name = PyramidPaths::level0_slice_name(2);
        assert_eq!(name, "level0/s2.csv");
        assert_eq!(paths.resolve("trace", &name), paths.level0_slice_path("trace", 2));

        let name = PyramidPaths::level_slice_name(Strategy::Max, 1, 0);
        assert_eq!(name, "max/level1/s0.csv");
        assert_eq!(paths.resolve("trace", &name), paths.level_slice_path("trace", Strategy::Max, 1, 0));
    }
}
