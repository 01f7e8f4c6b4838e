//! Content factory for loading every scaling file from one directory.

use std::path::{Path, PathBuf};

use crate::loaders::{ConfigLoader, LoadResult, LoadedConfig, StatTables, TablesLoader};

/// Loads scaling content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── scaling.toml
/// └── base_stats.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "scaling.toml";
    pub const TABLES_FILE: &'static str = "base_stats.ron";

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Directory shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Load and validate `scaling.toml`.
    pub fn load_config(&self) -> LoadResult<LoadedConfig> {
        ConfigLoader::load(&self.data_dir.join(Self::CONFIG_FILE))
    }

    /// Load `base_stats.ron`.
    pub fn load_tables(&self) -> LoadResult<StatTables> {
        TablesLoader::load(&self.data_dir.join(Self::TABLES_FILE))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }
}
