//! Content loaders for reading scaling data from files.
//!
//! Each loader reads one file format and converts it into core types. The
//! on-disk schemas live in [`format`].

pub mod config;
pub mod factory;
pub mod format;
pub mod tables;

pub use config::{ConfigLoader, LoadedConfig};
pub use factory::ContentFactory;
pub use format::ScalingFile;
pub use tables::{StatTables, TablesLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
