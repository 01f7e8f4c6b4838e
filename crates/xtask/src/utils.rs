//! Utility functions for xtask commands

use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use scaling_content::{ConfigLoader, ContentFactory, LoadedConfig, StatTables, TablesLoader};

/// Overrides the default settings file when no `--config` is given.
pub const CONFIG_ENV: &str = "SCALING_CONFIG";

/// Logs go to stderr so command output stays pipeable.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit flag, then `SCALING_CONFIG`, then the bundled file.
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| {
            ContentFactory::bundled()
                .data_dir()
                .join(ContentFactory::CONFIG_FILE)
        })
}

pub fn load_config(explicit: Option<PathBuf>) -> Result<(PathBuf, LoadedConfig)> {
    let path = config_path(explicit);
    let loaded = ConfigLoader::load(&path)?;
    Ok((path, loaded))
}

/// Explicit tables file, else the bundled one.
pub fn load_tables(explicit: Option<PathBuf>) -> Result<StatTables> {
    match explicit {
        Some(path) => TablesLoader::load(&path),
        None => ContentFactory::bundled().load_tables(),
    }
}
