//! Data-driven scaling configuration and loaders.
//!
//! This crate turns files into the typed values `scaling-core` consumes:
//! - scaling settings (TOML) into a validated, fingerprinted
//!   [`scaling_core::ConfigurationSnapshot`]
//! - per-level base-stat tables (RON) into a [`StatTables`] oracle
//!
//! The core never reads files itself; hosts and tools call these loaders and
//! hand the results over.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, LoadResult, LoadedConfig, ScalingFile, StatTables, TablesLoader,
};
