//! Configuration for filerecstore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for opening and creating stores
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Parent directory under which stores live
    /// Internal structure:
    ///   {root_dir}/
    ///     └── {store name}/
    ///           ├── .rscontrol   (store metadata)
    ///           └── theFiles/    (one file per record)
    pub root_dir: PathBuf,

    /// When to fsync record and control files
    pub sync_strategy: SyncStrategy,
}

/// Durability strategy for writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Leave flushing to the OS; files are closed after every write
    OnClose,

    /// fsync after every record write and control file update
    EveryWrite,
}

impl SyncStrategy {
    pub(crate) fn sync_each_write(self) -> bool {
        matches!(self, SyncStrategy::EveryWrite)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./filerecstore_data"),
            sync_strategy: SyncStrategy::OnClose,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the root directory (parent of all stores)
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root_dir = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
