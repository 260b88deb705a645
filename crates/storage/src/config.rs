//! Store configuration.

use serde::{Deserialize, Serialize};
use sos_index::IndexConfig;

/// Default snapshot file name inside a store directory.
pub const DEFAULT_SNAPSHOT_FILE: &str = "store.sos";

/// Configuration of an object store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Tuning shared by every index of the store.
    pub index: IndexConfig,
    /// Snapshot file name, relative to the store directory.
    pub snapshot_file: String,
    /// Flush the snapshot to stable storage on every commit.
    pub sync_on_commit: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            snapshot_file: DEFAULT_SNAPSHOT_FILE.to_string(),
            sync_on_commit: true,
        }
    }
}

impl StoreConfig {
    pub fn with_index(mut self, index: IndexConfig) -> Self {
        self.index = index;
        self
    }

    pub fn with_snapshot_file(mut self, file: impl Into<String>) -> Self {
        self.snapshot_file = file.into();
        self
    }

    pub fn with_sync_on_commit(mut self, sync: bool) -> Self {
        self.sync_on_commit = sync;
        self
    }
}
