use serde::Deserialize;
use std::path::PathBuf;

/// Config structure for a `VoteStore`
#[derive(Debug, Clone, Deserialize)]
pub struct VoteStoreConfig {
    /// The path to the database, used in the wrapped RocksDB instance
    pub path: PathBuf,
}
