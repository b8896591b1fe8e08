use displaydoc::Display;
use thiserror::Error;

/// vote store result
pub type VoteStoreResult<T, E = VoteStoreError> = core::result::Result<T, E>;

/// vote store error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum VoteStoreError {
    /// on-disk schema version {found} is not readable by this version (supported: {min_supported} to {supported})
    DBVersionError {
        /// version found on disk
        found: u32,
        /// oldest readable version
        min_supported: u32,
        /// version written by this code
        supported: u32,
    },
    /// storage error: {0}
    StorageError(String),
    /// vote store is closed
    Closed,
    /// corrupted entry: {0}
    CorruptedEntry(String),
}
