use crate::VoteStoreResult;
use std::fmt::Debug;
use steemvote_models::{ContentId, VoteRecord};
use steemvote_time::SteemTime;

/// Durable set of the contents that already received a vote.
///
/// Implementations serialize writes internally; reads may run concurrently
/// with a write but never observe a partially written record.
#[cfg_attr(feature = "test-exports", mockall::automock)]
pub trait VoteStoreController: Send + Sync + Debug {
    /// true if a vote record exists for this content
    fn has_voted(&self, content_id: &ContentId) -> VoteStoreResult<bool>;

    /// Returns the vote record of a content, if any
    fn get_vote(&self, content_id: &ContentId) -> VoteStoreResult<Option<VoteRecord>>;

    /// Records a vote. The record is on disk when this returns `Ok`.
    /// If a record already exists for this content it is left untouched.
    fn record_vote(&self, content_id: &ContentId, voted_at: SteemTime) -> VoteStoreResult<()>;

    /// Number of recorded votes
    fn vote_count(&self) -> VoteStoreResult<u64>;

    /// Flushes the underlying db.
    fn flush(&self) -> VoteStoreResult<()>;

    /// Releases the underlying db. Calling it again has no effect.
    fn close(&self) -> VoteStoreResult<()>;
}
