// Copyright (c) 2022 THE STEEMVOTE AUTHORS

use crate::ChainResult;
use async_trait::async_trait;
use steemvote_models::{CandidateComment, ContentId};
use steemvote_time::SteemTime;

/// Narrow view of the chain used by the voting core.
///
/// Implementations do not bound their own latency: callers wrap each call in
/// a timeout and treat an elapsed one as `ChainError::Timeout`.
#[cfg_attr(feature = "test-exports", mockall::automock)]
#[async_trait]
pub trait ChainService: Send + Sync {
    /// Current voting power of an account, regenerated up to now, in `0.0..=1.0`.
    async fn get_account_voting_power(&self, account: &str) -> ChainResult<f64>;

    /// Content created at or after `since`, oldest first. Finite per call.
    async fn list_recent_content(&self, since: SteemTime) -> ChainResult<Vec<CandidateComment>>;

    /// Content that `account` voted on at or after `since`, tagged `Delegate(account)`.
    async fn list_account_votes(
        &self,
        account: &str,
        since: SteemTime,
    ) -> ChainResult<Vec<CandidateComment>>;

    /// Casts a vote of `weight` basis points on a content.
    async fn submit_vote(&self, content_id: &ContentId, weight: u16) -> ChainResult<()>;
}
