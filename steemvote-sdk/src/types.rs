// Copyright (c) 2022 THE STEEMVOTE AUTHORS

use serde::Deserialize;
use steemvote_chain_exports::{ChainError, ChainResult};
use steemvote_models::{CandidateComment, ContentId};
use steemvote_time::SteemTime;

/// Full voting power, in basis points
pub const STEEM_100_PERCENT: u64 = 10_000;
/// Time for an empty voting power to fully regenerate
pub const VOTE_REGENERATION_TIME: SteemTime = SteemTime::from_secs(5 * 24 * 60 * 60);

/// Account as returned by `condenser_api.get_accounts`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiAccount {
    /// account name
    pub name: String,
    /// voting power at `last_vote_time`, in basis points
    pub voting_power: u16,
    /// time of the last vote cast by the account
    pub last_vote_time: String,
}

impl ApiAccount {
    /// Voting power regenerated up to `now`, as a fraction.
    pub fn voting_power_at(&self, now: SteemTime) -> ChainResult<f64> {
        let last_vote_time = parse_chain_time(&self.last_vote_time)?;
        Ok(regenerated_voting_power(
            self.voting_power,
            now.saturating_sub(last_vote_time),
        ))
    }
}

/// Post or comment as returned by `get_discussions_by_created` and `get_content`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiDiscussion {
    /// author account name
    pub author: String,
    /// permanent link
    pub permlink: String,
    /// main tag of the root post
    #[serde(default)]
    pub category: String,
    /// creation time
    pub created: String,
}

impl TryFrom<ApiDiscussion> for CandidateComment {
    type Error = ChainError;

    fn try_from(value: ApiDiscussion) -> Result<Self, Self::Error> {
        let id = ContentId::new(&value.author, &value.permlink)
            .map_err(|err| ChainError::RejectedError(err.to_string()))?;
        Ok(CandidateComment::new(
            id,
            &value.category,
            parse_chain_time(&value.created)?,
        ))
    }
}

/// Vote as returned by `condenser_api.get_account_votes`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiAccountVote {
    /// voted content, `author/permlink`
    pub authorperm: String,
    /// time of the vote
    pub time: String,
}

impl ApiAccountVote {
    /// Voted content
    pub fn content_id(&self) -> ChainResult<ContentId> {
        self.authorperm
            .parse()
            .map_err(|err: steemvote_models::ModelsError| ChainError::RejectedError(err.to_string()))
    }

    /// Time of the vote
    pub fn voted_at(&self) -> ChainResult<SteemTime> {
        parse_chain_time(&self.time)
    }
}

pub(crate) fn parse_chain_time(s: &str) -> ChainResult<SteemTime> {
    SteemTime::from_chain_str(s).map_err(|err| ChainError::RejectedError(err.to_string()))
}

/// Applies the chain regeneration rule: an empty voting power is back to
/// 100% after `VOTE_REGENERATION_TIME`, linearly.
pub fn regenerated_voting_power(voting_power: u16, elapsed: SteemTime) -> f64 {
    let regenerated = u128::from(elapsed.to_millis()) * u128::from(STEEM_100_PERCENT)
        / u128::from(VOTE_REGENERATION_TIME.to_millis());
    let total = (u128::from(voting_power) + regenerated).min(u128::from(STEEM_100_PERCENT));
    total as f64 / STEEM_100_PERCENT as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voting_power_regeneration() {
        assert_eq!(regenerated_voting_power(8_000, SteemTime::from_millis(0)), 0.8);
        // a full day regenerates 20%
        assert_eq!(
            regenerated_voting_power(5_000, SteemTime::from_secs(24 * 60 * 60)),
            0.7
        );
        assert_eq!(
            regenerated_voting_power(9_000, SteemTime::from_secs(10 * 24 * 60 * 60)),
            1.0
        );
    }

    #[test]
    fn test_account_power_uses_last_vote_time() {
        let account: ApiAccount = serde_json::from_value(serde_json::json!({
            "name": "voter",
            "voting_power": 7500,
            "last_vote_time": "2022-01-01T00:00:00",
            "balance": "1.000 STEEM"
        }))
        .unwrap();
        let now = SteemTime::from_chain_str("2022-01-02T00:00:00").unwrap();
        assert_eq!(account.voting_power_at(now).unwrap(), 0.95);
    }

    #[test]
    fn test_discussion_to_candidate() {
        let discussion: ApiDiscussion = serde_json::from_value(serde_json::json!({
            "author": "alice",
            "permlink": "hello-world",
            "category": "Introduceyourself",
            "created": "2016-03-24T16:05:00",
            "body": "..."
        }))
        .unwrap();
        let candidate = CandidateComment::try_from(discussion).unwrap();
        assert_eq!(candidate.id.to_string(), "@alice/hello-world");
        assert_eq!(candidate.category, "introduceyourself");
        assert_eq!(
            candidate.created_at,
            SteemTime::from_chain_str("2016-03-24T16:05:00").unwrap()
        );
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let vote = ApiAccountVote {
            authorperm: "alice/post".to_string(),
            time: "soon".to_string(),
        };
        assert!(matches!(vote.voted_at(), Err(ChainError::RejectedError(_))));
        assert_eq!(vote.content_id().unwrap().permlink, "post");
    }
}
