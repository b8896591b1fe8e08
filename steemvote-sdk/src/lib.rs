// Copyright (c) 2022 THE STEEMVOTE AUTHORS
//! JSON-RPC client of the Steem chain
//!
//! Reads go to a Steem node through `condenser_api`. Votes go to a wallet
//! endpoint (`cli_wallet` compatible) that holds the voter's posting key,
//! signs and broadcasts the transaction.

#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod types;

pub use types::*;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::ClientError;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde_json::json;
use steemvote_chain_exports::{ChainConfig, ChainError, ChainResult, ChainService};
use steemvote_models::{CandidateComment, ContentId, DiscoveredVia};
use steemvote_time::SteemTime;
use tracing::{debug, warn};

/// Pages of `get_discussions_by_created` read per `list_recent_content` call
pub const MAX_CONTENT_PAGES: u32 = 20;
/// `get_content` requests in flight while resolving the votes of an account
pub const CONTENT_FETCH_CONCURRENCY: usize = 8;

/// Converts a JSON-RPC client error into the chain error taxonomy.
pub fn to_chain_error(err: ClientError) -> ChainError {
    match err {
        ClientError::Call(err) => ChainError::RejectedError(err.message().to_string()),
        ClientError::RequestTimeout => ChainError::Timeout,
        other => ChainError::ConnectionError(other.to_string()),
    }
}

/// Client
pub struct SteemClient {
    /// node component, for reads
    node: HttpClient,
    /// wallet component, for votes
    wallet: HttpClient,
    /// account casting the votes
    voter: String,
    /// page size of `list_recent_content`
    content_batch_size: u32,
}

impl std::fmt::Debug for SteemClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SteemClient")
            .field("voter", &self.voter)
            .field("content_batch_size", &self.content_batch_size)
            .finish()
    }
}

impl SteemClient {
    /// creates a new client
    pub fn new(config: &ChainConfig, content_batch_size: u32) -> ChainResult<SteemClient> {
        let build = |url: &str| {
            HttpClientBuilder::default()
                .request_timeout(config.rpc_timeout.to_duration())
                .build(url)
                .map_err(to_chain_error)
        };
        Ok(SteemClient {
            node: build(&config.node_url)?,
            wallet: build(&config.wallet_url)?,
            voter: config.voter.clone(),
            content_batch_size,
        })
    }

    /// Account voting the content
    pub fn voter(&self) -> &str {
        &self.voter
    }

    async fn get_account(&self, account: &str) -> ChainResult<ApiAccount> {
        let accounts: Vec<ApiAccount> = self
            .node
            .request("condenser_api.get_accounts", rpc_params![vec![account]])
            .await
            .map_err(to_chain_error)?;
        accounts
            .into_iter()
            .next()
            .ok_or_else(|| ChainError::RejectedError(format!("unknown account {}", account)))
    }

    async fn get_content(&self, author: &str, permlink: &str) -> ChainResult<ApiDiscussion> {
        self.node
            .request("condenser_api.get_content", rpc_params![author, permlink])
            .await
            .map_err(to_chain_error)
    }
}

fn now() -> ChainResult<SteemTime> {
    SteemTime::now().map_err(|err| ChainError::ConnectionError(err.to_string()))
}

#[async_trait]
impl ChainService for SteemClient {
    async fn get_account_voting_power(&self, account: &str) -> ChainResult<f64> {
        self.get_account(account).await?.voting_power_at(now()?)
    }

    async fn list_recent_content(&self, since: SteemTime) -> ChainResult<Vec<CandidateComment>> {
        let mut found = Vec::new();
        let mut start: Option<(String, String)> = None;
        for page in 1..=MAX_CONTENT_PAGES {
            let mut query = json!({ "tag": "", "limit": self.content_batch_size });
            if let Some((author, permlink)) = &start {
                query["start_author"] = json!(author);
                query["start_permlink"] = json!(permlink);
            }
            let discussions: Vec<ApiDiscussion> = self
                .node
                .request(
                    "condenser_api.get_discussions_by_created",
                    rpc_params![query],
                )
                .await
                .map_err(to_chain_error)?;
            let page_len = discussions.len();

            // the node answers newest first, a page starts with the last item of the previous one
            let skip = usize::from(start.is_some());
            let mut next_start = None;
            let mut reached_since = false;
            for discussion in discussions.into_iter().skip(skip) {
                next_start = Some((discussion.author.clone(), discussion.permlink.clone()));
                match CandidateComment::try_from(discussion) {
                    Ok(candidate) if candidate.created_at < since => {
                        reached_since = true;
                        break;
                    }
                    Ok(candidate) => found.push(candidate),
                    Err(err) => warn!("skipping listed content: {}", err),
                }
            }

            if reached_since || page_len < self.content_batch_size as usize {
                break;
            }
            match next_start {
                Some(next) => start = Some(next),
                None => break,
            }
            if page == MAX_CONTENT_PAGES {
                warn!(
                    "stopped listing new content after {} pages, older content since {} is skipped",
                    MAX_CONTENT_PAGES,
                    since.format_instant()
                );
            }
        }

        found.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        found.dedup_by(|a, b| a.id == b.id);
        debug!("{} new contents since {}", found.len(), since.format_instant());
        Ok(found)
    }

    async fn list_account_votes(
        &self,
        account: &str,
        since: SteemTime,
    ) -> ChainResult<Vec<CandidateComment>> {
        let votes: Vec<ApiAccountVote> = self
            .node
            .request("condenser_api.get_account_votes", rpc_params![account])
            .await
            .map_err(to_chain_error)?;

        let mut voted = Vec::new();
        for vote in votes {
            match vote.voted_at().and_then(|voted_at| Ok((voted_at, vote.content_id()?))) {
                Ok((voted_at, _)) if voted_at < since => {}
                Ok((_, content_id)) => voted.push(content_id),
                Err(err) => warn!("skipping vote of {} on {}: {}", account, vote.authorperm, err),
            }
        }

        let fetched: Vec<(ContentId, ChainResult<ApiDiscussion>)> = stream::iter(voted)
            .map(|content_id| async move {
                let content = self.get_content(&content_id.author, &content_id.permlink).await;
                (content_id, content)
            })
            .buffered(CONTENT_FETCH_CONCURRENCY)
            .collect()
            .await;

        let mut found = Vec::with_capacity(fetched.len());
        for (content_id, content) in fetched {
            match content.and_then(CandidateComment::try_from) {
                Ok(candidate) => {
                    found.push(candidate.with_source(DiscoveredVia::Delegate(account.to_string())))
                }
                // deleted or malformed content is not worth retrying
                Err(err) if err.is_rejection() => {
                    warn!("skipping {} voted by {}: {}", content_id, account, err)
                }
                Err(err) => return Err(err),
            }
        }
        Ok(found)
    }

    async fn submit_vote(
        &self,
        content_id: &ContentId,
        weight: u16,
    ) -> ChainResult<()> {
        let _transaction: serde_json::Value = self
            .wallet
            .request(
                "vote",
                rpc_params![
                    self.voter.as_str(),
                    content_id.author.as_str(),
                    content_id.permlink.as_str(),
                    weight,
                    true
                ],
            )
            .await
            .map_err(to_chain_error)?;
        debug!("vote on {} broadcast by {}", content_id, self.voter);
        Ok(())
    }
}
