// Copyright (c) 2022 THE STEEMVOTE AUTHORS

use crate::{ChainError, ChainResult, ChainService};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use steemvote_models::{CandidateComment, ContentId, DiscoveredVia};
use steemvote_time::SteemTime;

#[derive(Debug, Default)]
struct TestChainState {
    voting_power: HashMap<String, f64>,
    content: Vec<CandidateComment>,
    account_votes: HashMap<String, Vec<(SteemTime, CandidateComment)>>,
    read_failures: VecDeque<ChainError>,
    submit_failures: HashMap<ContentId, VecDeque<ChainError>>,
    latency: Option<Duration>,
    submitted: Vec<(ContentId, u16)>,
    content_queries: usize,
}

/// Scripted in-memory chain.
///
/// Clones share the same state, so a test keeps a handle on the chain it
/// gave to the code under test and inspects the votes it received.
#[derive(Debug, Clone, Default)]
pub struct TestChain {
    state: Arc<Mutex<TestChainState>>,
}

impl TestChain {
    /// Empty chain: no accounts, no content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the voting power returned for an account.
    pub fn set_voting_power(&self, account: &str, power: f64) {
        self.state
            .lock()
            .voting_power
            .insert(account.to_string(), power);
    }

    /// Makes a content visible to `list_recent_content`.
    pub fn publish(&self, candidate: CandidateComment) {
        self.state.lock().content.push(candidate);
    }

    /// Makes a vote of `account` on a content, cast at `voted_at`, visible to `list_account_votes`.
    pub fn add_account_vote(&self, account: &str, candidate: CandidateComment, voted_at: SteemTime) {
        self.state
            .lock()
            .account_votes
            .entry(account.to_string())
            .or_default()
            .push((voted_at, candidate));
    }

    /// The next `count` read calls fail with `error`.
    pub fn fail_next_reads(&self, count: usize, error: ChainError) {
        let mut state = self.state.lock();
        state
            .read_failures
            .extend(std::iter::repeat(error).take(count));
    }

    /// The next `count` votes on `content_id` fail with `error`.
    pub fn fail_next_submissions(&self, content_id: &ContentId, count: usize, error: ChainError) {
        self.state
            .lock()
            .submit_failures
            .entry(content_id.clone())
            .or_default()
            .extend(std::iter::repeat(error).take(count));
    }

    /// Every call sleeps for `latency` before answering.
    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().latency = Some(latency);
    }

    /// Successful submissions, in order.
    pub fn submitted_votes(&self) -> Vec<(ContentId, u16)> {
        self.state.lock().submitted.clone()
    }

    /// Number of `list_recent_content` calls received.
    pub fn content_queries(&self) -> usize {
        self.state.lock().content_queries
    }

    async fn simulate_latency(&self) {
        let latency = self.state.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn next_read_failure(&self) -> ChainResult<()> {
        match self.state.lock().read_failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn created_since(content: &[CandidateComment], since: SteemTime) -> Vec<CandidateComment> {
    let mut found: Vec<CandidateComment> = content
        .iter()
        .filter(|candidate| candidate.created_at >= since)
        .cloned()
        .collect();
    found.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
    found
}

#[async_trait]
impl ChainService for TestChain {
    async fn get_account_voting_power(&self, account: &str) -> ChainResult<f64> {
        self.simulate_latency().await;
        self.next_read_failure()?;
        self.state
            .lock()
            .voting_power
            .get(account)
            .copied()
            .ok_or_else(|| ChainError::RejectedError(format!("unknown account {}", account)))
    }

    async fn list_recent_content(&self, since: SteemTime) -> ChainResult<Vec<CandidateComment>> {
        self.simulate_latency().await;
        self.state.lock().content_queries += 1;
        self.next_read_failure()?;
        Ok(created_since(&self.state.lock().content, since))
    }

    async fn list_account_votes(
        &self,
        account: &str,
        since: SteemTime,
    ) -> ChainResult<Vec<CandidateComment>> {
        self.simulate_latency().await;
        self.next_read_failure()?;
        let state = self.state.lock();
        let voted: Vec<CandidateComment> = state
            .account_votes
            .get(account)
            .map(|votes| {
                votes
                    .iter()
                    .filter(|(voted_at, _)| *voted_at >= since)
                    .map(|(_, candidate)| {
                        candidate
                            .clone()
                            .with_source(DiscoveredVia::Delegate(account.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(voted)
    }

    async fn submit_vote(&self, content_id: &ContentId, weight: u16) -> ChainResult<()> {
        self.simulate_latency().await;
        let mut state = self.state.lock();
        if let Some(err) = state
            .submit_failures
            .get_mut(content_id)
            .and_then(VecDeque::pop_front)
        {
            return Err(err);
        }
        state.submitted.push((content_id.clone(), weight));
        Ok(())
    }
}
