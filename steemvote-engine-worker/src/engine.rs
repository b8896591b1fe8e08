// Copyright (c) 2022 THE STEEMVOTE AUTHORS

use crate::chain_call::call_chain;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::sync::Arc;
use steemvote_chain_exports::{ChainResult, ChainService};
use steemvote_db_exports::VoteStoreController;
use steemvote_engine_exports::{
    EngineConfig, EngineError, EngineResult, EngineSnapshot, EngineState, IntakeReceiver,
    VoteReport, VotingEngineController,
};
use steemvote_logging::steemvote_trace;
use steemvote_models::{AgePosition, CandidateComment, ContentId, Policy, PriorityLevel};
use steemvote_time::SteemTime;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Candidate accepted by the policy, waiting for its vote
#[derive(Debug, Clone)]
struct PendingVote {
    candidate: CandidateComment,
    priority: PriorityLevel,
    /// failed submissions so far
    attempts: u32,
}

/// Result of the evaluation of one candidate
enum Evaluation {
    /// stays in the pending-evaluation set
    Wait,
    /// moves to the pending-vote set
    Accept(PriorityLevel),
    /// leaves the engine
    Reject(&'static str),
}

/// Owns the chain session and the candidate sets
pub struct VotingEngine {
    config: EngineConfig,
    policy: Arc<Policy>,
    /// released on close
    chain: Option<Arc<dyn ChainService>>,
    store: Arc<dyn VoteStoreController>,
    /// dropped on close, so that the monitor's sends fail
    intake: Option<IntakeReceiver>,
    state: EngineState,
    voting_power: Option<f64>,
    pending_evaluation: BTreeMap<ContentId, CandidateComment>,
    pending_votes: BTreeMap<ContentId, PendingVote>,
    /// given up content, with its creation time
    permanently_failed: HashMap<ContentId, SteemTime>,
    last_vote_batch: Option<Instant>,
}

impl VotingEngine {
    /// Creates a disconnected engine
    pub fn new(
        config: EngineConfig,
        policy: Arc<Policy>,
        chain: Arc<dyn ChainService>,
        store: Arc<dyn VoteStoreController>,
        intake: IntakeReceiver,
    ) -> Self {
        VotingEngine {
            config,
            policy,
            chain: Some(chain),
            store,
            intake: Some(intake),
            state: EngineState::Disconnected,
            voting_power: None,
            pending_evaluation: BTreeMap::new(),
            pending_votes: BTreeMap::new(),
            permanently_failed: HashMap::new(),
            last_vote_batch: None,
        }
    }

    fn chain(&self) -> EngineResult<Arc<dyn ChainService>> {
        self.chain.clone().ok_or(EngineError::Closed)
    }

    async fn fetch_voting_power(&self) -> EngineResult<f64> {
        let chain = self.chain()?;
        let power: ChainResult<f64> = call_chain(
            self.config.rpc_timeout,
            chain.get_account_voting_power(&self.config.voter),
        )
        .await;
        Ok(power?)
    }

    /// Moves everything queued by the monitor into the pending-evaluation set.
    fn drain_intake(&mut self) {
        let Some(intake) = self.intake.as_mut() else {
            return;
        };
        let mut received = Vec::new();
        while let Ok(candidate) = intake.try_recv() {
            received.push(candidate);
        }
        for candidate in received {
            self.add_pending_evaluation(candidate);
        }
    }

    /// The same content found twice is kept once, at its highest priority.
    fn add_pending_evaluation(&mut self, candidate: CandidateComment) {
        match self.pending_evaluation.get(&candidate.id) {
            Some(known)
                if self.policy.priority_for(known) >= self.policy.priority_for(&candidate) =>
            {
                debug!("{} already pending evaluation", candidate.id);
            }
            _ => {
                self.pending_evaluation
                    .insert(candidate.id.clone(), candidate);
            }
        }
    }

    fn evaluate(
        &self,
        candidate: &CandidateComment,
        voting_power: f64,
        now: SteemTime,
    ) -> Evaluation {
        let position = self.policy.age_window().position(candidate.age(now));
        if position == AgePosition::TooOld {
            return Evaluation::Reject("expired");
        }
        if self
            .policy
            .is_blacklisted(&candidate.author, &candidate.category)
        {
            return Evaluation::Reject("blacklisted");
        }
        match self.store.has_voted(&candidate.id) {
            Ok(true) => return Evaluation::Reject("already voted"),
            Ok(false) => {}
            Err(err) => {
                error!("could not check vote on {}: {}", candidate.id, err);
                return Evaluation::Wait;
            }
        }
        if self.pending_votes.contains_key(&candidate.id) {
            return Evaluation::Reject("already pending a vote");
        }
        if self.permanently_failed.contains_key(&candidate.id) {
            return Evaluation::Reject("given up after failed submissions");
        }
        let Some(priority) = self.policy.priority_for(candidate) else {
            return Evaluation::Reject("no priority");
        };
        // the power threshold applies once the content can be voted
        if position == AgePosition::TooYoung {
            return Evaluation::Wait;
        }
        if voting_power < self.policy.min_voting_power_for(priority) {
            return Evaluation::Reject("voting power too low");
        }
        Evaluation::Accept(priority)
    }

    fn evaluate_pending(&mut self, voting_power: f64) -> EngineResult<()> {
        let now = SteemTime::now()?;
        let age_window = self.policy.age_window();
        self.permanently_failed.retain(|_, created_at| {
            age_window.position(now.saturating_sub(*created_at)) != AgePosition::TooOld
        });
        let pending = std::mem::take(&mut self.pending_evaluation);
        for (content_id, candidate) in pending {
            match self.evaluate(&candidate, voting_power, now) {
                Evaluation::Wait => {
                    self.pending_evaluation.insert(content_id, candidate);
                }
                Evaluation::Accept(priority) => {
                    debug!("{} accepted at {} priority", content_id, priority);
                    self.pending_votes.insert(
                        content_id,
                        PendingVote {
                            candidate,
                            priority,
                            attempts: 0,
                        },
                    );
                }
                Evaluation::Reject(reason) => {
                    debug!("{} dropped: {}", content_id, reason);
                }
            }
        }
        Ok(())
    }

    /// Checks a pending vote again right before its submission.
    /// Returns the reason to skip it, if any.
    fn revalidate(
        &self,
        candidate: &CandidateComment,
        now: SteemTime,
    ) -> EngineResult<Option<&'static str>> {
        if self.policy.age_window().position(candidate.age(now)) != AgePosition::Within {
            return Ok(Some("out of the age window"));
        }
        if self
            .policy
            .is_blacklisted(&candidate.author, &candidate.category)
        {
            return Ok(Some("blacklisted"));
        }
        if self.store.has_voted(&candidate.id)? {
            return Ok(Some("already voted"));
        }
        Ok(None)
    }

    /// Submits one pending vote and records it. Returns true when the vote is recorded.
    async fn submit(&mut self, chain: &Arc<dyn ChainService>, content_id: &ContentId) -> bool {
        let submitted = call_chain(
            self.config.rpc_timeout,
            chain.submit_vote(content_id, self.config.vote_weight),
        )
        .await;

        match submitted {
            Ok(()) => {
                let recorded = SteemTime::now().map_err(EngineError::from).and_then(|voted_at| {
                    self.store
                        .record_vote(content_id, voted_at)
                        .map_err(EngineError::from)
                });
                match recorded {
                    Ok(()) => {
                        self.pending_votes.remove(content_id);
                        steemvote_trace!("engine.vote_recorded", {
                            "content_id": content_id.to_string(),
                            "weight": self.config.vote_weight
                        });
                        info!("voted on {}", content_id);
                        true
                    }
                    Err(err) => {
                        error!(
                            "vote on {} was submitted but could not be recorded: {}",
                            content_id, err
                        );
                        false
                    }
                }
            }
            Err(err) => {
                self.count_failed_attempt(content_id, err);
                false
            }
        }
    }

    /// One more failed attempt on a pending vote, given up at `max_vote_attempts`.
    fn count_failed_attempt(&mut self, content_id: &ContentId, err: impl Display) {
        let max_attempts = self.config.max_vote_attempts;
        let Some(pending) = self.pending_votes.get_mut(content_id) else {
            return;
        };
        pending.attempts += 1;
        warn!(
            "vote on {} failed (attempt {}/{}): {}",
            content_id, pending.attempts, max_attempts, err
        );
        if pending.attempts >= max_attempts {
            warn!("giving up on {}", content_id);
            let created_at = pending.candidate.created_at;
            self.pending_votes.remove(content_id);
            self.permanently_failed
                .insert(content_id.clone(), created_at);
        }
    }
}

#[async_trait]
impl VotingEngineController for VotingEngine {
    async fn connect(&mut self) -> EngineResult<()> {
        match self.state {
            EngineState::Closed => return Err(EngineError::Closed),
            EngineState::Connected | EngineState::Running => return Ok(()),
            EngineState::Disconnected => {}
        }
        let power = self.fetch_voting_power().await?;
        self.voting_power = Some(power);
        self.state = EngineState::Connected;
        info!(
            "connected as {}, voting power {:.2}%",
            self.config.voter,
            power * 100.0
        );
        Ok(())
    }

    async fn update(&mut self) -> EngineResult<()> {
        match self.state {
            EngineState::Closed => return Err(EngineError::Closed),
            EngineState::Disconnected => {
                return Err(EngineError::InvalidState(
                    "update called before connect".to_string(),
                ))
            }
            EngineState::Connected => self.state = EngineState::Running,
            EngineState::Running => {}
        }

        let refreshed = self.fetch_voting_power().await;
        self.drain_intake();
        let power = match refreshed {
            Ok(power) => power,
            Err(err) => {
                warn!(
                    "could not refresh voting power, {} candidates wait: {}",
                    self.pending_evaluation.len(),
                    err
                );
                return Err(err);
            }
        };
        self.voting_power = Some(power);
        self.evaluate_pending(power)?;
        debug!(
            "update done: {} pending evaluation, {} pending votes",
            self.pending_evaluation.len(),
            self.pending_votes.len()
        );
        Ok(())
    }

    async fn vote_for_comments(&mut self) -> EngineResult<VoteReport> {
        match self.state {
            EngineState::Closed => return Err(EngineError::Closed),
            EngineState::Disconnected | EngineState::Connected => {
                return Err(EngineError::InvalidState(format!(
                    "vote_for_comments called while {}",
                    self.state
                )))
            }
            EngineState::Running => {}
        }

        let now_instant = Instant::now();
        if let Some(last) = self.last_vote_batch {
            if now_instant.duration_since(last) < self.config.vote_interval.to_duration() {
                return Ok(VoteReport::default());
            }
        }
        self.last_vote_batch = Some(now_instant);

        let chain = self.chain()?;
        let mut report = VoteReport {
            executed: true,
            ..Default::default()
        };
        let mut queue: Vec<(SteemTime, ContentId)> = self
            .pending_votes
            .values()
            .map(|pending| (pending.candidate.created_at, pending.candidate.id.clone()))
            .collect();
        queue.sort();

        let now = SteemTime::now()?;
        for (_, content_id) in queue {
            let Some(pending) = self.pending_votes.get(&content_id) else {
                continue;
            };
            match self.revalidate(&pending.candidate, now) {
                Ok(None) => {}
                Ok(Some(reason)) => {
                    debug!("{} skipped: {}", content_id, reason);
                    self.pending_votes.remove(&content_id);
                    report.skipped.push(content_id);
                    continue;
                }
                Err(err) => {
                    error!("could not check vote on {}: {}", content_id, err);
                    self.count_failed_attempt(&content_id, err);
                    report.failed.push(content_id);
                    continue;
                }
            }
            debug!(
                "submitting vote on {} ({} priority)",
                content_id, pending.priority
            );
            if self.submit(&chain, &content_id).await {
                report.voted.push(content_id);
            } else {
                report.failed.push(content_id);
            }
        }

        if !report.is_empty() {
            info!(
                "vote batch: {} voted, {} failed, {} skipped",
                report.voted.len(),
                report.failed.len(),
                report.skipped.len()
            );
        }
        Ok(report)
    }

    fn state(&self) -> EngineState {
        self.state
    }

    fn snapshot(&self) -> EngineResult<EngineSnapshot> {
        if self.state == EngineState::Closed {
            return Err(EngineError::Closed);
        }
        Ok(EngineSnapshot {
            state: self.state,
            voting_power: self.voting_power,
            pending_evaluation: self.pending_evaluation.len(),
            pending_votes: self.pending_votes.len(),
            permanently_failed: self.permanently_failed.len(),
            recorded_votes: self.store.vote_count()?,
        })
    }

    fn close(&mut self) -> EngineResult<()> {
        if self.state == EngineState::Closed {
            return Ok(());
        }
        self.state = EngineState::Closed;
        if let Some(mut intake) = self.intake.take() {
            intake.close();
        }
        self.chain = None;
        self.pending_evaluation.clear();
        self.pending_votes.clear();

        let flushed = self.store.flush();
        let closed = self.store.close();
        flushed.and(closed)?;
        info!("voting engine closed");
        Ok(())
    }
}
