// Copyright (c) 2022 THE STEEMVOTE AUTHORS

use crate::chain_call::call_chain;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use steemvote_chain_exports::ChainService;
use steemvote_engine_exports::{IntakeSender, MonitorConfig, MonitorManager};
use steemvote_models::{CandidateComment, ContentId, DiscoveredVia, Policy};
use steemvote_time::SteemTime;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Keeps only the content the policy cares about, tagging author content.
fn classify(policy: &Policy, candidate: CandidateComment) -> Option<CandidateComment> {
    match &candidate.discovered_via {
        DiscoveredVia::Unknown | DiscoveredVia::Author => {
            if policy.is_tracked_author(&candidate.author) {
                Some(candidate.with_source(DiscoveredVia::Author))
            } else {
                None
            }
        }
        DiscoveredVia::Delegate(delegate) => {
            if policy.is_tracked_delegate(delegate) {
                Some(candidate)
            } else {
                None
            }
        }
    }
}

/// Discovery state, owned by the monitor task
struct MonitorWorker {
    config: MonitorConfig,
    policy: Arc<Policy>,
    chain: Arc<dyn ChainService>,
    intake: IntakeSender,
    /// creation time of the newest content seen
    content_cursor: SteemTime,
    /// content created exactly at `content_cursor`, already forwarded
    seen_at_cursor: HashSet<ContentId>,
    /// start of the last successful round, per delegate
    vote_cursors: HashMap<String, SteemTime>,
}

impl MonitorWorker {
    fn new(
        config: MonitorConfig,
        policy: Arc<Policy>,
        chain: Arc<dyn ChainService>,
        intake: IntakeSender,
    ) -> Self {
        MonitorWorker {
            content_cursor: config.start_from,
            config,
            policy,
            chain,
            intake,
            seen_at_cursor: HashSet::new(),
            vote_cursors: HashMap::new(),
        }
    }

    async fn run(mut self, mut stop_rx: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.config.poll_interval.to_duration());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        _ = &mut stop_rx => break,
                        intake_open = self.discover() => if !intake_open {
                            debug!("intake queue closed, monitor exits");
                            break;
                        }
                    }
                }
            }
        }
        debug!("monitor task exits");
    }

    /// One discovery round. Returns false once the intake queue is closed.
    async fn discover(&mut self) -> bool {
        let round_start = SteemTime::now().unwrap_or(self.content_cursor);
        let mut found = Vec::new();

        let listed = call_chain(
            self.config.listing_timeout,
            self.chain.list_recent_content(self.content_cursor),
        )
        .await;
        match listed {
            Ok(contents) => {
                for candidate in contents {
                    if self.advance_content_cursor(&candidate) {
                        found.extend(classify(&self.policy, candidate));
                    }
                }
            }
            Err(err) => warn!("could not list recent content: {}", err),
        }

        for delegate in self.policy.delegates() {
            let since = self
                .vote_cursors
                .get(&delegate.name)
                .copied()
                .unwrap_or(self.config.start_from);
            let listed = call_chain(
                self.config.listing_timeout,
                self.chain.list_account_votes(&delegate.name, since),
            )
            .await;
            match listed {
                Ok(voted) => {
                    found.extend(
                        voted
                            .into_iter()
                            .filter_map(|candidate| classify(&self.policy, candidate)),
                    );
                    self.vote_cursors.insert(delegate.name, round_start);
                }
                Err(err) => warn!("could not list votes of {}: {}", delegate.name, err),
            }
        }

        if !found.is_empty() {
            debug!("monitor discovered {} candidates", found.len());
        }
        for candidate in found {
            if self.intake.send(candidate).await.is_err() {
                return false;
            }
        }
        true
    }

    /// Moves the content cursor forward. Returns false for content already seen.
    fn advance_content_cursor(&mut self, candidate: &CandidateComment) -> bool {
        if candidate.created_at < self.content_cursor {
            return false;
        }
        if candidate.created_at > self.content_cursor {
            self.content_cursor = candidate.created_at;
            self.seen_at_cursor.clear();
        }
        self.seen_at_cursor.insert(candidate.id.clone())
    }
}

/// Background discovery of candidate content
pub struct Monitor {
    config: MonitorConfig,
    policy: Arc<Policy>,
    chain: Arc<dyn ChainService>,
    intake: IntakeSender,
    task: Option<(oneshot::Sender<()>, JoinHandle<()>)>,
}

impl Monitor {
    /// Creates a stopped monitor
    pub fn new(
        config: MonitorConfig,
        policy: Arc<Policy>,
        chain: Arc<dyn ChainService>,
        intake: IntakeSender,
    ) -> Self {
        Monitor {
            config,
            policy,
            chain,
            intake,
            task: None,
        }
    }
}

#[async_trait]
impl MonitorManager for Monitor {
    fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let worker = MonitorWorker::new(
            self.config.clone(),
            self.policy.clone(),
            self.chain.clone(),
            self.intake.clone(),
        );
        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(worker.run(stop_rx));
        self.task = Some((stop_tx, handle));
        info!(
            "monitor started, polling every {} ms",
            self.config.poll_interval.to_millis()
        );
    }

    async fn stop(&mut self) {
        let Some((stop_tx, handle)) = self.task.take() else {
            return;
        };
        // the task may already be gone
        let _ = stop_tx.send(());
        if let Err(err) = handle.await {
            warn!("monitor task ended abnormally: {}", err);
        }
        info!("monitor stopped");
    }

    fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .map(|(_, handle)| !handle.is_finished())
            .unwrap_or(false)
    }
}

/// Creates and starts a monitor. Must be called from within a tokio runtime.
pub fn start_monitor(
    config: MonitorConfig,
    policy: Arc<Policy>,
    chain: Arc<dyn ChainService>,
    intake: IntakeSender,
) -> Box<dyn MonitorManager> {
    let mut monitor = Monitor::new(config, policy, chain, intake);
    monitor.start();
    Box::new(monitor)
}
