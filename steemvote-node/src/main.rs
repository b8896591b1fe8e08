// Copyright (c) 2022 THE STEEMVOTE AUTHORS
//! Steem curation bot: watches new content, votes for what the policy
//! selects, never votes twice on the same content.
#![warn(unused_crate_dependencies)]

mod settings;

use crate::settings::Settings;
use anyhow::Context;
use clap::Parser;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use steemvote_chain_exports::ChainService;
use steemvote_db_worker::VoteStore;
use steemvote_engine_exports::{intake_channel, MonitorManager, VotingEngineController};
use steemvote_engine_worker::{start_monitor, VotingEngine};
use steemvote_logging::steemvote_trace;
use steemvote_models::Policy;
use steemvote_sdk::SteemClient;
use steemvote_time::SteemTime;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "steemvote")]
#[command(about = "Unattended curation bot for the Steem blockchain")]
struct Args {
    /// Configuration file overriding base_config/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error), overrides the configuration
    #[arg(long)]
    log_level: Option<String>,
}

type ShutdownSignal = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

fn setup_logging(level: &str) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// One synchronization cycle. Errors are logged, never propagated.
async fn run_cycle(engine: &mut VotingEngine) {
    if let Err(err) = engine.update().await {
        warn!("update failed: {}", err);
    }
    match engine.vote_for_comments().await {
        Ok(report) if !report.is_empty() => {
            steemvote_trace!("node.vote_batch", {
                "voted": report.voted.len(),
                "failed": report.failed.len(),
                "skipped": report.skipped.len()
            });
        }
        Ok(_) => {}
        Err(err) => warn!("vote batch failed: {}", err),
    }
    if let Ok(snapshot) = engine.snapshot() {
        debug!(
            "state {}, voting power {:?}, {} pending evaluation, {} pending votes, {} recorded",
            snapshot.state,
            snapshot.voting_power,
            snapshot.pending_evaluation,
            snapshot.pending_votes,
            snapshot.recorded_votes
        );
    }
}

/// Connects the engine, retrying every `retry_interval`.
/// Returns false if the interrupt signal came first.
async fn connect(
    engine: &mut VotingEngine,
    retry_interval: SteemTime,
    shutdown: &mut ShutdownSignal,
) -> bool {
    loop {
        tokio::select! {
            _ = &mut *shutdown => return false,
            connected = engine.connect() => match connected {
                Ok(()) => return true,
                Err(err) => warn!(
                    "could not connect, retrying in {} ms: {}",
                    retry_interval.to_millis(),
                    err
                ),
            },
        }
        tokio::select! {
            _ = &mut *shutdown => return false,
            _ = tokio::time::sleep(retry_interval.to_duration()) => {}
        }
    }
}

async fn run(settings: Settings, policy: Policy) -> anyhow::Result<()> {
    // the store is opened first: an incompatible database stops everything
    let store = Arc::new(
        VoteStore::open(settings.store.clone()).context("could not open the vote store")?,
    );
    let chain: Arc<dyn ChainService> = Arc::new(
        SteemClient::new(&settings.chain, settings.monitor.content_batch_size)
            .context("could not build the chain client")?,
    );
    let policy = Arc::new(policy);
    let (intake_tx, intake_rx) = intake_channel(settings.engine.intake_capacity);
    let mut engine = VotingEngine::new(
        settings.engine_config(),
        policy.clone(),
        chain.clone(),
        store,
        intake_rx,
    );

    let mut shutdown: ShutdownSignal = Box::pin(tokio::signal::ctrl_c());
    if !connect(&mut engine, settings.engine.update_interval, &mut shutdown).await {
        info!("interrupt signal received");
        engine.close()?;
        return Ok(());
    }

    let start_from = SteemTime::now()?.saturating_sub(settings.policy.max_post_age);
    let mut monitor = start_monitor(
        settings.monitor_config(start_from),
        policy,
        chain,
        intake_tx,
    );

    let mut ticker = tokio::time::interval(settings.engine.update_interval.to_duration());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("interrupt signal received");
                break;
            }
            _ = ticker.tick() => run_cycle(&mut engine).await,
        }
    }

    monitor.stop().await;
    engine.close()?;
    info!("steemvote stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;
    setup_logging(args.log_level.as_deref().unwrap_or(&settings.logging.level));

    let policy = settings.validate()?;
    info!(
        "steemvote starting as {}: {} authors, {} delegates",
        settings.chain.voter,
        policy.authors().len(),
        policy.delegates().len()
    );
    run(settings, policy).await
}
