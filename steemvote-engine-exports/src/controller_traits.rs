// Copyright (c) 2022 THE STEEMVOTE AUTHORS

use crate::{EngineResult, EngineSnapshot, EngineState, VoteReport};
use async_trait::async_trait;

/// Trait defining a voting engine controller
#[cfg_attr(feature = "test-exports", mockall::automock)]
#[async_trait]
pub trait VotingEngineController: Send {
    /// Checks the chain session. `Disconnected` becomes `Connected`.
    async fn connect(&mut self) -> EngineResult<()>;

    /// Refreshes the voting power, drains the intake queue and evaluates
    /// pending candidates.
    async fn update(&mut self) -> EngineResult<()>;

    /// Submits pending votes, at most once per vote interval.
    async fn vote_for_comments(&mut self) -> EngineResult<VoteReport>;

    /// current state
    fn state(&self) -> EngineState;

    /// Read-only view of the engine
    fn snapshot(&self) -> EngineResult<EngineSnapshot>;

    /// Stops accepting candidates, flushes the store and releases the chain session.
    /// Calling it again has no effect.
    fn close(&mut self) -> EngineResult<()>;
}

/// Monitor manager used to stop the monitor task
#[cfg_attr(feature = "test-exports", mockall::automock)]
#[async_trait]
pub trait MonitorManager: Send {
    /// Spawns the discovery task. No effect if it already runs.
    fn start(&mut self);

    /// Stops the discovery task and waits for it to exit.
    /// Nothing is enqueued once this returns.
    async fn stop(&mut self);

    /// true while the discovery task runs
    fn is_running(&self) -> bool;
}
