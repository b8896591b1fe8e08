// Copyright (c) 2022 THE STEEMVOTE AUTHORS

use serde::Serialize;
use std::fmt;
use steemvote_models::ContentId;

/// Lifecycle of the voting engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    /// no chain session yet
    Disconnected,
    /// chain session checked, no update ran yet
    Connected,
    /// updates are running
    Running,
    /// closed, every operation fails
    Closed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            EngineState::Disconnected => "disconnected",
            EngineState::Connected => "connected",
            EngineState::Running => "running",
            EngineState::Closed => "closed",
        };
        write!(f, "{}", state)
    }
}

/// Outcome of one `vote_for_comments` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoteReport {
    /// voted and recorded, in submission order
    pub voted: Vec<ContentId>,
    /// submission or recording failed, kept or given up
    pub failed: Vec<ContentId>,
    /// removed at submission time: out of the age window, blacklisted or already voted
    pub skipped: Vec<ContentId>,
    /// false when the call came before the end of the vote interval
    pub executed: bool,
}

impl VoteReport {
    /// true if nothing was submitted
    pub fn is_empty(&self) -> bool {
        self.voted.is_empty() && self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// Read-only view of the engine, for presentation layers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    /// current state
    pub state: EngineState,
    /// last known voting power of the voter
    pub voting_power: Option<f64>,
    /// candidates waiting for evaluation
    pub pending_evaluation: usize,
    /// candidates waiting for a vote
    pub pending_votes: usize,
    /// candidates given up after too many failed submissions
    pub permanently_failed: usize,
    /// votes in the store
    pub recorded_votes: u64,
}
