// Copyright (c) 2022 THE STEEMVOTE AUTHORS

use steemvote_time::SteemTime;

/// Voting engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// account casting the votes
    pub voter: String,
    /// weight of each vote, in basis points
    pub vote_weight: u16,
    /// minimum time between two vote batches
    pub vote_interval: SteemTime,
    /// upper bound of a single chain call
    pub rpc_timeout: SteemTime,
    /// submissions of a content before it is given up
    pub max_vote_attempts: u32,
}

/// Monitor configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// time between two discovery rounds
    pub poll_interval: SteemTime,
    /// upper bound of one listing, which may span several chain requests
    pub listing_timeout: SteemTime,
    /// content created before this instant is not looked for
    pub start_from: SteemTime,
}
