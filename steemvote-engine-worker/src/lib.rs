// Copyright (c) 2022 THE STEEMVOTE AUTHORS

//! # General description
//!
//! The monitor is a tokio task polling the chain for content published by
//! tracked authors and content voted on by trusted delegates. It feeds the
//! intake queue.
//!
//! The voting engine drains that queue on every `update`, filters candidates
//! through the policy and the vote store, and submits the remaining ones on
//! `vote_for_comments`, at most once per vote interval.
//!
//! Every chain call is bounded by the configured RPC timeout.

#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod chain_call;
mod engine;
mod monitor;

pub use engine::VotingEngine;
pub use monitor::{start_monitor, Monitor};

#[cfg(test)]
mod tests;
