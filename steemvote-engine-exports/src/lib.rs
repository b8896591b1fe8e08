// Copyright (c) 2022 THE STEEMVOTE AUTHORS

//! Voting engine and content monitor: configuration, errors, reports and the
//! controller traits implemented in `steemvote_engine_worker`.
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod channels;
mod config;
mod controller_traits;
mod error;
mod types;

pub use channels::{intake_channel, IntakeReceiver, IntakeSender};
pub use config::{EngineConfig, MonitorConfig};
pub use controller_traits::{MonitorManager, VotingEngineController};
pub use error::{EngineError, EngineResult};
pub use types::{EngineSnapshot, EngineState, VoteReport};

#[cfg(feature = "test-exports")]
pub use controller_traits::{MockMonitorManager, MockVotingEngineController};
