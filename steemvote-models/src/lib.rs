// Copyright (c) 2022 THE STEEMVOTE AUTHORS
//! Data definitions shared by the steemvote crates: priority tiers, the
//! curation policy, candidate comments and vote records.
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

pub use comment::{CandidateComment, ContentId, DiscoveredVia, VoteRecord};
pub use error::{ModelsError, ModelsResult};
pub use policy::{
    AgePosition, AgeWindow, AuthorEntry, BlacklistSet, DelegateEntry, Policy, PolicySettings,
    VotingPowerPolicy,
};
pub use priority::PriorityLevel;

/// content identifiers, candidates and vote records
pub mod comment;
/// models error
pub mod error;
/// curation policy
pub mod policy;
/// priority tiers
pub mod priority;
/// settings loading
pub mod settings;
