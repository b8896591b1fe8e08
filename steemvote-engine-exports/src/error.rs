// Copyright (c) 2022 THE STEEMVOTE AUTHORS

use displaydoc::Display;
use steemvote_chain_exports::ChainError;
use steemvote_db_exports::VoteStoreError;
use thiserror::Error;

/// engine result
pub type EngineResult<T, E = EngineError> = core::result::Result<T, E>;

/// engine error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// chain error: {0}
    ChainError(#[from] ChainError),
    /// vote store error: {0}
    StoreError(#[from] VoteStoreError),
    /// time error: {0}
    TimeError(#[from] steemvote_time::TimeError),
    /// engine is closed
    Closed,
    /// invalid engine state: {0}
    InvalidState(String),
}
