// Copyright (c) 2022 THE STEEMVOTE AUTHORS

use displaydoc::Display;
use thiserror::Error;

/// chain result
pub type ChainResult<T, E = ChainError> = core::result::Result<T, E>;

/// chain service error. Every variant is transient from the caller's point of view.
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// chain service unreachable: {0}
    ConnectionError(String),
    /// request rejected by the chain service: {0}
    RejectedError(String),
    /// chain service call timed out
    Timeout,
}

impl ChainError {
    /// true if the chain service answered and refused the request
    pub fn is_rejection(&self) -> bool {
        matches!(self, ChainError::RejectedError(_))
    }
}
