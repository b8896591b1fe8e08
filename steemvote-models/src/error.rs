// Copyright (c) 2022 THE STEEMVOTE AUTHORS

use displaydoc::Display;
use thiserror::Error;

/// models result
pub type ModelsResult<T, E = ModelsError> = core::result::Result<T, E>;

/// models error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq)]
pub enum ModelsError {
    /// configuration error: {0}
    ConfigError(String),
    /// invalid content identifier: {0}
    InvalidContentId(String),
    /// Time error {0}
    TimeError(#[from] steemvote_time::TimeError),
}
