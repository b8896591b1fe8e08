// Copyright (c) 2022 THE STEEMVOTE AUTHORS

use displaydoc::Display;
use thiserror::Error;

/// time error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// Error converting
    ConversionError,
    /// Time overflow error
    TimeOverflowError,
    /// Invalid chain timestamp: {0}
    ParseError(String),
}
