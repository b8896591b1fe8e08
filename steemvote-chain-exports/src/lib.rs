// Copyright (c) 2022 THE STEEMVOTE AUTHORS

//! Contract between the voting core and the Steem chain: the async
//! `ChainService` trait, its configuration and its errors.
//!
//! With the `test-exports` feature, a `mockall` automock and a scripted
//! in-memory `TestChain` are exported for tests of dependent crates.
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod config;
mod error;
mod service;

pub use config::ChainConfig;
pub use error::{ChainError, ChainResult};
pub use service::ChainService;

#[cfg(feature = "test-exports")]
pub use service::MockChainService;

/// Test utils
#[cfg(feature = "test-exports")]
pub mod test_exports;
