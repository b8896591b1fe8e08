// Copyright (c) 2022 THE STEEMVOTE AUTHORS

//! Structured trace events shared by the steemvote crates.
//!
//! `steemvote_trace!("engine.vote_submitted", {"content_id": id, "weight": 10000})`
//! emits a single `trace` level line whose payload is a JSON object, so that
//! a log pipeline can follow one candidate from discovery to vote.

pub use serde_json;
pub use tracing;

/// Emit a `trace` level event tagged with `steemvote_trace` and a JSON payload.
#[macro_export]
macro_rules! steemvote_trace {
    ($evt:expr, $params:tt) => {
        $crate::tracing::trace!(
            "steemvote_trace:{}:{}",
            $evt,
            $crate::serde_json::json!($params)
        );
    };
}
