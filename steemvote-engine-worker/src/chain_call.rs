use std::future::Future;
use steemvote_chain_exports::{ChainError, ChainResult};
use steemvote_time::SteemTime;

/// Runs a chain call, turning an elapsed `rpc_timeout` into `ChainError::Timeout`.
pub(crate) async fn call_chain<T, F>(rpc_timeout: SteemTime, call: F) -> ChainResult<T>
where
    F: Future<Output = ChainResult<T>>,
{
    match tokio::time::timeout(rpc_timeout.to_duration(), call).await {
        Ok(result) => result,
        Err(_elapsed) => Err(ChainError::Timeout),
    }
}
