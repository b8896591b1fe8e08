use serde::Deserialize;
use steemvote_time::SteemTime;

/// Chain client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of a Steem node, used for reads
    pub node_url: String,
    /// JSON-RPC endpoint of a wallet holding the voter's posting key
    pub wallet_url: String,
    /// account casting the votes
    pub voter: String,
    /// upper bound of a single chain call
    pub rpc_timeout: SteemTime,
    /// vote weight in basis points (10000 = 100%)
    pub vote_weight: u16,
}
