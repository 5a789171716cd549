// Error types for Base RPC operations

use thiserror::Error;

/// Errors that can occur talking to the Base JSON-RPC endpoint
#[derive(Debug, Clone, Error)]
pub enum ChainRpcError {
    /// Transport-level failure reaching the endpoint
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint returned a JSON-RPC error object
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The response could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
}
