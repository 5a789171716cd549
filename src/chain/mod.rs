// Base chain access
// JSON-RPC client used by payment verification and the status endpoint

pub mod client;
pub mod error;

pub use client::{BaseRpcClient, ReceiptLog, TransactionReceipt};
pub use error::ChainRpcError;
