//! Base JSON-RPC client
//!
//! Thin wrapper over the node's HTTP endpoint; payment verification only
//! needs receipt lookups plus the chain tip for the status endpoint.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::chain::error::ChainRpcError;

/// A single log entry from a transaction receipt
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
}

/// Subset of the eth_getTransactionReceipt result needed for verification
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionReceipt {
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<ReceiptLog>,
}

impl TransactionReceipt {
    /// True when the receipt reports successful execution
    pub fn succeeded(&self) -> bool {
        self.status.as_deref() == Some("0x1")
    }
}

/// JSON-RPC client for a Base node
#[derive(Debug, Clone)]
pub struct BaseRpcClient {
    endpoint: String,
    client: Client,
}

impl BaseRpcClient {
    /// Create a new client for the given endpoint
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: Client::new(),
        }
    }

    /// Make a JSON-RPC call to the Base endpoint
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, ChainRpcError> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ChainRpcError::Network(e.to_string()))?;

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| ChainRpcError::Parse(e.to_string()))?;

        if let Some(error) = response_json.get("error").filter(|e| !e.is_null()) {
            return Err(ChainRpcError::Rpc(error.to_string()));
        }

        response_json
            .get("result")
            .cloned()
            .ok_or_else(|| ChainRpcError::Parse("No result in response".to_string()))
    }

    /// Fetch a transaction receipt. Returns None when the transaction is
    /// unknown or not yet mined (the node answers with a null result).
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, ChainRpcError> {
        let result = self
            .rpc_call("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        serde_json::from_value(result)
            .map(Some)
            .map_err(|e| ChainRpcError::Parse(e.to_string()))
    }

    /// Latest block number on the chain
    pub async fn block_number(&self) -> Result<u64, ChainRpcError> {
        let result = self.rpc_call("eth_blockNumber", json!([])).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| ChainRpcError::Parse("Invalid block number".to_string()))?;

        u64::from_str_radix(hex.trim_start_matches("0x"), 16)
            .map_err(|e| ChainRpcError::Parse(e.to_string()))
    }
}
