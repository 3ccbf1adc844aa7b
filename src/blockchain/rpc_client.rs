use crate::error::RpcError;
use crate::logging::{LogContext, MetricsLogger, PerformanceMonitor};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// JSON-RPC error codes Solana nodes return for slots that were skipped or
/// purged from long-term storage. Both mean "no block at this slot".
const SLOT_SKIPPED_CODES: [i64; 2] = [-32007, -32009];

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Vec<Value>,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// A confirmed block as returned by `getBlock` with `jsonParsed` encoding.
///
/// Only the parts the extractor needs are modeled. Instruction payloads stay
/// raw `Value`s so one malformed instruction cannot fail the whole block.
#[derive(Debug, Deserialize)]
pub struct BlockData {
    #[serde(default)]
    pub transactions: Vec<TransactionEnvelope>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionEnvelope {
    pub transaction: Option<TransactionData>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionData {
    pub message: TransactionMessage,
}

#[derive(Debug, Deserialize)]
pub struct TransactionMessage {
    #[serde(default)]
    pub instructions: Vec<InstructionData>,
}

#[derive(Debug, Deserialize)]
pub struct InstructionData {
    #[serde(rename = "programId", default)]
    pub program_id: Option<String>,
    /// Present for instructions the node could decode; absent for raw ones
    #[serde(default)]
    pub parsed: Option<Value>,
}

#[derive(Clone)]
pub struct SolanaRpcClient {
    client: Client,
    endpoint: String,
}

impl SolanaRpcClient {
    pub fn new(endpoint: String) -> Self {
        Self::new_with_config(endpoint, 30)
    }

    pub fn new_with_config(endpoint: String, timeout_seconds: u64) -> Self {
        let context = LogContext::new("rpc_client", "initialization")
            .with_metadata("endpoint", json!(endpoint))
            .with_metadata("timeout_seconds", json!(timeout_seconds));
        context.info("Initializing Solana RPC client");

        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_seconds))
                .build()
                .expect("Failed to create HTTP client"),
            endpoint,
        }
    }

    /// Send one JSON-RPC request. `Ok(None)` means the node answered without
    /// a usable result (absent or null); JSON-RPC errors come back as
    /// `RpcError::Method` for the callers to interpret.
    async fn make_request(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Option<Value>, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let rpc_response: JsonRpcResponse = response.json().await?;

        if let Some(error) = rpc_response.error {
            return Err(RpcError::Method {
                code: error.code,
                message: error.message,
            });
        }

        match rpc_response.result {
            Some(Value::Null) | None => Ok(None),
            Some(value) => Ok(Some(value)),
        }
    }

    /// Latest confirmed slot. `Ok(None)` when the node has no answer, which
    /// the scanner treats as "nothing to scan".
    pub async fn get_latest_slot(&self) -> Result<Option<u64>, RpcError> {
        let monitor = PerformanceMonitor::new("rpc_get_slot");

        let result = self.make_request("getSlot", vec![]).await;
        let duration = monitor.finish_with_result(&result);

        MetricsLogger::log_rpc_call("getSlot", duration, result.is_ok());

        match result? {
            Some(value) => {
                let slot = value.as_u64().ok_or_else(|| {
                    RpcError::InvalidResponse("Slot is not an unsigned integer".to_string())
                })?;

                let context = LogContext::new("rpc_client", "get_latest_slot").with_slot(slot);
                context.debug(&format!("Retrieved latest slot: {}", slot));

                Ok(Some(slot))
            }
            None => Ok(None),
        }
    }

    /// Fetch one confirmed block with parsed instructions. `Ok(None)` covers
    /// null results and the slot-skipped error codes; anything else that goes
    /// wrong is a real `RpcError`.
    pub async fn get_block(&self, slot: u64) -> Result<Option<BlockData>, RpcError> {
        let monitor = PerformanceMonitor::new("rpc_get_block").with_metadata("slot", json!(slot));

        let params = vec![
            json!(slot),
            json!({
                "encoding": "jsonParsed",
                "transactionDetails": "full",
                "rewards": false,
                "maxSupportedTransactionVersion": 0
            }),
        ];

        let result = self.make_request("getBlock", params).await;
        let duration = monitor.finish_with_result(&result);

        MetricsLogger::log_rpc_call("getBlock", duration, result.is_ok());

        let value = match result {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(None),
            Err(RpcError::Method { code, message }) if SLOT_SKIPPED_CODES.contains(&code) => {
                let context = LogContext::new("rpc_client", "get_block")
                    .with_slot(slot)
                    .with_metadata("code", json!(code));
                context.debug(&format!("Slot {} has no block: {}", slot, message));
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let block: BlockData = serde_json::from_value(value)?;

        let context = LogContext::new("rpc_client", "get_block")
            .with_slot(slot)
            .with_metadata("transaction_count", json!(block.transactions.len()));
        context.debug(&format!(
            "Retrieved block at slot {} with {} transactions",
            slot,
            block.transactions.len()
        ));

        Ok(Some(block))
    }
}
