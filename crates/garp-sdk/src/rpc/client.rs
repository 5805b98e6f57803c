use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::bridge::BridgeClient;
use crate::chat::ChatClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::transport::{HttpRequest, HttpTransport, Transport};
use crate::types::{Balance, BlockInfo, SimulationResult, TransactionInfo};

use super::parsing::{
    balance_from_json, block_info_from_json, simulation_result_from_json, string_from_json,
    transaction_info_from_json, u64_from_json,
};
use super::protocol::{
    decode_batch_response, decode_response, encode_request, BatchCall, JsonRpcRequest,
};

const RPC_PATH: &str = "rpc";

/// Async JSON-RPC client for a Garp node.
///
/// Each call is one HTTP POST to `{base_url}/rpc`. Request ids start at 1 and
/// are reserved before the request is sent, so a dropped (cancelled) call
/// never hands its id to another request. The client is `Send + Sync`;
/// share it between tasks through an `Arc`.
pub struct GarpClient {
    transport: Arc<dyn Transport>,
    next_id: AtomicU64,
}

impl GarpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Shorthand for [`GarpClient::new`] with default settings.
    pub fn connect(base_url: &str) -> Result<Self, ClientError> {
        Self::new(&ClientConfig::new(base_url)?)
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    /// Bridge REST client sharing this client's transport.
    pub fn bridge(&self) -> BridgeClient {
        BridgeClient::with_transport(Arc::clone(&self.transport))
    }

    /// Chat REST client sharing this client's transport.
    pub fn chat(&self) -> ChatClient {
        ChatClient::with_transport(Arc::clone(&self.transport))
    }

    /// Atomically reserve `count` consecutive request ids.
    fn reserve_request_ids(&self, count: u64) -> u64 {
        self.next_id.fetch_add(count, Ordering::Relaxed)
    }

    /// Issue one JSON-RPC call and return its raw `result`.
    ///
    /// `params: None` omits the `params` member from the request.
    pub async fn call(
        &self,
        method: &str,
        params: Option<Vec<Value>>,
    ) -> Result<Value, ClientError> {
        let id = self.reserve_request_ids(1);
        debug!(
            rpc.id = id,
            rpc.method = method,
            rpc.params = params.as_ref().map_or(0, Vec::len),
            "rpc call"
        );
        let body = encode_request(method, params, id).to_value();

        let response = self
            .transport
            .send(HttpRequest::post([RPC_PATH], body))
            .await?;
        debug!(rpc.id = id, rpc.method = method, status = response.status, "rpc response");

        decode_response(&response.into_success_body()?)
    }

    /// Send several calls as one JSON array in a single POST.
    ///
    /// Returns one outcome per call, in call order, matched to responses by
    /// id. The outer error is reserved for failures of the whole exchange
    /// (transport, non-array body). An empty batch sends nothing.
    pub async fn rpc_batch(
        &self,
        calls: &[BatchCall],
    ) -> Result<Vec<Result<Value, ClientError>>, ClientError> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        let start_id = self.reserve_request_ids(calls.len() as u64);
        debug!(
            rpc.batch_start_id = start_id,
            rpc.batch_size = calls.len(),
            "rpc batch call"
        );
        let requests: Vec<_> = calls
            .iter()
            .enumerate()
            .map(|(offset, call)| {
                encode_request(&call.method, call.params.clone(), start_id + offset as u64)
            })
            .collect();
        let ids: Vec<u64> = requests.iter().map(|req| req.id).collect();
        let body = Value::Array(requests.iter().map(JsonRpcRequest::to_value).collect());

        let response = self
            .transport
            .send(HttpRequest::post([RPC_PATH], body))
            .await?;
        debug!(
            rpc.batch_start_id = start_id,
            rpc.batch_size = calls.len(),
            status = response.status,
            "rpc batch response"
        );

        decode_batch_response(&response.into_success_body()?, &ids)
    }

    // Timing & consensus

    pub async fn get_slot(&self) -> Result<u64, ClientError> {
        let raw = self.call("getSlot", None).await?;
        Ok(u64_from_json(&raw)?)
    }

    pub async fn get_slot_leader(&self) -> Result<String, ClientError> {
        let raw = self.call("getSlotLeader", None).await?;
        Ok(string_from_json(&raw)?)
    }

    // Blocks

    /// `None` when the node has no block at `slot`.
    pub async fn get_block_by_slot(&self, slot: u64) -> Result<Option<BlockInfo>, ClientError> {
        self.get_block(json!(slot)).await
    }

    /// `None` when the node has no block with this hash.
    pub async fn get_block_by_hash(&self, hash: &str) -> Result<Option<BlockInfo>, ClientError> {
        self.get_block(json!(hash)).await
    }

    // Same remote method for both lookups; the node dispatches on the
    // parameter's JSON type.
    async fn get_block(&self, key: Value) -> Result<Option<BlockInfo>, ClientError> {
        let raw = self.call("getBlock", Some(vec![key])).await?;
        if raw.is_null() {
            return Ok(None);
        }
        Ok(Some(block_info_from_json(&raw)?))
    }

    // Transactions

    pub async fn get_transaction(
        &self,
        tx_id: &str,
    ) -> Result<Option<TransactionInfo>, ClientError> {
        let raw = self.call("getTransaction", Some(vec![json!(tx_id)])).await?;
        if raw.is_null() {
            return Ok(None);
        }
        Ok(Some(transaction_info_from_json(&raw)?))
    }

    /// Submit a serialized transaction; returns the transaction id.
    pub async fn send_transaction(&self, serialized: &str) -> Result<String, ClientError> {
        let raw = self
            .call("sendTransaction", Some(vec![json!(serialized)]))
            .await?;
        Ok(string_from_json(&raw)?)
    }

    pub async fn simulate_transaction(
        &self,
        serialized: &str,
    ) -> Result<SimulationResult, ClientError> {
        let raw = self
            .call("simulateTransaction", Some(vec![json!(serialized)]))
            .await?;
        Ok(simulation_result_from_json(&raw)?)
    }

    // Wallets

    pub async fn get_balance(&self, address: &str) -> Result<Balance, ClientError> {
        let raw = self.call("getBalance", Some(vec![json!(address)])).await?;
        Ok(balance_from_json(&raw)?)
    }

    // Node info

    pub async fn get_version(&self) -> Result<String, ClientError> {
        let raw = self.call("getVersion", None).await?;
        Ok(string_from_json(&raw)?)
    }

    pub async fn get_health(&self) -> Result<String, ClientError> {
        let raw = self.call("getHealth", None).await?;
        Ok(string_from_json(&raw)?)
    }
}
