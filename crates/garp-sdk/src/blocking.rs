//! Blocking facade over the async clients.
//!
//! [`BlockingGarpClient`] owns a current-thread Tokio runtime and drives the
//! async [`GarpClient`] to completion on the calling thread, so both variants
//! share one implementation and behave identically. Do not call it from
//! inside an async runtime; use [`GarpClient`] there.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::{Builder, Runtime};

use crate::bridge::BridgeClient;
use crate::chat::ChatClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::rpc::{BatchCall, GarpClient};
use crate::transport::{HttpTransport, Transport};
use crate::types::{
    AssetMappingRequest, Balance, BlockInfo, BridgeTransferRequest, Message, MessageQuery,
    MessageReceipt, NewMessage, Signal, SimulationResult, TransactionInfo,
};

pub struct BlockingGarpClient {
    inner: GarpClient,
    runtime: Runtime,
}

impl BlockingGarpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_transport(Arc::new(HttpTransport::new(config)?))
    }

    pub fn connect(base_url: &str) -> Result<Self, ClientError> {
        Self::new(&ClientConfig::new(base_url)?)
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Result<Self, ClientError> {
        Ok(Self {
            inner: GarpClient::with_transport(transport),
            runtime: new_runtime()?,
        })
    }

    /// Bridge client sharing this client's transport and runtime.
    pub fn bridge(&self) -> BlockingBridgeClient<'_> {
        BlockingBridgeClient {
            inner: self.inner.bridge(),
            runtime: &self.runtime,
        }
    }

    /// Chat client sharing this client's transport and runtime.
    pub fn chat(&self) -> BlockingChatClient<'_> {
        BlockingChatClient {
            inner: self.inner.chat(),
            runtime: &self.runtime,
        }
    }

    pub fn call(&self, method: &str, params: Option<Vec<Value>>) -> Result<Value, ClientError> {
        self.runtime.block_on(self.inner.call(method, params))
    }

    pub fn rpc_batch(
        &self,
        calls: &[BatchCall],
    ) -> Result<Vec<Result<Value, ClientError>>, ClientError> {
        self.runtime.block_on(self.inner.rpc_batch(calls))
    }

    pub fn get_slot(&self) -> Result<u64, ClientError> {
        self.runtime.block_on(self.inner.get_slot())
    }

    pub fn get_slot_leader(&self) -> Result<String, ClientError> {
        self.runtime.block_on(self.inner.get_slot_leader())
    }

    pub fn get_block_by_slot(&self, slot: u64) -> Result<Option<BlockInfo>, ClientError> {
        self.runtime.block_on(self.inner.get_block_by_slot(slot))
    }

    pub fn get_block_by_hash(&self, hash: &str) -> Result<Option<BlockInfo>, ClientError> {
        self.runtime.block_on(self.inner.get_block_by_hash(hash))
    }

    pub fn get_transaction(&self, tx_id: &str) -> Result<Option<TransactionInfo>, ClientError> {
        self.runtime.block_on(self.inner.get_transaction(tx_id))
    }

    pub fn send_transaction(&self, serialized: &str) -> Result<String, ClientError> {
        self.runtime.block_on(self.inner.send_transaction(serialized))
    }

    pub fn simulate_transaction(&self, serialized: &str) -> Result<SimulationResult, ClientError> {
        self.runtime
            .block_on(self.inner.simulate_transaction(serialized))
    }

    pub fn get_balance(&self, address: &str) -> Result<Balance, ClientError> {
        self.runtime.block_on(self.inner.get_balance(address))
    }

    pub fn get_version(&self) -> Result<String, ClientError> {
        self.runtime.block_on(self.inner.get_version())
    }

    pub fn get_health(&self) -> Result<String, ClientError> {
        self.runtime.block_on(self.inner.get_health())
    }
}

pub struct BlockingBridgeClient<'a> {
    inner: BridgeClient,
    runtime: &'a Runtime,
}

impl BlockingBridgeClient<'_> {
    pub fn initiate_transfer(&self, request: &BridgeTransferRequest) -> Result<String, ClientError> {
        self.runtime.block_on(self.inner.initiate_transfer(request))
    }

    pub fn transfer_status(&self, bridge_tx_id: &str) -> Result<String, ClientError> {
        self.runtime.block_on(self.inner.transfer_status(bridge_tx_id))
    }

    pub fn add_asset_mapping(&self, request: &AssetMappingRequest) -> Result<(), ClientError> {
        self.runtime.block_on(self.inner.add_asset_mapping(request))
    }

    pub fn asset_mapping(
        &self,
        source_chain: &str,
        source_asset: &str,
        target_chain: &str,
    ) -> Result<Value, ClientError> {
        self.runtime.block_on(
            self.inner
                .asset_mapping(source_chain, source_asset, target_chain),
        )
    }
}

pub struct BlockingChatClient<'a> {
    inner: ChatClient,
    runtime: &'a Runtime,
}

impl BlockingChatClient<'_> {
    pub fn send_message(&self, message: &NewMessage) -> Result<MessageReceipt, ClientError> {
        self.runtime.block_on(self.inner.send_message(message))
    }

    pub fn list_messages(&self, query: &MessageQuery) -> Result<Vec<Message>, ClientError> {
        self.runtime.block_on(self.inner.list_messages(query))
    }

    pub fn public_key(&self, address: &str) -> Result<HashMap<String, String>, ClientError> {
        self.runtime.block_on(self.inner.public_key(address))
    }

    pub fn send_signal(&self, signal: &Signal) -> Result<(), ClientError> {
        self.runtime.block_on(self.inner.send_signal(signal))
    }
}

fn new_runtime() -> Result<Runtime, ClientError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ClientError::Config(format!("cannot start blocking runtime: {e}")))
}
