//! Cross-chain bridge REST client (`/api/v1/bridge/...`).
//!
//! Every endpoint answers with a `{success, data?, error?}` envelope;
//! `success: false` surfaces as [`ClientError::Api`].

use std::sync::Arc;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ClientError, DecodeError};
use crate::rest::{decode_payload, encode_body, send_json, unwrap_envelope};
use crate::transport::{HttpRequest, HttpTransport, Transport};
use crate::types::{AssetMappingRequest, BridgeTransferRequest};

const BRIDGE_PREFIX: [&str; 3] = ["api", "v1", "bridge"];

pub struct BridgeClient {
    transport: Arc<dyn Transport>,
}

impl BridgeClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::with_transport(Arc::new(HttpTransport::new(config)?)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Start a transfer; returns the bridge transfer id.
    pub async fn initiate_transfer(
        &self,
        request: &BridgeTransferRequest,
    ) -> Result<String, ClientError> {
        let body = encode_body(request, "transfer request")?;
        let value = send_json(
            self.transport.as_ref(),
            HttpRequest::post(bridge_path(&["transfer"]), body),
        )
        .await?;
        let data = unwrap_envelope(value, "bridge transfer failed")?;

        match data.get("bridge_tx_id") {
            Some(Value::String(id)) => Ok(id.clone()),
            None | Some(Value::Null) => {
                Err(DecodeError::MissingField("data.bridge_tx_id".to_owned()).into())
            }
            Some(other) => Err(DecodeError::InvalidField {
                field: "data.bridge_tx_id".to_owned(),
                reason: format!("expected a string, got {other}"),
            }
            .into()),
        }
    }

    /// Current status text of a transfer.
    pub async fn transfer_status(&self, bridge_tx_id: &str) -> Result<String, ClientError> {
        let value = send_json(
            self.transport.as_ref(),
            HttpRequest::get(bridge_path(&["transfer", bridge_tx_id, "status"])),
        )
        .await?;
        let data = unwrap_envelope(value, "failed to get bridge transfer status")?;
        decode_payload(data, "data")
    }

    pub async fn add_asset_mapping(&self, request: &AssetMappingRequest) -> Result<(), ClientError> {
        let body = encode_body(request, "asset mapping")?;
        let value = send_json(
            self.transport.as_ref(),
            HttpRequest::post(bridge_path(&["assets"]), body),
        )
        .await?;
        unwrap_envelope(value, "failed to add asset mapping")?;
        Ok(())
    }

    /// The mapping for `source_asset` from `source_chain` to `target_chain`,
    /// as the service returns it.
    pub async fn asset_mapping(
        &self,
        source_chain: &str,
        source_asset: &str,
        target_chain: &str,
    ) -> Result<Value, ClientError> {
        let value = send_json(
            self.transport.as_ref(),
            HttpRequest::get(bridge_path(&["assets", source_chain, source_asset, target_chain])),
        )
        .await?;
        unwrap_envelope(value, "failed to get asset mapping")
    }
}

fn bridge_path(tail: &[&str]) -> Vec<String> {
    BRIDGE_PREFIX
        .iter()
        .chain(tail)
        .map(|s| (*s).to_owned())
        .collect()
}
