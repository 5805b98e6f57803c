//! Chat and signaling REST client.
//!
//! The chat service answers with plain JSON bodies. Gateways that wrap
//! replies in a `{success, data, error}` envelope are handled too: an object
//! with a boolean `success` key is unwrapped first.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::rest::{decode_payload, encode_body, is_envelope, send_json, unwrap_envelope};
use crate::transport::{HttpRequest, HttpTransport, Transport};
use crate::types::{Message, MessageQuery, MessageReceipt, NewMessage, Signal};

pub struct ChatClient {
    transport: Arc<dyn Transport>,
}

impl ChatClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::with_transport(Arc::new(HttpTransport::new(config)?)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Store an encrypted message for `recipient`.
    pub async fn send_message(&self, message: &NewMessage) -> Result<MessageReceipt, ClientError> {
        let body = encode_body(message, "message")?;
        self.request(HttpRequest::post(["messages"], body), "failed to send message")
            .await
    }

    /// Messages exchanged between `query.address` and `query.peer`.
    pub async fn list_messages(&self, query: &MessageQuery) -> Result<Vec<Message>, ClientError> {
        let mut req = HttpRequest::get(["messages"])
            .with_query("address", query.address.as_str())
            .with_query("peer", query.peer.as_str());
        if let Some(since) = query.since.as_deref().filter(|s| !s.is_empty()) {
            req = req.with_query("since", since);
        }
        if let Some(limit) = query.limit.filter(|l| *l > 0) {
            req = req.with_query("limit", limit.to_string());
        }
        self.request(req, "failed to list messages").await
    }

    /// Published key material for `address`.
    pub async fn public_key(&self, address: &str) -> Result<HashMap<String, String>, ClientError> {
        self.request(HttpRequest::get(["keys", address]), "failed to get public key")
            .await
    }

    /// Relay a signaling envelope. The response body is ignored unless it is
    /// a failed envelope.
    pub async fn send_signal(&self, signal: &Signal) -> Result<(), ClientError> {
        let body = encode_body(signal, "signal")?;
        let value = send_json(self.transport.as_ref(), HttpRequest::post(["signals"], body)).await?;
        if is_envelope(&value) {
            unwrap_envelope(value, "failed to send signal")?;
        }
        Ok(())
    }

    async fn request<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
        fallback: &str,
    ) -> Result<T, ClientError> {
        let mut value = send_json(self.transport.as_ref(), request).await?;
        if is_envelope(&value) {
            value = unwrap_envelope(value, fallback)?;
        }
        decode_payload(value, "body")
    }
}
