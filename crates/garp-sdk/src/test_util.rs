//! Shared test helpers for `garp-sdk` unit tests.
//!
//! Builders for canned node payloads and a shortcut for wiring a client to a
//! scripted [`MockTransport`], so every module's tests construct fixtures the
//! same way.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::rpc::GarpClient;
use crate::transport::mock::{MockTransport, MockTransportBuilder};

// ==============================================================================
// Client Wiring
// ==============================================================================

/// Build the mock and return it alongside a client that sends through it.
pub fn client_with(builder: MockTransportBuilder) -> (GarpClient, Arc<MockTransport>) {
    let mock = Arc::new(builder.build());
    let client = GarpClient::with_transport(mock.clone());
    (client, mock)
}

/// JSON-RPC ids of every request the mock has seen, in send order.
pub fn rpc_ids(mock: &MockTransport) -> Vec<u64> {
    mock.bodies()
        .iter()
        .map(|body| body["id"].as_u64().expect("rpc request must carry an id"))
        .collect()
}

// ==============================================================================
// Payload Builders
// ==============================================================================

/// A block result carrying only the required fields.
pub fn block_json(slot: u64, hash: &str) -> Value {
    json!({ "slot": slot, "hash": hash })
}

/// `{"success": true, "data": data}`.
pub fn api_ok(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

/// `{"success": false, "error": message}`.
pub fn api_err(message: &str) -> Value {
    json!({ "success": false, "error": message })
}
