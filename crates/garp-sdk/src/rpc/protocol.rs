//! JSON-RPC 2.0 envelope encoding and decoding.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ClientError;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    /// `None` omits the field entirely, which some servers treat differently
    /// from an empty list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<Value>>,
}

impl JsonRpcRequest {
    /// The request as the JSON object sent on the wire.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("jsonrpc".to_owned(), Value::from(self.jsonrpc));
        obj.insert("id".to_owned(), Value::from(self.id));
        obj.insert("method".to_owned(), Value::from(self.method.as_str()));
        if let Some(params) = &self.params {
            obj.insert("params".to_owned(), Value::Array(params.clone()));
        }
        Value::Object(obj)
    }
}

/// One element of a batch call.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchCall {
    pub method: String,
    pub params: Option<Vec<Value>>,
}

impl BatchCall {
    pub fn new(method: impl Into<String>, params: Option<Vec<Value>>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

pub fn encode_request(method: &str, params: Option<Vec<Value>>, id: u64) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: JSONRPC_VERSION,
        id,
        method: method.to_owned(),
        params,
    }
}

/// Decode a single response body into its `result` value.
///
/// When a response carries both `error` and `result`, the error wins. A
/// `null` error is treated as absent.
pub fn decode_response(raw: &str) -> Result<Value, ClientError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ClientError::malformed(format!("invalid JSON: {e}"), raw))?;
    decode_envelope(value, raw)
}

/// Decode a batch response body, correlating elements to `ids` by their `id`
/// field rather than by array position.
///
/// The outer `Err` covers failures of the whole exchange. Each element of the
/// returned vector is the independent outcome of the request with the same
/// index in `ids`.
pub fn decode_batch_response(
    raw: &str,
    ids: &[u64],
) -> Result<Vec<Result<Value, ClientError>>, ClientError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ClientError::malformed(format!("invalid JSON: {e}"), raw))?;

    let items = match value {
        Value::Array(items) => items,
        // Servers answer an unprocessable batch with a single error object.
        obj @ Value::Object(_) => {
            return Err(match decode_envelope(obj, raw) {
                Err(err) => err,
                Ok(_) => ClientError::malformed("expected a JSON array for batch response", raw),
            });
        }
        _ => {
            return Err(ClientError::malformed(
                "expected a JSON array for batch response",
                raw,
            ))
        }
    };

    let mut by_id: HashMap<u64, Value> = HashMap::with_capacity(items.len());
    for item in items {
        let id = match item.get("id").map(parse_batch_id) {
            Some(Ok(id)) => id,
            Some(Err(reason)) => {
                warn!(%reason, "dropping uncorrelatable batch response element");
                continue;
            }
            None => {
                warn!("dropping batch response element without id");
                continue;
            }
        };
        if by_id.contains_key(&id) {
            warn!(rpc.id = id, "duplicate id in batch response; keeping first");
            continue;
        }
        by_id.insert(id, item);
    }

    Ok(ids
        .iter()
        .map(|id| match by_id.remove(id) {
            Some(item) => {
                let item_raw = item.to_string();
                decode_envelope(item, &item_raw)
            }
            None => Err(ClientError::malformed(
                format!("no response for request id {id}"),
                raw,
            )),
        })
        .collect())
}

fn decode_envelope(value: Value, raw: &str) -> Result<Value, ClientError> {
    let Value::Object(mut obj) = value else {
        return Err(ClientError::malformed(
            "expected a JSON-RPC response object",
            raw,
        ));
    };

    match obj.remove("error") {
        None | Some(Value::Null) => {}
        Some(err) => return Err(parse_jsonrpc_error(err, raw)),
    }

    obj.remove("result").ok_or_else(|| {
        ClientError::malformed("response has neither `result` nor `error`", raw)
    })
}

/// Parse a JSON-RPC error value into [`ClientError::Rpc`].
///
/// Code and message are kept verbatim; anything not shaped
/// `{"code": <int>, "message": <string>}` is a malformed response.
fn parse_jsonrpc_error(err: Value, raw: &str) -> ClientError {
    #[derive(serde::Deserialize)]
    struct JsonRpcError {
        code: i64,
        message: String,
        #[serde(default)]
        data: Option<Value>,
    }

    match serde_json::from_value::<JsonRpcError>(err) {
        Ok(parsed) => ClientError::Rpc {
            code: parsed.code,
            message: parsed.message,
            data: parsed.data,
        },
        Err(e) => ClientError::malformed(format!("non-standard JSON-RPC error: {e}"), raw),
    }
}

fn parse_batch_id(id: &Value) -> Result<u64, String> {
    if let Some(n) = id.as_u64() {
        return Ok(n);
    }

    if let Some(s) = id.as_str() {
        return s
            .parse::<u64>()
            .map_err(|e| format!("invalid batch response id string: {e}"));
    }

    Err(format!("invalid batch response id: {id}"))
}
