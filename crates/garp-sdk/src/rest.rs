//! Plumbing shared by the REST clients (bridge, chat).

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ClientError, DecodeError};
use crate::transport::{HttpRequest, Transport};

/// Send `request`, require a 2xx status and parse the body as JSON.
///
/// An empty 2xx body parses as `null`.
pub(crate) async fn send_json(
    transport: &dyn Transport,
    request: HttpRequest,
) -> Result<Value, ClientError> {
    debug!(http.method = ?request.method, http.path = %request.path(), "rest call");
    let body = transport.send(request).await?.into_success_body()?;
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body)
        .map_err(|e| ClientError::malformed(format!("invalid JSON: {e}"), &body))
}

/// Serialize a request payload; `what` names it in the error.
pub(crate) fn encode_body<T: Serialize>(payload: &T, what: &str) -> Result<Value, ClientError> {
    serde_json::to_value(payload).map_err(|e| ClientError::Encode {
        what: what.to_owned(),
        reason: e.to_string(),
    })
}

/// Unwrap a `{success, data?, error?, message?}` envelope into its `data`
/// (`null` when absent).
///
/// `success: false` becomes [`ClientError::Api`] carrying `error`, else
/// `message`, else `fallback`.
pub(crate) fn unwrap_envelope(value: Value, fallback: &str) -> Result<Value, ClientError> {
    let mut obj = match value {
        Value::Object(obj) => obj,
        other => {
            return Err(ClientError::malformed(
                "expected a `{success, data}` object",
                &other.to_string(),
            ))
        }
    };

    let success = match obj.get("success").and_then(Value::as_bool) {
        Some(success) => success,
        None => {
            return Err(ClientError::malformed(
                "missing boolean `success`",
                &Value::Object(obj).to_string(),
            ))
        }
    };

    if !success {
        let reason = ["error", "message"]
            .iter()
            .find_map(|key| match obj.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::String(_)) | Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            })
            .unwrap_or_else(|| fallback.to_owned());
        return Err(ClientError::Api(reason));
    }

    Ok(obj.remove("data").unwrap_or(Value::Null))
}

/// Whether `value` looks like a `{success, ...}` envelope.
pub(crate) fn is_envelope(value: &Value) -> bool {
    value.get("success").is_some_and(Value::is_boolean)
}

/// Deserialize a payload into `T`, reporting failures against `field`.
pub(crate) fn decode_payload<T: DeserializeOwned>(
    value: Value,
    field: &str,
) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| {
        ClientError::Decode(DecodeError::InvalidField {
            field: field.to_owned(),
            reason: e.to_string(),
        })
    })
}
