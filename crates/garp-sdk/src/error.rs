use serde_json::Value;

/// Every failure a client call can surface. Nothing here is retried or
/// swallowed internally.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("malformed response: {reason}; body={body}")]
    MalformedResponse { reason: String, body: String },

    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("invalid result: {0}")]
    Decode(#[from] DecodeError),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// A request payload could not be serialized to JSON.
    #[error("cannot encode {what}: {reason}")]
    Encode { what: String, reason: String },
}

impl ClientError {
    pub(crate) fn malformed(reason: impl Into<String>, body: &str) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
            body: body.to_owned(),
        }
    }
}

/// Network or HTTP-level failure.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("cannot build request URL: {0}")]
    Url(String),
}

/// Typed mapping failure. `field` is a dotted path into the result value,
/// e.g. `transactions[1].id`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
}
