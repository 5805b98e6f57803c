//! Client configuration shared by the RPC, bridge and chat clients.

use std::time::Duration;

use reqwest::Url;

use crate::error::ClientError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for one client instance.
///
/// Timeouts and the rate limit are handed to the HTTP transport as-is; the
/// client itself never times out or retries a call.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Outbound request cap. A batch counts as one request.
    pub requests_per_second: Option<u32>,
}

impl ClientConfig {
    /// Build a config for `base_url` with default timeouts and no rate limit.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            requests_per_second: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_requests_per_second(mut self, limit: Option<u32>) -> Self {
        self.requests_per_second = limit;
        self
    }
}

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ClientError> {
    let trimmed = base_url.trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| {
        ClientError::Config(format!(
            "invalid base URL `{base_url}`: expected HTTP(S) URL ({e})"
        ))
    })?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ClientError::Config(format!(
                "unsupported base URL scheme `{other}`; expected http or https"
            )));
        }
    }
    if parsed.cannot_be_a_base() {
        return Err(ClientError::Config(format!(
            "base URL `{base_url}` cannot carry a path"
        )));
    }
    Ok(parsed)
}
