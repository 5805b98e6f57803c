use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

use super::{HttpRequest, HttpResponse, Transport};

type Responder = Box<dyn FnOnce(&HttpRequest) -> Result<HttpResponse, TransportError> + Send>;

/// A scripted transport for testing. Replies are consumed in order, one per
/// request, and every request is recorded for later inspection.
pub struct MockTransport {
    replies: Mutex<VecDeque<Responder>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder {
            replies: VecDeque::new(),
        }
    }

    /// Requests seen so far, in send order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// JSON bodies of the requests seen so far.
    pub fn bodies(&self) -> Vec<Value> {
        self.requests()
            .into_iter()
            .map(|req| req.body.unwrap_or(Value::Null))
            .collect()
    }
}

pub struct MockTransportBuilder {
    replies: VecDeque<Responder>,
}

impl MockTransportBuilder {
    /// Reply 200 with `body` serialized as JSON.
    pub fn respond_json(self, body: Value) -> Self {
        self.respond_raw(200, body.to_string())
    }

    /// Reply with an arbitrary status and raw body text.
    pub fn respond_raw(mut self, status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        self.replies
            .push_back(Box::new(move |_| Ok(HttpResponse { status, body })));
        self
    }

    /// Reply 200 with `{"jsonrpc":"2.0","id":<request id>,"result":result}`.
    pub fn respond_result(self, result: Value) -> Self {
        self.respond_with(move |req| {
            let id = req
                .body
                .as_ref()
                .and_then(|b| b.get("id"))
                .cloned()
                .unwrap_or(Value::Null);
            serde_json::json!({ "jsonrpc": "2.0", "id": id, "result": result })
        })
    }

    /// Reply 200 with a JSON-RPC error object echoing the request id.
    pub fn respond_rpc_error(self, code: i64, message: &str) -> Self {
        let message = message.to_owned();
        self.respond_with(move |req| {
            let id = req
                .body
                .as_ref()
                .and_then(|b| b.get("id"))
                .cloned()
                .unwrap_or(Value::Null);
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": code, "message": message }
            })
        })
    }

    /// Reply 200 with a JSON body computed from the request.
    pub fn respond_with<F>(mut self, reply: F) -> Self
    where
        F: FnOnce(&HttpRequest) -> Value + Send + 'static,
    {
        self.replies.push_back(Box::new(move |req| {
            Ok(HttpResponse {
                status: 200,
                body: reply(req).to_string(),
            })
        }));
        self
    }

    /// Fail the request at the transport level.
    pub fn fail_with(mut self, err: TransportError) -> Self {
        self.replies.push_back(Box::new(move |_| Err(err)));
        self
    }

    pub fn build(self) -> MockTransport {
        MockTransport {
            replies: Mutex::new(self.replies),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted reply for {}", request.path()));
        let result = reply(&request);
        self.requests.lock().unwrap().push(request);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpMethod;

    #[tokio::test]
    async fn replies_are_consumed_in_order() {
        let mock = MockTransport::builder()
            .respond_raw(200, "first")
            .respond_raw(500, "second")
            .build();

        let first = mock.send(HttpRequest::get(["a"])).await.unwrap();
        let second = mock.send(HttpRequest::get(["b"])).await.unwrap();
        assert_eq!(first.body, "first");
        assert_eq!(second.status, 500);

        let seen = mock.requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].path(), "/b");
        assert_eq!(seen[1].method, HttpMethod::Get);
    }

    #[tokio::test]
    async fn respond_result_echoes_request_id() {
        let mock = MockTransport::builder()
            .respond_result(serde_json::json!("ok"))
            .build();
        let req = HttpRequest::post(["rpc"], serde_json::json!({ "id": 7 }));
        let resp = mock.send(req).await.unwrap();
        let body: Value = serde_json::from_str(&resp.body).unwrap();
        assert_eq!(body["id"], 7);
        assert_eq!(body["result"], "ok");
    }
}
