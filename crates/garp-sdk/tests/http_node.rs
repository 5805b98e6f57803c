use std::collections::HashMap;
use std::sync::{Arc, Once};

use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use garp_sdk::bridge::BridgeClient;
use garp_sdk::chat::ChatClient;
use garp_sdk::types::{BridgeTransferRequest, MessageQuery, NewMessage};
use garp_sdk::{BatchCall, BlockingGarpClient, ClientConfig, ClientError, GarpClient};

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("garp_sdk=debug")),
            )
            .with_target(true)
            .with_test_writer()
            .try_init();
    });
}

// ==============================================================================
// In-process node
// ==============================================================================

const BIG_BALANCE: &str = "18446744073709551616";

fn json_response(body: Value) -> Response {
    (
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response()
}

fn rpc_result(id: &Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn rpc_error(id: &Value, code: i64, message: &str) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
}

fn answer(req: &Value) -> Value {
    let id = req.get("id").cloned().unwrap_or(Value::Null);
    let param = req.get("params").and_then(|p| p.get(0)).cloned();

    match req.get("method").and_then(Value::as_str).unwrap_or_default() {
        "getSlot" => rpc_result(&id, json!(42)),
        "getSlotLeader" => rpc_result(&id, json!("validator-1")),
        "getBlock" => match param {
            Some(p) if p == json!(5) || p == json!("0xabc") => rpc_result(
                &id,
                json!({
                    "slot": 5,
                    "hash": "0xabc",
                    "parent_hash": "0xab9",
                    "leader": "validator-1",
                    "transactions": [{ "id": "0xtx", "command_type": "Transfer" }]
                }),
            ),
            _ => rpc_result(&id, Value::Null),
        },
        "getTransaction" => match param {
            Some(p) if p == json!("0xtx") => rpc_result(
                &id,
                json!({ "id": "0xtx", "status": "committed", "created_at": 1_700_000_000 }),
            ),
            _ => rpc_result(&id, Value::Null),
        },
        "sendTransaction" => rpc_result(&id, json!("0xtx")),
        "simulateTransaction" => match param {
            Some(p) if p == json!("bad") => {
                rpc_result(&id, json!({ "ok": false, "error": "signature invalid" }))
            }
            _ => rpc_result(&id, json!({ "ok": true, "logs": ["step 1", "step 2"] })),
        },
        "getBalance" => {
            let big: Value = serde_json::from_str(BIG_BALANCE).expect("valid number");
            rpc_result(&id, big)
        }
        "getVersion" => rpc_result(&id, json!("garp-node/0.3.1")),
        "getHealth" => rpc_result(&id, json!("ok")),
        "whoami" => rpc_result(&id, id.clone()),
        "paramsShape" => rpc_result(
            &id,
            req.get("params").cloned().unwrap_or(json!("absent")),
        ),
        "fail" => rpc_error(&id, -32000, "deliberate failure"),
        _ => rpc_error(&id, -32601, "Method not found"),
    }
}

async fn rpc_handler(Json(body): Json<Value>) -> Response {
    match body {
        // Reverse the batch so clients must correlate by id.
        Value::Array(items) => json_response(Value::Array(items.iter().rev().map(answer).collect())),
        single => json_response(answer(&single)),
    }
}

async fn bridge_transfer(Json(body): Json<Value>) -> Response {
    if body["amount"].as_i64().unwrap_or(0) <= 0 {
        return json_response(json!({ "success": false, "error": "amount must be positive" }));
    }
    let src = body["source_tx_id"].as_str().unwrap_or_default();
    json_response(json!({ "success": true, "data": { "bridge_tx_id": format!("br-{src}") } }))
}

async fn bridge_status(Path(id): Path<String>) -> Response {
    json_response(json!({ "success": true, "data": format!("{id}:completed") }))
}

async fn post_message(Json(body): Json<Value>) -> Response {
    json_response(json!({ "id": 1, "hash": format!("0x{}", body["content_nonce"].as_str().unwrap_or("")), "created_at": "2024-05-01T10:00:00Z" }))
}

async fn list_messages(Query(q): Query<HashMap<String, String>>) -> Response {
    json_response(json!([{
        "id": 1,
        "sender": q.get("address").cloned().unwrap_or_default(),
        "recipient": q.get("peer").cloned().unwrap_or_default(),
        "content_ciphertext": "ct",
        "content_nonce": q.get("limit").cloned().unwrap_or_else(|| "none".into()),
        "hash": "0xh",
        "created_at": q.get("since").cloned().unwrap_or_default(),
        "anchored": false
    }]))
}

async fn public_key(Path(addr): Path<String>) -> Response {
    json_response(json!({ "address": addr, "public_key": "pk" }))
}

async fn signals() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn spawn_node() -> String {
    let app = Router::new()
        .route("/rpc", post(rpc_handler))
        .route("/api/v1/bridge/transfer", post(bridge_transfer))
        .route("/api/v1/bridge/transfer/{id}/status", get(bridge_status))
        .route("/messages", post(post_message).get(list_messages))
        .route("/keys/{addr}", get(public_key))
        .route("/signals", post(signals))
        .route("/down/rpc", post(|| async { StatusCode::SERVICE_UNAVAILABLE }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener must have an address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server must run");
    });
    format!("http://{addr}")
}

// ==============================================================================
// Async client
// ==============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn async_client_covers_every_rpc_method() {
    init_tracing();
    let base_url = spawn_node().await;
    let client = GarpClient::connect(&base_url).expect("client must construct");

    assert_eq!(client.get_slot().await.unwrap(), 42);
    assert_eq!(client.get_slot_leader().await.unwrap(), "validator-1");

    let block = client
        .get_block_by_slot(5)
        .await
        .unwrap()
        .expect("slot 5 exists");
    assert_eq!(block.hash, "0xabc");
    assert_eq!(block.transactions.as_ref().map(Vec::len), Some(1));
    let by_hash = client
        .get_block_by_hash("0xabc")
        .await
        .unwrap()
        .expect("hash exists");
    assert_eq!(by_hash, block);
    assert_eq!(client.get_block_by_slot(6).await.unwrap(), None);
    assert_eq!(client.get_block_by_hash("0xdead").await.unwrap(), None);

    let tx = client
        .get_transaction("0xtx")
        .await
        .unwrap()
        .expect("tx exists");
    assert_eq!(tx.status.as_deref(), Some("committed"));
    assert_eq!(client.get_transaction("0xnone").await.unwrap(), None);

    assert_eq!(client.send_transaction("00ff").await.unwrap(), "0xtx");
    let sim = client.simulate_transaction("bad").await.unwrap();
    assert!(!sim.ok);
    assert_eq!(sim.error.as_deref(), Some("signature invalid"));

    let balance = client.get_balance("0xaddr").await.unwrap();
    assert_eq!(balance.as_str(), BIG_BALANCE);

    assert_eq!(client.get_version().await.unwrap(), "garp-node/0.3.1");
    assert_eq!(client.get_health().await.unwrap(), "ok");

    // 13 calls so far; the next id is 14.
    assert_eq!(client.call("whoami", None).await.unwrap(), json!(14));
}

#[tokio::test(flavor = "multi_thread")]
async fn params_absent_and_empty_reach_server_differently() {
    init_tracing();
    let client = GarpClient::connect(&spawn_node().await).unwrap();

    assert_eq!(client.call("paramsShape", None).await.unwrap(), json!("absent"));
    assert_eq!(
        client.call("paramsShape", Some(Vec::new())).await.unwrap(),
        json!([])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn shared_client_hands_out_unique_ids() {
    init_tracing();
    let client = Arc::new(GarpClient::connect(&spawn_node().await).unwrap());

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.call("whoami", None).await })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        let id = handle.await.expect("task must not panic").unwrap();
        ids.push(id.as_u64().expect("id is numeric"));
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=10).collect::<Vec<u64>>());
}

#[tokio::test(flavor = "multi_thread")]
async fn batch_over_http_reports_per_element_outcomes() {
    init_tracing();
    let client = GarpClient::connect(&spawn_node().await).unwrap();

    let results = client
        .rpc_batch(&[
            BatchCall::new("getSlot", None),
            BatchCall::new("fail", None),
            BatchCall::new("getBlock", Some(vec![json!(5)])),
        ])
        .await
        .expect("batch exchange must succeed");

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap(), &json!(42));
    assert!(matches!(
        results[1],
        Err(ClientError::Rpc { code: -32000, .. })
    ));
    assert_eq!(results[2].as_ref().unwrap()["hash"], "0xabc");
}

#[tokio::test(flavor = "multi_thread")]
async fn unavailable_node_is_transport_error() {
    init_tracing();
    let base_url = spawn_node().await;
    let client = GarpClient::connect(&format!("{base_url}/down")).unwrap();

    let err = client.get_slot().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Transport(garp_sdk::TransportError::Status { status: 503, .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn rest_clients_share_one_transport() {
    init_tracing();
    let client = GarpClient::connect(&spawn_node().await).unwrap();
    let bridge = client.bridge();

    let id = bridge
        .initiate_transfer(&BridgeTransferRequest {
            source_chain: "ethereum".into(),
            source_tx_id: "0xsrc".into(),
            target_chain: "garp".into(),
            amount: 10,
            source_address: "0xfrom".into(),
            target_address: "0xto".into(),
            asset_id: "ETH".into(),
        })
        .await
        .unwrap();
    assert_eq!(id, "br-0xsrc");
    assert_eq!(
        bridge.transfer_status(&id).await.unwrap(),
        "br-0xsrc:completed"
    );

    let chat = client.chat();
    let receipt = chat
        .send_message(&NewMessage {
            sender: "0xa".into(),
            recipient: "0xb".into(),
            content_ciphertext: "ct".into(),
            content_nonce: "n1".into(),
        })
        .await
        .unwrap();
    assert_eq!(receipt.hash, "0xn1");
}

#[tokio::test(flavor = "multi_thread")]
async fn standalone_rest_clients_from_config() {
    init_tracing();
    let config = ClientConfig::new(&spawn_node().await).unwrap();
    let bridge = BridgeClient::new(&config).unwrap();
    let chat = ChatClient::new(&config).unwrap();

    let err = bridge
        .initiate_transfer(&BridgeTransferRequest {
            source_chain: "ethereum".into(),
            source_tx_id: "0xsrc".into(),
            target_chain: "garp".into(),
            amount: 0,
            source_address: "0xfrom".into(),
            target_address: "0xto".into(),
            asset_id: "ETH".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api(ref m) if m == "amount must be positive"));

    let messages = chat
        .list_messages(&MessageQuery {
            address: "0xa".into(),
            peer: "0xb".into(),
            since: Some("2024-01-01T00:00:00Z".into()),
            limit: Some(5),
        })
        .await
        .unwrap();
    assert_eq!(messages[0].sender, "0xa");
    assert_eq!(messages[0].recipient, "0xb");
    assert_eq!(messages[0].content_nonce, "5");
    assert_eq!(messages[0].created_at, "2024-01-01T00:00:00Z");

    let key = chat.public_key("0xa b").await.unwrap();
    assert_eq!(key["address"], "0xa b");
}

// ==============================================================================
// Blocking client
// ==============================================================================

#[test]
fn blocking_client_against_live_node() {
    init_tracing();
    let server_runtime = tokio::runtime::Runtime::new().expect("server runtime must start");
    let base_url = server_runtime.block_on(spawn_node());

    let client = BlockingGarpClient::connect(&base_url).expect("client must construct");
    assert_eq!(client.get_slot().unwrap(), 42);
    assert_eq!(client.get_block_by_slot(99).unwrap(), None);
    assert_eq!(client.get_balance("0xaddr").unwrap().as_str(), BIG_BALANCE);
    assert!(client.simulate_transaction("good").unwrap().ok);

    let err = client.call("nope", None).unwrap_err();
    assert!(matches!(err, ClientError::Rpc { code: -32601, .. }));

    assert_eq!(client.call("whoami", None).unwrap(), json!(6));

    client
        .chat()
        .send_signal(&garp_sdk::types::Signal {
            from: "0xa".into(),
            to: "0xb".into(),
            kind: "ice".into(),
            payload: Default::default(),
        })
        .expect("204 reply must be accepted");
}
