//! A simulated Polygon JSON-RPC node on top of wiremock.
#![allow(dead_code)]

use serde_json::{json, Value};
use std::io;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const HEAD_NUMBER: u64 = 12_345_678;
pub const HEAD_NUMBER_HEX: &str = "0xbc614e";

/// Anvil/Hardhat account #0
pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_SENDER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
/// Anvil/Hardhat account #1
pub const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const TOKEN: &str = "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359";
pub const WALLET: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

pub fn tx_hash_hex() -> String {
    format!("0x{}", "ab".repeat(32))
}

fn body_of(request: &Request) -> Value {
    serde_json::from_slice(&request.body).unwrap_or(Value::Null)
}

/// JSON-RPC success envelope echoing the request id
pub fn rpc_result(request: &Request, result: Value) -> ResponseTemplate {
    let id = body_of(request)["id"].clone();
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    }))
}

/// JSON-RPC error envelope echoing the request id
pub fn rpc_error(request: &Request, code: i64, message: &str) -> ResponseTemplate {
    let id = body_of(request)["id"].clone();
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    }))
}

fn method_mock(name: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST")).and(body_partial_json(json!({ "method": name })))
}

/// Answers `name` with a fixed `result`
pub async fn mount_result(server: &MockServer, name: &str, result: Value) {
    method_mock(name)
        .respond_with(move |req: &Request| rpc_result(req, result.clone()))
        .mount(server)
        .await;
}

/// Answers `name` with a fixed `result` and verifies on drop that it was
/// called exactly `times` times
pub async fn mount_result_expect(server: &MockServer, name: &str, result: Value, times: u64) {
    method_mock(name)
        .respond_with(move |req: &Request| rpc_result(req, result.clone()))
        .expect(times)
        .mount(server)
        .await;
}

/// Answers `name` with a JSON-RPC error
pub async fn mount_error(server: &MockServer, name: &str, code: i64, message: &'static str) {
    method_mock(name)
        .respond_with(move |req: &Request| rpc_error(req, code, message))
        .mount(server)
        .await;
}

/// A Polygon mainnet node whose head is block [`HEAD_NUMBER`]
pub async fn polygon_node() -> MockServer {
    let server = MockServer::start().await;
    mount_result(&server, "eth_chainId", json!("0x89")).await;
    mount_result(&server, "eth_blockNumber", json!(HEAD_NUMBER_HEX)).await;

    // "latest" and the head number resolve to the same block, anything else is unknown
    method_mock("eth_getBlockByNumber")
        .respond_with(|req: &Request| {
            let body = body_of(req);
            let result = match body["params"][0].as_str() {
                Some("latest") | Some(HEAD_NUMBER_HEX) => head_block(),
                _ => Value::Null,
            };
            rpc_result(req, result)
        })
        .mount(&server)
        .await;

    server
}

pub fn head_block() -> Value {
    json!({
        "hash": format!("0x{}", "11".repeat(32)),
        "parentHash": format!("0x{}", "22".repeat(32)),
        "sha3Uncles": "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
        "miner": "0x0000000000000000000000000000000000000000",
        "stateRoot": format!("0x{}", "33".repeat(32)),
        "transactionsRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
        "receiptsRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "difficulty": "0x1",
        "number": HEAD_NUMBER_HEX,
        "gasLimit": "0x1c9c380",
        "gasUsed": "0x0",
        "timestamp": "0x65f1e2a0",
        "extraData": "0x",
        "mixHash": format!("0x{}", "00".repeat(32)),
        "nonce": "0x0000000000000000",
        "baseFeePerGas": "0x1e",
        "size": "0x220",
        "transactions": [],
        "uncles": []
    })
}

/// A mined legacy transfer of 0.1 POL from [`TEST_SENDER`] to [`RECIPIENT`]
/// with nonce 7, hash [`tx_hash_hex`]
pub fn mined_transfer() -> Value {
    json!({
        "hash": tx_hash_hex(),
        "nonce": "0x7",
        "blockHash": format!("0x{}", "11".repeat(32)),
        "blockNumber": HEAD_NUMBER_HEX,
        "transactionIndex": "0x0",
        "from": TEST_SENDER,
        "to": RECIPIENT,
        "value": "0x16345785d8a0000",
        "gasPrice": "0x4a817c800",
        "gas": "0x1e8480",
        "input": "0x",
        "v": "0x136",
        "r": format!("0x{}", "1f".repeat(32)),
        "s": format!("0x{}", "2e".repeat(32)),
        "chainId": "0x89",
        "type": "0x0"
    })
}

/// Bodies of every request the node received for `name`
pub async fn requests_for(server: &MockServer, name: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(body_of)
        .filter(|body| body["method"] == name)
        .collect()
}

/// In-memory log sink for a `tracing_subscriber::fmt` subscriber
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn dispatch(&self) -> tracing::Dispatch {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || sink.clone())
            .finish();
        tracing::Dispatch::new(subscriber)
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
