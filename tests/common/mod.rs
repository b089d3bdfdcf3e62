//! Shared utilities for integration testing.
//!
//! `MockNode` is a tiny HTTP server that answers Ethereum JSON-RPC on
//! `POST /` and plays the swap aggregator on `GET /v5.0/{chain}/swap`.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use alloy::primitives::{keccak256, Address, Bytes, U256};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wallet_relay::RelayConfig;

pub const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const ROUTER_ADDRESS: &str = "0x1111111254eeb25477b68fb85ed929f73a960582";
pub const USDC_ADDRESS: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
pub const RECEIPT_BLOCK: u64 = 0x10;

/// Programmable chain and aggregator state.
#[derive(Debug)]
pub struct MockState {
    pub chain_id: u64,
    pub balance: U256,
    pub tx_count: u64,
    pub gas_price: u128,
    pub gas_estimate: u64,
    pub block_number: u64,
    /// Added to `block_number` after every `eth_blockNumber` answer.
    pub block_step: u64,
    /// When false, receipts are never returned.
    pub mine_receipts: bool,
    pub receipt_status: bool,
    /// When set, `eth_sendRawTransaction` answers with this error message.
    pub reject_broadcast: Option<String>,
    pub quote_status: u16,
    pub quote_body: String,
    /// Every JSON-RPC method called, in order.
    pub methods: Vec<String>,
    /// Every raw transaction broadcast, in order.
    pub raw_transactions: Vec<Bytes>,
    /// Query strings of every aggregator request.
    pub quote_queries: Vec<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            chain_id: 1,
            balance: U256::ZERO,
            tx_count: 0,
            gas_price: 1_000_000_000,
            gas_estimate: 90_000,
            block_number: RECEIPT_BLOCK,
            block_step: 0,
            mine_receipts: true,
            receipt_status: true,
            reject_broadcast: None,
            quote_status: 200,
            quote_body: swap_body(json!({
                "to": ROUTER_ADDRESS,
                "data": "0x12aa3caf",
                "value": "0",
                "gas": 250000,
                "gasPrice": "2000000000"
            })),
            methods: Vec::new(),
            raw_transactions: Vec::new(),
            quote_queries: Vec::new(),
        }
    }
}

/// Aggregator response body wrapping a `tx` object.
pub fn swap_body(tx: Value) -> String {
    json!({ "toAmount": "1000000", "tx": tx }).to_string()
}

pub struct MockNode {
    pub addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
}

impl MockNode {
    /// Start a mock node on an ephemeral port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(MockState::default()));

        let shared = state.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((socket, _)) => {
                        let state = shared.clone();
                        tokio::spawn(async move {
                            let _ = handle_connection(socket, state).await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// A config pointing every external dependency at this node.
    pub fn config(&self) -> RelayConfig {
        let mut config = RelayConfig::default();
        config.blockchain.rpc_url = self.url();
        config.blockchain.chain_id = 1;
        config.blockchain.rpc_timeout_secs = 5;
        config.blockchain.poll_interval_ms = 20;
        config.blockchain.confirmation_timeout_secs = 5;
        config.wallet.seed_phrase = TEST_MNEMONIC.to_string();
        config.aggregator.base_url = format!("{}/v5.0", self.url());
        config.aggregator.api_key = "test-key".to_string();
        config
    }
}

/// Start a backend that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _held = socket;
                tokio::time::sleep(Duration::from_secs(60)).await;
            });
        }
    });

    addr
}

async fn handle_connection(
    mut socket: TcpStream,
    state: Arc<Mutex<MockState>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = &buf[header_end..(header_end + content_length).min(buf.len())];

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();

    let (status, response_body) = if method == "POST" {
        (200, handle_rpc(body, &state))
    } else {
        handle_quote(&target, &state)
    };

    let status_text = match status {
        200 => "200 OK",
        400 => "400 Bad Request",
        401 => "401 Unauthorized",
        500 => "500 Internal Server Error",
        _ => "200 OK",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        response_body.len(),
        response_body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await?;
    tokio::time::sleep(Duration::from_millis(10)).await;
    Ok(())
}

fn handle_quote(target: &str, state: &Arc<Mutex<MockState>>) -> (u16, String) {
    let mut state = state.lock().unwrap();
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    if !path.ends_with("/swap") {
        return (400, json!({ "error": "Not Found", "description": path }).to_string());
    }
    state.quote_queries.push(query.to_string());
    (state.quote_status, state.quote_body.clone())
}

fn handle_rpc(body: &[u8], state: &Arc<Mutex<MockState>>) -> String {
    let request: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let params = request.get("params").cloned().unwrap_or(Value::Null);

    let mut state = state.lock().unwrap();
    state.methods.push(method.clone());

    let result = match method.as_str() {
        "eth_chainId" => Ok(json!(format!("0x{:x}", state.chain_id))),
        "eth_blockNumber" => {
            let current = state.block_number;
            state.block_number += state.block_step;
            Ok(json!(format!("0x{:x}", current)))
        }
        "eth_getBalance" => Ok(json!(format!("0x{:x}", state.balance))),
        "eth_getTransactionByHash" => Ok(Value::Null),
        "eth_getTransactionCount" => Ok(json!(format!("0x{:x}", state.tx_count))),
        "eth_gasPrice" => Ok(json!(format!("0x{:x}", state.gas_price))),
        "eth_estimateGas" => Ok(json!(format!("0x{:x}", state.gas_estimate))),
        "eth_sendRawTransaction" => {
            let raw: Bytes = params[0].as_str().unwrap_or("0x").parse().unwrap_or_default();
            match state.reject_broadcast.clone() {
                Some(message) => Err(message),
                None => {
                    let hash = keccak256(&raw);
                    state.raw_transactions.push(raw);
                    Ok(json!(hash.to_string()))
                }
            }
        }
        "eth_getTransactionReceipt" => {
            if state.mine_receipts {
                let hash = params[0].as_str().unwrap_or_default().to_string();
                Ok(receipt_json(&hash, state.receipt_status))
            } else {
                Ok(Value::Null)
            }
        }
        other => Err(format!("method {} not supported", other)),
    };

    match result {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(message) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32000, "message": message }
        }),
    }
    .to_string()
}

fn receipt_json(tx_hash: &str, status: bool) -> Value {
    json!({
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": format!("0x{}", "ab".repeat(32)),
        "blockNumber": format!("0x{:x}", RECEIPT_BLOCK),
        "from": TEST_ADDRESS.to_lowercase(),
        "to": Address::ZERO.to_string().to_lowercase(),
        "contractAddress": null,
        "cumulativeGasUsed": "0x5208",
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x3b9aca00",
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "type": "0x0",
        "status": if status { "0x1" } else { "0x0" }
    })
}
