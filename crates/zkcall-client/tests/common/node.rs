use alloy::network::Ethereum;
use alloy::providers::RootProvider;
use alloy::rpc::client::RpcClient;
use alloy::rpc::json_rpc::{RequestPacket, ResponsePacket};
use alloy::transports::{TransportError, TransportErrorKind, TransportFut};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

/// What the node answers to `eth_call`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    Accept,
    Reject,
    Revert,
}

#[derive(Default)]
struct NodeState {
    /// Hash of a creation transaction that has been sent but whose receipt
    /// has not been fetched yet.
    pending: Option<String>,
    deployments: usize,
    nonce_collisions: usize,
    calls: Vec<String>,
}

/// In-process JSON-RPC node answering the handful of methods the deployer
/// and verifier use.
///
/// A second creation transaction arriving while another one is still
/// unmined is refused with "nonce too low", which is what a real node does
/// when two transactions are signed from the same pending nonce.
#[derive(Clone)]
pub struct MockNode {
    call_outcome: CallOutcome,
    deploy_succeeds: bool,
    send_delay: Duration,
    state: Arc<Mutex<NodeState>>,
}

impl MockNode {
    pub fn new(call_outcome: CallOutcome) -> Self {
        Self {
            call_outcome,
            deploy_succeeds: true,
            send_delay: Duration::from_millis(20),
            state: Arc::default(),
        }
    }

    pub fn with_failed_deployments(mut self) -> Self {
        self.deploy_succeeds = false;
        self
    }

    pub fn provider(&self) -> RootProvider<MockNode, Ethereum> {
        RootProvider::new(RpcClient::new(self.clone(), true))
    }

    pub fn deployments(&self) -> usize {
        self.state.lock().unwrap().deployments
    }

    pub fn nonce_collisions(&self) -> usize {
        self.state.lock().unwrap().nonce_collisions
    }

    /// Input data of every `eth_call`, as hex.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    async fn handle(self, request: Value) -> Value {
        let id = request["id"].clone();
        let params = &request["params"];
        let outcome = match request["method"].as_str().unwrap_or_default() {
            "eth_chainId" => Ok(json!("0x7a69")),
            "eth_sendTransaction" => self.send_transaction().await,
            "eth_getTransactionReceipt" => Ok(self.receipt(params[0].as_str().unwrap_or_default())),
            "eth_call" => self.call(&params[0]),
            method => Err(json!({"code": -32601, "message": format!("{method} not found")})),
        };

        match outcome {
            Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
            Err(error) => json!({"jsonrpc": "2.0", "id": id, "error": error}),
        }
    }

    async fn send_transaction(&self) -> Result<Value, Value> {
        let hash = {
            let mut state = self.state.lock().unwrap();
            if state.pending.is_some() {
                state.nonce_collisions += 1;
                return Err(json!({"code": -32000, "message": "nonce too low"}));
            }
            state.deployments += 1;
            let hash = format!("0x{:064x}", state.deployments);
            state.pending = Some(hash.clone());
            hash
        };
        // Leaves room for a concurrent sender to collide
        tokio::time::sleep(self.send_delay).await;
        Ok(json!(hash))
    }

    fn receipt(&self, hash: &str) -> Value {
        let mut state = self.state.lock().unwrap();
        if state.pending.as_deref() == Some(hash) {
            state.pending = None;
        }
        let index = u64::from_str_radix(hash.trim_start_matches("0x"), 16).unwrap_or_default();
        json!({
            "type": "0x2",
            "status": if self.deploy_succeeds { "0x1" } else { "0x0" },
            "cumulativeGasUsed": "0x2dc6c0",
            "logs": [],
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "transactionHash": hash,
            "transactionIndex": "0x0",
            "blockHash": format!("0x{}", "11".repeat(32)),
            "blockNumber": format!("0x{index:x}"),
            "gasUsed": "0x2dc6c0",
            "effectiveGasPrice": "0x3b9aca00",
            "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "to": null,
            "contractAddress": if self.deploy_succeeds {
                json!(format!("0x{:040x}", 0x1000 + index))
            } else {
                Value::Null
            }
        })
    }

    fn call(&self, tx: &Value) -> Result<Value, Value> {
        let input = tx["input"].as_str().or_else(|| tx["data"].as_str()).unwrap_or_default();
        self.state.lock().unwrap().calls.push(input.to_string());

        let word = |last: char| format!("0x{}{last}", "0".repeat(63));
        match self.call_outcome {
            CallOutcome::Accept => Ok(json!(word('1'))),
            CallOutcome::Reject => Ok(json!(word('0'))),
            CallOutcome::Revert => Err(json!({
                "code": 3,
                "message": "execution reverted",
                "data": "0x"
            })),
        }
    }
}

impl tower::Service<RequestPacket> for MockNode {
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = TransportFut<'static>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, packet: RequestPacket) -> Self::Future {
        Box::pin(self.clone().respond(packet))
    }
}

impl MockNode {
    async fn respond(self, packet: RequestPacket) -> Result<ResponsePacket, TransportError> {
        let RequestPacket::Single(request) = packet else {
            return Err(TransportErrorKind::custom_str("batches are not supported"));
        };
        let request: Value = serde_json::to_string(&request)
            .and_then(|text| serde_json::from_str(&text))
            .map_err(|e| TransportErrorKind::custom_str(&e.to_string()))?;

        let response = self.handle(request).await;
        serde_json::from_str(&response.to_string())
            .map_err(|e| TransportErrorKind::custom_str(&e.to_string()))
    }
}
