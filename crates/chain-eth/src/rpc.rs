//! JSON-RPC transport and the handful of `eth_*` calls the bindings need.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::address::to_checksum;
use crate::chains::Network;
use crate::config::RpcConfig;
use crate::error::EthError;

/// Sends one JSON-RPC request to a network and returns its `result`.
/// Sends JSON-RPC requests to a network.
///
/// Implementations pick the endpoint from the `network` argument, so one
/// transport serves handles bound to any number of networks at once.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, network: Network, method: &str, params: Value) -> Result<Value, EthError>;
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// The `error` member of a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Splits a response into its result or an [`EthError::Rpc`].
    ///
    /// A response carrying neither member is [`EthError::InvalidResponse`].
    pub fn into_result(self) -> Result<Value, EthError> {
        if let Some(error) = self.error {
            return Err(EthError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        self.result
            .ok_or_else(|| EthError::InvalidResponse("response has neither result nor error".into()))
    }
}

/// JSON-RPC 2.0 over HTTP POST.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    config: RpcConfig,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Builds the HTTP client with the configured timeout.
    pub fn new(config: RpcConfig) -> Result<Self, EthError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| EthError::Transport(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, network: Network, method: &str, params: Value) -> Result<Value, EthError> {
        let url = self.config.rpc_url(network)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(%network, method, id, "json-rpc request");

        let response = self
            .client
            .post(url)
            .json(&JsonRpcRequest::new(id, method, params))
            .send()
            .await
            .map_err(|e| EthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%network, method, %status, "json-rpc http error");
            return Err(EthError::Transport(format!("http status {status}")));
        }

        let envelope: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| EthError::InvalidResponse(e.to_string()))?;

        envelope.into_result().inspect_err(|e| {
            if let EthError::Rpc { code, message } = e {
                warn!(%network, method, code, message = %message, "json-rpc error response");
            }
        })
    }
}

/// Block tag or number for `eth_call` / `eth_getLogs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockId {
    #[default]
    Latest,
    Pending,
    Earliest,
    Number(u64),
}

impl BlockId {
    /// Block tag or `0x`-prefixed quantity.
    pub fn to_json(self) -> Value {
        match self {
            BlockId::Latest => json!("latest"),
            BlockId::Pending => json!("pending"),
            BlockId::Earliest => json!("earliest"),
            BlockId::Number(n) => json!(format!("0x{n:x}")),
        }
    }
}

/// `eth_getLogs` filter over a single contract.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogFilter {
    pub address: Address,
    /// Positional topic constraints; `None` matches anything.
    pub topics: Vec<Option<B256>>,
    pub from_block: Option<BlockId>,
    pub to_block: Option<BlockId>,
}

impl LogFilter {
    /// Matches every log of `address` over the node's default block range.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    pub fn from_block(mut self, block: BlockId) -> Self {
        self.from_block = Some(block);
        self
    }

    pub fn to_block(mut self, block: BlockId) -> Self {
        self.to_block = Some(block);
        self
    }

    /// The filter object passed as the single `eth_getLogs` parameter.
    pub fn to_json(&self) -> Value {
        let mut filter = json!({
            "address": to_checksum(&self.address),
            "topics": self
                .topics
                .iter()
                .map(|t| t.map_or(Value::Null, |t| json!(t.to_string())))
                .collect::<Vec<_>>(),
        });
        if let Some(block) = self.from_block {
            filter["fromBlock"] = block.to_json();
        }
        if let Some(block) = self.to_block {
            filter["toBlock"] = block.to_json();
        }
        filter
    }
}

/// A log entry as returned by `eth_getLogs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Vec<u8>,
    pub block_number: Option<u64>,
    pub transaction_hash: Option<B256>,
}

impl Log {
    /// Parses one entry of an `eth_getLogs` result.
    pub fn from_json(value: &Value) -> Result<Self, EthError> {
        let field = |name: &str| {
            value
                .get(name)
                .ok_or_else(|| EthError::InvalidResponse(format!("log is missing {name}")))
        };

        let address = parse_hex(field("address")?)?;
        if address.len() != 20 {
            return Err(EthError::InvalidResponse("log address is not 20 bytes".into()));
        }

        let topics = field("topics")?
            .as_array()
            .ok_or_else(|| EthError::InvalidResponse("log topics is not an array".into()))?
            .iter()
            .map(parse_b256)
            .collect::<Result<Vec<_>, _>>()?;

        let block_number = match value.get("blockNumber") {
            Some(Value::Null) | None => None,
            Some(v) => Some(parse_quantity(v)?),
        };
        let transaction_hash = match value.get("transactionHash") {
            Some(Value::Null) | None => None,
            Some(v) => Some(parse_b256(v)?),
        };

        Ok(Self {
            address: Address::from_slice(&address),
            topics,
            data: parse_hex(field("data")?)?,
            block_number,
            transaction_hash,
        })
    }
}

/// `eth_call` against `to` at the latest block; returns the raw return data.
pub async fn eth_call(
    transport: &dyn Transport,
    network: Network,
    to: Address,
    data: &[u8],
) -> Result<Vec<u8>, EthError> {
    let params = json!([
        { "to": to_checksum(&to), "data": format!("0x{}", hex::encode(data)) },
        BlockId::Latest.to_json(),
    ]);
    let result = transport.request(network, "eth_call", params).await?;
    parse_hex(&result)
}

pub async fn get_logs(
    transport: &dyn Transport,
    network: Network,
    filter: &LogFilter,
) -> Result<Vec<Log>, EthError> {
    let result = transport
        .request(network, "eth_getLogs", json!([filter.to_json()]))
        .await?;
    result
        .as_array()
        .ok_or_else(|| EthError::InvalidResponse("eth_getLogs result is not an array".into()))?
        .iter()
        .map(Log::from_json)
        .collect()
}

/// `eth_chainId` as reported by the endpoint.
pub async fn chain_id(transport: &dyn Transport, network: Network) -> Result<u64, EthError> {
    let result = transport.request(network, "eth_chainId", json!([])).await?;
    parse_quantity(&result)
}

pub async fn block_number(transport: &dyn Transport, network: Network) -> Result<u64, EthError> {
    let result = transport.request(network, "eth_blockNumber", json!([])).await?;
    parse_quantity(&result)
}

fn parse_hex(value: &Value) -> Result<Vec<u8>, EthError> {
    let s = value
        .as_str()
        .ok_or_else(|| EthError::InvalidResponse(format!("expected hex string, got {value}")))?;
    let body = s
        .strip_prefix("0x")
        .ok_or_else(|| EthError::InvalidResponse(format!("missing 0x prefix: {s}")))?;
    hex::decode(body).map_err(|e| EthError::InvalidResponse(format!("bad hex {s}: {e}")))
}

fn parse_b256(value: &Value) -> Result<B256, EthError> {
    let bytes = parse_hex(value)?;
    if bytes.len() != 32 {
        return Err(EthError::InvalidResponse(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(B256::from_slice(&bytes))
}

fn parse_quantity(value: &Value) -> Result<u64, EthError> {
    let s = value
        .as_str()
        .ok_or_else(|| EthError::InvalidResponse(format!("expected quantity, got {value}")))?;
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| EthError::InvalidResponse(format!("missing 0x prefix: {s}")))?;
    u64::from_str_radix(digits, 16).map_err(|e| EthError::InvalidResponse(format!("bad quantity {s}: {e}")))
}
