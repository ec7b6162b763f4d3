use std::sync::Mutex;

use alloy_primitives::{address, Address, U256};
use async_trait::async_trait;
use chain_eth::abi::{encode_params, AbiValue, TupleDescriptor};
use chain_eth::binding::{Bind, ContractBinding, FunctionBinding, Mutability};
use chain_eth::erc20::erc20;
use chain_eth::rpc::Transport;
use chain_eth::{EthError, Network};
use serde_json::{json, Value};

/// Replies to `eth_call` with a fixed return blob and records the network of
/// each request.
struct Recorder {
    reply: Vec<u8>,
    seen: Mutex<Vec<(Network, String)>>,
}

impl Recorder {
    fn new(reply: Vec<u8>) -> Self {
        Self {
            reply,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<(Network, String)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for Recorder {
    async fn request(&self, network: Network, method: &str, _params: Value) -> Result<Value, EthError> {
        self.seen.lock().unwrap().push((network, method.to_string()));
        Ok(json!(format!("0x{}", hex::encode(&self.reply))))
    }
}

const ARB_ACCOUNT: Address = address!("00000000000000000000000000000000000000a1");
const ETH_ACCOUNT: Address = address!("00000000000000000000000000000000000000e1");

fn account() -> ContractBinding {
    ContractBinding::new("Account")
        .function(
            FunctionBinding::from_types("nonce", &[], &[("", "uint64")], Mutability::View).unwrap(),
        )
        .deployed(Network::Arbitrum, ARB_ACCOUNT)
        .deployed(Network::Ethereum, ETH_ACCOUNT)
}

#[test]
fn pairing_with_a_second_network_leaves_the_first_handle_alone() {
    let account = account();
    let arbitrum = account.on(Network::Arbitrum);
    let ethereum = account.on(Network::Ethereum);

    assert_eq!(arbitrum.network(), Network::Arbitrum);
    assert_eq!(arbitrum.address().unwrap(), ARB_ACCOUNT);
    assert_eq!(ethereum.network(), Network::Ethereum);
    assert_eq!(ethereum.address().unwrap(), ETH_ACCOUNT);
}

#[test]
fn handles_share_the_template() {
    let account = account();
    let a = account.on(Network::Arbitrum);
    let b = account.on(Network::Ethereum);
    assert!(std::ptr::eq(a.template(), b.template()));
    assert_eq!(a.name(), "Account");
}

#[tokio::test]
async fn each_handle_calls_its_own_network() {
    let reply = encode_params(
        &TupleDescriptor::anonymous(vec![chain_eth::abi::Field::new(
            "",
            chain_eth::Descriptor::uint(64).unwrap(),
        )]),
        &[AbiValue::from(9u64)],
    )
    .unwrap();
    let transport = Recorder::new(reply);

    let account = account();
    let arbitrum = account.on(Network::Arbitrum);
    let ethereum = account.on(Network::Ethereum);

    let from_eth = ethereum.call(&transport, "nonce", &[]).await.unwrap();
    let from_arb = arbitrum.call(&transport, "nonce", &[]).await.unwrap();
    assert_eq!(from_eth, vec![AbiValue::from(9u64)]);
    assert_eq!(from_arb, from_eth);

    assert_eq!(
        transport.seen(),
        vec![
            (Network::Ethereum, "eth_call".to_string()),
            (Network::Arbitrum, "eth_call".to_string()),
        ]
    );
}

#[tokio::test]
async fn concurrent_handles_do_not_interfere() {
    let transport = Recorder::new(vec![0u8; 32]);
    let account = account();
    let arbitrum = account.on(Network::Arbitrum);
    let ethereum = account.on(Network::Ethereum);
    let (a, b) = tokio::join!(
        arbitrum.call(&transport, "nonce", &[]),
        ethereum.call(&transport, "nonce", &[]),
    );
    assert!(a.is_ok() && b.is_ok());
    let mut networks: Vec<Network> = transport.seen().into_iter().map(|(n, _)| n).collect();
    networks.sort();
    assert_eq!(networks, vec![Network::Arbitrum, Network::Ethereum]);
}

#[test]
fn erc20_transaction_targets_the_bound_chain() {
    let usdc = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
    let token = erc20("USDC").unwrap().deployed(Network::Ethereum, usdc);

    let tx = token
        .on(Network::Ethereum)
        .transaction(
            "transfer",
            &[AbiValue::Address(ARB_ACCOUNT), AbiValue::Uint(U256::from(1_000_000u64))],
        )
        .unwrap();
    assert_eq!(tx.chain_id, 1);
    assert_eq!(tx.to, usdc);
    assert_eq!(hex::encode(&tx.data[..4]), "a9059cbb");

    let err = token
        .on(Network::Sapphire)
        .transaction("transfer", &[])
        .unwrap_err();
    assert!(matches!(err, EthError::NotDeployed { network: Network::Sapphire, .. }));
}
