use alloy_primitives::{Address, U256};

use crate::abi::{AbiValue, Descriptor, Field, Primitive};
use crate::binding::{ContractBinding, EventBinding, FunctionBinding, Mutability};
use crate::error::AbiError;

/// Function selector for `transfer(address,uint256)`: `0xa9059cbb`.
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// Function selector for `balanceOf(address)`: `0x70a08231`.
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Function selector for `approve(address,uint256)`: `0x095ea7b3`.
pub const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

fn uint256() -> Descriptor {
    Descriptor::Primitive(Primitive::Uint(256))
}

fn params(members: Vec<(&str, Descriptor)>) -> Descriptor {
    Descriptor::tuple(members.into_iter().map(|(n, d)| Field::new(n, d)).collect())
}

/// `transfer(address to, uint256 amount) returns (bool)`
pub fn transfer() -> FunctionBinding {
    FunctionBinding::new(
        "transfer",
        params(vec![("to", Descriptor::address()), ("amount", uint256())]),
        Descriptor::bool(),
        Mutability::NonPayable,
    )
}

/// `approve(address spender, uint256 amount) returns (bool)`
pub fn approve() -> FunctionBinding {
    FunctionBinding::new(
        "approve",
        params(vec![("spender", Descriptor::address()), ("amount", uint256())]),
        Descriptor::bool(),
        Mutability::NonPayable,
    )
}

/// `balanceOf(address owner) view returns (uint256)`
pub fn balance_of() -> FunctionBinding {
    FunctionBinding::new(
        "balanceOf",
        params(vec![("owner", Descriptor::address())]),
        uint256(),
        Mutability::View,
    )
}

/// `allowance(address owner, address spender) view returns (uint256)`
pub fn allowance() -> FunctionBinding {
    FunctionBinding::new(
        "allowance",
        params(vec![("owner", Descriptor::address()), ("spender", Descriptor::address())]),
        uint256(),
        Mutability::View,
    )
}

/// The standard ERC-20 interface with no deployments.
///
/// Add deployments with [`ContractBinding::deployed`] and pair it with a
/// network through [`Bind::on`](crate::binding::Bind::on).
pub fn erc20(name: impl Into<String>) -> Result<ContractBinding, AbiError> {
    let transfer_event = EventBinding::new(
        "Transfer",
        params(vec![
            ("from", Descriptor::address()),
            ("to", Descriptor::address()),
            ("value", uint256()),
        ]),
        vec![true, true, false],
    )?;
    let approval_event = EventBinding::new(
        "Approval",
        params(vec![
            ("owner", Descriptor::address()),
            ("spender", Descriptor::address()),
            ("value", uint256()),
        ]),
        vec![true, true, false],
    )?;

    Ok(ContractBinding::new(name)
        .function(transfer())
        .function(approve())
        .function(balance_of())
        .function(allowance())
        .function(FunctionBinding::new(
            "decimals",
            Descriptor::tuple(Vec::new()),
            Descriptor::Primitive(Primitive::Uint(8)),
            Mutability::View,
        ))
        .function(FunctionBinding::new(
            "symbol",
            Descriptor::tuple(Vec::new()),
            Descriptor::string(),
            Mutability::View,
        ))
        .function(FunctionBinding::new(
            "totalSupply",
            Descriptor::tuple(Vec::new()),
            uint256(),
            Mutability::View,
        ))
        .event(transfer_event)
        .event(approval_event))
}

/// Encodes an ERC-20 `transfer(address,uint256)` call.
///
/// Returns the complete calldata (4-byte selector + 64 bytes of ABI-encoded params).
pub fn encode_transfer(to: Address, amount: U256) -> Result<Vec<u8>, AbiError> {
    transfer().encode_call(&[AbiValue::Address(to), AbiValue::Uint(amount)])
}

/// Encodes an ERC-20 `balanceOf(address)` call.
pub fn encode_balance_of(owner: Address) -> Result<Vec<u8>, AbiError> {
    balance_of().encode_call(&[AbiValue::Address(owner)])
}

/// Encodes an ERC-20 `approve(address,uint256)` call.
pub fn encode_approve(spender: Address, amount: U256) -> Result<Vec<u8>, AbiError> {
    approve().encode_call(&[AbiValue::Address(spender), AbiValue::Uint(amount)])
}

/// Decodes the single uint256 returned by `balanceOf`, `allowance` and
/// `totalSupply`.
pub fn decode_uint256(data: &[u8]) -> Result<U256, AbiError> {
    balance_of().decode_output_as::<U256>(data)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use serde_json::json;

    use super::*;
    use crate::binding::Bind;
    use crate::chains::Network;
    use crate::rpc::testing::MockTransport;

    const DEAD: Address = address!("000000000000000000000000000000000000dEaD");

    #[test]
    fn encode_transfer_correct_selector() {
        let data = encode_transfer(DEAD, U256::ZERO).unwrap();
        assert_eq!(&data[..4], &TRANSFER_SELECTOR);
    }

    #[test]
    fn encode_transfer_correct_length() {
        let data = encode_transfer(DEAD, U256::ZERO).unwrap();

        // 4 (selector) + 32 (address) + 32 (amount) = 68 bytes.
        assert_eq!(data.len(), 68);
    }

    #[test]
    fn encode_transfer_encodes_address() {
        let data = encode_transfer(DEAD, U256::ZERO).unwrap();

        // Address is left-padded to 32 bytes starting at offset 4.
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(data[34], 0xdE);
        assert_eq!(data[35], 0xaD);
    }

    #[test]
    fn encode_transfer_encodes_amount() {
        let data = encode_transfer(DEAD, U256::from(100u64)).unwrap();

        assert_eq!(data[67], 0x64);
        assert_eq!(&data[36..67], &[0u8; 31]);
    }

    #[test]
    fn encode_transfer_full_calldata_matches_expected() {
        let to = address!("dead000000000000000000000000000000000000");
        let one_token = U256::from(1_000_000_000_000_000_000u64);

        let data = encode_transfer(to, one_token).unwrap();

        assert_eq!(hex::encode(&data[..4]), "a9059cbb");
        assert!(hex::encode(&data[4..36]).starts_with("000000000000000000000000dead"));
        assert!(hex::encode(&data[36..68]).ends_with("0de0b6b3a7640000"));
    }

    #[test]
    fn encode_balance_of_correct_selector_and_length() {
        let data = encode_balance_of(DEAD).unwrap();
        assert_eq!(&data[..4], &BALANCE_OF_SELECTOR);
        // 4 (selector) + 32 (address) = 36 bytes.
        assert_eq!(data.len(), 36);
    }

    #[test]
    fn encode_approve_correct_selector_and_length() {
        let data = encode_approve(DEAD, U256::MAX).unwrap();
        assert_eq!(&data[..4], &APPROVE_SELECTOR);
        assert_eq!(data.len(), 68);
        assert_eq!(&data[36..68], &[0xff; 32]);
    }

    #[test]
    fn selectors_match_signatures() {
        assert_eq!(transfer().selector(), TRANSFER_SELECTOR);
        assert_eq!(approve().selector(), APPROVE_SELECTOR);
        assert_eq!(balance_of().selector(), BALANCE_OF_SELECTOR);
        assert_eq!(allowance().signature(), "allowance(address,address)");
        assert_eq!(hex::encode(allowance().selector()), "dd62ed3e");
    }

    #[test]
    fn decode_uint256_valid() {
        let mut data = [0u8; 32];
        data[31] = 42;
        assert_eq!(decode_uint256(&data).unwrap(), U256::from(42u64));
    }

    #[test]
    fn decode_uint256_too_short() {
        assert!(decode_uint256(&[0u8; 16]).is_err());
    }

    #[test]
    fn binding_declares_standard_interface() {
        let token = erc20("USDC").unwrap();
        for name in ["transfer", "approve", "balanceOf", "allowance", "decimals", "symbol", "totalSupply"] {
            assert!(token.get_function(name).is_ok(), "missing {name}");
        }
        assert_eq!(token.get_function("totalSupply").unwrap().signature(), "totalSupply()");
        assert_eq!(
            hex::encode(token.get_event("Transfer").unwrap().topic0()),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
        assert_eq!(
            hex::encode(token.get_event("Approval").unwrap().topic0()),
            "8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925"
        );
    }

    #[tokio::test]
    async fn symbol_call_decodes_string() {
        // abi.encode("USDC")
        let ret = format!(
            "0x{}{}{}",
            format!("{:064x}", 32),
            format!("{:064x}", 4),
            format!("{:0<64}", hex::encode("USDC"))
        );
        let mock = MockTransport::default().with("eth_call", json!(ret));
        let token = erc20("USDC")
            .unwrap()
            .deployed(Network::Ethereum, address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"));

        let out = token.on(Network::Ethereum).call(&mock, "symbol", &[]).await.unwrap();
        assert_eq!(out, vec![AbiValue::from("USDC")]);

        let calls = mock.calls();
        assert_eq!(calls[0].2[0]["data"], format!("0x{}", hex::encode(crate::keccak::selector("symbol()"))));
    }
}
