use alloy_primitives::{Address, B256};
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::{EncodedPoint, PublicKey};

use crate::error::AbiError;
use crate::keccak::{keccak256, keccak256_concat};

/// Uniswap V2 factory on Ethereum mainnet.
pub const UNISWAP_V2_FACTORY: Address = Address::new([
    0x5c, 0x69, 0xbe, 0xe7, 0x01, 0xef, 0x81, 0x4a, 0x2b, 0x6a, 0x3e, 0xdd, 0x4b, 0x16, 0x52, 0xcb,
    0x9c, 0xc5, 0xaa, 0x6f,
]);

/// `keccak256` of the Uniswap V2 pair creation code.
pub const UNISWAP_V2_INIT_CODE_HASH: B256 = B256::new([
    0x96, 0xe8, 0xac, 0x42, 0x77, 0x19, 0x8f, 0xf8, 0xb6, 0xf7, 0x85, 0x47, 0x8a, 0xa9, 0xa3, 0x9f,
    0x40, 0x3c, 0xb7, 0x68, 0xdd, 0x02, 0xcb, 0xee, 0x32, 0x6c, 0x3e, 0x7d, 0xa3, 0x48, 0x84, 0x5f,
]);

/// Renders an address with its EIP-55 mixed-case checksum.
pub fn to_checksum(address: &Address) -> String {
    let lower = hex::encode(address.as_slice());
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        // nibble i of the hash decides the case of hex digit i
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Applies EIP-55 checksum casing to a `0x`-prefixed hex address in any case.
pub fn checksum_address(address: &str) -> Result<String, AbiError> {
    let raw = parse_hex_body(address)?;
    Ok(to_checksum(&raw))
}

/// Checks the format of an address string.
///
/// Returns `Ok(false)` when a mixed-case address carries a wrong checksum.
/// All-lowercase and all-uppercase addresses carry no checksum and are valid.
pub fn validate_address(address: &str) -> Result<bool, AbiError> {
    let raw = parse_hex_body(address)?;
    // parse_hex_body has checked the 0x prefix
    let body = &address[2..];

    let is_all_lower = body.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = body.chars().all(|c| !c.is_ascii_lowercase());
    if is_all_lower || is_all_upper {
        return Ok(true);
    }

    Ok(to_checksum(&raw)[2..] == *body)
}

/// Parses an address, rejecting mixed-case input whose checksum is wrong.
pub fn parse_address(address: &str) -> Result<Address, AbiError> {
    if !validate_address(address)? {
        return Err(AbiError::MalformedAddress(format!("bad EIP-55 checksum: {address}")));
    }
    parse_hex_body(address)
}

fn parse_hex_body(address: &str) -> Result<Address, AbiError> {
    let body = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| AbiError::MalformedAddress("address must start with 0x".into()))?;

    if body.len() != 40 {
        return Err(AbiError::MalformedAddress(format!(
            "expected 40 hex characters, got {}",
            body.len()
        )));
    }

    let bytes = hex::decode(body)
        .map_err(|_| AbiError::MalformedAddress("address contains non-hex characters".into()))?;
    Ok(Address::from_slice(&bytes))
}

/// Derives the address of an uncompressed secp256k1 public key
/// (65 bytes, `0x04` prefix).
pub fn pubkey_to_eth_address(uncompressed_pubkey: &[u8; 65]) -> Result<Address, AbiError> {
    if uncompressed_pubkey[0] != 0x04 {
        return Err(AbiError::MalformedAddress(
            "uncompressed key must start with 0x04".into(),
        ));
    }
    // Keccak-256 of the 64-byte key, without the 0x04 prefix.
    let hash = keccak256(&uncompressed_pubkey[1..]);

    // The last 20 bytes are the address.
    Ok(Address::from_slice(&hash[12..]))
}

/// Derives the address of a compressed secp256k1 public key (33 bytes).
pub fn pubkey_bytes_to_eth_address(pubkey_33_bytes: &[u8; 33]) -> Result<Address, AbiError> {
    let encoded = EncodedPoint::from_bytes(pubkey_33_bytes)
        .map_err(|e| AbiError::MalformedAddress(format!("invalid compressed key encoding: {e}")))?;

    let pubkey: Option<PublicKey> = PublicKey::from_encoded_point(&encoded).into();
    let pubkey = pubkey
        .ok_or_else(|| AbiError::MalformedAddress("point is not on the secp256k1 curve".into()))?;

    // Decompress so the address is hashed over the full (x, y) point.
    let uncompressed = pubkey.to_encoded_point(false);
    let mut key_65 = [0u8; 65];
    key_65.copy_from_slice(uncompressed.as_bytes());
    pubkey_to_eth_address(&key_65)
}

/// `keccak256(0xff ++ deployer ++ salt ++ init_code_hash)[12..]`
pub fn create2_address(deployer: &Address, salt: &B256, init_code_hash: &B256) -> Address {
    let hash = keccak256_concat([
        [0xffu8].as_slice(),
        deployer.as_slice(),
        salt.as_slice(),
        init_code_hash.as_slice(),
    ]);
    Address::from_slice(&hash[12..])
}

/// Orders two token addresses the way Uniswap V2 pairs do.
pub fn sort_tokens(a: Address, b: Address) -> (Address, Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// CREATE2 address of a pair deployed by `factory`, salted with
/// `keccak256(token0 ++ token1)` over the sorted tokens.
pub fn create2_pair_address(
    factory: &Address,
    init_code_hash: &B256,
    token_a: Address,
    token_b: Address,
) -> Address {
    let (token0, token1) = sort_tokens(token_a, token_b);
    let salt = keccak256_concat([token0.as_slice(), token1.as_slice()]);
    create2_address(factory, &salt, init_code_hash)
}

/// Mainnet Uniswap V2 pair address for two tokens.
pub fn uniswap_v2_pair_address(token_a: Address, token_b: Address) -> Address {
    create2_pair_address(&UNISWAP_V2_FACTORY, &UNISWAP_V2_INIT_CODE_HASH, token_a, token_b)
}
