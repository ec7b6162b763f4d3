use alloy_primitives::{Address, B256};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use zeroize::Zeroize;

use crate::abi::{AbiValue, Descriptor};
use crate::address::pubkey_to_eth_address;
use crate::eip712::{typed_data_digest, Eip712Domain, TypedData};
use crate::error::EthError;
use crate::keccak::keccak256_concat;

/// Signs a 32-byte digest as-is (no EIP-191 prefix).
///
/// Returns `r || s || v` with `v` in `{27, 28}`.
pub fn sign_hash(hash: &B256, private_key: &[u8; 32]) -> Result<[u8; 65], EthError> {
    let mut key_bytes = *private_key;
    let signing_key = SigningKey::from_bytes((&key_bytes).into())
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()));
    key_bytes.zeroize();
    let signing_key = signing_key?;

    let (signature, recovery_id): (Signature, RecoveryId) = signing_key
        .sign_prehash(hash.as_slice())
        .map_err(|e| EthError::SigningError(e.to_string()))?;

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = recovery_id.is_y_odd() as u8 + 27;
    Ok(out)
}

/// Signs `message` under EIP-191 `personal_sign`.
pub fn sign_message(message: &[u8], private_key: &[u8; 32]) -> Result<[u8; 65], EthError> {
    sign_hash(&personal_message_hash(message), private_key)
}

/// `keccak256("\x19Ethereum Signed Message:\n" ++ len ++ message)`
pub fn personal_message_hash(message: &[u8]) -> B256 {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
    keccak256_concat([prefix.as_bytes(), message])
}

/// Recovers the signer of a 65-byte `r || s || v` signature over `hash`.
///
/// `v` may be given as `0/1` or `27/28`.
pub fn recover_address(hash: &B256, signature: &[u8; 65]) -> Result<Address, EthError> {
    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| EthError::SigningError(format!("invalid signature: {e}")))?;
    let v = match signature[64] {
        v @ (27 | 28) => v - 27,
        v => v,
    };
    let recid = RecoveryId::from_byte(v)
        .ok_or_else(|| EthError::SigningError(format!("invalid recovery id {v}")))?;

    let key = VerifyingKey::recover_from_prehash(hash.as_slice(), &sig, recid)
        .map_err(|e| EthError::SigningError(format!("recovery failed: {e}")))?;

    let point = key.to_encoded_point(false);
    let mut uncompressed = [0u8; 65];
    uncompressed.copy_from_slice(point.as_bytes());
    Ok(pubkey_to_eth_address(&uncompressed)?)
}

/// Address controlled by a private key.
pub fn address_of(private_key: &[u8; 32]) -> Result<Address, EthError> {
    let mut key_bytes = *private_key;
    let signing_key = SigningKey::from_bytes((&key_bytes).into())
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()));
    key_bytes.zeroize();

    let point = signing_key?.verifying_key().to_encoded_point(false);
    let mut uncompressed = [0u8; 65];
    uncompressed.copy_from_slice(point.as_bytes());
    Ok(pubkey_to_eth_address(&uncompressed)?)
}

/// Signs the EIP-712 digest of `value` under `domain`.
pub fn sign_typed_data(
    domain: &Eip712Domain,
    descriptor: &Descriptor,
    value: &AbiValue,
    private_key: &[u8; 32],
) -> Result<[u8; 65], EthError> {
    let digest = typed_data_digest(domain, descriptor, value)?;
    sign_hash(&digest, private_key)
}

/// Signs an `eth_signTypedData_v4` JSON payload.
pub fn sign_typed_data_json(data: &TypedData, private_key: &[u8; 32]) -> Result<[u8; 65], EthError> {
    sign_hash(&data.signing_hash()?, private_key)
}
