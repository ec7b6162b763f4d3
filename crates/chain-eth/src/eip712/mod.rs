//! EIP-712 typed structured data hashing.

pub mod domain;
pub mod hash;
pub mod typed_data;
pub mod types;

use alloy_primitives::B256;

pub use domain::Eip712Domain;
pub use hash::{encode_data, hash_struct, signing_hash, type_hash, typed_data_digest};
pub use typed_data::{json_to_value, TypedData, TypedDataField};
pub use types::{dependencies, encode_type};

use crate::abi::AbiType;
use crate::error::AbiError;

/// EIP-712 hashing for any struct declared with `abi_struct!`.
pub trait Eip712: AbiType {
    fn eip712_encode_type() -> Result<String, AbiError> {
        encode_type(&Self::descriptor()?)
    }

    fn eip712_type_hash() -> Result<B256, AbiError> {
        type_hash(&Self::descriptor()?)
    }

    fn eip712_hash_struct(&self) -> Result<B256, AbiError> {
        hash_struct(&Self::descriptor()?, &self.to_value())
    }

    fn eip712_signing_hash(&self, domain: &Eip712Domain) -> Result<B256, AbiError> {
        typed_data_digest(domain, &Self::descriptor()?, &self.to_value())
    }
}

impl<T: AbiType> Eip712 for T {}
