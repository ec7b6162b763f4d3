//! Typed Ethereum ABI and EIP-712 codec with network-parameterized contract bindings.
//!
//! This crate provides:
//! - Type descriptors for ABI values, built by hand, parsed from type strings,
//!   or declared on Rust structs with [`abi_struct!`]
//! - Canonical tuple-type strings and head/tail ABI encoding and decoding
//! - EIP-712 `encodeType`, struct hashes, domain separators and typed-data digests,
//!   including `eth_signTypedData_v4` JSON payloads
//! - secp256k1 signing and recovery of digests
//! - EIP-55 addresses, CREATE2 and Uniswap V2 pair addresses
//! - A closed registry of EVM networks and contract bindings paired with them
//!   through [`Bind::on`](binding::Bind::on)
//! - A JSON-RPC transport over HTTP configured by [`RpcConfig`](config::RpcConfig)

pub mod abi;
pub mod address;
pub mod binding;
pub mod chains;
pub mod config;
pub mod eip712;
pub mod erc20;
pub mod error;
pub mod keccak;
pub mod rpc;
pub mod signer;

pub use abi::{AbiType, AbiValue, Descriptor};
pub use binding::{Bind, Bound, ContractBinding, EventBinding, FunctionBinding};
pub use chains::Network;
pub use eip712::{Eip712, Eip712Domain};
pub use error::{AbiError, EthError};
