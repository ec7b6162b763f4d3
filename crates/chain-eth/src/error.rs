use thiserror::Error;

use crate::chains::Network;
use crate::config::ConfigError;

/// Errors raised by the ABI and EIP-712 codec.
///
/// Every variant is a deterministic function of the codec's inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("invalid integer width: {0} (must be a multiple of 8 in 8..=256)")]
    InvalidIntWidth(usize),

    #[error("value out of range for {ty}: {value}")]
    OutOfRange { ty: String, value: String },

    #[error("wrong arity: expected {expected} elements, got {found}")]
    WrongArity { expected: usize, found: usize },

    #[error("unknown custom type: {0}")]
    UnknownCustomType(String),

    #[error("cyclic type reference through {0}")]
    CyclicType(String),

    #[error("type name collision: {0} is declared with two different shapes")]
    TypeNameCollision(String),

    #[error("malformed address: {0}")]
    MalformedAddress(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("json error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for AbiError {
    fn from(e: serde_json::Error) -> Self {
        AbiError::Json(e.to_string())
    }
}

/// Errors raised by the binding, transport and signing layers.
#[derive(Debug, Error)]
pub enum EthError {
    #[error(transparent)]
    Abi(#[from] AbiError),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("unknown event: {0}")]
    UnknownEvent(String),

    #[error("{contract} is not deployed on {network}")]
    NotDeployed { contract: String, network: Network },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
