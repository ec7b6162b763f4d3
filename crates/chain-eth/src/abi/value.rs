use alloy_primitives::{Address, I256, U256};

use crate::error::AbiError;

/// A value to be encoded against a [`Descriptor`](super::Descriptor).
///
/// Both array kinds share `Array`; tuples and structs share `Tuple` and are
/// positional, in field declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(U256),
    Int(I256),
    Bool(bool),
    Address(Address),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// Short name of the variant, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Uint(_) => "uint",
            AbiValue::Int(_) => "int",
            AbiValue::Bool(_) => "bool",
            AbiValue::Address(_) => "address",
            AbiValue::FixedBytes(_) => "fixed bytes",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::String(_) => "string",
            AbiValue::Array(_) => "array",
            AbiValue::Tuple(_) => "tuple",
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            AbiValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            AbiValue::Address(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Payload of `Bytes` or `FixedBytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(v) | AbiValue::FixedBytes(v) => Some(v),
            _ => None,
        }
    }

    /// Elements of an `Array` or members of a `Tuple`.
    pub fn as_slice(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(v) | AbiValue::Tuple(v) => Some(v),
            _ => None,
        }
    }

    /// Consumes a `Tuple` with exactly `arity` members.
    pub fn into_tuple(self, arity: usize) -> Result<Vec<AbiValue>, AbiError> {
        match self {
            AbiValue::Tuple(items) if items.len() == arity => Ok(items),
            AbiValue::Tuple(items) => Err(AbiError::WrongArity {
                expected: arity,
                found: items.len(),
            }),
            other => Err(mismatch("tuple", &other)),
        }
    }

    /// Consumes an `Array`, whatever its length.
    pub fn into_array(self) -> Result<Vec<AbiValue>, AbiError> {
        match self {
            AbiValue::Array(items) => Ok(items),
            other => Err(mismatch("array", &other)),
        }
    }
}

pub(crate) fn mismatch(expected: impl Into<String>, found: &AbiValue) -> AbiError {
    AbiError::TypeMismatch {
        expected: expected.into(),
        found: found.kind().to_string(),
    }
}

impl From<bool> for AbiValue {
    fn from(v: bool) -> Self {
        AbiValue::Bool(v)
    }
}

impl From<U256> for AbiValue {
    fn from(v: U256) -> Self {
        AbiValue::Uint(v)
    }
}

impl From<I256> for AbiValue {
    fn from(v: I256) -> Self {
        AbiValue::Int(v)
    }
}

impl From<Address> for AbiValue {
    fn from(v: Address) -> Self {
        AbiValue::Address(v)
    }
}

impl From<String> for AbiValue {
    fn from(v: String) -> Self {
        AbiValue::String(v)
    }
}

impl From<&str> for AbiValue {
    fn from(v: &str) -> Self {
        AbiValue::String(v.to_string())
    }
}

impl From<u64> for AbiValue {
    fn from(v: u64) -> Self {
        AbiValue::Uint(U256::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variants() {
        assert_eq!(AbiValue::from(true).as_bool(), Some(true));
        assert_eq!(AbiValue::from(7u64).as_uint(), Some(U256::from(7u64)));
        assert_eq!(AbiValue::from("hi").as_str(), Some("hi"));
        assert_eq!(AbiValue::Bytes(vec![1, 2]).as_bytes(), Some(&[1u8, 2][..]));
        assert!(AbiValue::from(true).as_uint().is_none());
    }

    #[test]
    fn into_tuple_checks_arity() {
        let v = AbiValue::Tuple(vec![true.into(), false.into()]);
        assert_eq!(v.clone().into_tuple(2).unwrap().len(), 2);
        assert_eq!(
            v.into_tuple(3),
            Err(AbiError::WrongArity {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn into_tuple_rejects_other_kinds() {
        let err = AbiValue::Bool(true).into_tuple(1).unwrap_err();
        assert_eq!(
            err,
            AbiError::TypeMismatch {
                expected: "tuple".into(),
                found: "bool".into()
            }
        );
    }
}
