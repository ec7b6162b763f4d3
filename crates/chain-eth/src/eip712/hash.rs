use alloy_primitives::B256;

use super::domain::Eip712Domain;
use super::types::{as_named, encode_type};
use crate::abi::encoder::encode_word;
use crate::abi::{AbiValue, Descriptor, Primitive, TupleDescriptor};
use crate::error::AbiError;
use crate::keccak::{keccak256, keccak256_concat};

/// `keccak256(encodeType(S))`
pub fn type_hash(descriptor: &Descriptor) -> Result<B256, AbiError> {
    Ok(keccak256(encode_type(descriptor)?))
}

/// `keccak256(typeHash || encodeData(S, v))`
pub fn hash_struct(descriptor: &Descriptor, value: &AbiValue) -> Result<B256, AbiError> {
    let type_hash = type_hash(descriptor)?;
    let data = encode_data(descriptor, value)?;
    Ok(keccak256_concat([type_hash.as_slice(), data.as_slice()]))
}

/// One 32-byte word per member of a named struct.
pub fn encode_data(descriptor: &Descriptor, value: &AbiValue) -> Result<Vec<u8>, AbiError> {
    let tuple = as_named(descriptor)?;
    encode_members(tuple, value)
}

/// `keccak256(0x1901 || domainSeparator || hashStruct(message))`
pub fn typed_data_digest(
    domain: &Eip712Domain,
    descriptor: &Descriptor,
    value: &AbiValue,
) -> Result<B256, AbiError> {
    Ok(signing_hash(&domain.separator()?, &hash_struct(descriptor, value)?))
}

/// Final EIP-712 digest from an already computed separator and struct hash.
pub fn signing_hash(domain_separator: &B256, struct_hash: &B256) -> B256 {
    keccak256_concat([
        [0x19u8, 0x01].as_slice(),
        domain_separator.as_slice(),
        struct_hash.as_slice(),
    ])
}

fn encode_members(tuple: &TupleDescriptor, value: &AbiValue) -> Result<Vec<u8>, AbiError> {
    let items = match value {
        AbiValue::Tuple(items) => items,
        other => return Err(crate::abi::value::mismatch("tuple", other)),
    };
    if items.len() != tuple.len() {
        return Err(AbiError::WrongArity {
            expected: tuple.len(),
            found: items.len(),
        });
    }

    let mut out = Vec::with_capacity(32 * items.len());
    for (field, item) in tuple.fields().iter().zip(items) {
        out.extend_from_slice(member_word(field.descriptor(), item)?.as_slice());
    }
    Ok(out)
}

fn member_word(descriptor: &Descriptor, value: &AbiValue) -> Result<B256, AbiError> {
    match descriptor {
        Descriptor::Primitive(Primitive::Bytes) => match value {
            AbiValue::Bytes(b) => Ok(keccak256(b)),
            other => Err(crate::abi::value::mismatch("bytes", other)),
        },
        Descriptor::Primitive(Primitive::String) => match value {
            AbiValue::String(s) => Ok(keccak256(s.as_bytes())),
            other => Err(crate::abi::value::mismatch("string", other)),
        },
        Descriptor::Primitive(p) => encode_word(p, value).map(B256::from),
        Descriptor::FixedArray(inner, len) => {
            let items = array_items(value)?;
            if items.len() != *len {
                return Err(AbiError::WrongArity {
                    expected: *len,
                    found: items.len(),
                });
            }
            hash_elements(inner, items)
        }
        Descriptor::DynArray(inner) => hash_elements(inner, array_items(value)?),
        Descriptor::Tuple(t) if t.name().is_some() => hash_struct(descriptor, value),
        Descriptor::Tuple(t) => Ok(keccak256(encode_members(t, value)?)),
    }
}

fn array_items(value: &AbiValue) -> Result<&[AbiValue], AbiError> {
    match value {
        AbiValue::Array(items) => Ok(items),
        other => Err(crate::abi::value::mismatch("array", other)),
    }
}

fn hash_elements(inner: &Descriptor, items: &[AbiValue]) -> Result<B256, AbiError> {
    let mut words = Vec::with_capacity(32 * items.len());
    for item in items {
        words.extend_from_slice(member_word(inner, item)?.as_slice());
    }
    Ok(keccak256(words))
}
