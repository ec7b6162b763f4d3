//! Head/tail ABI encoding.
//!
//! Every function here is pure: the same descriptor and value always yield
//! the same bytes, and the output length is always a multiple of 32.

use alloy_primitives::{I256, U256};

use super::descriptor::{Descriptor, TupleDescriptor};
use super::primitive::Primitive;
use super::value::{mismatch, AbiValue};
use crate::error::AbiError;

/// A single 32-byte ABI word.
pub type Word = [u8; 32];

/// Encodes `value` on its own.
///
/// For a tuple descriptor this is the tuple body (what `abi.encode` produces
/// for a struct argument list); for a dynamic array it is `length || body`.
pub fn encode(descriptor: &Descriptor, value: &AbiValue) -> Result<Vec<u8>, AbiError> {
    let mut out = Vec::new();
    encode_into(descriptor, value, &mut out)?;
    Ok(out)
}

/// Encodes a list of arguments as one anonymous tuple.
pub fn encode_params(inputs: &TupleDescriptor, values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    if inputs.len() != values.len() {
        return Err(AbiError::WrongArity {
            expected: inputs.len(),
            found: values.len(),
        });
    }
    let descriptors: Vec<&Descriptor> = inputs.fields().iter().map(|f| f.descriptor()).collect();
    let mut out = Vec::new();
    encode_sequence(&descriptors, values, &mut out)?;
    Ok(out)
}

/// Encodes a function call: `selector || encode(inputs, args)`.
///
/// # Parameters
///
/// - `selector`: The 4-byte function selector (e.g., `0xa9059cbb` for ERC-20
///   `transfer`).
/// - `inputs`: The argument list, normally an anonymous tuple.
/// - `args`: A value of the shape `inputs` describes.
pub fn encode_function_call(
    selector: [u8; 4],
    inputs: &Descriptor,
    args: &AbiValue,
) -> Result<Vec<u8>, AbiError> {
    let mut data = selector.to_vec();
    encode_into(inputs, args, &mut data)?;
    Ok(data)
}

fn encode_into(descriptor: &Descriptor, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), AbiError> {
    match descriptor {
        Descriptor::Primitive(Primitive::Bytes) => {
            let payload = match value {
                AbiValue::Bytes(b) => b.as_slice(),
                other => return Err(mismatch("bytes", other)),
            };
            encode_packed_payload(payload, out);
        }
        Descriptor::Primitive(Primitive::String) => {
            let payload = match value {
                AbiValue::String(s) => s.as_bytes(),
                other => return Err(mismatch("string", other)),
            };
            encode_packed_payload(payload, out);
        }
        Descriptor::Primitive(p) => out.extend_from_slice(&encode_word(p, value)?),
        Descriptor::FixedArray(inner, len) => {
            let items = array_items(value)?;
            if items.len() != *len {
                return Err(AbiError::WrongArity {
                    expected: *len,
                    found: items.len(),
                });
            }
            reject_zero_sized(inner, items)?;
            let descriptors = vec![inner.as_ref(); *len];
            encode_sequence(&descriptors, items, out)?;
        }
        Descriptor::DynArray(inner) => {
            let items = array_items(value)?;
            reject_zero_sized(inner, items)?;
            out.extend_from_slice(&usize_word(items.len()));
            let descriptors = vec![inner.as_ref(); items.len()];
            encode_sequence(&descriptors, items, out)?;
        }
        Descriptor::Tuple(t) => {
            let items = match value {
                AbiValue::Tuple(items) => items,
                other => return Err(mismatch("tuple", other)),
            };
            if items.len() != t.len() {
                return Err(AbiError::WrongArity {
                    expected: t.len(),
                    found: items.len(),
                });
            }
            let descriptors: Vec<&Descriptor> = t.fields().iter().map(|f| f.descriptor()).collect();
            encode_sequence(&descriptors, items, out)?;
        }
    }
    Ok(())
}

fn array_items(value: &AbiValue) -> Result<&[AbiValue], AbiError> {
    match value {
        AbiValue::Array(items) => Ok(items),
        other => Err(mismatch("array", other)),
    }
}

/// Elements with an empty head leave nothing for a decoder to count.
fn reject_zero_sized(inner: &Descriptor, items: &[AbiValue]) -> Result<(), AbiError> {
    if !items.is_empty() && inner.head_size()? == 0 {
        return Err(AbiError::UnsupportedType(
            "array elements must occupy at least one word".into(),
        ));
    }
    Ok(())
}

/// Heads first, then tails; offsets are relative to the start of this sequence.
fn encode_sequence(
    descriptors: &[&Descriptor],
    values: &[AbiValue],
    out: &mut Vec<u8>,
) -> Result<(), AbiError> {
    if descriptors.len() != values.len() {
        return Err(AbiError::WrongArity {
            expected: descriptors.len(),
            found: values.len(),
        });
    }
    let head_len = descriptors.iter().try_fold(0usize, |acc, d| {
        acc.checked_add(d.head_size()?)
            .ok_or_else(|| AbiError::UnsupportedType("tuple head is too large".into()))
    })?;
    // grows with the value, never with the declared head size
    let mut head = Vec::new();
    let mut tail = Vec::new();

    for (descriptor, value) in descriptors.iter().zip(values) {
        if descriptor.is_dynamic() {
            let offset = head_len
                .checked_add(tail.len())
                .ok_or_else(|| AbiError::UnsupportedType("tuple encoding is too large".into()))?;
            head.extend_from_slice(&usize_word(offset));
            encode_into(descriptor, value, &mut tail)?;
        } else {
            encode_into(descriptor, value, &mut head)?;
        }
    }

    out.extend_from_slice(&head);
    out.extend_from_slice(&tail);
    Ok(())
}

/// `length || payload`, right-padded to a word boundary.
fn encode_packed_payload(payload: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&usize_word(payload.len()));
    out.extend_from_slice(payload);
    let rem = payload.len() % 32;
    if rem != 0 {
        out.resize(out.len() + 32 - rem, 0);
    }
}

pub(crate) fn usize_word(n: usize) -> Word {
    U256::from(n).to_be_bytes::<32>()
}

/// Encodes a static primitive into its 32-byte slot.
pub(crate) fn encode_word(primitive: &Primitive, value: &AbiValue) -> Result<Word, AbiError> {
    match (primitive, value) {
        (Primitive::Uint(bits), AbiValue::Uint(v)) => encode_uint(*bits, *v),
        (Primitive::Uint(bits), AbiValue::Int(v)) => {
            if v.is_negative() {
                return Err(out_of_range(primitive, v));
            }
            encode_uint(*bits, v.into_raw())
        }
        (Primitive::Int(bits), AbiValue::Int(v)) => encode_int(*bits, *v),
        (Primitive::Int(bits), AbiValue::Uint(v)) => {
            // a non-negative value must leave the sign bit clear
            if v.bit_len() >= *bits {
                return Err(out_of_range(primitive, v));
            }
            Ok(v.to_be_bytes::<32>())
        }
        (Primitive::Bool, AbiValue::Bool(b)) => {
            let mut word = [0u8; 32];
            word[31] = u8::from(*b);
            Ok(word)
        }
        (Primitive::Address, AbiValue::Address(addr)) => {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(addr.as_slice());
            Ok(word)
        }
        (Primitive::FixedBytes(size), AbiValue::FixedBytes(bytes) | AbiValue::Bytes(bytes)) => {
            if bytes.len() != *size {
                return Err(AbiError::TypeMismatch {
                    expected: primitive.to_string(),
                    found: format!("{} bytes", bytes.len()),
                });
            }
            let mut word = [0u8; 32];
            word[..*size].copy_from_slice(bytes);
            Ok(word)
        }
        (Primitive::Bytes | Primitive::String, _) => Err(AbiError::UnsupportedType(format!(
            "{primitive} does not fit in a single word"
        ))),
        (_, other) => Err(mismatch(primitive.to_string(), other)),
    }
}

fn encode_uint(bits: usize, v: U256) -> Result<Word, AbiError> {
    if v.bit_len() > bits {
        return Err(AbiError::OutOfRange {
            ty: format!("uint{bits}"),
            value: v.to_string(),
        });
    }
    Ok(v.to_be_bytes::<32>())
}

fn encode_int(bits: usize, v: I256) -> Result<Word, AbiError> {
    let word = v.to_be_bytes::<32>();
    if !fits_signed(&word, bits) {
        return Err(AbiError::OutOfRange {
            ty: format!("int{bits}"),
            value: v.to_string(),
        });
    }
    Ok(word)
}

/// A two's-complement word fits in `bits` when every byte above the value's
/// width repeats its sign.
pub(crate) fn fits_signed(word: &Word, bits: usize) -> bool {
    let start = 32 - bits / 8;
    let fill = if word[start] & 0x80 != 0 { 0xff } else { 0x00 };
    word[..start].iter().all(|b| *b == fill)
}

fn out_of_range(primitive: &Primitive, value: &impl ToString) -> AbiError {
    AbiError::OutOfRange {
        ty: primitive.to_string(),
        value: value.to_string(),
    }
}
