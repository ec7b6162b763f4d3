//! Strict inverse of [`encoder`](super::encoder).
//!
//! Input that no conforming encoder could have produced is rejected with
//! [`AbiError::InvalidData`]: truncated words, offsets or lengths past the end
//! of the buffer, dirty padding, and non-UTF-8 strings.

use alloy_primitives::{Address, I256, U256};

use super::descriptor::{Descriptor, TupleDescriptor};
use super::encoder::{fits_signed, Word};
use super::primitive::Primitive;
use super::value::AbiValue;
use crate::error::AbiError;

/// Decodes the standalone encoding of a single value.
pub fn decode(descriptor: &Descriptor, data: &[u8]) -> Result<AbiValue, AbiError> {
    decode_standalone(descriptor, data)
}

/// Decodes an argument list encoded as one anonymous tuple.
pub fn decode_params(outputs: &TupleDescriptor, data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    let descriptors: Vec<&Descriptor> = outputs.fields().iter().map(|f| f.descriptor()).collect();
    decode_sequence(&descriptors, data)
}

fn decode_standalone(descriptor: &Descriptor, buf: &[u8]) -> Result<AbiValue, AbiError> {
    match descriptor {
        Descriptor::Primitive(Primitive::Bytes) => Ok(AbiValue::Bytes(read_payload(buf)?.to_vec())),
        Descriptor::Primitive(Primitive::String) => {
            let payload = read_payload(buf)?;
            String::from_utf8(payload.to_vec())
                .map(AbiValue::String)
                .map_err(|_| AbiError::InvalidData("string is not valid utf-8".into()))
        }
        Descriptor::Primitive(p) => decode_word(p, read_word(buf, 0)?),
        Descriptor::FixedArray(inner, len) => {
            check_array_fits(inner, *len, buf.len())?;
            let descriptors = vec![inner.as_ref(); *len];
            decode_sequence(&descriptors, buf).map(AbiValue::Array)
        }
        Descriptor::DynArray(inner) => {
            let len = read_usize(buf, 0)?;
            let body = &buf[32..];
            check_array_fits(inner, len, body.len())?;
            let descriptors = vec![inner.as_ref(); len];
            decode_sequence(&descriptors, body).map(AbiValue::Array)
        }
        Descriptor::Tuple(t) => {
            let descriptors: Vec<&Descriptor> = t.fields().iter().map(|f| f.descriptor()).collect();
            decode_sequence(&descriptors, buf).map(AbiValue::Tuple)
        }
    }
}

/// Rejects element counts the input cannot back before anything is allocated
/// for them. Every element occupies at least its head slot, and elements
/// with an empty head would let a single length word claim any count.
fn check_array_fits(inner: &Descriptor, len: usize, available: usize) -> Result<(), AbiError> {
    let element = inner.head_size()?;
    if element == 0 && len > 0 {
        return Err(AbiError::InvalidData(format!(
            "array of {len} zero-sized elements"
        )));
    }
    let needed = len
        .checked_mul(element)
        .ok_or_else(|| AbiError::InvalidData(format!("array length {len} overflows")))?;
    if needed > available {
        return Err(AbiError::InvalidData(format!(
            "array length {len} exceeds remaining {available} bytes"
        )));
    }
    Ok(())
}

fn decode_sequence(descriptors: &[&Descriptor], buf: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    let mut values = Vec::with_capacity(descriptors.len());
    let mut pos = 0usize;

    for descriptor in descriptors {
        if descriptor.is_dynamic() {
            let offset = read_usize(buf, pos)?;
            if offset > buf.len() {
                return Err(AbiError::InvalidData(format!(
                    "offset {offset} points past the end of {} bytes",
                    buf.len()
                )));
            }
            values.push(decode_standalone(descriptor, &buf[offset..])?);
            pos += 32;
        } else {
            let size = descriptor.head_size()?;
            let end = pos
                .checked_add(size)
                .ok_or_else(|| truncated(usize::MAX, buf.len()))?;
            let slot = buf.get(pos..end).ok_or_else(|| truncated(end, buf.len()))?;
            values.push(decode_standalone(descriptor, slot)?);
            pos += size;
        }
    }

    Ok(values)
}

fn truncated(needed: usize, available: usize) -> AbiError {
    AbiError::InvalidData(format!("truncated input: need {needed} bytes, have {available}"))
}

fn read_word(buf: &[u8], pos: usize) -> Result<&Word, AbiError> {
    buf.get(pos..pos + 32)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| truncated(pos + 32, buf.len()))
}

/// Reads a length or offset word.
fn read_usize(buf: &[u8], pos: usize) -> Result<usize, AbiError> {
    let value = U256::from_be_bytes(*read_word(buf, pos)?);
    usize::try_from(value).map_err(|_| AbiError::InvalidData(format!("length or offset {value} is too large")))
}

/// `length || payload || zero padding`
fn read_payload(buf: &[u8]) -> Result<&[u8], AbiError> {
    let len = read_usize(buf, 0)?;
    let end = len
        .div_ceil(32)
        .checked_mul(32)
        .and_then(|padded| padded.checked_add(32))
        .ok_or_else(|| AbiError::InvalidData(format!("payload length {len} overflows")))?;
    let region = buf.get(32..end).ok_or_else(|| truncated(end, buf.len()))?;
    let (payload, padding) = region.split_at(len);
    if padding.iter().any(|b| *b != 0) {
        return Err(AbiError::InvalidData("non-zero padding after payload".into()));
    }
    Ok(payload)
}

fn dirty(primitive: &Primitive) -> AbiError {
    AbiError::InvalidData(format!("non-canonical {primitive} word"))
}

pub(crate) fn decode_word(primitive: &Primitive, word: &Word) -> Result<AbiValue, AbiError> {
    match primitive {
        Primitive::Uint(bits) => {
            let v = U256::from_be_bytes(*word);
            if v.bit_len() > *bits {
                return Err(dirty(primitive));
            }
            Ok(AbiValue::Uint(v))
        }
        Primitive::Int(bits) => {
            if !fits_signed(word, *bits) {
                return Err(dirty(primitive));
            }
            Ok(AbiValue::Int(I256::from_be_bytes(*word)))
        }
        Primitive::Bool => match (word[..31].iter().all(|b| *b == 0), word[31]) {
            (true, 0) => Ok(AbiValue::Bool(false)),
            (true, 1) => Ok(AbiValue::Bool(true)),
            _ => Err(dirty(primitive)),
        },
        Primitive::Address => {
            if word[..12].iter().any(|b| *b != 0) {
                return Err(dirty(primitive));
            }
            Ok(AbiValue::Address(Address::from_slice(&word[12..])))
        }
        Primitive::FixedBytes(size) => {
            if word[*size..].iter().any(|b| *b != 0) {
                return Err(dirty(primitive));
            }
            Ok(AbiValue::FixedBytes(word[..*size].to_vec()))
        }
        Primitive::Bytes | Primitive::String => Err(AbiError::UnsupportedType(format!(
            "{primitive} does not fit in a single word"
        ))),
    }
}
