use std::fmt;
use std::str::FromStr;

use crate::error::AbiError;

/// The closed set of scalar ABI types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Unsigned integer of the given bit width.
    Uint(usize),
    /// Two's-complement signed integer of the given bit width.
    Int(usize),
    Bool,
    Address,
    /// `bytesN`, `N` in `1..=32`.
    FixedBytes(usize),
    Bytes,
    String,
}

impl Primitive {
    /// `uint<bits>`, rejecting widths that are not a multiple of 8 in `8..=256`.
    pub fn uint(bits: usize) -> Result<Self, AbiError> {
        check_int_width(bits)?;
        Ok(Primitive::Uint(bits))
    }

    /// `int<bits>`, rejecting widths that are not a multiple of 8 in `8..=256`.
    pub fn int(bits: usize) -> Result<Self, AbiError> {
        check_int_width(bits)?;
        Ok(Primitive::Int(bits))
    }

    /// `bytes<size>` with `size` in `1..=32`.
    pub fn fixed_bytes(size: usize) -> Result<Self, AbiError> {
        if !(1..=32).contains(&size) {
            return Err(AbiError::UnsupportedType(format!("bytes{size}")));
        }
        Ok(Primitive::FixedBytes(size))
    }

    /// Whether values of this kind are encoded in the tail of a tuple.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Primitive::Bytes | Primitive::String)
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Primitive::Int(_))
    }

    /// Number of significant payload bytes inside the 32-byte slot, or `None`
    /// for the dynamic kinds.
    pub fn byte_width(&self) -> Option<usize> {
        match self {
            Primitive::Uint(bits) | Primitive::Int(bits) => Some(bits / 8),
            Primitive::Bool => Some(1),
            Primitive::Address => Some(20),
            Primitive::FixedBytes(size) => Some(*size),
            Primitive::Bytes | Primitive::String => None,
        }
    }
}

fn check_int_width(bits: usize) -> Result<(), AbiError> {
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(AbiError::InvalidIntWidth(bits));
    }
    Ok(())
}

fn parse_width(digits: &str, whole: &str) -> Result<usize, AbiError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) || digits.starts_with('0') {
        return Err(AbiError::UnsupportedType(whole.to_string()));
    }
    digits
        .parse()
        .map_err(|_| AbiError::UnsupportedType(whole.to_string()))
}

impl FromStr for Primitive {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" => return Ok(Primitive::Bool),
            "address" => return Ok(Primitive::Address),
            "bytes" => return Ok(Primitive::Bytes),
            "string" => return Ok(Primitive::String),
            "uint" => return Ok(Primitive::Uint(256)),
            "int" => return Ok(Primitive::Int(256)),
            _ => {}
        }

        if let Some(digits) = s.strip_prefix("uint") {
            return Primitive::uint(parse_width(digits, s)?);
        }
        if let Some(digits) = s.strip_prefix("int") {
            return Primitive::int(parse_width(digits, s)?);
        }
        if let Some(digits) = s.strip_prefix("bytes") {
            return Primitive::fixed_bytes(parse_width(digits, s)?);
        }

        Err(AbiError::UnsupportedType(s.to_string()))
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Uint(bits) => write!(f, "uint{bits}"),
            Primitive::Int(bits) => write!(f, "int{bits}"),
            Primitive::Bool => f.write_str("bool"),
            Primitive::Address => f.write_str("address"),
            Primitive::FixedBytes(size) => write!(f, "bytes{size}"),
            Primitive::Bytes => f.write_str("bytes"),
            Primitive::String => f.write_str("string"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_every_legal_int_width() {
        for bits in (8..=256).step_by(8) {
            assert_eq!(format!("uint{bits}").parse::<Primitive>().unwrap(), Primitive::Uint(bits));
            assert_eq!(format!("int{bits}").parse::<Primitive>().unwrap(), Primitive::Int(bits));
        }
    }

    #[test]
    fn parse_aliases() {
        assert_eq!("uint".parse::<Primitive>().unwrap(), Primitive::Uint(256));
        assert_eq!("int".parse::<Primitive>().unwrap(), Primitive::Int(256));
    }

    #[test]
    fn rejects_bad_int_widths() {
        assert_eq!("uint7".parse::<Primitive>(), Err(AbiError::InvalidIntWidth(7)));
        assert_eq!("int264".parse::<Primitive>(), Err(AbiError::InvalidIntWidth(264)));
        assert_eq!(Primitive::uint(0), Err(AbiError::InvalidIntWidth(0)));
    }

    #[test]
    fn rejects_bad_fixed_bytes() {
        assert!(matches!("bytes0".parse::<Primitive>(), Err(AbiError::UnsupportedType(_))));
        assert!(matches!("bytes33".parse::<Primitive>(), Err(AbiError::UnsupportedType(_))));
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(matches!("fixed128x18".parse::<Primitive>(), Err(AbiError::UnsupportedType(_))));
        assert!(matches!("uint08".parse::<Primitive>(), Err(AbiError::UnsupportedType(_))));
        assert!(matches!("Person".parse::<Primitive>(), Err(AbiError::UnsupportedType(_))));
    }

    #[test]
    fn display_round_trips() {
        for name in ["uint8", "int256", "bool", "address", "bytes1", "bytes32", "bytes", "string"] {
            assert_eq!(name.parse::<Primitive>().unwrap().to_string(), name);
        }
    }

    #[test]
    fn dynamic_and_widths() {
        assert!(Primitive::Bytes.is_dynamic());
        assert!(Primitive::String.is_dynamic());
        assert!(!Primitive::FixedBytes(32).is_dynamic());
        assert_eq!(Primitive::Uint(24).byte_width(), Some(3));
        assert_eq!(Primitive::Address.byte_width(), Some(20));
        assert_eq!(Primitive::String.byte_width(), None);
        assert!(Primitive::Int(8).is_signed());
        assert!(!Primitive::Uint(8).is_signed());
    }
}
