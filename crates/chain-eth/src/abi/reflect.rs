//! Mapping from Rust types to descriptors and values.
//!
//! [`AbiType`] is implemented for the scalar types, byte containers,
//! sequences and tuples; records get it through [`abi_struct!`](crate::abi_struct).

use alloy_primitives::{Address, Bytes, FixedBytes, I256, U256};

use super::canonical::canonical_type;
use super::decoder::decode;
use super::descriptor::{Descriptor, Field};
use super::encoder::encode;
use super::primitive::Primitive;
use super::value::{mismatch, AbiValue};
use crate::error::AbiError;

/// A Rust type with a fixed ABI shape.
pub trait AbiType: Sized {
    /// Descriptor of the type. Fails only when a declared override is not a
    /// valid type string.
    fn descriptor() -> Result<Descriptor, AbiError>;

    fn to_value(&self) -> AbiValue;

    fn from_value(value: AbiValue) -> Result<Self, AbiError>;

    fn abi_encode(&self) -> Result<Vec<u8>, AbiError> {
        encode(&Self::descriptor()?, &self.to_value())
    }

    fn abi_decode(data: &[u8]) -> Result<Self, AbiError> {
        Self::from_value(decode(&Self::descriptor()?, data)?)
    }

    /// Canonical ABI type string, e.g. `(bool,uint256)`.
    fn tuple_type() -> Result<String, AbiError> {
        Ok(canonical_type(&Self::descriptor()?))
    }
}

/// Per-field overrides accepted by `abi_struct!` through `#[abi(...)]`.
#[doc(hidden)]
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldOverrides {
    pub rename: Option<&'static str>,
    pub ty: Option<&'static str>,
}

#[doc(hidden)]
pub fn field<T: AbiType>(name: &str, overrides: FieldOverrides) -> Result<Field, AbiError> {
    let descriptor = match overrides.ty {
        Some(ty) => Descriptor::parse(ty)?,
        None => T::descriptor()?,
    };
    let field = Field::new(name, descriptor);
    Ok(match overrides.rename {
        Some(display) => field.renamed(display),
        None => field,
    })
}

#[doc(hidden)]
pub fn next_member<T: AbiType>(items: &mut impl Iterator<Item = AbiValue>) -> Result<T, AbiError> {
    let item = items
        .next()
        .ok_or_else(|| AbiError::InvalidData("tuple has fewer members than declared".into()))?;
    T::from_value(item)
}

/// Declares a struct and implements [`AbiType`](crate::abi::AbiType) for it.
///
/// The struct's name becomes the EIP-712 type name. Fields take an optional
/// `#[abi(rename = "...")]` for their on-chain name and
/// `#[abi(ty = "...")]` to override the inferred ABI type.
///
/// ```
/// use chain_eth::abi_struct;
/// use chain_eth::abi::AbiType;
///
/// abi_struct! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Order {
///         pub maker: alloy_primitives::Address,
///         #[abi(ty = "uint24")]
///         pub fee: u32,
///     }
/// }
///
/// assert_eq!(Order::tuple_type().unwrap(), "(address,uint24)");
/// ```
#[macro_export]
macro_rules! abi_struct {
    (@unit $field:ident) => {
        ()
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[doc = $fdoc:literal])*
                $(#[abi($($key:ident = $val:literal),+ $(,)?)])?
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[doc = $fdoc])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::abi::AbiType for $name {
            fn descriptor() -> ::core::result::Result<$crate::abi::Descriptor, $crate::error::AbiError> {
                let fields = ::std::vec![
                    $(
                        $crate::abi::reflect::field::<$ty>(
                            stringify!($field),
                            $crate::abi::reflect::FieldOverrides {
                                $($($key: ::core::option::Option::Some($val),)+)?
                                ..::core::default::Default::default()
                            },
                        )?,
                    )*
                ];
                ::core::result::Result::Ok($crate::abi::Descriptor::structure(stringify!($name), fields))
            }

            fn to_value(&self) -> $crate::abi::AbiValue {
                $crate::abi::AbiValue::Tuple(::std::vec![
                    $($crate::abi::AbiType::to_value(&self.$field),)*
                ])
            }

            #[allow(unused_mut)]
            fn from_value(
                value: $crate::abi::AbiValue,
            ) -> ::core::result::Result<Self, $crate::error::AbiError> {
                let arity = <[()]>::len(&[$($crate::abi_struct!(@unit $field)),*]);
                let mut items = value.into_tuple(arity)?.into_iter();
                ::core::result::Result::Ok(Self {
                    $($field: $crate::abi::reflect::next_member::<$ty>(&mut items)?,)*
                })
            }
        }
    };
}

fn out_of_range(ty: &str, value: impl ToString) -> AbiError {
    AbiError::OutOfRange {
        ty: ty.to_string(),
        value: value.to_string(),
    }
}

macro_rules! impl_uint {
    ($($t:ty => $bits:literal),* $(,)?) => {$(
        impl AbiType for $t {
            fn descriptor() -> Result<Descriptor, AbiError> {
                Ok(Descriptor::Primitive(Primitive::Uint($bits)))
            }

            fn to_value(&self) -> AbiValue {
                AbiValue::Uint(U256::from(*self))
            }

            fn from_value(value: AbiValue) -> Result<Self, AbiError> {
                match value {
                    AbiValue::Uint(v) => {
                        <$t>::try_from(v).map_err(|_| out_of_range(stringify!($t), v))
                    }
                    other => Err(mismatch(concat!("uint", $bits), &other)),
                }
            }
        }
    )*};
}

macro_rules! impl_int {
    ($($t:ty => $bits:literal),* $(,)?) => {$(
        impl AbiType for $t {
            fn descriptor() -> Result<Descriptor, AbiError> {
                Ok(Descriptor::Primitive(Primitive::Int($bits)))
            }

            fn to_value(&self) -> AbiValue {
                AbiValue::Int(sign_extend(i128::from(*self)))
            }

            fn from_value(value: AbiValue) -> Result<Self, AbiError> {
                match value {
                    AbiValue::Int(v) => {
                        <$t>::try_from(v).map_err(|_| out_of_range(stringify!($t), v))
                    }
                    other => Err(mismatch(concat!("int", $bits), &other)),
                }
            }
        }
    )*};
}

impl_uint!(u8 => 8, u16 => 16, u32 => 32, u64 => 64, u128 => 128);
impl_int!(i8 => 8, i16 => 16, i32 => 32, i64 => 64, i128 => 128);

fn sign_extend(v: i128) -> I256 {
    let fill = if v < 0 { 0xff } else { 0x00 };
    let mut word = [fill; 32];
    word[16..].copy_from_slice(&v.to_be_bytes());
    I256::from_be_bytes(word)
}

impl AbiType for U256 {
    fn descriptor() -> Result<Descriptor, AbiError> {
        Ok(Descriptor::Primitive(Primitive::Uint(256)))
    }

    fn to_value(&self) -> AbiValue {
        AbiValue::Uint(*self)
    }

    fn from_value(value: AbiValue) -> Result<Self, AbiError> {
        match value {
            AbiValue::Uint(v) => Ok(v),
            other => Err(mismatch("uint256", &other)),
        }
    }
}

impl AbiType for I256 {
    fn descriptor() -> Result<Descriptor, AbiError> {
        Ok(Descriptor::Primitive(Primitive::Int(256)))
    }

    fn to_value(&self) -> AbiValue {
        AbiValue::Int(*self)
    }

    fn from_value(value: AbiValue) -> Result<Self, AbiError> {
        match value {
            AbiValue::Int(v) => Ok(v),
            other => Err(mismatch("int256", &other)),
        }
    }
}

impl AbiType for bool {
    fn descriptor() -> Result<Descriptor, AbiError> {
        Ok(Descriptor::bool())
    }

    fn to_value(&self) -> AbiValue {
        AbiValue::Bool(*self)
    }

    fn from_value(value: AbiValue) -> Result<Self, AbiError> {
        match value {
            AbiValue::Bool(v) => Ok(v),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl AbiType for Address {
    fn descriptor() -> Result<Descriptor, AbiError> {
        Ok(Descriptor::address())
    }

    fn to_value(&self) -> AbiValue {
        AbiValue::Address(*self)
    }

    fn from_value(value: AbiValue) -> Result<Self, AbiError> {
        match value {
            AbiValue::Address(v) => Ok(v),
            other => Err(mismatch("address", &other)),
        }
    }
}

impl AbiType for String {
    fn descriptor() -> Result<Descriptor, AbiError> {
        Ok(Descriptor::string())
    }

    fn to_value(&self) -> AbiValue {
        AbiValue::String(self.clone())
    }

    fn from_value(value: AbiValue) -> Result<Self, AbiError> {
        match value {
            AbiValue::String(v) => Ok(v),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl AbiType for Bytes {
    fn descriptor() -> Result<Descriptor, AbiError> {
        Ok(Descriptor::bytes())
    }

    fn to_value(&self) -> AbiValue {
        AbiValue::Bytes(self.to_vec())
    }

    fn from_value(value: AbiValue) -> Result<Self, AbiError> {
        match value {
            AbiValue::Bytes(v) => Ok(Bytes::from(v)),
            other => Err(mismatch("bytes", &other)),
        }
    }
}

impl<const N: usize> AbiType for FixedBytes<N> {
    fn descriptor() -> Result<Descriptor, AbiError> {
        Descriptor::fixed_bytes(N)
    }

    fn to_value(&self) -> AbiValue {
        AbiValue::FixedBytes(self.to_vec())
    }

    fn from_value(value: AbiValue) -> Result<Self, AbiError> {
        match value {
            AbiValue::FixedBytes(v) if v.len() == N => Ok(FixedBytes::from_slice(&v)),
            AbiValue::FixedBytes(v) => Err(AbiError::TypeMismatch {
                expected: format!("bytes{N}"),
                found: format!("{} bytes", v.len()),
            }),
            other => Err(mismatch(format!("bytes{N}"), &other)),
        }
    }
}

impl<T: AbiType> AbiType for Vec<T> {
    fn descriptor() -> Result<Descriptor, AbiError> {
        Ok(Descriptor::array(T::descriptor()?))
    }

    fn to_value(&self) -> AbiValue {
        AbiValue::Array(self.iter().map(AbiType::to_value).collect())
    }

    fn from_value(value: AbiValue) -> Result<Self, AbiError> {
        value.into_array()?.into_iter().map(T::from_value).collect()
    }
}

impl<T: AbiType, const N: usize> AbiType for [T; N] {
    fn descriptor() -> Result<Descriptor, AbiError> {
        Ok(Descriptor::fixed_array(T::descriptor()?, N))
    }

    fn to_value(&self) -> AbiValue {
        AbiValue::Array(self.iter().map(AbiType::to_value).collect())
    }

    fn from_value(value: AbiValue) -> Result<Self, AbiError> {
        let items = value
            .into_array()?
            .into_iter()
            .map(T::from_value)
            .collect::<Result<Vec<T>, _>>()?;
        <[T; N]>::try_from(items).map_err(|items| AbiError::WrongArity {
            expected: N,
            found: items.len(),
        })
    }
}

impl AbiType for () {
    fn descriptor() -> Result<Descriptor, AbiError> {
        Ok(Descriptor::tuple(Vec::new()))
    }

    fn to_value(&self) -> AbiValue {
        AbiValue::Tuple(Vec::new())
    }

    fn from_value(value: AbiValue) -> Result<Self, AbiError> {
        value.into_tuple(0).map(|_| ())
    }
}

macro_rules! impl_tuple {
    ($len:literal; $($t:ident $idx:tt),+) => {
        impl<$($t: AbiType),+> AbiType for ($($t,)+) {
            fn descriptor() -> Result<Descriptor, AbiError> {
                Ok(Descriptor::tuple_of(vec![$($t::descriptor()?),+]))
            }

            fn to_value(&self) -> AbiValue {
                AbiValue::Tuple(vec![$(self.$idx.to_value()),+])
            }

            fn from_value(value: AbiValue) -> Result<Self, AbiError> {
                let mut items = value.into_tuple($len)?.into_iter();
                Ok(($(next_member::<$t>(&mut items)?,)+))
            }
        }
    };
}

impl_tuple!(1; A 0);
impl_tuple!(2; A 0, B 1);
impl_tuple!(3; A 0, B 1, C 2);
impl_tuple!(4; A 0, B 1, C 2, D 3);
impl_tuple!(5; A 0, B 1, C 2, D 3, E 4);
impl_tuple!(6; A 0, B 1, C 2, D 3, E 4, F 5);

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;

    use super::*;

    crate::abi_struct! {
        #[derive(Debug, Clone, PartialEq)]
        struct A {
            a: bool,
            b: U256,
        }
    }

    crate::abi_struct! {
        #[derive(Debug, Clone, PartialEq)]
        struct B {
            a: Vec<A>,
            b: A,
            c: Vec<Vec<A>>,
        }
    }

    crate::abi_struct! {
        /// Exercises the field attributes.
        #[derive(Debug, Clone, PartialEq)]
        pub struct Pool {
            /// Pool token.
            pub token: Address,
            #[abi(ty = "uint24")]
            pub fee: u32,
            #[abi(rename = "tickSpacing", ty = "int24")]
            pub tick_spacing: i32,
            pub salt: B256,
        }
    }

    #[test]
    fn struct_tuple_types() {
        assert_eq!(A::tuple_type().unwrap(), "(bool,uint256)");
        assert_eq!(
            B::tuple_type().unwrap(),
            "((bool,uint256)[],(bool,uint256),(bool,uint256)[][])"
        );
    }

    #[test]
    fn struct_descriptor_is_named() {
        let d = B::descriptor().unwrap();
        let t = d.as_struct().unwrap();
        assert_eq!(t.name(), Some("B"));
        assert_eq!(t.fields()[1].descriptor().as_struct().unwrap().name(), Some("A"));
    }

    #[test]
    fn struct_encodes_like_its_fields() {
        let a = A {
            a: true,
            b: U256::from(255u64),
        };
        let encoded = a.abi_encode().unwrap();
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 1);
        assert_eq!(encoded[63], 0xff);
        assert_eq!(A::abi_decode(&encoded).unwrap(), a);
    }

    #[test]
    fn overrides_apply() {
        let d = Pool::descriptor().unwrap();
        assert_eq!(crate::abi::canonical_type(&d), "(address,uint24,int24,bytes32)");
        let t = d.as_struct().unwrap();
        assert_eq!(t.fields()[2].canonical_name(), "tickSpacing");
        assert_eq!(t.fields()[2].declared_name(), "tick_spacing");
    }

    #[test]
    fn override_width_is_range_checked() {
        let pool = Pool {
            token: Address::ZERO,
            fee: 1 << 24,
            tick_spacing: -60,
            salt: B256::ZERO,
        };
        assert!(matches!(pool.abi_encode(), Err(AbiError::OutOfRange { .. })));

        let pool = Pool { fee: 3000, ..pool };
        let decoded = Pool::abi_decode(&pool.abi_encode().unwrap()).unwrap();
        assert_eq!(decoded, pool);
    }

    #[test]
    fn nested_struct_round_trips() {
        let a = A {
            a: false,
            b: U256::from(7u64),
        };
        let b = B {
            a: vec![a.clone(), a.clone()],
            b: a.clone(),
            c: vec![vec![], vec![a]],
        };
        assert_eq!(B::abi_decode(&b.abi_encode().unwrap()).unwrap(), b);
    }

    #[test]
    fn rust_tuples_are_anonymous() {
        let d = <(bool, String, [u8; 2])>::descriptor().unwrap();
        assert!(d.as_struct().is_none());
        assert_eq!(crate::abi::canonical_type(&d), "(bool,string,uint8[2])");
        assert_eq!(<()>::tuple_type().unwrap(), "()");
    }

    #[test]
    fn small_ints_narrow_with_range_check() {
        assert_eq!(u8::from_value(AbiValue::from(200u64)).unwrap(), 200);
        assert!(matches!(
            u8::from_value(AbiValue::from(300u64)),
            Err(AbiError::OutOfRange { .. })
        ));
        assert_eq!(i16::from_value((-3i16).to_value()).unwrap(), -3);
        assert_eq!((-3i64).to_value(), AbiValue::Int(I256::try_from(-3i64).unwrap()));
    }

    #[test]
    fn fixed_array_length_is_checked() {
        let v = AbiValue::Array(vec![true.into()]);
        assert_eq!(
            <[bool; 2]>::from_value(v),
            Err(AbiError::WrongArity {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn fixed_bytes_descriptor_validates_width() {
        assert_eq!(crate::abi::canonical_type(&B256::descriptor().unwrap()), "bytes32");
        assert!(FixedBytes::<33>::descriptor().is_err());
    }
}
