//! Contract ABI: type descriptors, canonical type strings and the head/tail codec.

pub mod canonical;
pub mod decoder;
pub mod descriptor;
pub mod encoder;
pub mod primitive;
pub mod reflect;
pub mod value;

pub use canonical::{canonical_type, signature};
pub use decoder::{decode, decode_params};
pub use descriptor::{Descriptor, Field, TupleDescriptor};
pub use encoder::{encode, encode_function_call, encode_params};
pub use primitive::Primitive;
pub use reflect::AbiType;
pub use value::AbiValue;
