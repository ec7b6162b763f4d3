use std::str::FromStr;

use super::primitive::Primitive;
use crate::error::AbiError;

/// Structural description of a value's ABI shape.
///
/// Descriptors are immutable once built and can be shared freely between
/// threads; every codec entry point takes them by reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Descriptor {
    Primitive(Primitive),
    FixedArray(Box<Descriptor>, usize),
    DynArray(Box<Descriptor>),
    Tuple(TupleDescriptor),
}

/// An ordered list of fields, optionally carrying a struct type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleDescriptor {
    name: Option<String>,
    fields: Vec<Field>,
}

/// A single tuple member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: String,
    rename: Option<String>,
    descriptor: Descriptor,
}

impl Field {
    pub fn new(name: impl Into<String>, descriptor: Descriptor) -> Self {
        Self {
            name: name.into(),
            rename: None,
            descriptor,
        }
    }

    /// Shadows the declared name with an on-chain display name.
    pub fn renamed(mut self, display: impl Into<String>) -> Self {
        self.rename = Some(display.into());
        self
    }

    /// Name as declared by the user.
    pub fn declared_name(&self) -> &str {
        &self.name
    }

    /// Name used by EIP-712: the display name if present, else the declared one.
    pub fn canonical_name(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }
}

impl TupleDescriptor {
    /// A tuple with no type name, such as an argument list.
    pub fn anonymous(fields: Vec<Field>) -> Self {
        Self { name: None, fields }
    }

    /// A struct. The name is its EIP-712 type name.
    pub fn named(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: Some(name.into()),
            fields,
        }
    }

    /// Struct type name, `None` for anonymous tuples.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// A tuple is dynamic as soon as one member is.
    pub fn is_dynamic(&self) -> bool {
        self.fields.iter().any(|f| f.descriptor.is_dynamic())
    }

    /// Looks a field up by its canonical name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.canonical_name() == name)
    }
}

impl Descriptor {
    /// `uint<bits>`.
    ///
    /// # Errors
    ///
    /// [`AbiError::UnsupportedType`] unless `bits` is a multiple of 8 in `8..=256`.
    pub fn uint(bits: usize) -> Result<Self, AbiError> {
        Primitive::uint(bits).map(Descriptor::Primitive)
    }

    /// `int<bits>`, with the same width rule as [`uint`](Self::uint).
    pub fn int(bits: usize) -> Result<Self, AbiError> {
        Primitive::int(bits).map(Descriptor::Primitive)
    }

    /// `bytes<size>` for `size` in `1..=32`.
    pub fn fixed_bytes(size: usize) -> Result<Self, AbiError> {
        Primitive::fixed_bytes(size).map(Descriptor::Primitive)
    }

    pub fn bool() -> Self {
        Descriptor::Primitive(Primitive::Bool)
    }

    pub fn address() -> Self {
        Descriptor::Primitive(Primitive::Address)
    }

    /// Dynamic `bytes`.
    pub fn bytes() -> Self {
        Descriptor::Primitive(Primitive::Bytes)
    }

    pub fn string() -> Self {
        Descriptor::Primitive(Primitive::String)
    }

    /// `inner[]`
    pub fn array(inner: Descriptor) -> Self {
        Descriptor::DynArray(Box::new(inner))
    }

    /// `inner[len]`
    pub fn fixed_array(inner: Descriptor, len: usize) -> Self {
        Descriptor::FixedArray(Box::new(inner), len)
    }

    /// Anonymous tuple.
    pub fn tuple(fields: Vec<Field>) -> Self {
        Descriptor::Tuple(TupleDescriptor::anonymous(fields))
    }

    /// Anonymous tuple whose fields are named by position.
    pub fn tuple_of(members: Vec<Descriptor>) -> Self {
        let fields = members
            .into_iter()
            .enumerate()
            .map(|(i, d)| Field::new(i.to_string(), d))
            .collect();
        Descriptor::tuple(fields)
    }

    /// Named tuple (a struct).
    pub fn structure(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Descriptor::Tuple(TupleDescriptor::named(name, fields))
    }

    /// Whether the encoding of this shape lives in the tail of an enclosing tuple.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Descriptor::Primitive(p) => p.is_dynamic(),
            Descriptor::FixedArray(inner, _) => inner.is_dynamic(),
            Descriptor::DynArray(_) => true,
            Descriptor::Tuple(t) => t.is_dynamic(),
        }
    }

    /// Bytes occupied in the head of an enclosing tuple.
    ///
    /// Dynamic shapes take a single offset word. A static fixed array whose
    /// head would not fit in a `usize` is [`AbiError::UnsupportedType`].
    pub fn head_size(&self) -> Result<usize, AbiError> {
        if self.is_dynamic() {
            return Ok(32);
        }
        match self {
            Descriptor::Primitive(_) | Descriptor::DynArray(_) => Ok(32),
            Descriptor::FixedArray(inner, len) => inner
                .head_size()?
                .checked_mul(*len)
                .ok_or_else(|| AbiError::UnsupportedType(format!("array of {len} elements is too large"))),
            Descriptor::Tuple(t) => t.fields.iter().try_fold(0usize, |acc, f| {
                acc.checked_add(f.descriptor.head_size()?)
                    .ok_or_else(|| AbiError::UnsupportedType("tuple head is too large".into()))
            }),
        }
    }

    /// The tuple descriptor, named or not.
    pub fn as_tuple(&self) -> Option<&TupleDescriptor> {
        match self {
            Descriptor::Tuple(t) => Some(t),
            _ => None,
        }
    }

    /// The tuple descriptor if this is a named tuple.
    pub fn as_struct(&self) -> Option<&TupleDescriptor> {
        self.as_tuple().filter(|t| t.name.is_some())
    }

    /// Parses a canonical type string such as `(bool,uint256)[2][]`.
    ///
    /// Tuple members parsed this way are anonymous and named by position.
    pub fn parse(s: &str) -> Result<Self, AbiError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AbiError::UnsupportedType(String::new()));
        }

        if let Some(prefix) = s.strip_suffix(']') {
            let open = prefix
                .rfind('[')
                .ok_or_else(|| AbiError::UnsupportedType(s.to_string()))?;
            let inner = Descriptor::parse(&prefix[..open])?;
            let len = &prefix[open + 1..];
            if len.is_empty() {
                return Ok(Descriptor::array(inner));
            }
            let len: usize = len
                .parse()
                .map_err(|_| AbiError::UnsupportedType(s.to_string()))?;
            return Ok(Descriptor::fixed_array(inner, len));
        }

        if let Some(body) = s.strip_prefix('(') {
            let body = body
                .strip_suffix(')')
                .ok_or_else(|| AbiError::UnsupportedType(s.to_string()))?;
            let members = split_top_level(body, s)?
                .into_iter()
                .map(Descriptor::parse)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Descriptor::tuple_of(members));
        }

        s.parse::<Primitive>().map(Descriptor::Primitive)
    }
}

impl FromStr for Descriptor {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Descriptor::parse(s)
    }
}

/// Splits a tuple body on commas that are not nested inside parentheses.
fn split_top_level<'a>(body: &'a str, whole: &str) -> Result<Vec<&'a str>, AbiError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| AbiError::UnsupportedType(whole.to_string()))?;
            }
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(AbiError::UnsupportedType(whole.to_string()));
    }
    parts.push(&body[start..]);
    Ok(parts)
}
