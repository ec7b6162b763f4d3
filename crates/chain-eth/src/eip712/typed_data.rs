//! `eth_signTypedData_v4` JSON payloads.

use std::collections::BTreeMap;

use alloy_primitives::{B256, I256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::Eip712Domain;
use super::hash::{hash_struct, signing_hash};
use crate::abi::{AbiValue, Descriptor, Field, Primitive};
use crate::address::parse_address;
use crate::error::AbiError;

const DOMAIN_TYPE: &str = "EIP712Domain";

/// One `{ "name": ..., "type": ... }` entry of a struct declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDataField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// An `eth_signTypedData_v4` payload.
///
/// `types` maps each struct name to its member list. `domain` and `message`
/// stay as raw JSON until they are converted against a resolved type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    pub types: BTreeMap<String, Vec<TypedDataField>>,
    pub primary_type: String,
    #[serde(default)]
    pub domain: Value,
    #[serde(default)]
    pub message: Value,
}

impl TypedData {
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the named-struct descriptor for a declared type.
    ///
    /// Each declared struct is resolved once and reused at every reference.
    /// Payloads whose expansion exceeds [`MAX_RESOLVED_NODES`] descriptor
    /// nodes are rejected, so a chain of types that each reference the next
    /// several times cannot grow without bound.
    pub fn resolve(&self, name: &str) -> Result<Descriptor, AbiError> {
        let mut resolver = Resolver {
            types: &self.types,
            path: Vec::new(),
            done: BTreeMap::new(),
        };
        resolver.resolve_struct(name).map(|(descriptor, _)| descriptor)
    }

    /// Descriptor of the `EIP712Domain` entry, or one inferred from the
    /// members present in `domain` when `types` does not declare it.
    pub fn domain_descriptor(&self) -> Result<Descriptor, AbiError> {
        if self.types.contains_key(DOMAIN_TYPE) {
            return self.resolve(DOMAIN_TYPE);
        }
        Ok(self.eip712_domain()?.descriptor())
    }

    /// The `domain` object as a typed [`Eip712Domain`].
    pub fn eip712_domain(&self) -> Result<Eip712Domain, AbiError> {
        Eip712Domain::from_json(&self.domain)
    }

    /// `hashStruct(EIP712Domain, domain)`
    pub fn domain_separator(&self) -> Result<B256, AbiError> {
        let descriptor = self.domain_descriptor()?;
        let value = json_to_value(&descriptor, &self.domain)?;
        hash_struct(&descriptor, &value)
    }

    /// The message converted against the primary type.
    pub fn message_value(&self) -> Result<(Descriptor, AbiValue), AbiError> {
        let descriptor = self.resolve(&self.primary_type)?;
        let value = json_to_value(&descriptor, &self.message)?;
        Ok((descriptor, value))
    }

    /// `hashStruct(primaryType, message)`
    pub fn hash_struct(&self) -> Result<B256, AbiError> {
        let (descriptor, value) = self.message_value()?;
        hash_struct(&descriptor, &value)
    }

    /// The digest a wallet signs for this payload.
    pub fn signing_hash(&self) -> Result<B256, AbiError> {
        Ok(signing_hash(&self.domain_separator()?, &self.hash_struct()?))
    }
}

/// Upper bound on the size of a resolved type tree.
pub const MAX_RESOLVED_NODES: usize = 4096;

/// Resolution state: the chain of structs being expanded and the ones
/// already finished, each with its node count.
struct Resolver<'a> {
    types: &'a BTreeMap<String, Vec<TypedDataField>>,
    path: Vec<&'a str>,
    done: BTreeMap<&'a str, (Descriptor, usize)>,
}

impl<'a> Resolver<'a> {
    fn resolve_struct(&mut self, name: &'a str) -> Result<(Descriptor, usize), AbiError> {
        if let Some(resolved) = self.done.get(name) {
            return Ok(resolved.clone());
        }
        if self.path.contains(&name) {
            return Err(AbiError::CyclicType(name.to_string()));
        }
        let types = self.types;
        let declared = types
            .get(name)
            .ok_or_else(|| AbiError::UnknownCustomType(name.to_string()))?;

        self.path.push(name);
        let mut fields = Vec::with_capacity(declared.len());
        let mut nodes = 1usize;
        for member in declared {
            let (descriptor, size) = self.resolve_type(&member.ty)?;
            nodes += size;
            if nodes > MAX_RESOLVED_NODES {
                return Err(AbiError::UnsupportedType(format!(
                    "{name} expands to more than {MAX_RESOLVED_NODES} members"
                )));
            }
            fields.push(Field::new(member.name.clone(), descriptor));
        }
        self.path.pop();

        let resolved = (Descriptor::structure(name, fields), nodes);
        self.done.insert(name, resolved.clone());
        Ok(resolved)
    }

    fn resolve_type(&mut self, ty: &'a str) -> Result<(Descriptor, usize), AbiError> {
        if let Some(prefix) = ty.strip_suffix(']') {
            let open = prefix
                .rfind('[')
                .ok_or_else(|| AbiError::UnsupportedType(ty.to_string()))?;
            let (inner, size) = self.resolve_type(&prefix[..open])?;
            let len = &prefix[open + 1..];
            if len.is_empty() {
                return Ok((Descriptor::array(inner), size + 1));
            }
            let len = len
                .parse()
                .map_err(|_| AbiError::UnsupportedType(ty.to_string()))?;
            return Ok((Descriptor::fixed_array(inner, len), size + 1));
        }

        let types = self.types;
        if let Some((name, _)) = types.get_key_value(ty) {
            return self.resolve_struct(name.as_str());
        }

        match ty.parse::<Primitive>() {
            Ok(p) => Ok((Descriptor::Primitive(p), 1)),
            Err(AbiError::UnsupportedType(_)) => Err(AbiError::UnknownCustomType(ty.to_string())),
            Err(e) => Err(e),
        }
    }
}

impl Eip712Domain {
    /// Reads a domain from its JSON object form; unknown members are ignored.
    pub fn from_json(json: &Value) -> Result<Self, AbiError> {
        let obj = json.as_object().ok_or_else(|| AbiError::TypeMismatch {
            expected: "domain object".into(),
            found: json_kind(json).into(),
        })?;

        let mut domain = Eip712Domain::new();
        if let Some(v) = obj.get("name") {
            domain.name = Some(json_string(v)?);
        }
        if let Some(v) = obj.get("version") {
            domain.version = Some(json_string(v)?);
        }
        if let Some(v) = obj.get("chainId") {
            domain.chain_id = Some(json_uint(v)?);
        }
        if let Some(v) = obj.get("verifyingContract") {
            domain.verifying_contract = Some(parse_address(&json_string(v)?)?);
        }
        if let Some(v) = obj.get("salt") {
            let bytes = json_hex(v)?;
            if bytes.len() != 32 {
                return Err(AbiError::TypeMismatch {
                    expected: "bytes32".into(),
                    found: format!("{} bytes", bytes.len()),
                });
            }
            domain.salt = Some(B256::from_slice(&bytes));
        }
        Ok(domain)
    }
}

/// Converts a JSON value into an [`AbiValue`] guided by `descriptor`.
///
/// Integers may be JSON numbers or decimal / `0x` hex strings; byte strings
/// are `0x` hex; struct members are looked up by canonical name.
pub fn json_to_value(descriptor: &Descriptor, json: &Value) -> Result<AbiValue, AbiError> {
    match descriptor {
        Descriptor::Primitive(p) => json_to_primitive(p, json),
        Descriptor::FixedArray(inner, _) | Descriptor::DynArray(inner) => {
            let items = json.as_array().ok_or_else(|| AbiError::TypeMismatch {
                expected: "array".into(),
                found: json_kind(json).into(),
            })?;
            items
                .iter()
                .map(|item| json_to_value(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(AbiValue::Array)
        }
        Descriptor::Tuple(t) => match json {
            Value::Object(obj) => t
                .fields()
                .iter()
                .map(|field| {
                    let member = obj
                        .get(field.canonical_name())
                        .ok_or_else(|| AbiError::MissingField(field.canonical_name().to_string()))?;
                    json_to_value(field.descriptor(), member)
                })
                .collect::<Result<Vec<_>, _>>()
                .map(AbiValue::Tuple),
            Value::Array(items) if items.len() == t.len() => t
                .fields()
                .iter()
                .zip(items)
                .map(|(field, item)| json_to_value(field.descriptor(), item))
                .collect::<Result<Vec<_>, _>>()
                .map(AbiValue::Tuple),
            Value::Array(items) => Err(AbiError::WrongArity {
                expected: t.len(),
                found: items.len(),
            }),
            other => Err(AbiError::TypeMismatch {
                expected: "object".into(),
                found: json_kind(other).into(),
            }),
        },
    }
}

fn json_to_primitive(primitive: &Primitive, json: &Value) -> Result<AbiValue, AbiError> {
    match primitive {
        Primitive::Uint(_) => json_uint(json).map(AbiValue::Uint),
        Primitive::Int(_) => json_int(json).map(AbiValue::Int),
        Primitive::Bool => json.as_bool().map(AbiValue::Bool).ok_or_else(|| AbiError::TypeMismatch {
            expected: "bool".into(),
            found: json_kind(json).into(),
        }),
        Primitive::Address => Ok(AbiValue::Address(parse_address(&json_string(json)?)?)),
        Primitive::FixedBytes(_) => json_hex(json).map(AbiValue::FixedBytes),
        Primitive::Bytes => json_hex(json).map(AbiValue::Bytes),
        Primitive::String => json_string(json).map(AbiValue::String),
    }
}

fn json_kind(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn json_string(json: &Value) -> Result<String, AbiError> {
    json.as_str().map(str::to_string).ok_or_else(|| AbiError::TypeMismatch {
        expected: "string".into(),
        found: json_kind(json).into(),
    })
}

fn json_hex(json: &Value) -> Result<Vec<u8>, AbiError> {
    let s = json_string(json)?;
    let body = s
        .strip_prefix("0x")
        .ok_or_else(|| AbiError::InvalidData(format!("expected 0x-prefixed hex, got {s}")))?;
    hex::decode(body).map_err(|e| AbiError::InvalidData(format!("bad hex {s}: {e}")))
}

fn json_uint(json: &Value) -> Result<U256, AbiError> {
    let bad = || AbiError::TypeMismatch {
        expected: "unsigned integer".into(),
        found: json.to_string(),
    };
    match json {
        Value::Number(n) => n.as_u64().map(U256::from).ok_or_else(bad),
        Value::String(s) => {
            let parsed = match s.strip_prefix("0x") {
                Some(hex) if !hex.is_empty() => U256::from_str_radix(hex, 16),
                None if !s.is_empty() => U256::from_str_radix(s, 10),
                _ => return Err(bad()),
            };
            parsed.map_err(|_| bad())
        }
        _ => Err(bad()),
    }
}

fn json_int(json: &Value) -> Result<I256, AbiError> {
    let bad = || AbiError::TypeMismatch {
        expected: "signed integer".into(),
        found: json.to_string(),
    };
    match json {
        Value::Number(n) => n
            .as_i64()
            .and_then(|v| I256::try_from(v).ok())
            .ok_or_else(bad),
        Value::String(s) => {
            let unsigned = s.trim_start_matches(['-', '+']);
            if unsigned.starts_with("0x") {
                I256::from_hex_str(s).map_err(|_| bad())
            } else {
                I256::from_dec_str(s).map_err(|_| bad())
            }
        }
        _ => Err(bad()),
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256};
    use serde_json::json;

    use super::*;
    use crate::eip712::encode_type;

    const ETHER_MAIL: &str = r#"{
        "types": {
            "EIP712Domain": [
                { "name": "name", "type": "string" },
                { "name": "version", "type": "string" },
                { "name": "chainId", "type": "uint256" },
                { "name": "verifyingContract", "type": "address" }
            ],
            "Person": [
                { "name": "name", "type": "string" },
                { "name": "wallet", "type": "address" }
            ],
            "Mail": [
                { "name": "from", "type": "Person" },
                { "name": "to", "type": "Person" },
                { "name": "contents", "type": "string" }
            ]
        },
        "primaryType": "Mail",
        "domain": {
            "name": "Ether Mail",
            "version": "1",
            "chainId": 1,
            "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
        },
        "message": {
            "from": { "name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826" },
            "to": { "name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB" },
            "contents": "Hello, Bob!"
        }
    }"#;

    fn ether_mail() -> TypedData {
        TypedData::from_json(ETHER_MAIL).unwrap()
    }

    #[test]
    fn ether_mail_hashes() {
        let data = ether_mail();
        assert_eq!(
            data.domain_separator().unwrap(),
            b256!("f2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f")
        );
        assert_eq!(
            data.hash_struct().unwrap(),
            b256!("c52c0ee5d84264471806290a3f2c4cecfc5490626bf912d01f240d7a274b371e")
        );
        assert_eq!(
            data.signing_hash().unwrap(),
            b256!("be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2")
        );
    }

    #[test]
    fn resolved_type_string() {
        let d = ether_mail().resolve("Mail").unwrap();
        assert_eq!(
            encode_type(&d).unwrap(),
            "Mail(Person from,Person to,string contents)Person(string name,address wallet)"
        );
    }

    #[test]
    fn domain_without_declaration_is_inferred() {
        let mut data = ether_mail();
        data.types.remove("EIP712Domain");
        assert_eq!(
            data.domain_separator().unwrap(),
            b256!("f2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f")
        );
    }

    #[test]
    fn typed_domain_from_json() {
        let domain = ether_mail().eip712_domain().unwrap();
        assert_eq!(domain.name.as_deref(), Some("Ether Mail"));
        assert_eq!(domain.chain_id, Some(U256::from(1u64)));
        assert_eq!(
            domain.verifying_contract,
            Some(address!("CcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"))
        );
    }

    #[test]
    fn unknown_type_is_reported() {
        let mut data = ether_mail();
        data.types.remove("Person");
        assert_eq!(
            data.resolve("Mail"),
            Err(AbiError::UnknownCustomType("Person".into()))
        );
    }

    fn diamond(levels: usize) -> TypedData {
        let mut types = serde_json::Map::new();
        for level in 0..levels {
            let next = format!("T{}", level + 1);
            types.insert(
                format!("T{level}"),
                json!([
                    { "name": "left", "type": next },
                    { "name": "right", "type": next }
                ]),
            );
        }
        types.insert(format!("T{levels}"), json!([{ "name": "leaf", "type": "uint8" }]));
        serde_json::from_value(json!({
            "types": types,
            "primaryType": "T0",
            "domain": {},
            "message": {}
        }))
        .unwrap()
    }

    #[test]
    fn shared_structs_resolve_once() {
        let d = diamond(3).resolve("T0").unwrap();
        assert_eq!(
            encode_type(&d).unwrap(),
            "T0(T1 left,T1 right)T1(T2 left,T2 right)T2(T3 left,T3 right)T3(uint8 leaf)"
        );
    }

    #[test]
    fn exponential_expansion_is_rejected() {
        assert!(matches!(
            diamond(64).resolve("T0"),
            Err(AbiError::UnsupportedType(_))
        ));
    }

    #[test]
    fn cycles_are_reported() {
        let data: TypedData = serde_json::from_value(json!({
            "types": {
                "Node": [{ "name": "next", "type": "Node[]" }]
            },
            "primaryType": "Node",
            "domain": {},
            "message": {}
        }))
        .unwrap();
        assert_eq!(data.resolve("Node"), Err(AbiError::CyclicType("Node".into())));
    }

    #[test]
    fn missing_member_is_reported() {
        let mut data = ether_mail();
        data.message["to"].as_object_mut().unwrap().remove("wallet");
        assert_eq!(data.hash_struct(), Err(AbiError::MissingField("wallet".into())));
    }

    #[test]
    fn integers_accept_numbers_and_strings() {
        let uint = Descriptor::Primitive(Primitive::Uint(256));
        for json in [json!(255), json!("255"), json!("0xff")] {
            assert_eq!(json_to_value(&uint, &json).unwrap(), AbiValue::from(255u64));
        }
        let int = Descriptor::Primitive(Primitive::Int(256));
        for json in [json!(-2), json!("-2"), json!("-0x2")] {
            assert_eq!(
                json_to_value(&int, &json).unwrap(),
                AbiValue::Int(I256::try_from(-2i64).unwrap())
            );
        }
        assert!(json_to_value(&uint, &json!("")).is_err());
        assert!(json_to_value(&uint, &json!(-1)).is_err());
    }

    #[test]
    fn bytes_are_hex() {
        let d = Descriptor::bytes();
        assert_eq!(
            json_to_value(&d, &json!("0xcafe")).unwrap(),
            AbiValue::Bytes(vec![0xca, 0xfe])
        );
        assert!(matches!(
            json_to_value(&d, &json!("cafe")),
            Err(AbiError::InvalidData(_))
        ));
    }

    #[test]
    fn arrays_of_structs_resolve() {
        let data: TypedData = serde_json::from_value(json!({
            "types": {
                "Group": [
                    { "name": "members", "type": "Person[]" },
                    { "name": "scores", "type": "uint8[2]" }
                ],
                "Person": [{ "name": "name", "type": "string" }]
            },
            "primaryType": "Group",
            "domain": { "name": "g" },
            "message": {
                "members": [{ "name": "a" }, { "name": "b" }],
                "scores": [1, 2]
            }
        }))
        .unwrap();
        let (d, v) = data.message_value().unwrap();
        assert_eq!(
            encode_type(&d).unwrap(),
            "Group(Person[] members,uint8[2] scores)Person(string name)"
        );
        assert_eq!(v.as_slice().unwrap()[0].as_slice().unwrap().len(), 2);
        assert!(data.signing_hash().is_ok());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let out = serde_json::to_value(ether_mail()).unwrap();
        assert_eq!(out["primaryType"], "Mail");
        assert_eq!(out["types"]["Person"][1]["type"], "address");
    }
}
