use alloy_primitives::{Address, B256, U256};

use super::hash::hash_struct;
use crate::abi::{AbiValue, Descriptor, Field, Primitive};
use crate::error::AbiError;

/// The `EIP712Domain` struct. Every member is optional; absent members are
/// left out of both the type string and the encoded data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eip712Domain {
    pub name: Option<String>,
    pub version: Option<String>,
    pub chain_id: Option<U256>,
    pub verifying_contract: Option<Address>,
    pub salt: Option<B256>,
}

impl Eip712Domain {
    /// A domain with no members.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(U256::from(chain_id));
        self
    }

    pub fn with_verifying_contract(mut self, contract: Address) -> Self {
        self.verifying_contract = Some(contract);
        self
    }

    /// Disambiguating salt, the last member in the type string.
    pub fn with_salt(mut self, salt: B256) -> Self {
        self.salt = Some(salt);
        self
    }

    /// `EIP712Domain(...)` listing only the present members.
    pub fn encode_type(&self) -> String {
        let members: Vec<&str> = [
            self.name.as_ref().map(|_| "string name"),
            self.version.as_ref().map(|_| "string version"),
            self.chain_id.as_ref().map(|_| "uint256 chainId"),
            self.verifying_contract.as_ref().map(|_| "address verifyingContract"),
            self.salt.as_ref().map(|_| "bytes32 salt"),
        ]
        .into_iter()
        .flatten()
        .collect();
        format!("EIP712Domain({})", members.join(","))
    }

    /// The domain as a named struct descriptor, for use with the generic engine.
    pub fn descriptor(&self) -> Descriptor {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push(Field::new("name", Descriptor::string()));
        }
        if self.version.is_some() {
            fields.push(Field::new("version", Descriptor::string()));
        }
        if self.chain_id.is_some() {
            let uint256 = Descriptor::Primitive(Primitive::Uint(256));
            fields.push(Field::new("chain_id", uint256).renamed("chainId"));
        }
        if self.verifying_contract.is_some() {
            fields.push(
                Field::new("verifying_contract", Descriptor::address()).renamed("verifyingContract"),
            );
        }
        if self.salt.is_some() {
            fields.push(Field::new("salt", Descriptor::Primitive(Primitive::FixedBytes(32))));
        }
        Descriptor::structure("EIP712Domain", fields)
    }

    /// Member values in the order of [`descriptor`](Self::descriptor).
    pub fn to_value(&self) -> AbiValue {
        let mut items = Vec::new();
        if let Some(name) = &self.name {
            items.push(AbiValue::String(name.clone()));
        }
        if let Some(version) = &self.version {
            items.push(AbiValue::String(version.clone()));
        }
        if let Some(chain_id) = self.chain_id {
            items.push(AbiValue::Uint(chain_id));
        }
        if let Some(contract) = self.verifying_contract {
            items.push(AbiValue::Address(contract));
        }
        if let Some(salt) = self.salt {
            items.push(AbiValue::FixedBytes(salt.to_vec()));
        }
        AbiValue::Tuple(items)
    }

    /// `hashStruct(EIP712Domain, self)`, computed by the same engine as any
    /// other struct.
    pub fn separator(&self) -> Result<B256, AbiError> {
        hash_struct(&self.descriptor(), &self.to_value())
    }
}
