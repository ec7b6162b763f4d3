//! Declarative contract bindings and their per-network handles.
//!
//! A [`ContractBinding`] is a template: it names functions and events and
//! records where the contract is deployed. It carries no network of its own.
//! Calling [`Bind::on`] returns a fresh [`Bound`] handle for one network, so
//! any number of handles built from the same template coexist independently.

use std::collections::BTreeMap;
use std::ops::Deref;

use alloy_primitives::{Address, B256, U256};
use tracing::debug;

use crate::abi::{
    decode, decode_params, encode_params, signature, AbiType, AbiValue, Descriptor, Field, TupleDescriptor,
};
use crate::chains::Network;
use crate::error::{AbiError, EthError};
use crate::keccak::{keccak256, selector};
use crate::rpc::{eth_call, get_logs, Log, LogFilter, Transport};

/// State mutability of a contract function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl Mutability {
    /// Whether the function can be served by `eth_call` alone.
    pub fn is_read_only(self) -> bool {
        matches!(self, Mutability::Pure | Mutability::View)
    }
}

/// Name and shapes of a remote call, independent of any network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallDescriptor<'a> {
    pub method: &'a str,
    pub args: &'a TupleDescriptor,
    pub returns: &'a TupleDescriptor,
}

/// One contract function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionBinding {
    name: String,
    inputs: TupleDescriptor,
    outputs: TupleDescriptor,
    mutability: Mutability,
    signature: String,
    selector: [u8; 4],
}

impl FunctionBinding {
    /// Builds a function from its input and output shapes.
    ///
    /// An anonymous tuple is taken as the argument list itself; any other
    /// descriptor (including a named struct) is a single argument.
    pub fn new(name: impl Into<String>, inputs: Descriptor, outputs: Descriptor, mutability: Mutability) -> Self {
        let name = name.into();
        let inputs = into_param_list(inputs);
        let outputs = into_param_list(outputs);
        let signature = signature(&name, &Descriptor::Tuple(inputs.clone()));
        let selector = selector(&signature);
        Self {
            name,
            inputs,
            outputs,
            mutability,
            signature,
            selector,
        }
    }

    /// Builds a function from `(name, type)` pairs such as `("to", "address")`.
    pub fn from_types(
        name: impl Into<String>,
        inputs: &[(&str, &str)],
        outputs: &[(&str, &str)],
        mutability: Mutability,
    ) -> Result<Self, AbiError> {
        Ok(Self::new(
            name,
            Descriptor::tuple(parse_fields(inputs)?),
            Descriptor::tuple(parse_fields(outputs)?),
            mutability,
        ))
    }

    /// Builds a function whose argument list and return list are Rust types.
    pub fn typed<I: AbiType, O: AbiType>(name: impl Into<String>, mutability: Mutability) -> Result<Self, AbiError> {
        Ok(Self::new(name, I::descriptor()?, O::descriptor()?, mutability))
    }

    /// Function name without the argument list.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument list as an anonymous tuple.
    pub fn inputs(&self) -> &TupleDescriptor {
        &self.inputs
    }

    /// Return values as an anonymous tuple.
    pub fn outputs(&self) -> &TupleDescriptor {
        &self.outputs
    }

    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    /// `name(t1,t2,...)`
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// First four bytes of `keccak256(signature)`.
    pub fn selector(&self) -> [u8; 4] {
        self.selector
    }

    /// Borrowed view of the name, arguments and returns.
    pub fn call_descriptor(&self) -> CallDescriptor<'_> {
        CallDescriptor {
            method: &self.name,
            args: &self.inputs,
            returns: &self.outputs,
        }
    }

    /// `selector || encode(inputs, args)`
    pub fn encode_call(&self, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        let mut data = self.selector.to_vec();
        data.extend(encode_params(&self.inputs, args)?);
        Ok(data)
    }

    /// Decodes calldata produced by [`encode_call`](Self::encode_call).
    pub fn decode_call(&self, calldata: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        match calldata.split_first_chunk::<4>() {
            Some((sel, body)) if *sel == self.selector => decode_params(&self.inputs, body),
            _ => Err(AbiError::InvalidData(format!(
                "calldata does not start with the {} selector",
                self.signature
            ))),
        }
    }

    /// Decodes the return data of an `eth_call` to this function.
    ///
    /// Return data comes from a remote node, so it goes through the strict
    /// decoder: anything a conforming encoder could not have produced is
    /// [`AbiError::InvalidData`].
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        decode_params(&self.outputs, data)
    }

    /// Decodes return data into a Rust type. A single return value decodes
    /// into `T` directly; several decode into a tuple type.
    pub fn decode_output_as<T: AbiType>(&self, data: &[u8]) -> Result<T, AbiError> {
        let mut values = self.decode_output(data)?;
        if values.len() == 1 {
            if let Some(value) = values.pop() {
                return T::from_value(value);
            }
        }
        T::from_value(AbiValue::Tuple(values))
    }
}

/// One contract event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBinding {
    name: String,
    args: TupleDescriptor,
    indexed: Vec<bool>,
    signature: String,
    topic0: B256,
}

impl EventBinding {
    /// Solidity allows at most three indexed arguments on a non-anonymous event.
    pub const MAX_INDEXED: usize = 3;

    /// Builds an event from its argument record and per-argument indexed flags.
    pub fn new(name: impl Into<String>, args: Descriptor, indexed: Vec<bool>) -> Result<Self, AbiError> {
        let name = name.into();
        let args = into_param_list(args);
        if indexed.len() != args.len() {
            return Err(AbiError::WrongArity {
                expected: args.len(),
                found: indexed.len(),
            });
        }
        if indexed.iter().filter(|&&i| i).count() > Self::MAX_INDEXED {
            return Err(AbiError::UnsupportedType(format!(
                "event {name} has more than {} indexed arguments",
                Self::MAX_INDEXED
            )));
        }
        let signature = signature(&name, &Descriptor::Tuple(args.clone()));
        let topic0 = keccak256(&signature);
        Ok(Self {
            name,
            args,
            indexed,
            signature,
            topic0,
        })
    }

    /// Builds an event from `(name, type, indexed)` triples.
    pub fn from_types(name: impl Into<String>, args: &[(&str, &str, bool)]) -> Result<Self, AbiError> {
        let fields = args
            .iter()
            .map(|(n, t, _)| Ok(Field::new(*n, Descriptor::parse(t)?)))
            .collect::<Result<Vec<_>, AbiError>>()?;
        let indexed = args.iter().map(|(_, _, i)| *i).collect();
        Self::new(name, Descriptor::tuple(fields), indexed)
    }

    /// Builds an event whose arguments are the fields of a declared record.
    pub fn from_record<T: AbiType>(name: impl Into<String>, indexed: Vec<bool>) -> Result<Self, AbiError> {
        let record = T::descriptor()?;
        match record {
            Descriptor::Tuple(args) => Self::new(name, Descriptor::tuple(args.fields().to_vec()), indexed),
            other => Err(AbiError::UnsupportedType(format!(
                "event arguments must be a record, got {}",
                crate::abi::canonical_type(&other)
            ))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All arguments in declaration order, indexed or not.
    pub fn args(&self) -> &TupleDescriptor {
        &self.args
    }

    /// One flag per argument, `true` where it is carried in a topic.
    pub fn indexed(&self) -> &[bool] {
        &self.indexed
    }

    /// `Name(t1,t2,...)`
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// `keccak256(signature)`, the first topic of every matching log.
    pub fn topic0(&self) -> B256 {
        self.topic0
    }

    /// Filter for this event emitted by `address`.
    pub fn filter(&self, address: Address) -> LogFilter {
        LogFilter {
            topics: vec![Some(self.topic0)],
            ..LogFilter::new(address)
        }
    }

    /// Decodes a log into argument values in declaration order.
    ///
    /// Indexed value-type arguments are read from their topic. Indexed
    /// dynamic, array and tuple arguments only survive as the keccak hash
    /// of their encoding and come back as a 32-byte `FixedBytes`.
    pub fn decode_log(&self, log: &Log) -> Result<Vec<AbiValue>, AbiError> {
        let expected_topics = 1 + self.indexed.iter().filter(|&&i| i).count();
        if log.topics.len() != expected_topics {
            return Err(AbiError::InvalidData(format!(
                "{} expects {expected_topics} topics, log has {}",
                self.signature,
                log.topics.len()
            )));
        }
        if log.topics[0] != self.topic0 {
            return Err(AbiError::InvalidData(format!("log is not a {} event", self.signature)));
        }

        let body_fields: Vec<Field> = self
            .args
            .fields()
            .iter()
            .zip(&self.indexed)
            .filter(|(_, &indexed)| !indexed)
            .map(|(f, _)| f.clone())
            .collect();
        let mut body = decode_params(&TupleDescriptor::anonymous(body_fields), &log.data)?.into_iter();
        let mut topics = log.topics[1..].iter();

        let mut values = Vec::with_capacity(self.args.len());
        for (field, &indexed) in self.args.fields().iter().zip(&self.indexed) {
            let value = if indexed {
                let topic = topics
                    .next()
                    .ok_or_else(|| AbiError::InvalidData("missing topic".into()))?;
                let descriptor = field.descriptor();
                match descriptor {
                    Descriptor::Primitive(p) if !p.is_dynamic() => decode(descriptor, topic.as_slice())?,
                    _ => AbiValue::FixedBytes(topic.to_vec()),
                }
            } else {
                body.next()
                    .ok_or_else(|| AbiError::InvalidData("missing data member".into()))?
            };
            values.push(value);
        }
        Ok(values)
    }
}

/// An unsigned transaction targeting one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub chain_id: u64,
    pub to: Address,
    pub data: Vec<u8>,
    pub value: U256,
}

impl TransactionRequest {
    /// Attaches native value in wei.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// A contract template: functions, events and known deployments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractBinding {
    name: String,
    functions: BTreeMap<String, FunctionBinding>,
    events: BTreeMap<String, EventBinding>,
    deployments: BTreeMap<Network, Address>,
}

impl ContractBinding {
    /// Empty template with no functions, events or deployments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a function. A later function with the same name replaces the earlier one.
    pub fn function(mut self, function: FunctionBinding) -> Self {
        self.functions.insert(function.name.clone(), function);
        self
    }

    pub fn event(mut self, event: EventBinding) -> Self {
        self.events.insert(event.name.clone(), event);
        self
    }

    /// Records the address of this contract on `network`.
    pub fn deployed(mut self, network: Network, address: Address) -> Self {
        self.deployments.insert(network, address);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks a function up by name.
    ///
    /// # Errors
    ///
    /// [`EthError::UnknownFunction`] naming `Contract.function` when absent.
    pub fn get_function(&self, name: &str) -> Result<&FunctionBinding, EthError> {
        self.functions
            .get(name)
            .ok_or_else(|| EthError::UnknownFunction(format!("{}.{name}", self.name)))
    }

    /// Looks an event up by name; [`EthError::UnknownEvent`] when absent.
    pub fn get_event(&self, name: &str) -> Result<&EventBinding, EthError> {
        self.events
            .get(name)
            .ok_or_else(|| EthError::UnknownEvent(format!("{}.{name}", self.name)))
    }

    /// Functions sorted by name.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionBinding> {
        self.functions.values()
    }

    pub fn events(&self) -> impl Iterator<Item = &EventBinding> {
        self.events.values()
    }

    /// Address on `network`, if deployed there.
    pub fn deployment(&self, network: Network) -> Option<Address> {
        self.deployments.get(&network).copied()
    }

    /// Networks this contract is known to be deployed on.
    pub fn networks(&self) -> impl Iterator<Item = Network> + '_ {
        self.deployments.keys().copied()
    }
}

/// Pairs a template with a network.
pub trait Bind {
    /// Returns a new handle targeting `network`. The template is untouched.
    fn on(&self, network: Network) -> Bound<'_, Self> {
        Bound {
            template: self,
            network,
        }
    }
}

impl Bind for ContractBinding {}
impl Bind for FunctionBinding {}
impl Bind for EventBinding {}

/// A template paired with one network.
#[derive(Debug)]
pub struct Bound<'a, B: ?Sized> {
    template: &'a B,
    network: Network,
}

impl<B: ?Sized> Clone for Bound<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized> Copy for Bound<'_, B> {}

impl<'a, B: ?Sized> Bound<'a, B> {
    /// Network this handle targets.
    pub fn network(&self) -> Network {
        self.network
    }

    pub fn chain_id(&self) -> u64 {
        self.network.chain_id()
    }

    /// The shared template. Every handle made from it points at the same value.
    pub fn template(&self) -> &'a B {
        self.template
    }
}

impl<B: ?Sized> Deref for Bound<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.template
    }
}

impl Bound<'_, ContractBinding> {
    /// Deployment address on this handle's network.
    pub fn address(&self) -> Result<Address, EthError> {
        self.template
            .deployment(self.network)
            .ok_or_else(|| EthError::NotDeployed {
                contract: self.template.name.clone(),
                network: self.network,
            })
    }

    /// Read-only call through `eth_call`, returning the decoded outputs.
    pub async fn call(
        &self,
        transport: &dyn Transport,
        function: &str,
        args: &[AbiValue],
    ) -> Result<Vec<AbiValue>, EthError> {
        let address = self.address()?;
        let function = self.template.get_function(function)?;
        function.on(self.network).call(transport, address, args).await
    }

    /// Unsigned transaction invoking `function` on this network's deployment.
    pub fn transaction(&self, function: &str, args: &[AbiValue]) -> Result<TransactionRequest, EthError> {
        let to = self.address()?;
        let data = self.template.get_function(function)?.encode_call(args)?;
        Ok(TransactionRequest {
            chain_id: self.chain_id(),
            to,
            data,
            value: U256::ZERO,
        })
    }

    /// `eth_getLogs` filter for `event` at this deployment, matching on `topic0` only.
    pub fn event_filter(&self, event: &str) -> Result<LogFilter, EthError> {
        Ok(self.template.get_event(event)?.filter(self.address()?))
    }

    /// Fetches and decodes every `event` log of this deployment.
    pub async fn logs(&self, transport: &dyn Transport, event: &str) -> Result<Vec<Vec<AbiValue>>, EthError> {
        let address = self.address()?;
        let event = self.template.get_event(event)?;
        event.on(self.network).logs(transport, address).await
    }
}

impl Bound<'_, FunctionBinding> {
    pub async fn call(
        &self,
        transport: &dyn Transport,
        to: Address,
        args: &[AbiValue],
    ) -> Result<Vec<AbiValue>, EthError> {
        let data = self.template.encode_call(args)?;
        debug!(
            network = %self.network,
            function = self.template.signature(),
            %to,
            "calling contract function"
        );
        let output = eth_call(transport, self.network, to, &data).await?;
        Ok(self.template.decode_output(&output)?)
    }
}

impl Bound<'_, EventBinding> {
    pub async fn logs(&self, transport: &dyn Transport, address: Address) -> Result<Vec<Vec<AbiValue>>, EthError> {
        debug!(
            network = %self.network,
            event = self.template.signature(),
            %address,
            "fetching event logs"
        );
        let logs = get_logs(transport, self.network, &self.template.filter(address)).await?;
        logs.iter()
            .map(|log| self.template.decode_log(log).map_err(EthError::from))
            .collect()
    }
}

fn into_param_list(descriptor: Descriptor) -> TupleDescriptor {
    match descriptor {
        Descriptor::Tuple(t) if t.name().is_none() => t,
        other => TupleDescriptor::anonymous(vec![Field::new("0", other)]),
    }
}

fn parse_fields(params: &[(&str, &str)]) -> Result<Vec<Field>, AbiError> {
    params
        .iter()
        .map(|(name, ty)| Ok(Field::new(*name, Descriptor::parse(ty)?)))
        .collect()
}
