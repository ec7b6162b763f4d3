use std::collections::BTreeMap;

use crate::abi::{canonical_type, Descriptor, TupleDescriptor};
use crate::error::AbiError;

/// EIP-712 `encodeType`: the primary struct followed by every struct it
/// references, sorted by name.
///
/// ```text
/// Mail(Person from,Person to,string contents)Person(string name,address wallet)
/// ```
pub fn encode_type(descriptor: &Descriptor) -> Result<String, AbiError> {
    let root = as_named(descriptor)?;
    let root_name = root.name().unwrap_or_default();

    let mut structs = BTreeMap::new();
    structs.insert(root_name, root);
    collect_structs(root, &mut structs)?;

    let mut out = String::new();
    write_struct(root_name, root, &mut out);
    for (name, t) in &structs {
        if *name != root_name {
            write_struct(name, t, &mut out);
        }
    }
    Ok(out)
}

/// Names of the structs referenced from `descriptor`, excluding itself, sorted.
pub fn dependencies(descriptor: &Descriptor) -> Result<Vec<String>, AbiError> {
    let root = as_named(descriptor)?;
    let mut structs = BTreeMap::new();
    structs.insert(root.name().unwrap_or_default(), root);
    collect_structs(root, &mut structs)?;
    Ok(structs
        .keys()
        .filter(|name| Some(**name) != root.name())
        .map(|name| name.to_string())
        .collect())
}

pub(crate) fn as_named(descriptor: &Descriptor) -> Result<&TupleDescriptor, AbiError> {
    descriptor.as_struct().ok_or_else(|| {
        AbiError::UnsupportedType(format!(
            "{} is not a named struct",
            canonical_type(descriptor)
        ))
    })
}

fn collect_structs<'a>(
    tuple: &'a TupleDescriptor,
    structs: &mut BTreeMap<&'a str, &'a TupleDescriptor>,
) -> Result<(), AbiError> {
    for field in tuple.fields() {
        collect_from(field.descriptor(), structs)?;
    }
    Ok(())
}

fn collect_from<'a>(
    descriptor: &'a Descriptor,
    structs: &mut BTreeMap<&'a str, &'a TupleDescriptor>,
) -> Result<(), AbiError> {
    match descriptor {
        Descriptor::Primitive(_) => Ok(()),
        Descriptor::FixedArray(inner, _) | Descriptor::DynArray(inner) => collect_from(inner, structs),
        Descriptor::Tuple(t) => match t.name() {
            None => collect_structs(t, structs),
            Some(name) => match structs.get(name) {
                Some(seen) if *seen == t => Ok(()),
                Some(_) => Err(AbiError::TypeNameCollision(name.to_string())),
                None => {
                    structs.insert(name, t);
                    collect_structs(t, structs)
                }
            },
        },
    }
}

fn write_struct(name: &str, tuple: &TupleDescriptor, out: &mut String) {
    out.push_str(name);
    out.push('(');
    for (i, field) in tuple.fields().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_member_type(field.descriptor(), out);
        out.push(' ');
        out.push_str(field.canonical_name());
    }
    out.push(')');
}

fn write_member_type(descriptor: &Descriptor, out: &mut String) {
    match descriptor {
        Descriptor::Primitive(p) => out.push_str(&p.to_string()),
        Descriptor::FixedArray(inner, len) => {
            write_member_type(inner, out);
            out.push_str(&format!("[{len}]"));
        }
        Descriptor::DynArray(inner) => {
            write_member_type(inner, out);
            out.push_str("[]");
        }
        Descriptor::Tuple(t) => match t.name() {
            Some(name) => out.push_str(name),
            None => {
                out.push('(');
                for (i, field) in t.fields().iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_member_type(field.descriptor(), out);
                }
                out.push(')');
            }
        },
    }
}
