use super::descriptor::Descriptor;

/// Canonical ABI type string for a descriptor.
///
/// Struct names are not emitted: named and anonymous tuples both render as
/// `(t1,t2,...)`.
pub fn canonical_type(descriptor: &Descriptor) -> String {
    let mut out = String::new();
    write_canonical(descriptor, &mut out);
    out
}

/// `name(t1,t2,...)` where the argument list is the canonical type of
/// `inputs`. A non-tuple descriptor is treated as a single argument.
pub fn signature(name: &str, inputs: &Descriptor) -> String {
    let mut out = String::from(name);
    match inputs {
        Descriptor::Tuple(_) => write_canonical(inputs, &mut out),
        other => {
            out.push('(');
            write_canonical(other, &mut out);
            out.push(')');
        }
    }
    out
}

fn write_canonical(descriptor: &Descriptor, out: &mut String) {
    match descriptor {
        Descriptor::Primitive(p) => out.push_str(&p.to_string()),
        Descriptor::FixedArray(inner, len) => {
            write_canonical(inner, out);
            out.push('[');
            out.push_str(&len.to_string());
            out.push(']');
        }
        Descriptor::DynArray(inner) => {
            write_canonical(inner, out);
            out.push_str("[]");
        }
        Descriptor::Tuple(t) => {
            out.push('(');
            for (i, field) in t.fields().iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(field.descriptor(), out);
            }
            out.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::Field;

    fn a() -> Descriptor {
        Descriptor::structure(
            "A",
            vec![
                Field::new("a", Descriptor::bool()),
                Field::new("b", Descriptor::uint(256).unwrap()),
            ],
        )
    }

    #[test]
    fn struct_renders_as_tuple() {
        assert_eq!(canonical_type(&a()), "(bool,uint256)");
    }

    #[test]
    fn nested_arrays_of_structs() {
        let b = Descriptor::structure(
            "B",
            vec![
                Field::new("a", Descriptor::array(a())),
                Field::new("b", a()),
                Field::new("c", Descriptor::array(Descriptor::array(a()))),
            ],
        );
        assert_eq!(
            canonical_type(&b),
            "((bool,uint256)[],(bool,uint256),(bool,uint256)[][])"
        );
    }

    #[test]
    fn fixed_arrays_render_length() {
        let d = Descriptor::fixed_array(Descriptor::array(Descriptor::address()), 4);
        assert_eq!(canonical_type(&d), "address[][4]");
    }

    #[test]
    fn parse_and_render_agree() {
        for s in ["uint8", "(bool,(string,bytes32)[3])[]", "()", "int24[2][]"] {
            assert_eq!(canonical_type(&Descriptor::parse(s).unwrap()), s);
        }
    }

    #[test]
    fn function_signatures() {
        let args = Descriptor::tuple_of(vec![Descriptor::address(), Descriptor::uint(256).unwrap()]);
        assert_eq!(signature("transfer", &args), "transfer(address,uint256)");
        assert_eq!(signature("totalSupply", &Descriptor::tuple(vec![])), "totalSupply()");
        assert_eq!(signature("f", &Descriptor::bool()), "f(bool)");
    }
}
