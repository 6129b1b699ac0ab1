//! Parsers for the `attrdump` flags whose values pack several fields

use classattr::jvm::class_file::{ConstValue, InnerClass, MethodParameter};
use classattr::jvm::{InnerClassAccessFlags, ParameterAccessFlags};

/// Parse access flags, either decimal or `0x`-prefixed hexadecimal
fn parse_flag_bits(flags: &str) -> Result<u16, String> {
    let parsed = match flags.strip_prefix("0x") {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => flags.parse::<u16>(),
    };
    parsed.map_err(|err| format!("invalid access flags '{}': {}", flags, err))
}

/// Parse `INNER:OUTER:NAME:FLAGS` (an empty `NAME` is an anonymous class)
pub fn parse_inner_class(value: &str) -> Result<InnerClass, String> {
    let parts: Vec<&str> = value.split(':').collect();
    let (inner_class, outer_class, inner_name, flags) = match parts.as_slice() {
        [inner, outer, name, flags] => (*inner, *outer, *name, *flags),
        _ => return Err(format!("expected INNER:OUTER:NAME:FLAGS, got '{}'", value)),
    };
    if inner_class.is_empty() || outer_class.is_empty() {
        return Err(format!("inner and outer class are required in '{}'", value));
    }
    let bits = parse_flag_bits(flags)?;
    let access_flags = InnerClassAccessFlags::from_bits(bits)
        .ok_or_else(|| format!("unknown inner class access flags {:#06x}", bits))?;

    Ok(InnerClass {
        inner_class: inner_class.to_owned(),
        outer_class: outer_class.to_owned(),
        inner_name: if inner_name.is_empty() {
            None
        } else {
            Some(inner_name.to_owned())
        },
        access_flags,
    })
}

/// Parse `KIND:VALUE`, where the value of a `string` may itself contain `:`
pub fn parse_constant(value: &str) -> Result<ConstValue, String> {
    let (kind, literal) = value
        .split_once(':')
        .ok_or_else(|| format!("expected KIND:VALUE, got '{}'", value))?;
    let invalid = |err: &dyn std::fmt::Display| format!("invalid {} '{}': {}", kind, literal, err);

    let constant = match kind {
        "int" => ConstValue::Int(literal.parse().map_err(|e| invalid(&e))?),
        "short" => ConstValue::Short(literal.parse().map_err(|e| invalid(&e))?),
        "byte" => ConstValue::Byte(literal.parse().map_err(|e| invalid(&e))?),
        "long" => ConstValue::Long(literal.parse().map_err(|e| invalid(&e))?),
        "float" => ConstValue::Float(literal.parse().map_err(|e| invalid(&e))?),
        "double" => ConstValue::Double(literal.parse().map_err(|e| invalid(&e))?),
        "boolean" => ConstValue::Boolean(literal.parse().map_err(|e| invalid(&e))?),
        "char" => {
            let mut units = literal.encode_utf16();
            match (units.next(), units.next()) {
                (Some(unit), None) => ConstValue::Char(unit),
                _ => return Err(invalid(&"expected a single UTF-16 code unit")),
            }
        }
        "string" => ConstValue::String(literal.to_owned()),
        _ => return Err(format!("unknown constant kind '{}'", kind)),
    };
    Ok(constant)
}

/// Parse `NAME[:FLAGS]` (a `_` name is an unnamed parameter)
pub fn parse_parameter(value: &str) -> Result<MethodParameter, String> {
    let (name, flags) = match value.split_once(':') {
        Some((name, flags)) => (name, parse_flag_bits(flags)?),
        None => (value, 0),
    };
    let access_flags = ParameterAccessFlags::from_bits(flags)
        .ok_or_else(|| format!("unknown parameter access flags {:#06x}", flags))?;

    Ok(MethodParameter {
        name: match name {
            "_" | "" => None,
            name => Some(name.to_owned()),
        },
        access_flags,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn inner_classes() {
        let inner = parse_inner_class("a/B$C:a/B:C:0x0009").unwrap();
        assert_eq!(inner.inner_class, "a/B$C");
        assert_eq!(inner.outer_class, "a/B");
        assert_eq!(inner.inner_name.as_deref(), Some("C"));
        assert_eq!(
            inner.access_flags,
            InnerClassAccessFlags::PUBLIC | InnerClassAccessFlags::STATIC
        );

        let anonymous = parse_inner_class("a/B$1:a/B::4096").unwrap();
        assert_eq!(anonymous.inner_name, None);
        assert_eq!(anonymous.access_flags, InnerClassAccessFlags::SYNTHETIC);

        assert!(parse_inner_class("a/B$C:a/B:C").is_err());
        assert!(parse_inner_class("a/B$C::C:0").is_err());
        assert!(parse_inner_class("a/B$C:a/B:C:0x0020").is_err());
    }

    #[test]
    fn constants() {
        assert_eq!(parse_constant("int:-12"), Ok(ConstValue::Int(-12)));
        assert_eq!(parse_constant("boolean:true"), Ok(ConstValue::Boolean(true)));
        assert_eq!(parse_constant("char:x"), Ok(ConstValue::Char(0x78)));
        assert_eq!(parse_constant("long:1099511627776"), Ok(ConstValue::Long(1 << 40)));
        assert_eq!(parse_constant("double:1.5"), Ok(ConstValue::Double(1.5)));
        assert_eq!(
            parse_constant("string:a:b"),
            Ok(ConstValue::String(String::from("a:b")))
        );

        assert!(parse_constant("byte:200").is_err());
        assert!(parse_constant("char:\u{1F600}").is_err());
        assert!(parse_constant("decimal:1").is_err());
        assert!(parse_constant("42").is_err());
    }

    #[test]
    fn parameters() {
        let named = parse_parameter("count").unwrap();
        assert_eq!(named.name.as_deref(), Some("count"));
        assert!(named.access_flags.is_empty());

        let unnamed = parse_parameter("_:0x8010").unwrap();
        assert_eq!(unnamed.name, None);
        assert_eq!(
            unnamed.access_flags,
            ParameterAccessFlags::FINAL | ParameterAccessFlags::MANDATED
        );

        assert!(parse_parameter("x:0x0001").is_err());
    }
}
