use std::{fmt, str::FromStr};

use serde::{de::Visitor, Deserialize, Deserializer};

use crate::ParseError;

/// Event parameter type.
///
/// Only the types that fit a single 32-byte word are decoded from log data.
/// `Bytes` and `String` are accepted for indexed parameters, where the topic
/// holds their keccak-256 digest instead of the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Uint(usize),
    Int(usize),
    Address,
    Bool,
    FixedBytes(usize),
    Bytes,
    String,
}

impl Type {
    /// Whether the type has a variable-length encoding.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Type::Bytes | Type::String)
    }

    /// Whether the declared width is one the ABI allows: `uintN`/`intN` with
    /// N in 8..=256 and a multiple of 8, `bytesN` with N in 1..=32.
    pub fn has_valid_width(&self) -> bool {
        match self {
            Type::Uint(size) | Type::Int(size) => parsers::check_int_size(*size),
            Type::FixedBytes(size) => parsers::check_fixed_bytes_size(*size),
            _ => true,
        }
    }
}

impl fmt::Display for Type {
    /// Writes the canonical type name used in event signatures.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Uint(size) => write!(f, "uint{}", size),
            Type::Int(size) => write!(f, "int{}", size),
            Type::Address => f.write_str("address"),
            Type::Bool => f.write_str("bool"),
            Type::FixedBytes(size) => write!(f, "bytes{}", size),
            Type::Bytes => f.write_str("bytes"),
            Type::String => f.write_str("string"),
        }
    }
}

impl FromStr for Type {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The type grammar has no whitespace, so strip it before parsing.
        let compact: String = s.split_whitespace().collect();

        parsers::parse_exact_type(&compact)
            .map(|(_, ty)| ty)
            .map_err(|e| ParseError {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl<'de> Deserialize<'de> for Type {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(TypeVisitor)
    }
}

struct TypeVisitor;

impl<'de> Visitor<'de> for TypeVisitor {
    type Value = Type;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an event parameter type")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        v.parse().map_err(serde::de::Error::custom)
    }
}

pub(crate) mod parsers {
    use nom::{
        branch::alt,
        bytes::complete::tag,
        character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, multispace1, satisfy},
        combinator::{all_consuming, map, map_res, not, opt, peek, recognize, verify},
        multi::{many0_count, separated_list0},
        sequence::{delimited, pair, preceded, terminated, tuple},
        IResult,
    };

    use super::Type;
    use crate::EventParam;

    pub fn parse_exact_type(input: &str) -> IResult<&str, Type> {
        all_consuming(parse_type)(input)
    }

    /// Parses a declaration like `event Transfer(address indexed from, uint256 value);`
    /// into the event name and its parameters.
    pub fn parse_exact_event(input: &str) -> IResult<&str, (&str, Vec<EventParam>)> {
        all_consuming(delimited(
            multispace0,
            pair(
                preceded(opt(terminated(tag("event"), multispace1)), identifier),
                preceded(
                    multispace0,
                    delimited(
                        char('('),
                        separated_list0(char(','), parse_param),
                        preceded(multispace0, char(')')),
                    ),
                ),
            ),
            pair(multispace0, opt(pair(char(';'), multispace0))),
        ))(input)
    }

    fn parse_param(input: &str) -> IResult<&str, EventParam> {
        map(
            delimited(
                multispace0,
                tuple((
                    parse_type,
                    opt(preceded(multispace1, keyword("indexed"))),
                    opt(preceded(multispace1, identifier)),
                )),
                multispace0,
            ),
            |(type_, indexed, name)| EventParam {
                name: name.unwrap_or_default().to_string(),
                type_,
                indexed: indexed.is_some(),
            },
        )(input)
    }

    fn parse_type(input: &str) -> IResult<&str, Type> {
        alt((
            parse_uint,
            parse_int,
            parse_bytes,
            parse_string,
            parse_address,
            parse_bool,
        ))(input)
    }

    fn parse_uint(input: &str) -> IResult<&str, Type> {
        let (i, _) = tag("uint")(input)?;
        let (i, size) = parse_int_size(i)?;

        Ok((i, Type::Uint(size)))
    }

    fn parse_int(input: &str) -> IResult<&str, Type> {
        let (i, _) = tag("int")(input)?;
        let (i, size) = parse_int_size(i)?;

        Ok((i, Type::Int(size)))
    }

    // `uint` and `int` are aliases for their 256-bit forms.
    fn parse_int_size(input: &str) -> IResult<&str, usize> {
        verify(opt(parse_integer), |size: &Option<usize>| {
            size.map_or(true, check_int_size)
        })(input)
        .map(|(i, size)| (i, size.unwrap_or(256)))
    }

    fn parse_address(input: &str) -> IResult<&str, Type> {
        tag("address")(input).map(|(i, _)| (i, Type::Address))
    }

    fn parse_bool(input: &str) -> IResult<&str, Type> {
        tag("bool")(input).map(|(i, _)| (i, Type::Bool))
    }

    fn parse_string(input: &str) -> IResult<&str, Type> {
        tag("string")(input).map(|(i, _)| (i, Type::String))
    }

    fn parse_bytes(input: &str) -> IResult<&str, Type> {
        let (i, _) = tag("bytes")(input)?;
        let (i, size) = verify(opt(parse_integer), |size: &Option<usize>| {
            size.map_or(true, check_fixed_bytes_size)
        })(i)?;

        let ty = size.map_or(Type::Bytes, Type::FixedBytes);

        Ok((i, ty))
    }

    fn identifier(input: &str) -> IResult<&str, &str> {
        recognize(pair(
            alt((alpha1, tag("_"), tag("$"))),
            many0_count(alt((alphanumeric1, tag("_"), tag("$")))),
        ))(input)
    }

    // Matches `word` only when it is not the prefix of a longer identifier.
    fn keyword<'a>(word: &'a str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
        terminated(
            tag(word),
            not(peek(satisfy(|c: char| {
                c.is_ascii_alphanumeric() || c == '_' || c == '$'
            }))),
        )
    }

    fn parse_integer(input: &str) -> IResult<&str, usize> {
        map_res(digit1, str::parse)(input)
    }

    pub(super) fn check_int_size(i: usize) -> bool {
        i > 0 && i <= 256 && i % 8 == 0
    }

    pub(super) fn check_fixed_bytes_size(i: usize) -> bool {
        i > 0 && i <= 32
    }

}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn canonical_names() {
        assert_eq!("uint".parse::<Type>().unwrap().to_string(), "uint256");
        assert_eq!(" int 64 ".parse::<Type>().unwrap().to_string(), "int64");
        assert_eq!("bytes4".parse::<Type>().unwrap().to_string(), "bytes4");
        assert_eq!(Type::Address.to_string(), "address");
    }

    #[test]
    fn parse_error_keeps_input() {
        let err = "uint9".parse::<Type>().unwrap_err();

        assert_eq!(err.input, "uint9");
    }

    #[test]
    fn valid_widths() {
        assert!(Type::Uint(8).has_valid_width());
        assert!(Type::Int(256).has_valid_width());
        assert!(Type::FixedBytes(32).has_valid_width());
        assert!(Type::Address.has_valid_width());

        assert!(!Type::Uint(7).has_valid_width());
        assert!(!Type::Int(0).has_valid_width());
        assert!(!Type::Uint(264).has_valid_width());
        assert!(!Type::FixedBytes(0).has_valid_width());
        assert!(!Type::FixedBytes(40).has_valid_width());
    }

    #[test]
    fn dynamic_types() {
        assert!(Type::Bytes.is_dynamic());
        assert!(Type::String.is_dynamic());
        assert!(!Type::FixedBytes(32).is_dynamic());
        assert!(!Type::Uint(256).is_dynamic());
    }
}
